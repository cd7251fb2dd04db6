//! Column and table name sanitizing.
//!
//! Labels pulled from spreadsheets are free text ("Total Persons",
//! "Sub-Distt.", blanks, repeated headings). Destination identifiers must be
//! lowercase `[a-z0-9_]`, non-empty, at most [`MAX_IDENTIFIER_LEN`] bytes and
//! unique within a table. Bases are cut to [`MAX_BASE_LEN`] so a `_<n>`
//! disambiguation suffix always fits.

use std::{collections::HashSet, path::Path, sync::LazyLock};

use regex::Regex;

pub const MAX_IDENTIFIER_LEN: usize = 63;
pub const MAX_BASE_LEN: usize = 60;

static WHITESPACE_RUN: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static DISALLOWED: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[^a-z0-9_]").unwrap());

/// One left-to-right sanitizing pass over the columns of a single table.
#[derive(Debug, Default)]
pub struct NameSanitizer {
    seen: HashSet<String>,
    processed: usize,
}

impl NameSanitizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sanitizes the next column label of the pass.
    pub fn sanitize(&mut self, raw: &str) -> String {
        let name = sanitize(raw, self.processed, &self.seen);
        self.seen.insert(name.clone());
        self.processed += 1;
        name
    }
}

/// Sanitizes `raw` as the column at `position` given the names already taken.
pub fn sanitize(raw: &str, position: usize, existing: &HashSet<String>) -> String {
    let lowered = raw.trim().to_lowercase();
    let underscored = WHITESPACE_RUN.replace_all(&lowered, "_");
    let mut base = DISALLOWED.replace_all(&underscored, "").into_owned();
    if base.is_empty() {
        base = format!("col_{position}");
    }
    base.truncate(MAX_BASE_LEN);

    if !existing.contains(&base) {
        return base;
    }
    let mut counter = 1usize;
    loop {
        let suffix = format!("_{counter}");
        let keep = base.len().min(MAX_IDENTIFIER_LEN - suffix.len());
        let candidate = format!("{}{}", &base[..keep], suffix);
        if !existing.contains(&candidate) {
            return candidate;
        }
        counter += 1;
    }
}

/// Sanitizes every label of one table, in order.
pub fn sanitize_all<S: AsRef<str>>(raw_names: &[S]) -> Vec<String> {
    let mut pass = NameSanitizer::new();
    raw_names.iter().map(|n| pass.sanitize(n.as_ref())).collect()
}

/// Destination table name for a source file: lowercase stem with every
/// character outside `[a-z0-9]` replaced by `_`.
pub fn table_name_from_file(path: &Path) -> String {
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    stem.to_lowercase()
        .chars()
        .map(|c| match c {
            'a'..='z' | '0'..='9' => c,
            _ => '_',
        })
        .collect()
}
