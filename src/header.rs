//! Header row detection for grids read without a header assumption.
//!
//! Spreadsheets exported from statistical offices usually open with title
//! lines, notes and merged banner cells before the real column labels. Each
//! row of a bounded preview is scored and the best one wins:
//!
//! - **+5** when the row is mostly text and the row right below it is mostly
//!   numeric (labels sitting on top of data).
//! - **+3** when the row's text contains one of the header keywords.
//!
//! Ties go to the earliest row; a preview where nothing scores falls back to
//! row 0.

use itertools::Itertools;
use log::debug;

use crate::cell::Cell;

pub const DEFAULT_PREVIEW_ROWS: usize = 20;
pub const DEFAULT_HEADER_KEYWORDS: &[&str] = &["code", "district", "total", "population", "name"];

const TEXT_RULE_SCORE: u32 = 5;
const KEYWORD_RULE_SCORE: u32 = 3;
const TEXTUAL_THRESHOLD_PERCENT: usize = 80;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderCandidate {
    pub row: usize,
    pub score: u32,
    pub textual: bool,
    pub followed_by_numbers: bool,
    pub keyword: Option<String>,
}

#[derive(Debug, Clone)]
pub struct HeaderLocator {
    keywords: Vec<String>,
    preview_rows: usize,
}

impl Default for HeaderLocator {
    fn default() -> Self {
        Self {
            keywords: DEFAULT_HEADER_KEYWORDS
                .iter()
                .map(|k| k.to_string())
                .collect(),
            preview_rows: DEFAULT_PREVIEW_ROWS,
        }
    }
}

impl HeaderLocator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.keywords = keywords
            .into_iter()
            .map(|k| k.as_ref().trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();
        self
    }

    pub fn with_preview_rows(mut self, rows: usize) -> Self {
        self.preview_rows = rows.max(1);
        self
    }

    /// Scores every non-empty row of the preview window.
    pub fn score_rows(&self, grid: &[Vec<Cell>]) -> Vec<HeaderCandidate> {
        let preview = &grid[..grid.len().min(self.preview_rows)];
        let mut candidates = Vec::new();
        for (idx, row) in preview.iter().enumerate() {
            let present = present_cells(row);
            if present.is_empty() {
                continue;
            }
            let textual = is_mostly_text(&present);
            let followed_by_numbers = preview
                .get(idx + 1)
                .is_some_and(|next| is_mostly_numeric(&present_cells(next)));
            let keyword = self.matching_keyword(&present);

            let mut score = 0;
            if textual && followed_by_numbers {
                score += TEXT_RULE_SCORE;
            }
            if keyword.is_some() {
                score += KEYWORD_RULE_SCORE;
            }
            candidates.push(HeaderCandidate {
                row: idx,
                score,
                textual,
                followed_by_numbers,
                keyword,
            });
        }
        candidates
    }

    /// Index of the most header-like row, 0 when nothing qualifies.
    pub fn locate(&self, grid: &[Vec<Cell>]) -> usize {
        let candidates = self.score_rows(grid);
        debug!(
            "Header candidates: {}",
            candidates
                .iter()
                .filter(|c| c.score > 0)
                .map(|c| format!("row {}={}", c.row, c.score))
                .join(", ")
        );
        best_candidate(&candidates).map(|c| c.row).unwrap_or(0)
    }

    fn matching_keyword(&self, present: &[&Cell]) -> Option<String> {
        let text = present
            .iter()
            .map(|cell| cell.as_display().to_lowercase())
            .join(" ");
        self.keywords
            .iter()
            .find(|keyword| text.contains(keyword.as_str()))
            .cloned()
    }
}

/// Locates the header with the default keywords and preview size.
pub fn locate_header(grid: &[Vec<Cell>]) -> usize {
    HeaderLocator::default().locate(grid)
}

fn best_candidate(candidates: &[HeaderCandidate]) -> Option<&HeaderCandidate> {
    let mut best: Option<&HeaderCandidate> = None;
    for candidate in candidates.iter().filter(|c| c.score > 0) {
        if best.is_none_or(|b| candidate.score > b.score) {
            best = Some(candidate);
        }
    }
    best
}

fn present_cells(row: &[Cell]) -> Vec<&Cell> {
    row.iter().filter(|c| !c.is_missing()).collect()
}

fn is_mostly_text(present: &[&Cell]) -> bool {
    let text = present.iter().filter(|c| !c.is_number()).count();
    text * 100 > present.len() * TEXTUAL_THRESHOLD_PERCENT
}

fn is_mostly_numeric(present: &[&Cell]) -> bool {
    let numeric = present.iter().filter(|c| c.is_numeric_like()).count();
    numeric * 2 > present.len()
}
