use std::fmt;

use serde::{Deserialize, Serialize};

/// Largest magnitude at which every whole `f64` is still an exact integer.
pub const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// One cell of a raw grid or a cleaned table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub enum Cell {
    #[default]
    Missing,
    Number(f64),
    Text(String),
}

/// Hashable identity of a non-missing cell, used for distinct-value scans.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum CellKey {
    Number(u64),
    Text(String),
}

impl Cell {
    /// Cell for a value read from untyped text (delimited files, PDF regions).
    ///
    /// Blank text is `Missing`, plain finite decimals become `Number`, and
    /// everything else, including zero-padded codes such as `007` and
    /// integers too large for an exact `f64`, stays text.
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Cell::Missing;
        }
        if looks_numeric(trimmed) {
            if is_integer_literal(trimmed) {
                return match trimmed.parse::<i64>() {
                    Ok(value) => Cell::integer(value),
                    Err(_) => Cell::Text(trimmed.to_string()),
                };
            }
            if let Ok(value) = trimmed.parse::<f64>()
                && value.is_finite()
            {
                return Cell::Number(value);
            }
        }
        Cell::Text(trimmed.to_string())
    }

    /// Cell for a native integer value; digits beyond `f64` precision stay text.
    pub fn integer(value: i64) -> Self {
        if value.unsigned_abs() > MAX_EXACT_INTEGER as u64 {
            Cell::Text(value.to_string())
        } else {
            Cell::Number(value as f64)
        }
    }

    /// Cell for a native string value; never reinterpreted as a number.
    pub fn text(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            Cell::Missing
        } else {
            Cell::Text(trimmed.to_string())
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, Cell::Missing)
    }

    pub fn is_number(&self) -> bool {
        matches!(self, Cell::Number(_))
    }

    /// Whole number that fits an `i64` without losing precision.
    pub fn as_integer(&self) -> Option<i64> {
        match self {
            Cell::Number(n) if n.fract() == 0.0 && n.abs() <= MAX_EXACT_INTEGER => Some(*n as i64),
            _ => None,
        }
    }

    /// Number, or text that reads as a non-negative decimal with at most one point.
    pub fn is_numeric_like(&self) -> bool {
        match self {
            Cell::Number(_) => true,
            Cell::Text(s) => is_unsigned_decimal(s),
            Cell::Missing => false,
        }
    }

    pub fn key(&self) -> Option<CellKey> {
        match self {
            Cell::Missing => None,
            // Fold -0.0 into 0.0 so both land on the same key.
            Cell::Number(n) => Some(CellKey::Number((n + 0.0).to_bits())),
            Cell::Text(s) => Some(CellKey::Text(s.clone())),
        }
    }

    pub fn as_display(&self) -> String {
        match self {
            Cell::Missing => String::new(),
            Cell::Number(n) => format_number(*n),
            Cell::Text(s) => s.clone(),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_display())
    }
}

impl From<&str> for Cell {
    fn from(value: &str) -> Self {
        Cell::parse(value)
    }
}

impl From<f64> for Cell {
    fn from(value: f64) -> Self {
        Cell::Number(value)
    }
}

impl From<i64> for Cell {
    fn from(value: i64) -> Self {
        Cell::Number(value as f64)
    }
}

pub fn format_number(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() <= MAX_EXACT_INTEGER {
        format!("{}", value as i64)
    } else {
        value.to_string()
    }
}

/// Digits with at most one `.`, e.g. `12`, `3.5`, `.5`, `7.`.
pub fn is_unsigned_decimal(value: &str) -> bool {
    let mut digits = 0usize;
    let mut points = 0usize;
    for ch in value.chars() {
        match ch {
            '0'..='9' => digits += 1,
            '.' => points += 1,
            _ => return false,
        }
    }
    digits > 0 && points <= 1
}

fn is_integer_literal(value: &str) -> bool {
    let unsigned = value.strip_prefix(['-', '+']).unwrap_or(value);
    !unsigned.is_empty() && unsigned.bytes().all(|b| b.is_ascii_digit())
}

fn looks_numeric(value: &str) -> bool {
    let unsigned = value.strip_prefix(['-', '+']).unwrap_or(value);
    if unsigned.is_empty() {
        return false;
    }
    let bytes = unsigned.as_bytes();
    if bytes.len() > 1 && bytes[0] == b'0' && bytes[1].is_ascii_digit() {
        return false;
    }
    unsigned
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | 'e' | 'E' | '-' | '+'))
        && unsigned.chars().any(|c| c.is_ascii_digit())
}
