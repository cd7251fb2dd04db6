//! Plain-text rendering of tables and header candidates for the terminal.

use std::borrow::Cow;
use std::fmt::Write as _;

use crate::{cell::Cell, header::HeaderCandidate, table::Table};

const CANDIDATE_SAMPLE_CELLS: usize = 4;

/// Renders the first `limit` rows of `table` (all rows when `None`) as an
/// aligned text grid. Numeric cells are right-aligned.
pub fn render_table(table: &Table, limit: Option<usize>) -> String {
    let headers = table.column_names();
    let shown = limit.unwrap_or(usize::MAX).min(table.row_count());
    let rows = table
        .rows()
        .take(shown)
        .map(|row| {
            row.into_iter()
                .map(|cell| (cell.as_display(), cell.is_number()))
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();

    let mut widths = headers.iter().map(|h| display_width(h)).collect::<Vec<_>>();
    for row in &rows {
        for (idx, (value, _)) in row.iter().enumerate() {
            widths[idx] = widths[idx].max(display_width(value));
        }
    }
    for width in &mut widths {
        *width = (*width).max(3);
    }

    let mut output = String::new();
    let header_cells = headers.iter().map(|h| (h.as_str(), false)).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&header_cells, &widths));
    let rule = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>();
    let rule_cells = rule.iter().map(|r| (r.as_str(), false)).collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&rule_cells, &widths));
    for row in &rows {
        let cells = row
            .iter()
            .map(|(value, numeric)| (value.as_str(), *numeric))
            .collect::<Vec<_>>();
        let _ = writeln!(output, "{}", format_row(&cells, &widths));
    }
    if shown < table.row_count() {
        let _ = writeln!(output, "... {} more row(s)", table.row_count() - shown);
    }
    output
}

/// One line per scored row, marking the chosen header with `*`.
pub fn render_candidates(grid: &[Vec<Cell>], candidates: &[HeaderCandidate], chosen: usize) -> String {
    let mut output = String::new();
    let _ = writeln!(output, "  row  score  rule_a  keyword       sample");
    for candidate in candidates {
        let marker = if candidate.row == chosen { '*' } else { ' ' };
        let sample = grid
            .get(candidate.row)
            .map(|row| {
                row.iter()
                    .filter(|cell| !cell.is_missing())
                    .take(CANDIDATE_SAMPLE_CELLS)
                    .map(|cell| sanitize_cell(&cell.as_display()).into_owned())
                    .collect::<Vec<_>>()
                    .join(" | ")
            })
            .unwrap_or_default();
        let _ = writeln!(
            output,
            "{marker}{:>4}  {:>5}  {:<6}  {:<12}  {sample}",
            candidate.row,
            candidate.score,
            if candidate.textual && candidate.followed_by_numbers {
                "yes"
            } else {
                "no"
            },
            candidate.keyword.as_deref().unwrap_or("-"),
        );
    }
    let _ = writeln!(output, "header row: {chosen}");
    output
}

fn format_row(values: &[(&str, bool)], widths: &[usize]) -> String {
    let mut cells = Vec::with_capacity(values.len());
    for ((value, right_align), width) in values.iter().zip(widths) {
        let sanitized = sanitize_cell(value);
        let padding = " ".repeat(width.saturating_sub(display_width(&sanitized)));
        if *right_align {
            cells.push(format!("{padding}{sanitized}"));
        } else {
            cells.push(format!("{sanitized}{padding}"));
        }
    }
    cells.join("  ").trim_end().to_string()
}

fn display_width(value: &str) -> usize {
    value.chars().count()
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}
