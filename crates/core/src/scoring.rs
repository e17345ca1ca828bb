//! Scoring module - Classic line-clear scoring
//!
//! Points per lock are `LINE_SCORES[rows] * (level + 1)` where the level is
//! the total cleared lines divided by ten. Locks that clear nothing score 0.

use crate::types::{LINES_PER_LEVEL, LINE_SCORES};

/// Calculate line clear score
/// rows: number of rows cleared by one lock (1-4)
/// level: current level (0-based)
pub fn calculate_line_score(rows: usize, level: u32) -> u32 {
    if rows == 0 || rows >= LINE_SCORES.len() {
        return 0;
    }
    LINE_SCORES[rows].saturating_mul(level.saturating_add(1))
}

/// Level for a running line total
pub fn calculate_level(total_lines: u32) -> u32 {
    total_lines / LINES_PER_LEVEL
}
