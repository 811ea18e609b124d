//! Report formatting
//!
//! Output is a single Slack code block; column alignment relies on monospacing.

use crate::aggregate::Summary;
use std::fmt::Write;

const FENCE: &str = "```";
const RULE: &str = "============================";

/// Minimum width of the text column
pub const TEXT_WIDTH: usize = 50;

/// Render the summary as a fenced, fixed-width text block
pub fn render(summary: &Summary, range_label: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}Total tainted message: {}", FENCE, summary.total);
    let _ = writeln!(out, "{}", range_label);
    let _ = writeln!(out, "{}", RULE);

    for row in &summary.rows {
        let _ = writeln!(out, "{}", format_row(row.percentage, row.count, &row.text));
    }

    out.push_str(FENCE);
    out
}

/// One report line: percentage, count, then the text padded (never cut) to
/// [`TEXT_WIDTH`]
pub fn format_row(percentage: f64, count: u64, text: &str) -> String {
    format!("{:4.2}% : {:4} :  {:<width$}", percentage, count, text, width = TEXT_WIDTH)
}
