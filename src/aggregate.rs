//! Ranked frequency summary over a time range

use crate::range::TimeRange;
use crate::store::{RecordStore, StoreError, TextCount};

#[derive(Debug, Clone, PartialEq)]
pub struct AggregateRow {
    pub text: String,
    pub count: u64,
    /// Share of the range total, 0-100
    pub percentage: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    pub total: u64,
    pub rows: Vec<AggregateRow>,
}

impl Summary {
    /// Attach percentages to grouped counts
    ///
    /// A zero total yields no rows.
    pub fn from_counts(total: u64, counts: Vec<TextCount>) -> Self {
        if total == 0 {
            return Self::default();
        }

        let rows = counts
            .into_iter()
            .map(|c| AggregateRow {
                percentage: c.count as f64 / total as f64 * 100.0,
                text: c.text,
                count: c.count,
            })
            .collect();

        Self { total, rows }
    }

    pub fn is_empty(&self) -> bool {
        self.total == 0
    }
}

pub fn aggregate(store: &RecordStore, range: &TimeRange) -> Result<Summary, StoreError> {
    let (total, counts) = store.count_and_group(range)?;
    let summary = Summary::from_counts(total, counts);
    log::debug!(
        "Aggregated {} record(s) into {} distinct text(s) {}",
        summary.total,
        summary.rows.len(),
        range.label()
    );
    Ok(summary)
}
