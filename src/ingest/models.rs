//! Data models for CSV ingestion.

use chrono::NaiveDate;
use clap::ValueEnum;

/// A movie record after date and currency normalization.
///
/// `None` is the missing-value marker for fields whose source text did not
/// parse; it is distinct from zero and survives into the store as NULL.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedMovie {
    pub title: String,
    pub release_date: Option<NaiveDate>,
    pub genre: String,
    pub director1: String,
    pub cast1: String,
    pub cast2: String,
    pub budget: Option<f64>,
    pub revenue: Option<f64>,
}

/// What to do with a record field that fails date/currency parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum MalformedPolicy {
    /// Degrade the field to the missing-value marker and keep the record.
    Coerce,
    /// Abort the whole load on the first malformed field.
    Reject,
}

/// Counters describing what the loader did to a file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub rows_read: usize,
    pub malformed_dates: usize,
    pub malformed_budgets: usize,
    pub malformed_revenues: usize,
}

impl LoadSummary {
    pub fn malformed_fields(&self) -> usize {
        self.malformed_dates + self.malformed_budgets + self.malformed_revenues
    }
}
