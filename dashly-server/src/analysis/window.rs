//! Window Selection
//!
//! Computes the analysis window anchored at the newest date in the dataset
//! and the equal-length comparison window immediately before it, then
//! splits the records into the two subsets. Only `today` and `week` reach
//! this layer; the HTTP boundary rejects locked periods earlier, but the
//! analyzer refuses them again so it stands alone.

use chrono::{Days, NaiveDate};
use shared::Period;

use super::error::AnalyzeError;
use super::ingest::SalesRecord;

/// Closed date range, both ends inclusive
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowBounds {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl WindowBounds {
    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }

    /// Window length in days (inclusive)
    pub fn len_days(&self) -> u64 {
        (self.end - self.start).num_days() as u64 + 1
    }
}

/// Records split into the current and comparison windows
#[derive(Debug)]
pub struct WindowSelection {
    pub bounds: WindowBounds,
    pub current: Vec<SalesRecord>,
    /// May legitimately be empty: no comparison data is not an error
    pub previous: Vec<SalesRecord>,
}

/// Compute the analysis window for `period`, anchored at `anchor`
fn period_bounds(anchor: NaiveDate, period: Period) -> Result<WindowBounds, AnalyzeError> {
    match period {
        Period::Today => Ok(WindowBounds {
            start: anchor,
            end: anchor,
        }),
        Period::Week => Ok(WindowBounds {
            start: anchor - Days::new(6),
            end: anchor,
        }),
        // Locked tiers never compute a window here
        Period::Month | Period::All => {
            Err(AnalyzeError::UnsupportedPeriod(period.as_str().to_string()))
        }
    }
}

/// The equal-length window immediately preceding `bounds`, no overlap
fn previous_bounds(bounds: WindowBounds) -> WindowBounds {
    let len = bounds.len_days();
    WindowBounds {
        start: bounds.start - Days::new(len),
        end: bounds.start - Days::new(1),
    }
}

/// Split records into current/previous window subsets
pub fn select_windows(
    records: Vec<SalesRecord>,
    period: Period,
) -> Result<WindowSelection, AnalyzeError> {
    let anchor = records
        .iter()
        .map(|r| r.date)
        .max()
        .ok_or(AnalyzeError::NoData)?;

    let bounds = period_bounds(anchor, period)?;
    let prev_bounds = previous_bounds(bounds);

    let mut current = Vec::new();
    let mut previous = Vec::new();
    for record in records {
        if bounds.contains(record.date) {
            current.push(record);
        } else if prev_bounds.contains(record.date) {
            previous.push(record);
        }
    }

    if current.is_empty() {
        return Err(AnalyzeError::NoData);
    }

    Ok(WindowSelection {
        bounds,
        current,
        previous,
    })
}
