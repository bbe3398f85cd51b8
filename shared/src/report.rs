//! Report Models
//!
//! Aggregated metrics and rankings produced by one analysis call. All
//! monetary fields are pre-rounded to 2 decimal places by the server;
//! percent-change fields are `None` when no comparison baseline exists.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Aggregated business metrics for the analysis window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsBundle {
    /// Total revenue over the window
    pub revenue: f64,
    /// Total units sold (sum of qty)
    pub orders: i64,
    /// Average check (revenue / orders, 0 when orders is 0)
    pub avg_check: f64,
    /// Total marketplace commission (sum of revenue * commission_pct)
    pub commission: f64,
    /// Revenue minus commission
    pub profit: f64,
    /// Revenue change vs the previous window, percent
    pub revenue_change_pct: Option<f64>,
    /// Orders change vs the previous window, percent
    pub orders_change_pct: Option<f64>,
    /// Average-check change vs the previous window, percent
    pub avg_check_change_pct: Option<f64>,
}

/// One ranked (sku, title) aggregate within a window
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TopEntry {
    pub sku: String,
    pub title: String,
    /// Units sold
    pub qty: i64,
    /// Revenue brought by this item
    pub revenue: f64,
    /// Share of the window's total revenue, percent
    pub revenue_pct: f64,
}

/// Metadata attached to every report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMeta {
    /// Input format the table was read from (csv | xlsx)
    pub source: String,
    /// How the analysis was triggered
    pub mode: String,
    /// Requested period keyword
    pub period: String,
    /// First day of the analysis window (serialized as YYYY-MM-DD)
    pub period_start: NaiveDate,
    /// Last day of the analysis window (serialized as YYYY-MM-DD)
    pub period_end: NaiveDate,
    /// Total rows ingested from the table (not only the window subset)
    pub rows_processed: usize,
}
