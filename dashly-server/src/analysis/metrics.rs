//! Metric Aggregation
//!
//! Pure aggregation over a window subset. All arithmetic is done in
//! `Decimal` and converted to `f64` only at the serialization edge, rounded
//! to 2 decimal places half-up.

use rust_decimal::prelude::*;
use shared::MetricsBundle;

use super::ingest::SalesRecord;

/// Rounding for monetary values (2 decimal places, half-up)
const DECIMAL_PLACES: u32 = 2;

/// Convert Decimal to f64 for serialization, rounded to 2 decimal places
#[inline]
pub fn to_f64(value: Decimal) -> f64 {
    value
        .round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
        .to_f64()
        .unwrap_or_default()
}

/// Unrounded window aggregates, kept in `Decimal` for comparisons
#[derive(Debug, Clone, PartialEq)]
pub struct WindowMetrics {
    pub revenue: Decimal,
    pub orders: i64,
    pub avg_check: Decimal,
    pub commission: Decimal,
    pub profit: Decimal,
}

/// Aggregate one window subset
pub fn calc_metrics(records: &[SalesRecord]) -> WindowMetrics {
    let revenue: Decimal = records.iter().map(|r| r.revenue).sum();
    let orders: i64 = records.iter().map(|r| r.qty).sum();
    let commission: Decimal = records.iter().map(|r| r.revenue * r.commission_pct).sum();

    let avg_check = if orders > 0 {
        revenue / Decimal::from(orders)
    } else {
        Decimal::ZERO
    };

    WindowMetrics {
        revenue,
        orders,
        avg_check,
        commission,
        profit: revenue - commission,
    }
}

/// Percent change vs a baseline: `None` when the baseline is 0
pub fn pct_change(curr: Decimal, prev: Decimal) -> Option<f64> {
    if prev.is_zero() {
        return None;
    }
    Some(to_f64((curr - prev) / prev * Decimal::ONE_HUNDRED))
}

/// Build the serialized bundle, attaching comparison deltas when a previous
/// window exists
pub fn build_bundle(curr: &WindowMetrics, prev: Option<&WindowMetrics>) -> MetricsBundle {
    let (revenue_change_pct, orders_change_pct, avg_check_change_pct) = match prev {
        Some(prev) => (
            pct_change(curr.revenue, prev.revenue),
            pct_change(Decimal::from(curr.orders), Decimal::from(prev.orders)),
            pct_change(curr.avg_check, prev.avg_check),
        ),
        None => (None, None, None),
    };

    MetricsBundle {
        revenue: to_f64(curr.revenue),
        orders: curr.orders,
        avg_check: to_f64(curr.avg_check),
        commission: to_f64(curr.commission),
        profit: to_f64(curr.profit),
        revenue_change_pct,
        orders_change_pct,
        avg_check_change_pct,
    }
}
