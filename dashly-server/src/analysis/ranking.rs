//! Ranking (Top Entries)
//!
//! Group-by-key aggregation over a window subset: one entry per distinct
//! (sku, title) pair, ranked by units sold. Revenue share is computed
//! against the subset's total revenue.

use rust_decimal::Decimal;
use shared::TopEntry;
use std::collections::BTreeMap;

use super::ingest::SalesRecord;
use super::metrics::to_f64;

/// How many entries the report carries
pub const TOP_LIMIT: usize = 5;

/// Rank (sku, title) aggregates by qty descending, keep the first `limit`
///
/// Ties are broken by revenue descending, then by key, so the ranking is
/// deterministic for equal quantities.
pub fn top_entries(records: &[SalesRecord], limit: usize) -> Vec<TopEntry> {
    let mut groups: BTreeMap<(String, String), (i64, Decimal)> = BTreeMap::new();
    for record in records {
        let entry = groups
            .entry((record.sku.clone(), record.title.clone()))
            .or_insert((0, Decimal::ZERO));
        entry.0 += record.qty;
        entry.1 += record.revenue;
    }

    let total_revenue: Decimal = groups.values().map(|(_, revenue)| *revenue).sum();
    // Guard the zero-revenue subset: shares become 0 instead of dividing by 0
    let share_base = if total_revenue.is_zero() {
        Decimal::ONE
    } else {
        total_revenue
    };

    let mut ranked: Vec<_> = groups.into_iter().collect();
    ranked.sort_by(|(key_a, (qty_a, rev_a)), (key_b, (qty_b, rev_b))| {
        qty_b
            .cmp(qty_a)
            .then(rev_b.cmp(rev_a))
            .then(key_a.cmp(key_b))
    });

    ranked
        .into_iter()
        .take(limit)
        .map(|((sku, title), (qty, revenue))| TopEntry {
            sku,
            title,
            qty,
            revenue: to_f64(revenue),
            revenue_pct: to_f64(revenue / share_base * Decimal::ONE_HUNDRED),
        })
        .collect()
}
