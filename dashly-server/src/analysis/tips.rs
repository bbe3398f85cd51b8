//! Tip Generation
//!
//! A small ordered rule engine over the computed metrics and rankings.
//! Rules 1-3 (revenue drop, revenue concentration, discount-driven check
//! decline) form a first-match group producing at most one advisory; the
//! new-leader rule fires independently, at most once; a generic fallback is
//! appended only when nothing else fired.

use shared::{MetricsBundle, TopEntry};
use std::collections::HashSet;

/// Revenue drop that warrants a warning, percent
const REVENUE_DROP_THRESHOLD: f64 = -15.0;

/// Revenue share above which a single item is a concentration risk, percent
const CONCENTRATION_THRESHOLD: f64 = 40.0;

/// Derive advisory tips for the report
///
/// `has_previous` tells whether the comparison window had any records; the
/// delta-based rules and the new-leader rule are skipped without it.
pub fn generate_tips(
    metrics: &MetricsBundle,
    has_previous: bool,
    top_current: &[TopEntry],
    top_previous: &[TopEntry],
) -> Vec<String> {
    let mut tips = Vec::new();

    if let Some(tip) = headline_tip(metrics, has_previous, top_current) {
        tips.push(tip);
    }

    if has_previous
        && let Some(tip) = new_leader_tip(top_current, top_previous)
    {
        tips.push(tip);
    }

    if tips.is_empty() {
        tips.push("Metrics look stable. Keep the current course.".to_string());
    }

    tips
}

/// Rules 1-3, first match wins
fn headline_tip(
    metrics: &MetricsBundle,
    has_previous: bool,
    top_current: &[TopEntry],
) -> Option<String> {
    if has_previous
        && let Some(revenue_pct) = metrics.revenue_change_pct
        && revenue_pct < REVENUE_DROP_THRESHOLD
    {
        return Some(format!(
            "Sales dropped {:.2}% versus the previous period. Review advertising and listing positions.",
            revenue_pct.abs()
        ));
    }

    if let Some(leader) = top_current.first()
        && leader.revenue_pct > CONCENTRATION_THRESHOLD
    {
        return Some(format!(
            "Top item '{}' brings {:.2}% of revenue. Increase its stock to avoid a sell-out.",
            leader.title, leader.revenue_pct
        ));
    }

    if has_previous
        && matches!(metrics.avg_check_change_pct, Some(pct) if pct < 0.0)
        && matches!(metrics.orders_change_pct, Some(pct) if pct > 0.0)
    {
        return Some(
            "Average check fell while order count grew. Check whether discounts are eating the basket."
                .to_string(),
        );
    }

    None
}

/// Rule 4: first current top-5 sku missing from the previous top-5
fn new_leader_tip(top_current: &[TopEntry], top_previous: &[TopEntry]) -> Option<String> {
    let previous_skus: HashSet<&str> = top_previous.iter().map(|e| e.sku.as_str()).collect();
    top_current
        .iter()
        .find(|entry| !previous_skus.contains(entry.sku.as_str()))
        .map(|entry| format!("New leading item: {}.", entry.title))
}
