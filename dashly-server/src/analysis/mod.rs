//! Sales Window Analyzer
//!
//! The analysis core: one synchronous, stateless call from raw upload
//! bytes to a finished report. Control flow is linear:
//!
//! ingest -> window selection -> metrics (+comparison) -> top-5 ranking
//! -> daily series -> chart -> tips -> meta
//!
//! Nothing here touches shared state, so concurrent calls cannot
//! interfere; the HTTP boundary decides how to schedule them.

pub mod chart;
pub mod error;
pub mod ingest;
pub mod metrics;
pub mod ranking;
pub mod tips;
pub mod window;

use rust_decimal::Decimal;
use shared::{MetricsBundle, Period, ReportMeta, TopEntry};

pub use chart::{ChartRenderer, PlottersRenderer, RenderOptions};
pub use error::AnalyzeError;
pub use ingest::SalesRecord;

/// Per-call knobs, owned by the caller (no module-wide defaults)
#[derive(Debug, Clone)]
pub struct AnalyzeOptions {
    /// Commission rate applied when the table carries none
    pub default_commission: Decimal,
}

/// Finished analysis: metrics, ranking, advisories, rendered chart, meta
#[derive(Debug)]
pub struct AnalyzeReport {
    pub metrics: MetricsBundle,
    pub top5: Vec<TopEntry>,
    pub tips: Vec<String>,
    pub chart_png: Vec<u8>,
    pub meta: ReportMeta,
}

/// Run the full analysis over one uploaded table
pub fn analyze(
    content: &[u8],
    filename: &str,
    period: Period,
    options: &AnalyzeOptions,
    renderer: &dyn ChartRenderer,
) -> Result<AnalyzeReport, AnalyzeError> {
    let table = ingest::read_table(content, filename, options.default_commission)?;
    let rows_processed = table.records.len();

    let selection = window::select_windows(table.records, period)?;
    let has_previous = !selection.previous.is_empty();

    let current_metrics = metrics::calc_metrics(&selection.current);
    let previous_metrics = has_previous.then(|| metrics::calc_metrics(&selection.previous));
    let bundle = metrics::build_bundle(&current_metrics, previous_metrics.as_ref());

    let top5 = ranking::top_entries(&selection.current, ranking::TOP_LIMIT);
    let top5_previous = if has_previous {
        ranking::top_entries(&selection.previous, ranking::TOP_LIMIT)
    } else {
        Vec::new()
    };

    let tips = tips::generate_tips(&bundle, has_previous, &top5, &top5_previous);

    let series = chart::daily_revenue_series(&selection.current);
    let chart_png = renderer.render(&series)?;

    let meta = ReportMeta {
        source: table.format.as_str().to_string(),
        mode: "manual".to_string(),
        period: period.as_str().to_string(),
        period_start: selection.bounds.start,
        period_end: selection.bounds.end,
        rows_processed,
    };

    Ok(AnalyzeReport {
        metrics: bundle,
        top5,
        tips,
        chart_png,
        meta,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Renderer stub so pipeline tests need no graphics backend
    struct StubRenderer;

    impl ChartRenderer for StubRenderer {
        fn render(&self, series: &[(chrono::NaiveDate, f64)]) -> Result<Vec<u8>, AnalyzeError> {
            assert!(!series.is_empty());
            Ok(vec![0x89, b'P', b'N', b'G'])
        }
    }

    fn options() -> AnalyzeOptions {
        AnalyzeOptions {
            default_commission: Decimal::new(15, 2),
        }
    }

    const WEEK_CSV: &str = "date,sku,title,qty,revenue\n\
        2025-10-14,A1,Mug,2,200\n\
        2025-10-16,B1,Plate,5,500\n\
        2025-10-20,A1,Mug,1,100\n";

    #[test]
    fn test_full_pipeline_week_without_comparison() {
        let report = analyze(
            WEEK_CSV.as_bytes(),
            "sales.csv",
            Period::Week,
            &options(),
            &StubRenderer,
        )
        .unwrap();

        assert_eq!(report.metrics.revenue, 800.0);
        assert_eq!(report.metrics.orders, 8);
        assert_eq!(report.metrics.avg_check, 100.0);
        // no rows before 2025-10-14: comparison window is empty
        assert!(report.metrics.revenue_change_pct.is_none());
        assert!(report.metrics.orders_change_pct.is_none());
        assert!(report.metrics.avg_check_change_pct.is_none());

        assert_eq!(report.top5[0].sku, "B1");
        assert_eq!(report.meta.period_start, "2025-10-14".parse().unwrap());
        assert_eq!(report.meta.period_end, "2025-10-20".parse().unwrap());
        assert_eq!(report.meta.rows_processed, 3);
        assert_eq!(report.meta.source, "csv");

        // concentration rule fires on B1 (62.5% of revenue) even without
        // comparison data
        assert!(report.tips[0].contains("Plate"), "{:?}", report.tips);
    }

    #[test]
    fn test_full_pipeline_with_comparison_window() {
        let csv = "date,sku,title,qty,revenue\n\
            2025-10-12,A1,Mug,4,400\n\
            2025-10-13,A1,Mug,4,400\n\
            2025-10-14,A1,Mug,2,200\n\
            2025-10-14,B1,Plate,3,300\n";
        let report = analyze(
            csv.as_bytes(),
            "sales.csv",
            Period::Today,
            &options(),
            &StubRenderer,
        )
        .unwrap();

        // current = 2025-10-14, previous = 2025-10-13
        assert_eq!(report.metrics.revenue, 500.0);
        assert_eq!(report.metrics.revenue_change_pct, Some(25.0));
        assert_eq!(report.metrics.orders_change_pct, Some(25.0));
        assert_eq!(report.metrics.avg_check_change_pct, Some(0.0));
        // Plate is new vs yesterday's top set
        assert!(
            report
                .tips
                .iter()
                .any(|tip| tip.contains("New leading item")),
            "{:?}",
            report.tips
        );
    }

    #[test]
    fn test_commission_flows_from_options() {
        let report = analyze(
            WEEK_CSV.as_bytes(),
            "sales.csv",
            Period::Week,
            &AnalyzeOptions {
                default_commission: Decimal::new(10, 2),
            },
            &StubRenderer,
        )
        .unwrap();

        assert_eq!(report.metrics.commission, 80.0);
        assert_eq!(report.metrics.profit, 720.0);
    }

    #[test]
    fn test_unsupported_period_surfaces() {
        let err = analyze(
            WEEK_CSV.as_bytes(),
            "sales.csv",
            Period::All,
            &options(),
            &StubRenderer,
        )
        .unwrap_err();
        assert!(matches!(err, AnalyzeError::UnsupportedPeriod(_)));
    }

    #[test]
    fn test_report_is_reproducible() {
        let run = || {
            analyze(
                WEEK_CSV.as_bytes(),
                "sales.csv",
                Period::Week,
                &options(),
                &StubRenderer,
            )
            .unwrap()
        };
        let (a, b) = (run(), run());
        assert_eq!(a.metrics.revenue, b.metrics.revenue);
        assert_eq!(
            a.top5.iter().map(|e| &e.sku).collect::<Vec<_>>(),
            b.top5.iter().map(|e| &e.sku).collect::<Vec<_>>()
        );
        assert_eq!(a.tips, b.tips);
    }
}
