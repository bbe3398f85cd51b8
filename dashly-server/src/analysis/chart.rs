//! Chart Rendering
//!
//! Renders the revenue-over-time series as a PNG. The renderer sits behind
//! a narrow trait (series of (date, value) in, image bytes out) so the rest
//! of the pipeline is testable without a graphics backend. The production
//! implementation draws with the plotters bitmap backend and encodes the
//! framebuffer as PNG in memory.

use chrono::NaiveDate;
use plotters::prelude::*;
use rust_decimal::Decimal;
use std::collections::BTreeMap;
use std::io::Cursor;

use super::error::AnalyzeError;
use super::ingest::SalesRecord;
use super::metrics::to_f64;

/// Pluggable renderer: daily revenue series in, encoded raster image out
pub trait ChartRenderer: Send + Sync {
    fn render(&self, series: &[(NaiveDate, f64)]) -> Result<Vec<u8>, AnalyzeError>;
}

/// Build the complete daily revenue series for a window subset
///
/// Spans min..=max date of the subset and fills days without sales with
/// zero revenue, so the plotted line has no gaps.
pub fn daily_revenue_series(records: &[SalesRecord]) -> Vec<(NaiveDate, f64)> {
    let mut by_day: BTreeMap<NaiveDate, Decimal> = BTreeMap::new();
    for record in records {
        *by_day.entry(record.date).or_insert(Decimal::ZERO) += record.revenue;
    }

    let (Some(&first), Some(&last)) = (by_day.keys().next(), by_day.keys().next_back()) else {
        return Vec::new();
    };

    let mut series = Vec::new();
    let mut day = first;
    while day <= last {
        let revenue = by_day.get(&day).copied().unwrap_or(Decimal::ZERO);
        series.push((day, to_f64(revenue)));
        let Some(next) = day.succ_opt() else { break };
        day = next;
    }
    series
}

/// Fixed rendering parameters
///
/// Kept explicit so tests can shrink the canvas; identical options and
/// series always produce the same image.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub width: u32,
    pub height: u32,
    pub caption: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            width: 1000,
            height: 500,
            caption: "Revenue over time".to_string(),
        }
    }
}

/// Line/fill color (the dashboard blue)
const LINE_COLOR: RGBColor = RGBColor(0x00, 0x56, 0xb3);

/// Production renderer backed by plotters' bitmap backend
#[derive(Debug, Clone, Default)]
pub struct PlottersRenderer {
    options: RenderOptions,
}

impl PlottersRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }
}

impl ChartRenderer for PlottersRenderer {
    fn render(&self, series: &[(NaiveDate, f64)]) -> Result<Vec<u8>, AnalyzeError> {
        if series.is_empty() {
            return Err(AnalyzeError::Render("empty revenue series".to_string()));
        }

        let (width, height) = (self.options.width, self.options.height);
        let mut framebuffer = vec![0u8; (width * height * 3) as usize];

        {
            let root =
                BitMapBackend::with_buffer(&mut framebuffer, (width, height)).into_drawing_area();
            root.fill(&WHITE)
                .map_err(|e| AnalyzeError::Render(e.to_string()))?;

            let y_max = series
                .iter()
                .map(|(_, value)| *value)
                .fold(0.0_f64, f64::max)
                .max(1.0)
                * 1.05;
            let x_max = series.len().saturating_sub(1).max(1);

            let mut chart = ChartBuilder::on(&root)
                .caption(&self.options.caption, ("sans-serif", 24))
                .margin(16)
                .x_label_area_size(36)
                .y_label_area_size(64)
                .build_cartesian_2d(0usize..x_max, 0f64..y_max)
                .map_err(|e| AnalyzeError::Render(e.to_string()))?;

            let dates: Vec<NaiveDate> = series.iter().map(|(date, _)| *date).collect();
            chart
                .configure_mesh()
                .x_labels(dates.len().min(8))
                .x_label_formatter(&|idx| {
                    dates
                        .get(*idx)
                        .map(|date| date.format("%m-%d").to_string())
                        .unwrap_or_default()
                })
                .y_desc("Revenue")
                .draw()
                .map_err(|e| AnalyzeError::Render(e.to_string()))?;

            chart
                .draw_series(LineSeries::new(
                    series.iter().enumerate().map(|(idx, (_, value))| (idx, *value)),
                    LINE_COLOR.stroke_width(3),
                ))
                .map_err(|e| AnalyzeError::Render(e.to_string()))?;

            root.present()
                .map_err(|e| AnalyzeError::Render(e.to_string()))?;
        }

        encode_png(&framebuffer, width, height)
    }
}

/// Encode the RGB framebuffer as PNG bytes
fn encode_png(framebuffer: &[u8], width: u32, height: u32) -> Result<Vec<u8>, AnalyzeError> {
    let img = image::RgbImage::from_raw(width, height, framebuffer.to_vec())
        .ok_or_else(|| AnalyzeError::Render("framebuffer size mismatch".to_string()))?;

    let mut png = Vec::new();
    let encoder = image::codecs::png::PngEncoder::new(Cursor::new(&mut png));
    img.write_with_encoder(encoder)
        .map_err(|e| AnalyzeError::Render(e.to_string()))?;

    Ok(png)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: &str, revenue: i64) -> SalesRecord {
        SalesRecord {
            date: date.parse().unwrap(),
            sku: "A1".into(),
            title: "Mug".into(),
            qty: 1,
            revenue: Decimal::from(revenue),
            commission_pct: Decimal::new(15, 2),
        }
    }

    #[test]
    fn test_series_fills_missing_days_with_zero() {
        let records = vec![record("2025-10-14", 100), record("2025-10-17", 300)];
        let series = daily_revenue_series(&records);

        assert_eq!(series.len(), 4);
        assert_eq!(series[0], ("2025-10-14".parse().unwrap(), 100.0));
        assert_eq!(series[1].1, 0.0);
        assert_eq!(series[2].1, 0.0);
        assert_eq!(series[3].1, 300.0);
    }

    #[test]
    fn test_series_sums_same_day_revenue() {
        let records = vec![record("2025-10-14", 100), record("2025-10-14", 250)];
        let series = daily_revenue_series(&records);
        assert_eq!(series, vec![("2025-10-14".parse().unwrap(), 350.0)]);
    }

    #[test]
    fn test_empty_subset_yields_empty_series() {
        assert!(daily_revenue_series(&[]).is_empty());
    }

    #[test]
    fn test_render_produces_png() {
        let renderer = PlottersRenderer::new(RenderOptions {
            width: 320,
            height: 200,
            caption: "test".into(),
        });
        let series = vec![
            ("2025-10-14".parse().unwrap(), 100.0),
            ("2025-10-15".parse().unwrap(), 0.0),
            ("2025-10-16".parse().unwrap(), 420.5),
        ];

        let png = renderer.render(&series).unwrap();
        assert!(!png.is_empty());
        // PNG signature
        assert_eq!(&png[..8], &[0x89, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a]);
    }

    #[test]
    fn test_render_single_point_series() {
        let renderer = PlottersRenderer::default();
        let png = renderer
            .render(&[("2025-10-20".parse().unwrap(), 50.0)])
            .unwrap();
        assert!(!png.is_empty());
    }

    #[test]
    fn test_render_rejects_empty_series() {
        let renderer = PlottersRenderer::default();
        assert!(matches!(
            renderer.render(&[]),
            Err(AnalyzeError::Render(_))
        ));
    }
}
