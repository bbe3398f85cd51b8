//! Analyze API Handler
//!
//! Accepts a multipart form (`period` text field + `file` upload), runs the
//! analysis core on a blocking worker and returns the report as JSON with
//! the chart PNG base64-encoded. Locked periods (`month`, `all`) are
//! rejected here with 403 before the core is ever called.

use axum::Json;
use axum::extract::{Multipart, State};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use serde::Serialize;
use shared::{Period, ReportMeta, TopEntry};

use crate::analysis;
use crate::core::ServerState;
use crate::utils::{AppError, AppResult};

/// Analysis report as served to clients
#[derive(Debug, Serialize)]
pub struct AnalyzeResponse {
    pub revenue: f64,
    pub orders: i64,
    pub avg_check: f64,
    pub commission: f64,
    pub profit: f64,
    pub revenue_change_pct: Option<f64>,
    pub orders_change_pct: Option<f64>,
    pub avg_check_change_pct: Option<f64>,
    pub top5: Vec<TopEntry>,
    pub tips: Vec<String>,
    pub chart_png_base64: String,
    pub meta: ReportMeta,
}

/// Extracted multipart form fields
struct AnalyzeForm {
    period: String,
    filename: String,
    content: Vec<u8>,
}

/// Pull the `period` and `file` fields out of the multipart stream
async fn read_form(mut multipart: Multipart) -> AppResult<AnalyzeForm> {
    let mut period = None;
    let mut filename = None;
    let mut content: Option<Vec<u8>> = None;

    while let Some(field) = multipart.next_field().await? {
        match field.name() {
            Some("period") => period = Some(field.text().await?),
            Some("file") => {
                filename = field.file_name().map(|s| s.to_string());
                content = Some(field.bytes().await?.to_vec());
            }
            _ => {}
        }
    }

    let period = period
        .ok_or_else(|| AppError::validation("No 'period' field found in the form".to_string()))?;
    let content = content
        .ok_or_else(|| AppError::validation("No 'file' field found in the form".to_string()))?;
    let filename = filename
        .ok_or_else(|| AppError::validation("No filename provided in file field".to_string()))?;

    if content.is_empty() {
        return Err(AppError::validation("Empty file provided".to_string()));
    }

    Ok(AnalyzeForm {
        period,
        filename,
        content,
    })
}

/// POST /analyze - analyze an uploaded sales table
pub async fn analyze(
    State(state): State<ServerState>,
    multipart: Multipart,
) -> AppResult<Json<AnalyzeResponse>> {
    let form = read_form(multipart).await?;

    let period: Period = form
        .period
        .parse()
        .map_err(|_| AppError::validation("period must be one of: today, week, month, all"))?;
    if period.is_locked() {
        return Err(AppError::forbidden(format!(
            "Feature locked: period '{}' requires the PRO tier",
            period
        )));
    }

    tracing::debug!(
        period = %period,
        filename = %form.filename,
        size = form.content.len(),
        "Starting analysis"
    );

    // The core is synchronous CPU work (parsing + rendering); keep it off
    // the async reactor
    let options = state.analyze_options();
    let renderer = state.renderer.clone();
    let report = tokio::task::spawn_blocking(move || {
        analysis::analyze(
            &form.content,
            &form.filename,
            period,
            &options,
            renderer.as_ref(),
        )
    })
    .await
    .map_err(|e| AppError::internal(format!("Analysis task failed: {}", e)))??;

    tracing::info!(
        period = %period,
        rows = report.meta.rows_processed,
        revenue = report.metrics.revenue,
        "Analysis completed"
    );

    let chart_png_base64 = STANDARD.encode(&report.chart_png);

    Ok(Json(AnalyzeResponse {
        revenue: report.metrics.revenue,
        orders: report.metrics.orders,
        avg_check: report.metrics.avg_check,
        commission: report.metrics.commission,
        profit: report.metrics.profit,
        revenue_change_pct: report.metrics.revenue_change_pct,
        orders_change_pct: report.metrics.orders_change_pct,
        avg_check_change_pct: report.metrics.avg_check_change_pct,
        top5: report.top5,
        tips: report.tips,
        chart_png_base64,
        meta: report.meta,
    }))
}
