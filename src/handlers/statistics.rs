use std::collections::BTreeMap;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::utils::error::AppError;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct StatisticsParams {
    pub format: Option<String>,
}

#[derive(Serialize)]
pub struct StatisticsResponse {
    pub total: usize,
    #[serde(rename = "total-current-week")]
    pub total_current_week: usize,
    #[serde(rename = "total-current-month")]
    pub total_current_month: usize,
    #[serde(rename = "per-days")]
    pub per_days: BTreeMap<String, usize>,
}

/// Aggregate counts over the stored collection. Chart output is not
/// supported; only `format=json`.
pub async fn event_statistics(
    State(state): State<AppState>,
    Query(params): Query<StatisticsParams>,
) -> Result<Response, AppError> {
    let format = params.format.as_deref().unwrap_or("json");
    if format != "json" {
        return Err(AppError::Validation(format!(
            "Unsupported statistics format '{format}'. Only 'json' is available."
        )));
    }

    let stats = state.store.statistics(Utc::now().date_naive());

    let per_days = stats
        .per_day
        .iter()
        .map(|(date, count)| (date.format("%Y-%m-%d").to_string(), *count))
        .collect();

    let payload = StatisticsResponse {
        total: stats.total,
        total_current_week: stats.current_week,
        total_current_month: stats.current_month,
        per_days,
    };
    Ok((StatusCode::OK, Json(payload)).into_response())
}
