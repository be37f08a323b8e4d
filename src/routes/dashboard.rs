//! Dashboard routes: one fixed report battery per topic.

use axum::{extract::State, Json};

use crate::errors::AppError;
use crate::services::inventory::{self, InventoryReport};
use crate::services::sales::{self, SalesReport};
use crate::services::shortage::{self, ShortageReport};
use crate::services::summary::{self, SummaryReport};
use crate::AppState;

/// GET /api/dashboard/summary — KPI cards and headline charts.
pub async fn summary(State(state): State<AppState>) -> Result<Json<SummaryReport>, AppError> {
    let report = summary::get_report(&state.db).await?;
    Ok(Json(report))
}

/// GET /api/dashboard/sales — sales trend and segment analysis.
pub async fn sales(State(state): State<AppState>) -> Result<Json<SalesReport>, AppError> {
    let report = sales::get_report(&state.db).await?;
    Ok(Json(report))
}

/// GET /api/dashboard/inventory — turnover, aging, and risk analysis.
pub async fn inventory(State(state): State<AppState>) -> Result<Json<InventoryReport>, AppError> {
    let report = inventory::get_report(&state.db).await?;
    Ok(Json(report))
}

/// GET /api/dashboard/shortage — undeliverable order lines and remedies.
pub async fn shortage(State(state): State<AppState>) -> Result<Json<ShortageReport>, AppError> {
    let report = shortage::get_report(&state.db).await?;
    Ok(Json(report))
}
