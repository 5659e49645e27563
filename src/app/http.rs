// ==========================================
// 仓库库存驾驶舱 - HTTP 路由
// ==========================================
// 端点:
// - GET /, /health            存活探针
// - GET /api/data             对账后的库存明细
// - GET /api/stats?period=    汇总统计
// - GET /api/confrontos?type= 数量对比
// 跨域: 全放开
// ==========================================

use axum::extract::{Query, State};
use axum::routing::get;
use axum::{Json, Router};
use serde::Deserialize;
use tower_http::cors::CorsLayer;

use crate::api::{ApiResult, DashboardApi, HealthResponse, StatsResponse};
use crate::app::state::AppState;
use crate::domain::inventory::InventoryRecord;
use crate::engine::ComparisonReport;

#[derive(Debug, Default, Deserialize)]
pub struct StatsQuery {
    pub period: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ComparisonQuery {
    #[serde(rename = "type")]
    pub kind: Option<String>,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/health", get(health))
        .route("/api/data", get(data_handler))
        .route("/api/stats", get(stats_handler))
        .route("/api/confrontos", get(comparisons_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}

async fn data_handler(State(state): State<AppState>) -> ApiResult<Json<Vec<InventoryRecord>>> {
    let records = state.dashboard_api.data(DashboardApi::today()).await?;
    Ok(Json(records))
}

async fn stats_handler(
    State(state): State<AppState>,
    Query(query): Query<StatsQuery>,
) -> ApiResult<Json<StatsResponse>> {
    let period = DashboardApi::parse_period(query.period.as_deref())?;
    let stats = state
        .dashboard_api
        .stats(period, DashboardApi::today())
        .await?;
    Ok(Json(stats))
}

async fn comparisons_handler(
    State(state): State<AppState>,
    Query(query): Query<ComparisonQuery>,
) -> ApiResult<Json<ComparisonReport>> {
    let comparison = DashboardApi::parse_comparison(query.kind.as_deref())?;
    let report = state
        .dashboard_api
        .comparisons(comparison, DashboardApi::today())
        .await?;
    Ok(Json(report))
}
