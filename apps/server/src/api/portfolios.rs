use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use serde::Deserialize;

use papertrade_core::constants::DEFAULT_PAGE_SIZE;
use papertrade_core::portfolios::{NewPortfolio, Portfolio, PortfolioUpdate};
use papertrade_core::snapshots::PortfolioSnapshot;
use papertrade_core::transactions::TransactionEntry;
use papertrade_core::valuation::{PortfolioDetail, PortfolioOverview};

use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::state::AppState;

/// All portfolios of the caller, valued at cached prices.
async fn list_portfolios(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
) -> ApiResult<Json<Vec<PortfolioOverview>>> {
    let overviews = state.valuation_service.list_overviews(&current.id)?;
    Ok(Json(overviews))
}

async fn create_portfolio(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<NewPortfolio>,
) -> ApiResult<(StatusCode, Json<Portfolio>)> {
    let portfolio = state
        .portfolio_service
        .create_portfolio(&current.id, payload)
        .await?;
    Ok((StatusCode::CREATED, Json(portfolio)))
}

/// One portfolio with its valued holdings.
async fn get_portfolio(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<PortfolioDetail>> {
    let detail = state.valuation_service.portfolio_detail(&current.id, &id)?;
    Ok(Json(detail))
}

async fn update_portfolio(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    Json(payload): Json<PortfolioUpdate>,
) -> ApiResult<Json<Portfolio>> {
    let portfolio = state
        .portfolio_service
        .update_portfolio(&current.id, &id, payload)
        .await?;
    Ok(Json(portfolio))
}

async fn delete_portfolio(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<StatusCode> {
    state
        .portfolio_service
        .delete_portfolio(&current.id, &id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[derive(Deserialize)]
struct PageQuery {
    limit: Option<i64>,
    offset: Option<i64>,
}

/// Trade history, newest first. The ownership check runs before the
/// ledger is touched, so foreign portfolios read as not found.
async fn list_transactions(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Json<Vec<TransactionEntry>>> {
    state.portfolio_service.get_portfolio(&current.id, &id)?;

    let limit = page.limit.unwrap_or(DEFAULT_PAGE_SIZE).max(1);
    let offset = page.offset.unwrap_or(0).max(0);
    let entries = state
        .transaction_repository
        .list_by_portfolio(&id, limit, offset)?;
    Ok(Json(entries))
}

async fn list_snapshots(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<PortfolioSnapshot>>> {
    let snapshots = state.snapshot_service.get_snapshots(&current.id, &id)?;
    Ok(Json(snapshots))
}

/// Record an on-demand snapshot of today's value. A second call on the
/// same day conflicts.
async fn create_snapshot(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> ApiResult<(StatusCode, Json<PortfolioSnapshot>)> {
    let snapshot = state
        .snapshot_service
        .create_snapshot(&current.id, &id)
        .await?;
    Ok((StatusCode::CREATED, Json(snapshot)))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/portfolios", get(list_portfolios).post(create_portfolio))
        .route(
            "/portfolios/{id}",
            get(get_portfolio)
                .put(update_portfolio)
                .delete(delete_portfolio),
        )
        .route("/portfolios/{id}/transactions", get(list_transactions))
        .route(
            "/portfolios/{id}/snapshots",
            get(list_snapshots).post(create_snapshot),
        )
}
