use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;

use papertrade_core::stocks::Stock;
use papertrade_market_data::SymbolSearchResult;

use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Deserialize)]
struct StockListQuery {
    query: Option<String>,
    // `symbol` is accepted as an alias for older clients
    symbol: Option<String>,
}

async fn list_stocks(
    State(state): State<Arc<AppState>>,
    Query(q): Query<StockListQuery>,
) -> ApiResult<Json<Vec<Stock>>> {
    let filter = q.query.as_deref().or(q.symbol.as_deref());
    let stocks = state.stock_service.list_stocks(filter)?;
    Ok(Json(stocks))
}

async fn get_stock(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> ApiResult<Json<Stock>> {
    let stock = state.stock_service.get_stock(&symbol)?;
    Ok(Json(stock))
}

#[derive(Deserialize)]
struct SearchRequest {
    symbol: String,
}

/// Resolve a symbol to a stock row, pulling quote and profile from the
/// provider when it is not cached yet.
async fn search_stock(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<SearchRequest>,
) -> ApiResult<Json<Stock>> {
    let stock = state.stock_service.search(&payload.symbol).await?;
    Ok(Json(stock))
}

async fn refresh_price(
    State(state): State<Arc<AppState>>,
    Path(symbol): Path<String>,
) -> ApiResult<Json<Stock>> {
    let stock = state.stock_service.refresh_price(&symbol).await?;
    Ok(Json(stock))
}

#[derive(Deserialize)]
struct LookupQuery {
    query: String,
}

/// Free-text symbol search against the quote provider. Nothing is
/// persisted.
async fn lookup_symbols(
    State(state): State<Arc<AppState>>,
    Query(q): Query<LookupQuery>,
) -> ApiResult<Json<Vec<SymbolSearchResult>>> {
    let results = state.stock_service.lookup_symbols(&q.query).await?;
    Ok(Json(results))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/stocks", get(list_stocks))
        .route("/stocks/search", post(search_stock))
        .route("/stocks/lookup", get(lookup_symbols))
        .route("/stocks/{symbol}", get(get_stock))
        .route("/stocks/{symbol}/refresh-price", post(refresh_price))
}
