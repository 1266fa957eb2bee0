use std::sync::Arc;

use axum::{extract::State, http::StatusCode, routing::post, Extension, Json, Router};
use rust_decimal::Decimal;
use serde::Serialize;

use papertrade_core::constants::DISPLAY_DECIMAL_PRECISION;
use papertrade_core::positions::Position;
use papertrade_core::trading::{TradeOrder, TradeOutcome};
use papertrade_core::transactions::TradeSide;

use crate::auth::CurrentUser;
use crate::error::ApiResult;
use crate::state::AppState;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TradeResponse {
    message: String,
    cash_balance: Decimal,
    trade_total: Decimal,
    /// `null` when a sell closed the position entirely.
    position: Option<Position>,
}

impl TradeResponse {
    fn from_outcome(outcome: TradeOutcome) -> Self {
        let action = match outcome.side {
            TradeSide::Buy => "bought",
            TradeSide::Sell => "sold",
        };
        let message = format!(
            "Successfully {} {} shares of {} at ${}",
            action,
            outcome.quantity,
            outcome.symbol,
            outcome.price.round_dp(DISPLAY_DECIMAL_PRECISION)
        );
        Self {
            message,
            cash_balance: outcome.cash_balance,
            trade_total: outcome.trade_total,
            position: outcome.position,
        }
    }
}

async fn buy(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Json(order): Json<TradeOrder>,
) -> ApiResult<(StatusCode, Json<TradeResponse>)> {
    let outcome = state.trading_service.execute_buy(&current.id, order).await?;
    Ok((
        StatusCode::CREATED,
        Json(TradeResponse::from_outcome(outcome)),
    ))
}

async fn sell(
    State(state): State<Arc<AppState>>,
    Extension(current): Extension<CurrentUser>,
    Json(order): Json<TradeOrder>,
) -> ApiResult<Json<TradeResponse>> {
    let outcome = state
        .trading_service
        .execute_sell(&current.id, order)
        .await?;
    Ok(Json(TradeResponse::from_outcome(outcome)))
}

pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/trading/buy", post(buy))
        .route("/trading/sell", post(sell))
}
