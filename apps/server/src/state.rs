use std::str::FromStr;
use std::sync::Arc;

use rand::{rngs::OsRng, RngCore};
use rust_decimal::Decimal;

use papertrade_core::{
    portfolios::{PortfolioService, PortfolioServiceTrait},
    quotes::PriceResolver,
    snapshots::{SnapshotService, SnapshotServiceTrait},
    stocks::{StockService, StockServiceTrait},
    trading::{TradingService, TradingServiceTrait},
    transactions::TransactionRepositoryTrait,
    users::{UserService, UserServiceTrait},
    valuation::{ValuationService, ValuationServiceTrait},
};
use papertrade_market_data::{FinnhubProvider, MarketDataProvider};
use papertrade_storage_sqlite::{
    db::{self, write_actor},
    portfolios::PortfolioRepository,
    positions::PositionRepository,
    snapshots::SnapshotRepository,
    stocks::StockRepository,
    transactions::TransactionRepository,
    users::UserRepository,
};

use crate::{auth::AuthManager, config::Config};

pub struct AppState {
    pub user_service: Arc<dyn UserServiceTrait>,
    pub portfolio_service: Arc<dyn PortfolioServiceTrait>,
    pub stock_service: Arc<dyn StockServiceTrait>,
    pub trading_service: Arc<dyn TradingServiceTrait>,
    pub valuation_service: Arc<dyn ValuationServiceTrait>,
    pub snapshot_service: Arc<dyn SnapshotServiceTrait>,
    /// The ledger has no service layer; handlers read it directly after
    /// an ownership check against the portfolio service.
    pub transaction_repository: Arc<dyn TransactionRepositoryTrait>,
    pub db_path: String,
    pub auth: Arc<AuthManager>,
}

pub async fn build_state(config: &Config) -> anyhow::Result<Arc<AppState>> {
    // Ensure DATABASE_URL aligns with PT_DB_PATH so storage picks the right file
    std::env::set_var("DATABASE_URL", &config.db_path);
    let db_path = db::init(&config.db_path)?;
    tracing::info!("Database path in use: {}", db_path);

    let pool = db::create_pool(&db_path)?;
    db::run_migrations(&pool)?;
    let writer = write_actor::spawn_writer((*pool).clone());

    let user_repository = Arc::new(UserRepository::new(pool.clone(), writer.clone()));
    let portfolio_repository = Arc::new(PortfolioRepository::new(pool.clone(), writer.clone()));
    let stock_repository = Arc::new(StockRepository::new(pool.clone(), writer.clone()));
    let position_repository = Arc::new(PositionRepository::new(pool.clone()));
    let transaction_repository = Arc::new(TransactionRepository::new(pool.clone()));
    let snapshot_repository = Arc::new(SnapshotRepository::new(pool.clone(), writer.clone()));

    let provider: Arc<dyn MarketDataProvider> =
        Arc::new(FinnhubProvider::new(config.finnhub_api_key.clone()));

    let user_service = Arc::new(UserService::new(user_repository.clone()));

    let starting_cash = Decimal::from_str(&config.starting_cash).map_err(|e| {
        anyhow::anyhow!("Invalid PT_STARTING_CASH '{}': {e}", config.starting_cash)
    })?;
    let portfolio_service = Arc::new(PortfolioService::new(
        portfolio_repository.clone(),
        starting_cash,
    ));

    let stock_service = Arc::new(StockService::new(
        stock_repository.clone(),
        provider.clone(),
    ));

    let valuation_service = Arc::new(ValuationService::new(
        portfolio_repository.clone(),
        position_repository.clone(),
    ));

    let snapshot_service = Arc::new(SnapshotService::new(
        portfolio_repository.clone(),
        position_repository.clone(),
        snapshot_repository.clone(),
    ));

    let trading_service = Arc::new(TradingService::new(
        portfolio_repository.clone(),
        stock_repository.clone(),
        position_repository.clone(),
        transaction_repository.clone(),
        PriceResolver::new(provider.clone()),
        writer.clone(),
    ));

    let jwt_secret = match &config.jwt_secret {
        Some(secret) => secret.as_bytes().to_vec(),
        None => {
            tracing::warn!(
                "PT_JWT_SECRET is not set; tokens are signed with an ephemeral secret and expire on restart"
            );
            let mut bytes = [0u8; 32];
            OsRng.fill_bytes(&mut bytes);
            bytes.to_vec()
        }
    };
    let auth = Arc::new(AuthManager::new(&jwt_secret, config.token_ttl));

    Ok(Arc::new(AppState {
        user_service,
        portfolio_service,
        stock_service,
        trading_service,
        valuation_service,
        snapshot_service,
        transaction_repository,
        db_path,
        auth,
    }))
}
