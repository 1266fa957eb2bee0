use tracing_subscriber::EnvFilter;

use papertrade_server::config::Config;
use papertrade_server::{api, build_state, start_snapshot_scheduler};

/// RUST_LOG controls the filter; PT_LOG_FORMAT=json switches to line-
/// delimited JSON for log shippers.
fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let want_json = std::env::var("PT_LOG_FORMAT").is_ok_and(|v| v.eq_ignore_ascii_case("json"));

    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if want_json {
        builder.json().flatten_event(true).init();
    } else {
        builder.with_target(true).init();
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();
    init_tracing();

    let state = build_state(&config).await?;
    start_snapshot_scheduler(state.clone(), config.snapshot_interval);

    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!("listening on {}", config.listen_addr);
    axum::serve(listener, api::app_router(state, &config)).await?;
    Ok(())
}
