//! Background scheduler for daily portfolio snapshots.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::interval;
use tracing::{info, warn};

use crate::state::AppState;

/// Initial delay before the first run (60 seconds to let the server fully start)
const INITIAL_DELAY_SECS: u64 = 60;

/// Starts the background snapshot scheduler.
///
/// Portfolios already snapshotted today are counted as skipped, so a
/// restart mid-day never produces duplicate rows.
pub fn start_snapshot_scheduler(state: Arc<AppState>, period: Duration) {
    tokio::spawn(async move {
        info!("Snapshot scheduler started (every {}s)", period.as_secs());

        tokio::time::sleep(Duration::from_secs(INITIAL_DELAY_SECS)).await;

        let mut tick = interval(period);
        loop {
            tick.tick().await;
            run_scheduled_snapshots(&state).await;
        }
    });
}

/// Runs a single scheduled snapshot pass over every portfolio.
async fn run_scheduled_snapshots(state: &Arc<AppState>) {
    info!("Recording scheduled portfolio snapshots...");

    let report = state.snapshot_service.create_daily_snapshots().await;
    if report.failed > 0 {
        warn!(
            "Snapshot run finished with failures: {} created, {} skipped, {} failed",
            report.created, report.skipped, report.failed
        );
    } else {
        info!(
            "Snapshot run complete: {} created, {} skipped",
            report.created, report.skipped
        );
    }
}
