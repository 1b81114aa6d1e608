//! Periodic action request publisher

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tokio::time::{interval, Duration, MissedTickBehavior};
use tracing::info;

use crate::config::PublisherConfig;

/// Request to play the pos file named by `action`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionRequest {
    pub action: String,
}

/// Send an action request every `interval_secs` until the receiver goes away
///
/// The first request goes out one full interval after start.
pub async fn run(config: PublisherConfig, tx: mpsc::Sender<ActionRequest>) {
    let mut ticker = interval(Duration::from_secs(config.interval_secs));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    ticker.tick().await;

    info!(
        action = %config.action,
        interval_secs = config.interval_secs,
        "Action publisher started"
    );

    loop {
        ticker.tick().await;

        let request = ActionRequest {
            action: config.action.clone(),
        };
        info!(action = %request.action, "Publishing action request");

        if tx.send(request).await.is_err() {
            info!("Action request receiver closed, stopping publisher");
            return;
        }
    }
}
