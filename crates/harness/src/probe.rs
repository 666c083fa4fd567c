//! Endpoint availability probing
//!
//! The suite runner checks that the application and the WebDriver endpoint
//! answer before provisioning any session, so an absent environment turns
//! into a skipped suite instead of a wall of provisioning failures.

use std::time::Duration;

use tokio::time::sleep;
use tracing::{info, warn};

use crate::error::{HarnessError, HarnessResult};

const PROBE_INTERVAL: Duration = Duration::from_millis(500);

/// Poll a URL until it answers or the deadline elapses.
pub async fn wait_until_reachable(url: &str, deadline: Duration) -> HarnessResult<()> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(2))
        .build()?;

    let start = std::time::Instant::now();
    let mut attempts = 0;

    loop {
        attempts += 1;

        match client.get(url).send().await {
            // Redirects count as alive: SPAs commonly bounce "/" to a route.
            Ok(resp) if resp.status().is_success() || resp.status().is_redirection() => {
                return Ok(());
            }
            Ok(resp) => {
                warn!("Probe of {} returned {}", url, resp.status());
            }
            Err(e) => {
                if attempts == 1 {
                    info!("Waiting for {} ...", url);
                }
                // Connection refused is expected while the endpoint is down
                if !e.is_connect() {
                    warn!("Probe error for {}: {}", url, e);
                }
            }
        }

        if start.elapsed() >= deadline {
            return Err(HarnessError::Unreachable(attempts));
        }
        sleep(PROBE_INTERVAL).await;
    }
}

/// Single bounded check used for the run-or-skip decision.
pub async fn is_reachable(url: &str) -> bool {
    wait_until_reachable(url, Duration::from_secs(3)).await.is_ok()
}
