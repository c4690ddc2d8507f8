use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use super::registry::{CandidateRegistry, RegistryError};

/// Background hygiene worker that folds the cached lock flag back in line
/// with the expiry timestamp.
///
/// Every read path already computes lock validity from the expiry, so a
/// missed or delayed pass only leaves a stale display flag, never a wrong
/// lock decision.
pub struct ExpirySweeper<R> {
    registry: Arc<R>,
    cadence: Duration,
}

impl<R> ExpirySweeper<R>
where
    R: CandidateRegistry + 'static,
{
    pub fn new(registry: Arc<R>, cadence: Duration) -> Self {
        Self { registry, cadence }
    }

    /// One conditional bulk pass. Idempotent, commutes with live writers.
    pub fn sweep_once(&self, now: DateTime<Utc>) -> Result<usize, RegistryError> {
        self.registry.clear_expired_locks(now)
    }

    /// Runs the pass on a fixed cadence until the task is dropped.
    pub async fn run(self) {
        let mut ticker = tokio::time::interval(self.cadence);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            match self.sweep_once(Utc::now()) {
                Ok(0) => {}
                Ok(cleared) => info!(cleared, "expired candidate locks cleared"),
                Err(err) => warn!(error = %err, "lock sweep failed"),
            }
        }
    }
}
