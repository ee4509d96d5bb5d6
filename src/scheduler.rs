//! Alarm scheduling against the server-suggested cadence.
//!
//! Every poll ends by re-arming the wake-up timer from the cadence the feed
//! reported, falling back to the default when the feed did not supply one.
//! The cadence is persisted only when it changed, so steady-state polling
//! performs no storage writes.

use std::sync::Arc;
use std::time::Duration;
use tracing::debug;

use crate::platform::AlarmClock;
use crate::store::StateStore;

/// Computes and re-arms the next wake-up.
pub struct AlarmScheduler {
    store: Arc<dyn StateStore>,
    clock: Arc<dyn AlarmClock>,
    default_interval_secs: u64,
}

impl AlarmScheduler {
    /// Create a scheduler over the given store and alarm clock.
    pub fn new(
        store: Arc<dyn StateStore>,
        clock: Arc<dyn AlarmClock>,
        default_interval_secs: u64,
    ) -> Self {
        Self {
            store,
            clock,
            default_interval_secs,
        }
    }

    /// Re-arm the wake-up timer.
    ///
    /// Uses `observed_interval_secs` when the feed supplied one, otherwise
    /// the default cadence. Persists the effective cadence only when it
    /// differs from the stored one. Storage trouble never blocks arming.
    pub async fn schedule_next(&self, observed_interval_secs: Option<u64>) {
        let stored = self
            .store
            .interval()
            .await
            .unwrap_or(self.default_interval_secs);
        let effective = observed_interval_secs.unwrap_or(self.default_interval_secs);

        if effective != stored {
            self.store.set_interval(effective).await;
        }

        let minutes = delay_minutes(effective);
        debug!("arming next poll in {minutes}m (cadence {effective}s)");
        self.clock.arm(Duration::from_secs(minutes * 60));
    }
}

/// Delay for the platform alarm, in whole minutes.
///
/// Platform alarms reject sub-minute delays, so the cadence is rounded up,
/// never down.
pub fn delay_minutes(interval_secs: u64) -> u64 {
    interval_secs.div_ceil(60).max(1)
}
