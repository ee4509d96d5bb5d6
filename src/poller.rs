//! The update orchestrator.
//!
//! One `update` invocation ends in one of three observable outcomes:
//! count rendered and alarm re-armed (online success), error rendered and
//! alarm re-armed at the default cadence (online failure), or an offline
//! warning with no re-arm (recovery rides the connectivity-restored event).
//! The poller must never silently stop: every non-offline path re-arms.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::badge::BadgeRenderer;
use crate::error::LookoutError;
use crate::feed::NotificationFeed;
use crate::freshness::ChangeDetector;
use crate::platform::Connectivity;
use crate::scheduler::AlarmScheduler;

/// Top-level poll reconciliation.
///
/// Cheap to clone; every event that triggers a poll runs on its own clone,
/// and overlapping invocations are deliberately not excluded.
#[derive(Clone)]
pub struct Poller {
    feed: Arc<dyn NotificationFeed>,
    badge: Arc<dyn BadgeRenderer>,
    connectivity: Arc<dyn Connectivity>,
    scheduler: Arc<AlarmScheduler>,
    detector: Arc<ChangeDetector>,
}

impl Poller {
    /// Create a poller over the given collaborators.
    pub fn new(
        feed: Arc<dyn NotificationFeed>,
        badge: Arc<dyn BadgeRenderer>,
        connectivity: Arc<dyn Connectivity>,
        scheduler: Arc<AlarmScheduler>,
        detector: Arc<ChangeDetector>,
    ) -> Self {
        Self {
            feed,
            badge,
            connectivity,
            scheduler,
            detector,
        }
    }

    /// Run one poll cycle.
    pub async fn update(&self) {
        if !self.connectivity.is_online() {
            self.handle_offline();
            return;
        }

        match self.feed.notification_count().await {
            Ok(snapshot) => {
                debug!("feed responded: {snapshot:?}");
                self.badge.render_count(snapshot.count);

                // Two independent follow-ups, fired without a join: cadence
                // handling does not gate marker handling and neither blocks
                // the caller. Completion order is unspecified.
                let scheduler = Arc::clone(&self.scheduler);
                let interval = snapshot.interval_secs;
                tokio::spawn(async move {
                    scheduler.schedule_next(Some(interval)).await;
                });

                let detector = Arc::clone(&self.detector);
                let marker = snapshot.last_modified;
                tokio::spawn(async move {
                    detector.handle_last_modified(&marker).await;
                });
            }
            Err(e) => self.handle_error(&LookoutError::Feed(e.to_string())).await,
        }
    }

    /// Recover from a failed poll: re-arm at the default cadence so polling
    /// continues, then show the error.
    pub async fn handle_error(&self, error: &LookoutError) {
        warn!("poll failed: {error}");
        self.scheduler.schedule_next(None).await;
        self.badge.render_error(&error.to_string());
    }

    /// Show the offline warning. No re-arm here: the connectivity-restored
    /// event (or an already pending alarm) resumes polling.
    pub fn handle_offline(&self) {
        self.badge.render_warning("offline");
    }
}
