//! Change detection against the feed's freshness marker.
//!
//! The marker is an opaque token: any difference from the stored value, in
//! either direction, counts as a change. The stored default is the empty
//! string, so a fresh install always differs from a real server marker and
//! the first poll triggers exactly one notification check without a
//! first-run special case.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::notify::NotificationDispatcher;
use crate::options::{OptionsProvider, Preferences};
use crate::store::StateStore;

/// Decides whether a poll's marker warrants surfacing notifications.
pub struct ChangeDetector {
    store: Arc<dyn StateStore>,
    options: Arc<dyn OptionsProvider>,
    dispatcher: Arc<dyn NotificationDispatcher>,
}

impl ChangeDetector {
    /// Create a detector over the given collaborators.
    pub fn new(
        store: Arc<dyn StateStore>,
        options: Arc<dyn OptionsProvider>,
        dispatcher: Arc<dyn NotificationDispatcher>,
    ) -> Self {
        Self {
            store,
            options,
            dispatcher,
        }
    }

    /// Compare `new_marker` against the stored marker; on change, surface
    /// notifications newer than the old marker (when a notification surface
    /// is enabled) and persist the new marker.
    ///
    /// The marker is persisted whenever it changed, regardless of whether
    /// notifications were surfaced, so drift never re-fires on the next
    /// cycle. A failing dispatcher is logged and does not hold the marker
    /// back either.
    pub async fn handle_last_modified(&self, new_marker: &str) {
        let stored = self.store.last_modified().await.unwrap_or_default();
        if new_marker == stored {
            return;
        }

        debug!("feed marker changed");
        let prefs = match self.options.get_all().await {
            Ok(prefs) => prefs,
            Err(e) => {
                warn!("cannot read preferences, skipping notification check: {e}");
                Preferences::default()
            }
        };

        if prefs.wants_notifications() {
            if let Err(e) = self.dispatcher.check_notifications(&stored).await {
                warn!("notification check failed: {e}");
            }
        }

        self.store.set_last_modified(new_marker.to_owned()).await;
    }
}
