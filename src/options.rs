//! User preference snapshot and provider contract.
//!
//! Preferences are owned by the host's options surface; the core reads a
//! fresh snapshot each time a decision depends on one and never caches it.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Mutex;

/// Preferences consulted by the poller core.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    /// Surface desktop notifications when the feed marker changes.
    pub show_desktop_notif: bool,
    /// Play a sound when the feed marker changes.
    pub play_notif_sound: bool,
    /// Re-poll after navigating to a target page.
    pub update_count_on_navigation: bool,
}

impl Preferences {
    /// Returns `true` when any notification surface is enabled.
    pub fn wants_notifications(&self) -> bool {
        self.show_desktop_notif || self.play_notif_sound
    }
}

/// Supplies the current preference snapshot.
#[async_trait]
pub trait OptionsProvider: Send + Sync {
    /// Fetch all preferences.
    async fn get_all(&self) -> anyhow::Result<Preferences>;
}

/// Options provider backed by an in-process snapshot.
///
/// Suitable for tests and for hosts that push preference changes into the
/// process rather than serving reads.
#[derive(Debug, Default)]
pub struct StaticOptions {
    prefs: Mutex<Preferences>,
}

impl StaticOptions {
    /// Create a provider with all preferences off.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a provider with the given snapshot.
    pub fn with_prefs(prefs: Preferences) -> Self {
        Self {
            prefs: Mutex::new(prefs),
        }
    }

    /// Replace the snapshot.
    pub fn set(&self, prefs: Preferences) {
        if let Ok(mut current) = self.prefs.lock() {
            *current = prefs;
        }
    }
}

#[async_trait]
impl OptionsProvider for StaticOptions {
    async fn get_all(&self) -> anyhow::Result<Preferences> {
        Ok(self.prefs.lock().map(|prefs| *prefs).unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn defaults_are_all_off() {
        let prefs = Preferences::default();
        assert!(!prefs.show_desktop_notif);
        assert!(!prefs.play_notif_sound);
        assert!(!prefs.update_count_on_navigation);
        assert!(!prefs.wants_notifications());
    }

    #[test]
    fn either_notification_surface_counts() {
        let desktop = Preferences {
            show_desktop_notif: true,
            ..Default::default()
        };
        let sound = Preferences {
            play_notif_sound: true,
            ..Default::default()
        };
        assert!(desktop.wants_notifications());
        assert!(sound.wants_notifications());
    }

    #[tokio::test]
    async fn static_provider_serves_latest_snapshot() {
        let options = StaticOptions::new();
        assert_eq!(options.get_all().await.unwrap(), Preferences::default());

        let updated = Preferences {
            update_count_on_navigation: true,
            ..Default::default()
        };
        options.set(updated);
        assert_eq!(options.get_all().await.unwrap(), updated);
    }
}
