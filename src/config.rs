//! Configuration for the poller core.

use serde::{Deserialize, Serialize};

/// Top-level configuration for the notification poller.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PollerConfig {
    /// Fallback poll cadence in seconds, used when the feed response does
    /// not carry an interval and when nothing is persisted yet.
    pub default_interval_secs: u64,
    /// Delay before the bootstrap poll fires after startup, in milliseconds.
    pub bootstrap_delay_ms: u64,
    /// Settle delay after a matching navigation before re-polling, in
    /// milliseconds. Lets the page's own state land before we re-read it.
    pub navigation_settle_ms: u64,
    /// Feed host used for target-page matching (e.g. `github.com`).
    pub feed_host: String,
    /// Settings surface opened on fresh installs. `None` skips the open.
    pub settings_url: Option<String>,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            default_interval_secs: 60,
            // Platform alarms have minute granularity; the bootstrap poll is
            // a near-term one-shot so startup does not wait a full interval.
            bootstrap_delay_ms: 2_000,
            navigation_settle_ms: 1_000,
            feed_host: "github.com".to_owned(),
            settings_url: None,
        }
    }
}
