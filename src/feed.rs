//! Notification feed client contract.
//!
//! The wire client lives with the host; the core only depends on this
//! contract and on the snapshot shape below.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// One poll's worth of feed state.
///
/// Ephemeral: only `interval_secs` and `last_modified` feed the persisted
/// state, and only through the scheduler and change detector.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedSnapshot {
    /// Unread notification count.
    pub count: u64,
    /// Server-suggested poll cadence in seconds.
    pub interval_secs: u64,
    /// Opaque freshness marker. Equality-compared, never ordered.
    pub last_modified: String,
}

/// Fetches notification state from the remote feed.
#[async_trait]
pub trait NotificationFeed: Send + Sync {
    /// Fetch the current count, cadence, and freshness marker.
    async fn notification_count(&self) -> anyhow::Result<FeedSnapshot>;

    /// URL of the notification inbox, used by the action-click handler.
    async fn feed_url(&self) -> anyhow::Result<String>;
}
