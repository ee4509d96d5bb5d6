//! Desktop notification dispatch and tab service contracts.

use async_trait::async_trait;

/// Surfaces new notifications to the user.
#[async_trait]
pub trait NotificationDispatcher: Send + Sync {
    /// Fetch and display notifications newer than the given marker.
    async fn check_notifications(&self, since: &str) -> anyhow::Result<()>;

    /// Open the item behind a clicked desktop notification.
    async fn open_notification(&self, id: &str) -> anyhow::Result<()>;
}

/// Opens tabs on the host.
#[async_trait]
pub trait TabService: Send + Sync {
    /// Open (or focus) a tab at the given URL.
    async fn open_tab(&self, url: &str) -> anyhow::Result<()>;
}
