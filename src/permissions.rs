//! Permission registry for capability-gated event bindings.
//!
//! The host platform grants capabilities individually; listener bindings
//! that depend on a capability are re-evaluated whenever the grant set may
//! have changed. A missing grant is `false`, never an error.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use std::sync::Mutex;

/// A host capability the poller can be granted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionKind {
    /// Desktop notification delivery and notification click events.
    Notifications,
    /// Tab inspection, required for the navigation re-poll binding.
    Tabs,
}

impl PermissionKind {
    /// Return all permission variants.
    pub fn all() -> &'static [PermissionKind] {
        &[PermissionKind::Notifications, PermissionKind::Tabs]
    }
}

impl fmt::Display for PermissionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            PermissionKind::Notifications => "notifications",
            PermissionKind::Tabs => "tabs",
        };
        f.write_str(s)
    }
}

/// Error returned when parsing an unknown permission name.
#[derive(Debug, Clone, thiserror::Error)]
#[error("unknown permission: {0}")]
pub struct PermissionParseError(String);

impl FromStr for PermissionKind {
    type Err = PermissionParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "notifications" => Ok(PermissionKind::Notifications),
            "tabs" => Ok(PermissionKind::Tabs),
            _ => Err(PermissionParseError(s.to_owned())),
        }
    }
}

/// Queries the host for granted permissions.
#[async_trait]
pub trait PermissionService: Send + Sync {
    /// Returns `true` when the permission is currently granted.
    async fn query(&self, kind: PermissionKind) -> bool;
}

/// Permission service backed by an in-process grant set.
///
/// Suitable for tests and for hosts that resolve grants ahead of time.
#[derive(Debug, Default)]
pub struct StaticPermissions {
    granted: Mutex<HashSet<PermissionKind>>,
}

impl StaticPermissions {
    /// Create a service with no grants.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a service with the given grants.
    pub fn with_granted(kinds: &[PermissionKind]) -> Self {
        Self {
            granted: Mutex::new(kinds.iter().copied().collect()),
        }
    }

    /// Grant a permission.
    pub fn grant(&self, kind: PermissionKind) {
        if let Ok(mut granted) = self.granted.lock() {
            granted.insert(kind);
        }
    }

    /// Revoke a permission.
    pub fn revoke(&self, kind: PermissionKind) {
        if let Ok(mut granted) = self.granted.lock() {
            granted.remove(&kind);
        }
    }
}

#[async_trait]
impl PermissionService for StaticPermissions {
    async fn query(&self, kind: PermissionKind) -> bool {
        self.granted
            .lock()
            .map(|granted| granted.contains(&kind))
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn display_round_trips_through_from_str() {
        for kind in PermissionKind::all() {
            let parsed: PermissionKind = kind.to_string().parse().unwrap();
            assert_eq!(parsed, *kind);
        }
    }

    #[test]
    fn from_str_rejects_unknown_names() {
        assert!("bookmarks".parse::<PermissionKind>().is_err());
    }

    #[test]
    fn serde_uses_snake_case_names() {
        let json = serde_json::to_string(&PermissionKind::Notifications).unwrap();
        assert_eq!(json, r#""notifications""#);
        let parsed: PermissionKind = serde_json::from_str(r#""tabs""#).unwrap();
        assert_eq!(parsed, PermissionKind::Tabs);
    }

    #[tokio::test]
    async fn static_service_reflects_grant_and_revoke() {
        let service = StaticPermissions::new();
        assert!(!service.query(PermissionKind::Tabs).await);

        service.grant(PermissionKind::Tabs);
        assert!(service.query(PermissionKind::Tabs).await);

        service.revoke(PermissionKind::Tabs);
        assert!(!service.query(PermissionKind::Tabs).await);
    }
}
