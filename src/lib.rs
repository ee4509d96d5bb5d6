//! Lookout: background notification poller.
//!
//! A long-lived, event-driven service that polls a remote feed for a
//! notification count, renders the outcome to a badge surface, surfaces
//! desktop notifications when the feed's freshness marker changes, and
//! re-polls on navigation, connectivity, and host events.
//!
//! # Architecture
//!
//! The core is a reconciliation loop over injected collaborators:
//! - **Platform events**: one mpsc stream drives everything; tests send
//!   synthetic events instead of a real host
//! - **Update orchestrator**: one poll cycle (fetch, render, then fire the
//!   scheduler and change detector as independent tasks)
//! - **Alarm scheduler**: re-arms the one-shot wake-up from the
//!   server-suggested cadence, persisting it only on change
//! - **Change detector**: equality-compares the freshness marker and
//!   surfaces notifications when a notification surface is enabled
//! - **Subscriptions**: permission- and preference-gated listener bindings,
//!   reconciled by diff so stale bindings are detached

pub mod badge;
pub mod config;
pub mod error;
pub mod feed;
pub mod freshness;
pub mod notify;
pub mod options;
pub mod permissions;
pub mod platform;
pub mod poller;
pub mod scheduler;
pub mod store;
pub mod target;
pub mod wiring;

pub use badge::{BadgeRenderer, BadgeState, LogBadge};
pub use config::PollerConfig;
pub use error::{LookoutError, Result};
pub use feed::{FeedSnapshot, NotificationFeed};
pub use options::{OptionsProvider, Preferences};
pub use platform::{EventSender, InstallReason, PlatformEvent, TabStatus};
pub use poller::Poller;
pub use wiring::{Collaborators, EventWiring};
