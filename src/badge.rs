//! Badge state model and renderer contract.

use std::fmt;

/// The badge's mutually exclusive visual states.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BadgeState {
    /// Unread notification count.
    Count(u64),
    /// Feed fetch or decode failure.
    Error(String),
    /// Environment warning, e.g. `offline`.
    Warning(&'static str),
}

impl fmt::Display for BadgeState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BadgeState::Count(count) => write!(f, "count={count}"),
            BadgeState::Error(error) => write!(f, "error={error}"),
            BadgeState::Warning(kind) => write!(f, "warning={kind}"),
        }
    }
}

/// Renders badge states onto the host surface.
///
/// Side-effecting and infallible from the core's point of view; a renderer
/// that can fail must degrade internally.
pub trait BadgeRenderer: Send + Sync {
    /// Show the unread count.
    fn render_count(&self, count: u64);

    /// Show an error state.
    fn render_error(&self, error: &str);

    /// Show a warning state of the given kind.
    fn render_warning(&self, kind: &str);
}

/// Renderer that reports badge states through the log.
///
/// The default for headless deployments and the fallback while a host
/// surface is not attached.
#[derive(Debug, Default)]
pub struct LogBadge;

impl BadgeRenderer for LogBadge {
    fn render_count(&self, count: u64) {
        tracing::info!("badge {}", BadgeState::Count(count));
    }

    fn render_error(&self, error: &str) {
        tracing::warn!("badge {}", BadgeState::Error(error.to_owned()));
    }

    fn render_warning(&self, kind: &str) {
        tracing::warn!("badge warning={kind}");
    }
}
