//! Platform primitives behind the poller.
//!
//! The host platform (timer wake-ups, connectivity signals, tab and install
//! events, inbound messages) is modeled as a single injected event stream so
//! the whole system can be driven by synthetic events in tests. Alarms and
//! connectivity are the only primitives the core also calls *into*, so each
//! gets its own contract.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;
use tokio::sync::mpsc;

/// Why the install event fired.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallReason {
    /// Fresh install.
    Install,
    /// Upgrade of an existing install.
    Update,
    /// Host browser upgrade reloaded the process.
    BrowserUpdate,
}

/// Load state reported with a tab update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TabStatus {
    /// Still loading; ignored by the navigation gate.
    Loading,
    /// Finished loading.
    Complete,
}

/// An event delivered by the host platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlatformEvent {
    /// A previously armed alarm fired.
    Alarm,
    /// Connectivity restored.
    Online,
    /// Connectivity lost.
    Offline,
    /// Inbound message from another part of the host process.
    Message(String),
    /// The process was installed, upgraded, or reloaded.
    Installed {
        /// Why the event fired.
        reason: InstallReason,
    },
    /// A tab changed load state.
    TabUpdated {
        /// Load state of the tab.
        status: TabStatus,
        /// URL the tab is showing.
        url: String,
    },
    /// The user clicked a desktop notification.
    NotificationClicked {
        /// Host identifier of the clicked notification.
        id: String,
    },
    /// The granted-permission set grew. Only some platform families emit
    /// this; the others re-sync through the message path.
    PermissionsAdded,
    /// The user clicked the badge surface.
    ActionClicked,
    /// Stop the event loop.
    Shutdown,
}

/// Sending half of the platform event stream.
pub type EventSender = mpsc::UnboundedSender<PlatformEvent>;
/// Receiving half of the platform event stream.
pub type EventReceiver = mpsc::UnboundedReceiver<PlatformEvent>;

/// Create the platform event stream.
pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// One-shot wake-up timer.
pub trait AlarmClock: Send + Sync {
    /// Arm a wake-up after `delay`. Re-arming replaces the pending alarm,
    /// so at most one wake-up is outstanding.
    fn arm(&self, delay: Duration);
}

/// Alarm clock that emits [`PlatformEvent::Alarm`] from a tokio timer task.
#[derive(Debug)]
pub struct TokioAlarmClock {
    events: EventSender,
    pending: Mutex<Option<tokio::task::JoinHandle<()>>>,
}

impl TokioAlarmClock {
    /// Create an alarm clock that delivers into the given event stream.
    pub fn new(events: EventSender) -> Self {
        Self {
            events,
            pending: Mutex::new(None),
        }
    }
}

impl AlarmClock for TokioAlarmClock {
    fn arm(&self, delay: Duration) {
        let events = self.events.clone();
        let task = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            let _ = events.send(PlatformEvent::Alarm);
        });
        if let Ok(mut pending) = self.pending.lock() {
            if let Some(previous) = pending.replace(task) {
                previous.abort();
            }
        }
    }
}

/// Reports whether the host currently has connectivity.
pub trait Connectivity: Send + Sync {
    /// `true` when the host reports itself online.
    fn is_online(&self) -> bool;
}

/// Connectivity flag driven by the host's online/offline signals.
#[derive(Debug)]
pub struct SharedConnectivity {
    online: AtomicBool,
}

impl SharedConnectivity {
    /// Create a flag with the given initial state.
    pub fn new(online: bool) -> Self {
        Self {
            online: AtomicBool::new(online),
        }
    }

    /// Record a connectivity change.
    pub fn set_online(&self, online: bool) {
        self.online.store(online, Ordering::SeqCst);
    }
}

impl Connectivity for SharedConnectivity {
    fn is_online(&self) -> bool {
        self.online.load(Ordering::SeqCst)
    }
}
