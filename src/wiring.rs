//! Event wiring: listener reconciliation and the platform event loop.
//!
//! Listener bindings are capability- and preference-gated, so they are held
//! in an explicit subscription manager and *reconciled*: desired state is
//! recomputed and diffed against the current one, detaching stale bindings
//! instead of only adding new ones. The loop itself consumes the injected
//! platform event stream; every event that triggers a poll spawns an
//! independent task so a slow fetch never blocks later events, and
//! overlapping polls are deliberately possible.

use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::badge::BadgeRenderer;
use crate::config::PollerConfig;
use crate::feed::NotificationFeed;
use crate::freshness::ChangeDetector;
use crate::notify::{NotificationDispatcher, TabService};
use crate::options::OptionsProvider;
use crate::permissions::{PermissionKind, PermissionService};
use crate::platform::{
    AlarmClock, Connectivity, EventReceiver, EventSender, InstallReason, PlatformEvent, TabStatus,
    TokioAlarmClock, event_channel,
};
use crate::poller::Poller;
use crate::scheduler::AlarmScheduler;
use crate::store::StateStore;
use crate::target::is_target_page;

/// The capability-gated listener bindings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ListenerSet {
    /// Notification-click handler (notifications permission).
    pub notification_click: bool,
    /// Navigation re-poll handler (tabs permission + preference).
    pub navigation: bool,
}

/// Holds the current listener bindings and reconciles them against the
/// granted permissions and current preferences.
pub struct Subscriptions {
    options: Arc<dyn OptionsProvider>,
    permissions: Arc<dyn PermissionService>,
    bound: Mutex<ListenerSet>,
}

impl Subscriptions {
    /// Create a manager with no bindings attached.
    pub fn new(options: Arc<dyn OptionsProvider>, permissions: Arc<dyn PermissionService>) -> Self {
        Self {
            options,
            permissions,
            bound: Mutex::new(ListenerSet::default()),
        }
    }

    /// Bindings as of the last reconcile.
    pub fn current(&self) -> ListenerSet {
        self.bound.lock().map(|bound| *bound).unwrap_or_default()
    }

    /// Recompute desired bindings and swap them in.
    ///
    /// Idempotent: rerunning with unchanged permissions and preferences is a
    /// no-op. A binding whose permission or preference went away is
    /// detached, not leaked.
    pub async fn reconcile(&self) -> ListenerSet {
        let prefs = match self.options.get_all().await {
            Ok(prefs) => prefs,
            Err(e) => {
                warn!("cannot read preferences during reconcile: {e}");
                Default::default()
            }
        };

        let mut desired = ListenerSet::default();
        if self.permissions.query(PermissionKind::Notifications).await {
            desired.notification_click = true;
        }
        if self.permissions.query(PermissionKind::Tabs).await {
            desired.navigation = prefs.update_count_on_navigation;
        }

        let Ok(mut bound) = self.bound.lock() else {
            return desired;
        };
        if desired.notification_click != bound.notification_click {
            debug!(
                "{} notification-click listener",
                if desired.notification_click { "attached" } else { "detached" }
            );
        }
        if desired.navigation != bound.navigation {
            debug!(
                "{} navigation listener",
                if desired.navigation { "attached" } else { "detached" }
            );
        }
        *bound = desired;
        desired
    }
}

/// Everything the poller core consumes from its host.
pub struct Collaborators {
    /// Remote feed client.
    pub feed: Arc<dyn NotificationFeed>,
    /// Badge surface.
    pub badge: Arc<dyn BadgeRenderer>,
    /// Durable state.
    pub store: Arc<dyn StateStore>,
    /// Preference reads.
    pub options: Arc<dyn OptionsProvider>,
    /// Permission queries.
    pub permissions: Arc<dyn PermissionService>,
    /// Desktop notification surface.
    pub dispatcher: Arc<dyn NotificationDispatcher>,
    /// Tab opening.
    pub tabs: Arc<dyn TabService>,
    /// Connectivity flag. The host flips it before emitting
    /// [`PlatformEvent::Online`]/[`PlatformEvent::Offline`].
    pub connectivity: Arc<dyn Connectivity>,
}

/// The process-wide event loop: owns the poller, the subscription manager,
/// and the receiving half of the platform event stream.
pub struct EventWiring {
    config: PollerConfig,
    poller: Poller,
    subscriptions: Arc<Subscriptions>,
    dispatcher: Arc<dyn NotificationDispatcher>,
    tabs: Arc<dyn TabService>,
    feed: Arc<dyn NotificationFeed>,
    clock: Arc<dyn AlarmClock>,
    events: EventReceiver,
}

impl EventWiring {
    /// Wire the poller core. Returns the loop and the sender the host (or a
    /// test) uses to deliver platform events; alarms armed by the scheduler
    /// come back through the same stream.
    pub fn new(collab: Collaborators, config: PollerConfig) -> (Self, EventSender) {
        let (tx, rx) = event_channel();
        let clock: Arc<dyn AlarmClock> = Arc::new(TokioAlarmClock::new(tx.clone()));

        let scheduler = Arc::new(AlarmScheduler::new(
            collab.store.clone(),
            clock.clone(),
            config.default_interval_secs,
        ));
        let detector = Arc::new(ChangeDetector::new(
            collab.store.clone(),
            collab.options.clone(),
            collab.dispatcher.clone(),
        ));
        let poller = Poller::new(
            collab.feed.clone(),
            collab.badge,
            collab.connectivity,
            scheduler,
            detector,
        );
        let subscriptions = Arc::new(Subscriptions::new(collab.options, collab.permissions));

        let wiring = Self {
            config,
            poller,
            subscriptions,
            dispatcher: collab.dispatcher,
            tabs: collab.tabs,
            feed: collab.feed,
            clock,
            events: rx,
        };
        (wiring, tx)
    }

    /// Subscription manager handle, mainly for host-driven re-syncs.
    pub fn subscriptions(&self) -> Arc<Subscriptions> {
        Arc::clone(&self.subscriptions)
    }

    /// Run the event loop until [`PlatformEvent::Shutdown`] or until the
    /// sending half is dropped.
    ///
    /// Startup mirrors process launch: binds are reconciled, one poll runs
    /// immediately, and a near-term bootstrap alarm is armed so the first
    /// scheduled poll does not wait a full interval.
    pub async fn run(mut self) {
        info!("poller event loop starting");
        self.clock
            .arm(Duration::from_millis(self.config.bootstrap_delay_ms));
        self.subscriptions.reconcile().await;
        self.spawn_update();

        while let Some(event) = self.events.recv().await {
            if event == PlatformEvent::Shutdown {
                break;
            }
            self.dispatch(event).await;
        }
        info!("poller event loop stopped");
    }

    async fn dispatch(&self, event: PlatformEvent) {
        match event {
            // `update` re-checks connectivity itself, so a stale Online
            // signal degrades to the offline warning.
            PlatformEvent::Alarm | PlatformEvent::Online => self.spawn_update(),
            PlatformEvent::Offline => self.poller.handle_offline(),
            PlatformEvent::Message(message) => self.on_message(&message).await,
            PlatformEvent::Installed { reason } => self.on_installed(reason),
            PlatformEvent::TabUpdated { status, url } => self.on_tab_updated(status, &url),
            PlatformEvent::NotificationClicked { id } => self.on_notification_clicked(id),
            PlatformEvent::PermissionsAdded => {
                self.subscriptions.reconcile().await;
            }
            PlatformEvent::ActionClicked => self.on_action_clicked(),
            PlatformEvent::Shutdown => {}
        }
    }

    fn spawn_update(&self) {
        let poller = self.poller.clone();
        tokio::spawn(async move {
            poller.update().await;
        });
    }

    async fn on_message(&self, message: &str) {
        if message != "update" {
            debug!("ignoring message: {message}");
            return;
        }
        self.subscriptions.reconcile().await;
        self.spawn_update();
    }

    fn on_installed(&self, reason: InstallReason) {
        if reason != InstallReason::Install {
            debug!("ignoring install event: {reason:?}");
            return;
        }
        let Some(url) = self.config.settings_url.clone() else {
            info!("fresh install, no settings surface configured");
            return;
        };
        let tabs = Arc::clone(&self.tabs);
        tokio::spawn(async move {
            if let Err(e) = tabs.open_tab(&url).await {
                warn!("cannot open settings surface: {e}");
            }
        });
    }

    fn on_tab_updated(&self, status: TabStatus, url: &str) {
        if status != TabStatus::Complete {
            return;
        }
        if !self.subscriptions.current().navigation {
            return;
        }
        if !is_target_page(url, &self.config.feed_host) {
            return;
        }

        debug!("target page loaded, re-polling after settle delay");
        let poller = self.poller.clone();
        let settle = Duration::from_millis(self.config.navigation_settle_ms);
        tokio::spawn(async move {
            tokio::time::sleep(settle).await;
            poller.update().await;
        });
    }

    fn on_notification_clicked(&self, id: String) {
        if !self.subscriptions.current().notification_click {
            return;
        }
        let dispatcher = Arc::clone(&self.dispatcher);
        tokio::spawn(async move {
            if let Err(e) = dispatcher.open_notification(&id).await {
                warn!("cannot open notification {id}: {e}");
            }
        });
    }

    fn on_action_clicked(&self) {
        let feed = Arc::clone(&self.feed);
        let tabs = Arc::clone(&self.tabs);
        tokio::spawn(async move {
            match feed.feed_url().await {
                Ok(url) => {
                    if let Err(e) = tabs.open_tab(&url).await {
                        warn!("cannot open feed tab: {e}");
                    }
                }
                Err(e) => warn!("cannot resolve feed url: {e}"),
            }
        });
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;
    use crate::options::{Preferences, StaticOptions};
    use crate::permissions::StaticPermissions;

    fn nav_prefs(on: bool) -> Preferences {
        Preferences {
            update_count_on_navigation: on,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn reconcile_attaches_bindings_for_granted_permissions() {
        let options = Arc::new(StaticOptions::with_prefs(nav_prefs(true)));
        let permissions = Arc::new(StaticPermissions::with_granted(&[
            PermissionKind::Notifications,
            PermissionKind::Tabs,
        ]));
        let subs = Subscriptions::new(options, permissions);

        let set = subs.reconcile().await;
        assert!(set.notification_click);
        assert!(set.navigation);
        assert_eq!(subs.current(), set);
    }

    #[tokio::test]
    async fn reconcile_is_idempotent() {
        let options = Arc::new(StaticOptions::with_prefs(nav_prefs(true)));
        let permissions = Arc::new(StaticPermissions::with_granted(&[PermissionKind::Tabs]));
        let subs = Subscriptions::new(options, permissions);

        let first = subs.reconcile().await;
        let second = subs.reconcile().await;
        assert_eq!(first, second);
        assert_eq!(subs.current(), second);
    }

    #[tokio::test]
    async fn toggling_navigation_preference_off_detaches_the_binding() {
        let options = Arc::new(StaticOptions::with_prefs(nav_prefs(true)));
        let permissions = Arc::new(StaticPermissions::with_granted(&[PermissionKind::Tabs]));
        let subs = Subscriptions::new(options.clone(), permissions);

        assert!(subs.reconcile().await.navigation);

        options.set(nav_prefs(false));
        assert!(!subs.reconcile().await.navigation);
        assert!(!subs.current().navigation);
    }

    #[tokio::test]
    async fn navigation_needs_the_tabs_permission() {
        let options = Arc::new(StaticOptions::with_prefs(nav_prefs(true)));
        let permissions = Arc::new(StaticPermissions::new());
        let subs = Subscriptions::new(options, permissions.clone());

        assert!(!subs.reconcile().await.navigation);

        permissions.grant(PermissionKind::Tabs);
        assert!(subs.reconcile().await.navigation);

        // Losing the permission detaches the binding on the next reconcile.
        permissions.revoke(PermissionKind::Tabs);
        assert!(!subs.reconcile().await.navigation);
    }

    #[tokio::test]
    async fn options_failure_degrades_to_no_navigation_binding() {
        struct FailingOptions;

        #[async_trait::async_trait]
        impl OptionsProvider for FailingOptions {
            async fn get_all(&self) -> anyhow::Result<Preferences> {
                anyhow::bail!("options backend unavailable")
            }
        }

        let permissions = Arc::new(StaticPermissions::with_granted(&[
            PermissionKind::Notifications,
            PermissionKind::Tabs,
        ]));
        let subs = Subscriptions::new(Arc::new(FailingOptions), permissions);

        let set = subs.reconcile().await;
        // Permission-only bindings survive; preference-gated ones do not.
        assert!(set.notification_click);
        assert!(!set.navigation);
    }
}
