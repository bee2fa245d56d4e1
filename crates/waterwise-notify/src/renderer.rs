//! Notification renderer: turns the store's list into drawn entries and
//! runs their timers.
//!
//! Each entry owns up to two Tokio timers:
//!
//! ```text
//!   mounted ──(duration elapses)──→ dismiss() ──(exit delay)──→ store.remove()
//!      │  ↑                            ↑
//!      │  └── pointer_leave (restart)  │
//!      └──── pointer_enter (cancel)    └── manual dismiss / action
//! ```
//!
//! - **countdown**: fires `dismiss` after the entry's duration. Cancelled
//!   while the pointer rests on the entry and restarted, with the full
//!   duration, when it leaves.
//! - **purge**: fires `store.remove` once the exit delay has passed.
//!
//! Whenever an entry leaves the store, or the renderer unmounts, both of
//! its timers are aborted. No timer outlives the entry it belongs to.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};
use tracing::{debug, info, trace};
use waterwise_protocol::NotificationId;

use crate::{
    ContainerId, Notification, NotificationStore, NotifyError, Portal, RenderedAction,
    RenderedEntry, RendererConfig, Subscription,
};

/// Per-entry view state.
struct EntryView {
    notification: Notification,
    /// `false` once dismissal started (exit transition).
    visible: bool,
    paused: bool,
    countdown: Option<JoinHandle<()>>,
    purge: Option<JoinHandle<()>>,
}

impl EntryView {
    fn new(notification: Notification) -> Self {
        Self {
            notification,
            visible: true,
            paused: false,
            countdown: None,
            purge: None,
        }
    }

    fn cancel_countdown(&mut self) {
        if let Some(timer) = self.countdown.take() {
            timer.abort();
        }
    }

    fn cancel_timers(&mut self) {
        self.cancel_countdown();
        if let Some(timer) = self.purge.take() {
            timer.abort();
        }
    }

    fn pending_timers(&self) -> usize {
        [&self.countdown, &self.purge]
            .into_iter()
            .filter(|t| matches!(t, Some(h) if !h.is_finished()))
            .count()
    }

    fn rendered(&self) -> RenderedEntry {
        let n = &self.notification;
        RenderedEntry {
            id: n.id.clone(),
            title: n.title.clone(),
            message: n.message.clone(),
            variant: n.variant,
            actions: n
                .actions
                .iter()
                .map(|a| RenderedAction {
                    label: a.label.clone(),
                    style: a.style,
                })
                .collect(),
            visible: self.visible,
            paused: self.paused,
        }
    }
}

#[derive(Default)]
struct RendererState {
    entries: Vec<EntryView>,
    unmounted: bool,
}

/// State shared between the renderer handle, its store subscription, and
/// its timer tasks. Timers and the subscription only hold a `Weak` to it.
struct RendererShared {
    store: NotificationStore,
    portal: Arc<dyn Portal>,
    config: RendererConfig,
    runtime: Handle,
    container: ContainerId,
    state: Mutex<RendererState>,
}

impl RendererShared {
    fn lock(&self) -> MutexGuard<'_, RendererState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Reconciles the view with a store snapshot: mounts new entries,
    /// keeps existing ones (and their timers), drops the rest.
    fn sync(self: &Arc<Self>, snapshot: &[Notification]) {
        let mut state = self.lock();
        if state.unmounted {
            return;
        }

        let mut previous = std::mem::take(&mut state.entries);
        let mut next = Vec::with_capacity(snapshot.len());

        for notification in snapshot {
            if let Some(pos) = previous.iter().position(|e| e.notification.id == notification.id) {
                next.push(previous.swap_remove(pos));
                continue;
            }

            let mut view = EntryView::new(notification.clone());
            let duration = notification.effective_duration(self.config.default_duration());
            if !duration.is_zero() {
                view.countdown = Some(self.schedule_dismiss(notification.id.clone(), duration));
            }
            debug!(id = %notification.id, ?duration, "notification mounted");
            next.push(view);
        }

        for mut gone in previous {
            gone.cancel_timers();
            trace!(id = %gone.notification.id, "notification unmounted");
        }

        state.entries = next;
        self.draw(&state);
    }

    fn draw(&self, state: &RendererState) {
        let frame: Vec<RenderedEntry> = state.entries.iter().map(EntryView::rendered).collect();
        self.portal.render(self.container, &frame);
    }

    fn schedule_dismiss(self: &Arc<Self>, id: NotificationId, after: Duration) -> JoinHandle<()> {
        let weak = Arc::downgrade(self);
        let deadline = Instant::now() + after;
        self.runtime.spawn(async move {
            time::sleep_until(deadline).await;
            if let Some(shared) = weak.upgrade() {
                trace!(%id, "countdown elapsed");
                // The entry may have been removed meanwhile; nothing to do then.
                let _ = shared.dismiss(&id);
            }
        })
    }

    fn schedule_purge(self: &Arc<Self>, id: NotificationId) -> JoinHandle<()> {
        let weak: Weak<Self> = Arc::downgrade(self);
        let deadline = Instant::now() + self.config.exit_delay();
        self.runtime.spawn(async move {
            time::sleep_until(deadline).await;
            if let Some(shared) = weak.upgrade() {
                shared.store.remove(&id);
            }
        })
    }

    /// First phase of removal: hide, run `on_close`, schedule the purge.
    /// Dismissing an entry that is already closing does nothing.
    fn dismiss(self: &Arc<Self>, id: &NotificationId) -> Result<(), NotifyError> {
        let on_close = {
            let mut state = self.lock();
            let entry = state
                .entries
                .iter_mut()
                .find(|e| &e.notification.id == id)
                .ok_or_else(|| NotifyError::NotFound(id.clone()))?;
            if !entry.visible {
                return Ok(());
            }

            entry.visible = false;
            entry.paused = false;
            entry.cancel_countdown();
            entry.purge = Some(self.schedule_purge(id.clone()));
            let on_close = entry.notification.close_callback();

            debug!(%id, "notification dismissed");
            self.draw(&state);
            on_close
        };

        // Outside the lock: the callback may touch the store or renderer.
        if let Some(callback) = on_close {
            callback();
        }
        Ok(())
    }

    fn with_visible_entry(
        self: &Arc<Self>,
        id: &NotificationId,
        f: impl FnOnce(&Arc<Self>, &mut EntryView),
    ) -> Result<(), NotifyError> {
        let mut state = self.lock();
        let entry = state
            .entries
            .iter_mut()
            .find(|e| &e.notification.id == id)
            .ok_or_else(|| NotifyError::NotFound(id.clone()))?;
        if entry.visible {
            f(self, entry);
            self.draw(&state);
        }
        Ok(())
    }

    fn teardown(&self) {
        let mut state = self.lock();
        if state.unmounted {
            return;
        }
        state.unmounted = true;
        for entry in &mut state.entries {
            entry.cancel_timers();
        }
        state.entries.clear();
        drop(state);

        self.portal.detach_container(self.container);
        info!(container = %self.container, "notification renderer unmounted");
    }
}

/// Presents the live notification list and manages per-entry timers.
///
/// Mount one per UI surface. Several renderers may observe the same store;
/// each gets its own container. Dropping the renderer unmounts it.
pub struct NotificationRenderer {
    shared: Arc<RendererShared>,
    subscription: Option<Subscription>,
}

impl NotificationRenderer {
    /// Attaches a container to `portal`, subscribes to `store`, and mounts
    /// whatever notifications are already active.
    ///
    /// # Errors
    /// - [`NotifyError::NoRuntime`]: called outside a Tokio runtime
    /// - any error from [`Portal::attach_container`]
    pub fn mount(
        store: &NotificationStore,
        portal: Arc<dyn Portal>,
        config: RendererConfig,
    ) -> Result<Self, NotifyError> {
        let runtime = Handle::try_current().map_err(|_| NotifyError::NoRuntime)?;
        let container = portal.attach_container()?;

        let shared = Arc::new(RendererShared {
            store: store.clone(),
            portal,
            config: config.validated(),
            runtime,
            container,
            state: Mutex::new(RendererState::default()),
        });

        let weak = Arc::downgrade(&shared);
        let subscription = store.subscribe(move |snapshot| {
            if let Some(shared) = weak.upgrade() {
                shared.sync(snapshot);
            }
        });
        shared.sync(&store.notifications());

        info!(%container, "notification renderer mounted");
        Ok(Self {
            shared,
            subscription: Some(subscription),
        })
    }

    /// The container this renderer draws into.
    pub fn container(&self) -> ContainerId {
        self.shared.container
    }

    /// The entries as currently drawn.
    pub fn entries(&self) -> Vec<RenderedEntry> {
        self.shared.lock().entries.iter().map(EntryView::rendered).collect()
    }

    /// `Some(visible)` for a mounted entry, `None` if it isn't mounted.
    pub fn is_visible(&self, id: &NotificationId) -> Option<bool> {
        self.shared
            .lock()
            .entries
            .iter()
            .find(|e| &e.notification.id == id)
            .map(|e| e.visible)
    }

    /// Number of countdown and purge timers still pending.
    pub fn pending_timers(&self) -> usize {
        self.shared.lock().entries.iter().map(EntryView::pending_timers).sum()
    }

    /// Starts the two-phase removal of `id` (user pressed close).
    ///
    /// # Errors
    /// [`NotifyError::NotFound`] if `id` is not mounted.
    pub fn dismiss(&self, id: &NotificationId) -> Result<(), NotifyError> {
        self.shared.dismiss(id)
    }

    /// Pointer entered the entry: pause its countdown.
    pub fn pointer_enter(&self, id: &NotificationId) -> Result<(), NotifyError> {
        self.shared.with_visible_entry(id, |_, entry| {
            entry.cancel_countdown();
            entry.paused = true;
        })
    }

    /// Pointer left the entry: restart its countdown with the full
    /// duration, not the time that was left.
    pub fn pointer_leave(&self, id: &NotificationId) -> Result<(), NotifyError> {
        let default = self.shared.config.default_duration();
        self.shared.with_visible_entry(id, |shared, entry| {
            entry.cancel_countdown();
            entry.paused = false;
            let duration = entry.notification.effective_duration(default);
            if !duration.is_zero() {
                entry.countdown = Some(shared.schedule_dismiss(id.clone(), duration));
            }
        })
    }

    /// Runs the action at `index`, then dismisses the notification.
    ///
    /// # Errors
    /// - [`NotifyError::NotFound`] if `id` is not mounted
    /// - [`NotifyError::ActionNotFound`] if there is no such action
    pub fn invoke_action(&self, id: &NotificationId, index: usize) -> Result<(), NotifyError> {
        let action = {
            let state = self.shared.lock();
            let entry = state
                .entries
                .iter()
                .find(|e| &e.notification.id == id)
                .ok_or_else(|| NotifyError::NotFound(id.clone()))?;
            entry
                .notification
                .actions
                .get(index)
                .cloned()
                .ok_or_else(|| NotifyError::ActionNotFound {
                    id: id.clone(),
                    index,
                })?
        };

        debug!(%id, label = %action.label, "notification action invoked");
        action.invoke();
        self.shared.dismiss(id)
    }

    /// Unsubscribes, aborts every pending timer, and detaches the container.
    pub fn unmount(self) {
        drop(self);
    }
}

impl Drop for NotificationRenderer {
    fn drop(&mut self) {
        if let Some(subscription) = self.subscription.take() {
            subscription.unsubscribe();
        }
        self.shared.teardown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{HeadlessPortal, NewNotification};

    fn mount(store: &NotificationStore) -> (NotificationRenderer, HeadlessPortal) {
        let portal = HeadlessPortal::new();
        let renderer =
            NotificationRenderer::mount(store, Arc::new(portal.clone()), RendererConfig::default())
                .unwrap();
        (renderer, portal)
    }

    #[test]
    fn test_mount_outside_runtime_returns_no_runtime() {
        let store = NotificationStore::new();
        let portal = HeadlessPortal::new();

        let result =
            NotificationRenderer::mount(&store, Arc::new(portal.clone()), RendererConfig::default());

        assert!(matches!(result, Err(NotifyError::NoRuntime)));
        assert_eq!(portal.container_count(), 0, "no container without a runtime");
    }

    #[tokio::test(start_paused = true)]
    async fn test_mount_picks_up_existing_notifications() {
        let store = NotificationStore::new();
        store.add(NewNotification::new("before mount"));

        let (renderer, portal) = mount(&store);

        let frame = portal.entries(renderer.container()).unwrap();
        assert_eq!(frame.len(), 1);
        assert_eq!(frame[0].title, "before mount");
        assert_eq!(renderer.pending_timers(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_store_renders_nothing() {
        let store = NotificationStore::new();
        let (renderer, portal) = mount(&store);

        assert_eq!(portal.entries(renderer.container()), Some(Vec::new()));
        assert!(renderer.entries().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_id_operations_return_not_found() {
        let store = NotificationStore::new();
        let (renderer, _portal) = mount(&store);
        let missing = NotificationId::new("nope");

        assert!(matches!(renderer.dismiss(&missing), Err(NotifyError::NotFound(_))));
        assert!(matches!(renderer.pointer_enter(&missing), Err(NotifyError::NotFound(_))));
        assert!(matches!(renderer.pointer_leave(&missing), Err(NotifyError::NotFound(_))));
        assert!(matches!(renderer.invoke_action(&missing, 0), Err(NotifyError::NotFound(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn test_invoke_missing_action_returns_action_not_found() {
        let store = NotificationStore::new();
        let (renderer, _portal) = mount(&store);
        let id = store.add(NewNotification::new("no buttons"));

        let result = renderer.invoke_action(&id, 0);

        assert!(matches!(result, Err(NotifyError::ActionNotFound { index: 0, .. })));
        assert_eq!(renderer.is_visible(&id), Some(true), "failed action must not dismiss");
    }

    #[tokio::test(start_paused = true)]
    async fn test_pointer_enter_marks_paused_and_clears_countdown() {
        let store = NotificationStore::new();
        let (renderer, _portal) = mount(&store);
        let id = store.add(NewNotification::new("hover me"));
        assert_eq!(renderer.pending_timers(), 1);

        renderer.pointer_enter(&id).unwrap();

        assert_eq!(renderer.pending_timers(), 0);
        assert!(renderer.entries()[0].paused);
    }
}
