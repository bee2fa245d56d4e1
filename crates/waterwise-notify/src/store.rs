//! The notification store: the live list plus its subscribers.
//!
//! # Concurrency note
//!
//! The store is a cheaply clonable handle around an `Arc<Mutex<..>>`. The
//! lock is held only to mutate or copy the list; subscriber callbacks run
//! after it is released, so a callback may call back into the store (the
//! renderer does exactly that when a purge timer fires).

use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;
use waterwise_protocol::{NotificationId, Variant};

use crate::{NewNotification, Notification};

type Listener = Arc<dyn Fn(&[Notification]) + Send + Sync>;

/// Length of the random part of a notification id.
const ID_SUFFIX_LEN: usize = 9;

const BASE36: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";

#[derive(Default)]
struct StoreInner {
    /// Active notifications in insertion order. Ids are unique.
    notifications: Vec<Notification>,
    /// Subscribers in subscription order.
    listeners: Vec<(u64, Listener)>,
    next_listener_id: u64,
}

/// Process-wide registry of active notifications.
///
/// Construct one per application and hand clones to whoever needs to emit
/// or observe notifications. Every clone shares the same list.
///
/// ## Lifecycle
///
/// ```text
/// add() ──→ [active] ──→ remove() / clear_all()
///              │
///              └── every mutation → each subscriber gets a fresh snapshot
/// ```
#[derive(Clone, Default)]
pub struct NotificationStore {
    inner: Arc<Mutex<StoreInner>>,
}

impl NotificationStore {
    /// Creates an empty store with no subscribers.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Adds a notification and returns its generated id.
    ///
    /// Subscribers are notified before this returns.
    pub fn add(&self, notification: NewNotification) -> NotificationId {
        let id = {
            let mut inner = self.lock();
            let id = loop {
                let candidate = generate_id(epoch_millis());
                // Two adds in the same millisecond only collide if the
                // random suffixes match too; retry in that case.
                if !inner.notifications.iter().any(|n| n.id == candidate) {
                    break candidate;
                }
            };
            inner.notifications.push(notification.with_id(id.clone()));
            id
        };

        tracing::debug!(%id, "notification added");
        self.notify_listeners();
        id
    }

    /// Removes the notification with `id`. Unknown ids leave the list
    /// unchanged, but subscribers are still notified.
    pub fn remove(&self, id: &NotificationId) {
        let removed = {
            let mut inner = self.lock();
            let before = inner.notifications.len();
            inner.notifications.retain(|n| &n.id != id);
            before != inner.notifications.len()
        };

        tracing::debug!(%id, removed, "notification removed");
        self.notify_listeners();
    }

    /// Removes every notification.
    pub fn clear_all(&self) {
        let cleared = {
            let mut inner = self.lock();
            std::mem::take(&mut inner.notifications).len()
        };

        tracing::debug!(cleared, "notifications cleared");
        self.notify_listeners();
    }

    /// Registers `callback` to receive a snapshot after every mutation.
    ///
    /// Callbacks fire synchronously, in subscription order. The returned
    /// [`Subscription`] unregisters the callback when dropped, so keep it
    /// alive for as long as you want updates.
    pub fn subscribe(
        &self,
        callback: impl Fn(&[Notification]) + Send + Sync + 'static,
    ) -> Subscription {
        let mut inner = self.lock();
        let listener_id = inner.next_listener_id;
        inner.next_listener_id += 1;
        inner.listeners.push((listener_id, Arc::new(callback)));
        tracing::trace!(listener_id, listeners = inner.listeners.len(), "subscriber added");

        Subscription {
            store: Arc::downgrade(&self.inner),
            listener_id: Some(listener_id),
        }
    }

    /// A snapshot of the active notifications, in insertion order.
    pub fn notifications(&self) -> Vec<Notification> {
        self.lock().notifications.clone()
    }

    /// Looks up a single notification.
    pub fn get(&self, id: &NotificationId) -> Option<Notification> {
        self.lock().notifications.iter().find(|n| &n.id == id).cloned()
    }

    /// Number of active notifications.
    pub fn len(&self) -> usize {
        self.lock().notifications.len()
    }

    /// Returns `true` if no notification is active.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of registered subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.lock().listeners.len()
    }

    // -- Convenience constructors -------------------------------------------
    //
    // Each takes a title and a message. Pass `""` for a title-only entry.

    /// Adds an `info` notification.
    pub fn info(&self, title: impl Into<String>, message: impl Into<String>) -> NotificationId {
        self.add_variant(Variant::Info, title.into(), message.into())
    }

    /// Adds a `success` notification.
    pub fn success(&self, title: impl Into<String>, message: impl Into<String>) -> NotificationId {
        self.add_variant(Variant::Success, title.into(), message.into())
    }

    /// Adds a `warning` notification.
    pub fn warning(&self, title: impl Into<String>, message: impl Into<String>) -> NotificationId {
        self.add_variant(Variant::Warning, title.into(), message.into())
    }

    /// Adds an `error` notification.
    pub fn error(&self, title: impl Into<String>, message: impl Into<String>) -> NotificationId {
        self.add_variant(Variant::Error, title.into(), message.into())
    }

    // An empty message means title-only, same as leaving it unset.
    fn add_variant(&self, variant: Variant, title: String, message: String) -> NotificationId {
        let mut notification = NewNotification::new(title).variant(variant);
        if !message.is_empty() {
            notification = notification.message(message);
        }
        self.add(notification)
    }

    /// Sends the current snapshot to every subscriber.
    fn notify_listeners(&self) {
        let (snapshot, listeners) = {
            let inner = self.lock();
            let listeners: Vec<Listener> =
                inner.listeners.iter().map(|(_, l)| Arc::clone(l)).collect();
            (inner.notifications.clone(), listeners)
        };
        for listener in listeners {
            listener(&snapshot);
        }
    }
}

/// Keeps a store subscription alive. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    store: Weak<Mutex<StoreInner>>,
    listener_id: Option<u64>,
}

impl Subscription {
    /// Unsubscribes now. Equivalent to dropping the guard.
    pub fn unsubscribe(mut self) {
        self.detach();
    }

    fn detach(&mut self) {
        let Some(listener_id) = self.listener_id.take() else {
            return;
        };
        // The store may already be gone; then there is nothing to detach from.
        if let Some(store) = self.store.upgrade() {
            let mut inner = store.lock().unwrap_or_else(PoisonError::into_inner);
            inner.listeners.retain(|(id, _)| *id != listener_id);
            tracing::trace!(listener_id, "subscriber removed");
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.detach();
    }
}

/// Builds `notification-<epoch ms>-<9 base36 chars>`.
fn generate_id(now_ms: u64) -> NotificationId {
    let mut rng = rand::rng();
    let suffix: String = (0..ID_SUFFIX_LEN)
        .map(|_| BASE36[rng.random_range(0..BASE36.len())] as char)
        .collect();
    NotificationId::new(format!("notification-{now_ms}-{suffix}"))
}

fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

// =========================================================================
// Tests
// =========================================================================
