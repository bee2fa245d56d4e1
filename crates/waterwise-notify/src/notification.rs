//! Notification values: what callers submit and what the store holds.
//!
//! A [`NewNotification`] is "a notification minus its id". The store stamps
//! an id on it and keeps the result as a [`Notification`]. Neither is ever
//! mutated after that; a changed notification is a removed one plus a new
//! one.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use waterwise_protocol::{NotificationId, Variant};

/// A shared, thread-safe callback with no arguments.
pub(crate) type Callback = Arc<dyn Fn() + Send + Sync>;

// ---------------------------------------------------------------------------
// Actions
// ---------------------------------------------------------------------------

/// Visual treatment of an action button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ActionStyle {
    #[default]
    Default,
    Outline,
    Ghost,
}

/// A button rendered inside a notification.
///
/// Invoking it runs the callback, after which the renderer dismisses the
/// notification.
#[derive(Clone)]
pub struct NotificationAction {
    /// Button text.
    pub label: String,
    /// Button style.
    pub style: ActionStyle,
    callback: Callback,
}

impl NotificationAction {
    /// Creates an action with the default style.
    pub fn new(label: impl Into<String>, callback: impl Fn() + Send + Sync + 'static) -> Self {
        Self {
            label: label.into(),
            style: ActionStyle::Default,
            callback: Arc::new(callback),
        }
    }

    /// Sets the button style.
    pub fn with_style(mut self, style: ActionStyle) -> Self {
        self.style = style;
        self
    }

    /// Runs the action's callback.
    pub fn invoke(&self) {
        (self.callback)();
    }
}

impl fmt::Debug for NotificationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationAction")
            .field("label", &self.label)
            .field("style", &self.style)
            .finish_non_exhaustive()
    }
}

// ---------------------------------------------------------------------------
// NewNotification
// ---------------------------------------------------------------------------

/// A notification waiting to be added to the store.
///
/// Built fluently:
///
/// ```rust
/// use std::time::Duration;
/// use waterwise_notify::NewNotification;
/// use waterwise_protocol::Variant;
///
/// let n = NewNotification::new("Saved")
///     .message("Your settings were stored")
///     .variant(Variant::Success)
///     .duration(Duration::from_secs(3));
/// assert_eq!(n.variant, Variant::Success);
/// ```
#[derive(Clone, Default)]
pub struct NewNotification {
    /// Bold first line.
    pub title: String,
    /// Optional body text.
    pub message: Option<String>,
    /// Severity.
    pub variant: Variant,
    /// How long it stays before auto-dismiss. `None` means the renderer's
    /// default; `Some(Duration::ZERO)` means it stays until dismissed.
    pub duration: Option<Duration>,
    /// Buttons, in display order.
    pub actions: Vec<NotificationAction>,
    on_close: Option<Callback>,
}

impl NewNotification {
    /// Creates an `info` notification with the given title.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn variant(mut self, variant: Variant) -> Self {
        self.variant = variant;
        self
    }

    /// Auto-dismiss after `duration`. Zero makes it persistent.
    pub fn duration(mut self, duration: Duration) -> Self {
        self.duration = Some(duration);
        self
    }

    /// Never auto-dismiss.
    pub fn persistent(self) -> Self {
        self.duration(Duration::ZERO)
    }

    /// Appends an action button.
    pub fn action(mut self, action: NotificationAction) -> Self {
        self.actions.push(action);
        self
    }

    /// Runs `callback` when the notification starts closing, whether the
    /// user dismissed it, an action ran, or its countdown expired.
    pub fn on_close(mut self, callback: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_close = Some(Arc::new(callback));
        self
    }

    pub(crate) fn with_id(self, id: NotificationId) -> Notification {
        Notification {
            id,
            title: self.title,
            message: self.message,
            variant: self.variant,
            duration: self.duration,
            actions: self.actions,
            on_close: self.on_close,
        }
    }
}

impl fmt::Debug for NewNotification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewNotification")
            .field("title", &self.title)
            .field("message", &self.message)
            .field("variant", &self.variant)
            .field("duration", &self.duration)
            .field("actions", &self.actions)
            .field("on_close", &self.on_close.is_some())
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Notification
// ---------------------------------------------------------------------------

/// A live notification owned by the [`NotificationStore`](crate::NotificationStore).
///
/// Cloning is cheap: callbacks are reference-counted.
#[derive(Clone)]
pub struct Notification {
    pub id: NotificationId,
    pub title: String,
    pub message: Option<String>,
    pub variant: Variant,
    pub duration: Option<Duration>,
    pub actions: Vec<NotificationAction>,
    on_close: Option<Callback>,
}

impl Notification {
    /// The countdown for this entry, falling back to `default` when the
    /// caller didn't set one.
    pub fn effective_duration(&self, default: Duration) -> Duration {
        self.duration.unwrap_or(default)
    }

    /// Returns `true` if this notification has an `on_close` callback.
    pub fn has_close_callback(&self) -> bool {
        self.on_close.is_some()
    }

    pub(crate) fn close_callback(&self) -> Option<Callback> {
        self.on_close.clone()
    }
}

impl fmt::Debug for Notification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notification")
            .field("id", &self.id)
            .field("title", &self.title)
            .field("message", &self.message)
            .field("variant", &self.variant)
            .field("duration", &self.duration)
            .field("actions", &self.actions)
            .field("on_close", &self.on_close.is_some())
            .finish()
    }
}
