//! The UI mounting service the renderer draws into.
//!
//! A [`Portal`] owns the overlay container that sits outside normal layout
//! (in a browser: a `div` appended to `document.body`). The renderer
//! attaches exactly one container, pushes a full frame after every change,
//! and detaches the container when it unmounts.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use waterwise_protocol::{NotificationId, Variant};

use crate::{ActionStyle, NotifyError};

/// Counter for generating unique container IDs.
static NEXT_CONTAINER_ID: AtomicU64 = AtomicU64::new(1);

/// Opaque identifier for an attached overlay container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContainerId(u64);

impl ContainerId {
    /// Allocates a fresh, process-unique id.
    pub fn next() -> Self {
        Self(NEXT_CONTAINER_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ContainerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "container-{}", self.0)
    }
}

/// An action button as drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedAction {
    pub label: String,
    pub style: ActionStyle,
}

/// One notification as drawn in a frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedEntry {
    pub id: NotificationId,
    pub title: String,
    pub message: Option<String>,
    pub variant: Variant,
    pub actions: Vec<RenderedAction>,
    /// `false` while the exit transition plays.
    pub visible: bool,
    /// `true` while the pointer rests on the entry.
    pub paused: bool,
}

/// Draws notification frames into a single overlay container.
pub trait Portal: Send + Sync + 'static {
    /// Creates the overlay container.
    fn attach_container(&self) -> Result<ContainerId, NotifyError>;

    /// Replaces the container's contents with `entries`. An empty slice
    /// means "draw nothing".
    fn render(&self, container: ContainerId, entries: &[RenderedEntry]);

    /// Removes the container. Unknown ids are ignored.
    fn detach_container(&self, container: ContainerId);
}

#[derive(Debug, Default)]
struct HeadlessState {
    containers: BTreeMap<ContainerId, Vec<RenderedEntry>>,
    frames_rendered: usize,
}

/// A [`Portal`] that keeps the latest frame of each container in memory.
///
/// Used by tests and the console demo. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct HeadlessPortal {
    state: Arc<Mutex<HeadlessState>>,
}

impl HeadlessPortal {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, HeadlessState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// The latest frame drawn into `container`, or `None` if it is not
    /// attached.
    pub fn entries(&self, container: ContainerId) -> Option<Vec<RenderedEntry>> {
        self.lock().containers.get(&container).cloned()
    }

    /// Number of currently attached containers.
    pub fn container_count(&self) -> usize {
        self.lock().containers.len()
    }

    /// Returns `true` if `container` is attached.
    pub fn is_attached(&self, container: ContainerId) -> bool {
        self.lock().containers.contains_key(&container)
    }

    /// Total frames drawn across all containers.
    pub fn frames_rendered(&self) -> usize {
        self.lock().frames_rendered
    }
}

impl Portal for HeadlessPortal {
    fn attach_container(&self) -> Result<ContainerId, NotifyError> {
        let container = ContainerId::next();
        self.lock().containers.insert(container, Vec::new());
        tracing::debug!(%container, "headless container attached");
        Ok(container)
    }

    fn render(&self, container: ContainerId, entries: &[RenderedEntry]) {
        let mut state = self.lock();
        if let Some(frame) = state.containers.get_mut(&container) {
            *frame = entries.to_vec();
            state.frames_rendered += 1;
        }
    }

    fn detach_container(&self, container: ContainerId) {
        if self.lock().containers.remove(&container).is_some() {
            tracing::debug!(%container, "headless container detached");
        }
    }
}
