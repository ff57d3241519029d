//! Read models and the mount/unmount lifecycle that carries their state.
//!
//! A view is mounted by a command, fills itself from the chain on a spawned
//! task and publishes through a `watch` channel. Dropping the
//! [`ViewHandle`] unmounts the view; any state the loader produces after
//! that is discarded.

pub mod detail;
pub mod list;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use serde::Serialize;
use tokio::sync::watch;

pub use detail::{fetch_quest_view, load_quest};
pub use list::{QuestIndexing, fetch_quest_list, load_quests};

/// Tri-state load result plus a dedicated state for rejected input.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "value", rename_all = "snake_case")]
pub enum LoadState<T> {
    Loading,
    /// The request could not be attempted, e.g. a non-positive id.
    Invalid(String),
    Failed(String),
    Ready(T),
}

impl<T> LoadState<T> {
    pub fn is_loading(&self) -> bool {
        matches!(self, LoadState::Loading)
    }

    pub fn ready(&self) -> Option<&T> {
        match self {
            LoadState::Ready(value) => Some(value),
            _ => None,
        }
    }

    pub fn into_ready(self) -> Option<T> {
        match self {
            LoadState::Ready(value) => Some(value),
            _ => None,
        }
    }

    /// Message for the invalid and failed states.
    pub fn message(&self) -> Option<&str> {
        match self {
            LoadState::Invalid(msg) | LoadState::Failed(msg) => Some(msg.as_str()),
            _ => None,
        }
    }
}

/// Create a mounted view in the `Loading` state.
pub fn mount<T: Clone>() -> (ViewWriter<T>, ViewHandle<T>) {
    let (tx, rx) = watch::channel(LoadState::Loading);
    let alive = Arc::new(AtomicBool::new(true));
    (
        ViewWriter {
            tx,
            alive: alive.clone(),
        },
        ViewHandle { rx, alive },
    )
}

/// Loader side of a mounted view.
pub struct ViewWriter<T> {
    tx: watch::Sender<LoadState<T>>,
    alive: Arc<AtomicBool>,
}

impl<T> ViewWriter<T> {
    pub fn is_mounted(&self) -> bool {
        self.alive.load(Ordering::Acquire)
    }

    /// Publish a new state. Returns `false` and drops the state once the
    /// view has been unmounted.
    pub fn publish(&self, state: LoadState<T>) -> bool {
        if !self.is_mounted() {
            return false;
        }
        self.tx.send_replace(state);
        true
    }
}

/// Consumer side of a mounted view. Dropping it unmounts the view.
pub struct ViewHandle<T> {
    rx: watch::Receiver<LoadState<T>>,
    alive: Arc<AtomicBool>,
}

impl<T: Clone> ViewHandle<T> {
    pub fn current(&self) -> LoadState<T> {
        self.rx.borrow().clone()
    }

    /// Wait until the view leaves `Loading`.
    ///
    /// If the loader goes away without publishing, the last state is returned.
    pub async fn settled(&mut self) -> LoadState<T> {
        if let Ok(state) = self.rx.wait_for(|state| !state.is_loading()).await {
            return state.clone();
        }
        self.current()
    }
}

impl<T> Drop for ViewHandle<T> {
    fn drop(&mut self) {
        self.alive.store(false, Ordering::Release);
    }
}
