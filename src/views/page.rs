use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::resources::Resource;

/// Lifecycle of one resource page.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PageState {
    #[default]
    Loading,
    Ready,
    Submitting,
    Deleting(u64),
    Error(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    Loaded,
    Submit,
    Delete(u64),
    Settled,
    Failed(String),
    Dismissed,
}

impl PageState {
    /// Transitions not listed leave the state unchanged. An error stays up
    /// across reloads until it is dismissed.
    pub fn apply(self, event: PageEvent) -> PageState {
        match (self, event) {
            (_, PageEvent::Failed(message)) => PageState::Error(message),
            (PageState::Loading, PageEvent::Loaded) => PageState::Ready,
            (PageState::Ready, PageEvent::Submit) => PageState::Submitting,
            (PageState::Ready, PageEvent::Delete(id)) => PageState::Deleting(id),
            (PageState::Submitting | PageState::Deleting(_), PageEvent::Settled) => {
                PageState::Ready
            }
            (PageState::Error(_), PageEvent::Dismissed) => PageState::Ready,
            (state, _) => state,
        }
    }

    pub fn banner(&self) -> Option<&str> {
        match self {
            PageState::Error(message) => Some(message),
            _ => None,
        }
    }
}

/// Shared page states, one per resource.
#[derive(Clone, Default)]
pub struct PageBoard {
    states: Arc<Mutex<HashMap<Resource, PageState>>>,
}

impl PageBoard {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn state(&self, resource: Resource) -> PageState {
        self.states
            .lock()
            .await
            .get(&resource)
            .cloned()
            .unwrap_or_default()
    }

    pub async fn apply(&self, resource: Resource, event: PageEvent) -> PageState {
        let mut states = self.states.lock().await;
        let current = states.remove(&resource).unwrap_or_default();
        let next = current.apply(event);
        states.insert(resource, next.clone());
        next
    }
}
