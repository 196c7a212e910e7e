use std::sync::Arc;
use tokio::sync::Mutex;

/// What an open form is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorTarget {
    New,
    Existing(u64),
}

/// The one form draft that is currently open, kept server-side so list
/// edits and failed saves do not lose what was typed.
#[derive(Clone)]
pub struct DraftEditor<D> {
    open: Arc<Mutex<Option<(EditorTarget, D)>>>,
}

impl<D> Default for DraftEditor<D> {
    fn default() -> Self {
        Self {
            open: Arc::new(Mutex::new(None)),
        }
    }
}

impl<D: Clone> DraftEditor<D> {
    pub fn new() -> Self {
        Self::default()
    }

    /// The open draft, if it belongs to `target`.
    pub async fn current(&self, target: EditorTarget) -> Option<D> {
        match &*self.open.lock().await {
            Some((open, draft)) if *open == target => Some(draft.clone()),
            _ => None,
        }
    }

    /// The draft for `target`, opening it from `seed` when another form (or
    /// none) was open.
    pub async fn open(&self, target: EditorTarget, seed: impl FnOnce() -> D) -> D {
        let mut open = self.open.lock().await;
        match &*open {
            Some((current, draft)) if *current == target => draft.clone(),
            _ => {
                let draft = seed();
                *open = Some((target, draft.clone()));
                draft
            }
        }
    }

    pub async fn put(&self, target: EditorTarget, draft: D) {
        *self.open.lock().await = Some((target, draft));
    }

    pub async fn close(&self) {
        *self.open.lock().await = None;
    }
}
