use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::resources::Resource;

/// Transient per-row status shown next to a record while a write is in flight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RowStatus {
    #[default]
    Idle,
    Pending,
    Failed,
}

impl RowStatus {
    pub fn css_class(self) -> &'static str {
        match self {
            RowStatus::Idle => "",
            RowStatus::Pending => "row-pending",
            RowStatus::Failed => "row-failed",
        }
    }
}

/// Row flags keyed by resource and record id. Idle rows are not stored.
#[derive(Clone, Default)]
pub struct RowFlags {
    inner: Arc<Mutex<HashMap<(Resource, u64), RowStatus>>>,
}

impl RowFlags {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set(&self, resource: Resource, id: u64, status: RowStatus) {
        let mut flags = self.inner.lock().await;
        if status == RowStatus::Idle {
            flags.remove(&(resource, id));
        } else {
            flags.insert((resource, id), status);
        }
    }

    pub async fn get(&self, resource: Resource, id: u64) -> RowStatus {
        self.inner
            .lock()
            .await
            .get(&(resource, id))
            .copied()
            .unwrap_or_default()
    }

    /// All non-idle rows of one resource.
    pub async fn for_resource(&self, resource: Resource) -> HashMap<u64, RowStatus> {
        self.inner
            .lock()
            .await
            .iter()
            .filter(|((r, _), _)| *r == resource)
            .map(|((_, id), status)| (*id, *status))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unknown_rows_are_idle() {
        let flags = RowFlags::new();
        assert_eq!(flags.get(Resource::Posts, 7).await, RowStatus::Idle);
    }

    #[tokio::test]
    async fn flags_are_scoped_per_resource() {
        let flags = RowFlags::new();
        flags.set(Resource::Posts, 7, RowStatus::Pending).await;
        flags.set(Resource::Todos, 7, RowStatus::Failed).await;

        assert_eq!(flags.get(Resource::Posts, 7).await, RowStatus::Pending);
        assert_eq!(flags.get(Resource::Todos, 7).await, RowStatus::Failed);

        let posts = flags.for_resource(Resource::Posts).await;
        assert_eq!(posts.len(), 1);
        assert_eq!(posts.get(&7), Some(&RowStatus::Pending));
    }

    #[tokio::test]
    async fn setting_idle_clears_the_row() {
        let flags = RowFlags::new();
        flags.set(Resource::Recipes, 3, RowStatus::Failed).await;
        flags.set(Resource::Recipes, 3, RowStatus::Idle).await;
        assert!(flags.for_resource(Resource::Recipes).await.is_empty());
    }
}
