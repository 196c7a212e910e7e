//! Local-optimistic reconciliation between the cached snapshots and the
//! remote API.
//!
//! The cached collection is authoritative. Remote writes are issued for
//! every mutation, but their responses are only consulted for a freshly
//! assigned id; every client-authored field comes from the draft. The
//! demo API does not persist writes, so a `404` for a record that exists
//! locally just means the record was created here and the remote side
//! never heard of it.

pub mod collection;
pub mod flags;

use chrono::Utc;
use serde_json::{json, Value};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;

use crate::cache::{self, CacheBridge, CacheError, Snapshot};
use crate::config::ApiLimits;
use crate::gateway::{ingest, GatewayError, Paging, RemoteGateway};
use crate::resources::{Create, Edit, Record, Resource, Todo, UserRef, ValidationError};

pub use flags::{RowFlags, RowStatus};

#[derive(Debug, Error)]
pub enum SyncError {
    #[error(transparent)]
    Cache(#[from] CacheError),

    #[error(transparent)]
    Gateway(#[from] GatewayError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("No {} with id {id}", .resource.noun())]
    NotFound { resource: Resource, id: u64 },

    #[error("Could not encode request body: {0}")]
    Encoding(#[from] serde_json::Error),
}

impl SyncError {
    /// One line suitable for the page's error banner.
    pub fn user_message(&self) -> String {
        match self {
            SyncError::Gateway(GatewayError::Transport(_)) => {
                "Could not reach the server. Check your connection and try again.".to_string()
            }
            SyncError::Gateway(GatewayError::Status { status, .. }) => {
                format!("The server rejected the request ({status}).")
            }
            SyncError::Gateway(GatewayError::Payload { .. }) => {
                "The server sent a response we could not read.".to_string()
            }
            SyncError::Gateway(GatewayError::InvalidBase(_)) => {
                "The API address is misconfigured.".to_string()
            }
            SyncError::Cache(_) => "Could not save changes locally.".to_string(),
            SyncError::Encoding(_) => "Could not prepare the request.".to_string(),
            SyncError::Validation(e) => e.to_string(),
            SyncError::NotFound { .. } => self.to_string(),
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, SyncError::NotFound { .. })
    }
}

pub type SyncResult<T> = Result<T, SyncError>;

pub struct ResourceSync {
    cache: Arc<dyn CacheBridge>,
    gateway: Arc<dyn RemoteGateway>,
    limits: ApiLimits,
    flags: RowFlags,
    /// One per resource, indexed by `Resource as usize`. Held from the
    /// reload of a snapshot to its save, never across a remote write.
    locks: [Mutex<()>; Resource::ALL.len()],
}

/// Result of [`ResourceSync::lookup`].
#[derive(Debug, Clone, PartialEq)]
pub enum Found<T> {
    /// Present in the cached snapshot; can be edited and deleted.
    Cached(T),
    /// Only known remotely; shown read-only.
    RemoteOnly(T),
}

impl<T> Found<T> {
    pub fn is_cached(&self) -> bool {
        matches!(self, Found::Cached(_))
    }

    pub fn into_record(self) -> T {
        match self {
            Found::Cached(record) | Found::RemoteOnly(record) => record,
        }
    }
}

impl ResourceSync {
    pub fn new(
        cache: Arc<dyn CacheBridge>,
        gateway: Arc<dyn RemoteGateway>,
        limits: ApiLimits,
    ) -> Self {
        Self {
            cache,
            gateway,
            limits,
            flags: RowFlags::new(),
            locks: std::array::from_fn(|_| Mutex::new(())),
        }
    }

    pub fn flags(&self) -> &RowFlags {
        &self.flags
    }

    fn lock_for(&self, resource: Resource) -> &Mutex<()> {
        &self.locks[resource as usize]
    }

    /// Cached snapshot if one exists, otherwise fetch and persist one.
    pub async fn collection<T: Record>(&self) -> SyncResult<Snapshot<T>> {
        if let Some(snapshot) = cache::load::<T>(self.cache.as_ref()).await? {
            return Ok(snapshot);
        }
        let _guard = self.lock_for(T::RESOURCE).lock().await;
        self.load_or_fetch::<T>().await
    }

    /// Caller holds the resource lock.
    async fn load_or_fetch<T: Record>(&self) -> SyncResult<Snapshot<T>> {
        if let Some(snapshot) = cache::load::<T>(self.cache.as_ref()).await? {
            return Ok(snapshot);
        }

        let resource = T::RESOURCE;
        tracing::info!(%resource, "No cached snapshot, fetching from remote");
        let paging = Paging::first(self.limits.for_resource(resource));
        let page = ingest::page::<T>(self.gateway.list(resource, paging).await?)?;
        cache::save(self.cache.as_ref(), &page.items).await?;
        tracing::info!(%resource, count = page.items.len(), total = page.total, "Cached snapshot");

        Ok(Snapshot {
            records: page.items,
            saved_at: Utc::now(),
        })
    }

    /// Drop the snapshot and fetch it again.
    pub async fn refresh<T: Record>(&self) -> SyncResult<Snapshot<T>> {
        let resource = T::RESOURCE;
        let _guard = self.lock_for(resource).lock().await;
        if self.cache.clear(&resource.cache_key()).await? {
            tracing::info!(%resource, "Cleared cached snapshot");
        }
        self.load_or_fetch::<T>().await
    }

    /// Reference user list. Failures degrade to an empty list.
    pub async fn users(&self) -> Vec<UserRef> {
        match self.collection::<UserRef>().await {
            Ok(snapshot) => snapshot.records,
            Err(e) => {
                tracing::warn!("Could not load users: {}", e);
                Vec::new()
            }
        }
    }

    /// A collection and the user list, loaded concurrently.
    pub async fn with_users<T: Record>(&self) -> SyncResult<(Snapshot<T>, Vec<UserRef>)> {
        let (snapshot, users) = tokio::join!(self.collection::<T>(), self.users());
        Ok((snapshot?, users))
    }

    pub async fn find<T: Record>(&self, id: u64) -> SyncResult<T> {
        let snapshot = self.collection::<T>().await?;
        snapshot
            .records
            .into_iter()
            .find(|r| r.id() == id)
            .ok_or(SyncError::NotFound {
                resource: T::RESOURCE,
                id,
            })
    }

    /// Local record if present, otherwise a single remote fetch.
    /// Remote-only records are not added to the snapshot.
    pub async fn lookup<T: Record>(&self, id: u64) -> SyncResult<Found<T>> {
        match self.find::<T>(id).await {
            Ok(record) => Ok(Found::Cached(record)),
            Err(SyncError::NotFound { resource, id }) => {
                match self.gateway.fetch(resource, id).await {
                    Ok(payload) => Ok(Found::RemoteOnly(ingest::record::<T>(payload)?)),
                    Err(e) if e.is_not_found() => Err(SyncError::NotFound { resource, id }),
                    Err(e) => Err(e.into()),
                }
            }
            Err(e) => Err(e),
        }
    }

    pub async fn create<D: Create>(&self, draft: &D) -> SyncResult<D::Record> {
        draft.validate()?;
        let resource = <D::Record as Record>::RESOURCE;
        self.collection::<D::Record>().await?;

        let response = self.gateway.add(resource, serde_json::to_value(draft)?).await?;

        let _guard = self.lock_for(resource).lock().await;
        let mut records = self.load_or_fetch::<D::Record>().await?.records;
        let id = collection::resolve_id(&records, ingest::assigned_id(&response));
        let record = draft.build(id);

        collection::prepend(&mut records, record.clone());
        cache::save(self.cache.as_ref(), &records).await?;
        tracing::info!(%resource, id, "Created record");
        Ok(record)
    }

    pub async fn update<D: Edit>(&self, id: u64, draft: &D) -> SyncResult<D::Record> {
        draft.validate()?;
        let resource = <D::Record as Record>::RESOURCE;
        self.find::<D::Record>(id).await?;

        let body = serde_json::to_value(draft)?;
        local_only_ok(resource, id, self.gateway.update(resource, id, body).await)?;

        let _guard = self.lock_for(resource).lock().await;
        let mut records = self.load_or_fetch::<D::Record>().await?.records;
        let index =
            collection::position(&records, id).ok_or(SyncError::NotFound { resource, id })?;
        let updated = draft.overlay(&records[index]);
        collection::replace(&mut records, updated.clone());
        cache::save(self.cache.as_ref(), &records).await?;
        tracing::info!(%resource, id, "Updated record");
        Ok(updated)
    }

    /// Remove a record. The row is flagged `Pending` while the remote call
    /// runs and `Failed` if anything goes wrong.
    pub async fn delete<T: Record>(&self, id: u64) -> SyncResult<()> {
        let resource = T::RESOURCE;
        self.flags.set(resource, id, RowStatus::Pending).await;

        let outcome = self.delete_record::<T>(id).await;
        let status = match outcome {
            Ok(()) => RowStatus::Idle,
            Err(_) => RowStatus::Failed,
        };
        self.flags.set(resource, id, status).await;
        outcome
    }

    async fn delete_record<T: Record>(&self, id: u64) -> SyncResult<()> {
        let resource = T::RESOURCE;
        let records = self.collection::<T>().await?.records;
        if collection::position(&records, id).is_none() {
            tracing::debug!(%resource, id, "Already absent, nothing to delete");
            return Ok(());
        }

        local_only_ok(resource, id, self.gateway.delete(resource, id).await)?;

        let _guard = self.lock_for(resource).lock().await;
        let mut records = self.load_or_fetch::<T>().await?.records;
        if collection::remove(&mut records, id) {
            cache::save(self.cache.as_ref(), &records).await?;
        }
        tracing::info!(%resource, id, "Deleted record");
        Ok(())
    }

    /// Flip `completed`. The remote response is not consulted.
    pub async fn toggle_todo(&self, id: u64) -> SyncResult<Todo> {
        let resource = Resource::Todos;
        let completed = !self.find::<Todo>(id).await?.completed;

        let body = json!({ "completed": completed });
        local_only_ok(resource, id, self.gateway.update(resource, id, body).await)?;

        let _guard = self.lock_for(resource).lock().await;
        let mut records = self.load_or_fetch::<Todo>().await?.records;
        let index =
            collection::position(&records, id).ok_or(SyncError::NotFound { resource, id })?;
        records[index].completed = completed;
        let toggled = records[index].clone();
        cache::save(self.cache.as_ref(), &records).await?;
        tracing::info!(%resource, id, completed, "Toggled todo");
        Ok(toggled)
    }
}

fn local_only_ok(
    resource: Resource,
    id: u64,
    result: Result<Value, GatewayError>,
) -> Result<(), GatewayError> {
    match result {
        Ok(_) => Ok(()),
        Err(e) if e.is_not_found() => {
            tracing::debug!(%resource, id, "Remote does not know this record, keeping local change");
            Ok(())
        }
        Err(e) => Err(e),
    }
}
