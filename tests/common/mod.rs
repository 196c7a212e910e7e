#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use serde_json::{json, Value};
use tokio::sync::Notify;

use dummydash::cache::{CacheBridge, MemoryCache};
use dummydash::config::Config;
use dummydash::gateway::{GatewayError, Paging, RemoteGateway};
use dummydash::resources::Resource;
use dummydash::state::AppState;
use dummydash::sync::ResourceSync;

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    List(Resource, Paging),
    Fetch(Resource, u64),
    Add(Resource, Value),
    Update(Resource, u64, Value),
    Delete(Resource, u64),
}

/// Scripted stand-in for the remote API.
///
/// Records registered with `set_list` are "known" remotely; updates,
/// deletes and fetches of any other id answer `404`, like the demo API
/// does for records it never stored.
#[derive(Default)]
pub struct FakeGateway {
    lists: Mutex<HashMap<Resource, Vec<Value>>>,
    known: Mutex<HashMap<(Resource, u64), Value>>,
    assigned_ids: Mutex<HashMap<Resource, u64>>,
    failing: Mutex<HashMap<Resource, u16>>,
    calls: Mutex<Vec<Call>>,
    gates: Mutex<HashMap<(Resource, u64), Arc<Notify>>>,
}

impl FakeGateway {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_list(&self, resource: Resource, items: Vec<Value>) {
        let mut known = self.known.lock().unwrap();
        for item in &items {
            if let Some(id) = item["id"].as_u64() {
                known.insert((resource, id), item.clone());
            }
        }
        self.lists.lock().unwrap().insert(resource, items);
    }

    /// A record the API knows about but does not list.
    pub fn set_remote(&self, resource: Resource, item: Value) {
        if let Some(id) = item["id"].as_u64() {
            self.known.lock().unwrap().insert((resource, id), item);
        }
    }

    /// Updates and deletes of this record wait until the returned handle is
    /// notified.
    pub fn hold(&self, resource: Resource, id: u64) -> Arc<Notify> {
        let gate = Arc::new(Notify::new());
        self.gates
            .lock()
            .unwrap()
            .insert((resource, id), gate.clone());
        gate
    }

    /// Id the next `add` responses carry. Without one the response has no id.
    pub fn assign_id(&self, resource: Resource, id: u64) {
        self.assigned_ids.lock().unwrap().insert(resource, id);
    }

    /// Every call for the resource answers with this status.
    pub fn fail(&self, resource: Resource, status: u16) {
        self.failing.lock().unwrap().insert(resource, status);
    }

    pub fn recover(&self, resource: Resource) {
        self.failing.lock().unwrap().remove(&resource);
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn list_calls(&self, resource: Resource) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::List(r, _) if *r == resource))
            .count()
    }

    pub fn write_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, Call::Add(..) | Call::Update(..) | Call::Delete(..)))
            .count()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    async fn pass_gate(&self, resource: Resource, id: u64) {
        let gate = self.gates.lock().unwrap().get(&(resource, id)).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
    }

    fn check(&self, resource: Resource) -> Result<(), GatewayError> {
        match self.failing.lock().unwrap().get(&resource) {
            Some(&status) => Err(GatewayError::Status { resource, status }),
            None => Ok(()),
        }
    }

    fn known(&self, resource: Resource, id: u64) -> Result<Value, GatewayError> {
        self.known
            .lock()
            .unwrap()
            .get(&(resource, id))
            .cloned()
            .ok_or(GatewayError::Status {
                resource,
                status: 404,
            })
    }
}

#[async_trait]
impl RemoteGateway for FakeGateway {
    async fn list(&self, resource: Resource, paging: Paging) -> Result<Value, GatewayError> {
        self.record(Call::List(resource, paging));
        self.check(resource)?;
        let items = self
            .lists
            .lock()
            .unwrap()
            .get(&resource)
            .cloned()
            .unwrap_or_default();
        let total = items.len();
        let mut payload = json!({ "total": total, "skip": 0, "limit": total });
        payload[resource.path()] = Value::Array(items);
        Ok(payload)
    }

    async fn fetch(&self, resource: Resource, id: u64) -> Result<Value, GatewayError> {
        self.record(Call::Fetch(resource, id));
        self.check(resource)?;
        self.known(resource, id)
    }

    async fn add(&self, resource: Resource, body: Value) -> Result<Value, GatewayError> {
        self.record(Call::Add(resource, body.clone()));
        self.check(resource)?;
        let mut response = body;
        if let Some(id) = self.assigned_ids.lock().unwrap().get(&resource) {
            response["id"] = json!(id);
        }
        Ok(response)
    }

    async fn update(
        &self,
        resource: Resource,
        id: u64,
        body: Value,
    ) -> Result<Value, GatewayError> {
        self.record(Call::Update(resource, id, body.clone()));
        self.pass_gate(resource, id).await;
        self.check(resource)?;
        let mut merged = self.known(resource, id)?;
        if let (Some(target), Some(fields)) = (merged.as_object_mut(), body.as_object()) {
            for (key, value) in fields {
                target.insert(key.clone(), value.clone());
            }
        }
        Ok(merged)
    }

    async fn delete(&self, resource: Resource, id: u64) -> Result<Value, GatewayError> {
        self.record(Call::Delete(resource, id));
        self.pass_gate(resource, id).await;
        self.check(resource)?;
        let mut deleted = self.known(resource, id)?;
        deleted["isDeleted"] = json!(true);
        Ok(deleted)
    }
}

pub struct Harness {
    pub gateway: Arc<FakeGateway>,
    pub cache: Arc<MemoryCache>,
    pub sync: ResourceSync,
}

pub fn harness(gateway: Arc<FakeGateway>) -> Harness {
    let cache = Arc::new(MemoryCache::new());
    let sync = ResourceSync::new(
        cache.clone() as Arc<dyn CacheBridge>,
        gateway.clone() as Arc<dyn RemoteGateway>,
        Config::default().api.limits,
    );
    Harness {
        gateway,
        cache,
        sync,
    }
}

pub fn app_state(gateway: Arc<FakeGateway>) -> AppState {
    let Harness { sync, .. } = harness(gateway);
    AppState::new(Config::default(), sync)
}

// --- Payload builders ---

pub fn todo(id: u64, text: &str, completed: bool, user_id: u64) -> Value {
    json!({ "id": id, "todo": text, "completed": completed, "userId": user_id })
}

pub fn post(id: u64, title: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "body": format!("Body of {title}"),
        "userId": 1,
        "tags": ["history"],
        "reactions": { "likes": 12, "dislikes": 3 },
        "views": 305
    })
}

pub fn comment(id: u64, body: &str, username: &str) -> Value {
    json!({
        "id": id,
        "body": body,
        "postId": 1,
        "likes": 2,
        "user": { "id": 5, "username": username, "fullName": "Some Person" }
    })
}

pub fn product(id: u64, title: &str) -> Value {
    json!({
        "id": id,
        "title": title,
        "description": "A thing",
        "price": 9.99,
        "category": "misc",
        "stock": 4,
        "rating": 4.5,
        "discountPercentage": 10.0
    })
}

pub fn recipe(id: u64, name: &str) -> Value {
    json!({
        "id": id,
        "name": name,
        "ingredients": ["2 cups flour", "1 egg"],
        "instructions": ["Mix", "Bake"],
        "prepTimeMinutes": 10,
        "cookTimeMinutes": 20,
        "servings": 4,
        "difficulty": "Medium",
        "cuisine": "Italian",
        "caloriesPerServing": 300,
        "tags": ["dinner"],
        "userId": 7,
        "image": "https://cdn.example/pizza.webp"
    })
}

pub fn user(id: u64, username: &str) -> Value {
    json!({ "id": id, "username": username })
}
