use serde_json::Value;

use super::GatewayError;
use crate::resources::Record;

/// The records of a list payload `{<resource>: [...], total, skip, limit}`
/// and the remote total.
#[derive(Debug, Clone)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub total: u64,
}

/// Coerce a list payload. Items that do not fit the record shape are
/// dropped with a warning rather than failing the whole page.
pub fn page<T: Record>(payload: Value) -> Result<Page<T>, GatewayError> {
    let resource = T::RESOURCE;
    let Value::Object(mut map) = payload else {
        return Err(GatewayError::Payload {
            resource,
            reason: "expected a JSON object".into(),
        });
    };

    let items = match map.remove(resource.path()) {
        Some(Value::Array(items)) => items,
        _ => {
            return Err(GatewayError::Payload {
                resource,
                reason: format!("missing `{}` array", resource.path()),
            })
        }
    };

    let mut records = Vec::with_capacity(items.len());
    for item in items {
        match serde_json::from_value::<T>(item) {
            Ok(record) => records.push(record),
            Err(e) => tracing::warn!(%resource, "Skipping malformed record: {}", e),
        }
    }

    let total = map
        .get("total")
        .and_then(Value::as_u64)
        .unwrap_or(records.len() as u64);
    Ok(Page {
        total,
        items: records,
    })
}

/// Coerce a single-record payload.
pub fn record<T: Record>(payload: Value) -> Result<T, GatewayError> {
    serde_json::from_value(payload).map_err(|e| GatewayError::Payload {
        resource: T::RESOURCE,
        reason: e.to_string(),
    })
}

/// The id a create response hands back, if any. Zero counts as absent.
pub fn assigned_id(payload: &Value) -> Option<u64> {
    payload
        .get("id")
        .and_then(Value::as_u64)
        .filter(|id| *id > 0)
}
