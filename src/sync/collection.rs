//! Pure operations on an in-memory collection snapshot.

use crate::resources::Record;

/// `max(existing ids) + 1`, or 1 for an empty collection.
pub fn next_id<T: Record>(records: &[T]) -> u64 {
    records.iter().map(Record::id).max().unwrap_or(0) + 1
}

/// Accept the remote id only when it is genuinely new for this collection.
pub fn resolve_id<T: Record>(records: &[T], remote: Option<u64>) -> u64 {
    match remote {
        Some(id) if id > 0 && position(records, id).is_none() => id,
        _ => next_id(records),
    }
}

pub fn position<T: Record>(records: &[T], id: u64) -> Option<usize> {
    records.iter().position(|r| r.id() == id)
}

pub fn prepend<T>(records: &mut Vec<T>, record: T) {
    records.insert(0, record);
}

/// Replace the record with the same id in place. Returns false if absent.
pub fn replace<T: Record>(records: &mut [T], record: T) -> bool {
    match position(records, record.id()) {
        Some(index) => {
            records[index] = record;
            true
        }
        None => false,
    }
}

/// Remove every record with `id`. Returns whether anything was removed.
pub fn remove<T: Record>(records: &mut Vec<T>, id: u64) -> bool {
    let before = records.len();
    records.retain(|r| r.id() != id);
    records.len() != before
}
