//! In-memory Store
//!
//! Keeps every collection as an insertion-ordered list behind one mutex.
//! Each operation holds the lock for its whole duration, which makes the
//! unique check in `insert_one` and `Update::Increment` atomic.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::{
    Collection, Document, Filter, FindOptions, Sort, SortDirection, Store, StoreError,
    StoreResult, Update, UpdateOutcome,
};

#[derive(Debug, Default)]
pub struct MemoryStore {
    collections: Mutex<HashMap<Collection, Vec<Document>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, HashMap<Collection, Vec<Document>>>> {
        self.collections
            .lock()
            .map_err(|_| StoreError::Unavailable("memory store lock poisoned".to_string()))
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
        options: FindOptions,
    ) -> StoreResult<Vec<Document>> {
        let collections = self.lock()?;
        let mut matched: Vec<Document> = collections
            .get(&collection)
            .map(|docs| docs.iter().filter(|d| matches(filter, d)).cloned().collect())
            .unwrap_or_default();

        if let Some(sort) = options.sort {
            // stable sort keeps insertion order among ties
            matched.sort_by(|a, b| compare_for_sort(a, b, sort));
        }

        let skip = usize::try_from(options.skip).unwrap_or(usize::MAX);
        let limit = options
            .limit
            .map(|l| usize::try_from(l).unwrap_or(usize::MAX))
            .unwrap_or(usize::MAX);

        Ok(matched.into_iter().skip(skip).take(limit).collect())
    }

    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> StoreResult<Option<Document>> {
        let collections = self.lock()?;
        Ok(collections
            .get(&collection)
            .and_then(|docs| docs.iter().find(|d| matches(filter, d)).cloned()))
    }

    async fn insert_one(&self, collection: Collection, document: Document) -> StoreResult<Uuid> {
        let mut collections = self.lock()?;
        let docs = collections.entry(collection).or_default();

        if docs.iter().any(|d| d.id == document.id) {
            return Err(StoreError::Conflict(collection.name()));
        }
        let unique = collection.unique_fields();
        if !unique.is_empty()
            && docs
                .iter()
                .any(|d| same_unique_key(unique, &d.fields, &document.fields))
        {
            return Err(StoreError::Conflict(collection.name()));
        }

        let id = document.id;
        docs.push(document);
        Ok(id)
    }

    async fn update_one(
        &self,
        collection: Collection,
        id: Uuid,
        update: &Update,
        upsert: bool,
    ) -> StoreResult<UpdateOutcome> {
        let mut collections = self.lock()?;
        let docs = collections.entry(collection).or_default();

        if let Some(position) = docs.iter().position(|d| d.id == id) {
            let mut fields = docs[position].fields.clone();
            apply_update(&mut fields, update)?;

            let unique = collection.unique_fields();
            if !unique.is_empty()
                && docs
                    .iter()
                    .any(|d| d.id != id && same_unique_key(unique, &d.fields, &fields))
            {
                return Err(StoreError::Conflict(collection.name()));
            }

            docs[position].fields = fields;
            return Ok(UpdateOutcome {
                matched: 1,
                modified: 1,
                upserted_id: None,
            });
        }

        if !upsert {
            return Ok(UpdateOutcome::default());
        }

        let mut fields = Map::new();
        apply_update(&mut fields, update)?;
        docs.push(Document::new(id, fields));

        Ok(UpdateOutcome {
            matched: 0,
            modified: 0,
            upserted_id: Some(id),
        })
    }

    async fn delete_one(&self, collection: Collection, id: Uuid) -> StoreResult<u64> {
        let mut collections = self.lock()?;
        let Some(docs) = collections.get_mut(&collection) else {
            return Ok(0);
        };

        match docs.iter().position(|d| d.id == id) {
            Some(position) => {
                docs.remove(position);
                Ok(1)
            }
            None => Ok(0),
        }
    }

    async fn count_documents(&self, collection: Collection, filter: &Filter) -> StoreResult<u64> {
        let collections = self.lock()?;
        Ok(collections
            .get(&collection)
            .map(|docs| docs.iter().filter(|d| matches(filter, d)).count() as u64)
            .unwrap_or(0))
    }
}

// =============================================================================
// Evaluation
// =============================================================================

fn lookup<'a>(fields: &'a Map<String, Value>, field: &str) -> Option<&'a Value> {
    let mut segments = field.split('.');
    let mut current = fields.get(segments.next()?)?;
    for segment in segments {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

fn matches(filter: &Filter, document: &Document) -> bool {
    match filter {
        Filter::All => true,
        Filter::Id(id) => document.id == *id,
        Filter::Eq { field, value } => {
            lookup(&document.fields, field).and_then(Value::as_str) == Some(value.as_str())
        }
        // Unicode lowercase folding; PgStore's ILIKE folds per the database
        // collation, which may leave non-ASCII letters case-sensitive
        Filter::ContainsIgnoreCase { field, needle } => lookup(&document.fields, field)
            .and_then(Value::as_str)
            .is_some_and(|s| s.to_lowercase().contains(&needle.to_lowercase())),
        Filter::And(filters) => filters.iter().all(|f| matches(f, document)),
    }
}

/// Two documents collide when every unique field is present and equal in both
fn same_unique_key(unique: &[&str], a: &Map<String, Value>, b: &Map<String, Value>) -> bool {
    unique.iter().all(|field| match (a.get(*field), b.get(*field)) {
        (Some(x), Some(y)) => !x.is_null() && x == y,
        _ => false,
    })
}

fn apply_update(fields: &mut Map<String, Value>, update: &Update) -> StoreResult<()> {
    match update {
        Update::Set(set) => {
            for (key, value) in set {
                fields.insert(key.clone(), value.clone());
            }
        }
        Update::Increment { field, by } => {
            let current = match fields.get(*field) {
                None | Some(Value::Null) => 0,
                Some(value) => value.as_i64().ok_or_else(|| {
                    StoreError::Malformed(format!("field {} is not an integer", field))
                })?,
            };
            fields.insert(field.to_string(), Value::from(current + by));
        }
    }
    Ok(())
}

fn compare_values(a: &Value, b: &Value) -> Ordering {
    match (a, b) {
        (Value::String(x), Value::String(y)) => x.as_bytes().cmp(y.as_bytes()),
        (Value::Number(x), Value::Number(y)) => {
            let (x, y) = (x.as_f64().unwrap_or(0.0), y.as_f64().unwrap_or(0.0));
            x.partial_cmp(&y).unwrap_or(Ordering::Equal)
        }
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        _ => type_rank(a).cmp(&type_rank(b)),
    }
}

fn type_rank(value: &Value) -> u8 {
    match value {
        Value::Null => 0,
        Value::Number(_) => 1,
        Value::String(_) => 2,
        Value::Bool(_) => 3,
        Value::Array(_) => 4,
        Value::Object(_) => 5,
    }
}

fn compare_for_sort(a: &Document, b: &Document, sort: Sort) -> Ordering {
    let present = |d: &Document| lookup(&d.fields, sort.field).filter(|v| !v.is_null()).cloned();
    match (present(a), present(b)) {
        (Some(x), Some(y)) => match sort.direction {
            SortDirection::Ascending => compare_values(&x, &y),
            SortDirection::Descending => compare_values(&y, &x),
        },
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn fields(value: Value) -> Map<String, Value> {
        value.as_object().cloned().unwrap()
    }

    async fn insert(store: &MemoryStore, collection: Collection, value: Value) -> Uuid {
        store
            .insert_one(collection, Document::new(Uuid::new_v4(), fields(value)))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_find_preserves_insertion_order() {
        let store = MemoryStore::new();
        let first = insert(&store, Collection::Jobs, json!({ "n": 1 })).await;
        let second = insert(&store, Collection::Jobs, json!({ "n": 2 })).await;
        let third = insert(&store, Collection::Jobs, json!({ "n": 3 })).await;

        let docs = store
            .find(Collection::Jobs, &Filter::All, FindOptions::default())
            .await
            .unwrap();
        let ids: Vec<Uuid> = docs.iter().map(|d| d.id).collect();
        assert_eq!(ids, vec![first, second, third]);
    }

    #[tokio::test]
    async fn test_nested_eq_and_contains() {
        let store = MemoryStore::new();
        insert(
            &store,
            Collection::Jobs,
            json!({ "job_title": "Senior Engineer", "buyer": { "email": "a@x.com" } }),
        )
        .await;
        insert(
            &store,
            Collection::Jobs,
            json!({ "job_title": "Designer", "buyer": { "email": "b@x.com" } }),
        )
        .await;

        let owned = store
            .count_documents(Collection::Jobs, &Filter::eq("buyer.email", "a@x.com"))
            .await
            .unwrap();
        assert_eq!(owned, 1);

        let engineers = store
            .count_documents(
                Collection::Jobs,
                &Filter::contains_ignore_case("job_title", "ENGINEER"),
            )
            .await
            .unwrap();
        assert_eq!(engineers, 1);
    }

    #[tokio::test]
    async fn test_contains_folds_non_ascii_case() {
        let store = MemoryStore::new();
        insert(&store, Collection::Jobs, json!({ "job_title": "Ingénieur LOGICIEL" })).await;
        insert(&store, Collection::Jobs, json!({ "job_title": "Straße Designer" })).await;

        for (needle, expected) in [("INGÉNIEUR", 1), ("logiciel", 1), ("STRASSE", 0), ("straße", 1)] {
            let found = store
                .count_documents(
                    Collection::Jobs,
                    &Filter::contains_ignore_case("job_title", needle),
                )
                .await
                .unwrap();
            assert_eq!(found, expected, "{}", needle);
        }
    }

    #[tokio::test]
    async fn test_unique_fields_conflict() {
        let store = MemoryStore::new();
        let job_id = Uuid::new_v4().to_string();
        insert(
            &store,
            Collection::Bids,
            json!({ "email": "f@x.com", "jobId": job_id }),
        )
        .await;

        let duplicate = store
            .insert_one(
                Collection::Bids,
                Document::new(
                    Uuid::new_v4(),
                    fields(json!({ "email": "f@x.com", "jobId": job_id })),
                ),
            )
            .await;
        assert!(matches!(duplicate, Err(StoreError::Conflict("bids"))));

        // a different bidder on the same job is fine
        insert(
            &store,
            Collection::Bids,
            json!({ "email": "g@x.com", "jobId": job_id }),
        )
        .await;
        let total = store
            .count_documents(Collection::Bids, &Filter::All)
            .await
            .unwrap();
        assert_eq!(total, 2);
    }

    #[tokio::test]
    async fn test_set_merges_and_upserts() {
        let store = MemoryStore::new();
        let id = insert(&store, Collection::Jobs, json!({ "a": 1, "b": 2 })).await;

        let outcome = store
            .update_one(
                Collection::Jobs,
                id,
                &Update::Set(fields(json!({ "b": 3, "c": 4 }))),
                true,
            )
            .await
            .unwrap();
        assert_eq!(outcome.matched, 1);
        assert_eq!(outcome.upserted_id, None);

        let doc = store
            .find_one(Collection::Jobs, &Filter::Id(id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc.fields, fields(json!({ "a": 1, "b": 3, "c": 4 })));

        let fresh = Uuid::new_v4();
        let outcome = store
            .update_one(
                Collection::Jobs,
                fresh,
                &Update::Set(fields(json!({ "a": 9 }))),
                true,
            )
            .await
            .unwrap();
        assert_eq!(outcome.matched, 0);
        assert_eq!(outcome.upserted_id, Some(fresh));
    }

    #[tokio::test]
    async fn test_update_without_upsert_ignores_missing() {
        let store = MemoryStore::new();
        let outcome = store
            .update_one(
                Collection::Bids,
                Uuid::new_v4(),
                &Update::Set(fields(json!({ "status": "Rejected" }))),
                false,
            )
            .await
            .unwrap();
        assert_eq!(outcome, UpdateOutcome::default());
        assert_eq!(
            store
                .count_documents(Collection::Bids, &Filter::All)
                .await
                .unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn test_increment_treats_absent_as_zero() {
        let store = MemoryStore::new();
        let id = insert(&store, Collection::Jobs, json!({})).await;
        let bump = Update::Increment {
            field: "bid_count",
            by: 1,
        };

        store
            .update_one(Collection::Jobs, id, &bump, false)
            .await
            .unwrap();
        store
            .update_one(Collection::Jobs, id, &bump, false)
            .await
            .unwrap();

        let doc = store
            .find_one(Collection::Jobs, &Filter::Id(id))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(doc.fields.get("bid_count"), Some(&json!(2)));
    }

    #[tokio::test]
    async fn test_sort_puts_missing_last_and_windows() {
        let store = MemoryStore::new();
        insert(&store, Collection::Jobs, json!({ "deadline": "2025-03-01T00:00:00.000Z" })).await;
        let undated = insert(&store, Collection::Jobs, json!({})).await;
        insert(&store, Collection::Jobs, json!({ "deadline": "2025-01-01T00:00:00.000Z" })).await;

        let descending = store
            .find(
                Collection::Jobs,
                &Filter::All,
                FindOptions {
                    sort: Some(Sort {
                        field: "deadline",
                        direction: SortDirection::Descending,
                    }),
                    skip: 0,
                    limit: None,
                },
            )
            .await
            .unwrap();
        let deadlines: Vec<Option<&Value>> =
            descending.iter().map(|d| d.fields.get("deadline")).collect();
        assert_eq!(
            deadlines,
            vec![
                Some(&json!("2025-03-01T00:00:00.000Z")),
                Some(&json!("2025-01-01T00:00:00.000Z")),
                None,
            ]
        );
        assert_eq!(descending[2].id, undated);

        let window = store
            .find(
                Collection::Jobs,
                &Filter::All,
                FindOptions {
                    sort: None,
                    skip: 1,
                    limit: Some(1),
                },
            )
            .await
            .unwrap();
        assert_eq!(window.len(), 1);
        assert_eq!(window[0].id, undated);
    }

    #[tokio::test]
    async fn test_delete_missing_is_zero() {
        let store = MemoryStore::new();
        assert_eq!(
            store
                .delete_one(Collection::Jobs, Uuid::new_v4())
                .await
                .unwrap(),
            0
        );
    }
}
