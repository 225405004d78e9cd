//! Store Module
//!
//! Document store abstraction the repositories talk to. Records are JSON
//! objects keyed by UUID and grouped in collections. Two implementations:
//! - `PgStore`: PostgreSQL, one JSONB document per row
//! - `MemoryStore`: process-local, used for `memory://` and in tests
//!
//! Filters and updates are small typed trees rather than query strings so
//! both implementations evaluate exactly the same predicate.

pub mod memory;
pub mod postgres;

pub use memory::MemoryStore;
pub use postgres::PgStore;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use uuid::Uuid;

/// Document key carrying the record id on the wire
pub const ID_KEY: &str = "_id";

/// Store error type
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// An insert or update collided with a unique constraint
    #[error("unique constraint violated in {0}")]
    Conflict(&'static str),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("malformed document: {0}")]
    Malformed(String),

    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(err: serde_json::Error) -> Self {
        StoreError::Malformed(err.to_string())
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Record collections
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Collection {
    Jobs,
    Bids,
}

impl Collection {
    /// Collection (and table) name
    pub fn name(self) -> &'static str {
        match self {
            Collection::Jobs => "jobs",
            Collection::Bids => "bids",
        }
    }

    /// Fields whose combined values must be unique across the collection
    ///
    /// Must agree with the unique indexes created in `db::run_migrations`.
    pub fn unique_fields(self) -> &'static [&'static str] {
        match self {
            Collection::Jobs => &[],
            Collection::Bids => &["email", "jobId"],
        }
    }
}

/// A stored record: its id plus its fields (the id is never among the fields)
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: Uuid,
    pub fields: Map<String, Value>,
}

impl Document {
    pub fn new(id: Uuid, fields: Map<String, Value>) -> Self {
        Self { id, fields }
    }

    /// Decode into a domain type that reads its id from `_id`
    pub fn decode<T: DeserializeOwned>(self) -> StoreResult<T> {
        let mut fields = self.fields;
        fields.insert(ID_KEY.to_string(), Value::String(self.id.to_string()));
        Ok(serde_json::from_value(Value::Object(fields))?)
    }
}

/// Predicate over documents
///
/// Field names are dotted paths (`buyer.email`) into nested objects.
#[derive(Debug, Clone, PartialEq)]
pub enum Filter {
    /// Matches every document
    All,
    /// Matches the document with this id
    Id(Uuid),
    /// Field is a string equal to `value`
    Eq { field: &'static str, value: String },
    /// Field is a string containing `needle`, ignoring case
    ContainsIgnoreCase { field: &'static str, needle: String },
    /// Every sub-filter matches
    And(Vec<Filter>),
}

impl Filter {
    pub fn eq(field: &'static str, value: impl Into<String>) -> Self {
        Filter::Eq {
            field,
            value: value.into(),
        }
    }

    pub fn contains_ignore_case(field: &'static str, needle: impl Into<String>) -> Self {
        Filter::ContainsIgnoreCase {
            field,
            needle: needle.into(),
        }
    }

    /// Conjunction that collapses trivial cases
    pub fn and(filters: Vec<Filter>) -> Self {
        let mut filters: Vec<Filter> = filters
            .into_iter()
            .filter(|f| *f != Filter::All)
            .collect();
        match filters.len() {
            0 => Filter::All,
            1 => filters.remove(0),
            _ => Filter::And(filters),
        }
    }
}

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Ascending,
    Descending,
}

/// Ordering on one field; documents missing the field come last
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sort {
    pub field: &'static str,
    pub direction: SortDirection,
}

/// Ordering and windowing for `find`
///
/// Without a sort, documents come back in insertion order. Ties under a sort
/// also keep insertion order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FindOptions {
    pub sort: Option<Sort>,
    pub skip: u64,
    pub limit: Option<u64>,
}

/// Modification applied by `update_one`
#[derive(Debug, Clone, PartialEq)]
pub enum Update {
    /// Shallow merge: listed top-level keys replace, others stay
    Set(Map<String, Value>),
    /// Atomic add to an integer field (absent counts as zero)
    Increment { field: &'static str, by: i64 },
}

/// What an `update_one` touched
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpdateOutcome {
    pub matched: u64,
    pub modified: u64,
    pub upserted_id: Option<Uuid>,
}

/// Document store capability
///
/// Implementations must be safe for concurrent use. `insert_one` enforces
/// the collection's unique fields atomically and reports a collision as
/// `StoreError::Conflict`; `Update::Increment` is a single atomic operation.
#[async_trait]
pub trait Store: Send + Sync {
    async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
        options: FindOptions,
    ) -> StoreResult<Vec<Document>>;

    async fn find_one(&self, collection: Collection, filter: &Filter)
    -> StoreResult<Option<Document>>;

    async fn insert_one(&self, collection: Collection, document: Document) -> StoreResult<Uuid>;

    /// Apply `update` to the document with `id`; with `upsert`, a missing
    /// document is created from the update under that id
    async fn update_one(
        &self,
        collection: Collection,
        id: Uuid,
        update: &Update,
        upsert: bool,
    ) -> StoreResult<UpdateOutcome>;

    /// Returns the number of deleted documents (0 or 1)
    async fn delete_one(&self, collection: Collection, id: Uuid) -> StoreResult<u64>;

    async fn count_documents(&self, collection: Collection, filter: &Filter) -> StoreResult<u64>;
}

/// Split a dotted field path into its segments
pub(crate) fn field_path(field: &str) -> Vec<String> {
    field.split('.').map(str::to_string).collect()
}
