//! PostgreSQL Store
//!
//! Each collection is a table `(seq BIGSERIAL, id UUID PRIMARY KEY, doc JSONB)`.
//! `seq` records insertion order and is the default (and tie-breaking)
//! ordering. Unique fields are backed by expression indexes, so a colliding
//! insert fails inside the database rather than after a separate lookup.

use async_trait::async_trait;
use serde_json::{Map, Value};
use sqlx::{PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use super::{
    Collection, Document, Filter, FindOptions, SortDirection, Store, StoreError, StoreResult,
    Update, UpdateOutcome, field_path,
};

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn find(
        &self,
        collection: Collection,
        filter: &Filter,
        options: FindOptions,
    ) -> StoreResult<Vec<Document>> {
        let mut query = QueryBuilder::<Postgres>::new("SELECT id, doc FROM ");
        query.push(collection.name()).push(" WHERE ");
        push_filter(&mut query, filter);

        query.push(" ORDER BY ");
        if let Some(sort) = options.sort {
            query
                .push("(doc #>> ")
                .push_bind(field_path(sort.field))
                .push(") COLLATE \"C\" ")
                .push(match sort.direction {
                    SortDirection::Ascending => "ASC",
                    SortDirection::Descending => "DESC",
                })
                .push(" NULLS LAST, ");
        }
        query.push("seq ASC");

        if let Some(limit) = options.limit {
            query.push(" LIMIT ").push_bind(to_i64(limit));
        }
        if options.skip > 0 {
            query.push(" OFFSET ").push_bind(to_i64(options.skip));
        }

        let rows = query
            .build_query_as::<DocumentRow>()
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(Document::try_from).collect()
    }

    async fn find_one(
        &self,
        collection: Collection,
        filter: &Filter,
    ) -> StoreResult<Option<Document>> {
        let mut query = QueryBuilder::<Postgres>::new("SELECT id, doc FROM ");
        query.push(collection.name()).push(" WHERE ");
        push_filter(&mut query, filter);
        query.push(" ORDER BY seq ASC LIMIT 1");

        let row = query
            .build_query_as::<DocumentRow>()
            .fetch_optional(&self.pool)
            .await?;

        row.map(Document::try_from).transpose()
    }

    async fn insert_one(&self, collection: Collection, document: Document) -> StoreResult<Uuid> {
        let mut query = QueryBuilder::<Postgres>::new("INSERT INTO ");
        query
            .push(collection.name())
            .push(" (id, doc) VALUES (")
            .push_bind(document.id)
            .push(", ")
            .push_bind(Value::Object(document.fields))
            .push(")");

        query
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, collection))?;

        Ok(document.id)
    }

    async fn update_one(
        &self,
        collection: Collection,
        id: Uuid,
        update: &Update,
        upsert: bool,
    ) -> StoreResult<UpdateOutcome> {
        let table = collection.name();

        if !upsert {
            let mut query = QueryBuilder::<Postgres>::new("UPDATE ");
            query.push(table).push(" SET doc = ");
            push_update_expr(&mut query, "doc", update);
            query.push(" WHERE id = ").push_bind(id);

            let result = query
                .build()
                .execute(&self.pool)
                .await
                .map_err(|e| map_unique_violation(e, collection))?;

            let matched = result.rows_affected();
            return Ok(UpdateOutcome {
                matched,
                modified: matched,
                upserted_id: None,
            });
        }

        // xmax = 0 only for a freshly inserted row version
        let mut query = QueryBuilder::<Postgres>::new("INSERT INTO ");
        query
            .push(table)
            .push(" (id, doc) VALUES (")
            .push_bind(id)
            .push(", ");
        push_update_expr(&mut query, "'{}'::jsonb", update);
        query.push(") ON CONFLICT (id) DO UPDATE SET doc = ");
        let current = format!("{}.doc", table);
        push_update_expr(&mut query, &current, update);
        query.push(" RETURNING (xmax = 0) AS inserted");

        let inserted = query
            .build_query_scalar::<bool>()
            .fetch_one(&self.pool)
            .await
            .map_err(|e| map_unique_violation(e, collection))?;

        Ok(if inserted {
            UpdateOutcome {
                matched: 0,
                modified: 0,
                upserted_id: Some(id),
            }
        } else {
            UpdateOutcome {
                matched: 1,
                modified: 1,
                upserted_id: None,
            }
        })
    }

    async fn delete_one(&self, collection: Collection, id: Uuid) -> StoreResult<u64> {
        let mut query = QueryBuilder::<Postgres>::new("DELETE FROM ");
        query.push(collection.name()).push(" WHERE id = ").push_bind(id);

        let result = query.build().execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn count_documents(&self, collection: Collection, filter: &Filter) -> StoreResult<u64> {
        let mut query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM ");
        query.push(collection.name()).push(" WHERE ");
        push_filter(&mut query, filter);

        let count = query
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        Ok(count.max(0) as u64)
    }
}

// =============================================================================
// SQL Generation
// =============================================================================

fn push_filter(query: &mut QueryBuilder<'_, Postgres>, filter: &Filter) {
    match filter {
        Filter::All => {
            query.push("TRUE");
        }
        Filter::Id(id) => {
            query.push("id = ").push_bind(*id);
        }
        Filter::Eq { field, value } => {
            query
                .push("(doc #>> ")
                .push_bind(field_path(field))
                .push(") = ")
                .push_bind(value.clone());
        }
        // case folding follows the database collation (ASCII-only under "C")
        Filter::ContainsIgnoreCase { field, needle } => {
            query
                .push("(doc #>> ")
                .push_bind(field_path(field))
                .push(") ILIKE ")
                .push_bind(format!("%{}%", escape_like(needle)))
                .push(" ESCAPE '\\'");
        }
        Filter::And(filters) => {
            query.push("(");
            for (i, f) in filters.iter().enumerate() {
                if i > 0 {
                    query.push(" AND ");
                }
                push_filter(query, f);
            }
            query.push(")");
        }
    }
}

/// Push an expression computing the updated document from `current`
fn push_update_expr(query: &mut QueryBuilder<'_, Postgres>, current: &str, update: &Update) {
    match update {
        Update::Set(fields) => {
            query
                .push(current)
                .push(" || ")
                .push_bind(Value::Object(fields.clone()));
        }
        Update::Increment { field, by } => {
            query
                .push("jsonb_set(")
                .push(current)
                .push(", ARRAY[")
                .push_bind(field.to_string())
                .push("::text], to_jsonb(COALESCE((")
                .push(current)
                .push(" ->> ")
                .push_bind(field.to_string())
                .push("::text)::bigint, 0) + ")
                .push_bind(*by)
                .push("))");
        }
    }
}

/// Make user input literal inside a LIKE pattern
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn to_i64(value: u64) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn map_unique_violation(err: sqlx::Error, collection: Collection) -> StoreError {
    match &err {
        sqlx::Error::Database(db) if db.is_unique_violation() => {
            StoreError::Conflict(collection.name())
        }
        _ => StoreError::Database(err),
    }
}

// =============================================================================
// Database Row Types
// =============================================================================

#[derive(sqlx::FromRow)]
struct DocumentRow {
    id: Uuid,
    doc: serde_json::Value,
}

impl TryFrom<DocumentRow> for Document {
    type Error = StoreError;

    fn try_from(row: DocumentRow) -> Result<Self, Self::Error> {
        match row.doc {
            Value::Object(fields) => Ok(Document::new(row.id, strip_id(fields))),
            other => Err(StoreError::Malformed(format!(
                "document {} is not an object: {}",
                row.id, other
            ))),
        }
    }
}

fn strip_id(mut fields: Map<String, Value>) -> Map<String, Value> {
    fields.remove(super::ID_KEY);
    fields
}
