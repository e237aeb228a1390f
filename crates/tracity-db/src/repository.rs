//! Document repository for PostgreSQL.
//!
//! Every record is a row of `documents`: the collection name plus a JSONB
//! body. Query clauses compile to SQL through [`QueryBuilder`], binding both
//! field names and values so no user input is ever spliced into the SQL text.
//! The row's UUID is surfaced as the record's `_id`.

use serde_json::Value;
use sqlx::types::Json;
use sqlx::{PgPool, Pool, Postgres, QueryBuilder};
use tracity_core::Document;
use tracity_core::error::AppError;
use tracity_core::filter::{Condition, QueryClause, SortDirection, SortSpec};

/// Schema statements, executed one by one by [`DocumentRepository::ensure_schema`].
pub const MIGRATIONS: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS documents (
        seq BIGSERIAL PRIMARY KEY,
        id UUID NOT NULL DEFAULT gen_random_uuid(),
        collection VARCHAR NOT NULL,
        body JSONB NOT NULL,
        inserted_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        CONSTRAINT documents_body_is_object CHECK (jsonb_typeof(body) = 'object')
    )"#,
    "CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents(collection, seq)",
    "CREATE INDEX IF NOT EXISTS idx_documents_body ON documents USING GIN (body)",
];

/// Rows per INSERT statement when importing.
const INSERT_CHUNK_SIZE: usize = 1000;

/// Repository for document persistence in PostgreSQL.
///
/// # Examples
///
/// ```no_run
/// use sqlx::postgres::PgPoolOptions;
/// use tracity_db::DocumentRepository;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let pool = PgPoolOptions::new()
///     .max_connections(5)
///     .connect("postgresql://localhost/tracity")
///     .await?;
///
/// let repo = DocumentRepository::new(pool);
/// repo.ensure_schema().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct DocumentRepository {
    pool: Pool<Postgres>,
}

/// Escapes LIKE metacharacters so a prefix matches literally.
fn like_prefix(prefix: &str) -> String {
    let mut pattern = String::with_capacity(prefix.len() + 1);
    for ch in prefix.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

/// Appends `WHERE collection = $1 AND <clause>` to a query.
fn push_filter(qb: &mut QueryBuilder<'_, Postgres>, collection: &str, clause: &QueryClause) {
    qb.push(" WHERE collection = ");
    qb.push_bind(collection.to_string());

    for condition in clause.conditions() {
        match condition {
            Condition::Equals { field, value } => {
                qb.push(" AND (body -> ");
                qb.push_bind(field.clone());
                qb.push(") = ");
                qb.push_bind(Json(value.to_json()));
            }
            Condition::In { field, values } => {
                if values.is_empty() {
                    qb.push(" AND FALSE");
                    continue;
                }
                qb.push(" AND (body -> ");
                qb.push_bind(field.clone());
                qb.push(") IN (");
                let mut list = qb.separated(", ");
                for value in values {
                    list.push_bind(Json(value.to_json()));
                }
                list.push_unseparated(")");
            }
            Condition::AnyPrefix { field, prefixes } => {
                if prefixes.is_empty() {
                    qb.push(" AND FALSE");
                    continue;
                }
                qb.push(" AND (");
                for (i, prefix) in prefixes.iter().enumerate() {
                    if i > 0 {
                        qb.push(" OR ");
                    }
                    qb.push("body ->> ");
                    qb.push_bind(field.clone());
                    qb.push(" LIKE ");
                    qb.push_bind(like_prefix(prefix));
                }
                qb.push(")");
            }
        }
    }
}

/// Appends ORDER BY; insertion order breaks ties and orders unsorted queries.
fn push_sort(qb: &mut QueryBuilder<'_, Postgres>, sort: &SortSpec) {
    qb.push(" ORDER BY ");
    for (field, direction) in sort.pairs() {
        qb.push("body -> ");
        qb.push_bind(field.clone());
        qb.push(match direction {
            SortDirection::Ascending => " ASC, ",
            SortDirection::Descending => " DESC, ",
        });
    }
    qb.push("seq");
}

fn find_query(
    collection: &str,
    clause: &QueryClause,
    sort: &SortSpec,
    limit: usize,
) -> QueryBuilder<'static, Postgres> {
    let mut qb =
        QueryBuilder::new("SELECT body || jsonb_build_object('_id', id::text) FROM documents");
    push_filter(&mut qb, collection, clause);
    push_sort(&mut qb, sort);
    qb.push(" LIMIT ");
    qb.push_bind(i64::try_from(limit).unwrap_or(i64::MAX));
    qb
}

fn count_query(collection: &str, clause: &QueryClause) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("SELECT COUNT(*) FROM documents");
    push_filter(&mut qb, collection, clause);
    qb
}

impl DocumentRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Creates the documents table and indexes when missing.
    pub async fn ensure_schema(&self) -> Result<(), AppError> {
        for migration in MIGRATIONS {
            sqlx::query(migration)
                .execute(&self.pool)
                .await
                .map_err(AppError::DatabaseError)?;
        }
        Ok(())
    }

    /// Collection names, sorted.
    pub async fn list_collections(&self) -> Result<Vec<String>, AppError> {
        sqlx::query_scalar("SELECT DISTINCT collection FROM documents ORDER BY collection")
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::DatabaseError)
    }

    pub async fn count(&self, collection: &str, clause: &QueryClause) -> Result<u64, AppError> {
        let count: i64 = count_query(collection, clause)
            .build_query_scalar()
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::DatabaseError)?;
        Ok(count.max(0) as u64)
    }

    pub async fn find(
        &self,
        collection: &str,
        clause: &QueryClause,
        sort: &SortSpec,
        limit: usize,
    ) -> Result<Vec<Document>, AppError> {
        let rows: Vec<Json<Document>> = find_query(collection, clause, sort, limit)
            .build_query_scalar()
            .fetch_all(&self.pool)
            .await
            .map_err(AppError::DatabaseError)?;
        Ok(rows.into_iter().map(|Json(doc)| doc).collect())
    }

    /// Distinct non-null values of a top-level field.
    pub async fn distinct(&self, collection: &str, field: &str) -> Result<Vec<Value>, AppError> {
        let rows: Vec<Json<Value>> = sqlx::query_scalar(
            r#"
            SELECT DISTINCT body -> $2
            FROM documents
            WHERE collection = $1
              AND body -> $2 IS NOT NULL
              AND body -> $2 <> 'null'::jsonb
            "#,
        )
        .bind(collection)
        .bind(field)
        .fetch_all(&self.pool)
        .await
        .map_err(AppError::DatabaseError)?;
        Ok(rows.into_iter().map(|Json(v)| v).collect())
    }

    /// Inserts documents, chunked to keep statements within the bind limit.
    ///
    /// Any `_id` carried by a document is dropped; the row id replaces it.
    pub async fn insert_many(&self, collection: &str, docs: &[Document]) -> Result<u64, AppError> {
        let mut inserted = 0u64;
        for chunk in docs.chunks(INSERT_CHUNK_SIZE) {
            let mut qb = QueryBuilder::<Postgres>::new("INSERT INTO documents (collection, body) ");
            qb.push_values(chunk, |mut row, doc| {
                let mut body = doc.clone();
                body.remove(tracity_core::models::INTERNAL_ID_FIELD);
                row.push_bind(collection.to_string()).push_bind(Json(body));
            });
            let result = qb
                .build()
                .execute(&self.pool)
                .await
                .map_err(AppError::DatabaseError)?;
            inserted += result.rows_affected();
        }
        tracing::debug!(collection, inserted, "Inserted documents");
        Ok(inserted)
    }

    /// Deletes every document of a collection. Returns the number removed.
    pub async fn drop_collection(&self, collection: &str) -> Result<u64, AppError> {
        let result = sqlx::query("DELETE FROM documents WHERE collection = $1")
            .bind(collection)
            .execute(&self.pool)
            .await
            .map_err(AppError::DatabaseError)?;
        Ok(result.rows_affected())
    }

    /// Checks database connectivity by executing a simple query.
    pub async fn health_check(&self) -> Result<(), AppError> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map_err(AppError::DatabaseError)?;
        Ok(())
    }
}

// =============================================================================
// Trait Implementation: DocumentStore
// =============================================================================

impl tracity_core::traits::DocumentStore for DocumentRepository {
    async fn list_collections(&self) -> Result<Vec<String>, AppError> {
        DocumentRepository::list_collections(self).await
    }

    async fn count(&self, collection: &str, clause: &QueryClause) -> Result<u64, AppError> {
        DocumentRepository::count(self, collection, clause).await
    }

    async fn find(
        &self,
        collection: &str,
        clause: &QueryClause,
        sort: &SortSpec,
        limit: usize,
    ) -> Result<Vec<Document>, AppError> {
        DocumentRepository::find(self, collection, clause, sort, limit).await
    }

    async fn distinct(&self, collection: &str, field: &str) -> Result<Vec<Value>, AppError> {
        DocumentRepository::distinct(self, collection, field).await
    }

    async fn insert_many(&self, collection: &str, docs: &[Document]) -> Result<u64, AppError> {
        DocumentRepository::insert_many(self, collection, docs).await
    }

    async fn health_check(&self) -> Result<(), AppError> {
        DocumentRepository::health_check(self).await
    }
}
