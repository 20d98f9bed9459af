//! PostgreSQL document store.
//!
//! All kinds share one `documents` table holding a JSONB body per record.
//! Filters run as JSONB containment and `seq` preserves insertion order.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{postgres::PgPoolOptions, Pool, Postgres};
use uuid::Uuid;

use super::{Document, DocumentStore, Filter};
use crate::{
    config::StoreConfig,
    error::{AppError, AppResult},
    models::{EntityKind, RecordId},
};

#[derive(Clone)]
pub struct PgDocumentStore {
    pool: Pool<Postgres>,
}

impl PgDocumentStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Open a connection pool and bring the schema up to date
    pub async fn connect(config: &StoreConfig) -> AppResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(config.max_connections)
            .min_connections(config.min_connections)
            .connect(&config.url)
            .await?;

        tracing::info!("Connected to database");

        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|e| AppError::Store(format!("Migration failed: {}", e)))?;

        tracing::info!("Database migrations completed");

        Ok(Self::new(pool))
    }
}

fn into_document((id, body): (Uuid, Value)) -> Document {
    Document {
        id: RecordId::from(id),
        body,
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    async fn insert(&self, kind: EntityKind, body: Value) -> AppResult<RecordId> {
        let id = RecordId::new();
        sqlx::query("INSERT INTO documents (id, kind, body) VALUES ($1, $2, $3)")
            .bind(id.as_uuid())
            .bind(kind.as_str())
            .bind(&body)
            .execute(&self.pool)
            .await?;
        Ok(id)
    }

    async fn get(&self, kind: EntityKind, id: RecordId) -> AppResult<Option<Document>> {
        let row = sqlx::query_as::<_, (Uuid, Value)>(
            "SELECT id, body FROM documents WHERE kind = $1 AND id = $2",
        )
        .bind(kind.as_str())
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(into_document))
    }

    async fn list(
        &self,
        kind: EntityKind,
        filter: &Filter,
        sort: Option<&'static str>,
    ) -> AppResult<Vec<Document>> {
        // without a sort field every key is '' and seq alone decides
        let rows = sqlx::query_as::<_, (Uuid, Value)>(
            r#"
            SELECT id, body
            FROM documents
            WHERE kind = $1 AND body @> $2::jsonb
            ORDER BY COALESCE(body ->> $3::text, '') COLLATE "C", seq
            "#,
        )
        .bind(kind.as_str())
        .bind(filter.containment())
        .bind(sort)
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(into_document).collect())
    }

    async fn replace(&self, kind: EntityKind, id: RecordId, body: Value) -> AppResult<bool> {
        let result = sqlx::query("UPDATE documents SET body = $3 WHERE kind = $1 AND id = $2")
            .bind(kind.as_str())
            .bind(id.as_uuid())
            .bind(&body)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn delete(&self, kind: EntityKind, id: RecordId) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM documents WHERE kind = $1 AND id = $2")
            .bind(kind.as_str())
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn count(&self, kind: EntityKind, filter: &Filter) -> AppResult<u64> {
        let count: i64 = sqlx::query_scalar(
            "SELECT COUNT(*) FROM documents WHERE kind = $1 AND body @> $2::jsonb",
        )
        .bind(kind.as_str())
        .bind(filter.containment())
        .fetch_one(&self.pool)
        .await?;
        Ok(count as u64)
    }

    async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    async fn close(&self) {
        self.pool.close().await;
        tracing::info!("Database pool closed");
    }
}
