//! B2B connection snapshot storage.

use serde_json::Value;
use sqlx::PgPool;

use crate::models::b2b_connection::B2bConnection;
use datapace_core::types::DbId;

pub struct B2bConnectionRepo;

impl B2bConnectionRepo {
    /// Store or overwrite the snapshot for a connection id.
    pub async fn upsert(
        pool: &PgPool,
        organisation_id: DbId,
        connection_id: &str,
        record: &Value,
    ) -> Result<B2bConnection, sqlx::Error> {
        sqlx::query_as::<_, B2bConnection>(
            r#"
            INSERT INTO b2b_connections (organisation_id, connection_id, record)
            VALUES ($1, $2, $3)
            ON CONFLICT (organisation_id, connection_id)
            DO UPDATE SET record = EXCLUDED.record, updated_at = NOW()
            RETURNING *
            "#,
        )
        .bind(organisation_id)
        .bind(connection_id)
        .bind(record)
        .fetch_one(pool)
        .await
    }

    pub async fn list(
        pool: &PgPool,
        organisation_id: DbId,
    ) -> Result<Vec<B2bConnection>, sqlx::Error> {
        sqlx::query_as::<_, B2bConnection>(
            r#"
            SELECT * FROM b2b_connections
            WHERE organisation_id = $1
            ORDER BY created_at DESC
            "#,
        )
        .bind(organisation_id)
        .fetch_all(pool)
        .await
    }
}
