//! DDA record ingestion and history.
//!
//! Ingestion is supersession-based: the first payload for a
//! `(organisation, template_id, template_revision_id)` key becomes the
//! current record, and every later payload is preserved as a history
//! row while the current row stays untouched.

use sqlx::PgPool;

use crate::models::dda_record::{DdaRecord, DdaRecordHistory, InboundRecord};
use datapace_core::types::DbId;

/// Where an inbound payload ended up.
#[derive(Debug)]
pub enum AppliedRecord {
    /// First payload for the record id; now the current record.
    Current(DdaRecord),
    /// A current record already existed; the payload went to history.
    Superseded(DdaRecordHistory),
}

pub struct DdaRecordRepo;

impl DdaRecordRepo {
    pub async fn find_current(
        pool: &PgPool,
        organisation_id: DbId,
        record_id: &str,
    ) -> Result<Option<DdaRecord>, sqlx::Error> {
        sqlx::query_as::<_, DdaRecord>(
            "SELECT * FROM dda_records WHERE organisation_id = $1 AND record_id = $2",
        )
        .bind(organisation_id)
        .bind(record_id)
        .fetch_optional(pool)
        .await
    }

    /// The most recently touched current record signed against a given
    /// template revision.
    pub async fn latest_for_revision(
        pool: &PgPool,
        organisation_id: DbId,
        template_revision_id: &str,
    ) -> Result<Option<DdaRecord>, sqlx::Error> {
        sqlx::query_as::<_, DdaRecord>(
            r#"
            SELECT * FROM dda_records
            WHERE organisation_id = $1 AND template_revision_id = $2
            ORDER BY updated_at DESC
            LIMIT 1
            "#,
        )
        .bind(organisation_id)
        .bind(template_revision_id)
        .fetch_optional(pool)
        .await
    }

    /// Ingest an inbound record payload.
    ///
    /// The supersession key is `(organisation, template_id,
    /// template_revision_id)`: the first payload for the key becomes the
    /// current record, later ones land in history. Every field,
    /// including `opt_in`, is stored as the upstream sent it.
    pub async fn apply_inbound(
        pool: &PgPool,
        organisation_id: DbId,
        input: &InboundRecord,
        template_row_id: Option<DbId>,
    ) -> Result<AppliedRecord, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let current = sqlx::query_as::<_, DdaRecord>(
            r#"
            SELECT * FROM dda_records
            WHERE organisation_id = $1 AND template_id = $2
              AND template_revision_id = $3
            ORDER BY updated_at DESC
            LIMIT 1
            FOR UPDATE
            "#,
        )
        .bind(organisation_id)
        .bind(&input.template_id)
        .bind(&input.template_revision_id)
        .fetch_optional(&mut *tx)
        .await?;

        let applied = match current {
            None => {
                let row = sqlx::query_as::<_, DdaRecord>(
                    r#"
                    INSERT INTO dda_records
                        (organisation_id, record_id, template_id,
                         template_revision_id, state, opt_in, record)
                    VALUES ($1, $2, $3, $4, $5, $6, $7)
                    RETURNING *
                    "#,
                )
                .bind(organisation_id)
                .bind(&input.record_id)
                .bind(&input.template_id)
                .bind(&input.template_revision_id)
                .bind(&input.state)
                .bind(input.opt_in)
                .bind(&input.record)
                .fetch_one(&mut *tx)
                .await?;
                AppliedRecord::Current(row)
            }
            Some(_) => {
                let row = sqlx::query_as::<_, DdaRecordHistory>(
                    r#"
                    INSERT INTO dda_record_history
                        (organisation_id, record_id, template_id,
                         template_revision_id, state, opt_in, record,
                         dda_template_row_id)
                    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                    RETURNING *
                    "#,
                )
                .bind(organisation_id)
                .bind(&input.record_id)
                .bind(&input.template_id)
                .bind(&input.template_revision_id)
                .bind(&input.state)
                .bind(input.opt_in)
                .bind(&input.record)
                .bind(template_row_id)
                .fetch_one(&mut *tx)
                .await?;
                AppliedRecord::Superseded(row)
            }
        };

        tx.commit().await?;
        Ok(applied)
    }

    /// Superseded payloads for a template, newest first.
    pub async fn list_history_by_template(
        pool: &PgPool,
        organisation_id: DbId,
        template_id: &str,
    ) -> Result<Vec<DdaRecordHistory>, sqlx::Error> {
        sqlx::query_as::<_, DdaRecordHistory>(
            r#"
            SELECT * FROM dda_record_history
            WHERE organisation_id = $1 AND template_id = $2
            ORDER BY created_at DESC
            "#,
        )
        .bind(organisation_id)
        .bind(template_id)
        .fetch_all(pool)
        .await
    }

    /// Delete a single history row, scoped to its template. Returns
    /// whether a row was deleted.
    pub async fn delete_history_row(
        pool: &PgPool,
        organisation_id: DbId,
        template_id: &str,
        history_id: DbId,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            DELETE FROM dda_record_history
            WHERE id = $1 AND organisation_id = $2 AND template_id = $3
            "#,
        )
        .bind(history_id)
        .bind(organisation_id)
        .bind(template_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Drop all history rows for a template. Returns the number deleted.
    pub async fn delete_history(
        pool: &PgPool,
        organisation_id: DbId,
        template_id: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            "DELETE FROM dda_record_history WHERE organisation_id = $1 AND template_id = $2",
        )
        .bind(organisation_id)
        .bind(template_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }
}
