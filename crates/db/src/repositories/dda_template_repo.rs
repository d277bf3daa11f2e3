//! DDA template revision store.
//!
//! The store is append-only: notifications insert new revisions, they
//! never mutate existing ones (status and tags updates excepted). At
//! most one row per `(organisation_id, template_id)` carries
//! `is_latest_version` among non-archived rows; the partial unique
//! index `uq_dda_templates_single_latest` backstops concurrent writers.

use serde_json::{json, Value};
use sqlx::PgPool;

use crate::models::dda_template::{DdaTemplate, ListedTemplate, NewRevision};
use datapace_core::dda::{is_legal_transition, DdaStatus};
use datapace_core::types::DbId;

/// Result of a status transition attempt on the latest active revision.
#[derive(Debug)]
pub enum TransitionOutcome {
    /// No active revision exists for the template.
    NotFound,
    /// The transition from the current status is not allowed.
    Illegal { current: String },
    Updated(DdaTemplate),
}

pub struct DdaTemplateRepo;

impl DdaTemplateRepo {
    /// Append a new revision, demoting the previous latest in the same
    /// transaction. The flip runs before the insert so the partial
    /// unique index holds at every point inside the transaction.
    ///
    /// The status column is taken from `record["status"]` when it names
    /// a known status, defaulting to `unlisted`; the record field is
    /// rewritten to match so the two representations never diverge.
    pub async fn create_revision(
        pool: &PgPool,
        organisation_id: DbId,
        input: &NewRevision,
    ) -> Result<DdaTemplate, sqlx::Error> {
        let status = input
            .record
            .get("status")
            .and_then(Value::as_str)
            .and_then(|s| s.parse::<DdaStatus>().ok())
            .unwrap_or(DdaStatus::Unlisted);

        let mut record = input.record.clone();
        if let Some(obj) = record.as_object_mut() {
            obj.insert("status".to_owned(), json!(status.as_str()));
        }

        let mut tx = pool.begin().await?;

        sqlx::query(
            r#"
            UPDATE dda_templates
            SET is_latest_version = FALSE, updated_at = NOW()
            WHERE organisation_id = $1 AND template_id = $2 AND is_latest_version
            "#,
        )
        .bind(organisation_id)
        .bind(&input.template_id)
        .execute(&mut *tx)
        .await?;

        let row = sqlx::query_as::<_, DdaTemplate>(
            r#"
            INSERT INTO dda_templates
                (organisation_id, template_id, version, status, record,
                 revision, revision_id, tags, is_latest_version)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, TRUE)
            RETURNING *
            "#,
        )
        .bind(organisation_id)
        .bind(&input.template_id)
        .bind(&input.version)
        .bind(status.as_str())
        .bind(&record)
        .bind(&input.revision)
        .bind(&input.revision_id)
        .bind(json!(input.tags))
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(row)
    }

    /// All non-archived revisions of a template, newest first.
    pub async fn list_active_by_template(
        pool: &PgPool,
        organisation_id: DbId,
        template_id: &str,
    ) -> Result<Vec<DdaTemplate>, sqlx::Error> {
        sqlx::query_as::<_, DdaTemplate>(
            r#"
            SELECT * FROM dda_templates
            WHERE organisation_id = $1 AND template_id = $2 AND status <> 'archived'
            ORDER BY created_at DESC
            "#,
        )
        .bind(organisation_id)
        .bind(template_id)
        .fetch_all(pool)
        .await
    }

    /// Distinct template ids for an organisation, first-seen in
    /// newest-revision order.
    pub async fn list_unique_template_ids(
        pool: &PgPool,
        organisation_id: DbId,
    ) -> Result<Vec<String>, sqlx::Error> {
        let ids: Vec<(String,)> = sqlx::query_as(
            r#"
            SELECT template_id FROM dda_templates
            WHERE organisation_id = $1 AND status <> 'archived'
            ORDER BY created_at DESC
            "#,
        )
        .bind(organisation_id)
        .fetch_all(pool)
        .await?;

        let mut seen = std::collections::HashSet::new();
        Ok(ids
            .into_iter()
            .map(|(id,)| id)
            .filter(|id| seen.insert(id.clone()))
            .collect())
    }

    pub async fn find_latest_active(
        pool: &PgPool,
        organisation_id: DbId,
        template_id: &str,
    ) -> Result<Option<DdaTemplate>, sqlx::Error> {
        sqlx::query_as::<_, DdaTemplate>(
            r#"
            SELECT * FROM dda_templates
            WHERE organisation_id = $1 AND template_id = $2
              AND is_latest_version AND status <> 'archived'
            "#,
        )
        .bind(organisation_id)
        .bind(template_id)
        .fetch_optional(pool)
        .await
    }

    /// The latest revision only if it is currently listed in the
    /// catalogue. The consent flow signs against listed revisions only.
    pub async fn find_latest_listed(
        pool: &PgPool,
        organisation_id: DbId,
        template_id: &str,
    ) -> Result<Option<DdaTemplate>, sqlx::Error> {
        sqlx::query_as::<_, DdaTemplate>(
            r#"
            SELECT * FROM dda_templates
            WHERE organisation_id = $1 AND template_id = $2
              AND is_latest_version AND status = 'listed'
            "#,
        )
        .bind(organisation_id)
        .bind(template_id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_version(
        pool: &PgPool,
        organisation_id: DbId,
        template_id: &str,
        version: &str,
    ) -> Result<Option<DdaTemplate>, sqlx::Error> {
        sqlx::query_as::<_, DdaTemplate>(
            r#"
            SELECT * FROM dda_templates
            WHERE organisation_id = $1 AND template_id = $2
              AND version = $3 AND status <> 'archived'
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(organisation_id)
        .bind(template_id)
        .bind(version)
        .fetch_optional(pool)
        .await
    }

    /// Revision lookup by the upstream revision identifier, used to
    /// link inbound records back to the template row they were signed
    /// against.
    pub async fn find_by_revision_id(
        pool: &PgPool,
        organisation_id: DbId,
        revision_id: &str,
    ) -> Result<Option<DdaTemplate>, sqlx::Error> {
        sqlx::query_as::<_, DdaTemplate>(
            r#"
            SELECT * FROM dda_templates
            WHERE organisation_id = $1 AND revision_id = $2
            ORDER BY created_at DESC
            LIMIT 1
            "#,
        )
        .bind(organisation_id)
        .bind(revision_id)
        .fetch_optional(pool)
        .await
    }

    /// Archive every revision of a template. Archived rows leave the
    /// partial unique index, so the latest flag can stay as-is. Returns
    /// the number of revisions archived.
    pub async fn archive(
        pool: &PgPool,
        organisation_id: DbId,
        template_id: &str,
    ) -> Result<u64, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE dda_templates
            SET status = 'archived',
                record = jsonb_set(record, '{status}', '"archived"'),
                updated_at = NOW()
            WHERE organisation_id = $1 AND template_id = $2 AND status <> 'archived'
            "#,
        )
        .bind(organisation_id)
        .bind(template_id)
        .execute(pool)
        .await?;
        Ok(result.rows_affected())
    }

    /// Replace the tags on the latest active revision.
    pub async fn set_tags(
        pool: &PgPool,
        organisation_id: DbId,
        template_id: &str,
        tags: &[String],
    ) -> Result<Option<DdaTemplate>, sqlx::Error> {
        sqlx::query_as::<_, DdaTemplate>(
            r#"
            UPDATE dda_templates
            SET tags = $3, updated_at = NOW()
            WHERE organisation_id = $1 AND template_id = $2
              AND is_latest_version AND status <> 'archived'
            RETURNING *
            "#,
        )
        .bind(organisation_id)
        .bind(template_id)
        .bind(json!(tags))
        .fetch_optional(pool)
        .await
    }

    /// Attempt a status transition on the latest active revision.
    ///
    /// Locks the row so a concurrent transition observes the committed
    /// state, then writes the status column and the embedded
    /// `record["status"]` in one statement.
    pub async fn transition_status(
        pool: &PgPool,
        organisation_id: DbId,
        template_id: &str,
        requested: DdaStatus,
    ) -> Result<TransitionOutcome, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let current = sqlx::query_as::<_, DdaTemplate>(
            r#"
            SELECT * FROM dda_templates
            WHERE organisation_id = $1 AND template_id = $2
              AND is_latest_version AND status <> 'archived'
            FOR UPDATE
            "#,
        )
        .bind(organisation_id)
        .bind(template_id)
        .fetch_optional(&mut *tx)
        .await?;

        let Some(row) = current else {
            return Ok(TransitionOutcome::NotFound);
        };

        let current_status = match row.status.parse::<DdaStatus>() {
            Ok(status) => status,
            Err(_) => {
                return Ok(TransitionOutcome::Illegal {
                    current: row.status,
                })
            }
        };
        if !is_legal_transition(current_status, requested) {
            return Ok(TransitionOutcome::Illegal {
                current: row.status,
            });
        }

        let updated = sqlx::query_as::<_, DdaTemplate>(
            r#"
            UPDATE dda_templates
            SET status = $2,
                record = jsonb_set(record, '{status}', to_jsonb($2::text)),
                updated_at = NOW()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(row.id)
        .bind(requested.as_str())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(TransitionOutcome::Updated(updated))
    }

    /// The catalogue candidate set: every listed latest revision joined
    /// with its owning organisation's name, newest first.
    pub async fn list_listed_latest(pool: &PgPool) -> Result<Vec<ListedTemplate>, sqlx::Error> {
        sqlx::query_as::<_, ListedTemplate>(
            r#"
            SELECT t.id, t.organisation_id, o.name AS organisation_name,
                   t.template_id, t.version, t.status, t.record, t.tags,
                   t.is_latest_version, t.created_at, t.updated_at
            FROM dda_templates t
            JOIN organisations o ON o.id = t.organisation_id
            WHERE t.status = 'listed' AND t.is_latest_version
            ORDER BY t.created_at DESC
            "#,
        )
        .fetch_all(pool)
        .await
    }
}
