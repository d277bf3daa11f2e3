//! Organisation queries.

use sqlx::PgPool;

use crate::models::organisation::{CreateOrganisation, Organisation};
use datapace_core::types::DbId;

pub struct OrganisationRepo;

impl OrganisationRepo {
    pub async fn create(
        pool: &PgPool,
        input: &CreateOrganisation,
    ) -> Result<Organisation, sqlx::Error> {
        sqlx::query_as::<_, Organisation>(
            r#"
            INSERT INTO organisations
                (name, description, location, open_api_url, admin_user_id,
                 access_point_url, client_id, client_secret, ows_base_url)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(&input.name)
        .bind(&input.description)
        .bind(&input.location)
        .bind(&input.open_api_url)
        .bind(input.admin_user_id)
        .bind(&input.access_point_url)
        .bind(&input.client_id)
        .bind(&input.client_secret)
        .bind(&input.ows_base_url)
        .fetch_one(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Organisation>, sqlx::Error> {
        sqlx::query_as::<_, Organisation>("SELECT * FROM organisations WHERE id = $1")
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// The organisation administered by the given user, if any.
    pub async fn find_by_admin_user(
        pool: &PgPool,
        admin_user_id: DbId,
    ) -> Result<Option<Organisation>, sqlx::Error> {
        sqlx::query_as::<_, Organisation>("SELECT * FROM organisations WHERE admin_user_id = $1")
            .bind(admin_user_id)
            .fetch_optional(pool)
            .await
    }

    pub async fn list_all(pool: &PgPool) -> Result<Vec<Organisation>, sqlx::Error> {
        sqlx::query_as::<_, Organisation>("SELECT * FROM organisations ORDER BY created_at DESC")
            .fetch_all(pool)
            .await
    }
}
