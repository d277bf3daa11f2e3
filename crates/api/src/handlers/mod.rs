//! HTTP handlers, grouped by resource.

pub mod b2b_connection;
pub mod consent;
pub mod dda_template;
pub mod notification;
pub mod organisation;
pub mod search;

use serde::Deserialize;
use sqlx::PgPool;

use datapace_core::error::CoreError;
use datapace_core::pagination::PageParams;
use datapace_core::types::DbId;
use datapace_db::models::organisation::Organisation;
use datapace_db::repositories::OrganisationRepo;

use crate::error::{AppError, AppResult};

/// Resolve the authenticated admin user to their organisation.
///
/// Absence is a 400 `not_found` per the system convention; the
/// notification endpoint overrides this with a real 404.
pub(crate) async fn resolve_organisation(
    pool: &PgPool,
    admin_user_id: DbId,
) -> AppResult<Organisation> {
    OrganisationRepo::find_by_admin_user(pool, admin_user_id)
        .await?
        .ok_or_else(|| {
            AppError::Core(CoreError::NotFound(
                "No organisation found for the authenticated user".into(),
            ))
        })
}

/// Offset/limit query parameters shared by every list endpoint.
///
/// Unparseable values fall back to the defaults rather than erroring.
#[derive(Debug, Default, Deserialize)]
pub struct PageQuery {
    pub offset: Option<String>,
    pub limit: Option<String>,
}

impl PageQuery {
    pub fn params(&self) -> PageParams {
        let offset = self.offset.as_deref().and_then(|s| s.parse().ok());
        let limit = self.limit.as_deref().and_then(|s| s.parse().ok());
        PageParams::normalize(offset, limit)
    }
}
