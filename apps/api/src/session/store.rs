//! Resume metadata store, the `getValue(path)` / `setValue(path, value)` seam.
//!
//! Layouts live at `metadata.layout` of the owning resume document. The engine only ever
//! reads and replaces that one value.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::PgPool;
use tracing::{debug, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::layout::{default_layout, Layout};

/// JSON path of the layout inside resume metadata.
pub const LAYOUT_PATH: &[&str] = &["layout"];

#[async_trait]
pub trait MetadataStore: Send + Sync {
    /// Value at `path` in the resume's metadata, or `None` if unset.
    async fn get_value(&self, resume_id: Uuid, path: &[&str]) -> Result<Option<Value>, AppError>;

    /// Replaces the value at `path`, creating it if missing.
    async fn set_value(&self, resume_id: Uuid, path: &[&str], value: Value)
        -> Result<(), AppError>;
}

/// Postgres-backed store over `resumes.metadata` (jsonb).
#[derive(Clone)]
pub struct PgMetadataStore {
    pool: PgPool,
}

impl PgMetadataStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn path_array(path: &[&str]) -> Vec<String> {
    path.iter().map(|s| s.to_string()).collect()
}

#[async_trait]
impl MetadataStore for PgMetadataStore {
    async fn get_value(&self, resume_id: Uuid, path: &[&str]) -> Result<Option<Value>, AppError> {
        let row: Option<Option<Value>> =
            sqlx::query_scalar("SELECT metadata #> $2 FROM resumes WHERE id = $1")
                .bind(resume_id)
                .bind(path_array(path))
                .fetch_optional(&self.pool)
                .await?;

        match row {
            Some(value) => Ok(value.filter(|v| !v.is_null())),
            None => Err(AppError::NotFound(format!("Resume {resume_id} not found"))),
        }
    }

    async fn set_value(
        &self,
        resume_id: Uuid,
        path: &[&str],
        value: Value,
    ) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE resumes
            SET metadata = jsonb_set(COALESCE(metadata, '{}'::jsonb), $2, $3, true),
                updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(resume_id)
        .bind(path_array(path))
        .bind(value)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!("Resume {resume_id} not found")));
        }
        Ok(())
    }
}

/// Loads the resume's layout, falling back to the default template when none is stored.
pub async fn load_layout(store: &dyn MetadataStore, resume_id: Uuid) -> Result<Layout, AppError> {
    match store.get_value(resume_id, LAYOUT_PATH).await? {
        Some(value) => serde_json::from_value(value).map_err(|e| {
            warn!(%resume_id, error = %e, "Stored layout is invalid");
            AppError::UnprocessableEntity(format!("Stored layout is invalid: {e}"))
        }),
        None => {
            debug!(%resume_id, "No stored layout, using default template");
            Ok(default_layout())
        }
    }
}

/// Writes a full replacement layout snapshot.
pub async fn save_layout(
    store: &dyn MetadataStore,
    resume_id: Uuid,
    layout: &Layout,
) -> Result<(), AppError> {
    let value = serde_json::to_value(layout).map_err(|e| AppError::Internal(e.into()))?;
    store.set_value(resume_id, LAYOUT_PATH, value).await
}
