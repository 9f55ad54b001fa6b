use std::time::Duration;

use anyhow::{bail, Context, Result};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tracing::info;

/// Creates the PostgreSQL pool backing the resume metadata store.
pub async fn create_pool(database_url: &str) -> Result<PgPool> {
    info!("Connecting to PostgreSQL...");

    let pool = PgPoolOptions::new()
        .max_connections(10)
        .acquire_timeout(Duration::from_secs(5))
        .connect(database_url)
        .await
        .context("Failed to connect to PostgreSQL")?;

    verify_metadata_column(&pool).await?;

    info!("PostgreSQL connection pool established");
    Ok(pool)
}

/// Layouts are stored inside `resumes.metadata`; refuse to start without it.
async fn verify_metadata_column(pool: &PgPool) -> Result<()> {
    let data_type: Option<String> = sqlx::query_scalar(
        r#"
        SELECT data_type::text
        FROM information_schema.columns
        WHERE table_name = 'resumes' AND column_name = 'metadata'
        "#,
    )
    .fetch_optional(pool)
    .await?;

    match data_type.as_deref() {
        Some("jsonb") => Ok(()),
        Some(other) => bail!("resumes.metadata must be jsonb, found {other}"),
        None => bail!("resumes.metadata column is missing"),
    }
}
