use std::str::FromStr;

use anyhow::{anyhow, bail, Context, Result};

use crate::layout::paginator::DEFAULT_MAX_PASSES;
use crate::layout::{PageFormat, PageGeometry, PaginationOptions};

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub rust_log: String,
    /// Physical page used to compute the column height budget.
    pub page: PageGeometry,
    /// Upper bound on redistribution passes per `addPage`.
    pub pagination_max_passes: u8,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable lookup.
    pub fn from_vars(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let database_url = var("DATABASE_URL")
            .with_context(|| "Required environment variable 'DATABASE_URL' is not set")?;

        let format = match var("PAGE_FORMAT") {
            Some(raw) => PageFormat::from_str(&raw)
                .map_err(|e| anyhow!(e))
                .context("PAGE_FORMAT must be 'a4' or 'letter'")?,
            None => PageFormat::A4,
        };

        let pagination_max_passes = parse_or(&var, "PAGINATION_MAX_PASSES", DEFAULT_MAX_PASSES)?;
        if pagination_max_passes == 0 {
            bail!("PAGINATION_MAX_PASSES must be at least 1");
        }

        Ok(Config {
            database_url,
            port: parse_or(&var, "PORT", 8080)?,
            rust_log: var("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            page: PageGeometry {
                format,
                margin_px: parse_or(&var, "PAGE_MARGIN_PX", 18.0)?,
            },
            pagination_max_passes,
        })
    }

    pub fn pagination_options(&self) -> PaginationOptions {
        PaginationOptions {
            max_height_px: self.page.column_budget_px(),
            max_passes: self.pagination_max_passes,
        }
    }
}

fn parse_or<T>(var: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match var(key) {
        Some(raw) => raw
            .parse::<T>()
            .map_err(|e| anyhow!("{key} is invalid ('{raw}'): {e}")),
        None => Ok(default),
    }
}
