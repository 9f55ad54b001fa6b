use std::sync::Arc;

use crate::config::Config;
use crate::session::locks::LayoutLocks;
use crate::session::store::MetadataStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    /// Resume metadata access. Default: `PgMetadataStore` over the `resumes` table.
    pub store: Arc<dyn MetadataStore>,
    /// Serializes layout writes per resume across REST calls and editor sessions.
    pub locks: LayoutLocks,
}
