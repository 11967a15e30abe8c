// Crate root - layer modules and the file-backed service wiring
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod presentation;

use std::sync::Arc;

pub use crate::application::dashboard_service::DashboardService;
pub use crate::application::session::WorkspaceSession;
pub use crate::error::{DashboardError, Result};
pub use crate::infrastructure::config::WorkspaceConfig;

use crate::infrastructure::config::load_workspace_config;
use crate::infrastructure::file_store::FileStore;
use crate::infrastructure::logging;

/// Install logging, load configuration and build a service persisting under
/// `storage.directory`.
pub fn bootstrap(debug: bool) -> anyhow::Result<DashboardService> {
    logging::init(debug);

    let config = load_workspace_config()?;

    // Create store (infrastructure layer)
    let store = Arc::new(FileStore::new(config.storage.directory.clone()));
    tracing::info!(directory = %store.directory().display(), "using file store");

    Ok(DashboardService::new(store, config))
}
