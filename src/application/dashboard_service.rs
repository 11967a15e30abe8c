// Dashboard service - Use cases over the dashboard list
use crate::application::key_value_store::KeyValueStore;
use crate::application::persistence_gateway::PersistenceGateway;
use crate::application::render::{GridEngine, RenderHost};
use crate::application::session::WorkspaceSession;
use crate::domain::dashboard::Dashboard;
use crate::domain::ids::DashboardId;
use crate::error::{DashboardError, Result};
use crate::infrastructure::config::WorkspaceConfig;
use crate::infrastructure::export_format::ExportDocument;
use chrono::Utc;
use std::sync::Arc;

#[derive(Clone)]
pub struct DashboardService {
    gateway: Arc<PersistenceGateway>,
    config: WorkspaceConfig,
}

impl DashboardService {
    pub fn new(store: Arc<dyn KeyValueStore>, config: WorkspaceConfig) -> Self {
        Self {
            gateway: Arc::new(PersistenceGateway::new(store, &config)),
            config,
        }
    }

    pub fn gateway(&self) -> &Arc<PersistenceGateway> {
        &self.gateway
    }

    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    /// Create an empty dashboard at the front of the list.
    pub fn create_dashboard(&self, name: &str) -> Result<Dashboard> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DashboardError::Validation(
                "dashboard name must not be empty".to_string(),
            ));
        }
        let dashboard = Dashboard::new(DashboardId::generate(), name, Utc::now());
        self.gateway.insert_dashboard(&dashboard)?;
        tracing::info!(dashboard = %dashboard.id, name = %dashboard.name, "dashboard created");
        Ok(dashboard)
    }

    pub fn list_dashboards(&self) -> Vec<Dashboard> {
        self.gateway.load_dashboards()
    }

    pub fn get_dashboard(&self, id: &DashboardId) -> Result<Dashboard> {
        Ok(self.gateway.load_dashboard(id)?.dashboard)
    }

    /// Delete a dashboard with its views and panel id.
    pub fn delete_dashboard(&self, id: &DashboardId) -> Result<()> {
        self.gateway.delete_dashboard(id)
    }

    pub fn panel_id(&self, id: &DashboardId) -> String {
        self.gateway.panel_id(id)
    }

    pub fn export_dashboard(&self, id: &DashboardId) -> Result<ExportDocument> {
        self.gateway
            .export_dashboard(id, &self.config.grid, Utc::now())
    }

    /// Pretty-printed export document.
    pub fn export_json(&self, id: &DashboardId) -> Result<String> {
        let doc = self.export_dashboard(id)?;
        serde_json::to_string_pretty(&doc)
            .map_err(|e| DashboardError::Persistence(format!("export encoding failed: {e}")))
    }

    pub fn import_dashboard(&self, raw: &str) -> Result<Dashboard> {
        self.gateway.import_dashboard(raw, Utc::now())
    }

    pub fn open<G: GridEngine, H: RenderHost>(
        &self,
        id: &DashboardId,
        edit_mode: bool,
        grid: G,
        host: H,
    ) -> Result<WorkspaceSession<G, H>> {
        WorkspaceSession::open(
            self.gateway.clone(),
            self.config.clone(),
            id,
            edit_mode,
            grid,
            host,
        )
    }
}

/// Download file name for an export: punctuation dropped, whitespace runs
/// collapsed to underscores.
pub fn export_file_name(dashboard_name: &str) -> String {
    let kept: String = dashboard_name
        .chars()
        .filter(|c| c.is_alphanumeric() || *c == '_' || *c == '-' || c.is_whitespace())
        .collect();
    let stem = kept.split_whitespace().collect::<Vec<_>>().join("_");
    format!("{stem}_dashboard_export.json")
}
