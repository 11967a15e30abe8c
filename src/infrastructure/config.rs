use crate::domain::layout::GridBounds;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct WorkspaceConfig {
    pub grid: GridSettings,
    pub history: HistorySettings,
    pub storage: StorageSettings,
    pub live: LiveSettings,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct GridSettings {
    pub columns: u32,
    pub cell_height: u32,
    pub margin: u32,
    /// Rows searched for a free cell before falling back to the origin.
    pub scan_rows: u32,
}

impl Default for GridSettings {
    fn default() -> Self {
        Self {
            columns: 12,
            cell_height: 100,
            margin: 2,
            scan_rows: 20,
        }
    }
}

impl GridSettings {
    pub fn bounds(&self) -> GridBounds {
        GridBounds {
            columns: self.columns,
            rows: self.scan_rows,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct HistorySettings {
    pub max_versions: usize,
}

impl Default for HistorySettings {
    fn default() -> Self {
        Self {
            max_versions: crate::domain::dashboard::MAX_VERSIONS,
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct StorageSettings {
    pub dashboards_key: String,
    pub views_key: String,
    pub panel_ids_key: String,
    pub directory: PathBuf,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            dashboards_key: "dashboards".to_string(),
            views_key: "views".to_string(),
            panel_ids_key: "panel-ids".to_string(),
            directory: PathBuf::from("data"),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct LiveSettings {
    pub interval_ms: u64,
}

impl Default for LiveSettings {
    fn default() -> Self {
        Self { interval_ms: 2000 }
    }
}

impl LiveSettings {
    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }
}

/// Load `config/workspace.{toml,json,...}` if present, overridden by
/// `DASHBOARD_<SECTION>__<FIELD>` environment variables.
pub fn load_workspace_config() -> anyhow::Result<WorkspaceConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::with_name("config/workspace").required(false))
        .add_source(config::Environment::with_prefix("DASHBOARD").separator("__"))
        .build()?;

    Ok(settings.try_deserialize()?)
}

/// Load configuration from an explicit file. The file must exist.
pub fn load_workspace_config_from(path: &Path) -> anyhow::Result<WorkspaceConfig> {
    let settings = config::Config::builder()
        .add_source(config::File::from(path))
        .build()?;

    Ok(settings.try_deserialize()?)
}
