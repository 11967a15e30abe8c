// Persistence gateway - dashboards, views, panel ids and history over a key-value store
use crate::application::key_value_store::KeyValueStore;
use crate::domain::catalog::WidgetType;
use crate::domain::dashboard::{Dashboard, Snapshot, VersionHistory};
use crate::domain::ids::{generate_panel_id, DashboardId, ViewId, WidgetId};
use crate::domain::layout::Rect;
use crate::domain::view::View;
use crate::domain::widget::WidgetConfig;
use crate::error::{DashboardError, Result};
use crate::infrastructure::config::{GridSettings, WorkspaceConfig};
use crate::infrastructure::export_format::{
    parse_import, ExportDashboard, ExportDocument, ExportGridConfig, ExportInfo, ExportWidget, FORMAT_VERSION,
};
use crate::infrastructure::stored::{
    decode_snapshot, decode_view, decode_widgets, encode_snapshot, encode_view, encode_widget, encode_widgets,
    format_timestamp, parse_timestamp, StoredDashboard, StoredRect, StoredView, StoredWidget,
};
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Map;
use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

type ViewsByDashboard = BTreeMap<String, Vec<StoredView>>;
type PanelIds = BTreeMap<String, String>;

/// Outcome of a save. A save that could not be written is still applied in
/// memory; `durable` tells the caller whether it reached storage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SaveReport {
    pub snapshot_appended: bool,
    pub durable: bool,
}

/// A dashboard read back from storage, with the flat pre-view rects some of
/// its widgets carried.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedDashboard {
    pub dashboard: Dashboard,
    pub legacy_rects: BTreeMap<WidgetId, Rect>,
}

pub struct PersistenceGateway {
    store: Arc<dyn KeyValueStore>,
    dashboards_key: String,
    views_key: String,
    panel_ids_key: String,
    max_versions: usize,
}

impl PersistenceGateway {
    pub fn new(store: Arc<dyn KeyValueStore>, config: &WorkspaceConfig) -> Self {
        Self {
            store,
            dashboards_key: config.storage.dashboards_key.clone(),
            views_key: config.storage.views_key.clone(),
            panel_ids_key: config.storage.panel_ids_key.clone(),
            max_versions: config.history.max_versions,
        }
    }

    /// Read and parse `key`. A missing or corrupt value yields the default;
    /// a store failure is returned.
    fn fetch<T: DeserializeOwned + Default>(&self, key: &str) -> Result<T> {
        let Some(raw) = self.store.get(key)? else {
            return Ok(T::default());
        };
        match serde_json::from_str(&raw) {
            Ok(value) => Ok(value),
            Err(e) => {
                tracing::error!(key, "corrupt stored value, using default: {e}");
                Ok(T::default())
            }
        }
    }

    /// Like [`Self::fetch`] but store failures also degrade to the default.
    fn read<T: DeserializeOwned + Default>(&self, key: &str) -> T {
        self.fetch(key).unwrap_or_else(|e| {
            tracing::error!(key, "read failed, using default: {e}");
            T::default()
        })
    }

    fn write<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let raw = serde_json::to_string(value)
            .map_err(|e| DashboardError::Persistence(format!("encode '{key}' failed: {e}")))?;
        self.store.set(key, &raw)
    }

    pub fn load_stored_dashboards(&self) -> Vec<StoredDashboard> {
        self.read(&self.dashboards_key)
    }

    pub fn save_stored_dashboards(&self, list: &[StoredDashboard]) -> Result<()> {
        self.write(&self.dashboards_key, &list)
    }

    /// Every dashboard, in list order.
    pub fn load_dashboards(&self) -> Vec<Dashboard> {
        self.load_stored_dashboards()
            .into_iter()
            .map(|stored| decode_dashboard(stored).dashboard)
            .collect()
    }

    /// Replace the stored list. Fields of existing entries this version does
    /// not interpret are kept.
    pub fn save_dashboards(&self, list: &[Dashboard]) -> Result<()> {
        let mut extras: BTreeMap<String, Map<String, serde_json::Value>> = self
            .load_stored_dashboards()
            .into_iter()
            .map(|stored| (stored.id, stored.extra))
            .collect();
        let stored: Vec<StoredDashboard> = list
            .iter()
            .map(|d| encode_dashboard(d, extras.remove(d.id.as_str()).unwrap_or_default()))
            .collect();
        self.save_stored_dashboards(&stored)
    }

    pub fn load_dashboard(&self, id: &DashboardId) -> Result<DecodedDashboard> {
        self.load_stored_dashboards()
            .into_iter()
            .find(|d| d.id == id.as_str())
            .map(decode_dashboard)
            .ok_or_else(|| DashboardError::dashboard_not_found(id))
    }

    /// Insert a new dashboard at the front of the list.
    pub fn insert_dashboard(&self, dashboard: &Dashboard) -> Result<()> {
        self.insert_stored(encode_dashboard(dashboard, Map::new()))
    }

    fn insert_stored(&self, stored: StoredDashboard) -> Result<()> {
        let mut list: Vec<StoredDashboard> = self.fetch(&self.dashboards_key)?;
        list.insert(0, stored);
        self.save_stored_dashboards(&list)
    }

    /// Remove a dashboard together with its views and panel id.
    pub fn delete_dashboard(&self, id: &DashboardId) -> Result<()> {
        let mut list: Vec<StoredDashboard> = self.fetch(&self.dashboards_key)?;
        let before = list.len();
        list.retain(|d| d.id != id.as_str());
        if list.len() == before {
            return Err(DashboardError::dashboard_not_found(id));
        }
        self.save_stored_dashboards(&list)?;
        self.delete_views(id)?;
        self.delete_panel_id(id)?;
        tracing::info!(dashboard = %id, "dashboard deleted");
        Ok(())
    }

    pub fn load_views(&self, dashboard_id: &DashboardId) -> Vec<View> {
        let mut all: ViewsByDashboard = self.read(&self.views_key);
        all.remove(dashboard_id.as_str())
            .unwrap_or_default()
            .into_iter()
            .map(decode_view)
            .collect()
    }

    pub fn save_views(&self, dashboard_id: &DashboardId, views: &[View]) -> Result<()> {
        let mut all: ViewsByDashboard = self.fetch(&self.views_key)?;
        all.insert(
            dashboard_id.to_string(),
            views.iter().map(encode_view).collect(),
        );
        self.write(&self.views_key, &all)
    }

    fn delete_views(&self, dashboard_id: &DashboardId) -> Result<()> {
        let mut all: ViewsByDashboard = self.fetch(&self.views_key)?;
        if all.remove(dashboard_id.as_str()).is_some() {
            self.write(&self.views_key, &all)?;
        }
        Ok(())
    }

    /// The dashboard's panel id, generated and stored on first request. If the
    /// new id cannot be stored it is still returned, but a later call may
    /// return a different one.
    pub fn panel_id(&self, dashboard_id: &DashboardId) -> String {
        let mut ids: PanelIds = self.read(&self.panel_ids_key);
        if let Some(existing) = ids.get(dashboard_id.as_str()) {
            return existing.clone();
        }
        let generated = generate_panel_id();
        ids.insert(dashboard_id.to_string(), generated.clone());
        if let Err(e) = self.write(&self.panel_ids_key, &ids) {
            tracing::warn!(dashboard = %dashboard_id, "panel id not stored: {e}");
        }
        generated
    }

    fn delete_panel_id(&self, dashboard_id: &DashboardId) -> Result<()> {
        let mut ids: PanelIds = self.fetch(&self.panel_ids_key)?;
        if ids.remove(dashboard_id.as_str()).is_some() {
            self.write(&self.panel_ids_key, &ids)?;
        }
        Ok(())
    }

    /// Commit `widgets` as the dashboard's current state: update it in memory,
    /// append a snapshot unless nothing changed since the latest one, and write
    /// it through. Write failures leave the in-memory commit in place and are
    /// reported as not durable.
    pub fn perform_save(
        &self,
        dashboard: &mut Dashboard,
        widgets: Vec<WidgetConfig>,
        now: DateTime<Utc>,
    ) -> Result<SaveReport> {
        let list: Result<Vec<StoredDashboard>> = self.fetch(&self.dashboards_key);
        if let Ok(list) = &list {
            if !list.iter().any(|d| d.id == dashboard.id.as_str()) {
                return Err(DashboardError::dashboard_not_found(&dashboard.id));
            }
        }

        let snapshot_appended = dashboard
            .versions
            .record(Snapshot::new(now, widgets.clone()), self.max_versions);
        dashboard.widgets = widgets;
        dashboard.updated_at = now;

        let committed: &Dashboard = dashboard;
        let written = list.and_then(|mut list| {
            if let Some(entry) = list.iter_mut().find(|d| d.id == committed.id.as_str()) {
                let extra = std::mem::take(&mut entry.extra);
                *entry = encode_dashboard(committed, extra);
            }
            self.save_stored_dashboards(&list)
        });
        let durable = match written {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(dashboard = %dashboard.id, "save kept in memory only: {e}");
                false
            }
        };
        tracing::debug!(
            dashboard = %dashboard.id,
            snapshot_appended,
            versions = dashboard.versions.len(),
            durable,
            "dashboard saved"
        );
        Ok(SaveReport {
            snapshot_appended,
            durable,
        })
    }

    /// Export document for a stored dashboard. Each widget's `position` is
    /// its rect in the dashboard's first view.
    pub fn export_dashboard(
        &self,
        id: &DashboardId,
        grid: &GridSettings,
        now: DateTime<Utc>,
    ) -> Result<ExportDocument> {
        let decoded = self.load_dashboard(id)?;
        let mut views = self.load_views(id);
        views.sort_by_key(|v| v.order);
        let first_view: Option<ViewId> = views.first().map(|v| v.id.clone());

        let widgets: Vec<ExportWidget> = decoded
            .dashboard
            .widgets
            .iter()
            .map(|cfg| {
                let rect = first_view
                    .as_ref()
                    .and_then(|view| cfg.positions.get(view).copied())
                    .or_else(|| decoded.legacy_rects.get(&cfg.id).copied())
                    .unwrap_or_else(|| cfg.widget_type.default_size().at(0, 0));
                ExportWidget::from_stored(encode_widget(cfg), StoredRect::from_rect(rect))
            })
            .collect();

        let dashboard = &decoded.dashboard;
        Ok(ExportDocument {
            dashboard: ExportDashboard {
                id: Some(dashboard.id.to_string()),
                name: Some(dashboard.name.clone()),
                created_at: Some(format_timestamp(dashboard.created_at)),
                updated_at: Some(format_timestamp(dashboard.updated_at)),
                version: Some(FORMAT_VERSION.to_string()),
                widget_count: widgets.len(),
                grid_config: Some(ExportGridConfig::from(grid)),
            },
            widgets,
            export_info: Some(ExportInfo::now(format_timestamp(now))),
        })
    }

    /// Store an imported document as a new dashboard at the front of the
    /// list. Existing dashboards are untouched when the document is rejected.
    pub fn import_dashboard(&self, raw: &str, now: DateTime<Utc>) -> Result<Dashboard> {
        let doc = parse_import(raw)?;
        let name = doc
            .dashboard
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Imported Dashboard {}", now.format("%Y-%m-%d")));

        let mut seen = HashSet::new();
        let mut widgets: Vec<StoredWidget> = Vec::with_capacity(doc.widgets.len());
        for widget in doc.widgets {
            let mut stored = widget.into_stored();
            if let Some(kind) = stored.widget_type.as_deref().filter(|k| !k.is_empty()) {
                if WidgetType::parse(kind).is_none() {
                    tracing::warn!(widget = ?stored.id, kind, "unknown widget type dropped from import");
                    continue;
                }
            }
            let keep = stored
                .id
                .as_ref()
                .is_some_and(|id| !id.is_empty() && !seen.contains(id));
            if !keep {
                stored.id = Some(WidgetId::generate().to_string());
            }
            if let Some(id) = &stored.id {
                seen.insert(id.clone());
            }
            widgets.push(stored);
        }

        let data = serde_json::to_string(&widgets)
            .map_err(|e| DashboardError::Persistence(format!("encode import failed: {e}")))?;
        let timestamp = format_timestamp(now);
        let stored = StoredDashboard {
            id: DashboardId::generate().to_string(),
            name,
            data,
            created_at: timestamp.clone(),
            updated_at: timestamp.clone(),
            versions: Vec::new(),
            imported_from: Some(
                doc.export_info
                    .and_then(|info| info.exported_at)
                    .unwrap_or(timestamp),
            ),
            extra: Map::new(),
        };
        self.insert_stored(stored.clone())?;
        let dashboard = decode_dashboard(stored).dashboard;
        tracing::info!(dashboard = %dashboard.id, name = %dashboard.name, widgets = dashboard.widgets.len(), "dashboard imported");
        Ok(dashboard)
    }
}

/// Decode a stored entry. A corrupt `data` field yields no widgets.
pub fn decode_dashboard(stored: StoredDashboard) -> DecodedDashboard {
    let raw_widgets: Vec<StoredWidget> = match serde_json::from_str(&stored.data) {
        Ok(widgets) => widgets,
        Err(e) => {
            tracing::error!(dashboard = %stored.id, "corrupt widget data, opening empty: {e}");
            Vec::new()
        }
    };
    let mut legacy_rects = BTreeMap::new();
    let widgets = decode_widgets(raw_widgets)
        .into_iter()
        .map(|decoded| {
            if let Some(rect) = decoded.legacy_rect {
                legacy_rects.insert(decoded.config.id.clone(), rect);
            }
            decoded.config
        })
        .collect();

    let dashboard = Dashboard {
        id: DashboardId::new(stored.id),
        name: stored.name,
        created_at: parse_timestamp(&stored.created_at),
        updated_at: parse_timestamp(&stored.updated_at),
        widgets,
        versions: VersionHistory::from_entries(stored.versions.into_iter().map(decode_snapshot).collect()),
        imported_from: stored.imported_from,
    };
    DecodedDashboard {
        dashboard,
        legacy_rects,
    }
}

fn encode_dashboard(dashboard: &Dashboard, extra: Map<String, serde_json::Value>) -> StoredDashboard {
    let data = serde_json::to_string(&encode_widgets(&dashboard.widgets)).unwrap_or_else(|e| {
        tracing::error!(dashboard = %dashboard.id, "widget encoding failed: {e}");
        "[]".to_string()
    });
    StoredDashboard {
        id: dashboard.id.to_string(),
        name: dashboard.name.clone(),
        data,
        created_at: format_timestamp(dashboard.created_at),
        updated_at: format_timestamp(dashboard.updated_at),
        versions: dashboard.versions.entries().iter().map(encode_snapshot).collect(),
        imported_from: dashboard.imported_from.clone(),
        extra,
    }
}
