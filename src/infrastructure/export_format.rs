// Dashboard export/import document
use crate::error::{DashboardError, Result};
use crate::infrastructure::config::GridSettings;
use crate::infrastructure::stored::{StoredGroupItem, StoredRect, StoredWidget};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

pub const FORMAT_VERSION: &str = "1.0";
const EXPORTED_BY: &str = "dashboard-workspace";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportDocument {
    pub dashboard: ExportDashboard,
    pub widgets: Vec<ExportWidget>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub export_info: Option<ExportInfo>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportDashboard {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
    #[serde(rename = "widgetCount", default)]
    pub widget_count: usize,
    #[serde(rename = "gridConfig", default, skip_serializing_if = "Option::is_none")]
    pub grid_config: Option<ExportGridConfig>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportGridConfig {
    pub columns: u32,
    pub cell_height: u32,
    pub margin: u32,
}

impl From<&GridSettings> for ExportGridConfig {
    fn from(grid: &GridSettings) -> Self {
        Self {
            columns: grid.columns,
            cell_height: grid.cell_height,
            margin: grid.margin,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_at: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub exported_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format_version: Option<String>,
}

impl ExportInfo {
    pub fn now(exported_at: String) -> Self {
        Self {
            exported_at: Some(exported_at),
            exported_by: Some(EXPORTED_BY.to_string()),
            format_version: Some(FORMAT_VERSION.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExportWidget {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub widget_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub position: Option<StoredRect>,
    #[serde(default)]
    pub data: ExportWidgetData,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportWidgetData {
    #[serde(default)]
    pub x_data: Vec<Value>,
    #[serde(default)]
    pub y_data: Vec<Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group_count: Option<usize>,
    #[serde(default)]
    pub group_items: Vec<StoredGroupItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_columns: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub table_rows: Option<usize>,
    #[serde(default)]
    pub table_header_colors: BTreeMap<String, String>,
    #[serde(default)]
    pub view_ids: Vec<String>,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub positions: BTreeMap<String, StoredRect>,
}

impl ExportWidget {
    /// Wrap a stored widget; `position` is its rect in the dashboard's first
    /// view.
    pub fn from_stored(stored: StoredWidget, position: StoredRect) -> Self {
        Self {
            id: stored.id,
            widget_type: stored.widget_type,
            title: stored.title,
            icon: stored.icon,
            color: stored.color,
            position: Some(position),
            data: ExportWidgetData {
                x_data: stored.x_data,
                y_data: stored.y_data,
                min: stored.min,
                max: stored.max,
                group_count: stored.group_count,
                group_items: stored.group_items,
                table_columns: stored.table_columns,
                table_rows: stored.table_rows,
                table_header_colors: stored.table_header_colors,
                view_ids: stored.view_ids,
                positions: stored.positions,
            },
        }
    }

    /// The stored form of this widget. `position` becomes the flat legacy
    /// rect.
    pub fn into_stored(self) -> StoredWidget {
        StoredWidget {
            id: self.id,
            widget_type: self.widget_type,
            title: self.title,
            icon: self.icon,
            color: self.color,
            x_data: self.data.x_data,
            y_data: self.data.y_data,
            min: self.data.min,
            max: self.data.max,
            group_count: self.data.group_count,
            group_items: self.data.group_items,
            table_columns: self.data.table_columns,
            table_rows: self.data.table_rows,
            table_header_colors: self.data.table_header_colors,
            view_ids: self.data.view_ids,
            positions: self.data.positions,
            legacy: self.position.unwrap_or_default(),
        }
    }
}

/// Parse an import document. The `dashboard` and `widgets` keys are required;
/// anything else missing takes its default.
pub fn parse_import(raw: &str) -> Result<ExportDocument> {
    let value: Value = serde_json::from_str(raw)
        .map_err(|e| DashboardError::ImportFormat(format!("not valid JSON: {e}")))?;
    let Some(object) = value.as_object() else {
        return Err(DashboardError::ImportFormat(
            "expected a JSON object".to_string(),
        ));
    };
    for key in ["dashboard", "widgets"] {
        if !object.contains_key(key) {
            return Err(DashboardError::ImportFormat(format!(
                "missing required key '{key}'"
            )));
        }
    }
    if !object["widgets"].is_array() {
        return Err(DashboardError::ImportFormat(
            "'widgets' must be an array".to_string(),
        ));
    }
    serde_json::from_value(value).map_err(|e| DashboardError::ImportFormat(e.to_string()))
}
