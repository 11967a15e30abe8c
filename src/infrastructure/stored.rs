// Persisted wire format and its mapping to domain types
//
// The shapes here match what earlier versions of the builder wrote to local
// storage, so every field is optional on read.
use crate::domain::catalog::{BodyKind, WidgetType, DEFAULT_COLOR};
use crate::domain::dashboard::Snapshot;
use crate::domain::ids::{ViewId, WidgetId};
use crate::domain::layout::{Rect, Size};
use crate::domain::view::View;
use crate::domain::widget::{GroupItem, Scalar, WidgetBody, WidgetConfig};
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Upper bound on generated placeholder table columns.
const MAX_TABLE_COLUMNS: usize = 64;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredRect {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub w: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub h: Option<f64>,
}

impl StoredRect {
    fn is_empty(&self) -> bool {
        self.x.is_none() && self.y.is_none() && self.w.is_none() && self.h.is_none()
    }

    /// Missing or invalid coordinates become 0, missing or non-positive sizes
    /// take `default`.
    pub fn to_rect(&self, default: Size) -> Rect {
        let coord = |v: Option<f64>| v.filter(|v| v.is_finite() && *v >= 0.0).map_or(0, |v| v as u32);
        let extent = |v: Option<f64>, d: u32| v.filter(|v| v.is_finite() && *v >= 1.0).map_or(d, |v| v as u32);
        Rect::new(
            coord(self.x),
            coord(self.y),
            extent(self.w, default.w),
            extent(self.h, default.h),
        )
        .bounded()
    }

    pub fn from_rect(rect: Rect) -> Self {
        Self {
            x: Some(rect.x.into()),
            y: Some(rect.y.into()),
            w: Some(rect.w.into()),
            h: Some(rect.h.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredGroupItem {
    #[serde(default)]
    pub label: String,
    #[serde(default)]
    pub value: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredWidget {
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
    #[serde(default)]
    pub positions: BTreeMap<String, StoredRect>,
    /// Single flat rect written before per-view positions existed.
    #[serde(flatten)]
    pub legacy: StoredRect,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredSnapshot {
    #[serde(default)]
    pub data: Vec<StoredWidget>,
    #[serde(default)]
    pub timestamp: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredDashboard {
    pub id: String,
    #[serde(default)]
    pub name: String,
    /// JSON-encoded widget array.
    #[serde(default = "empty_widget_array")]
    pub data: String,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub versions: Vec<StoredSnapshot>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imported_from: Option<String>,
    /// Fields this version does not interpret, kept for round trips.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

fn empty_widget_array() -> String {
    "[]".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredView {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub icon: String,
    #[serde(default)]
    pub widget_ids: Vec<String>,
    #[serde(default)]
    pub order: u32,
}

/// A decoded widget plus the flat rect it carried, if any.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedWidget {
    pub config: WidgetConfig,
    pub legacy_rect: Option<Rect>,
}

pub fn format_timestamp(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

/// Parse an RFC 3339 timestamp; unreadable values map to the Unix epoch.
pub fn parse_timestamp(raw: &str) -> DateTime<Utc> {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(ts) => ts.with_timezone(&Utc),
        Err(e) => {
            if !raw.is_empty() {
                tracing::warn!(timestamp = raw, "unreadable timestamp: {e}");
            }
            DateTime::<Utc>::UNIX_EPOCH
        }
    }
}

/// Decode a stored widget. Unknown types are dropped; a missing type means
/// `card`; a missing id is replaced by a fresh one.
pub fn decode_widget(stored: StoredWidget) -> Option<DecodedWidget> {
    let widget_type = match stored.widget_type.as_deref() {
        None | Some("") => WidgetType::Card,
        Some(name) => match WidgetType::parse(name) {
            Some(t) => t,
            None => {
                tracing::warn!(widget = ?stored.id, kind = name, "unknown widget type dropped");
                return None;
            }
        },
    };
    let id = stored
        .id
        .as_deref()
        .filter(|id| !id.is_empty())
        .map(WidgetId::new)
        .unwrap_or_else(WidgetId::generate);

    let mut config = WidgetConfig::from_catalog(id, widget_type);
    if let Some(title) = stored.title.filter(|t| !t.trim().is_empty()) {
        config.title = title;
    }
    if let Some(icon) = stored.icon.filter(|i| !i.is_empty()) {
        config.icon = icon;
    }
    config.color = stored
        .color
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_COLOR.to_string());
    config.body = decode_body(
        widget_type.body_kind(),
        &stored.x_data,
        &stored.y_data,
        stored.min,
        stored.max,
        stored.group_count,
        stored.group_items,
        stored.table_columns,
        &stored.table_header_colors,
    );
    config.view_ids = stored.view_ids.into_iter().map(ViewId::new).collect();

    let default_size = widget_type.default_size();
    for (view_id, rect) in stored.positions {
        config.set_rect(&ViewId::new(view_id), rect.to_rect(default_size));
    }
    let legacy_rect = (!stored.legacy.is_empty()).then(|| {
        stored
            .legacy
            .to_rect(default_size)
            .clamp_to_min(widget_type.min_size())
    });

    Some(DecodedWidget { config, legacy_rect })
}

pub fn decode_widgets(stored: Vec<StoredWidget>) -> Vec<DecodedWidget> {
    stored.into_iter().filter_map(decode_widget).collect()
}

#[allow(clippy::too_many_arguments)]
fn decode_body(
    kind: BodyKind,
    x_data: &[Value],
    y_data: &[Value],
    min: Option<f64>,
    max: Option<f64>,
    group_count: Option<usize>,
    group_items: Vec<StoredGroupItem>,
    table_columns: Option<usize>,
    header_colors: &BTreeMap<String, String>,
) -> WidgetBody {
    let mut body = match kind {
        BodyKind::Series => WidgetBody::Series {
            labels: x_data.iter().map(value_to_text).collect(),
            values: y_data.iter().map(value_to_scalar).collect(),
        },
        BodyKind::Gauge => WidgetBody::Gauge {
            values: y_data
                .iter()
                .filter_map(|v| value_to_scalar(v).as_f64())
                .collect(),
            min,
            max,
        },
        BodyKind::Card => WidgetBody::Card {
            value: y_data
                .first()
                .map(value_to_scalar)
                .unwrap_or_else(|| Scalar::Text(String::new())),
        },
        BodyKind::Group => {
            let items: Vec<GroupItem> = if group_items.is_empty() {
                y_data
                    .iter()
                    .enumerate()
                    .map(|(i, v)| {
                        let label = x_data
                            .get(i)
                            .map(value_to_text)
                            .unwrap_or_else(|| format!("Item{}", i + 1));
                        GroupItem::new(label, value_to_scalar(v))
                    })
                    .collect()
            } else {
                group_items
                    .into_iter()
                    .map(|item| GroupItem::new(item.label, value_to_scalar(&item.value)))
                    .collect()
            };
            WidgetBody::Group {
                group_count: group_count.unwrap_or(items.len()),
                items,
            }
        }
        BodyKind::Table => {
            let mut columns: Vec<String> = x_data.iter().map(value_to_text).collect();
            if columns.is_empty() {
                columns = (1..=table_columns.unwrap_or(0).min(MAX_TABLE_COLUMNS))
                    .map(|i| format!("Col{i}"))
                    .collect();
            }
            let rows = y_data
                .iter()
                .filter_map(Value::as_array)
                .map(|row| row.iter().map(value_to_text).collect())
                .collect();
            let header_colors = header_colors
                .iter()
                .filter_map(|(col, color)| col.parse::<usize>().ok().map(|c| (c, color.clone())))
                .collect();
            WidgetBody::Table {
                columns,
                rows,
                header_colors,
            }
        }
        BodyKind::Control => WidgetBody::Control {
            value: y_data.first().map(value_to_scalar),
        },
        BodyKind::Embed => WidgetBody::Embed,
    };
    body.normalize();
    body
}

pub fn encode_widget(config: &WidgetConfig) -> StoredWidget {
    let mut stored = StoredWidget {
        id: Some(config.id.to_string()),
        widget_type: Some(config.widget_type.as_str().to_string()),
        title: Some(config.title.clone()),
        icon: Some(config.icon.clone()),
        color: Some(config.color.clone()),
        view_ids: config.view_ids.iter().map(ToString::to_string).collect(),
        positions: config
            .positions
            .iter()
            .map(|(view, rect)| (view.to_string(), StoredRect::from_rect(*rect)))
            .collect(),
        ..StoredWidget::default()
    };
    match &config.body {
        WidgetBody::Series { labels, values } => {
            stored.x_data = labels.iter().cloned().map(Value::String).collect();
            stored.y_data = values.iter().map(scalar_to_value).collect();
        }
        WidgetBody::Gauge { values, min, max } => {
            stored.y_data = values.iter().map(|v| number_to_value(*v)).collect();
            stored.min = *min;
            stored.max = *max;
        }
        WidgetBody::Card { value } => stored.y_data = vec![scalar_to_value(value)],
        WidgetBody::Group { group_count, items } => {
            stored.group_count = Some(*group_count);
            stored.group_items = items
                .iter()
                .map(|item| StoredGroupItem {
                    label: item.label.clone(),
                    value: scalar_to_value(&item.value),
                })
                .collect();
        }
        WidgetBody::Table {
            columns,
            rows,
            header_colors,
        } => {
            stored.x_data = columns.iter().cloned().map(Value::String).collect();
            stored.y_data = rows
                .iter()
                .map(|row| Value::Array(row.iter().cloned().map(Value::String).collect()))
                .collect();
            stored.table_columns = Some(columns.len());
            stored.table_rows = Some(rows.len());
            stored.table_header_colors = header_colors
                .iter()
                .map(|(col, color)| (col.to_string(), color.clone()))
                .collect();
        }
        WidgetBody::Control { value } => {
            stored.y_data = value.iter().map(scalar_to_value).collect();
        }
        WidgetBody::Embed => {}
    }
    stored
}

pub fn encode_widgets<'a>(configs: impl IntoIterator<Item = &'a WidgetConfig>) -> Vec<StoredWidget> {
    configs.into_iter().map(encode_widget).collect()
}

pub fn decode_snapshot(stored: StoredSnapshot) -> Snapshot {
    let widgets = decode_widgets(stored.data)
        .into_iter()
        .map(|d| d.config)
        .collect();
    Snapshot::new(parse_timestamp(&stored.timestamp), widgets)
}

pub fn encode_snapshot(snapshot: &Snapshot) -> StoredSnapshot {
    StoredSnapshot {
        data: encode_widgets(&snapshot.widgets),
        timestamp: format_timestamp(snapshot.timestamp),
    }
}

pub fn decode_view(stored: StoredView) -> View {
    let mut view = View::new(ViewId::new(stored.id), stored.name, stored.icon, stored.order);
    view.widget_ids = stored.widget_ids.into_iter().map(WidgetId::new).collect();
    view
}

pub fn encode_view(view: &View) -> StoredView {
    StoredView {
        id: view.id.to_string(),
        name: view.name.clone(),
        icon: view.icon.clone(),
        widget_ids: view.widget_ids.iter().map(ToString::to_string).collect(),
        order: view.order,
    }
}

fn value_to_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn value_to_scalar(value: &Value) -> Scalar {
    match value {
        Value::Number(n) => n
            .as_f64()
            .map(Scalar::Number)
            .unwrap_or_else(|| Scalar::Text(n.to_string())),
        Value::Bool(b) => Scalar::Number(if *b { 1.0 } else { 0.0 }),
        other => Scalar::Text(value_to_text(other)),
    }
}

fn number_to_value(n: f64) -> Value {
    if n.fract() == 0.0 && n.abs() < i64::MAX as f64 {
        Value::from(n as i64)
    } else {
        serde_json::Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}

fn scalar_to_value(scalar: &Scalar) -> Value {
    match scalar {
        Scalar::Number(n) => number_to_value(*n),
        Scalar::Text(s) => Value::String(s.clone()),
    }
}
