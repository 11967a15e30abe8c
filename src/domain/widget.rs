// Widget domain model
use crate::domain::catalog::{BodyKind, WidgetType, DEFAULT_COLOR};
use crate::domain::ids::{ViewId, WidgetId};
use crate::domain::layout::Rect;
use crate::error::{DashboardError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// A data value that may be numeric or free text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Number(f64),
    Text(String),
}

impl Scalar {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Scalar::Number(n) => Some(*n),
            Scalar::Text(s) => s.trim().parse().ok(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupItem {
    pub label: String,
    pub value: Scalar,
}

impl GroupItem {
    pub fn new(label: impl Into<String>, value: Scalar) -> Self {
        Self {
            label: label.into(),
            value,
        }
    }
}

/// Type-specific payload of a widget. Each variant carries only the fields
/// its widget types use.
#[derive(Debug, Clone, PartialEq)]
pub enum WidgetBody {
    Series {
        labels: Vec<String>,
        values: Vec<Scalar>,
    },
    Gauge {
        values: Vec<f64>,
        min: Option<f64>,
        max: Option<f64>,
    },
    Card {
        value: Scalar,
    },
    Group {
        group_count: usize,
        items: Vec<GroupItem>,
    },
    Table {
        columns: Vec<String>,
        rows: Vec<Vec<String>>,
        header_colors: BTreeMap<usize, String>,
    },
    Control {
        value: Option<Scalar>,
    },
    Embed,
}

impl WidgetBody {
    pub fn kind(&self) -> BodyKind {
        match self {
            WidgetBody::Series { .. } => BodyKind::Series,
            WidgetBody::Gauge { .. } => BodyKind::Gauge,
            WidgetBody::Card { .. } => BodyKind::Card,
            WidgetBody::Group { .. } => BodyKind::Group,
            WidgetBody::Table { .. } => BodyKind::Table,
            WidgetBody::Control { .. } => BodyKind::Control,
            WidgetBody::Embed => BodyKind::Embed,
        }
    }

    /// Bring derived fields back in line: group cards hold at most
    /// `group_count` items, table rows have one cell per column and header
    /// colours only address existing columns.
    pub fn normalize(&mut self) {
        match self {
            WidgetBody::Group { group_count, items } => items.truncate(*group_count),
            WidgetBody::Table {
                columns,
                rows,
                header_colors,
            } => {
                let width = columns.len();
                for row in rows.iter_mut() {
                    row.resize(width, String::new());
                }
                header_colors.retain(|col, _| *col < width);
            }
            _ => {}
        }
    }
}

/// Field changes accepted by a settings save. Identity (`id`, type) is not
/// patchable.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WidgetPatch {
    pub title: Option<String>,
    pub icon: Option<String>,
    pub color: Option<String>,
    pub body: Option<WidgetBody>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct WidgetConfig {
    pub id: WidgetId,
    pub widget_type: WidgetType,
    pub title: String,
    pub icon: String,
    pub color: String,
    pub body: WidgetBody,
    /// Authoritative view membership.
    pub view_ids: BTreeSet<ViewId>,
    /// Independent rect per view.
    pub positions: BTreeMap<ViewId, Rect>,
}

impl WidgetConfig {
    /// Widget populated from catalog defaults, with no membership or positions.
    pub fn from_catalog(id: WidgetId, widget_type: WidgetType) -> Self {
        Self {
            id,
            widget_type,
            title: widget_type.title().to_string(),
            icon: widget_type.icon().to_string(),
            color: DEFAULT_COLOR.to_string(),
            body: widget_type.default_body(),
            view_ids: BTreeSet::new(),
            positions: BTreeMap::new(),
        }
    }

    pub fn is_in_view(&self, view_id: &ViewId) -> bool {
        self.view_ids.contains(view_id)
    }

    /// Rect this widget occupies in `view_id`: the stored one, or the catalog
    /// default size at the origin. Never smaller than the type's minimum.
    pub fn rect_for(&self, view_id: &ViewId) -> Rect {
        self.positions
            .get(view_id)
            .copied()
            .unwrap_or_else(|| self.widget_type.default_size().at(0, 0))
            .clamp_to_min(self.widget_type.min_size())
    }

    pub fn set_rect(&mut self, view_id: &ViewId, rect: Rect) {
        let rect = rect.bounded().clamp_to_min(self.widget_type.min_size());
        self.positions.insert(view_id.clone(), rect);
    }

    pub fn apply_patch(&mut self, patch: WidgetPatch) -> Result<()> {
        if let Some(body) = &patch.body {
            if body.kind() != self.widget_type.body_kind() {
                return Err(DashboardError::Validation(format!(
                    "{:?} data does not fit a {} widget",
                    body.kind(),
                    self.widget_type.as_str()
                )));
            }
        }
        if let Some(title) = patch.title {
            let title = title.trim();
            self.title = if title.is_empty() {
                self.widget_type.title().to_string()
            } else {
                title.to_string()
            };
        }
        if let Some(icon) = patch.icon {
            self.icon = icon;
        }
        if let Some(color) = patch.color {
            self.color = if color.trim().is_empty() {
                DEFAULT_COLOR.to_string()
            } else {
                color
            };
        }
        if let Some(mut body) = patch.body {
            body.normalize();
            self.body = body;
        }
        Ok(())
    }
}
