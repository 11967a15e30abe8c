// View-models - flat, serializable shapes the GUI binds to
use crate::application::view_store::ViewStore;
use crate::application::widget_store::WidgetStore;
use crate::domain::dashboard::{Dashboard, Snapshot};
use crate::domain::ids::{DashboardId, ViewId, WidgetId};
use crate::domain::view::{View, DEFAULT_VIEW_ICON};
use chrono::{DateTime, Utc};
use serde::Serialize;

const FALLBACK_WIDGET_ICON: &str = "ph-cube";

/// Expand a stored icon name (`ph-house`) into the CSS class pair the icon
/// font expects. Values already carrying a weight prefix pass through.
pub fn icon_class(icon: &str, fallback: &str) -> String {
    let icon = icon.trim();
    let icon = if icon.is_empty() { fallback } else { icon };
    if icon.contains(' ') {
        icon.to_string()
    } else {
        format!("ph {icon}")
    }
}

/// "1 widget", "3 widgets".
pub fn widget_count_label(count: usize) -> String {
    if count == 1 {
        "1 widget".to_string()
    } else {
        format!("{count} widgets")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SidebarEntry {
    pub view_id: ViewId,
    pub name: String,
    pub icon_class: String,
    pub widget_count: usize,
    pub badge_title: String,
    pub active: bool,
}

impl SidebarEntry {
    fn from_view(view: &View, active: Option<&ViewId>) -> Self {
        let count = view.widget_ids.len();
        Self {
            view_id: view.id.clone(),
            name: view.name.clone(),
            icon_class: icon_class(&view.icon, DEFAULT_VIEW_ICON),
            widget_count: count,
            badge_title: widget_count_label(count),
            active: active == Some(&view.id),
        }
    }
}

/// One sidebar button per view in display order.
pub fn sidebar_entries(views: &ViewStore, active: Option<&ViewId>) -> Vec<SidebarEntry> {
    views
        .list()
        .iter()
        .map(|v| SidebarEntry::from_view(v, active))
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ManageViewRow {
    pub view_id: ViewId,
    pub name: String,
    pub icon_class: String,
    pub stats: String,
    pub selected: bool,
    /// Deleting is refused for the last remaining view.
    pub deletable: bool,
}

/// Rows of the manage-views list. When nothing is selected (or the selection
/// no longer exists) the first view is selected.
pub fn manage_view_rows(views: &ViewStore, selected: Option<&ViewId>) -> Vec<ManageViewRow> {
    let selected = selected
        .filter(|id| views.contains(id))
        .or_else(|| views.first().map(|v| &v.id));
    let deletable = views.len() > 1;
    views
        .list()
        .iter()
        .map(|view| ManageViewRow {
            view_id: view.id.clone(),
            name: view.name.clone(),
            icon_class: icon_class(&view.icon, DEFAULT_VIEW_ICON),
            stats: widget_count_label(view.widget_ids.len()),
            selected: selected == Some(&view.id),
            deletable,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetChoice {
    pub widget_id: WidgetId,
    pub label: String,
    pub widget_type: &'static str,
    pub icon_class: String,
    pub checked: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WidgetSelection {
    pub view_id: ViewId,
    pub title: String,
    pub choices: Vec<WidgetChoice>,
}

/// Checklist of every widget for `view_id`. The checked state comes from the
/// widget's own membership, never from the view's cached list.
pub fn widget_selection(
    widgets: &WidgetStore,
    views: &ViewStore,
    view_id: &ViewId,
) -> crate::error::Result<WidgetSelection> {
    let view = views.get(view_id)?;
    let choices = widgets
        .iter()
        .map(|cfg| {
            let label = if cfg.title.trim().is_empty() {
                cfg.widget_type.as_str().to_string()
            } else {
                cfg.title.clone()
            };
            WidgetChoice {
                widget_id: cfg.id.clone(),
                label,
                widget_type: cfg.widget_type.as_str(),
                icon_class: icon_class(&cfg.icon, FALLBACK_WIDGET_ICON),
                checked: cfg.is_in_view(view_id),
            }
        })
        .collect();
    Ok(WidgetSelection {
        view_id: view.id.clone(),
        title: format!("Select Widgets for \"{}\"", view.name),
        choices,
    })
}

/// Ids the user left checked, ready for `set_view_widgets`.
pub fn checked_widgets(selection: &WidgetSelection) -> Vec<WidgetId> {
    selection
        .choices
        .iter()
        .filter(|c| c.checked)
        .map(|c| c.widget_id.clone())
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardCard {
    pub id: DashboardId,
    pub name: String,
    pub panel_id: String,
    pub updated_at: DateTime<Utc>,
    pub widget_count: usize,
}

/// Home-screen cards in list order. `panel_id` resolves (and lazily creates)
/// the display panel id for a dashboard.
pub fn dashboard_cards(
    dashboards: &[Dashboard],
    mut panel_id: impl FnMut(&DashboardId) -> String,
) -> Vec<DashboardCard> {
    dashboards
        .iter()
        .map(|d| DashboardCard {
            id: d.id.clone(),
            name: d.name.clone(),
            panel_id: panel_id(&d.id),
            updated_at: d.updated_at,
            widget_count: d.widgets.len(),
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryRow {
    /// Index to pass back to `restore_version`.
    pub index: usize,
    pub timestamp: DateTime<Utc>,
    pub widget_count: usize,
}

/// History list, newest first.
pub fn history_rows<'a>(history: impl IntoIterator<Item = &'a Snapshot>) -> Vec<HistoryRow> {
    history
        .into_iter()
        .enumerate()
        .map(|(index, snap)| HistoryRow {
            index,
            timestamp: snap.timestamp,
            widget_count: snap.widgets.len(),
        })
        .collect()
}
