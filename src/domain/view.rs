// View domain model
use crate::domain::ids::{ViewId, WidgetId};

pub const DEFAULT_VIEW_NAME: &str = "Default View";
pub const DEFAULT_VIEW_ICON: &str = "ph-house";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct View {
    pub id: ViewId,
    pub name: String,
    pub icon: String,
    pub order: u32,
    /// Derived cache of member widgets, rebuilt by reconciliation in widget
    /// iteration order.
    pub widget_ids: Vec<WidgetId>,
}

impl View {
    pub fn new(id: ViewId, name: impl Into<String>, icon: impl Into<String>, order: u32) -> Self {
        Self {
            id,
            name: name.into(),
            icon: icon.into(),
            order,
            widget_ids: Vec::new(),
        }
    }

    pub fn default_view() -> Self {
        Self::new(ViewId::generate(), DEFAULT_VIEW_NAME, DEFAULT_VIEW_ICON, 0)
    }

    pub fn contains(&self, widget_id: &WidgetId) -> bool {
        self.widget_ids.contains(widget_id)
    }
}
