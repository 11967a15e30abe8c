// Layout/visibility projector - which widgets are shown, and where
use crate::application::render::GridEngine;
use crate::application::view_store::ViewStore;
use crate::application::widget_store::WidgetStore;
use crate::domain::ids::{ViewId, WidgetId};
use crate::domain::layout::{first_free_cell, GridBounds, Rect, Size};
use crate::error::Result;

/// Visibility split computed for the active view.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projection {
    pub visible: Vec<WidgetId>,
    pub hidden: Vec<WidgetId>,
}

impl Projection {
    pub fn is_visible(&self, id: &WidgetId) -> bool {
        self.visible.contains(id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LayoutProjector {
    active_view: Option<ViewId>,
    edit_mode: bool,
}

impl LayoutProjector {
    pub fn new(edit_mode: bool) -> Self {
        Self {
            active_view: None,
            edit_mode,
        }
    }

    pub fn active_view(&self) -> Option<&ViewId> {
        self.active_view.as_ref()
    }

    pub fn is_edit_mode(&self) -> bool {
        self.edit_mode
    }

    pub fn set_edit_mode(&mut self, edit_mode: bool, grid: &mut dyn GridEngine) {
        self.edit_mode = edit_mode;
        if let Err(e) = grid.set_editable(edit_mode) {
            tracing::error!("grid editability change failed: {e}");
        }
    }

    /// Forget the active view without touching the grid (used when the view
    /// it pointed at was restored away).
    pub(crate) fn clear_active_view(&mut self) {
        self.active_view = None;
    }

    /// Switch to `view_id`. In edit mode the outgoing view's on-grid positions
    /// are captured first. Every widget is then moved to its rect for the new
    /// view and filtering is applied.
    pub fn activate_view(
        &mut self,
        view_id: &ViewId,
        widgets: &mut WidgetStore,
        views: &ViewStore,
        grid: &mut dyn GridEngine,
    ) -> Result<Projection> {
        let view = views.get(view_id)?;
        if self.edit_mode && self.active_view.is_some() {
            self.save_widget_positions_for_active_view(widgets, views, grid);
        }
        tracing::debug!(view = %view.id, name = %view.name, edit = self.edit_mode, "activating view");
        self.active_view = Some(view.id.clone());
        self.reposition(widgets, grid);
        Ok(self.apply_filtering(widgets, views, grid))
    }

    /// Move every widget on the grid to its rect for the active view.
    pub fn reposition(&self, widgets: &WidgetStore, grid: &mut dyn GridEngine) {
        let Some(view_id) = &self.active_view else {
            return;
        };
        for widget in widgets.iter() {
            let rect = widget.rect_for(view_id);
            if let Err(e) = grid.update_node(&widget.id, rect) {
                tracing::error!(widget = %widget.id, "grid update failed: {e}");
            }
        }
    }

    /// Visibility for the current state, without touching the grid. Both
    /// viewing and editing are scoped to the active view's members; with no
    /// active view nothing is shown.
    pub fn projection(&self, widgets: &WidgetStore, views: &ViewStore) -> Projection {
        let members = self
            .active_view
            .as_ref()
            .and_then(|id| views.get(id).ok())
            .map(|view| view.widget_ids.as_slice())
            .unwrap_or_default();
        let (visible, hidden): (Vec<WidgetId>, Vec<WidgetId>) = widgets
            .iter()
            .map(|w| w.id.clone())
            .partition(|id| members.contains(id));
        Projection { visible, hidden }
    }

    /// Show the active view's members, hide everything else and resize the
    /// visible charts. Re-invoking with unchanged state has no further effect.
    pub fn apply_filtering(
        &self,
        widgets: &mut WidgetStore,
        views: &ViewStore,
        grid: &mut dyn GridEngine,
    ) -> Projection {
        let projection = self.projection(widgets, views);
        for (ids, visible) in [(&projection.visible, true), (&projection.hidden, false)] {
            for id in ids {
                if let Err(e) = grid.set_visible(id, visible) {
                    tracing::error!(widget = %id, "grid visibility change failed: {e}");
                }
            }
        }
        widgets.resize_charts(&projection.visible);
        tracing::debug!(
            shown = projection.visible.len(),
            hidden = projection.hidden.len(),
            "filter applied"
        );
        projection
    }

    /// Store each visible widget's current grid rect under the active view.
    /// Returns how many positions were captured.
    pub fn save_widget_positions_for_active_view(
        &self,
        widgets: &mut WidgetStore,
        views: &ViewStore,
        grid: &dyn GridEngine,
    ) -> usize {
        let Some(view_id) = self.active_view.clone() else {
            return 0;
        };
        let nodes = match grid.nodes() {
            Ok(nodes) => nodes,
            Err(e) => {
                tracing::error!("grid state unavailable, positions not captured: {e}");
                return 0;
            }
        };
        let projection = self.projection(widgets, views);
        let mut captured = 0;
        for node in nodes.into_iter().filter(|n| projection.is_visible(&n.id)) {
            if let Ok(widget) = widgets.get_mut(&node.id) {
                widget.set_rect(&view_id, node.rect);
                captured += 1;
            }
        }
        tracing::debug!(view = %view_id, captured, "positions captured");
        captured
    }

    /// First free cell for a widget of `size` among the active view's visible
    /// widgets, or the origin when the grid state is unavailable or full.
    pub fn initial_rect(
        &self,
        size: Size,
        widgets: &WidgetStore,
        views: &ViewStore,
        grid: &dyn GridEngine,
        bounds: GridBounds,
    ) -> Rect {
        let origin = size.at(0, 0);
        if self.active_view.is_none() {
            return origin;
        }
        let nodes = match grid.nodes() {
            Ok(nodes) => nodes,
            Err(e) => {
                tracing::warn!("grid state unavailable, placing at origin: {e}");
                return origin;
            }
        };
        let projection = self.projection(widgets, views);
        let occupied: Vec<Rect> = nodes
            .into_iter()
            .filter(|n| projection.is_visible(&n.id))
            .map(|n| n.rect)
            .collect();
        first_free_cell(&occupied, size, bounds).unwrap_or(origin)
    }
}
