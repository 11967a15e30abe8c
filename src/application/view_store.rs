// View store - ordered views of one dashboard
use crate::application::reconciler;
use crate::application::widget_store::WidgetStore;
use crate::domain::ids::{ViewId, WidgetId};
use crate::domain::view::View;
use crate::error::{DashboardError, Result};
use std::collections::BTreeSet;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewStore {
    views: Vec<View>,
}

impl ViewStore {
    /// Build from loaded views, sorted by `order`.
    pub fn from_views(mut views: Vec<View>) -> Self {
        views.sort_by_key(|v| v.order);
        Self { views }
    }

    /// Add a "Default View" if the store is empty. Returns whether one was
    /// created.
    pub fn ensure_default(&mut self) -> bool {
        if !self.views.is_empty() {
            return false;
        }
        self.views.push(View::default_view());
        true
    }

    pub fn create(&mut self, name: &str, icon: &str) -> Result<&View> {
        let name = name.trim();
        if name.is_empty() {
            return Err(DashboardError::Validation(
                "view name must not be empty".to_string(),
            ));
        }
        let mut id = ViewId::generate();
        while self.contains(&id) {
            id = ViewId::generate();
        }
        let view = View::new(id, name, icon, self.views.len() as u32);
        tracing::debug!(view = %view.id, name = %view.name, "view created");
        self.views.push(view);
        let created = self.views.len() - 1;
        Ok(&self.views[created])
    }

    pub fn rename(&mut self, id: &ViewId, new_name: &str) -> Result<()> {
        let new_name = new_name.trim();
        if new_name.is_empty() {
            return Err(DashboardError::Validation(
                "view name must not be empty".to_string(),
            ));
        }
        let view = self.get_mut(id)?;
        view.name = new_name.to_string();
        Ok(())
    }

    /// Remove a view and renumber the rest contiguously. The last remaining
    /// view cannot be deleted. Widget-side membership is stripped by the
    /// caller's reconciliation pass.
    pub fn delete(&mut self, id: &ViewId) -> Result<View> {
        let idx = self
            .views
            .iter()
            .position(|v| &v.id == id)
            .ok_or_else(|| DashboardError::view_not_found(id))?;
        if self.views.len() <= 1 {
            return Err(DashboardError::InvariantViolation(
                "cannot delete the last view; dashboards must have at least one view".to_string(),
            ));
        }
        let removed = self.views.remove(idx);
        for (order, view) in self.views.iter_mut().enumerate() {
            view.order = order as u32;
        }
        Ok(removed)
    }

    /// Views ordered by `order` ascending.
    pub fn list(&self) -> &[View] {
        &self.views
    }

    pub fn get(&self, id: &ViewId) -> Result<&View> {
        self.views
            .iter()
            .find(|v| &v.id == id)
            .ok_or_else(|| DashboardError::view_not_found(id))
    }

    pub fn get_mut(&mut self, id: &ViewId) -> Result<&mut View> {
        self.views
            .iter_mut()
            .find(|v| &v.id == id)
            .ok_or_else(|| DashboardError::view_not_found(id))
    }

    pub fn contains(&self, id: &ViewId) -> bool {
        self.views.iter().any(|v| &v.id == id)
    }

    pub fn first(&self) -> Option<&View> {
        self.views.first()
    }

    pub fn ids(&self) -> BTreeSet<ViewId> {
        self.views.iter().map(|v| v.id.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    pub(crate) fn iter_mut(&mut self) -> impl Iterator<Item = &mut View> {
        self.views.iter_mut()
    }

    /// Toggle `view_id` in the widget's membership, then reconcile. This is
    /// the only place membership changes; `View::widget_ids` is never edited
    /// directly.
    pub fn set_widget_view_membership(
        &mut self,
        widgets: &mut WidgetStore,
        widget_id: &WidgetId,
        view_id: &ViewId,
        included: bool,
    ) -> Result<()> {
        self.toggle(widgets, widget_id, view_id, included)?;
        reconciler::reconcile(widgets, self);
        Ok(())
    }

    /// Set which widgets belong to `view_id`: every listed widget is included,
    /// every other widget excluded. Reconciles once at the end.
    pub fn set_view_widgets(
        &mut self,
        widgets: &mut WidgetStore,
        view_id: &ViewId,
        selected: &[WidgetId],
    ) -> Result<()> {
        self.get(view_id)?;
        if let Some(missing) = selected.iter().find(|id| !widgets.contains(id)) {
            return Err(DashboardError::widget_not_found(missing));
        }
        for widget_id in widgets.ids() {
            let included = selected.contains(&widget_id);
            self.toggle(widgets, &widget_id, view_id, included)?;
        }
        reconciler::reconcile(widgets, self);
        Ok(())
    }

    /// Set exactly which views a widget belongs to. Reconciles once at the end.
    pub fn set_widget_views(
        &mut self,
        widgets: &mut WidgetStore,
        widget_id: &WidgetId,
        selected: &[ViewId],
    ) -> Result<()> {
        widgets.get(widget_id)?;
        if let Some(missing) = selected.iter().find(|id| !self.contains(id)) {
            return Err(DashboardError::view_not_found(missing));
        }
        for view_id in self.ids() {
            let included = selected.contains(&view_id);
            self.toggle(widgets, widget_id, &view_id, included)?;
        }
        reconciler::reconcile(widgets, self);
        Ok(())
    }

    fn toggle(
        &self,
        widgets: &mut WidgetStore,
        widget_id: &WidgetId,
        view_id: &ViewId,
        included: bool,
    ) -> Result<()> {
        if !self.contains(view_id) {
            return Err(DashboardError::view_not_found(view_id));
        }
        let widget = widgets.get_mut(widget_id)?;
        if included {
            widget.view_ids.insert(view_id.clone());
        } else {
            widget.view_ids.remove(view_id);
        }
        Ok(())
    }
}
