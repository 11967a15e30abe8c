// Workspace session - one opened dashboard and everything bound to it
use crate::application::persistence_gateway::{PersistenceGateway, SaveReport};
use crate::application::projector::{LayoutProjector, Projection};
use crate::application::reconciler;
use crate::application::render::{GridEngine, RenderHost};
use crate::application::view_store::ViewStore;
use crate::application::widget_store::{Placement, WidgetStore};
use crate::domain::catalog::WidgetType;
use crate::domain::dashboard::{Dashboard, Snapshot};
use crate::domain::ids::{DashboardId, ViewId, WidgetId};
use crate::domain::view::View;
use crate::domain::widget::{WidgetConfig, WidgetPatch};
use crate::error::{DashboardError, Result};
use crate::infrastructure::config::WorkspaceConfig;
use chrono::Utc;
use std::sync::Arc;

/// State captured on entering edit mode, restored verbatim on cancel.
#[derive(Debug, Clone)]
struct EditBackup {
    widgets: Vec<WidgetConfig>,
    views: ViewStore,
    dirty: bool,
}

/// An opened dashboard: its widgets and views, the projector state, and the
/// grid and render host it draws through. Every membership change is
/// reconciled before the method returns.
pub struct WorkspaceSession<G: GridEngine, H: RenderHost> {
    gateway: Arc<PersistenceGateway>,
    config: WorkspaceConfig,
    dashboard: Dashboard,
    widgets: WidgetStore,
    views: ViewStore,
    projector: LayoutProjector,
    grid: G,
    host: H,
    dirty: bool,
    edit_backup: Option<EditBackup>,
    closed: bool,
}

impl<G: GridEngine, H: RenderHost> WorkspaceSession<G, H> {
    /// Load a dashboard and bring it to a consistent state: views are
    /// defaulted and ordered, legacy membership and flat rects are migrated,
    /// unplaced imports go to the first view, and the first view is
    /// activated.
    pub fn open(
        gateway: Arc<PersistenceGateway>,
        config: WorkspaceConfig,
        dashboard_id: &DashboardId,
        edit_mode: bool,
        grid: G,
        host: H,
    ) -> Result<Self> {
        let decoded = gateway.load_dashboard(dashboard_id)?;
        let mut views = ViewStore::from_views(gateway.load_views(dashboard_id));
        if views.ensure_default() {
            tracing::info!(dashboard = %dashboard_id, "created default view");
        }
        let mut widgets = WidgetStore::from_configs(decoded.dashboard.widgets.clone());

        reconciler::migrate_legacy_membership(&mut widgets, &views);
        reconciler::reconcile(&mut widgets, &mut views);
        if reconciler::assign_unplaced_to_first_view(&mut widgets, &views) > 0 {
            reconciler::reconcile(&mut widgets, &mut views);
        }
        if let Some(first) = views.first().map(|v| v.id.clone()) {
            for (widget_id, rect) in &decoded.legacy_rects {
                if let Ok(widget) = widgets.get_mut(widget_id) {
                    if !widget.positions.contains_key(&first) {
                        widget.set_rect(&first, *rect);
                    }
                }
            }
        }
        if let Err(e) = gateway.save_views(dashboard_id, views.list()) {
            tracing::warn!(dashboard = %dashboard_id, "views not persisted: {e}");
        }

        let mut session = Self {
            gateway,
            config,
            dashboard: decoded.dashboard,
            widgets,
            views,
            projector: LayoutProjector::new(edit_mode),
            grid,
            host,
            dirty: false,
            edit_backup: None,
            closed: false,
        };
        session.projector.set_edit_mode(edit_mode, &mut session.grid);
        if edit_mode {
            session.edit_backup = Some(session.backup());
        }
        session.mount_all();
        session.activate_first_view();
        tracing::info!(
            dashboard = %session.dashboard.id,
            widgets = session.widgets.len(),
            views = session.views.len(),
            edit_mode,
            "workspace opened"
        );
        Ok(session)
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub fn widgets(&self) -> &WidgetStore {
        &self.widgets
    }

    pub fn views(&self) -> &ViewStore {
        &self.views
    }

    pub fn list_views(&self) -> &[View] {
        self.views.list()
    }

    pub fn grid(&self) -> &G {
        &self.grid
    }

    /// Direct access to the grid engine, as drag and resize gestures need.
    pub fn grid_mut(&mut self) -> &mut G {
        &mut self.grid
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn config(&self) -> &WorkspaceConfig {
        &self.config
    }

    pub fn active_view(&self) -> Option<&ViewId> {
        self.projector.active_view()
    }

    pub fn is_edit_mode(&self) -> bool {
        self.projector.is_edit_mode()
    }

    /// Whether there are changes not yet durably saved.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn projection(&self) -> Projection {
        self.projector.projection(&self.widgets, &self.views)
    }

    pub fn get_widget(&self, id: &WidgetId) -> Result<&WidgetConfig> {
        self.widgets.get(id)
    }

    /// Add a widget from catalog defaults at the first free cell of the
    /// active view. In edit mode it joins the active view.
    pub fn add_widget(&mut self, widget_type: WidgetType) -> Result<WidgetId> {
        let rect = self.projector.initial_rect(
            widget_type.default_size(),
            &self.widgets,
            &self.views,
            &self.grid,
            self.config.grid.bounds(),
        );
        let active = self.projector.active_view().cloned();
        let placement = Placement {
            assign: active.is_some() && self.projector.is_edit_mode(),
            view_id: active,
            rect,
        };
        let id = self.widgets.add(widget_type, placement).id.clone();
        if let Err(e) = self.grid.add_node(&id, rect) {
            tracing::error!(widget = %id, "grid add failed: {e}");
        }
        self.widgets
            .mount(&id, &mut self.host, self.config.live.interval())?;
        reconciler::reconcile(&mut self.widgets, &mut self.views);
        self.projector
            .apply_filtering(&mut self.widgets, &self.views, &mut self.grid);
        self.dirty = true;
        Ok(id)
    }

    /// Remove a widget, release its render resources and drop it from every
    /// view.
    pub fn remove_widget(&mut self, id: &WidgetId) -> Result<()> {
        self.widgets.remove(id)?;
        if let Err(e) = self.grid.remove_node(id) {
            tracing::error!(widget = %id, "grid remove failed: {e}");
        }
        reconciler::reconcile(&mut self.widgets, &mut self.views);
        self.persist_views();
        self.projector
            .apply_filtering(&mut self.widgets, &self.views, &mut self.grid);
        self.dirty = true;
        tracing::debug!(widget = %id, "widget removed");
        Ok(())
    }

    pub fn update_widget(&mut self, id: &WidgetId, patch: WidgetPatch) -> Result<()> {
        self.widgets.update(id, patch)?;
        self.dirty = true;
        Ok(())
    }

    /// Settings-dialog save: field changes plus, when given, the exact set of
    /// views the widget belongs to. Nothing changes if any id is unknown.
    pub fn save_widget_settings(
        &mut self,
        id: &WidgetId,
        patch: WidgetPatch,
        view_ids: Option<&[ViewId]>,
    ) -> Result<()> {
        self.widgets.get(id)?;
        if let Some(missing) = view_ids
            .unwrap_or_default()
            .iter()
            .find(|v| !self.views.contains(v))
        {
            return Err(DashboardError::view_not_found(missing));
        }
        self.update_widget(id, patch)?;
        if let Some(selected) = view_ids {
            self.set_widget_views(id, selected)?;
        }
        Ok(())
    }

    /// Create a view and switch to it.
    pub fn create_view(&mut self, name: &str, icon: &str) -> Result<ViewId> {
        let id = self.views.create(name, icon)?.id.clone();
        self.persist_views();
        self.activate_view(&id)?;
        Ok(id)
    }

    pub fn rename_view(&mut self, id: &ViewId, new_name: &str) -> Result<()> {
        self.views.rename(id, new_name)?;
        self.persist_views();
        Ok(())
    }

    /// Delete a view. Its id is stripped from every widget; if it was active
    /// the first remaining view is activated.
    pub fn delete_view(&mut self, id: &ViewId) -> Result<()> {
        let was_active = self.projector.active_view() == Some(id);
        self.views.delete(id)?;
        reconciler::reconcile(&mut self.widgets, &mut self.views);
        self.persist_views();
        self.dirty = true;
        if was_active {
            self.projector.clear_active_view();
            self.activate_first_view();
        } else {
            self.projector
                .apply_filtering(&mut self.widgets, &self.views, &mut self.grid);
        }
        tracing::info!(view = %id, "view deleted");
        Ok(())
    }

    pub fn set_widget_view_membership(
        &mut self,
        widget_id: &WidgetId,
        view_id: &ViewId,
        included: bool,
    ) -> Result<()> {
        self.views
            .set_widget_view_membership(&mut self.widgets, widget_id, view_id, included)?;
        self.after_membership_change();
        Ok(())
    }

    /// Bulk selection: exactly `selected` belong to `view_id`.
    pub fn set_view_widgets(&mut self, view_id: &ViewId, selected: &[WidgetId]) -> Result<()> {
        self.views
            .set_view_widgets(&mut self.widgets, view_id, selected)?;
        self.after_membership_change();
        Ok(())
    }

    /// The widget belongs to exactly `selected`.
    pub fn set_widget_views(&mut self, widget_id: &WidgetId, selected: &[ViewId]) -> Result<()> {
        self.views
            .set_widget_views(&mut self.widgets, widget_id, selected)?;
        self.after_membership_change();
        Ok(())
    }

    fn after_membership_change(&mut self) {
        self.persist_views();
        self.projector
            .apply_filtering(&mut self.widgets, &self.views, &mut self.grid);
        self.dirty = true;
    }

    pub fn activate_view(&mut self, id: &ViewId) -> Result<Projection> {
        let projection =
            self.projector
                .activate_view(id, &mut self.widgets, &self.views, &mut self.grid)?;
        if self.projector.is_edit_mode() {
            self.dirty = true;
        }
        Ok(projection)
    }

    pub fn apply_filtering(&mut self) -> Projection {
        self.projector
            .apply_filtering(&mut self.widgets, &self.views, &mut self.grid)
    }

    /// Capture the active view's on-grid rects. Only meaningful in edit mode,
    /// where the grid can be dragged.
    pub fn save_widget_positions_for_active_view(&mut self) -> usize {
        let captured = self.projector.save_widget_positions_for_active_view(
            &mut self.widgets,
            &self.views,
            &self.grid,
        );
        if captured > 0 {
            self.dirty = true;
        }
        captured
    }

    pub fn enter_edit(&mut self) {
        if self.projector.is_edit_mode() {
            return;
        }
        self.edit_backup = Some(self.backup());
        self.projector.set_edit_mode(true, &mut self.grid);
        self.projector
            .apply_filtering(&mut self.widgets, &self.views, &mut self.grid);
        tracing::debug!(dashboard = %self.dashboard.id, "edit mode entered");
    }

    /// Commit the edit session: capture positions, save, and return to
    /// viewing.
    pub fn save_edit(&mut self) -> Result<SaveReport> {
        let report = self.perform_save()?;
        self.edit_backup = None;
        self.projector.set_edit_mode(false, &mut self.grid);
        self.projector
            .apply_filtering(&mut self.widgets, &self.views, &mut self.grid);
        Ok(report)
    }

    /// Discard the edit session, restoring widgets and views exactly as they
    /// were when it started.
    pub fn cancel_edit(&mut self) {
        let Some(backup) = self.edit_backup.take() else {
            return;
        };
        self.widgets.replace_all(backup.widgets);
        self.views = backup.views;
        self.persist_views();
        self.dirty = backup.dirty;
        self.projector.set_edit_mode(false, &mut self.grid);

        let active = self
            .projector
            .active_view()
            .filter(|id| self.views.contains(id))
            .cloned();
        if active.is_none() {
            self.projector.clear_active_view();
        }
        self.mount_all();
        match active {
            Some(id) => {
                if let Err(e) = self.activate_view(&id) {
                    tracing::error!(view = %id, "view restore failed: {e}");
                }
            }
            None => self.activate_first_view(),
        }
        tracing::debug!(dashboard = %self.dashboard.id, "edit cancelled");
    }

    /// Persist the current widgets. In edit mode the active view's grid rects
    /// are captured first. A snapshot is appended only when the widgets differ
    /// from the latest one.
    pub fn perform_save(&mut self) -> Result<SaveReport> {
        if self.projector.is_edit_mode() {
            self.projector.save_widget_positions_for_active_view(
                &mut self.widgets,
                &self.views,
                &self.grid,
            );
        }
        let report =
            self.gateway
                .perform_save(&mut self.dashboard, self.widgets.to_configs(), Utc::now())?;
        let views_durable = self.persist_views();
        if report.durable && views_durable {
            self.dirty = false;
        }
        Ok(report)
    }

    /// Saved versions, most recent first.
    pub fn history(&self) -> Vec<&Snapshot> {
        self.dashboard.versions.newest_first().collect()
    }

    /// Restore the `index`-th entry of [`Self::history`].
    pub fn restore_version(&mut self, index: usize) -> Result<SaveReport> {
        let snapshot = self
            .dashboard
            .versions
            .newest_first()
            .nth(index)
            .cloned()
            .ok_or_else(|| DashboardError::NotFound {
                kind: "version",
                id: index.to_string(),
            })?;
        self.restore_snapshot(&snapshot)
    }

    /// Replace every widget with the snapshot's, then save. Restoring is a
    /// committing action.
    pub fn restore_snapshot(&mut self, snapshot: &Snapshot) -> Result<SaveReport> {
        self.widgets.replace_all(snapshot.widgets.clone());
        reconciler::reconcile(&mut self.widgets, &mut self.views);
        self.persist_views();
        self.mount_all();
        self.projector.reposition(&self.widgets, &mut self.grid);
        self.projector
            .apply_filtering(&mut self.widgets, &self.views, &mut self.grid);
        tracing::info!(
            dashboard = %self.dashboard.id,
            widgets = self.widgets.len(),
            "snapshot restored"
        );
        self.perform_save()
    }

    /// Release every render resource and clear the grid.
    pub fn close(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.widgets.release_all();
        if let Err(e) = self.grid.remove_all() {
            tracing::error!("grid clear failed: {e}");
        }
        tracing::info!(dashboard = %self.dashboard.id, "workspace closed");
    }

    fn backup(&self) -> EditBackup {
        EditBackup {
            widgets: self.widgets.to_configs(),
            views: self.views.clone(),
            dirty: self.dirty,
        }
    }

    /// Write the view list through. Returns whether it reached storage.
    fn persist_views(&self) -> bool {
        match self.gateway.save_views(&self.dashboard.id, self.views.list()) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(dashboard = %self.dashboard.id, "views kept in memory only: {e}");
                false
            }
        }
    }

    /// Put every widget on a fresh grid and give it fresh render resources.
    fn mount_all(&mut self) {
        if let Err(e) = self.grid.remove_all() {
            tracing::error!("grid clear failed: {e}");
        }
        let view = self
            .projector
            .active_view()
            .or_else(|| self.views.first().map(|v| &v.id))
            .cloned();
        let interval = self.config.live.interval();
        for id in self.widgets.ids() {
            if let Some(view) = &view {
                if let Ok(widget) = self.widgets.get(&id) {
                    if let Err(e) = self.grid.add_node(&id, widget.rect_for(view)) {
                        tracing::error!(widget = %id, "grid add failed: {e}");
                    }
                }
            }
            if let Err(e) = self.widgets.mount(&id, &mut self.host, interval) {
                tracing::error!(widget = %id, "mount failed: {e}");
            }
        }
    }

    fn activate_first_view(&mut self) {
        let Some(first) = self.views.first().map(|v| v.id.clone()) else {
            return;
        };
        if let Err(e) =
            self.projector
                .activate_view(&first, &mut self.widgets, &self.views, &mut self.grid)
        {
            tracing::error!(view = %first, "activation failed: {e}");
        }
    }
}

impl<G: GridEngine, H: RenderHost> Drop for WorkspaceSession<G, H> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

impl<G: GridEngine, H: RenderHost> std::fmt::Debug for WorkspaceSession<G, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkspaceSession")
            .field("dashboard", &self.dashboard.id)
            .field("widgets", &self.widgets.len())
            .field("views", &self.views.len())
            .field("active_view", &self.projector.active_view())
            .field("edit_mode", &self.projector.is_edit_mode())
            .field("dirty", &self.dirty)
            .finish()
    }
}
