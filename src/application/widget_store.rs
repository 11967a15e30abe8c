// Widget store - widget configurations and their render resources
use crate::application::render::{RenderHost, RenderResources};
use crate::domain::catalog::WidgetType;
use crate::domain::ids::{ViewId, WidgetId};
use crate::domain::layout::Rect;
use crate::domain::widget::{WidgetConfig, WidgetPatch};
use crate::error::{DashboardError, Result};
use hashlink::LinkedHashMap;
use std::collections::HashMap;
use std::time::Duration;

/// Where a newly added widget lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placement {
    pub view_id: Option<ViewId>,
    /// Add the active view to the widget's membership.
    pub assign: bool,
    pub rect: Rect,
}

/// Widgets keyed by id in insertion order, plus an id-indexed map of their
/// transient render resources.
#[derive(Debug, Default)]
pub struct WidgetStore {
    widgets: LinkedHashMap<WidgetId, WidgetConfig>,
    resources: HashMap<WidgetId, RenderResources>,
}

impl WidgetStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store from loaded configurations. Later duplicates of an id
    /// are dropped.
    pub fn from_configs(configs: impl IntoIterator<Item = WidgetConfig>) -> Self {
        let mut store = Self::new();
        for cfg in configs {
            if store.widgets.contains_key(&cfg.id) {
                tracing::warn!(widget = %cfg.id, "duplicate widget id dropped");
                continue;
            }
            store.widgets.insert(cfg.id.clone(), cfg);
        }
        store
    }

    /// Create a widget of `widget_type` from catalog defaults.
    pub fn add(&mut self, widget_type: WidgetType, placement: Placement) -> &WidgetConfig {
        let mut id = WidgetId::generate();
        while self.widgets.contains_key(&id) {
            id = WidgetId::generate();
        }
        let mut cfg = WidgetConfig::from_catalog(id.clone(), widget_type);
        if let Some(view_id) = placement.view_id {
            cfg.set_rect(&view_id, placement.rect);
            if placement.assign {
                cfg.view_ids.insert(view_id);
            }
        }
        tracing::debug!(widget = %id, kind = widget_type.as_str(), "widget added");
        self.widgets.entry(id).or_insert(cfg)
    }

    /// Remove a widget and release its render resources.
    pub fn remove(&mut self, id: &WidgetId) -> Result<WidgetConfig> {
        let cfg = self
            .widgets
            .remove(id)
            .ok_or_else(|| DashboardError::widget_not_found(id))?;
        if let Some(mut resources) = self.resources.remove(id) {
            resources.release();
        }
        Ok(cfg)
    }

    /// Apply a settings patch and push the result to the widget's chart.
    pub fn update(&mut self, id: &WidgetId, patch: WidgetPatch) -> Result<&WidgetConfig> {
        let cfg = self
            .widgets
            .get_mut(id)
            .ok_or_else(|| DashboardError::widget_not_found(id))?;
        cfg.apply_patch(patch)?;
        if let Some(resources) = self.resources.get_mut(id) {
            resources.refresh(cfg);
        }
        Ok(cfg)
    }

    pub fn get(&self, id: &WidgetId) -> Result<&WidgetConfig> {
        self.widgets
            .get(id)
            .ok_or_else(|| DashboardError::widget_not_found(id))
    }

    pub fn get_mut(&mut self, id: &WidgetId) -> Result<&mut WidgetConfig> {
        self.widgets
            .get_mut(id)
            .ok_or_else(|| DashboardError::widget_not_found(id))
    }

    pub fn contains(&self, id: &WidgetId) -> bool {
        self.widgets.contains_key(id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &WidgetConfig> {
        self.widgets.values()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut WidgetConfig> {
        self.widgets.values_mut()
    }

    pub fn ids(&self) -> Vec<WidgetId> {
        self.widgets.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.widgets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.widgets.is_empty()
    }

    /// Deep copy of every configuration, in store order.
    pub fn to_configs(&self) -> Vec<WidgetConfig> {
        self.widgets.values().cloned().collect()
    }

    /// Create render resources for `id`, replacing (and releasing) any it had.
    pub fn mount(&mut self, id: &WidgetId, host: &mut dyn RenderHost, live_interval: Duration) -> Result<()> {
        let cfg = self.get(id)?;
        let resources = RenderResources::mount(host, cfg, live_interval);
        if let Some(mut old) = self.resources.insert(id.clone(), resources) {
            old.release();
        }
        Ok(())
    }

    /// Resize the charts of the given widgets.
    pub fn resize_charts<'a>(&mut self, ids: impl IntoIterator<Item = &'a WidgetId>) {
        for id in ids {
            if let Some(resources) = self.resources.get_mut(id) {
                resources.resize();
            }
        }
    }

    pub fn has_resources(&self, id: &WidgetId) -> bool {
        self.resources.contains_key(id)
    }

    /// Release every render resource, keeping the configurations.
    pub fn release_all(&mut self) {
        for (_, mut resources) in self.resources.drain() {
            resources.release();
        }
    }

    /// Replace every widget with `configs`; all previous render resources are
    /// released.
    pub fn replace_all(&mut self, configs: Vec<WidgetConfig>) {
        self.release_all();
        *self = Self::from_configs(configs);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::render::testing::RecordingHost;
    use crate::domain::widget::WidgetBody;

    const TICK: Duration = Duration::from_millis(10);

    fn placement(view: &str, assign: bool) -> Placement {
        Placement {
            view_id: Some(ViewId::new(view)),
            assign,
            rect: Rect::new(4, 0, 4, 4),
        }
    }

    #[test]
    fn test_add_assigns_active_view_when_requested() {
        let mut store = WidgetStore::new();
        let cfg = store.add(WidgetType::Gauge, placement("ops", true)).clone();
        assert!(cfg.is_in_view(&ViewId::new("ops")));
        assert_eq!(cfg.positions[&ViewId::new("ops")], Rect::new(4, 0, 4, 4));

        let cfg = store.add(WidgetType::Gauge, placement("ops", false)).clone();
        assert!(cfg.view_ids.is_empty());
        assert!(cfg.positions.contains_key(&ViewId::new("ops")));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_missing_widget_reports_not_found() {
        let mut store = WidgetStore::new();
        let id = WidgetId::new("nope");
        assert!(matches!(store.remove(&id), Err(DashboardError::NotFound { kind: "widget", .. })));
        assert!(store.update(&id, WidgetPatch::default()).is_err());
        assert!(store.get(&id).is_err());
    }

    #[test]
    fn test_update_keeps_identity_and_refreshes_chart() {
        let mut host = RecordingHost::default();
        let mut store = WidgetStore::new();
        let id = store.add(WidgetType::Pie, placement("a", true)).id.clone();
        store.mount(&id, &mut host, TICK).unwrap();

        let patch = WidgetPatch {
            title: Some("Share".into()),
            body: Some(WidgetBody::Embed),
            ..Default::default()
        };
        assert!(store.update(&id, patch).is_err());

        store
            .update(
                &id,
                WidgetPatch {
                    title: Some("Share".into()),
                    ..Default::default()
                },
            )
            .unwrap();
        let cfg = store.get(&id).unwrap();
        assert_eq!(cfg.id, id);
        assert_eq!(cfg.widget_type, WidgetType::Pie);
        assert_eq!(host.count(&format!("options {id} Share")), 1);
    }

    #[test]
    fn test_remove_releases_resources() {
        let mut host = RecordingHost::default();
        let mut store = WidgetStore::new();
        let id = store.add(WidgetType::Timeseries, placement("a", true)).id.clone();
        store.mount(&id, &mut host, TICK).unwrap();
        assert!(store.has_resources(&id));

        store.remove(&id).unwrap();
        assert!(!store.has_resources(&id));
        assert_eq!(host.count(&format!("release timer:{id}")), 1);
        assert_eq!(host.count(&format!("dispose {id}")), 1);
    }

    #[test]
    fn test_replace_all_releases_previous_resources() {
        let mut host = RecordingHost::default();
        let mut store = WidgetStore::new();
        let id = store.add(WidgetType::Bar, placement("a", true)).id.clone();
        store.mount(&id, &mut host, TICK).unwrap();

        let replacement = WidgetConfig::from_catalog(WidgetId::new("w_new"), WidgetType::Card);
        store.replace_all(vec![replacement]);
        assert_eq!(host.count(&format!("dispose {id}")), 1);
        assert_eq!(store.ids(), vec![WidgetId::new("w_new")]);
    }

    #[test]
    fn test_from_configs_drops_duplicates_and_keeps_order() {
        let a = WidgetConfig::from_catalog(WidgetId::new("a"), WidgetType::Card);
        let b = WidgetConfig::from_catalog(WidgetId::new("b"), WidgetType::Card);
        let store = WidgetStore::from_configs(vec![b.clone(), a.clone(), b]);
        assert_eq!(store.ids(), vec![WidgetId::new("b"), WidgetId::new("a")]);
    }
}
