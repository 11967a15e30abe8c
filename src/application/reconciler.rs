// Membership reconciler - keeps widget-side and view-side membership in step
//
// Widget `view_ids` is the single source of truth. `View::widget_ids` is a
// cache rebuilt from it here. Stored view lists are read back exactly once,
// at load time, as a migration hint for widgets that carry no membership.
use crate::application::view_store::ViewStore;
use crate::application::widget_store::WidgetStore;
use crate::domain::ids::ViewId;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReconcileReport {
    /// Membership entries dropped because their view no longer exists.
    pub pruned_memberships: usize,
    /// Per-view positions dropped because their view no longer exists.
    pub pruned_positions: usize,
}

/// Prune dangling view ids from every widget, then rebuild every view's
/// member list from the widgets. Idempotent.
pub fn reconcile(widgets: &mut WidgetStore, views: &mut ViewStore) -> ReconcileReport {
    let existing: BTreeSet<ViewId> = views.ids();
    let mut report = ReconcileReport::default();

    for widget in widgets.iter_mut() {
        let before = widget.view_ids.len();
        widget.view_ids.retain(|id| existing.contains(id));
        report.pruned_memberships += before - widget.view_ids.len();

        let before = widget.positions.len();
        widget.positions.retain(|id, _| existing.contains(id));
        report.pruned_positions += before - widget.positions.len();
    }

    for view in views.iter_mut() {
        view.widget_ids.clear();
    }
    for widget in widgets.iter() {
        for view_id in &widget.view_ids {
            if let Ok(view) = views.get_mut(view_id) {
                view.widget_ids.push(widget.id.clone());
            }
        }
    }

    if report.pruned_memberships > 0 || report.pruned_positions > 0 {
        tracing::debug!(
            memberships = report.pruned_memberships,
            positions = report.pruned_positions,
            "pruned references to deleted views"
        );
    }
    report
}

/// One-time load migration: a widget with no recorded membership that a
/// stored view lists as a member is given that membership. Must run before
/// the first [`reconcile`] of a freshly loaded dashboard, while the stored
/// view lists are still intact. Returns the number of widgets seeded.
pub fn migrate_legacy_membership(widgets: &mut WidgetStore, views: &ViewStore) -> usize {
    let mut seeded = 0;
    for widget in widgets.iter_mut().filter(|w| w.view_ids.is_empty()) {
        for view in views.list() {
            if view.contains(&widget.id) {
                widget.view_ids.insert(view.id.clone());
            }
        }
        if !widget.view_ids.is_empty() {
            seeded += 1;
        }
    }
    if seeded > 0 {
        tracing::info!(widgets = seeded, "seeded widget membership from stored views");
    }
    seeded
}

/// When no widget belongs to any view (imported or pre-view data), put every
/// widget into the first view. Returns the number of widgets assigned.
pub fn assign_unplaced_to_first_view(widgets: &mut WidgetStore, views: &ViewStore) -> usize {
    let Some(first) = views.first() else {
        return 0;
    };
    if widgets.iter().any(|w| !w.view_ids.is_empty()) {
        return 0;
    }
    let mut assigned = 0;
    for widget in widgets.iter_mut() {
        widget.view_ids.insert(first.id.clone());
        assigned += 1;
    }
    if assigned > 0 {
        tracing::info!(widgets = assigned, view = %first.id, "assigned unplaced widgets to first view");
    }
    assigned
}

/// Whether the membership contract holds: every view lists exactly the
/// widgets that name it, and no widget names a missing view.
pub fn is_consistent(widgets: &WidgetStore, views: &ViewStore) -> bool {
    let existing = views.ids();
    let widgets_ok = widgets
        .iter()
        .all(|w| w.view_ids.iter().all(|id| existing.contains(id)));
    let views_ok = views.list().iter().all(|view| {
        let expected: Vec<_> = widgets
            .iter()
            .filter(|w| w.is_in_view(&view.id))
            .map(|w| w.id.clone())
            .collect();
        view.widget_ids == expected
    });
    widgets_ok && views_ok
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::catalog::WidgetType;
    use crate::domain::ids::WidgetId;
    use crate::domain::layout::Rect;
    use crate::domain::view::View;
    use crate::domain::widget::WidgetConfig;

    fn widget(id: &str, views: &[&str]) -> WidgetConfig {
        let mut cfg = WidgetConfig::from_catalog(WidgetId::new(id), WidgetType::Card);
        cfg.view_ids = views.iter().map(|v| ViewId::new(*v)).collect();
        cfg
    }

    fn views(ids: &[&str]) -> ViewStore {
        ViewStore::from_views(
            ids.iter()
                .enumerate()
                .map(|(i, id)| View::new(ViewId::new(*id), *id, "", i as u32))
                .collect(),
        )
    }

    #[test]
    fn test_rebuilds_view_lists_from_widgets() {
        let mut widgets = WidgetStore::from_configs(vec![
            widget("w1", &["a", "b"]),
            widget("w2", &["b"]),
            widget("w3", &[]),
        ]);
        let mut views = views(&["a", "b"]);
        views.get_mut(&ViewId::new("a")).unwrap().widget_ids = vec![WidgetId::new("w3")];

        reconcile(&mut widgets, &mut views);
        assert_eq!(views.get(&ViewId::new("a")).unwrap().widget_ids, vec![WidgetId::new("w1")]);
        assert_eq!(
            views.get(&ViewId::new("b")).unwrap().widget_ids,
            vec![WidgetId::new("w1"), WidgetId::new("w2")]
        );
        assert!(is_consistent(&widgets, &views));
    }

    #[test]
    fn test_prunes_dangling_view_ids_and_positions() {
        let mut cfg = widget("w1", &["a", "gone"]);
        cfg.set_rect(&ViewId::new("gone"), Rect::new(1, 1, 2, 2));
        let mut widgets = WidgetStore::from_configs(vec![cfg]);
        let mut views = views(&["a"]);

        let report = reconcile(&mut widgets, &mut views);
        assert_eq!(report.pruned_memberships, 1);
        assert_eq!(report.pruned_positions, 1);
        let w = widgets.get(&WidgetId::new("w1")).unwrap();
        assert_eq!(w.view_ids, BTreeSet::from([ViewId::new("a")]));
        assert!(w.positions.is_empty());
    }

    #[test]
    fn test_idempotent() {
        let mut widgets = WidgetStore::from_configs(vec![
            widget("w1", &["a", "x"]),
            widget("w2", &["b"]),
        ]);
        let mut views = views(&["a", "b"]);
        reconcile(&mut widgets, &mut views);
        let (once_widgets, once_views) = (widgets.to_configs(), views.clone());
        let report = reconcile(&mut widgets, &mut views);
        assert_eq!(report, ReconcileReport::default());
        assert_eq!(widgets.to_configs(), once_widgets);
        assert_eq!(views, once_views);
    }

    #[test]
    fn test_legacy_hint_seeds_only_empty_widgets() {
        let mut widgets = WidgetStore::from_configs(vec![widget("w1", &[]), widget("w2", &["b"])]);
        let mut views = views(&["a", "b"]);
        views.get_mut(&ViewId::new("a")).unwrap().widget_ids =
            vec![WidgetId::new("w1"), WidgetId::new("w2")];

        assert_eq!(migrate_legacy_membership(&mut widgets, &views), 1);
        reconcile(&mut widgets, &mut views);
        assert_eq!(
            widgets.get(&WidgetId::new("w1")).unwrap().view_ids,
            BTreeSet::from([ViewId::new("a")])
        );
        assert_eq!(
            widgets.get(&WidgetId::new("w2")).unwrap().view_ids,
            BTreeSet::from([ViewId::new("b")])
        );
    }

    #[test]
    fn test_after_migration_view_lists_are_never_read_back() {
        let mut widgets = WidgetStore::from_configs(vec![widget("w1", &[])]);
        let mut views = views(&["a"]);
        reconcile(&mut widgets, &mut views);
        views.get_mut(&ViewId::new("a")).unwrap().widget_ids = vec![WidgetId::new("w1")];
        reconcile(&mut widgets, &mut views);
        assert!(views.get(&ViewId::new("a")).unwrap().widget_ids.is_empty());
    }

    #[test]
    fn test_unplaced_widgets_go_to_first_view_only_when_none_placed() {
        let mut widgets = WidgetStore::from_configs(vec![widget("w1", &[]), widget("w2", &[])]);
        let views = views(&["a", "b"]);
        assert_eq!(assign_unplaced_to_first_view(&mut widgets, &views), 2);

        let mut widgets = WidgetStore::from_configs(vec![widget("w1", &[]), widget("w2", &["b"])]);
        assert_eq!(assign_unplaced_to_first_view(&mut widgets, &views), 0);
        assert!(widgets.get(&WidgetId::new("w1")).unwrap().view_ids.is_empty());
    }
}
