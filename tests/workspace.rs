// End-to-end workspace behaviour over the in-memory store and headless grid
mod common;

use common::{CountingHost, Fixture};
use dashboard_workspace::application::reconciler;
use dashboard_workspace::application::render::GridEngine;
use dashboard_workspace::application::view_store::ViewStore;
use dashboard_workspace::application::widget_store::WidgetStore;
use dashboard_workspace::domain::catalog::WidgetType;
use dashboard_workspace::domain::ids::ViewId;
use dashboard_workspace::domain::layout::Rect;
use dashboard_workspace::domain::widget::WidgetPatch;
use dashboard_workspace::infrastructure::file_store::FileStore;
use dashboard_workspace::infrastructure::headless_grid::HeadlessGrid;
use dashboard_workspace::presentation::view_models;
use dashboard_workspace::{DashboardError, DashboardService, WorkspaceConfig};
use std::collections::BTreeSet;
use std::sync::Arc;

fn title(text: &str) -> WidgetPatch {
    WidgetPatch {
        title: Some(text.to_string()),
        ..Default::default()
    }
}

#[test]
fn test_assigning_widget_to_new_view() {
    let fx = Fixture::new();
    let dash = fx.service.create_dashboard("D1").unwrap();
    let mut session = fx.open(&dash.id, true);

    let widget = session.add_widget(WidgetType::Gauge).unwrap();
    let ops = session.create_view("Ops", "ph-gear").unwrap();
    session.set_widget_view_membership(&widget, &ops, true).unwrap();

    let view = session
        .list_views()
        .iter()
        .find(|v| v.name == "Ops")
        .unwrap();
    assert_eq!(view.widget_ids, vec![widget.clone()]);
    assert!(session.get_widget(&widget).unwrap().is_in_view(&ops));
}

#[test]
fn test_deleting_view_strips_it_from_widgets() {
    let fx = Fixture::new();
    let dash = fx.service.create_dashboard("D2").unwrap();
    let mut session = fx.open(&dash.id, true);

    let a = session.create_view("A", "").unwrap();
    let b = session.create_view("B", "").unwrap();
    let w = session.add_widget(WidgetType::Bar).unwrap();
    session.set_widget_views(&w, &[a.clone(), b.clone()]).unwrap();

    session.delete_view(&a).unwrap();

    let expected: BTreeSet<ViewId> = [b.clone()].into_iter().collect();
    assert_eq!(session.get_widget(&w).unwrap().view_ids, expected);
    assert!(!session.views().contains(&a));
    assert_eq!(session.views().get(&b).unwrap().widget_ids, vec![w]);
}

#[test]
fn test_positions_restore_per_view() {
    let fx = Fixture::new();
    let dash = fx.service.create_dashboard("D3").unwrap();
    let mut session = fx.open(&dash.id, true);

    let a = session.list_views()[0].id.clone();
    let w = session.add_widget(WidgetType::Gauge).unwrap();
    let b = session.create_view("B", "").unwrap();
    session.set_widget_views(&w, &[a.clone(), b.clone()]).unwrap();

    session.activate_view(&a).unwrap();
    session.grid_mut().update_node(&w, Rect::new(2, 3, 4, 2)).unwrap();
    session.activate_view(&b).unwrap();
    session.grid_mut().update_node(&w, Rect::new(0, 0, 2, 2)).unwrap();
    session.activate_view(&a).unwrap();

    assert_eq!(session.grid().rect(&w), Some(Rect::new(2, 3, 4, 2)));
    let widget = session.get_widget(&w).unwrap();
    assert_eq!(widget.positions[&a], Rect::new(2, 3, 4, 2));
    assert_eq!(widget.positions[&b], Rect::new(0, 0, 2, 2));
}

#[test]
fn test_import_without_view_ids_lands_in_first_view() {
    let fx = Fixture::new();
    let raw = r#"{
        "dashboard": { "name": "Legacy line" },
        "widgets": [
            { "id": "w1", "type": "gauge", "title": "Pressure",
              "position": { "x": 4, "y": 0, "w": 4, "h": 4 } },
            { "id": "w2", "type": "basicLine", "data": { "xData": ["a", "b"], "yData": [1, 2] } }
        ],
        "exportInfo": { "exportedAt": "2026-03-01T10:00:00.000Z" }
    }"#;
    let dash = fx.service.import_dashboard(raw).unwrap();
    assert_eq!(dash.imported_from.as_deref(), Some("2026-03-01T10:00:00.000Z"));

    let session = fx.open(&dash.id, false);
    let first = &session.list_views()[0];
    assert_eq!(first.widget_ids.len(), 2);
    for widget in session.widgets().iter() {
        assert!(widget.is_in_view(&first.id));
        assert!(first.widget_ids.contains(&widget.id));
    }
    let w1 = session.get_widget(&"w1".into()).unwrap();
    assert_eq!(w1.rect_for(&first.id), Rect::new(4, 0, 4, 4));
    assert_eq!(session.projection().visible.len(), 2);
}

#[test]
fn test_oversized_import_still_accepts_new_widgets() {
    let fx = Fixture::new();
    let raw = r#"{
        "dashboard": { "name": "Oversized" },
        "widgets": [
            { "id": "far", "type": "bar",
              "position": { "x": 4294967295, "y": 0, "w": 6, "h": 4 } },
            { "id": "tall", "type": "table",
              "position": { "x": 0, "y": 0, "w": 4, "h": 4294967295 },
              "data": { "tableColumns": 4000000000 } }
        ]
    }"#;
    let dash = fx.service.import_dashboard(raw).unwrap();
    let mut session = fx.open(&dash.id, true);

    let card = session.add_widget(WidgetType::Card).unwrap();
    assert_eq!(session.grid().rect(&card), Some(Rect::new(4, 0, 2, 2)));
    let first = session.list_views()[0].id.clone();
    let far = session.get_widget(&"far".into()).unwrap().rect_for(&first);
    assert!(far.x <= 1024 && far.right() > far.x);
    assert!(session.perform_save().unwrap().durable);
}

#[test]
fn test_repeat_save_does_not_grow_history() {
    let fx = Fixture::new();
    let dash = fx.service.create_dashboard("D5").unwrap();
    let mut session = fx.open(&dash.id, true);
    session.add_widget(WidgetType::Card).unwrap();

    let first = session.perform_save().unwrap();
    assert!(first.snapshot_appended);
    let after_first = session.dashboard().versions.len();

    let second = session.perform_save().unwrap();
    assert!(!second.snapshot_appended);
    assert_eq!(session.dashboard().versions.len(), after_first);
    assert!(!session.is_dirty());
}

#[test]
fn test_history_keeps_twenty_most_recent() {
    let fx = Fixture::new();
    let dash = fx.service.create_dashboard("Cap").unwrap();
    let mut session = fx.open(&dash.id, true);
    let w = session.add_widget(WidgetType::Card).unwrap();

    for i in 0..25 {
        session.update_widget(&w, title(&format!("rev {i}"))).unwrap();
        assert!(session.perform_save().unwrap().snapshot_appended);
    }

    let versions = session.dashboard().versions.entries();
    assert_eq!(versions.len(), 20);
    let titles: Vec<String> = versions.iter().map(|s| s.widgets[0].title.clone()).collect();
    let expected: Vec<String> = (5..25).map(|i| format!("rev {i}")).collect();
    assert_eq!(titles, expected);
    assert!(versions.windows(2).all(|p| p[0].timestamp <= p[1].timestamp));

    let stored = fx.service.get_dashboard(&dash.id).unwrap();
    assert_eq!(stored.versions.len(), 20);
}

#[test]
fn test_membership_stays_symmetric_and_idempotent() {
    let fx = Fixture::new();
    let dash = fx.service.create_dashboard("Sym").unwrap();
    let mut session = fx.open(&dash.id, true);

    let default = session.list_views()[0].id.clone();
    let w1 = session.add_widget(WidgetType::Pie).unwrap();
    let ops = session.create_view("Ops", "").unwrap();
    let w2 = session.add_widget(WidgetType::Table).unwrap();
    session.set_view_widgets(&default, &[w1.clone(), w2.clone()]).unwrap();
    session.set_widget_view_membership(&w1, &ops, false).unwrap();

    for view in session.list_views() {
        let expected: Vec<_> = session
            .widgets()
            .iter()
            .filter(|w| w.is_in_view(&view.id))
            .map(|w| w.id.clone())
            .collect();
        assert_eq!(view.widget_ids, expected, "view {}", view.name);
    }

    let mut widgets = WidgetStore::from_configs(session.widgets().to_configs());
    let mut views: ViewStore = session.views().clone();
    reconciler::reconcile(&mut widgets, &mut views);
    let once = (widgets.to_configs(), views.clone());
    reconciler::reconcile(&mut widgets, &mut views);
    assert_eq!(once, (widgets.to_configs(), views));
    assert_eq!(&once.1, session.views());
}

#[test]
fn test_no_dangling_references_after_churn() {
    let fx = Fixture::new();
    let dash = fx.service.create_dashboard("Churn").unwrap();
    let mut session = fx.open(&dash.id, true);

    let a = session.create_view("A", "").unwrap();
    let w1 = session.add_widget(WidgetType::Gauge).unwrap();
    let b = session.create_view("B", "").unwrap();
    let w2 = session.add_widget(WidgetType::Radar).unwrap();
    session.set_widget_views(&w1, &[a.clone(), b.clone()]).unwrap();
    session.set_widget_views(&w2, &[a.clone()]).unwrap();
    session.remove_widget(&w1).unwrap();
    session.delete_view(&a).unwrap();

    assert!(reconciler::is_consistent(session.widgets(), session.views()));
    let view_ids = session.views().ids();
    for widget in session.widgets().iter() {
        assert!(widget.view_ids.is_subset(&view_ids));
    }
    for view in session.list_views() {
        assert!(view.widget_ids.iter().all(|id| session.widgets().contains(id)));
    }
}

#[test]
fn test_last_view_cannot_be_deleted() {
    let fx = Fixture::new();
    let dash = fx.service.create_dashboard("Solo").unwrap();
    let mut session = fx.open(&dash.id, false);

    let only = session.list_views()[0].id.clone();
    let err = session.delete_view(&only).unwrap_err();
    assert!(matches!(err, DashboardError::InvariantViolation(_)));
    assert_eq!(session.views().len(), 1);

    let extra = session.create_view("Extra", "").unwrap();
    session.delete_view(&only).unwrap();
    assert!(matches!(
        session.delete_view(&extra),
        Err(DashboardError::InvariantViolation(_))
    ));
    assert_eq!(session.active_view(), Some(&extra));
}

#[test]
fn test_moving_in_one_view_leaves_other_view_untouched() {
    let fx = Fixture::new();
    let dash = fx.service.create_dashboard("Iso").unwrap();
    let mut session = fx.open(&dash.id, true);

    let a = session.list_views()[0].id.clone();
    let w = session.add_widget(WidgetType::Donut).unwrap();
    let b = session.create_view("B", "").unwrap();
    session.set_widget_views(&w, &[a.clone(), b.clone()]).unwrap();
    session.activate_view(&b).unwrap();
    let before_a = session.get_widget(&w).unwrap().rect_for(&a);

    session.grid_mut().update_node(&w, Rect::new(6, 6, 3, 3)).unwrap();
    session.save_widget_positions_for_active_view();

    let widget = session.get_widget(&w).unwrap();
    assert_eq!(widget.rect_for(&b), Rect::new(6, 6, 3, 3));
    assert_eq!(widget.rect_for(&a), before_a);
}

#[test]
fn test_cancel_edit_restores_widgets_and_views() {
    let fx = Fixture::new();
    let dash = fx.service.create_dashboard("Cancel").unwrap();
    let mut session = fx.open(&dash.id, false);

    session.enter_edit();
    let w = session.add_widget(WidgetType::Gauge).unwrap();
    session.create_view("Scratch", "").unwrap();
    session.cancel_edit();

    assert!(!session.is_edit_mode());
    assert!(!session.widgets().contains(&w));
    assert_eq!(session.views().len(), 1);
    assert!(session.active_view().is_some());
    assert_eq!(fx.service.gateway().load_views(&dash.id).len(), 1);
}

#[test]
fn test_failed_write_keeps_session_dirty() {
    let fx = Fixture::new();
    let dash = fx.service.create_dashboard("Flaky").unwrap();
    let mut session = fx.open(&dash.id, true);
    session.add_widget(WidgetType::Card).unwrap();

    fx.store.set_fail_writes(true);
    let report = session.perform_save().unwrap();
    assert!(!report.durable);
    assert!(session.is_dirty());
    assert_eq!(session.dashboard().widgets.len(), 1);

    fx.store.set_fail_writes(false);
    assert!(session.perform_save().unwrap().durable);
    assert!(!session.is_dirty());
}

#[test]
fn test_restore_version_brings_back_old_widgets() {
    let fx = Fixture::new();
    let dash = fx.service.create_dashboard("Restore").unwrap();
    let mut session = fx.open(&dash.id, true);

    let keep = session.add_widget(WidgetType::Gauge).unwrap();
    session.perform_save().unwrap();
    let extra = session.add_widget(WidgetType::Bar).unwrap();
    session.perform_save().unwrap();

    let rows = view_models::history_rows(session.history());
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[1].widget_count, 1);

    session.restore_version(rows[1].index).unwrap();
    assert!(session.widgets().contains(&keep));
    assert!(!session.widgets().contains(&extra));
    assert!(reconciler::is_consistent(session.widgets(), session.views()));
    assert_eq!(session.dashboard().versions.len(), 3);

    assert!(matches!(
        session.restore_version(99),
        Err(DashboardError::NotFound { kind: "version", .. })
    ));
}

#[test]
fn test_render_resources_follow_widget_lifetime() {
    let fx = Fixture::new();
    let dash = fx.service.create_dashboard("Live").unwrap();
    let mut session = fx.open(&dash.id, true);

    let live = session.add_widget(WidgetType::Timeseries).unwrap();
    session.add_widget(WidgetType::Pie).unwrap();
    assert_eq!(fx.host.live(), 5);

    session.remove_widget(&live).unwrap();
    assert_eq!(fx.host.live(), 2);

    session.close();
    assert_eq!(fx.host.live(), 0);
}

#[test]
fn test_delete_dashboard_cascades() {
    let fx = Fixture::new();
    let dash = fx.service.create_dashboard("Gone").unwrap();
    let panel = fx.service.panel_id(&dash.id);
    assert_eq!(fx.service.panel_id(&dash.id), panel);
    let mut session = fx.open(&dash.id, true);
    session.create_view("Ops", "").unwrap();
    session.close();

    fx.service.delete_dashboard(&dash.id).unwrap();
    assert!(fx.service.list_dashboards().is_empty());
    assert!(fx.service.gateway().load_views(&dash.id).is_empty());
    assert_ne!(fx.service.panel_id(&dash.id), panel);
    assert!(matches!(
        fx.service.get_dashboard(&dash.id),
        Err(DashboardError::NotFound { .. })
    ));
}

#[test]
fn test_file_store_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let config = WorkspaceConfig::default();
    let host = CountingHost::default();

    let service = DashboardService::new(Arc::new(FileStore::new(dir.path())), config.clone());
    let dash = service.create_dashboard("Durable").unwrap();
    let mut session = service
        .open(&dash.id, true, HeadlessGrid::default(), host.clone())
        .unwrap();
    let w = session.add_widget(WidgetType::Gauge).unwrap();
    let ops = session.create_view("Ops", "ph-gear").unwrap();
    session.set_widget_view_membership(&w, &ops, true).unwrap();
    assert!(session.save_edit().unwrap().durable);
    session.close();

    let reopened = DashboardService::new(Arc::new(FileStore::new(dir.path())), config);
    let session = reopened
        .open(&dash.id, false, HeadlessGrid::default(), host)
        .unwrap();
    assert_eq!(session.widgets().len(), 1);
    assert_eq!(session.views().len(), 2);
    assert_eq!(session.views().get(&ops).unwrap().widget_ids, vec![w.clone()]);
    assert_eq!(session.dashboard().versions.len(), 1);

    let cards = view_models::dashboard_cards(&reopened.list_dashboards(), |id| reopened.panel_id(id));
    assert_eq!(cards.len(), 1);
    assert_eq!(cards[0].widget_count, 1);
}
