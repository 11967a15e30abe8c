// Shared fixtures for the workspace integration tests
#![allow(dead_code)]

use dashboard_workspace::application::render::{
    ChartHandle, Disposable, RenderHost, RenderResult,
};
use dashboard_workspace::domain::ids::WidgetId;
use dashboard_workspace::domain::widget::WidgetConfig;
use dashboard_workspace::infrastructure::headless_grid::HeadlessGrid;
use dashboard_workspace::infrastructure::memory_store::InMemoryStore;
use dashboard_workspace::{DashboardService, WorkspaceConfig, WorkspaceSession};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Render host that counts live resources: every mount adds one, every
/// release removes one.
#[derive(Clone, Default)]
pub struct CountingHost {
    live: Arc<Mutex<i64>>,
    mounted: Arc<Mutex<usize>>,
}

impl CountingHost {
    pub fn live(&self) -> i64 {
        *self.live.lock().unwrap()
    }

    pub fn mounted(&self) -> usize {
        *self.mounted.lock().unwrap()
    }

    fn resource(&self) -> Counted {
        *self.live.lock().unwrap() += 1;
        Counted {
            live: self.live.clone(),
        }
    }
}

struct Counted {
    live: Arc<Mutex<i64>>,
}

impl Counted {
    fn release(&mut self) -> RenderResult<()> {
        *self.live.lock().unwrap() -= 1;
        Ok(())
    }
}

impl ChartHandle for Counted {
    fn set_options(&mut self, _widget: &WidgetConfig) -> RenderResult<()> {
        Ok(())
    }

    fn resize(&mut self) -> RenderResult<()> {
        Ok(())
    }

    fn dispose(&mut self) -> RenderResult<()> {
        self.release()
    }
}

impl Disposable for Counted {
    fn dispose(&mut self) -> RenderResult<()> {
        self.release()
    }
}

impl RenderHost for CountingHost {
    fn mount_chart(&mut self, _widget: &WidgetConfig) -> RenderResult<Box<dyn ChartHandle>> {
        *self.mounted.lock().unwrap() += 1;
        Ok(Box::new(self.resource()))
    }

    fn start_live_timer(
        &mut self,
        _id: &WidgetId,
        _interval: Duration,
    ) -> RenderResult<Box<dyn Disposable>> {
        Ok(Box::new(self.resource()))
    }

    fn watch_resize(&mut self, _id: &WidgetId) -> RenderResult<Box<dyn Disposable>> {
        Ok(Box::new(self.resource()))
    }
}

pub type Session = WorkspaceSession<HeadlessGrid, CountingHost>;

pub struct Fixture {
    pub store: Arc<InMemoryStore>,
    pub service: DashboardService,
    pub host: CountingHost,
}

impl Fixture {
    pub fn new() -> Self {
        let store = Arc::new(InMemoryStore::new());
        let service = DashboardService::new(store.clone(), WorkspaceConfig::default());
        Self {
            store,
            service,
            host: CountingHost::default(),
        }
    }

    pub fn open(&self, id: &dashboard_workspace::domain::ids::DashboardId, edit: bool) -> Session {
        self.service
            .open(id, edit, HeadlessGrid::default(), self.host.clone())
            .unwrap()
    }
}
