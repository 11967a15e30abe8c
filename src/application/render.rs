// Render collaborator traits and the per-widget resource bundle
use crate::domain::ids::WidgetId;
use crate::domain::layout::Rect;
use crate::domain::widget::WidgetConfig;
use crate::error::RenderAdapterError;
use std::time::Duration;

pub type RenderResult<T> = std::result::Result<T, RenderAdapterError>;

/// A widget node as the grid engine currently sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridNode {
    pub id: WidgetId,
    pub rect: Rect,
}

/// Grid layout / drag-resize engine.
pub trait GridEngine {
    fn add_node(&mut self, id: &WidgetId, rect: Rect) -> RenderResult<()>;

    fn remove_node(&mut self, id: &WidgetId) -> RenderResult<()>;

    fn update_node(&mut self, id: &WidgetId, rect: Rect) -> RenderResult<()>;

    /// Current nodes with their rects. Errors when the engine state is not
    /// available.
    fn nodes(&self) -> RenderResult<Vec<GridNode>>;

    /// Hidden nodes are non-interactive and fully transparent but stay in the
    /// engine's bookkeeping.
    fn set_visible(&mut self, id: &WidgetId, visible: bool) -> RenderResult<()>;

    /// Enable or disable drag and resize.
    fn set_editable(&mut self, editable: bool) -> RenderResult<()>;

    fn remove_all(&mut self) -> RenderResult<()>;
}

/// Chart-library instance bound to one widget.
pub trait ChartHandle {
    fn set_options(&mut self, widget: &WidgetConfig) -> RenderResult<()>;

    fn resize(&mut self) -> RenderResult<()>;

    fn dispose(&mut self) -> RenderResult<()>;
}

/// Any transient resource that must be released exactly once (timers,
/// resize watchers).
pub trait Disposable {
    fn dispose(&mut self) -> RenderResult<()>;
}

/// Host UI toolkit that creates transient render resources.
pub trait RenderHost {
    fn mount_chart(&mut self, widget: &WidgetConfig) -> RenderResult<Box<dyn ChartHandle>>;

    fn start_live_timer(
        &mut self,
        id: &WidgetId,
        interval: Duration,
    ) -> RenderResult<Box<dyn Disposable>>;

    fn watch_resize(&mut self, id: &WidgetId) -> RenderResult<Box<dyn Disposable>>;
}

/// Transient render resources owned by one widget. Released by
/// [`RenderResources::release`] or on drop, whichever comes first.
#[derive(Default)]
pub struct RenderResources {
    widget_id: Option<WidgetId>,
    chart: Option<Box<dyn ChartHandle>>,
    live_timer: Option<Box<dyn Disposable>>,
    resize_watcher: Option<Box<dyn Disposable>>,
}

impl RenderResources {
    /// Create whatever resources the widget's type needs. Individual failures
    /// are logged and leave that resource absent.
    pub fn mount(host: &mut dyn RenderHost, widget: &WidgetConfig, live_interval: Duration) -> Self {
        let mut resources = Self {
            widget_id: Some(widget.id.clone()),
            chart: None,
            live_timer: None,
            resize_watcher: None,
        };
        if !widget.widget_type.is_chart() {
            return resources;
        }

        match host.mount_chart(widget) {
            Ok(mut chart) => {
                if let Err(e) = chart.set_options(widget) {
                    tracing::error!(widget = %widget.id, "chart options rejected: {e}");
                }
                resources.chart = Some(chart);
            }
            Err(e) => tracing::error!(widget = %widget.id, "chart mount failed: {e}"),
        }
        match host.watch_resize(&widget.id) {
            Ok(watcher) => resources.resize_watcher = Some(watcher),
            Err(e) => tracing::error!(widget = %widget.id, "resize watcher failed: {e}"),
        }
        if widget.widget_type.is_live() {
            match host.start_live_timer(&widget.id, live_interval) {
                Ok(timer) => resources.live_timer = Some(timer),
                Err(e) => tracing::error!(widget = %widget.id, "live timer failed: {e}"),
            }
        }
        resources
    }

    pub fn has_chart(&self) -> bool {
        self.chart.is_some()
    }

    /// Push new options to the chart. Failures are logged only.
    pub fn refresh(&mut self, widget: &WidgetConfig) {
        if let Some(chart) = self.chart.as_mut() {
            if let Err(e) = chart.set_options(widget) {
                tracing::error!(widget = %widget.id, "chart refresh failed: {e}");
            }
        }
    }

    /// Resize the chart to its container. Failures are logged only.
    pub fn resize(&mut self) {
        if let Some(chart) = self.chart.as_mut() {
            if let Err(e) = chart.resize() {
                tracing::error!(widget = ?self.widget_id, "chart resize failed: {e}");
            }
        }
    }

    /// Cancel the timer, disconnect the watcher and dispose the chart. Safe to
    /// call more than once.
    pub fn release(&mut self) {
        if let Some(mut timer) = self.live_timer.take() {
            if let Err(e) = timer.dispose() {
                tracing::error!(widget = ?self.widget_id, "timer cancel failed: {e}");
            }
        }
        if let Some(mut watcher) = self.resize_watcher.take() {
            if let Err(e) = watcher.dispose() {
                tracing::error!(widget = ?self.widget_id, "resize watcher disconnect failed: {e}");
            }
        }
        if let Some(mut chart) = self.chart.take() {
            if let Err(e) = chart.dispose() {
                tracing::error!(widget = ?self.widget_id, "chart dispose failed: {e}");
            }
        }
    }
}

impl Drop for RenderResources {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for RenderResources {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RenderResources")
            .field("widget_id", &self.widget_id)
            .field("chart", &self.chart.is_some())
            .field("live_timer", &self.live_timer.is_some())
            .field("resize_watcher", &self.resize_watcher.is_some())
            .finish()
    }
}


#[cfg(test)]
mod tests {
    use super::testing::RecordingHost;
    use super::*;
    use crate::domain::catalog::WidgetType;

    const TICK: Duration = Duration::from_millis(2000);

    #[test]
    fn test_live_widget_gets_timer_and_releases_everything() {
        let mut host = RecordingHost::default();
        let widget = WidgetConfig::from_catalog(WidgetId::new("ts"), WidgetType::Timeseries);
        let mut resources = RenderResources::mount(&mut host, &widget, TICK);
        assert!(resources.has_chart());
        assert_eq!(host.count("timer ts"), 1);

        resources.release();
        resources.release();
        assert_eq!(host.count("release timer:ts"), 1);
        assert_eq!(host.count("release watch:ts"), 1);
        assert_eq!(host.count("dispose ts"), 1);
    }

    #[test]
    fn test_drop_releases() {
        let mut host = RecordingHost::default();
        let widget = WidgetConfig::from_catalog(WidgetId::new("g"), WidgetType::Gauge);
        drop(RenderResources::mount(&mut host, &widget, TICK));
        assert_eq!(host.count("dispose g"), 1);
        assert_eq!(host.count("timer"), 0);
    }

    #[test]
    fn test_non_chart_widget_mounts_nothing() {
        let mut host = RecordingHost::default();
        let widget = WidgetConfig::from_catalog(WidgetId::new("t"), WidgetType::Table);
        let resources = RenderResources::mount(&mut host, &widget, TICK);
        assert!(!resources.has_chart());
        assert!(host.entries().is_empty());
    }

    #[test]
    fn test_mount_failure_is_swallowed() {
        let mut host = RecordingHost {
            fail_mount: true,
            ..Default::default()
        };
        let widget = WidgetConfig::from_catalog(WidgetId::new("p"), WidgetType::Pie);
        let resources = RenderResources::mount(&mut host, &widget, TICK);
        assert!(!resources.has_chart());
        assert_eq!(host.count("watch p"), 1);
    }
}
