// Widget catalog - static registry of widget types and their defaults
use crate::domain::layout::Size;
use crate::domain::widget::{GroupItem, Scalar, WidgetBody};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_COLOR: &str = "#4f46e5";
const FALLBACK_ICON: &str = "ph-line-chart";
const FALLBACK_SIZE: Size = Size::new(6, 4);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum WidgetType {
    BasicLine,
    SmoothLine,
    StepLine,
    BasicArea,
    StackedLine,
    StackedArea,
    MultiAxis,
    ConfidenceBand,
    LargeArea,
    Timeseries,
    DynamicLine,
    Bar,
    HorizontalBar,
    StackedBar,
    SortBar,
    SimpleEncode,
    FloatingBar,
    PolarBar,
    RadialBar,
    Pie,
    Donut,
    Radar,
    Polar,
    Gauge,
    Progress,
    Liquid,
    MultiGauge,
    Dashboard,
    Thermometer,
    Scatter,
    Bubble,
    ScatterMatrix,
    ScatterRegression,
    ScatterClustering,
    Heatmap,
    CalendarHeat,
    Funnel,
    Map,
    Card,
    GroupCard,
    Table,
    Input,
    Button,
    Toggle,
    Slider,
    Dropdown,
    Terminal,
    Iframe,
    Image,
    Html,
}

/// Which [`WidgetBody`] variant a widget type carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyKind {
    Series,
    Gauge,
    Card,
    Group,
    Table,
    Control,
    Embed,
}

impl WidgetType {
    pub const ALL: [WidgetType; 50] = [
        WidgetType::BasicLine,
        WidgetType::SmoothLine,
        WidgetType::StepLine,
        WidgetType::BasicArea,
        WidgetType::StackedLine,
        WidgetType::StackedArea,
        WidgetType::MultiAxis,
        WidgetType::ConfidenceBand,
        WidgetType::LargeArea,
        WidgetType::Timeseries,
        WidgetType::DynamicLine,
        WidgetType::Bar,
        WidgetType::HorizontalBar,
        WidgetType::StackedBar,
        WidgetType::SortBar,
        WidgetType::SimpleEncode,
        WidgetType::FloatingBar,
        WidgetType::PolarBar,
        WidgetType::RadialBar,
        WidgetType::Pie,
        WidgetType::Donut,
        WidgetType::Radar,
        WidgetType::Polar,
        WidgetType::Gauge,
        WidgetType::Progress,
        WidgetType::Liquid,
        WidgetType::MultiGauge,
        WidgetType::Dashboard,
        WidgetType::Thermometer,
        WidgetType::Scatter,
        WidgetType::Bubble,
        WidgetType::ScatterMatrix,
        WidgetType::ScatterRegression,
        WidgetType::ScatterClustering,
        WidgetType::Heatmap,
        WidgetType::CalendarHeat,
        WidgetType::Funnel,
        WidgetType::Map,
        WidgetType::Card,
        WidgetType::GroupCard,
        WidgetType::Table,
        WidgetType::Input,
        WidgetType::Button,
        WidgetType::Toggle,
        WidgetType::Slider,
        WidgetType::Dropdown,
        WidgetType::Terminal,
        WidgetType::Iframe,
        WidgetType::Image,
        WidgetType::Html,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            WidgetType::BasicLine => "basicLine",
            WidgetType::SmoothLine => "smoothLine",
            WidgetType::StepLine => "stepLine",
            WidgetType::BasicArea => "basicArea",
            WidgetType::StackedLine => "stackedLine",
            WidgetType::StackedArea => "stackedArea",
            WidgetType::MultiAxis => "multiAxis",
            WidgetType::ConfidenceBand => "confidenceBand",
            WidgetType::LargeArea => "largeArea",
            WidgetType::Timeseries => "timeseries",
            WidgetType::DynamicLine => "dynamicLine",
            WidgetType::Bar => "bar",
            WidgetType::HorizontalBar => "horizontalBar",
            WidgetType::StackedBar => "stackedBar",
            WidgetType::SortBar => "sortBar",
            WidgetType::SimpleEncode => "simpleEncode",
            WidgetType::FloatingBar => "floatingBar",
            WidgetType::PolarBar => "polarBar",
            WidgetType::RadialBar => "radialBar",
            WidgetType::Pie => "pie",
            WidgetType::Donut => "donut",
            WidgetType::Radar => "radar",
            WidgetType::Polar => "polar",
            WidgetType::Gauge => "gauge",
            WidgetType::Progress => "progress",
            WidgetType::Liquid => "liquid",
            WidgetType::MultiGauge => "multiGauge",
            WidgetType::Dashboard => "dashboard",
            WidgetType::Thermometer => "thermometer",
            WidgetType::Scatter => "scatter",
            WidgetType::Bubble => "bubble",
            WidgetType::ScatterMatrix => "scatterMatrix",
            WidgetType::ScatterRegression => "scatterRegression",
            WidgetType::ScatterClustering => "scatterClustering",
            WidgetType::Heatmap => "heatmap",
            WidgetType::CalendarHeat => "calendarHeat",
            WidgetType::Funnel => "funnel",
            WidgetType::Map => "map",
            WidgetType::Card => "card",
            WidgetType::GroupCard => "groupCard",
            WidgetType::Table => "table",
            WidgetType::Input => "input",
            WidgetType::Button => "button",
            WidgetType::Toggle => "toggle",
            WidgetType::Slider => "slider",
            WidgetType::Dropdown => "dropdown",
            WidgetType::Terminal => "terminal",
            WidgetType::Iframe => "iframe",
            WidgetType::Image => "image",
            WidgetType::Html => "html",
        }
    }

    pub fn parse(name: &str) -> Option<Self> {
        Self::ALL.iter().copied().find(|t| t.as_str() == name)
    }

    /// Display title used when a widget has none of its own.
    pub fn title(&self) -> &'static str {
        match self {
            WidgetType::BasicLine => "Line Chart",
            WidgetType::SmoothLine => "Smooth Line",
            WidgetType::StepLine => "Step Line",
            WidgetType::BasicArea => "Area Chart",
            WidgetType::StackedLine => "Stacked Line",
            WidgetType::StackedArea => "Stacked Area",
            WidgetType::MultiAxis => "Multi Axis",
            WidgetType::ConfidenceBand => "Confidence Band",
            WidgetType::LargeArea => "Large Area",
            WidgetType::Timeseries => "Time Series",
            WidgetType::DynamicLine => "Dynamic Line",
            WidgetType::Bar => "Bar Chart",
            WidgetType::HorizontalBar => "Horizontal Bar",
            WidgetType::StackedBar => "Stacked Bar",
            WidgetType::SortBar => "Sorted Bar",
            WidgetType::SimpleEncode => "Dataset Bar",
            WidgetType::FloatingBar => "Floating Bar",
            WidgetType::PolarBar => "Polar Bar",
            WidgetType::RadialBar => "Radial Bar",
            WidgetType::Pie => "Pie Chart",
            WidgetType::Donut => "Donut Chart",
            WidgetType::Radar => "Radar Chart",
            WidgetType::Polar => "Polar Chart",
            WidgetType::Gauge => "Gauge",
            WidgetType::Progress => "Progress Gauge",
            WidgetType::Liquid => "Liquid Fill",
            WidgetType::MultiGauge => "Multi Gauge",
            WidgetType::Dashboard => "Dashboard",
            WidgetType::Thermometer => "Thermometer",
            WidgetType::Scatter => "Scatter Plot",
            WidgetType::Bubble => "Bubble Chart",
            WidgetType::ScatterMatrix => "Scatter Matrix",
            WidgetType::ScatterRegression => "Scatter Regression",
            WidgetType::ScatterClustering => "Scatter Clusters",
            WidgetType::Heatmap => "Heatmap",
            WidgetType::CalendarHeat => "Calendar Heat",
            WidgetType::Funnel => "Funnel Chart",
            WidgetType::Map => "Map Chart",
            WidgetType::Card => "Card",
            WidgetType::GroupCard => "Group Cards",
            WidgetType::Table => "Table",
            WidgetType::Input => "Input Field",
            WidgetType::Button => "Button",
            WidgetType::Toggle => "Toggle",
            WidgetType::Slider => "Slider",
            WidgetType::Dropdown => "Dropdown",
            WidgetType::Terminal => "Terminal",
            WidgetType::Iframe => "Webpage",
            WidgetType::Image => "Image",
            WidgetType::Html => "HTML",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            WidgetType::Card => "ph-activity",
            WidgetType::GroupCard => "ph-cube",
            WidgetType::Table => "ph-table",
            WidgetType::Gauge => "ph-gauge",
            WidgetType::Progress => "ph-progress-bar",
            WidgetType::Liquid => "ph-drop",
            WidgetType::MultiGauge => "ph-gauges",
            WidgetType::Thermometer => "ph-thermometer",
            WidgetType::Dashboard => "ph-speedometer",
            WidgetType::Pie => "ph-pie-chart",
            WidgetType::Donut => "ph-circle-dashed",
            WidgetType::Radar => "ph-target",
            WidgetType::Polar | WidgetType::Bubble => "ph-circle",
            WidgetType::BasicLine | WidgetType::SmoothLine => "ph-chart-line",
            WidgetType::StepLine => "ph-stairs",
            WidgetType::BasicArea => "ph-chart-line-up",
            WidgetType::Scatter => "ph-scatter-plot",
            WidgetType::Heatmap => "ph-fire",
            WidgetType::CalendarHeat => "ph-calendar",
            WidgetType::Funnel => "ph-funnel",
            WidgetType::Map => "ph-map-trifold",
            WidgetType::Input => "ph-chat-text",
            WidgetType::Button => "ph-button",
            WidgetType::Toggle => "ph-toggle-left",
            WidgetType::Slider => "ph-sliders",
            WidgetType::Dropdown => "ph-caret-down",
            WidgetType::Terminal => "ph-terminal-window",
            WidgetType::Iframe => "ph-browser",
            WidgetType::Image => "ph-image",
            WidgetType::Html => "ph-code",
            _ => FALLBACK_ICON,
        }
    }

    pub fn default_size(&self) -> Size {
        match self {
            WidgetType::Card
            | WidgetType::Button
            | WidgetType::Toggle
            | WidgetType::Slider
            | WidgetType::Dropdown => Size::new(2, 2),
            WidgetType::Input => Size::new(3, 2),
            WidgetType::GroupCard => Size::new(6, 3),
            WidgetType::Timeseries
            | WidgetType::Gauge
            | WidgetType::Progress
            | WidgetType::Liquid
            | WidgetType::Pie
            | WidgetType::Donut
            | WidgetType::Radar
            | WidgetType::Polar => Size::new(4, 4),
            WidgetType::Funnel | WidgetType::Map => Size::new(6, 5),
            WidgetType::LargeArea => Size::new(8, 5),
            _ => FALLBACK_SIZE,
        }
    }

    /// Smallest rect the grid may shrink this widget to.
    pub fn min_size(&self) -> Size {
        match self.body_kind() {
            BodyKind::Card | BodyKind::Control => Size::new(1, 1),
            _ => Size::new(2, 2),
        }
    }

    pub fn body_kind(&self) -> BodyKind {
        match self {
            WidgetType::Gauge
            | WidgetType::Progress
            | WidgetType::Liquid
            | WidgetType::MultiGauge
            | WidgetType::Dashboard
            | WidgetType::Thermometer => BodyKind::Gauge,
            WidgetType::Card => BodyKind::Card,
            WidgetType::GroupCard => BodyKind::Group,
            WidgetType::Table => BodyKind::Table,
            WidgetType::Input
            | WidgetType::Button
            | WidgetType::Toggle
            | WidgetType::Slider
            | WidgetType::Dropdown => BodyKind::Control,
            WidgetType::Terminal | WidgetType::Iframe | WidgetType::Image | WidgetType::Html => {
                BodyKind::Embed
            }
            _ => BodyKind::Series,
        }
    }

    /// Whether the widget drives a live-updating demo series.
    pub fn is_live(&self) -> bool {
        matches!(self, WidgetType::Timeseries)
    }

    /// Whether the widget is backed by a chart-library instance.
    pub fn is_chart(&self) -> bool {
        matches!(self.body_kind(), BodyKind::Series | BodyKind::Gauge)
    }

    pub fn default_body(&self) -> WidgetBody {
        match self {
            WidgetType::Card => WidgetBody::Card {
                value: Scalar::Number(42.0),
            },
            WidgetType::GroupCard => WidgetBody::Group {
                group_count: 2,
                items: vec![
                    GroupItem::new("A", Scalar::Number(12.0)),
                    GroupItem::new("B", Scalar::Number(34.0)),
                ],
            },
            WidgetType::Table => WidgetBody::Table {
                columns: vec!["Name".into(), "Value".into(), "Status".into()],
                rows: vec![
                    vec!["Item1".into(), "42".into(), "Active".into()],
                    vec!["Item2".into(), "67".into(), "Warning".into()],
                    vec!["Item3".into(), "23".into(), "Inactive".into()],
                ],
                header_colors: BTreeMap::from([
                    (0, "#4f46e5".to_string()),
                    (1, "#10b981".to_string()),
                    (2, "#ef4444".to_string()),
                ]),
            },
            WidgetType::Gauge | WidgetType::Thermometer => gauge(vec![65.0], 0.0, 100.0),
            WidgetType::Progress => gauge(vec![75.0], 0.0, 100.0),
            WidgetType::Liquid => gauge(vec![0.6], 0.0, 1.0),
            WidgetType::MultiGauge => gauge(vec![65.0, 80.0, 45.0], 0.0, 100.0),
            WidgetType::Dashboard => gauge(vec![85.0], 0.0, 100.0),
            WidgetType::Pie | WidgetType::Donut => series(&["A", "B", "C", "D"], &[40.0, 30.0, 20.0, 10.0]),
            WidgetType::Radar => series(
                &["Speed", "Power", "Durability", "Energy", "Accuracy"],
                &[80.0, 90.0, 70.0, 85.0, 75.0],
            ),
            WidgetType::Polar => series(&["A", "B", "C", "D", "E"], &[30.0, 40.0, 20.0, 50.0, 35.0]),
            WidgetType::Funnel => series(
                &["Step 1", "Step 2", "Step 3", "Step 4"],
                &[100.0, 70.0, 50.0, 20.0],
            ),
            WidgetType::Scatter
            | WidgetType::Bubble
            | WidgetType::Heatmap
            | WidgetType::CalendarHeat
            | WidgetType::Map => WidgetBody::Series {
                labels: Vec::new(),
                values: Vec::new(),
            },
            WidgetType::Input => WidgetBody::Control {
                value: Some(Scalar::Text(String::new())),
            },
            WidgetType::Toggle => WidgetBody::Control {
                value: Some(Scalar::Number(0.0)),
            },
            WidgetType::Slider => WidgetBody::Control {
                value: Some(Scalar::Number(50.0)),
            },
            WidgetType::Button | WidgetType::Dropdown => WidgetBody::Control { value: None },
            WidgetType::Terminal | WidgetType::Iframe | WidgetType::Image | WidgetType::Html => {
                WidgetBody::Embed
            }
            _ => series(
                &["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"],
                &[120.0, 200.0, 150.0, 80.0, 70.0, 110.0, 130.0],
            ),
        }
    }
}

fn gauge(values: Vec<f64>, min: f64, max: f64) -> WidgetBody {
    WidgetBody::Gauge {
        values,
        min: Some(min),
        max: Some(max),
    }
}

fn series(labels: &[&str], values: &[f64]) -> WidgetBody {
    WidgetBody::Series {
        labels: labels.iter().map(|l| l.to_string()).collect(),
        values: values.iter().map(|v| Scalar::Number(*v)).collect(),
    }
}
