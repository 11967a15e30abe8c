// Domain layer - Dashboards, widgets, views and grid geometry
pub mod catalog;
pub mod dashboard;
pub mod ids;
pub mod layout;
pub mod view;
pub mod widget;
