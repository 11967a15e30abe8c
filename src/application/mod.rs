// Application layer - use cases and the seams external collaborators plug into
pub mod dashboard_service;
pub mod key_value_store;
pub mod persistence_gateway;
pub mod projector;
pub mod reconciler;
pub mod render;
pub mod session;
pub mod view_store;
pub mod widget_store;
