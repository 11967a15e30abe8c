// Presentation layer - view-models consumed by the GUI
pub mod view_models;
