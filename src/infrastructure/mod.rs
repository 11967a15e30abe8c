// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod export_format;
pub mod file_store;
pub mod headless_grid;
pub mod logging;
pub mod memory_store;
pub mod stored;
