// Error kinds surfaced by the workspace core
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum DashboardError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{kind} not found: {id}")]
    NotFound { kind: &'static str, id: String },

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),

    #[error("Persistence error: {0}")]
    Persistence(String),

    #[error("Import format error: {0}")]
    ImportFormat(String),

    #[error("Render adapter error: {0}")]
    RenderAdapter(String),
}

impl DashboardError {
    pub fn widget_not_found(id: impl ToString) -> Self {
        Self::NotFound {
            kind: "widget",
            id: id.to_string(),
        }
    }

    pub fn view_not_found(id: impl ToString) -> Self {
        Self::NotFound {
            kind: "view",
            id: id.to_string(),
        }
    }

    pub fn dashboard_not_found(id: impl ToString) -> Self {
        Self::NotFound {
            kind: "dashboard",
            id: id.to_string(),
        }
    }

    /// Whether the error should block the requested mutation and be shown to
    /// the user, as opposed to being logged and degraded.
    pub fn is_user_facing(&self) -> bool {
        matches!(
            self,
            DashboardError::Validation(_)
                | DashboardError::NotFound { .. }
                | DashboardError::InvariantViolation(_)
                | DashboardError::ImportFormat(_)
        )
    }
}

/// Failure reported by an external render collaborator (grid engine, chart
/// library, timers, resize watchers).
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{operation} failed: {message}")]
pub struct RenderAdapterError {
    pub operation: &'static str,
    pub message: String,
}

impl RenderAdapterError {
    pub fn new(operation: &'static str, message: impl Into<String>) -> Self {
        Self {
            operation,
            message: message.into(),
        }
    }
}

impl From<RenderAdapterError> for DashboardError {
    fn from(err: RenderAdapterError) -> Self {
        DashboardError::RenderAdapter(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, DashboardError>;
