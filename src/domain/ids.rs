// Identifier newtypes for dashboards, widgets and views
use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Generate a fresh id that cannot collide with previously issued ones.
            pub fn generate() -> Self {
                Self(format!("{}_{}", $prefix, uuid::Uuid::new_v4().simple()))
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }
    };
}

define_id!(
    /// Unique per dashboard.
    WidgetId,
    "w"
);
define_id!(
    /// Unique per dashboard.
    ViewId,
    "view"
);
define_id!(DashboardId, "dash");

/// Opaque per-dashboard identifier used for external addressing.
pub fn generate_panel_id() -> String {
    let random = uuid::Uuid::new_v4().simple().to_string();
    format!(
        "panel_{}_{}",
        &random[..9],
        chrono::Utc::now().timestamp_millis()
    )
}
