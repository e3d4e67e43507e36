//! Workload synthesis errors

use crate::labels::ComponentKind;

/// Errors that can occur while synthesizing Deployments
#[derive(Debug, thiserror::Error)]
pub enum CompilationError {
    /// A CPU or memory amount is not a valid resource quantity
    #[error("invalid {resource} quantity '{value}' for {component}: {reason}")]
    InvalidQuantity {
        /// Component whose spec holds the value
        component: ComponentKind,
        /// "cpu" or "memory"
        resource: &'static str,
        /// The rejected value
        value: String,
        /// What is wrong with it
        reason: String,
    },

    /// Two volumes of one pod would share a name, e.g. a registry backend
    /// named like a built-in volume or two backends with the same name
    #[error("volume name '{volume}' is used more than once in {component}")]
    VolumeConflict {
        /// Component whose pod holds the volumes
        component: ComponentKind,
        /// The contested volume name
        volume: String,
    },

    /// A component was requested that the ecosystem does not declare
    #[error("{component} is not configured for this ecosystem")]
    MissingComponent {
        /// The requested component
        component: ComponentKind,
    },
}

impl CompilationError {
    /// Create an invalid quantity error
    pub fn invalid_quantity(
        component: ComponentKind,
        resource: &'static str,
        value: &str,
        reason: impl Into<String>,
    ) -> Self {
        Self::InvalidQuantity {
            component,
            resource,
            value: value.to_string(),
            reason: reason.into(),
        }
    }

    /// Create a volume conflict error
    pub fn volume_conflict(component: ComponentKind, volume: &str) -> Self {
        Self::VolumeConflict {
            component,
            volume: volume.to_string(),
        }
    }

    /// Create a missing component error
    pub fn missing_component(component: ComponentKind) -> Self {
        Self::MissingComponent { component }
    }
}
