//! Error types for the Quay operator
//!
//! Errors carry the ecosystem they concern so log lines and status messages
//! point at the right custom resource.

use thiserror::Error;

/// Default context value when no specific ecosystem is known
pub const UNKNOWN_CONTEXT: &str = "unknown";

/// Main error type for operator-level operations
#[derive(Debug, Error)]
pub enum Error {
    /// Validation error for a QuayEcosystem spec
    #[error("validation error for {ecosystem}: {message}")]
    Validation {
        /// Name of the ecosystem with invalid configuration
        ecosystem: String,
        /// Description of what's invalid
        message: String,
        /// The invalid field path (e.g., "spec.quay.registryBackends")
        field: Option<String>,
    },

    /// Serialization/deserialization error
    #[error("serialization error: {message}")]
    Serialization {
        /// Description of what failed
        message: String,
        /// The resource kind being serialized (if known)
        kind: Option<String>,
    },
}

impl Error {
    /// Create a validation error for an ecosystem field
    pub fn validation_for_field(
        ecosystem: impl Into<String>,
        field: impl Into<String>,
        msg: impl Into<String>,
    ) -> Self {
        Self::Validation {
            ecosystem: ecosystem.into(),
            message: msg.into(),
            field: Some(field.into()),
        }
    }

    /// Create a serialization error for a specific resource kind
    pub fn serialization_for(kind: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Serialization {
            message: msg.into(),
            kind: Some(kind.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_names_the_ecosystem() {
        let err = Error::validation_for_field(UNKNOWN_CONTEXT, "metadata.name", "name is empty");
        assert_eq!(err.to_string(), "validation error for unknown: name is empty");
    }

    #[test]
    fn validation_for_field_keeps_field_path() {
        let err = Error::validation_for_field(
            "registry",
            "spec.quay.registryBackends[0].name",
            "backend name is empty",
        );
        match err {
            Error::Validation {
                ecosystem, field, ..
            } => {
                assert_eq!(ecosystem, "registry");
                assert_eq!(field.as_deref(), Some("spec.quay.registryBackends[0].name"));
            }
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn serialization_for_records_kind() {
        let err = Error::serialization_for("QuayEcosystem", "unexpected field");
        assert_eq!(err.to_string(), "serialization error: unexpected field");
        match err {
            Error::Serialization { kind, .. } => assert_eq!(kind.as_deref(), Some("QuayEcosystem")),
            other => panic!("expected serialization error, got {other:?}"),
        }
    }
}
