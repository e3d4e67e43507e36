//! QuayEcosystem CRD types
//!
//! Defines `QuayEcosystem`, the desired state of a complete registry
//! installation: Quay itself, its config app, Redis, an optional Clair
//! scanner, and the PostgreSQL databases backing Quay and Clair.

use kube::CustomResource;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::storage::{RegistryBackend, RegistryStorage};
use crate::Error;

// =============================================================================
// Components
// =============================================================================

/// Desired state of the Quay application and its config app
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuaySpec {
    /// Quay image reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Number of Quay replicas (defaults to 1)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,

    /// Pull secret for the Quay image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_pull_secret_name: Option<String>,

    /// Deploy the config app alongside Quay (defaults to true)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config_enabled: Option<bool>,

    /// Named storage targets for registry content
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub registry_backends: Vec<RegistryBackend>,

    /// Persistent storage for local backends; ephemeral when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub registry_storage: Option<RegistryStorage>,

    /// Database backing Quay
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<Database>,
}

/// Desired state of the Redis cache
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RedisSpec {
    /// Redis image reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Number of Redis replicas (defaults to 1)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,

    /// Pull secret for the Redis image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_pull_secret_name: Option<String>,
}

/// Desired state of the Clair security scanner
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ClairSpec {
    /// Deploy Clair and wire Quay to trust it
    #[serde(default)]
    pub enabled: bool,

    /// Clair image reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Number of Clair replicas (defaults to 1)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,

    /// Pull secret for the Clair image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_pull_secret_name: Option<String>,

    /// Database backing Clair
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub database: Option<Database>,
}

/// Desired state of a PostgreSQL database
///
/// `replicas` has no fallback: an unset value is passed
/// through to the Deployment as-is.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Database {
    /// PostgreSQL image reference
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,

    /// Secret holding user, password, and database name (defaults to the workload name)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials_secret_name: Option<String>,

    /// Size of the data volume; no persistent volume when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_size: Option<String>,

    /// CPU limit and request (e.g., "500m")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cpu: Option<String>,

    /// Memory limit and request (e.g., "512Mi")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,

    /// Number of database replicas
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicas: Option<i32>,

    /// Pull secret for the database image
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_pull_secret_name: Option<String>,
}

// =============================================================================
// CRD
// =============================================================================

/// Desired state of a complete Quay registry installation
#[derive(CustomResource, Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[kube(
    group = "redhatcop.redhat.io",
    version = "v1alpha1",
    kind = "QuayEcosystem",
    plural = "quayecosystems",
    shortname = "qe",
    namespaced,
    status = "QuayEcosystemStatus",
    printcolumn = r#"{"name":"Age","type":"date","jsonPath":".metadata.creationTimestamp"}"#
)]
#[serde(rename_all = "camelCase")]
pub struct QuayEcosystemSpec {
    /// Quay application settings
    #[serde(default)]
    pub quay: QuaySpec,

    /// Redis cache settings; a Redis Deployment is only produced when present
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redis: Option<RedisSpec>,

    /// Clair scanner settings
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clair: Option<ClairSpec>,
}

/// Observed state, written by the reconciler
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct QuayEcosystemStatus {
    /// Human readable state of the ecosystem
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Hostname Quay is reachable at
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hostname: Option<String>,
}

impl QuayEcosystemSpec {
    /// Whether the Clair scanner is deployed
    pub fn clair_enabled(&self) -> bool {
        self.clair.as_ref().is_some_and(|c| c.enabled)
    }

    /// Whether the config app is deployed
    pub fn config_enabled(&self) -> bool {
        self.quay.config_enabled.unwrap_or(true)
    }
}

impl QuayEcosystem {
    /// Parse a QuayEcosystem from a YAML manifest
    pub fn from_yaml(input: &str) -> crate::Result<Self> {
        serde_yaml::from_str(input)
            .map_err(|e| Error::serialization_for("QuayEcosystem", e.to_string()))
    }

    /// Name of the ecosystem, required for every derived resource name
    pub fn ecosystem_name(&self) -> crate::Result<&str> {
        self.metadata
            .name
            .as_deref()
            .filter(|n| !n.is_empty())
            .ok_or_else(|| {
                Error::validation_for_field(
                    crate::error::UNKNOWN_CONTEXT,
                    "metadata.name",
                    "QuayEcosystem has no name",
                )
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
apiVersion: redhatcop.redhat.io/v1alpha1
kind: QuayEcosystem
metadata:
  name: registry
  namespace: quay-enterprise
spec:
  quay:
    registryBackends:
      - name: local1
        registryBackendSource:
          local:
            storagePath: /datastorage
"#;

    #[test]
    fn parses_minimal_manifest() {
        let eco = QuayEcosystem::from_yaml(MINIMAL).expect("minimal manifest should parse");
        assert_eq!(eco.ecosystem_name().expect("named"), "registry");
        assert_eq!(eco.spec.quay.registry_backends.len(), 1);
        assert!(eco.spec.redis.is_none());
        assert!(!eco.spec.clair_enabled());
        assert!(eco.spec.config_enabled());
    }

    #[test]
    fn clair_disabled_when_present_but_not_enabled() {
        let spec = QuayEcosystemSpec {
            clair: Some(ClairSpec::default()),
            ..Default::default()
        };
        assert!(!spec.clair_enabled());
    }

    #[test]
    fn clair_enabled_flag() {
        let spec = QuayEcosystemSpec {
            clair: Some(ClairSpec {
                enabled: true,
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(spec.clair_enabled());
    }

    #[test]
    fn config_app_can_be_disabled() {
        let spec = QuayEcosystemSpec {
            quay: QuaySpec {
                config_enabled: Some(false),
                ..Default::default()
            },
            ..Default::default()
        };
        assert!(!spec.config_enabled());
    }

    #[test]
    fn unnamed_ecosystem_is_a_validation_error() {
        let eco = QuayEcosystem::new("", QuayEcosystemSpec::default());
        let err = eco.ecosystem_name().expect_err("empty name should be rejected");
        assert!(matches!(err, Error::Validation { .. }));
    }

    #[test]
    fn malformed_manifest_is_a_serialization_error() {
        let err = QuayEcosystem::from_yaml("spec: [").expect_err("broken yaml should fail");
        assert!(matches!(err, Error::Serialization { .. }));
    }

    #[test]
    fn database_replicas_survive_round_trip_unset() {
        let db: Database =
            serde_json::from_str(r#"{"volumeSize":"10Gi"}"#).expect("valid database json");
        assert_eq!(db.replicas, None);
        assert_eq!(db.volume_size.as_deref(), Some("10Gi"));
    }
}
