//! Registry storage types
//!
//! A Quay deployment stores image layers in one or more named registry
//! backends. Only local backends need pod storage; remote backends are
//! realized entirely through Quay's own configuration.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A named storage target for registry content
#[derive(Clone, Debug, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RegistryBackend {
    /// Backend name, unique within the ecosystem
    pub name: String,

    /// Where the backend keeps its data
    #[serde(default)]
    pub registry_backend_source: RegistryBackendSource,

    /// Replicate content into this backend from others
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replicate_by_default: Option<bool>,
}

impl RegistryBackend {
    /// Create a backend backed by a local path inside the Quay pod
    pub fn local(name: impl Into<String>, storage_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            registry_backend_source: RegistryBackendSource {
                local: Some(LocalRegistryBackendSource {
                    storage_path: storage_path.into(),
                }),
                ..Default::default()
            },
            replicate_by_default: None,
        }
    }

    /// Storage path when this is a local backend with a non-empty path
    pub fn local_storage_path(&self) -> Option<&str> {
        self.registry_backend_source
            .local
            .as_ref()
            .map(|local| local.storage_path.as_str())
            .filter(|path| !path.is_empty())
    }
}

/// Storage source of a registry backend.
///
/// At most one field is expected to be set. Keys for storage kinds this
/// operator does not know are accepted and ignored, so such backends (and
/// empty sources) simply get no pod storage.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RegistryBackendSource {
    /// Filesystem path inside the Quay container
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub local: Option<LocalRegistryBackendSource>,
    /// Amazon S3 or compatible bucket
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub s3: Option<S3RegistryBackendSource>,
    /// Azure blob container
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azure: Option<AzureRegistryBackendSource>,
    /// Google Cloud Storage bucket
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub google_cloud: Option<GoogleCloudRegistryBackendSource>,
}

impl RegistryBackendSource {
    /// Short name of the configured source, used in logs
    pub fn kind(&self) -> &'static str {
        if self.local.is_some() {
            "local"
        } else if self.s3.is_some() {
            "s3"
        } else if self.azure.is_some() {
            "azure"
        } else if self.google_cloud.is_some() {
            "googleCloud"
        } else {
            "unknown"
        }
    }
}

/// Local filesystem backend
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct LocalRegistryBackendSource {
    /// Path inside the Quay container where content is stored
    #[serde(default)]
    pub storage_path: String,
}

/// S3 backend
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct S3RegistryBackendSource {
    /// Bucket name
    pub bucket_name: String,
    /// Path prefix inside the bucket
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_path: Option<String>,
    /// Custom endpoint for S3-compatible services
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub host: Option<String>,
    /// Secret holding access and secret keys
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials_secret_name: Option<String>,
}

/// Azure backend
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AzureRegistryBackendSource {
    /// Blob container name
    pub container_name: String,
    /// Path prefix inside the container
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_path: Option<String>,
    /// Secret holding the account name and key
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials_secret_name: Option<String>,
}

/// Google Cloud Storage backend
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct GoogleCloudRegistryBackendSource {
    /// Bucket name
    pub bucket_name: String,
    /// Path prefix inside the bucket
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub storage_path: Option<String>,
    /// Secret holding the HMAC access and secret keys
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials_secret_name: Option<String>,
}

/// Persistent storage for local registry backends.
///
/// When present, local backends are mounted from PersistentVolumeClaims;
/// when absent they use ephemeral emptyDir volumes.
#[derive(Clone, Debug, Default, Deserialize, Serialize, JsonSchema, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RegistryStorage {
    /// Requested claim size (e.g., "50Gi")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persistent_volume_size: Option<String>,
    /// Claim access modes
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub persistent_volume_access_modes: Vec<String>,
    /// Storage class for the claims
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub persistent_volume_storage_class_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(yaml: &str) -> RegistryBackend {
        serde_yaml::from_str(yaml).expect("valid backend yaml")
    }

    #[test]
    fn local_backend_exposes_storage_path() {
        let backend = RegistryBackend::local("local1", "/datastorage");
        assert_eq!(backend.local_storage_path(), Some("/datastorage"));
        assert_eq!(backend.registry_backend_source.kind(), "local");
    }

    #[test]
    fn remote_backend_has_no_storage_path() {
        let backend = RegistryBackend {
            name: "s3".to_string(),
            registry_backend_source: RegistryBackendSource {
                s3: Some(S3RegistryBackendSource {
                    bucket_name: "layers".to_string(),
                    ..Default::default()
                }),
                ..Default::default()
            },
            replicate_by_default: None,
        };
        assert_eq!(backend.local_storage_path(), None);
        assert_eq!(backend.registry_backend_source.kind(), "s3");
    }

    // =========================================================================
    // Story: Manifests use the map form of the source
    // =========================================================================

    #[test]
    fn local_source_parses_from_map() {
        let backend = parse(
            r#"
name: local1
registryBackendSource:
  local:
    storagePath: /datastorage
"#,
        );
        assert_eq!(backend, RegistryBackend::local("local1", "/datastorage"));
    }

    #[test]
    fn google_cloud_source_uses_camel_case_key() {
        let backend = parse(
            r#"
name: gcs
registryBackendSource:
  googleCloud:
    bucketName: layers
"#,
        );
        assert_eq!(backend.registry_backend_source.kind(), "googleCloud");
        assert_eq!(backend.local_storage_path(), None);
    }

    // =========================================================================
    // Story: Unknown and empty sources parse and carry no local path
    // =========================================================================

    #[test]
    fn unknown_source_kind_is_accepted() {
        let backend = parse(
            r#"
name: swift
registryBackendSource:
  swift:
    authURL: https://keystone.example.com
"#,
        );
        assert_eq!(backend.registry_backend_source, RegistryBackendSource::default());
        assert_eq!(backend.registry_backend_source.kind(), "unknown");
        assert_eq!(backend.local_storage_path(), None);
    }

    #[test]
    fn empty_and_missing_sources_have_no_path() {
        let empty = parse("name: empty\nregistryBackendSource: {}\n");
        assert_eq!(empty.local_storage_path(), None);

        let missing = parse("name: missing\n");
        assert_eq!(missing.registry_backend_source.kind(), "unknown");
        assert_eq!(missing.local_storage_path(), None);
    }

    #[test]
    fn local_source_without_path_has_no_path() {
        let backend = parse("name: blank\nregistryBackendSource:\n  local: {}\n");
        assert_eq!(backend.registry_backend_source.kind(), "local");
        assert_eq!(backend.local_storage_path(), None);
    }
}
