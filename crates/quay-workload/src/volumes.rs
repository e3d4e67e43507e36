//! Volume and mount composition
//!
//! Volumes and their mounts are only ever added as a pair through
//! [`PodVolumes::with_volume`], which derives the mount name from the volume.
//! A pod spec assembled from a `PodVolumes` therefore has no mount without a
//! volume and no volume without a mount.

use quay_common::{
    CLAIR_CONFIG_FILE_KEY, CLAIR_SSL_CERTIFICATE, CLAIR_SSL_PRIVATE_KEY, QUAY_SSL_CERTIFICATE_KEY,
    SECURITY_SCANNER_KEY, TLS_CERT_KEY, TLS_PRIVATE_KEY_KEY,
};
use tracing::warn;

use crate::error::CompilationError;
use crate::k8s::{
    ConfigMapProjection, KeyToPath, SecretProjection, Volume, VolumeMount, VolumeProjection,
};
use crate::labels::ComponentKind;
use crate::names::ResolvedNames;

/// Name of the projected volume holding a component's configuration
pub const CONFIG_VOLUME_NAME: &str = "configvolume";

/// Where Quay and its config app read their configuration
pub const QUAY_CONFIG_MOUNT_PATH: &str = "/conf/stack";

/// Directory under the config mount holding extra trusted CAs
pub const EXTRA_CA_CERTS_DIR: &str = "extra_ca_certs";

/// Where Clair reads its configuration
pub const CLAIR_CONFIG_MOUNT_PATH: &str = "/clair/config";

/// Volume holding Quay's CA certificate for Clair to trust
pub const QUAY_SSL_VOLUME_NAME: &str = "quay-ssl";

/// File name of the Quay CA inside [`QUAY_SSL_VOLUME_NAME`]
pub const QUAY_CA_FILE: &str = "ca.crt";

/// Path of the Quay CA inside the Clair container's trust store
pub const CLAIR_TRUST_CA_PATH: &str = "/etc/pki/ca-trust/source/anchors/ca.crt";

/// Name of the database data volume
pub const DATABASE_VOLUME_NAME: &str = "data";

/// Where PostgreSQL keeps its data
pub const DATABASE_MOUNT_PATH: &str = "/var/lib/pgsql/data";

// =============================================================================
// Mount points
// =============================================================================

/// Where and how a volume appears inside the container
#[derive(Clone, Debug, PartialEq)]
pub struct MountPoint {
    /// Absolute path in the container
    pub mount_path: String,
    /// Single file or directory of the volume to mount
    pub sub_path: Option<String>,
    /// Read-only flag, left unset when `None`
    pub read_only: Option<bool>,
}

impl MountPoint {
    /// Mount the whole volume at `mount_path`
    pub fn at(mount_path: impl Into<String>) -> Self {
        Self {
            mount_path: mount_path.into(),
            sub_path: None,
            read_only: None,
        }
    }

    /// Mount a single entry of the volume
    pub fn with_sub_path(mut self, sub_path: impl Into<String>) -> Self {
        self.sub_path = Some(sub_path.into());
        self
    }

    /// Set the read-only flag explicitly
    pub fn with_read_only(mut self, read_only: bool) -> Self {
        self.read_only = Some(read_only);
        self
    }
}

// =============================================================================
// PodVolumes accumulator
// =============================================================================

/// Volumes of a pod together with the mounts of its single container
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PodVolumes {
    volumes: Vec<Volume>,
    mounts: Vec<VolumeMount>,
}

impl PodVolumes {
    /// No volumes
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `volume` and mount it at `mount`.
    ///
    /// A second volume with an already used name is dropped together with its
    /// mount, since Kubernetes would reject the duplicate.
    pub fn with_volume(mut self, volume: Volume, mount: MountPoint) -> Self {
        if self.contains(&volume.name) {
            warn!(volume = %volume.name, "duplicate volume name, skipping");
            return self;
        }
        self.mounts.push(VolumeMount {
            name: volume.name.clone(),
            mount_path: mount.mount_path,
            sub_path: mount.sub_path,
            read_only: mount.read_only,
        });
        self.volumes.push(volume);
        self
    }

    /// Whether a volume named `name` was added
    pub fn contains(&self, name: &str) -> bool {
        self.volumes.iter().any(|v| v.name == name)
    }

    /// Append every pair from `other`, failing on a volume name already in use
    pub fn try_merge(
        self,
        component: ComponentKind,
        other: PodVolumes,
    ) -> Result<Self, CompilationError> {
        other
            .volumes
            .into_iter()
            .zip(other.mounts)
            .try_fold(self, |mut acc, (volume, mount)| {
                if acc.contains(&volume.name) {
                    return Err(CompilationError::volume_conflict(component, &volume.name));
                }
                acc.mounts.push(mount);
                acc.volumes.push(volume);
                Ok(acc)
            })
    }

    /// Volumes added so far
    pub fn volumes(&self) -> &[Volume] {
        &self.volumes
    }

    /// Mounts added so far
    pub fn mounts(&self) -> &[VolumeMount] {
        &self.mounts
    }

    /// Whether nothing was added
    pub fn is_empty(&self) -> bool {
        self.volumes.is_empty()
    }

    /// Split into pod volumes and container mounts
    pub fn into_parts(self) -> (Vec<Volume>, Vec<VolumeMount>) {
        (self.volumes, self.mounts)
    }
}

// =============================================================================
// Projected config volume
// =============================================================================

/// Builder for a projected volume that merges several Secrets and ConfigMaps
#[derive(Clone, Debug, Default)]
pub struct ProjectedVolumeBuilder {
    sources: Vec<VolumeProjection>,
}

impl ProjectedVolumeBuilder {
    /// Start with no projections
    pub fn new() -> Self {
        Self::default()
    }

    /// Project every key of a Secret
    pub fn secret(self, name: impl Into<String>) -> Self {
        self.secret_items(name, Vec::new())
    }

    /// Project selected keys of a Secret
    pub fn secret_items(mut self, name: impl Into<String>, items: Vec<KeyToPath>) -> Self {
        self.sources.push(VolumeProjection {
            secret: Some(SecretProjection {
                name: name.into(),
                items,
            }),
            config_map: None,
        });
        self
    }

    /// Project selected keys of a ConfigMap
    pub fn config_map_items(mut self, name: impl Into<String>, items: Vec<KeyToPath>) -> Self {
        self.sources.push(VolumeProjection {
            secret: None,
            config_map: Some(ConfigMapProjection {
                name: name.into(),
                items,
            }),
        });
        self
    }

    /// Build the volume
    pub fn build(self, name: impl Into<String>) -> Volume {
        Volume::from_projected(name, self.sources)
    }
}

// =============================================================================
// Per-component volumes
// =============================================================================

/// Config volume of the config app: the config secret, writable
pub fn quay_config_volumes(names: &ResolvedNames) -> PodVolumes {
    let config = ProjectedVolumeBuilder::new()
        .secret(&names.config_secret)
        .build(CONFIG_VOLUME_NAME);

    PodVolumes::new().with_volume(
        config,
        MountPoint::at(QUAY_CONFIG_MOUNT_PATH).with_read_only(false),
    )
}

/// Config volume of Quay.
///
/// With Clair enabled, Clair's certificate is added to the same volume under
/// `extra_ca_certs/` so Quay trusts the scanner.
pub fn quay_volumes(names: &ResolvedNames, clair_enabled: bool) -> PodVolumes {
    let mut config = ProjectedVolumeBuilder::new().secret(&names.config_secret);

    if clair_enabled {
        config = config.secret_items(
            &names.clair_ssl_secret,
            vec![KeyToPath::new(
                TLS_CERT_KEY,
                format!("{}/clair.crt", EXTRA_CA_CERTS_DIR),
            )],
        );
    }

    PodVolumes::new().with_volume(
        config.build(CONFIG_VOLUME_NAME),
        MountPoint::at(QUAY_CONFIG_MOUNT_PATH).with_read_only(false),
    )
}

/// Clair's config volume plus the Quay CA it must trust
pub fn clair_volumes(names: &ResolvedNames) -> PodVolumes {
    let config = ProjectedVolumeBuilder::new()
        .secret_items(
            &names.security_scanner_secret,
            vec![KeyToPath::new(SECURITY_SCANNER_KEY, SECURITY_SCANNER_KEY)],
        )
        .secret_items(
            &names.clair_ssl_secret,
            vec![
                KeyToPath::new(TLS_PRIVATE_KEY_KEY, CLAIR_SSL_PRIVATE_KEY),
                KeyToPath::new(TLS_CERT_KEY, CLAIR_SSL_CERTIFICATE),
            ],
        )
        .config_map_items(
            &names.clair_config_map,
            vec![KeyToPath::new(CLAIR_CONFIG_FILE_KEY, CLAIR_CONFIG_FILE_KEY)],
        )
        .build(CONFIG_VOLUME_NAME);

    let quay_ssl = Volume::from_secret_items(
        QUAY_SSL_VOLUME_NAME,
        &names.config_secret,
        vec![KeyToPath::new(QUAY_SSL_CERTIFICATE_KEY, QUAY_CA_FILE)],
    );

    PodVolumes::new()
        .with_volume(config, MountPoint::at(CLAIR_CONFIG_MOUNT_PATH))
        .with_volume(
            quay_ssl,
            MountPoint::at(CLAIR_TRUST_CA_PATH).with_sub_path(QUAY_CA_FILE),
        )
}

/// PostgreSQL data volume, only when a volume size was requested
pub fn database_volumes(claim_name: &str, volume_size: Option<&str>) -> PodVolumes {
    match crate::defaults::present(volume_size) {
        Some(_) => PodVolumes::new().with_volume(
            Volume::from_pvc(DATABASE_VOLUME_NAME, claim_name),
            MountPoint::at(DATABASE_MOUNT_PATH),
        ),
        None => PodVolumes::new(),
    }
}
