//! Pod storage for Quay's registry backends
//!
//! Only local backends are backed by pod volumes. Remote backends (S3, Azure,
//! GCS) are configured inside Quay and need nothing from the pod spec, and
//! sources of an unknown or empty kind are skipped the same way.

use quay_common::crd::RegistryBackend;
use quay_common::naming;
use tracing::{debug, warn};

use crate::error::CompilationError;
use crate::k8s::Volume;
use crate::labels::ComponentKind;
use crate::volumes::{MountPoint, PodVolumes};

/// Volumes for every local registry backend.
///
/// Each local backend gets a volume named after the backend, mounted at its
/// storage path. With `persistent` set the volume references the backend's
/// PersistentVolumeClaim; otherwise it is an emptyDir. Two local backends
/// with the same name are rejected.
pub fn registry_backend_volumes(
    ecosystem: &str,
    backends: &[RegistryBackend],
    persistent: bool,
) -> Result<PodVolumes, CompilationError> {
    backends
        .iter()
        .try_fold(PodVolumes::new(), |volumes, backend| {
            let Some(storage_path) = backend.local_storage_path() else {
                debug!(
                    backend = %backend.name,
                    kind = backend.registry_backend_source.kind(),
                    "registry backend needs no pod storage"
                );
                return Ok(volumes);
            };

            if volumes.contains(&backend.name) {
                warn!(backend = %backend.name, "duplicate local registry backend");
                return Err(CompilationError::volume_conflict(
                    ComponentKind::Quay,
                    &backend.name,
                ));
            }

            let volume = if persistent {
                Volume::from_pvc(
                    &backend.name,
                    naming::registry_storage_claim_name(ecosystem, &backend.name),
                )
            } else {
                Volume::from_empty_dir(&backend.name)
            };

            Ok(volumes.with_volume(volume, MountPoint::at(storage_path).with_read_only(false)))
        })
}
