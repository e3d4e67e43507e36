//! Custom Resource Definitions for the Quay operator

mod ecosystem;
mod storage;

pub use ecosystem::{
    ClairSpec, Database, QuayEcosystem, QuayEcosystemSpec, QuayEcosystemStatus, QuaySpec,
    RedisSpec,
};
pub use storage::{
    AzureRegistryBackendSource, GoogleCloudRegistryBackendSource, LocalRegistryBackendSource,
    RegistryBackend, RegistryBackendSource, RegistryStorage, S3RegistryBackendSource,
};
