//! Deployment synthesis for the components of a QuayEcosystem
//!
//! Turns a validated `QuayEcosystemSpec` plus the names of externally created
//! Secrets and ConfigMaps into Deployment definitions for Redis, the config
//! app, Quay, Clair, and their PostgreSQL databases. Synthesis is pure: no
//! cluster I/O, and each call builds fresh output.
//!
//! # Usage
//!
//! ```rust,ignore
//! let deployments = DeploymentCompiler::new(name, namespace, &ecosystem.spec)
//!     .with_names(ResolvedNames::for_ecosystem(name))
//!     .compile_all()?;
//! for deployment in deployments.iter() {
//!     apply(serde_json::to_value(deployment)?).await?;
//! }
//! ```

pub mod defaults;
mod deployment;
pub mod env;
pub mod error;
pub mod k8s;
pub mod labels;
mod names;
pub mod probes;
pub mod resources;
pub mod storage;
pub mod volumes;

pub use defaults::{resolve, Unset};
pub use deployment::{
    DeploymentCompiler, GeneratedDeployments, CLAIR_CONTAINER_NAME, QUAY_CONFIG_CONTAINER_NAME,
    QUAY_CONTAINER_NAME,
};
pub use error::CompilationError;
pub use labels::ComponentKind;
pub use names::ResolvedNames;
pub use resources::Quantity;
