//! DeploymentCompiler: assembles one Deployment per ecosystem component
//!
//! Every compile method follows the same pipeline: resolve scalars through
//! [`resolve`], build component metadata, compose volumes, env, probes, and
//! resources into a single-container pod spec, then wrap it with a selector
//! and template that share the metadata's labels.

use quay_common::crd::{Database, QuayEcosystemSpec};
use quay_common::{
    CLAIR_API_PORT, CLAIR_HEALTH_PORT, CLAIR_SERVICE_ACCOUNT, DEFAULT_CLAIR_IMAGE,
    DEFAULT_POSTGRESQL_IMAGE, DEFAULT_QUAY_IMAGE, DEFAULT_REDIS_IMAGE, ONE_REPLICA,
    POSTGRESQL_PORT, QUAY_HTTPS_PORT, QUAY_HTTP_PORT, QUAY_SERVICE_ACCOUNT, REDIS_PORT,
    REDIS_REPLICAS, REDIS_SERVICE_ACCOUNT,
};
use tracing::debug;

use crate::defaults::{present, resolve};
use crate::env;
use crate::error::CompilationError;
use crate::k8s::{
    Container, ContainerPort, Deployment, DeploymentSpec, LabelSelector, LocalObjectReference,
    ObjectMeta, PodMeta, PodSpec, PodTemplateSpec,
};
use crate::labels::ComponentKind;
use crate::names::ResolvedNames;
use crate::probes;
use crate::resources::database_resources;
use crate::storage::registry_backend_volumes;
use crate::volumes::{self, PodVolumes};

/// Container name of the config app
pub const QUAY_CONFIG_CONTAINER_NAME: &str = "quay-enterprise-config-app";

/// Container name of the Quay application
pub const QUAY_CONTAINER_NAME: &str = "quay-enterprise-app";

/// Container name of Clair
pub const CLAIR_CONTAINER_NAME: &str = "clair";

const DEPLOYMENT_API_VERSION: &str = "apps/v1";

/// Every Deployment synthesized for an ecosystem
#[derive(Clone, Debug, PartialEq)]
pub struct GeneratedDeployments {
    /// Redis, when configured
    pub redis: Option<Deployment>,
    /// Config app, unless disabled
    pub quay_config: Option<Deployment>,
    /// Quay itself
    pub quay: Deployment,
    /// Clair, when enabled
    pub clair: Option<Deployment>,
    /// Quay's database, when declared
    pub quay_database: Option<Deployment>,
    /// Clair's database, when Clair is enabled and declares one
    pub clair_database: Option<Deployment>,
}

impl GeneratedDeployments {
    /// All Deployments in apply order: databases and cache before their consumers
    pub fn iter(&self) -> impl Iterator<Item = &Deployment> {
        [
            self.quay_database.as_ref(),
            self.clair_database.as_ref(),
            self.redis.as_ref(),
            self.quay_config.as_ref(),
            Some(&self.quay),
            self.clair.as_ref(),
        ]
        .into_iter()
        .flatten()
    }

    /// Number of Deployments
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// Always false, Quay is always present
    pub fn is_empty(&self) -> bool {
        false
    }

    /// Consume into a list in apply order
    pub fn into_vec(self) -> Vec<Deployment> {
        [
            self.quay_database,
            self.clair_database,
            self.redis,
            self.quay_config,
            Some(self.quay),
            self.clair,
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

/// Synthesizes Deployments for the components of one QuayEcosystem.
///
/// ```rust,ignore
/// let deployments = DeploymentCompiler::new("registry", "quay-enterprise", &eco.spec)
///     .with_names(ResolvedNames::for_ecosystem("registry"))
///     .compile_all()?;
/// ```
pub struct DeploymentCompiler<'a> {
    ecosystem: &'a str,
    namespace: &'a str,
    spec: &'a QuayEcosystemSpec,
    names: ResolvedNames,
}

impl<'a> DeploymentCompiler<'a> {
    /// Create a compiler using the conventional secret and ConfigMap names
    pub fn new(ecosystem: &'a str, namespace: &'a str, spec: &'a QuayEcosystemSpec) -> Self {
        Self {
            ecosystem,
            namespace,
            spec,
            names: ResolvedNames::for_ecosystem(ecosystem),
        }
    }

    /// Use externally resolved secret and ConfigMap names
    pub fn with_names(mut self, names: ResolvedNames) -> Self {
        self.names = names;
        self
    }

    /// Compile every Deployment the ecosystem calls for
    pub fn compile_all(&self) -> Result<GeneratedDeployments, CompilationError> {
        let clair_enabled = self.spec.clair_enabled();

        let redis = self
            .spec
            .redis
            .is_some()
            .then(|| self.compile_redis())
            .transpose()?;

        let quay_config = self.spec.config_enabled().then(|| self.compile_quay_config());

        let quay_database = self
            .spec
            .quay
            .database
            .as_ref()
            .map(|db| self.compile_database(ComponentKind::QuayDatabase, db))
            .transpose()?;

        let (clair, clair_database) = match self.spec.clair.as_ref().filter(|_| clair_enabled) {
            Some(clair) => (
                Some(self.compile_clair()?),
                clair
                    .database
                    .as_ref()
                    .map(|db| self.compile_database(ComponentKind::ClairDatabase, db))
                    .transpose()?,
            ),
            None => (None, None),
        };

        Ok(GeneratedDeployments {
            redis,
            quay_config,
            quay: self.compile_quay()?,
            clair,
            quay_database,
            clair_database,
        })
    }

    /// Redis cache: no probes, unnamed port, container named after the Deployment
    pub fn compile_redis(&self) -> Result<Deployment, CompilationError> {
        let redis = self
            .spec
            .redis
            .as_ref()
            .ok_or_else(|| CompilationError::missing_component(ComponentKind::Redis))?;

        let meta = ComponentKind::Redis.metadata(self.ecosystem, self.namespace);
        let container = Container {
            name: meta.name.clone(),
            image: resolve(redis.image.as_deref(), DEFAULT_REDIS_IMAGE).to_string(),
            ports: vec![ContainerPort::new(REDIS_PORT)],
            ..Default::default()
        };

        let pod_spec = pod_spec(
            ComponentKind::Redis,
            container,
            PodVolumes::new(),
            Some(REDIS_SERVICE_ACCOUNT),
            redis.image_pull_secret_name.as_deref(),
        );

        Ok(assemble(
            meta,
            Some(resolve(redis.replicas, REDIS_REPLICAS)),
            pod_spec,
        ))
    }

    /// Config app used to bootstrap Quay's configuration.
    ///
    /// Shares Quay's image and pull secret and leaves the replica count unset.
    pub fn compile_quay_config(&self) -> Deployment {
        let quay = &self.spec.quay;
        let meta = ComponentKind::QuayConfig.metadata(self.ecosystem, self.namespace);

        let container = Container {
            name: QUAY_CONFIG_CONTAINER_NAME.to_string(),
            image: resolve(quay.image.as_deref(), DEFAULT_QUAY_IMAGE).to_string(),
            env: env::quay_config(&self.names),
            ports: quay_ports(),
            ..Default::default()
        };

        let pod_spec = pod_spec(
            ComponentKind::QuayConfig,
            container,
            volumes::quay_config_volumes(&self.names),
            Some(QUAY_SERVICE_ACCOUNT),
            quay.image_pull_secret_name.as_deref(),
        );

        assemble(meta, None, pod_spec)
    }

    /// The Quay registry application
    pub fn compile_quay(&self) -> Result<Deployment, CompilationError> {
        let quay = &self.spec.quay;
        let meta = ComponentKind::Quay.metadata(self.ecosystem, self.namespace);

        let container = Container {
            name: QUAY_CONTAINER_NAME.to_string(),
            image: resolve(quay.image.as_deref(), DEFAULT_QUAY_IMAGE).to_string(),
            env: env::quay(),
            ports: quay_ports(),
            ..Default::default()
        };

        let backends = registry_backend_volumes(
            self.ecosystem,
            &quay.registry_backends,
            quay.registry_storage.is_some(),
        )?;
        let volumes = volumes::quay_volumes(&self.names, self.spec.clair_enabled())
            .try_merge(ComponentKind::Quay, backends)?;

        let pod_spec = pod_spec(
            ComponentKind::Quay,
            container,
            volumes,
            Some(QUAY_SERVICE_ACCOUNT),
            quay.image_pull_secret_name.as_deref(),
        );

        Ok(assemble(meta, Some(resolve(quay.replicas, ONE_REPLICA)), pod_spec))
    }

    /// Clair security scanner
    pub fn compile_clair(&self) -> Result<Deployment, CompilationError> {
        let clair = self
            .spec
            .clair
            .as_ref()
            .ok_or_else(|| CompilationError::missing_component(ComponentKind::Clair))?;

        let meta = ComponentKind::Clair.metadata(self.ecosystem, self.namespace);
        let container = Container {
            name: CLAIR_CONTAINER_NAME.to_string(),
            image: resolve(clair.image.as_deref(), DEFAULT_CLAIR_IMAGE).to_string(),
            ports: vec![
                ContainerPort::named("clair-api", CLAIR_API_PORT),
                ContainerPort::named("clair-health", CLAIR_HEALTH_PORT),
            ],
            ..Default::default()
        };

        let pod_spec = pod_spec(
            ComponentKind::Clair,
            container,
            volumes::clair_volumes(&self.names),
            Some(CLAIR_SERVICE_ACCOUNT),
            clair.image_pull_secret_name.as_deref(),
        );

        Ok(assemble(
            meta,
            Some(resolve(clair.replicas, ONE_REPLICA)),
            pod_spec,
        ))
    }

    /// PostgreSQL for Quay or Clair.
    ///
    /// `component` must be one of the database kinds. Replicas are passed
    /// through without a fallback, and a malformed CPU or memory amount fails
    /// the whole Deployment.
    pub fn compile_database(
        &self,
        component: ComponentKind,
        database: &Database,
    ) -> Result<Deployment, CompilationError> {
        let meta = component.metadata(self.ecosystem, self.namespace);
        let credentials = resolve(database.credentials_secret_name.as_deref(), meta.name.as_str());

        let container = Container {
            name: meta.name.clone(),
            image: resolve(database.image.as_deref(), DEFAULT_POSTGRESQL_IMAGE).to_string(),
            env: env::database(credentials),
            ports: vec![ContainerPort::new(POSTGRESQL_PORT)],
            resources: database_resources(
                component,
                database.cpu.as_deref(),
                database.memory.as_deref(),
            )?,
            ..Default::default()
        };

        let pod_spec = pod_spec(
            component,
            container,
            volumes::database_volumes(&meta.name, database.volume_size.as_deref()),
            None,
            database.image_pull_secret_name.as_deref(),
        );

        Ok(assemble(meta, database.replicas, pod_spec))
    }
}

fn quay_ports() -> Vec<ContainerPort> {
    vec![
        ContainerPort::named("http", QUAY_HTTP_PORT),
        ContainerPort::named("https", QUAY_HTTPS_PORT),
    ]
}

/// A single-entry list when a pull secret is named, otherwise absent
fn image_pull_secrets(name: Option<&str>) -> Option<Vec<LocalObjectReference>> {
    present(name).map(|name| {
        vec![LocalObjectReference {
            name: name.to_string(),
        }]
    })
}

/// Attach probes and volumes to `container` and wrap it in a pod spec
fn pod_spec(
    component: ComponentKind,
    mut container: Container,
    volumes: PodVolumes,
    service_account: Option<&str>,
    pull_secret: Option<&str>,
) -> PodSpec {
    if let Some(pair) = probes::for_component(component) {
        container.readiness_probe = Some(pair.readiness);
        container.liveness_probe = Some(pair.liveness);
    }

    let (volumes, mounts) = volumes.into_parts();
    container.volume_mounts = mounts;

    PodSpec {
        service_account_name: service_account.map(str::to_string),
        containers: vec![container],
        volumes,
        image_pull_secrets: image_pull_secrets(pull_secret),
    }
}

/// Wrap a pod spec into a Deployment whose selector and template labels are
/// both taken from `meta`
fn assemble(meta: ObjectMeta, replicas: Option<i32>, spec: PodSpec) -> Deployment {
    debug!(
        workload = %meta.name,
        replicas = ?replicas,
        volumes = spec.volumes.len(),
        "synthesized deployment"
    );

    let labels = meta.labels.clone();
    Deployment {
        api_version: DEPLOYMENT_API_VERSION.to_string(),
        kind: "Deployment".to_string(),
        spec: DeploymentSpec {
            replicas,
            selector: LabelSelector {
                match_labels: labels.clone(),
            },
            template: PodTemplateSpec {
                metadata: PodMeta { labels },
                spec,
            },
        },
        metadata: meta,
    }
}
