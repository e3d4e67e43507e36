//! Component kinds, resource names, and labels
//!
//! Labels applied here end up in three places: the Deployment metadata, its
//! selector, and the pod template. The assembler copies them from the same
//! map, which is what keeps the selector matching its own pods.

use std::fmt;

use quay_common::{naming, LABEL_APP, LABEL_APP_VALUE, LABEL_COMPONENT, LABEL_ECOSYSTEM};

use crate::k8s::ObjectMeta;

/// The workloads that make up a QuayEcosystem
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// Redis cache
    Redis,
    /// One-shot config app used to bootstrap Quay's configuration
    QuayConfig,
    /// The registry application
    Quay,
    /// Clair security scanner
    Clair,
    /// PostgreSQL backing Quay
    QuayDatabase,
    /// PostgreSQL backing Clair
    ClairDatabase,
}

impl ComponentKind {
    /// Value of the `quay-enterprise-component` label
    pub fn label_value(&self) -> &'static str {
        match self {
            Self::Redis => "redis",
            Self::QuayConfig => "config",
            Self::Quay => "app",
            Self::Clair => "clair",
            Self::QuayDatabase => "quay-database",
            Self::ClairDatabase => "clair-database",
        }
    }

    /// Name of this component's Deployment
    pub fn resource_name(&self, ecosystem: &str) -> String {
        match self {
            Self::Redis => naming::redis_resources_name(ecosystem),
            Self::QuayConfig => naming::quay_config_resources_name(ecosystem),
            Self::Quay => naming::quay_resources_name(ecosystem),
            Self::Clair => naming::clair_resources_name(ecosystem),
            Self::QuayDatabase => naming::quay_database_name(ecosystem),
            Self::ClairDatabase => naming::clair_database_name(ecosystem),
        }
    }

    /// Name this component and add its label to `meta`
    pub fn apply(&self, meta: &mut ObjectMeta, ecosystem: &str) {
        meta.name = self.resource_name(ecosystem);
        meta.labels
            .insert(LABEL_COMPONENT.to_string(), self.label_value().to_string());
    }

    /// Metadata for this component: ecosystem labels plus the component label
    pub fn metadata(&self, ecosystem: &str, namespace: &str) -> ObjectMeta {
        let mut meta = base_metadata(ecosystem, namespace);
        self.apply(&mut meta, ecosystem);
        meta
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label_value())
    }
}

/// Metadata shared by every resource of an ecosystem
pub fn base_metadata(ecosystem: &str, namespace: &str) -> ObjectMeta {
    ObjectMeta::new(ecosystem, namespace)
        .with_label(LABEL_APP, LABEL_APP_VALUE)
        .with_label(LABEL_ECOSYSTEM, ecosystem)
}
