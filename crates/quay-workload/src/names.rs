//! Names of Secrets and ConfigMaps created outside this crate
//!
//! The reconciler generates secret material before asking for workloads.
//! Synthesis only needs to know what those objects are called.

use quay_common::naming;

/// Secret and ConfigMap names referenced by the synthesized pods
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedNames {
    /// Secret holding Quay's configuration bundle and SSL certificate
    pub config_secret: String,
    /// Secret holding the config app password
    pub config_password_secret: String,
    /// TLS secret of the Clair service
    pub clair_ssl_secret: String,
    /// Secret holding Quay's security scanner key
    pub security_scanner_secret: String,
    /// ConfigMap holding Clair's configuration
    pub clair_config_map: String,
}

impl ResolvedNames {
    /// The conventional names for an ecosystem
    pub fn for_ecosystem(ecosystem: &str) -> Self {
        Self {
            config_secret: naming::quay_config_secret_name(ecosystem),
            config_password_secret: naming::quay_config_password_secret_name(ecosystem),
            clair_ssl_secret: naming::clair_ssl_secret_name(ecosystem),
            security_scanner_secret: naming::security_scanner_secret_name(ecosystem),
            clair_config_map: naming::clair_config_map_name(ecosystem),
        }
    }

    /// Override the config secret name
    pub fn with_config_secret(mut self, name: impl Into<String>) -> Self {
        self.config_secret = name.into();
        self
    }

    /// Override the config app password secret name
    pub fn with_config_password_secret(mut self, name: impl Into<String>) -> Self {
        self.config_password_secret = name.into();
        self
    }
}
