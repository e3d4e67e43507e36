//! Resource naming for QuayEcosystem components
//!
//! Every object the operator creates is named after the ecosystem, so two
//! ecosystems can share a namespace. The reconciler and the workload
//! compiler must agree on these names; both call into this module.

/// Name of the Redis Deployment
pub fn redis_resources_name(ecosystem: &str) -> String {
    format!("{}-redis", ecosystem)
}

/// Name of the Quay config app Deployment
pub fn quay_config_resources_name(ecosystem: &str) -> String {
    format!("{}-quay-config", ecosystem)
}

/// Name of the Quay Deployment
pub fn quay_resources_name(ecosystem: &str) -> String {
    format!("{}-quay", ecosystem)
}

/// Name of the Clair Deployment
pub fn clair_resources_name(ecosystem: &str) -> String {
    format!("{}-clair", ecosystem)
}

/// Name of the database backing Quay
pub fn quay_database_name(ecosystem: &str) -> String {
    format!("{}-quay-postgresql", ecosystem)
}

/// Name of the database backing Clair
pub fn clair_database_name(ecosystem: &str) -> String {
    format!("{}-clair-postgresql", ecosystem)
}

/// Secret holding Quay's `config.yaml` and SSL material
pub fn quay_config_secret_name(ecosystem: &str) -> String {
    format!("{}-quay-config-secret", ecosystem)
}

/// Secret holding the config app password
pub fn quay_config_password_secret_name(ecosystem: &str) -> String {
    format!("{}-quay-config-app-password", ecosystem)
}

/// TLS secret for Clair
pub fn clair_ssl_secret_name(ecosystem: &str) -> String {
    format!("{}-clair-ssl", ecosystem)
}

/// Secret holding the key Quay uses to sign scanner requests
pub fn security_scanner_secret_name(ecosystem: &str) -> String {
    format!("{}-quay-security-scanner", ecosystem)
}

/// ConfigMap holding Clair's `config.yaml`
pub fn clair_config_map_name(ecosystem: &str) -> String {
    format!("{}-clair-config", ecosystem)
}

/// PersistentVolumeClaim backing a local registry backend
pub fn registry_storage_claim_name(ecosystem: &str, backend: &str) -> String {
    format!("{}-registry-{}", ecosystem, backend)
}
