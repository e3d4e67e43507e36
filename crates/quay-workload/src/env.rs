//! Environment variables per component
//!
//! Values come from three places: literals, keys of Secrets created by the
//! reconciler, and the downward API (for the namespace, so the container
//! always sees the namespace it actually runs in).

use quay_common::{
    DATABASE_NAME_KEY, DATABASE_PASSWORD_KEY, DATABASE_USERNAME_KEY, QUAY_CONFIG_PASSWORD_KEY,
};

use crate::k8s::EnvVar;
use crate::names::ResolvedNames;
use crate::volumes::{EXTRA_CA_CERTS_DIR, QUAY_CONFIG_MOUNT_PATH};

/// Selects the Quay image's entrypoint mode
pub const QUAY_ENTRY: &str = "QUAYENTRY";

/// Entrypoint mode of the config app
pub const QUAY_ENTRY_CONFIG: &str = "config";

/// Password protecting the config app
pub const CONFIG_APP_PASSWORD: &str = "CONFIG_APP_PASSWORD";

/// Namespace Quay runs in, used to find its own secrets
pub const QE_K8S_NAMESPACE: &str = "QE_K8S_NAMESPACE";

/// Directory Quay loads extra trusted certificates from
pub const QUAY_EXTRA_CERTS_DIR: &str = "QUAY_EXTRA_CERTS_DIR";

/// Downward API path of the pod namespace
pub const NAMESPACE_FIELD_PATH: &str = "metadata.namespace";

/// `QE_K8S_NAMESPACE` from the downward API
pub fn namespace() -> EnvVar {
    EnvVar::from_field(QE_K8S_NAMESPACE, NAMESPACE_FIELD_PATH)
}

/// Config app: entrypoint marker, password secret, namespace
pub fn quay_config(names: &ResolvedNames) -> Vec<EnvVar> {
    vec![
        EnvVar::literal(QUAY_ENTRY, QUAY_ENTRY_CONFIG),
        EnvVar::from_secret(
            CONFIG_APP_PASSWORD,
            &names.config_password_secret,
            QUAY_CONFIG_PASSWORD_KEY,
        ),
        namespace(),
    ]
}

/// Quay: namespace and the extra CA directory inside the config mount
pub fn quay() -> Vec<EnvVar> {
    vec![
        namespace(),
        EnvVar::literal(
            QUAY_EXTRA_CERTS_DIR,
            format!("{}/{}", QUAY_CONFIG_MOUNT_PATH, EXTRA_CA_CERTS_DIR),
        ),
    ]
}

/// PostgreSQL: user, password, and database name, all from the credentials secret
pub fn database(credentials_secret: &str) -> Vec<EnvVar> {
    vec![
        EnvVar::from_secret("POSTGRESQL_USER", credentials_secret, DATABASE_USERNAME_KEY),
        EnvVar::from_secret(
            "POSTGRESQL_PASSWORD",
            credentials_secret,
            DATABASE_PASSWORD_KEY,
        ),
        EnvVar::from_secret("POSTGRESQL_DATABASE", credentials_secret, DATABASE_NAME_KEY),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_app_env_mixes_literal_secret_and_field() {
        let env = quay_config(&ResolvedNames::for_ecosystem("registry"));
        assert_eq!(env.len(), 3);

        assert_eq!(env[0].name, "QUAYENTRY");
        assert_eq!(env[0].value.as_deref(), Some("config"));

        let secret = env[1]
            .value_from
            .as_ref()
            .and_then(|v| v.secret_key_ref.as_ref())
            .expect("password should come from a secret");
        assert_eq!(secret.name, "registry-quay-config-app-password");
        assert_eq!(secret.key, "password");

        let field = env[2]
            .value_from
            .as_ref()
            .and_then(|v| v.field_ref.as_ref())
            .expect("namespace should come from the downward API");
        assert_eq!(field.field_path, "metadata.namespace");
        assert!(env[2].value.is_none());
    }

    #[test]
    fn quay_env_points_at_extra_ca_dir() {
        let env = quay();
        assert_eq!(env[0].name, "QE_K8S_NAMESPACE");
        assert_eq!(env[1].value.as_deref(), Some("/conf/stack/extra_ca_certs"));
    }

    #[test]
    fn database_env_is_secret_sourced() {
        let env = database("registry-quay-postgresql");
        let keys: Vec<_> = env
            .iter()
            .map(|e| {
                let sel = e
                    .value_from
                    .as_ref()
                    .and_then(|v| v.secret_key_ref.as_ref())
                    .expect("secret sourced");
                assert_eq!(sel.name, "registry-quay-postgresql");
                sel.key.as_str()
            })
            .collect();
        assert_eq!(keys, vec!["database-username", "database-password", "database-name"]);
    }
}
