//! Common types for the Quay operator: CRDs, naming, errors, and telemetry

#![deny(missing_docs)]

pub mod crd;
pub mod error;
pub mod naming;
pub mod telemetry;

pub use error::Error;

/// Result type alias using our custom Error type
pub type Result<T> = std::result::Result<T, Error>;

// =============================================================================
// Labels
// =============================================================================

/// Label key identifying the operator that owns a resource
pub const LABEL_APP: &str = "app";

/// Label value for [`LABEL_APP`]
pub const LABEL_APP_VALUE: &str = "quay-operator";

/// Label key naming the QuayEcosystem a resource belongs to
pub const LABEL_ECOSYSTEM: &str = "quay-enterprise-cr";

/// Label key distinguishing the components of an ecosystem
pub const LABEL_COMPONENT: &str = "quay-enterprise-component";

// =============================================================================
// Ports
// =============================================================================

/// Redis listener port
pub const REDIS_PORT: u16 = 6379;

/// Quay plain HTTP port
pub const QUAY_HTTP_PORT: u16 = 8080;

/// Quay HTTPS port, also used by the config app
pub const QUAY_HTTPS_PORT: u16 = 8443;

/// Clair API port
pub const CLAIR_API_PORT: u16 = 6060;

/// Clair health port
pub const CLAIR_HEALTH_PORT: u16 = 6061;

/// PostgreSQL listener port
pub const POSTGRESQL_PORT: u16 = 5432;

// =============================================================================
// Default images
// =============================================================================

/// Quay image used when `spec.quay.image` is unset
pub const DEFAULT_QUAY_IMAGE: &str = "quay.io/redhat/quay:v3.1.0";

/// Redis image used when `spec.redis.image` is unset
pub const DEFAULT_REDIS_IMAGE: &str = "registry.access.redhat.com/rhscl/redis-32-rhel7:latest";

/// Clair image used when `spec.clair.image` is unset
pub const DEFAULT_CLAIR_IMAGE: &str = "quay.io/redhat/clair-jwt:v3.1.0";

/// PostgreSQL image used when a database image is unset
pub const DEFAULT_POSTGRESQL_IMAGE: &str =
    "registry.access.redhat.com/rhscl/postgresql-96-rhel7:1";

// =============================================================================
// Replicas
// =============================================================================

/// Replica fallback for Redis
pub const REDIS_REPLICAS: i32 = 1;

/// Replica fallback for Quay and Clair
pub const ONE_REPLICA: i32 = 1;

// =============================================================================
// Service accounts
// =============================================================================

/// Service account used by Redis pods
pub const REDIS_SERVICE_ACCOUNT: &str = "redis";

/// Service account used by Quay and Quay config pods
pub const QUAY_SERVICE_ACCOUNT: &str = "quay";

/// Service account used by Clair pods
pub const CLAIR_SERVICE_ACCOUNT: &str = "clair";

// =============================================================================
// Secret and ConfigMap keys
// =============================================================================

/// Key holding the config app password
pub const QUAY_CONFIG_PASSWORD_KEY: &str = "password";

/// Key of the Quay SSL certificate inside the config secret
pub const QUAY_SSL_CERTIFICATE_KEY: &str = "ssl.cert";

/// Key of the security scanner private key
pub const SECURITY_SCANNER_KEY: &str = "security_scanner.pem";

/// File name the Clair TLS private key is projected to
pub const CLAIR_SSL_PRIVATE_KEY: &str = "clair.key";

/// File name the Clair TLS certificate is projected to
pub const CLAIR_SSL_CERTIFICATE: &str = "clair.crt";

/// Key of the Clair configuration file inside its ConfigMap
pub const CLAIR_CONFIG_FILE_KEY: &str = "config.yaml";

/// Standard key of a TLS private key in a `kubernetes.io/tls` secret
pub const TLS_PRIVATE_KEY_KEY: &str = "tls.key";

/// Standard key of a TLS certificate in a `kubernetes.io/tls` secret
pub const TLS_CERT_KEY: &str = "tls.crt";

/// Key of the database user in a credentials secret
pub const DATABASE_USERNAME_KEY: &str = "database-username";

/// Key of the database password in a credentials secret
pub const DATABASE_PASSWORD_KEY: &str = "database-password";

/// Key of the database name in a credentials secret
pub const DATABASE_NAME_KEY: &str = "database-name";
