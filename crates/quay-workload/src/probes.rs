//! Health checks for each component
//!
//! Each component has exactly one health protocol. This module only declares
//! how it is checked and the thresholds; acting on failures is the kubelet's job.

use quay_common::{CLAIR_HEALTH_PORT, POSTGRESQL_PORT, QUAY_HTTPS_PORT};

use crate::k8s::{ExecAction, HttpGetAction, ProbeSpec, TcpSocketAction};
use crate::labels::ComponentKind;

/// Quay's instance health endpoint
pub const QUAY_HEALTH_PATH: &str = "/health/instance";

/// Clair's health endpoint
pub const CLAIR_HEALTH_PATH: &str = "/health";

/// Command the PostgreSQL image ships for container checks
pub const POSTGRESQL_CHECK_COMMAND: [&str; 2] = ["/usr/libexec/check-container", "--live"];

const READINESS_INITIAL_DELAY: i32 = 10;
const LIVENESS_INITIAL_DELAY: i32 = 30;
const FAILURE_THRESHOLD: i32 = 3;
const DATABASE_INITIAL_DELAY: i32 = 5;
const DATABASE_TIMEOUT: i32 = 1;

/// Readiness and liveness probes for one container
#[derive(Clone, Debug, PartialEq)]
pub struct ProbePair {
    /// Gates traffic to the pod
    pub readiness: ProbeSpec,
    /// Restarts the container when failing
    pub liveness: ProbeSpec,
}

/// TCP connect check
pub fn tcp_socket(port: u16) -> ProbeSpec {
    ProbeSpec {
        tcp_socket: Some(TcpSocketAction { port }),
        ..Default::default()
    }
}

/// HTTP GET check with the given scheme
pub fn http_get(path: &str, port: u16, scheme: &str) -> ProbeSpec {
    ProbeSpec {
        http_get: Some(HttpGetAction {
            path: path.to_string(),
            port,
            scheme: Some(scheme.to_string()),
        }),
        ..Default::default()
    }
}

/// Command execution check
pub fn exec(command: &[&str]) -> ProbeSpec {
    ProbeSpec {
        exec: Some(ExecAction {
            command: command.iter().map(|c| c.to_string()).collect(),
        }),
        ..Default::default()
    }
}

impl ProbeSpec {
    /// Set the delay before the first check
    pub fn with_initial_delay(mut self, seconds: i32) -> Self {
        self.initial_delay_seconds = Some(seconds);
        self
    }

    /// Set the number of failures tolerated
    pub fn with_failure_threshold(mut self, failures: i32) -> Self {
        self.failure_threshold = Some(failures);
        self
    }

    /// Set the per-check timeout
    pub fn with_timeout(mut self, seconds: i32) -> Self {
        self.timeout_seconds = Some(seconds);
        self
    }
}

/// Readiness after 10s and liveness after 30s, both tolerating 3 failures
fn standard_pair(check: ProbeSpec) -> ProbePair {
    ProbePair {
        readiness: check
            .clone()
            .with_initial_delay(READINESS_INITIAL_DELAY)
            .with_failure_threshold(FAILURE_THRESHOLD),
        liveness: check
            .with_initial_delay(LIVENESS_INITIAL_DELAY)
            .with_failure_threshold(FAILURE_THRESHOLD),
    }
}

/// Probes for a component, or `None` when it is not health checked
pub fn for_component(kind: ComponentKind) -> Option<ProbePair> {
    match kind {
        ComponentKind::Redis => None,
        ComponentKind::QuayConfig => Some(standard_pair(tcp_socket(QUAY_HTTPS_PORT))),
        ComponentKind::Quay => Some(standard_pair(http_get(
            QUAY_HEALTH_PATH,
            QUAY_HTTPS_PORT,
            "HTTPS",
        ))),
        ComponentKind::Clair => Some(standard_pair(http_get(
            CLAIR_HEALTH_PATH,
            CLAIR_HEALTH_PORT,
            "HTTP",
        ))),
        // Readiness runs the image's exec check while liveness only connects.
        ComponentKind::QuayDatabase | ComponentKind::ClairDatabase => Some(ProbePair {
            readiness: exec(&POSTGRESQL_CHECK_COMMAND)
                .with_initial_delay(DATABASE_INITIAL_DELAY)
                .with_timeout(DATABASE_TIMEOUT),
            liveness: tcp_socket(POSTGRESQL_PORT)
                .with_initial_delay(DATABASE_INITIAL_DELAY)
                .with_timeout(DATABASE_TIMEOUT),
        }),
    }
}
