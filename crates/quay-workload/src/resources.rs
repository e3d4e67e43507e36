//! CPU and memory requirements
//!
//! Amounts are parsed into [`Quantity`] using the Kubernetes quantity grammar
//! (`<number><suffix>`, e.g. `500m`, `512Mi`, `1.5`, `2e3`). A value that does
//! not parse aborts synthesis of the workload; it is never replaced by a default.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::defaults::present;
use crate::error::CompilationError;
use crate::k8s::{ResourceList, ResourceRequirements};
use crate::labels::ComponentKind;

const BINARY_SI: [&str; 6] = ["Ki", "Mi", "Gi", "Ti", "Pi", "Ei"];
const DECIMAL_SI: [&str; 10] = ["n", "u", "m", "", "k", "M", "G", "T", "P", "E"];

// =============================================================================
// Quantity
// =============================================================================

/// Why a quantity string was rejected
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QuantityError {
    /// Nothing to parse
    #[error("quantity is empty")]
    Empty,
    /// The numeric part is malformed
    #[error("'{0}' is not a decimal number")]
    InvalidNumber(String),
    /// The suffix is not a known unit
    #[error("unknown suffix '{0}'")]
    InvalidSuffix(String),
}

/// Unit suffix of a quantity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Suffix {
    /// Power-of-two suffix (`Ki`, `Mi`, ...)
    BinarySi(&'static str),
    /// Power-of-ten suffix (`m`, `k`, `M`, ...), empty for plain numbers
    DecimalSi(&'static str),
    /// Scientific exponent (`e3`, `E-2`)
    DecimalExponent(i32),
}

impl fmt::Display for Suffix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BinarySi(s) | Self::DecimalSi(s) => f.write_str(s),
            Self::DecimalExponent(e) => write!(f, "e{}", e),
        }
    }
}

impl FromStr for Suffix {
    type Err = QuantityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if let Some(b) = BINARY_SI.iter().copied().find(|b| *b == s) {
            return Ok(Self::BinarySi(b));
        }
        if let Some(d) = DECIMAL_SI.iter().copied().find(|d| *d == s) {
            return Ok(Self::DecimalSi(d));
        }
        s.strip_prefix(['e', 'E'])
            .filter(|exp| exp.trim_start_matches(['+', '-']).chars().all(|c| c.is_ascii_digit()))
            .and_then(|exp| exp.parse::<i32>().ok())
            .map(Self::DecimalExponent)
            .ok_or_else(|| QuantityError::InvalidSuffix(s.to_string()))
    }
}

/// A parsed resource quantity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Quantity {
    number: String,
    suffix: Suffix,
}

impl Quantity {
    /// Numeric part, sign included
    pub fn number(&self) -> &str {
        &self.number
    }

    /// Unit suffix
    pub fn suffix(&self) -> Suffix {
        self.suffix
    }
}

impl FromStr for Quantity {
    type Err = QuantityError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.is_empty() {
            return Err(QuantityError::Empty);
        }

        let split = s
            .char_indices()
            .find(|&(i, c)| !(c.is_ascii_digit() || c == '.' || (i == 0 && (c == '+' || c == '-'))))
            .map_or(s.len(), |(i, _)| i);
        let (number, suffix) = s.split_at(split);

        let unsigned = number.trim_start_matches(['+', '-']);
        let valid_number = unsigned.matches('.').count() <= 1
            && unsigned.chars().any(|c| c.is_ascii_digit());
        if !valid_number {
            return Err(QuantityError::InvalidNumber(number.to_string()));
        }

        Ok(Self {
            number: number.to_string(),
            suffix: suffix.parse()?,
        })
    }
}

impl fmt::Display for Quantity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.number, self.suffix)
    }
}

impl TryFrom<String> for Quantity {
    type Error = QuantityError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Quantity> for String {
    fn from(q: Quantity) -> Self {
        q.to_string()
    }
}

// =============================================================================
// Requirements
// =============================================================================

fn parse_quantity(
    component: ComponentKind,
    resource: &'static str,
    value: &str,
) -> Result<Quantity, CompilationError> {
    value.parse().map_err(|e: QuantityError| {
        warn!(%component, resource, value, error = %e, "rejecting resource quantity");
        CompilationError::invalid_quantity(component, resource, value, e.to_string())
    })
}

/// Requests and limits for the given amounts.
///
/// Requests mirror limits exactly. Returns `None` when neither amount is set,
/// so the container carries no `resources` field at all.
pub fn database_resources(
    component: ComponentKind,
    cpu: Option<&str>,
    memory: Option<&str>,
) -> Result<Option<ResourceRequirements>, CompilationError> {
    let cpu = present(cpu)
        .map(|v| parse_quantity(component, "cpu", v))
        .transpose()?;
    let memory = present(memory)
        .map(|v| parse_quantity(component, "memory", v))
        .transpose()?;

    if cpu.is_none() && memory.is_none() {
        return Ok(None);
    }

    let list = ResourceList { cpu, memory };
    Ok(Some(ResourceRequirements {
        requests: Some(list.clone()),
        limits: Some(list),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    // =========================================================================
    // Story: Quantity grammar
    // =========================================================================

    #[test]
    fn parses_common_quantities() {
        for input in ["500m", "1", "0.5", "512Mi", "1Gi", "128974848", "129e6", "1E", "+2k"] {
            let q: Quantity = input.parse().unwrap_or_else(|e| panic!("{input}: {e}"));
            assert_eq!(q.to_string(), input);
        }
    }

    #[test]
    fn splits_number_and_suffix() {
        let q: Quantity = "1.5Gi".parse().expect("valid quantity");
        assert_eq!(q.number(), "1.5");
        assert_eq!(q.suffix(), Suffix::BinarySi("Gi"));

        let q: Quantity = "2E-3".parse().expect("valid quantity");
        assert_eq!(q.suffix(), Suffix::DecimalExponent(-3));
    }

    #[test]
    fn rejects_malformed_quantities() {
        assert_eq!("".parse::<Quantity>(), Err(QuantityError::Empty));
        assert!(matches!(
            "lots".parse::<Quantity>(),
            Err(QuantityError::InvalidNumber(_))
        ));
        assert!(matches!(
            "1.2.3".parse::<Quantity>(),
            Err(QuantityError::InvalidNumber(_))
        ));
        assert!(matches!(
            "512MB".parse::<Quantity>(),
            Err(QuantityError::InvalidSuffix(_))
        ));
        assert!(matches!(
            "-".parse::<Quantity>(),
            Err(QuantityError::InvalidNumber(_))
        ));
        assert!(matches!(
            "1e".parse::<Quantity>(),
            Err(QuantityError::InvalidSuffix(_))
        ));
    }

    #[test]
    fn serializes_as_plain_string() {
        let q: Quantity = "512Mi".parse().expect("valid quantity");
        assert_eq!(
            serde_json::to_value(&q).expect("serializes"),
            serde_json::json!("512Mi")
        );
        let back: Quantity = serde_json::from_str("\"500m\"").expect("deserializes");
        assert_eq!(back.suffix(), Suffix::DecimalSi("m"));
    }

    // =========================================================================
    // Story: Requirements only when something is set
    // =========================================================================

    #[test]
    fn nothing_set_means_no_requirements() {
        let reqs = database_resources(ComponentKind::QuayDatabase, None, None).expect("no error");
        assert!(reqs.is_none());

        let reqs = database_resources(ComponentKind::QuayDatabase, Some(""), Some("")).expect("no error");
        assert!(reqs.is_none());
    }

    #[test]
    fn requests_mirror_limits() {
        let reqs = database_resources(ComponentKind::QuayDatabase, Some("500m"), Some("512Mi"))
            .expect("valid quantities")
            .expect("requirements should be set");
        assert_eq!(reqs.requests, reqs.limits);
        let limits = reqs.limits.expect("limits");
        assert_eq!(limits.cpu.map(|q| q.to_string()).as_deref(), Some("500m"));
        assert_eq!(limits.memory.map(|q| q.to_string()).as_deref(), Some("512Mi"));
    }

    #[test]
    fn only_specified_dimensions_are_set() {
        let reqs = database_resources(ComponentKind::ClairDatabase, None, Some("1Gi"))
            .expect("valid quantity")
            .expect("requirements should be set");
        let requests = reqs.requests.expect("requests");
        assert!(requests.cpu.is_none());
        assert!(requests.memory.is_some());
    }

    #[test]
    fn malformed_quantity_is_an_error() {
        let err = database_resources(ComponentKind::QuayDatabase, Some("two cores"), None)
            .expect_err("malformed cpu must fail");
        match err {
            CompilationError::InvalidQuantity {
                component,
                resource,
                value,
                ..
            } => {
                assert_eq!(component, ComponentKind::QuayDatabase);
                assert_eq!(resource, "cpu");
                assert_eq!(value, "two cores");
            }
            other => panic!("expected invalid quantity, got {other:?}"),
        }
    }

    #[test]
    fn requirements_serialize_camel_case() {
        let reqs = database_resources(ComponentKind::QuayDatabase, Some("1"), None)
            .expect("valid")
            .expect("set");
        let json = serde_json::to_value(&reqs).expect("serializes");
        assert_eq!(
            json,
            serde_json::json!({"requests": {"cpu": "1"}, "limits": {"cpu": "1"}})
        );
    }
}
