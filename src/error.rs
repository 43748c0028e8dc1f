//! Error types for collector registration.

use std::error::Error;
use std::fmt::{self, Display, Formatter};

/// Result type for registration operations.
pub type RegistrationResult<T> = Result<T, RegistrationError>;

/// Error raised while registering circuit series with a metrics registry.
///
/// Recording never fails; registration is the only fallible step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    /// A series with this fully qualified name is already registered.
    Duplicate {
        /// The conflicting metric name, including namespace.
        name: String,
    },

    /// The configured namespace is not a valid Prometheus name prefix.
    InvalidNamespace {
        /// The rejected namespace.
        namespace: String,
    },
}

impl RegistrationError {
    /// Returns true if this error reports a duplicate registration.
    pub fn is_duplicate(&self) -> bool {
        matches!(self, RegistrationError::Duplicate { .. })
    }
}

impl Display for RegistrationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            RegistrationError::Duplicate { name } => {
                write!(f, "Metric already registered: {}", name)
            }
            RegistrationError::InvalidNamespace { namespace } => {
                write!(f, "Invalid metric namespace: {:?}", namespace)
            }
        }
    }
}

impl Error for RegistrationError {}

/// Checks that `namespace` can prefix a Prometheus metric name.
#[cfg_attr(not(feature = "prometheus"), allow(dead_code))]
pub(crate) fn validate_namespace(namespace: &str) -> RegistrationResult<()> {
    let mut chars = namespace.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_' || first == ':')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == ':')
        }
        None => false,
    };

    if valid {
        Ok(())
    } else {
        Err(RegistrationError::InvalidNamespace {
            namespace: namespace.to_string(),
        })
    }
}
