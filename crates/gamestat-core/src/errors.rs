//! Error types for container reads.

use thiserror::Error;

use crate::container::BoxError;

/// Errors that can occur while resolving a key in a [`DataContainer`].
///
/// [`DataContainer`]: crate::DataContainer
#[derive(Debug, Error)]
pub enum ContainerError {
    /// A required key was not present in the container.
    #[error("key '{key}' is not present in this container")]
    Missing {
        /// Name of the missing key.
        key: &'static str,
    },

    /// A supplier returned an error on its first (and only) invocation.
    #[error("supplier for key '{key}' failed: {source}")]
    Supplier {
        /// Name of the key whose supplier failed.
        key: &'static str,
        /// The supplier's error.
        source: BoxError,
    },

    /// A key whose supplier already failed was read again.
    #[error("supplier for key '{key}' failed earlier: {message}")]
    SupplierFailed {
        /// Name of the key whose supplier failed.
        key: &'static str,
        /// Rendered message of the original failure.
        message: String,
    },

    /// A supplier (transitively) requested its own key.
    #[error("key '{key}' depends on itself")]
    Cycle {
        /// Name of the key that was re-entered.
        key: &'static str,
    },
}

impl ContainerError {
    /// Name of the key the error refers to.
    pub fn key(&self) -> &'static str {
        match self {
            Self::Missing { key }
            | Self::Supplier { key, .. }
            | Self::SupplierFailed { key, .. }
            | Self::Cycle { key } => key,
        }
    }
}

/// Convenience type alias for container results.
pub type Result<T> = std::result::Result<T, ContainerError>;

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_display() {
        let err = ContainerError::Missing { key: "sessions" };
        assert_eq!(
            err.to_string(),
            "key 'sessions' is not present in this container"
        );
    }

    #[test]
    fn supplier_display_includes_source() {
        let err = ContainerError::Supplier {
            key: "ping",
            source: "database is locked".into(),
        };
        assert_eq!(
            err.to_string(),
            "supplier for key 'ping' failed: database is locked"
        );
    }

    #[test]
    fn cycle_display() {
        let err = ContainerError::Cycle { key: "last_seen" };
        assert_eq!(err.to_string(), "key 'last_seen' depends on itself");
    }

    #[test]
    fn key_accessor() {
        let err = ContainerError::SupplierFailed {
            key: "tps",
            message: "boom".into(),
        };
        assert_eq!(err.key(), "tps");
    }

    #[test]
    fn converts_into_box_error() {
        fn lookup() -> std::result::Result<(), BoxError> {
            Err(ContainerError::Missing { key: "name" }.into())
        }
        let err = lookup().unwrap_err();
        assert!(err.to_string().contains("name"));
    }
}
