//! # Validation Errors
//!
//! Boundary parsing errors for the primitives in this crate, built with
//! `thiserror`. Each variant carries the offending input so operators can
//! diagnose a rejected request without reproducing it.

use thiserror::Error;

/// Validation errors for domain primitives parsed at the system boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Role name is not one of the four known permission classes.
    #[error("unknown role: \"{0}\" (expected USER, HOST, ADMIN or SUPER_ADMIN)")]
    UnknownRole(String),

    /// Identifier is not a valid UUID.
    #[error("invalid {kind} identifier: \"{value}\"")]
    InvalidIdentifier {
        /// Which identifier namespace was being parsed.
        kind: &'static str,
        /// The string that failed to parse.
        value: String,
    },

    /// Timestamp string is not valid RFC 3339.
    #[error("invalid timestamp: \"{value}\" ({reason})")]
    InvalidTimestamp {
        /// The string that failed to parse.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_role_display_names_input() {
        let err = ValidationError::UnknownRole("guest".to_string());
        assert!(err.to_string().contains("guest"));
        assert!(err.to_string().contains("SUPER_ADMIN"));
    }

    #[test]
    fn invalid_identifier_display() {
        let err = ValidationError::InvalidIdentifier {
            kind: "opportunity",
            value: "abc".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("opportunity"));
        assert!(msg.contains("abc"));
    }
}
