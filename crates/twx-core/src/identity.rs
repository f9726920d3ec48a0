//! # Identity Newtypes
//!
//! Newtype wrappers for the marketplace's identifiers. These prevent
//! accidental identifier confusion: an `ApplicationId` cannot be passed where
//! an `OpportunityId` is expected, and a host's `UserId` cannot be mistaken
//! for either.
//!
//! All three serialize transparently as UUID strings.

use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ValidationError;

/// Declares a UUID-backed identifier newtype with `new`, `as_uuid`,
/// `Display` (prefixed) and `FromStr` (bare UUID).
macro_rules! uuid_identifier {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generate a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Access the inner UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, concat!($prefix, ":{}"), self.0)
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s.trim())
                    .map(Self)
                    .map_err(|_| ValidationError::InvalidIdentifier {
                        kind: $prefix,
                        value: s.to_string(),
                    })
            }
        }
    };
}

uuid_identifier!(
    /// Unique identifier for a host's opportunity listing.
    OpportunityId,
    "opportunity"
);

uuid_identifier!(
    /// Unique identifier for a traveller's application to an opportunity.
    ApplicationId,
    "application"
);

uuid_identifier!(
    /// Unique identifier for an account (traveller, host, or admin).
    UserId,
    "user"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_identifiers_are_unique() {
        assert_ne!(OpportunityId::new(), OpportunityId::new());
        assert_ne!(UserId::new(), UserId::new());
    }

    #[test]
    fn display_carries_namespace_prefix() {
        let id = ApplicationId(Uuid::nil());
        assert_eq!(
            id.to_string(),
            "application:00000000-0000-0000-0000-000000000000"
        );
    }

    #[test]
    fn from_str_accepts_bare_uuid() {
        let id: OpportunityId = "6f1c7d52-3a1b-4c55-9a0e-2f0a8a7e4b11".parse().unwrap();
        assert_eq!(
            id.as_uuid().to_string(),
            "6f1c7d52-3a1b-4c55-9a0e-2f0a8a7e4b11"
        );
    }

    #[test]
    fn from_str_rejects_garbage() {
        let err = "not-a-uuid".parse::<UserId>().unwrap_err();
        assert_eq!(
            err,
            ValidationError::InvalidIdentifier {
                kind: "user",
                value: "not-a-uuid".to_string(),
            }
        );
    }

    #[test]
    fn serializes_as_plain_uuid_string() {
        let id = UserId(Uuid::nil());
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"00000000-0000-0000-0000-000000000000\"");
    }
}
