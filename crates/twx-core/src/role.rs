//! # Caller Roles
//!
//! The acting user's permission class. Roles gate which status actions are
//! *offered* to a caller; the server re-checks them on every transition
//! request, so a role check here is never the only line of defence.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Permission class of the acting user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    /// A traveller. Applies to opportunities.
    User,
    /// A host. Publishes and manages opportunities, reviews applications.
    Host,
    /// A moderator. Reviews and rejects listings.
    Admin,
    /// Full administrative access.
    SuperAdmin,
}

impl Role {
    /// Returns all roles in declaration order.
    pub fn all() -> &'static [Role] {
        &[Self::User, Self::Host, Self::Admin, Self::SuperAdmin]
    }

    /// Returns the wire name of this role.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Host => "HOST",
            Self::Admin => "ADMIN",
            Self::SuperAdmin => "SUPER_ADMIN",
        }
    }

    /// Whether this role is one of the two administrative classes.
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin | Self::SuperAdmin)
    }

    /// Whether this role is a host.
    pub fn is_host(&self) -> bool {
        matches!(self, Self::Host)
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    /// Parse a role from its wire name. Lower-case input is accepted so that
    /// CLI flags and bearer tokens can be typed naturally.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USER" => Ok(Self::User),
            "HOST" => Ok(Self::Host),
            "ADMIN" => Ok(Self::Admin),
            "SUPER_ADMIN" => Ok(Self::SuperAdmin),
            _ => Err(ValidationError::UnknownRole(s.to_string())),
        }
    }
}
