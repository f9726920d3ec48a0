//! # Workflow Status Trait
//!
//! The seam shared by [`OpportunityStatus`](crate::OpportunityStatus) and
//! [`ApplicationStatus`](crate::ApplicationStatus). Everything generic in this
//! crate (tables, catalog, history, menu) is written against this trait.

use std::fmt;
use std::hash::Hash;

use crate::workflow::Workflow;

/// A status enum that participates in a [`Workflow`].
pub trait WorkflowStatus:
    Copy + Eq + Hash + fmt::Debug + fmt::Display + Send + Sync + 'static
{
    /// Name of the entity kind this status belongs to (`"opportunity"`,
    /// `"application"`). Used in log fields and error messages.
    const KIND: &'static str;

    /// Every member of the enum, in lifecycle order.
    fn all() -> &'static [Self];

    /// The wire name of this status (`"PUBLISHED"`).
    fn as_str(&self) -> &'static str;

    /// Look up a status by wire name, ignoring ASCII case and surrounding
    /// whitespace. Returns `None` for unrecognized names.
    fn from_name(name: &str) -> Option<Self> {
        let name = name.trim();
        Self::all()
            .iter()
            .copied()
            .find(|s| s.as_str().eq_ignore_ascii_case(name))
    }

    /// The product's built-in workflow for this status kind.
    fn workflow() -> &'static Workflow<Self>;
}
