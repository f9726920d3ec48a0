//! # twx-core: Foundational Types for the Work-Exchange Workflow
//!
//! The leaf of the workspace dependency graph. Every other `twx-*` crate
//! depends on it; it depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Newtype identifiers.** `OpportunityId`, `ApplicationId` and `UserId`
//!    are distinct types over `Uuid`. An applicant ID cannot be passed where
//!    an opportunity ID is expected.
//!
//! 2. **One `Role` enum.** The four permission classes (`USER`, `HOST`,
//!    `ADMIN`, `SUPER_ADMIN`) are defined once and matched exhaustively.
//!
//! 3. **UTC-only timestamps.** [`Timestamp`] keeps millisecond precision so
//!    that history entries written within the same second still order
//!    correctly.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `twx-*` crates.
//! - No `unsafe` code.
//! - No `.unwrap()` outside tests.

pub mod error;
pub mod identity;
pub mod role;
pub mod temporal;

pub use error::ValidationError;
pub use identity::{ApplicationId, OpportunityId, UserId};
pub use role::Role;
pub use temporal::Timestamp;
