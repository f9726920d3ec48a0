//! # Middleware
//!
//! Request counters. Tracing is `tower_http::trace::TraceLayer`, installed
//! in [`crate::app`].

pub mod metrics;
