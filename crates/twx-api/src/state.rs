//! # Application State
//!
//! Shared state for the Axum application, passed to all route handlers
//! via the `State` extractor.
//!
//! Opportunities and applications live in in-memory stores. Every status
//! change goes through [`Store::try_update`], which holds one write lock
//! across read, validate, and update, so two concurrent transitions on the
//! same record are applied one after the other and the second is checked
//! against the first's result.

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::Arc;

use parking_lot::RwLock;
use twx_core::{ApplicationId, OpportunityId};
use twx_state::{Application, Opportunity};

// -- Generic In-Memory Store --------------------------------------------------

/// Thread-safe, cloneable in-memory key-value store.
///
/// The lock is `parking_lot`, never held across `.await`, and does not
/// poison on panic.
#[derive(Debug)]
pub struct Store<K, T> {
    data: Arc<RwLock<HashMap<K, T>>>,
}

impl<K, T> Clone for Store<K, T> {
    fn clone(&self) -> Self {
        Self {
            data: Arc::clone(&self.data),
        }
    }
}

impl<K, T> Store<K, T>
where
    K: Eq + Hash + Copy,
    T: Clone,
{
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Insert a record, returning the previous value if the key existed.
    pub fn insert(&self, id: K, value: T) -> Option<T> {
        self.data.write().insert(id, value)
    }

    /// Retrieve a record by ID.
    pub fn get(&self, id: &K) -> Option<T> {
        self.data.read().get(id).cloned()
    }

    /// Atomically read-validate-update a record.
    ///
    /// The closure runs under the write lock. Returns `None` if the record
    /// doesn't exist, otherwise the closure's result.
    pub fn try_update<R, E>(
        &self,
        id: &K,
        f: impl FnOnce(&mut T) -> Result<R, E>,
    ) -> Option<Result<R, E>> {
        self.data.write().get_mut(id).map(f)
    }

    /// Return the number of records.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Whether the store is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl<K, T> Default for Store<K, T>
where
    K: Eq + Hash + Copy,
    T: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

// -- Configuration ------------------------------------------------------------

/// Server configuration read from the environment at startup.
///
/// Custom `Debug` redacts the token.
#[derive(Clone)]
pub struct AppConfig {
    /// Port to bind the HTTP server to.
    pub port: u16,
    /// Shared secret for bearer tokens. `None` disables authentication.
    pub auth_token: Option<String>,
}

impl AppConfig {
    /// Read `PORT` (default 8080) and `AUTH_TOKEN` (optional).
    pub fn from_env() -> Self {
        let port = std::env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(8080);
        let auth_token = std::env::var("AUTH_TOKEN")
            .ok()
            .filter(|t| !t.trim().is_empty());
        Self { port, auth_token }
    }
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("port", &self.port)
            .field("auth_token", &self.auth_token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            port: 8080,
            auth_token: None,
        }
    }
}

// -- Application State --------------------------------------------------------

/// Shared application state accessible to all route handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    pub opportunities: Store<OpportunityId, Opportunity>,
    pub applications: Store<ApplicationId, Application>,
    pub config: AppConfig,
}

impl AppState {
    /// Empty stores, default configuration.
    pub fn new() -> Self {
        Self::with_config(AppConfig::default())
    }

    /// Empty stores with the given configuration.
    pub fn with_config(config: AppConfig) -> Self {
        Self {
            opportunities: Store::new(),
            applications: Store::new(),
            config,
        }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}
