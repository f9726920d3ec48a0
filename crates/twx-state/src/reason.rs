//! # Reason Policy
//!
//! Decides, per `(from, to)` transition, whether a free-text justification
//! is mandatory and what prompt to show. Pure lookups over a static table:
//! no history is consulted, nothing is mutated.
//!
//! Pairs without an entry get the default config: not required, generic
//! title and placeholder.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::status::WorkflowStatus;

/// Default prompt title for unconfigured transitions.
pub const DEFAULT_REASON_TITLE: &str = "Add a note";

/// Default placeholder for unconfigured transitions.
pub const DEFAULT_REASON_PLACEHOLDER: &str = "Optionally describe why the status is changing";

/// Reason prompt configuration for one transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReasonConfig {
    /// Whether a non-blank reason must be supplied.
    pub required: bool,
    /// Prompt title.
    pub title: String,
    /// Input placeholder.
    pub placeholder: String,
}

impl ReasonConfig {
    /// Whether `text` satisfies this config. A required reason must contain
    /// something other than whitespace.
    pub fn accepts(&self, text: &str) -> bool {
        !self.required || !text.trim().is_empty()
    }
}

impl Default for ReasonConfig {
    fn default() -> Self {
        Self {
            required: false,
            title: DEFAULT_REASON_TITLE.to_string(),
            placeholder: DEFAULT_REASON_PLACEHOLDER.to_string(),
        }
    }
}

#[derive(Debug, Clone)]
struct ReasonPromptText {
    title: String,
    placeholder: String,
}

/// Table of transitions that require a reason.
#[derive(Debug, Clone)]
pub struct ReasonPolicy<S: WorkflowStatus> {
    required: HashMap<(S, S), ReasonPromptText>,
}

impl<S: WorkflowStatus> ReasonPolicy<S> {
    /// A policy where no transition requires a reason.
    pub fn new() -> Self {
        Self {
            required: HashMap::new(),
        }
    }

    /// Require a reason for `from -> to`, with the given prompt text.
    pub fn require(
        mut self,
        from: S,
        to: S,
        title: impl Into<String>,
        placeholder: impl Into<String>,
    ) -> Self {
        self.required.insert(
            (from, to),
            ReasonPromptText {
                title: title.into(),
                placeholder: placeholder.into(),
            },
        );
        self
    }

    /// Whether `from -> to` requires a reason.
    pub fn requires_reason(&self, from: S, to: S) -> bool {
        self.required.contains_key(&(from, to))
    }

    /// Prompt configuration for `from -> to`.
    pub fn reason_config(&self, from: S, to: S) -> ReasonConfig {
        match self.required.get(&(from, to)) {
            Some(text) => ReasonConfig {
                required: true,
                title: text.title.clone(),
                placeholder: text.placeholder.clone(),
            },
            None => ReasonConfig::default(),
        }
    }

    /// Every configured pair.
    pub fn pairs(&self) -> impl Iterator<Item = (S, S)> + '_ {
        self.required.keys().copied()
    }
}

impl<S: WorkflowStatus> Default for ReasonPolicy<S> {
    fn default() -> Self {
        Self::new()
    }
}
