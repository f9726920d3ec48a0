//! # Action Catalog & Eligibility Filter
//!
//! The user-facing actions declared for each status. An action either
//! targets a status (a transition) or has no target (the "save" pseudo-action,
//! which persists edits without changing status).
//!
//! ## Eligibility
//!
//! [`ActionCatalog::eligible`] filters the declared list for one caller:
//!
//! 1. drop the save action unless requested,
//! 2. drop host-only actions unless the caller is a host,
//! 3. drop admin-only actions unless the caller is an admin,
//! 4. drop actions whose target is not a legal successor.
//!
//! Declaration order is kept: the first action takes the primary position
//! in the menu. An empty result means "hide the menu".
//!
//! Role filtering here decides what is *offered*. The server re-checks every
//! transition request independently.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use twx_core::Role;

use crate::status::WorkflowStatus;

/// Visual intent of an action button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ButtonStyle {
    /// Neutral styling.
    #[default]
    Default,
    /// The recommended next step.
    Primary,
    /// Destructive or hard-to-reverse.
    Danger,
}

/// One user-invokable status action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionDescriptor<S> {
    /// Button label.
    pub label: String,
    /// Status this action moves to; `None` saves without a transition.
    pub target_status: Option<S>,
    /// Only offered to hosts.
    #[serde(default)]
    pub host_only: bool,
    /// Only offered to admins and super admins.
    #[serde(default)]
    pub admin_only: bool,
    /// Visual intent.
    #[serde(default)]
    pub button_style: ButtonStyle,
}

impl<S: WorkflowStatus> ActionDescriptor<S> {
    /// An unrestricted transition action with default styling.
    pub fn transition(label: impl Into<String>, target: S) -> Self {
        Self {
            label: label.into(),
            target_status: Some(target),
            host_only: false,
            admin_only: false,
            button_style: ButtonStyle::Default,
        }
    }

    /// The save pseudo-action.
    pub fn save(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            target_status: None,
            host_only: false,
            admin_only: false,
            button_style: ButtonStyle::Default,
        }
    }

    /// Restrict to hosts.
    pub fn host_only(mut self) -> Self {
        self.host_only = true;
        self
    }

    /// Restrict to admins.
    pub fn admin_only(mut self) -> Self {
        self.admin_only = true;
        self
    }

    /// Set the button style.
    pub fn styled(mut self, style: ButtonStyle) -> Self {
        self.button_style = style;
        self
    }

    /// Whether this is the save pseudo-action.
    pub fn is_save(&self) -> bool {
        self.target_status.is_none()
    }

    /// Whether `role` passes this action's role flags.
    pub fn visible_to(&self, role: Role) -> bool {
        (!self.host_only || role.is_host()) && (!self.admin_only || role.is_admin())
    }
}

/// Declared actions per status.
#[derive(Debug, Clone)]
pub struct ActionCatalog<S: WorkflowStatus> {
    actions: HashMap<S, Vec<ActionDescriptor<S>>>,
}

impl<S: WorkflowStatus> ActionCatalog<S> {
    /// An empty catalog.
    pub fn new() -> Self {
        Self {
            actions: HashMap::new(),
        }
    }

    /// Declare the actions for `status`, replacing any earlier declaration.
    pub fn with_actions(mut self, status: S, actions: Vec<ActionDescriptor<S>>) -> Self {
        self.actions.insert(status, actions);
        self
    }

    /// Every action declared for `status`, unfiltered.
    pub fn declared(&self, status: S) -> &[ActionDescriptor<S>] {
        self.actions.get(&status).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterate over `(status, actions)` declarations.
    pub fn iter(&self) -> impl Iterator<Item = (S, &[ActionDescriptor<S>])> + '_ {
        self.actions.iter().map(|(s, a)| (*s, a.as_slice()))
    }

    /// The actions for `current` that `role` may invoke, given the legal
    /// successors `next`.
    pub fn eligible(
        &self,
        current: S,
        role: Role,
        include_save_action: bool,
        next: &[S],
    ) -> Vec<ActionDescriptor<S>> {
        self.declared(current)
            .iter()
            .filter(|a| include_save_action || !a.is_save())
            .filter(|a| a.visible_to(role))
            .filter(|a| a.target_status.map_or(true, |t| next.contains(&t)))
            .cloned()
            .collect()
    }
}

impl<S: WorkflowStatus> Default for ActionCatalog<S> {
    fn default() -> Self {
        Self::new()
    }
}
