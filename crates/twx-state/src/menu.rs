//! # Status Menu Session
//!
//! The interactive protocol behind a status dropdown: open the menu, pick
//! an action, optionally type a reason, and hand the result to the caller's
//! update handler.
//!
//! ## States
//!
//! ```text
//!            open_menu                select (reason required)
//!   Idle ─────────────▶ MenuOpen ─────────────────────────▶ ReasonPrompt
//!    ▲                     │                                   │   │
//!    │    select (save or no reason) / close                   │   │
//!    ├─────────────────────┘                                   │   │
//!    │                       confirm (accepted) / cancel       │   │
//!    └─────────────────────────────────────────────────────────┘   │
//!                              confirm (blank, required): no-op ◀──┘
//! ```
//!
//! ## Commit policy
//!
//! The session is pessimistic. Handing a transition to the handler does not
//! change [`StatusMenu::current_status`]; the session waits for the caller
//! to report [`commit_succeeded`](StatusMenu::commit_succeeded) or
//! [`commit_failed`](StatusMenu::commit_failed). While a commit is
//! outstanding the menu refuses to open, so one session never has two
//! transitions in flight.
//!
//! Events that do not apply to the current state are ignored and return
//! `false`. Nothing here raises an error.

use twx_core::Role;

use crate::catalog::ActionDescriptor;
use crate::reason::ReasonConfig;
use crate::status::WorkflowStatus;
use crate::workflow::Workflow;

/// What the session hands to the update handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusUpdate<S> {
    /// Requested status. Equal to the current status for a save.
    pub status: S,
    /// Reason typed into the prompt, if any.
    pub reason: Option<String>,
}

/// Where the session is in the protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MenuState<S> {
    /// Menu closed.
    Idle,
    /// Menu showing the eligible actions.
    MenuOpen {
        /// Actions in display order.
        actions: Vec<ActionDescriptor<S>>,
    },
    /// Reason modal for a transition that requires one.
    ReasonPrompt {
        /// Transition target.
        target: S,
        /// Prompt text and requirement.
        config: ReasonConfig,
        /// Text typed so far.
        draft: String,
    },
}

/// One interactive status-menu session for one entity.
pub struct StatusMenu<'w, S: WorkflowStatus, H> {
    workflow: &'w Workflow<S>,
    role: Role,
    include_save_action: bool,
    current: S,
    state: MenuState<S>,
    pending: Option<S>,
    last_error: Option<String>,
    on_update: H,
}

impl<'w, S, H> StatusMenu<'w, S, H>
where
    S: WorkflowStatus,
    H: FnMut(StatusUpdate<S>),
{
    /// Start an idle session for an entity in `current`, viewed by `role`.
    pub fn new(
        workflow: &'w Workflow<S>,
        current: S,
        role: Role,
        include_save_action: bool,
        on_update: H,
    ) -> Self {
        Self {
            workflow,
            role,
            include_save_action,
            current,
            state: MenuState::Idle,
            pending: None,
            last_error: None,
            on_update,
        }
    }

    /// Protocol state.
    pub fn state(&self) -> &MenuState<S> {
        &self.state
    }

    /// Status as last confirmed by the caller.
    pub fn current_status(&self) -> S {
        self.current
    }

    /// Whether a transition has been handed off and not yet resolved.
    pub fn is_submitting(&self) -> bool {
        self.pending.is_some()
    }

    /// Target of the outstanding transition, if any.
    pub fn pending_status(&self) -> Option<S> {
        self.pending
    }

    /// Message from the most recent failed commit.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Idle → MenuOpen.
    ///
    /// Stays Idle when a commit is outstanding or when there is nothing
    /// this role can do from the current status.
    pub fn open_menu(&mut self) -> bool {
        if !matches!(self.state, MenuState::Idle) || self.pending.is_some() {
            return false;
        }
        let actions =
            self.workflow
                .available_actions(self.current, self.role, self.include_save_action);
        if actions.is_empty() {
            return false;
        }
        self.state = MenuState::MenuOpen { actions };
        true
    }

    /// MenuOpen → Idle without choosing anything.
    pub fn close_menu(&mut self) -> bool {
        if !matches!(self.state, MenuState::MenuOpen { .. }) {
            return false;
        }
        self.state = MenuState::Idle;
        true
    }

    /// Choose the action at `index` of the open menu.
    pub fn select_action(&mut self, index: usize) -> bool {
        let action = match &self.state {
            MenuState::MenuOpen { actions } => match actions.get(index) {
                Some(action) => action.clone(),
                None => return false,
            },
            _ => return false,
        };

        match action.target_status {
            None => {
                self.state = MenuState::Idle;
                (self.on_update)(StatusUpdate {
                    status: self.current,
                    reason: None,
                });
            }
            Some(target) if self.workflow.requires_reason(self.current, target) => {
                self.state = MenuState::ReasonPrompt {
                    target,
                    config: self.workflow.reason_config(self.current, target),
                    draft: String::new(),
                };
            }
            Some(target) => self.submit(target, None),
        }
        true
    }

    /// Choose the open-menu action labelled `label`.
    pub fn select_label(&mut self, label: &str) -> bool {
        let index = match &self.state {
            MenuState::MenuOpen { actions } => actions.iter().position(|a| a.label == label),
            _ => None,
        };
        match index {
            Some(index) => self.select_action(index),
            None => false,
        }
    }

    /// Replace the draft reason text.
    pub fn edit_reason(&mut self, text: impl Into<String>) -> bool {
        match &mut self.state {
            MenuState::ReasonPrompt { draft, .. } => {
                *draft = text.into();
                true
            }
            _ => false,
        }
    }

    /// Whether the prompt's confirm button should be enabled for the
    /// current draft.
    pub fn can_confirm(&self) -> bool {
        match &self.state {
            MenuState::ReasonPrompt { config, draft, .. } => config.accepts(draft),
            _ => false,
        }
    }

    /// Submit the prompt with `text`.
    ///
    /// A blank reason where one is required is a no-op and the prompt stays
    /// open. A blank optional reason is submitted as `None`.
    pub fn confirm(&mut self, text: &str) -> bool {
        let target = match &self.state {
            MenuState::ReasonPrompt { target, config, .. } if config.accepts(text) => *target,
            _ => return false,
        };
        let reason = Some(text.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string);
        self.submit(target, reason);
        true
    }

    /// Submit the prompt with its current draft.
    pub fn confirm_draft(&mut self) -> bool {
        let draft = match &self.state {
            MenuState::ReasonPrompt { draft, .. } => draft.clone(),
            _ => return false,
        };
        self.confirm(&draft)
    }

    /// ReasonPrompt → Idle, discarding the draft. The handler is not called.
    pub fn cancel(&mut self) -> bool {
        if !matches!(self.state, MenuState::ReasonPrompt { .. }) {
            return false;
        }
        self.state = MenuState::Idle;
        true
    }

    /// The caller committed the outstanding transition.
    pub fn commit_succeeded(&mut self) -> bool {
        match self.pending.take() {
            Some(target) => {
                self.current = target;
                self.last_error = None;
                true
            }
            None => false,
        }
    }

    /// The caller failed to commit the outstanding transition. The
    /// displayed status is left as it was.
    pub fn commit_failed(&mut self, error: impl Into<String>) -> bool {
        if self.pending.take().is_none() {
            return false;
        }
        self.last_error = Some(error.into());
        true
    }

    fn submit(&mut self, target: S, reason: Option<String>) {
        self.state = MenuState::Idle;
        self.pending = Some(target);
        self.last_error = None;
        (self.on_update)(StatusUpdate {
            status: target,
            reason,
        });
    }
}

impl<S: WorkflowStatus, H> std::fmt::Debug for StatusMenu<'_, S, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatusMenu")
            .field("role", &self.role)
            .field("current", &self.current)
            .field("state", &self.state)
            .field("pending", &self.pending)
            .finish_non_exhaustive()
    }
}
