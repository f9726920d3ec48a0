//! Property tests over the built-in workflows.

use proptest::prelude::*;
use proptest::sample::select;
use twx_core::Role;
use twx_state::{
    ApplicationStatus, OpportunityStatus, StatusHistoryEntry, Workflow, WorkflowStatus,
};

fn role() -> impl Strategy<Value = Role> {
    select(Role::all().to_vec())
}

fn opportunity_status() -> impl Strategy<Value = OpportunityStatus> {
    select(OpportunityStatus::all().to_vec())
}

fn application_status() -> impl Strategy<Value = ApplicationStatus> {
    select(ApplicationStatus::all().to_vec())
}

fn targets_are_successors<S: WorkflowStatus>(wf: &Workflow<S>, s: S, role: Role, save: bool) -> bool {
    let next = wf.next_statuses(s);
    wf.available_actions(s, role, save)
        .iter()
        .all(|a| a.target_status.map_or(true, |t| next.contains(&t)))
}

proptest! {
    /// Every status has a successor list drawn from its own enum.
    #[test]
    fn next_statuses_total_and_closed(s in opportunity_status(), a in application_status()) {
        for t in OpportunityStatus::workflow().next_statuses(s) {
            prop_assert!(OpportunityStatus::all().contains(t));
        }
        for t in ApplicationStatus::workflow().next_statuses(a) {
            prop_assert!(ApplicationStatus::all().contains(t));
        }
    }

    /// Offered actions only ever target legal successors.
    #[test]
    fn actions_never_target_illegal_status(
        s in opportunity_status(),
        a in application_status(),
        r in role(),
        save in any::<bool>(),
    ) {
        prop_assert!(targets_are_successors(OpportunityStatus::workflow(), s, r, save));
        prop_assert!(targets_are_successors(ApplicationStatus::workflow(), a, r, save));
    }

    /// A plain user is never offered a restricted action.
    #[test]
    fn user_sees_no_restricted_actions(s in opportunity_status(), a in application_status()) {
        for action in OpportunityStatus::workflow().available_actions(s, Role::User, false) {
            prop_assert!(!action.host_only && !action.admin_only);
        }
        for action in ApplicationStatus::workflow().available_actions(a, Role::User, false) {
            prop_assert!(!action.host_only && !action.admin_only);
        }
    }

    /// Hosts are never offered admin-only actions, and admins never
    /// host-only ones.
    #[test]
    fn role_flags_are_exclusive(s in opportunity_status(), save in any::<bool>()) {
        let wf = OpportunityStatus::workflow();
        prop_assert!(wf.available_actions(s, Role::Host, save).iter().all(|a| !a.admin_only));
        prop_assert!(wf.available_actions(s, Role::Admin, save).iter().all(|a| !a.host_only));
    }

    /// Reason lookups are pure: repeated calls agree.
    #[test]
    fn requires_reason_is_pure(from in opportunity_status(), to in opportunity_status()) {
        let wf = OpportunityStatus::workflow();
        let first = wf.requires_reason(from, to);
        let config = wf.reason_config(from, to);
        for _ in 0..3 {
            prop_assert_eq!(wf.requires_reason(from, to), first);
            prop_assert_eq!(&wf.reason_config(from, to), &config);
        }
        prop_assert_eq!(config.required, first);
    }

    /// Any offered action is accepted by the server-side check, and any
    /// accepted request corresponds to an offered action.
    #[test]
    fn authorize_agrees_with_menu(s in opportunity_status(), to in opportunity_status(), r in role()) {
        let wf = OpportunityStatus::workflow();
        let offered = wf
            .available_actions(s, r, false)
            .iter()
            .any(|a| a.target_status == Some(to));
        prop_assert_eq!(wf.authorize(s, to, r).is_ok(), offered);
    }

    /// The latest reason is independent of storage order.
    #[test]
    fn latest_reason_order_independent(
        millis in prop::collection::btree_set(0i64..1_000_000, 1..12),
        seed in any::<u64>(),
    ) {
        let base = 1_760_000_000_000i64;
        let entries: Vec<StatusHistoryEntry<OpportunityStatus>> = millis
            .iter()
            .map(|m| StatusHistoryEntry {
                status: OpportunityStatus::Paused,
                reason: Some(format!("r{m}")),
                changed_by: None,
                changed_at: twx_core::Timestamp::from_epoch_millis(base + m).unwrap(),
            })
            .collect();
        let newest = format!("r{}", millis.iter().max().unwrap());

        let mut shuffled = entries.clone();
        let len = shuffled.len();
        shuffled.rotate_left((seed as usize) % len);
        if seed % 2 == 0 {
            shuffled.reverse();
        }
        prop_assert_eq!(
            twx_state::latest_status_reason(&shuffled, OpportunityStatus::Paused),
            Some(newest.as_str())
        );
    }
}
