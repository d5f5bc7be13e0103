//! The rental state machine.
//!
//! `TRANSITIONS` is the only place that knows which action moves a rental from
//! which status, and who may invoke it. Both the legality check performed by
//! [`crate::service::rental::RentalService::advance_status`] and the
//! `available_actions` shown to each party are read from it.

use crate::models::rental::{RentalAction, RentalStatus};
use rocket::serde::Serialize;
use schemars::JsonSchema;

/// How a user relates to one particular rental. Never stored; see [`Role::of`].
#[derive(Serialize, Debug, Copy, Clone, Eq, PartialEq, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Owner,
    Renter,
}

impl Role {
    /// Derives the viewer's role by comparing ids. Returns `None` for users who
    /// are neither the equipment's owner nor the rental's renter.
    pub fn of(viewer_id: i64, owner_id: i64, renter_id: i64) -> Option<Role> {
        if viewer_id == owner_id {
            Some(Role::Owner)
        } else if viewer_id == renter_id {
            Some(Role::Renter)
        } else {
            None
        }
    }
}

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct Transition {
    pub from: RentalStatus,
    pub action: RentalAction,
    pub actor: Role,
    pub to: RentalStatus,
}

/// Creating a rental is not in the table: it has no source status and always
/// yields [`RentalStatus::Pending`] for the renter.
pub const INITIAL_STATUS: RentalStatus = RentalStatus::Pending;

pub const TRANSITIONS: [Transition; 5] = [
    Transition {
        from: RentalStatus::Pending,
        action: RentalAction::Approve,
        actor: Role::Owner,
        to: RentalStatus::Approved,
    },
    Transition {
        from: RentalStatus::Pending,
        action: RentalAction::Reject,
        actor: Role::Owner,
        to: RentalStatus::Rejected,
    },
    Transition {
        from: RentalStatus::Approved,
        action: RentalAction::Pickup,
        actor: Role::Owner,
        to: RentalStatus::Rented,
    },
    Transition {
        from: RentalStatus::Rented,
        action: RentalAction::ReturnRequest,
        actor: Role::Renter,
        to: RentalStatus::ReturnRequested,
    },
    Transition {
        from: RentalStatus::ReturnRequested,
        action: RentalAction::ConfirmReturn,
        actor: Role::Owner,
        to: RentalStatus::Returned,
    },
];

pub fn find_transition(from: RentalStatus, action: RentalAction) -> Option<&'static Transition> {
    TRANSITIONS.iter().find(|t| t.from == from && t.action == action)
}

/// Actions `role` may invoke on a rental currently in `status`, in table order.
pub fn available_actions(status: RentalStatus, role: Role) -> Vec<RentalAction> {
    TRANSITIONS
        .iter()
        .filter(|t| t.from == status && t.actor == role)
        .map(|t| t.action)
        .collect()
}
