//! Order lifecycle transition table and payment review rules.
//!
//! The original flow allowed any role with update rights to set any status at
//! any time. Here the lifecycle is an explicit finite-state machine: each
//! (actor, from, to) triple is either allowed or rejected at the point of
//! mutation, and terminal states admit no transitions.
//!
//! ```text
//! pending ──► confirmed ──► shipped ──► delivered
//!    │             │            │
//!    └──────────┴──────────┴──► cancelled
//! ```
//!
//! - Admin may advance the chain one step at a time and cancel any
//!   non-terminal order. Re-opening a delivered or cancelled order is not
//!   allowed.
//! - Couriers may only mark orders assigned to them `shipped` and then
//!   `delivered` (ownership is checked by the caller; this table only knows
//!   about statuses).
//! - Buyers may cancel their own order while it is still `pending`.
//!
//! Payment verification is a separate axis (see [`review_payment`]): marking a
//! QR order `verified` force-confirms the order in the same compound update,
//! while rejecting it leaves the lifecycle status untouched.

use crate::types::{Actor, OrderStatus, PaymentStatus};

/// Error returned for a disallowed status transition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{actor} may not move an order from {from} to {to}")]
pub struct TransitionError {
    pub actor: Actor,
    pub from: OrderStatus,
    pub to: OrderStatus,
}

/// Whether `actor` may move an order from `from` to `to`.
#[must_use]
pub fn transition_allowed(actor: Actor, from: OrderStatus, to: OrderStatus) -> bool {
    use OrderStatus::{Cancelled, Confirmed, Delivered, Pending, Shipped};

    if from.is_terminal() || from == to {
        return false;
    }

    match actor {
        Actor::Admin => matches!(
            (from, to),
            (Pending, Confirmed)
                | (Confirmed, Shipped)
                | (Shipped, Delivered)
                | (Pending | Confirmed | Shipped, Cancelled)
        ),
        Actor::Courier => matches!((from, to), (Confirmed, Shipped) | (Shipped, Delivered)),
        Actor::Buyer => matches!((from, to), (Pending, Cancelled)),
        // Sellers never drive the lifecycle.
        Actor::Seller => false,
    }
}

/// Check a transition, returning a [`TransitionError`] when it is disallowed.
///
/// # Errors
///
/// Returns `TransitionError` if the (actor, from, to) triple is not in the
/// transition table.
pub fn check_transition(
    actor: Actor,
    from: OrderStatus,
    to: OrderStatus,
) -> Result<(), TransitionError> {
    if transition_allowed(actor, from, to) {
        Ok(())
    } else {
        Err(TransitionError { actor, from, to })
    }
}

/// Admin decision on a submitted proof of payment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewDecision {
    Verified,
    Rejected,
}

/// Error returned when payment state is touched on a terminal order.
///
/// Delivered and cancelled orders are frozen on both axes: no proof
/// submission, no review. Verifying a cancelled order would otherwise
/// resurrect it to `confirmed` through the compound update.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("payment state of a {status} order can no longer change")]
pub struct ReviewError {
    pub status: OrderStatus,
}

/// The field updates produced by a payment review.
///
/// Applied to the order row as one compound UPDATE so the two fields can
/// never be observed half-written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaymentReview {
    /// New payment status.
    pub payment_status: PaymentStatus,
    /// Lifecycle status to force-set alongside, if any.
    pub order_status: Option<OrderStatus>,
}

/// Compute the compound update for an admin payment review.
///
/// Verifying force-sets the order to `confirmed` in the same operation.
/// Rejecting changes only the payment status; the lifecycle status is left
/// as-is (a rejected order stays wherever it was, awaiting a new proof).
/// Reviews are idempotent: re-verifying an already verified order produces
/// the same field values again.
///
/// # Errors
///
/// Returns [`ReviewError`] when `current` is terminal; reviewing a
/// delivered or cancelled order is never allowed.
pub const fn review_payment(
    decision: ReviewDecision,
    current: OrderStatus,
) -> Result<PaymentReview, ReviewError> {
    if current.is_terminal() {
        return Err(ReviewError { status: current });
    }

    Ok(match decision {
        ReviewDecision::Verified => PaymentReview {
            payment_status: PaymentStatus::Verified,
            order_status: Some(OrderStatus::Confirmed),
        },
        ReviewDecision::Rejected => PaymentReview {
            payment_status: PaymentStatus::Rejected,
            order_status: None,
        },
    })
}

/// Payment status after the buyer (re)submits a proof image.
///
/// Always resets to `pending` so the admin reviews the new proof, even when
/// the previous one was rejected.
///
/// # Errors
///
/// Returns [`ReviewError`] when `current` is terminal; there is nothing to
/// pay for on a delivered or cancelled order.
pub const fn proof_submitted(current: OrderStatus) -> Result<PaymentStatus, ReviewError> {
    if current.is_terminal() {
        return Err(ReviewError { status: current });
    }
    Ok(PaymentStatus::Pending)
}

#[cfg(test)]
mod tests {
    use super::*;
    use OrderStatus::{Cancelled, Confirmed, Delivered, Pending, Shipped};

    #[test]
    fn test_admin_forward_chain() {
        assert!(transition_allowed(Actor::Admin, Pending, Confirmed));
        assert!(transition_allowed(Actor::Admin, Confirmed, Shipped));
        assert!(transition_allowed(Actor::Admin, Shipped, Delivered));
    }

    #[test]
    fn test_admin_cannot_skip_or_rewind() {
        assert!(!transition_allowed(Actor::Admin, Pending, Shipped));
        assert!(!transition_allowed(Actor::Admin, Pending, Delivered));
        assert!(!transition_allowed(Actor::Admin, Confirmed, Pending));
        assert!(!transition_allowed(Actor::Admin, Shipped, Confirmed));
    }

    #[test]
    fn test_cancel_reachable_from_any_non_terminal() {
        for from in [Pending, Confirmed, Shipped] {
            assert!(transition_allowed(Actor::Admin, from, Cancelled), "{from}");
        }
    }

    #[test]
    fn test_terminal_states_are_frozen() {
        for from in [Delivered, Cancelled] {
            for to in OrderStatus::ALL {
                for actor in [Actor::Buyer, Actor::Seller, Actor::Courier, Actor::Admin] {
                    assert!(
                        !transition_allowed(actor, from, to),
                        "{actor}: {from} -> {to} should be frozen"
                    );
                }
            }
        }
    }

    #[test]
    fn test_courier_scope() {
        assert!(transition_allowed(Actor::Courier, Confirmed, Shipped));
        assert!(transition_allowed(Actor::Courier, Shipped, Delivered));
        // Couriers never confirm or cancel.
        assert!(!transition_allowed(Actor::Courier, Pending, Confirmed));
        assert!(!transition_allowed(Actor::Courier, Pending, Cancelled));
        assert!(!transition_allowed(Actor::Courier, Confirmed, Cancelled));
    }

    #[test]
    fn test_buyer_may_only_cancel_pending() {
        assert!(transition_allowed(Actor::Buyer, Pending, Cancelled));
        assert!(!transition_allowed(Actor::Buyer, Confirmed, Cancelled));
        assert!(!transition_allowed(Actor::Buyer, Pending, Confirmed));
    }

    #[test]
    fn test_self_transitions_rejected() {
        for status in OrderStatus::ALL {
            assert!(!transition_allowed(Actor::Admin, status, status));
        }
    }

    #[test]
    fn test_check_transition_error_carries_context() {
        let err = check_transition(Actor::Courier, Pending, Delivered).unwrap_err();
        assert_eq!(err.actor, Actor::Courier);
        assert_eq!(err.from, Pending);
        assert_eq!(err.to, Delivered);
    }

    #[test]
    fn test_verify_confirms_in_same_operation() {
        let review = review_payment(ReviewDecision::Verified, Pending).unwrap();
        assert_eq!(review.payment_status, PaymentStatus::Verified);
        assert_eq!(review.order_status, Some(Confirmed));
    }

    #[test]
    fn test_reject_leaves_order_status_untouched() {
        let review = review_payment(ReviewDecision::Rejected, Pending).unwrap();
        assert_eq!(review.payment_status, PaymentStatus::Rejected);
        assert_eq!(review.order_status, None);
    }

    #[test]
    fn test_review_frozen_on_terminal_orders() {
        // Verifying a cancelled order must not resurrect it to confirmed.
        for status in [Delivered, Cancelled] {
            for decision in [ReviewDecision::Verified, ReviewDecision::Rejected] {
                let err = review_payment(decision, status).unwrap_err();
                assert_eq!(err.status, status);
            }
        }
    }

    #[test]
    fn test_proof_resubmission_resets_to_pending() {
        // Even after a rejection, a new proof re-enters review.
        assert_eq!(proof_submitted(Pending).unwrap(), PaymentStatus::Pending);
        assert_eq!(proof_submitted(Confirmed).unwrap(), PaymentStatus::Pending);
    }

    #[test]
    fn test_proof_submission_frozen_on_terminal_orders() {
        for status in [Delivered, Cancelled] {
            assert_eq!(
                proof_submitted(status).unwrap_err(),
                ReviewError { status }
            );
        }
    }
}
