//! Per-order submission state for optimistic status updates.

use pedeja_core::OrderStatus;

/// Lifecycle of one optimistic status edit.
///
/// The dashboard shows the target status as soon as the admin clicks; this
/// machine remembers where the order came from so a failed write can revert
/// the visible status explicitly instead of waiting for a later poll to
/// correct it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Submission {
    /// No write in flight.
    Idle,
    /// The local view already shows `to`; the PUT has not been confirmed.
    Submitting { from: OrderStatus, to: OrderStatus },
    /// The upstream accepted the write.
    Confirmed { status: OrderStatus },
    /// The write failed; the visible status was reverted.
    Failed { reverted_to: OrderStatus },
}

impl Submission {
    /// Start a new edit. Only one write per order may be in flight.
    ///
    /// Returns `None` when a submission is already pending, leaving the
    /// machine unchanged.
    #[must_use]
    pub fn begin(self, from: OrderStatus, to: OrderStatus) -> Option<Self> {
        match self {
            Submission::Submitting { .. } => None,
            _ => Some(Submission::Submitting { from, to }),
        }
    }

    /// Resolve the in-flight write. Success confirms the target status;
    /// failure moves to `Failed` carrying the status to restore.
    #[must_use]
    pub fn complete(self, success: bool) -> Self {
        match self {
            Submission::Submitting { from, to } => {
                if success {
                    Submission::Confirmed { status: to }
                } else {
                    Submission::Failed { reverted_to: from }
                }
            }
            other => other,
        }
    }

    /// The status an order should display if this submission ended in
    /// failure, or `None` when there is nothing to revert.
    #[must_use]
    pub fn reverted_status(self) -> Option<OrderStatus> {
        match self {
            Submission::Failed { reverted_to } => Some(reverted_to),
            _ => None,
        }
    }

    #[must_use]
    pub fn is_in_flight(self) -> bool {
        matches!(self, Submission::Submitting { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn successful_write_confirms_target() {
        let s = Submission::Idle
            .begin(OrderStatus::Pending, OrderStatus::Preparing)
            .unwrap();
        assert!(s.is_in_flight());
        assert_eq!(
            s.complete(true),
            Submission::Confirmed {
                status: OrderStatus::Preparing
            }
        );
    }

    #[test]
    fn failed_write_reverts_to_origin() {
        let s = Submission::Idle
            .begin(OrderStatus::Pending, OrderStatus::Preparing)
            .unwrap();
        let failed = s.complete(false);
        assert_eq!(failed.reverted_status(), Some(OrderStatus::Pending));
    }

    #[test]
    fn second_begin_while_in_flight_is_refused() {
        let s = Submission::Idle
            .begin(OrderStatus::Pending, OrderStatus::Preparing)
            .unwrap();
        assert!(s.begin(OrderStatus::Preparing, OrderStatus::Sent).is_none());
    }

    #[test]
    fn begin_after_failure_starts_over() {
        let failed = Submission::Failed {
            reverted_to: OrderStatus::Pending,
        };
        let restarted = failed.begin(OrderStatus::Pending, OrderStatus::Sent);
        assert!(matches!(restarted, Some(Submission::Submitting { .. })));
    }

    #[test]
    fn complete_outside_submitting_is_a_no_op() {
        assert_eq!(Submission::Idle.complete(true), Submission::Idle);
        let confirmed = Submission::Confirmed {
            status: OrderStatus::Sent,
        };
        assert_eq!(confirmed.complete(false), confirmed);
    }
}
