//! In-memory state behind the admin dashboard view.

use std::collections::HashMap;

use pedeja_core::{OrderRecord, OrderStatus};

use crate::optimistic::Submission;
use crate::reconcile::reconcile;

/// The reconciled order list plus optimistic-edit bookkeeping for one store.
///
/// Recomputed from upstream on every poll tick; never persisted.
#[derive(Debug, Default)]
pub struct Dashboard {
    orders: Vec<OrderRecord>,
    submissions: HashMap<String, Submission>,
    refetch_requested: bool,
}

impl Dashboard {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current reconciled view, newest first.
    #[must_use]
    pub fn orders(&self) -> &[OrderRecord] {
        &self.orders
    }

    /// Merge a fresh upstream snapshot into the view.
    ///
    /// Runs the reconciler against the currently displayed list (which may
    /// carry optimistic statuses), then retires any submission whose target
    /// status the server now reports. Submissions for orders the server no
    /// longer returns (cleared history, upstream deletion) are dropped too;
    /// there is nothing left to confirm or revert for them.
    pub fn apply_poll(&mut self, fresh: Vec<OrderRecord>) {
        self.submissions.retain(|id, submission| {
            let Some(order) = fresh.iter().find(|order| order.id == *id) else {
                return false;
            };
            match submission {
                Submission::Confirmed { status } => order.status < *status,
                _ => true,
            }
        });

        self.orders = reconcile(&self.orders, fresh);
    }

    /// Apply an optimistic status edit and mark the write as in flight.
    ///
    /// Returns the status to send upstream, or `None` when the order is
    /// unknown or already has a write in flight (the click is dropped, not
    /// queued).
    pub fn begin_update(&mut self, order_id: &str, to: OrderStatus) -> Option<OrderStatus> {
        let order = self.orders.iter_mut().find(|order| order.id == order_id)?;
        let current = self.submissions.get(order_id).copied().unwrap_or(Submission::Idle);
        let submission = current.begin(order.status, to)?;
        self.submissions.insert(order_id.to_string(), submission);
        order.status = to;
        Some(to)
    }

    /// Resolve the in-flight write for `order_id`.
    ///
    /// On failure the visible status reverts to the pre-edit one and an
    /// immediate refetch is requested so the view resynchronizes without
    /// waiting for the next tick.
    pub fn complete_update(&mut self, order_id: &str, success: bool) {
        let Some(submission) = self.submissions.get(order_id).copied() else {
            return;
        };
        let resolved = submission.complete(success);

        if let Some(reverted_to) = resolved.reverted_status() {
            if let Some(order) = self.orders.iter_mut().find(|order| order.id == order_id) {
                tracing::warn!(order_id, status = %reverted_to, "status write failed; reverting");
                order.status = reverted_to;
            }
            self.submissions.remove(order_id);
            self.refetch_requested = true;
            return;
        }

        self.submissions.insert(order_id.to_string(), resolved);
    }

    /// Consume the refetch-now flag set by a failed write.
    pub fn take_refetch_request(&mut self) -> bool {
        std::mem::take(&mut self.refetch_requested)
    }

    /// Active (non-closed) orders, for the dashboard queue.
    #[must_use]
    pub fn active_orders(&self) -> Vec<&OrderRecord> {
        self.orders
            .iter()
            .filter(|order| !order.status.is_closed())
            .collect()
    }
}
