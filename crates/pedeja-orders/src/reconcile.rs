//! Merge freshly polled orders with locally advanced statuses.

use std::collections::HashMap;

use pedeja_core::OrderRecord;

/// Merge a fresh server snapshot with the previously displayed list.
///
/// The server is authoritative for everything except status regression: when
/// the previous record for the same id ranks strictly higher, its status is
/// kept so an optimistic edit is not flickered back to a stale server read
/// while the write is still propagating. New orders pass through unchanged
/// and the fresh ordering (newest first) is preserved.
///
/// Total function: no input produces an error.
#[must_use]
pub fn reconcile(previous: &[OrderRecord], fresh: Vec<OrderRecord>) -> Vec<OrderRecord> {
    if previous.is_empty() {
        return fresh;
    }

    let previous_by_id: HashMap<&str, &OrderRecord> = previous
        .iter()
        .map(|order| (order.id.as_str(), order))
        .collect();

    fresh
        .into_iter()
        .map(|mut order| {
            if let Some(known) = previous_by_id.get(order.id.as_str()) {
                if known.status > order.status {
                    tracing::debug!(
                        order_id = %order.id,
                        local = %known.status,
                        server = %order.status,
                        "kept locally advanced status over stale server read"
                    );
                    order.status = known.status;
                }
            }
            order
        })
        .collect()
}
