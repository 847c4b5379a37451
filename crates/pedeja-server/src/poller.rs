//! Background order polling.
//!
//! Mirrors the admin dashboard's refresh loop: every tick, each store with a
//! live admin session gets its upstream order list fetched and reconciled
//! into the shared dashboard state. Nothing is polled while nobody is
//! authenticated.

use std::sync::Arc;
use std::time::Duration;

use pedeja_orders::OrdersClient;

use crate::api::Dashboards;
use crate::session::SessionStore;

/// Spawn the poll loop. The returned handle is detached; the task runs for
/// the lifetime of the process.
pub fn spawn(
    orders: Arc<OrdersClient>,
    dashboards: Dashboards,
    sessions: SessionStore,
    poll_interval_ms: u64,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(Duration::from_millis(poll_interval_ms.max(250)));
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            ticker.tick().await;

            let stores = sessions.active_stores().await;
            if stores.is_empty() {
                continue;
            }

            for store in stores {
                poll_store(&orders, &dashboards, &store).await;
            }
        }
    })
}

async fn poll_store(orders: &OrdersClient, dashboards: &Dashboards, store: &str) {
    match orders.list_orders(store).await {
        Ok(fresh) => {
            let mut dashboards = dashboards.lock().await;
            let dashboard = dashboards.entry(store.to_string()).or_default();
            dashboard.apply_poll(fresh);
            // A failed write may have requested an out-of-band refetch that
            // this tick just satisfied.
            let _ = dashboard.take_refetch_request();
        }
        Err(error) => {
            tracing::warn!(store, error = %error, "order poll failed; keeping previous view");
        }
    }
}
