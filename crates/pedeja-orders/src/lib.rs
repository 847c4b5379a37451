//! Admin-side order tracking: the status reconciler, the upstream orders-API
//! client, and the optimistic-update bookkeeping around both.

mod client;
mod dashboard;
mod error;
mod optimistic;
mod reconcile;

pub use client::OrdersClient;
pub use dashboard::Dashboard;
pub use error::OrdersError;
pub use optimistic::Submission;
pub use reconcile::reconcile;
