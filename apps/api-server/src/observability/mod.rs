//! Observability module - request IDs and alerting.

mod alert;
mod request_id;

pub use alert::AlertLayer;
pub use request_id::{RequestIdMiddleware, current_request_id};
