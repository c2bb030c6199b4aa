//! # Quill Shared
//!
//! Wire types of the HTTP API. Everything here serializes in camelCase and
//! carries no domain logic, so a client can depend on it alone.

pub mod dto;
pub mod response;

pub use response::{ErrorResponse, MessageResponse};
