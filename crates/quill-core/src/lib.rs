//! # Quill Core
//!
//! The domain layer of the Quill blogging platform.
//! This crate contains the entities, the authorization policy and the
//! services that mutate shared content. It has zero infrastructure
//! dependencies: storage, hashing and token signing are reached through
//! the traits in [`ports`].

pub mod domain;
pub mod error;
pub mod policy;
pub mod ports;
pub mod services;
pub mod validation;

pub use error::{DomainError, RepoError};
pub use policy::Decision;
