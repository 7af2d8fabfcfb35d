//! Core domain concepts shared across all subdomains.
//!
//! - [`model::ModelBinding`]: a backend model a conversation is bound to
//! - [`message::Message`]: one transcript entry
//! - [`error::DomainError`]: domain-level errors

pub mod error;
pub mod message;
pub mod model;
pub mod string;
