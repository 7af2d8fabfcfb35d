//! Session domain.
//!
//! - [`entities::Session`]: a persisted snapshot of one working session
//! - [`state::SessionState`]: the live, restorable contents of a session
//! - [`registry::SessionRegistry`]: every stored session plus recency order

pub mod entities;
pub mod registry;
pub mod state;

pub use entities::Session;
pub use registry::SessionRegistry;
pub use state::SessionState;
