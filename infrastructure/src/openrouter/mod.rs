//! OpenRouter chat-completions adapter.
//!
//! - [`OpenRouterTransport`] implements the
//!   [`ModelTransport`](agentic_application::ModelTransport) port over HTTP
//! - [`sse`] turns a `text/event-stream` body into content deltas

pub mod sse;
mod transport;
mod wire;

pub use transport::{OpenRouterSettings, OpenRouterTransport};
