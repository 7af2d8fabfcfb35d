//! Application-level configuration.
//!
//! - [`ChatParams`]: knobs that change how the use cases behave

pub mod chat_params;

pub use chat_params::ChatParams;
