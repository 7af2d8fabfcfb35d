//! Local persistence for sessions and preferences.
//!
//! Provides [`JsonFileStore`], which implements both the
//! [`SessionStore`](agentic_application::SessionStore) and
//! [`PreferenceStore`](agentic_application::PreferenceStore) ports over plain
//! JSON files in the data directory.

mod atomic;
mod json_store;

pub use json_store::JsonFileStore;
