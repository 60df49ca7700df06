//! wiki-server library: exposes the server components for testing.
//!
//! The binary in `main.rs` wires these together; integration tests drive
//! the workflow directly against a temp-dir store.

pub mod editlock;
pub mod handlers;
pub mod html;
pub mod workflow;

pub use editlock::EditLocks;
pub use handlers::AppState;
