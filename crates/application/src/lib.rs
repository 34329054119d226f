//! Postgen Application - Use cases and the editing session
//!
//! This crate orchestrates the domain types against the collection store
//! and generation service ports. Adapters live in the infrastructure crate.

pub mod error;
pub mod ports;
pub mod session;
pub mod use_cases;

pub use error::{ApplicationError, ApplicationResult};
pub use session::EditorSession;
pub use use_cases::LoadState;
