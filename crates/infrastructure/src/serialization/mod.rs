//! JSON serialization for collection documents.

mod json;

pub use json::*;
