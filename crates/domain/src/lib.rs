//! Postgen Domain - Core editing types
//!
//! This crate defines the collection tree edited by Postgen and the
//! planning types for filtered-request generation.
//! All types here are pure Rust with no I/O dependencies.

pub mod collection;
pub mod error;
pub mod generation;
pub mod request;

pub use collection::{CollectionInfo, CollectionTree, Folder, LeafAddress, Node};
pub use error::{DomainError, DomainResult};
pub use request::{HttpMethod, Request};
