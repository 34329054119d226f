//! Postman Collection v2.1 format.
//!
//! Wire types and the mapping between them and the domain tree.

mod mapper;
mod types;

pub use mapper::{collection_to_wire, items_from_wire, items_to_wire, tree_from_wire};
pub use types::{
    PostmanAuth, PostmanAuthParam, PostmanBody, PostmanCollection, PostmanHeader, PostmanInfo,
    PostmanItem, PostmanRequest, PostmanResponse, PostmanUrl,
};
