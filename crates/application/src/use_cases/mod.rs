//! Application use cases (backend call orchestration).

mod extract_attributes;
mod generate_requests;
mod load_collection;
mod resolve_conditions;
mod save_collection;

pub use extract_attributes::*;
pub use generate_requests::*;
pub use load_collection::*;
pub use resolve_conditions::*;
pub use save_collection::*;
