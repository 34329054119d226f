//! Collection tree, leaf addressing, lookup and mutations.

mod address;
mod display;
mod item;
mod locate;
mod mutation;
mod projection;

pub use address::{LeafAddress, address_of};
pub use display::{DisplayEntry, DisplayList, method_histogram};
pub use item::{CollectionInfo, CollectionTree, Folder, Node};
pub use locate::{Located, Location, locate, locate_path};
pub use mutation::{ClonedRequest, RequestEdit, base_name, copy_name};
pub use projection::{filtered_view, is_injection_item};
