//! Mirror Storage - Storage Trait and In-Memory Implementation
//!
//! Defines the storage abstraction used by the API layer and the search
//! semantics shared by every implementation.

pub mod memory;
pub mod search;
pub mod store;

pub use memory::InMemoryStore;
pub use search::{
    search_spaces, PageWindow, SearchField, SortKey, SpacePage, DEFAULT_PER_PAGE, MAX_PER_PAGE,
};
pub use store::MirrorStore;
