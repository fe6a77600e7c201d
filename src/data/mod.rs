pub mod store;
pub mod json_store;

pub use store::{InMemoryRunStore, RunStore, RunUpdate};
pub use json_store::JsonFileRunStore;
