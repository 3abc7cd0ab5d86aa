//! Collection repositories backed by a blob store.

mod json_collections;

pub use json_collections::JsonCollections;
