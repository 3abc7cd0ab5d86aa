//! Key/value blob store adapters.

mod atomic_io;
mod file;
mod memory;

pub use file::{FileBlobStore, FileStoreError};
pub use memory::InMemoryBlobStore;
