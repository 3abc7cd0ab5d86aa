//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **kv**: key/value blob stores (in-memory and file-backed)
//! - **persistence**: JSON collection repositories layered on a blob store
//! - **identity**: in-process identity provider with local credentials
//!
//! Adapters are thin translators between domain types and their stored or
//! external representation. They contain no business logic.

pub mod identity;
pub mod kv;
pub mod persistence;
