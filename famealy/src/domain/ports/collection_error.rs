//! Error shared by every persisted-collection port.

use super::define_port_error;

define_port_error! {
    /// Failures raised by collection repositories and their backing store.
    pub enum CollectionError {
        /// The backing store could not be reached.
        Unavailable { message: String } => "collection store unavailable: {message}",
        /// A write was rejected or did not complete.
        Write { message: String } => "collection write failed: {message}",
        /// A record could not be encoded for storage.
        Serialization { message: String } => "collection serialisation failed: {message}",
    }
}
