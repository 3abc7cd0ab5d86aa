//! Household coordination core.
//!
//! Family members record a daily presence status and rate shared meals. This
//! crate holds the client-side data and state layer a UI drives: identity
//! resolution, the daily status reset, family membership by invite code, and
//! meal rating aggregation. Presentation lives elsewhere and calls in through
//! the services re-exported from [`domain`].

pub mod bootstrap;
pub mod config;
pub mod domain;
pub mod outbound;

pub use bootstrap::{Famealy, FamealyPorts, StartupError, init_tracing};
pub use config::FamealySettings;

#[cfg(test)]
mod test_support;
