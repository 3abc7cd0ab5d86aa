//! Port for the external identity provider.
//!
//! The provider owns credentials and sessions. The core only reads the
//! identity it reports and follows its change notifications; see
//! [`crate::domain::resolve_user`] for how an identity becomes a user.

use async_trait::async_trait;
use tokio::sync::watch;

use crate::domain::{ExternalIdentity, LoginCredentials, SignUpRequest};

use super::define_port_error;

define_port_error! {
    /// Errors raised by identity provider adapters.
    pub enum IdentityProviderError {
        /// Credentials or the sign-up request were refused.
        Rejected { message: String } => "{message}",
        /// No account is registered for the email.
        UnknownAccount { email: String } => "no account registered for {email}",
        /// The provider could not be reached.
        Unavailable { message: String } => "identity provider unavailable: {message}",
    }
}

/// Result of a sign-up that the provider accepted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignUpOutcome {
    /// The account is usable immediately.
    Active(ExternalIdentity),
    /// The account exists but has no usable identity yet, e.g. pending
    /// email confirmation.
    PendingConfirmation,
}

/// Identity provider contract.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Identity of the session the provider currently holds, if any.
    async fn current_session(&self) -> Result<Option<ExternalIdentity>, IdentityProviderError>;

    /// Follow identity changes (sign-in, sign-out, expiry).
    ///
    /// The receiver always holds the latest identity; `None` means signed
    /// out. Dropping the receiver detaches the subscription.
    fn subscribe(&self) -> watch::Receiver<Option<ExternalIdentity>>;

    /// Register a new account.
    async fn sign_up(&self, request: &SignUpRequest)
    -> Result<SignUpOutcome, IdentityProviderError>;

    /// Authenticate an existing account.
    async fn sign_in(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<ExternalIdentity, IdentityProviderError>;

    /// End the provider's session.
    async fn sign_out(&self) -> Result<(), IdentityProviderError>;
}
