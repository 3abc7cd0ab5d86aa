//! In-process identity provider with email/password accounts.
//!
//! Used when no external provider is configured. Accounts live in memory
//! for the life of the process; passwords are kept only as salted SHA-256
//! digests.

use std::sync::{Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::domain::ports::{IdentityProvider, IdentityProviderError, SignUpOutcome};
use crate::domain::{ExternalIdentity, LoginCredentials, SignUpRequest, UserId};

const INVALID_CREDENTIALS: &str = "Invalid login credentials";
const ALREADY_REGISTERED: &str = "User already registered";
const NOT_CONFIRMED: &str = "Email not confirmed";

#[derive(Debug, Clone)]
struct LocalAccount {
    id: String,
    email: String,
    display_name: String,
    password_digest: String,
    confirmed: bool,
}

impl LocalAccount {
    fn identity(&self) -> ExternalIdentity {
        ExternalIdentity::new(self.id.clone())
            .with_email(self.email.clone())
            .with_display_name(self.display_name.clone())
    }
}

fn password_digest(account_id: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(account_id.as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Identity provider keeping accounts and the session in process memory.
///
/// With email confirmation required, sign-up leaves the account pending
/// until [`LocalIdentityProvider::confirm`] is called.
#[derive(Debug)]
pub struct LocalIdentityProvider {
    accounts: Mutex<Vec<LocalAccount>>,
    session: watch::Sender<Option<ExternalIdentity>>,
    require_confirmation: bool,
}

impl Default for LocalIdentityProvider {
    fn default() -> Self {
        Self::new(false)
    }
}

impl LocalIdentityProvider {
    /// Provider with no accounts and no session.
    pub fn new(require_confirmation: bool) -> Self {
        let (session, _) = watch::channel(None);
        Self {
            accounts: Mutex::new(Vec::new()),
            session,
            require_confirmation,
        }
    }

    fn accounts(&self) -> MutexGuard<'_, Vec<LocalAccount>> {
        self.accounts.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Mark the account for `email` as confirmed.
    pub fn confirm(&self, email: &str) -> Result<(), IdentityProviderError> {
        let mut accounts = self.accounts();
        let account = accounts
            .iter_mut()
            .find(|account| account.email.eq_ignore_ascii_case(email.trim()))
            .ok_or_else(|| IdentityProviderError::unknown_account(email.trim()))?;
        account.confirmed = true;
        info!(account_id = %account.id, "account confirmed");
        Ok(())
    }

    /// End the session out of band, as an expiry would.
    pub fn expire_session(&self) {
        if self.session.send_replace(None).is_some() {
            info!("local session expired");
        }
    }

    fn start_session(&self, identity: ExternalIdentity) {
        debug!(account_id = %identity.id, "local session started");
        self.session.send_replace(Some(identity));
    }
}

#[async_trait]
impl IdentityProvider for LocalIdentityProvider {
    async fn current_session(&self) -> Result<Option<ExternalIdentity>, IdentityProviderError> {
        Ok(self.session.borrow().clone())
    }

    fn subscribe(&self) -> watch::Receiver<Option<ExternalIdentity>> {
        self.session.subscribe()
    }

    async fn sign_up(
        &self,
        request: &SignUpRequest,
    ) -> Result<SignUpOutcome, IdentityProviderError> {
        let email = request.credentials().email();
        let account = {
            let mut accounts = self.accounts();
            if accounts
                .iter()
                .any(|account| account.email.eq_ignore_ascii_case(email))
            {
                return Err(IdentityProviderError::rejected(ALREADY_REGISTERED));
            }
            let id = UserId::random().to_string();
            let account = LocalAccount {
                password_digest: password_digest(&id, request.credentials().password()),
                id,
                email: email.to_owned(),
                display_name: request.display_name().to_string(),
                confirmed: !self.require_confirmation,
            };
            accounts.push(account.clone());
            account
        };
        info!(account_id = %account.id, "local account registered");

        if !account.confirmed {
            return Ok(SignUpOutcome::PendingConfirmation);
        }
        let identity = account.identity();
        self.start_session(identity.clone());
        Ok(SignUpOutcome::Active(identity))
    }

    async fn sign_in(
        &self,
        credentials: &LoginCredentials,
    ) -> Result<ExternalIdentity, IdentityProviderError> {
        let account = self
            .accounts()
            .iter()
            .find(|account| account.email.eq_ignore_ascii_case(credentials.email()))
            .cloned()
            .ok_or_else(|| IdentityProviderError::unknown_account(credentials.email()))?;
        if password_digest(&account.id, credentials.password()) != account.password_digest {
            return Err(IdentityProviderError::rejected(INVALID_CREDENTIALS));
        }
        if !account.confirmed {
            return Err(IdentityProviderError::rejected(NOT_CONFIRMED));
        }
        let identity = account.identity();
        self.start_session(identity.clone());
        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), IdentityProviderError> {
        self.session.send_replace(None);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::{fixture, rstest};

    #[fixture]
    fn ada() -> SignUpRequest {
        SignUpRequest::try_from_parts("ada@example.com", "lovelace", "Ada").expect("valid request")
    }

    fn credentials(email: &str, password: &str) -> LoginCredentials {
        LoginCredentials::try_from_parts(email, password).expect("valid credentials")
    }

    #[rstest]
    #[tokio::test]
    async fn sign_up_starts_a_session(ada: SignUpRequest) {
        let provider = LocalIdentityProvider::default();
        let mut identities = provider.subscribe();

        let SignUpOutcome::Active(identity) = provider.sign_up(&ada).await.expect("sign up") else {
            panic!("expected an active account");
        };

        assert_eq!(identity.display_name.as_deref(), Some("Ada"));
        assert_eq!(identity.email.as_deref(), Some("ada@example.com"));
        assert!(identities.has_changed().expect("sender alive"));
        assert_eq!(identities.borrow_and_update().clone(), Some(identity.clone()));
        assert_eq!(
            provider.current_session().await.expect("session"),
            Some(identity)
        );
    }

    #[rstest]
    #[tokio::test]
    async fn duplicate_emails_are_rejected(ada: SignUpRequest) {
        let provider = LocalIdentityProvider::default();
        provider.sign_up(&ada).await.expect("first sign up");
        let again = SignUpRequest::try_from_parts("ADA@example.com", "other", "Ada 2")
            .expect("valid request");

        let err = provider.sign_up(&again).await.expect_err("duplicate");
        assert_eq!(err, IdentityProviderError::rejected(ALREADY_REGISTERED));
    }

    #[rstest]
    #[tokio::test]
    async fn sign_in_checks_the_password(ada: SignUpRequest) {
        let provider = LocalIdentityProvider::default();
        provider.sign_up(&ada).await.expect("sign up");
        provider.sign_out().await.expect("sign out");

        let err = provider
            .sign_in(&credentials("ada@example.com", "wrong"))
            .await
            .expect_err("bad password");
        assert_eq!(err, IdentityProviderError::rejected(INVALID_CREDENTIALS));
        assert_eq!(provider.current_session().await.expect("session"), None);

        let identity = provider
            .sign_in(&credentials("Ada@Example.com", "lovelace"))
            .await
            .expect("sign in");
        assert_eq!(identity.display_name.as_deref(), Some("Ada"));
    }

    #[rstest]
    #[tokio::test]
    async fn unknown_emails_are_reported() {
        let provider = LocalIdentityProvider::default();
        let err = provider
            .sign_in(&credentials("nobody@example.com", "pw"))
            .await
            .expect_err("unknown");
        assert!(matches!(err, IdentityProviderError::UnknownAccount { .. }));
    }

    #[rstest]
    #[tokio::test]
    async fn confirmation_gates_sign_in(ada: SignUpRequest) {
        let provider = LocalIdentityProvider::new(true);

        let outcome = provider.sign_up(&ada).await.expect("sign up");
        assert_eq!(outcome, SignUpOutcome::PendingConfirmation);
        assert_eq!(provider.current_session().await.expect("session"), None);

        let err = provider
            .sign_in(&credentials("ada@example.com", "lovelace"))
            .await
            .expect_err("unconfirmed");
        assert_eq!(err, IdentityProviderError::rejected(NOT_CONFIRMED));

        provider.confirm("ada@example.com").expect("confirm");
        provider
            .sign_in(&credentials("ada@example.com", "lovelace"))
            .await
            .expect("sign in after confirmation");
    }

    #[rstest]
    #[tokio::test]
    async fn expiry_notifies_subscribers(ada: SignUpRequest) {
        let provider = LocalIdentityProvider::default();
        provider.sign_up(&ada).await.expect("sign up");
        let mut identities = provider.subscribe();
        drop(identities.borrow_and_update());

        provider.expire_session();

        assert!(identities.has_changed().expect("sender alive"));
        assert_eq!(identities.borrow_and_update().clone(), None);
    }

    #[rstest]
    fn digests_are_salted_by_account() {
        assert_ne!(password_digest("a", "pw"), password_digest("b", "pw"));
        assert_eq!(password_digest("a", "pw").len(), 64);
    }
}
