//! Process-wide session state.
//!
//! [`SessionStore`] holds the authenticated user and publishes every
//! change as a [`SessionSnapshot`] on a watch channel, so whatever renders
//! the screens can react to out-of-band sign-outs. All profile mutations
//! go through [`SessionStore::update_user`], which keeps the cached session
//! user and its roster entry in step.

use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info};

use super::DomainError;
use super::auth::{LoginCredentials, SignUpRequest};
use super::family::Family;
use super::identity::{ExternalIdentity, cached_profile_for, resolve_user};
use super::ports::{IdentityProvider, SessionUserRepository, SignUpOutcome, UsersRepository};
use super::service_support::{map_collection_error, map_identity_error};
use super::user::{Status, User};

/// Message returned when sign-up needs the user to confirm their email.
pub const CONFIRM_EMAIL_MESSAGE: &str =
    "Check your email to confirm your account, then sign in.";

/// Authentication state of the session.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AuthState {
    user: Option<User>,
}

impl AuthState {
    /// Nobody signed in.
    pub fn signed_out() -> Self {
        Self { user: None }
    }

    /// `user` is signed in.
    pub fn signed_in(user: User) -> Self {
        Self { user: Some(user) }
    }

    /// The signed-in user, if any.
    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    /// Whether a user is signed in.
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }
}

/// Screen the UI should show.
///
/// `Loading` is left once the first identity is applied and never
/// re-entered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Screen {
    /// Start-up has not finished.
    Loading,
    /// Nobody is signed in.
    Unauthenticated,
    /// Signed in but not yet part of a family.
    Onboarding,
    /// Signed in and in a family.
    Main,
}

/// Session state published to subscribers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSnapshot {
    screen: Screen,
    auth: AuthState,
}

impl SessionSnapshot {
    fn loading() -> Self {
        Self {
            screen: Screen::Loading,
            auth: AuthState::signed_out(),
        }
    }

    fn from_auth(auth: AuthState) -> Self {
        let screen = match auth.user() {
            None => Screen::Unauthenticated,
            Some(user) if user.has_family() => Screen::Main,
            Some(_) => Screen::Onboarding,
        };
        Self { screen, auth }
    }

    /// Screen derived from the auth state.
    pub fn screen(&self) -> Screen {
        self.screen
    }

    /// Current authentication state.
    pub fn auth(&self) -> &AuthState {
        &self.auth
    }

    /// The signed-in user, if any.
    pub fn user(&self) -> Option<&User> {
        self.auth.user()
    }
}

/// Collaborators of the session store.
#[derive(Clone)]
pub struct SessionPorts {
    /// Global roster, upserted on every profile change.
    pub users: Arc<dyn UsersRepository>,
    /// Cached profile of the signed-in user.
    pub session_user: Arc<dyn SessionUserRepository>,
    /// Provider that owns sign-in state.
    pub identity: Arc<dyn IdentityProvider>,
}

/// Owner of the authenticated session.
///
/// Cloning yields another handle to the same session.
#[derive(Clone)]
pub struct SessionStore {
    ports: SessionPorts,
    state: Arc<watch::Sender<SessionSnapshot>>,
}

impl SessionStore {
    /// Create a store in the `Loading` state.
    pub fn new(ports: SessionPorts) -> Self {
        let (state, _) = watch::channel(SessionSnapshot::loading());
        Self {
            ports,
            state: Arc::new(state),
        }
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.state.borrow().clone()
    }

    /// The signed-in user, if any.
    pub fn current_user(&self) -> Option<User> {
        self.state.borrow().user().cloned()
    }

    /// Follow session changes.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.state.subscribe()
    }

    fn publish(&self, auth: AuthState) -> SessionSnapshot {
        let snapshot = SessionSnapshot::from_auth(auth);
        self.state.send_replace(snapshot.clone());
        snapshot
    }

    /// Resolve the provider's current session and leave `Loading`.
    pub async fn start(&self) -> Result<SessionSnapshot, DomainError> {
        let identity = self
            .ports
            .identity
            .current_session()
            .await
            .map_err(map_identity_error)?;
        self.apply_identity(identity).await?;
        Ok(self.snapshot())
    }

    /// Re-derive the session from the latest identity.
    ///
    /// A missing or ambiguous identity signs the session out and discards
    /// the cached user. Otherwise the identity is merged with the cached
    /// profile, logged in, and upserted into the roster. Applying the same
    /// identity twice leaves the same state.
    pub async fn apply_identity(
        &self,
        latest: Option<ExternalIdentity>,
    ) -> Result<Option<User>, DomainError> {
        let Some((identity, id)) =
            latest.and_then(|candidate| candidate.user_id().map(|id| (candidate, id)))
        else {
            self.clear_session().await?;
            return Ok(None);
        };

        let session_user = self
            .ports
            .session_user
            .load()
            .await
            .map_err(map_collection_error)?;
        let mut roster = self
            .ports
            .users
            .load_all()
            .await
            .map_err(map_collection_error)?;
        let cached = cached_profile_for(&id, session_user, &roster);
        let Some(user) = resolve_user(&identity, cached.as_ref()) else {
            self.clear_session().await?;
            return Ok(None);
        };

        self.login(user.clone()).await?;
        match roster.iter_mut().find(|entry| entry.id() == user.id()) {
            Some(entry) if *entry == user => {}
            Some(entry) => {
                *entry = user.clone();
                self.write_roster(&roster).await?;
            }
            None => {
                roster.push(user.clone());
                self.write_roster(&roster).await?;
            }
        }
        Ok(Some(user))
    }

    async fn write_roster(&self, roster: &[User]) -> Result<(), DomainError> {
        self.ports
            .users
            .replace_all(roster)
            .await
            .map_err(map_collection_error)
    }

    /// Make `user` the signed-in user and persist it as the session user.
    pub async fn login(&self, user: User) -> Result<(), DomainError> {
        self.ports
            .session_user
            .save(&user)
            .await
            .map_err(map_collection_error)?;
        info!(user_id = %user.id(), "session signed in");
        self.publish(AuthState::signed_in(user));
        Ok(())
    }

    /// Sign out at the provider, then drop the session.
    pub async fn logout(&self) -> Result<(), DomainError> {
        self.ports
            .identity
            .sign_out()
            .await
            .map_err(map_identity_error)?;
        self.clear_session().await
    }

    async fn clear_session(&self) -> Result<(), DomainError> {
        self.ports
            .session_user
            .clear()
            .await
            .map_err(map_collection_error)?;
        if self.state.borrow().auth().is_authenticated() {
            info!("session signed out");
        } else {
            debug!("no identity; session stays signed out");
        }
        self.publish(AuthState::signed_out());
        Ok(())
    }

    /// Replace the signed-in user.
    ///
    /// Persists the session user and replaces the roster entry with the
    /// same id; other roster entries are untouched. Fails with
    /// `Unauthorized` when nobody is signed in and `InvalidRequest` when
    /// `updated` is somebody else.
    pub async fn update_user(&self, updated: User) -> Result<(), DomainError> {
        let Some(current) = self.current_user() else {
            return Err(DomainError::unauthorized("sign in before updating your profile"));
        };
        if current.id() != updated.id() {
            return Err(DomainError::invalid_request(
                "cannot update a user other than the signed-in one",
            ));
        }

        self.ports
            .session_user
            .save(&updated)
            .await
            .map_err(map_collection_error)?;
        let mut roster = self
            .ports
            .users
            .load_all()
            .await
            .map_err(map_collection_error)?;
        if let Some(entry) = roster.iter_mut().find(|entry| entry.id() == updated.id()) {
            *entry = updated.clone();
            self.write_roster(&roster).await?;
        }

        debug!(user_id = %updated.id(), status = ?updated.current_status(), "user updated");
        self.publish(AuthState::signed_in(updated));
        Ok(())
    }

    /// Set today's status of the signed-in user.
    pub async fn set_status(&self, status: Status) -> Result<User, DomainError> {
        let user = self
            .current_user()
            .ok_or_else(|| DomainError::unauthorized("sign in before setting a status"))?
            .with_status(status);
        self.update_user(user.clone()).await?;
        Ok(user)
    }

    /// Put the signed-in user into `family`.
    pub async fn assign_family(&self, family: &Family) -> Result<User, DomainError> {
        let user = self
            .current_user()
            .ok_or_else(|| DomainError::unauthorized("sign in before joining a family"))?
            .with_family(family.id().clone());
        self.update_user(user.clone()).await?;
        info!(user_id = %user.id(), family_id = %family.id(), "joined family");
        Ok(user)
    }

    /// Register an account and sign in as it.
    ///
    /// When the provider needs the email confirmed first, no session user
    /// is created and `Unconfirmed` is returned.
    pub async fn sign_up(&self, request: &SignUpRequest) -> Result<User, DomainError> {
        let outcome = self
            .ports
            .identity
            .sign_up(request)
            .await
            .map_err(map_identity_error)?;
        let mut identity = match outcome {
            SignUpOutcome::Active(identity) => identity,
            SignUpOutcome::PendingConfirmation => {
                info!(email = request.credentials().email(), "sign-up awaits confirmation");
                return Err(DomainError::unconfirmed(CONFIRM_EMAIL_MESSAGE));
            }
        };
        if identity.display_name.is_none() {
            identity.display_name = Some(request.display_name().to_string());
        }
        self.sign_in_as(identity).await
    }

    /// Authenticate and sign in.
    pub async fn sign_in(&self, credentials: &LoginCredentials) -> Result<User, DomainError> {
        let identity = self
            .ports
            .identity
            .sign_in(credentials)
            .await
            .map_err(map_identity_error)?;
        self.sign_in_as(identity).await
    }

    async fn sign_in_as(&self, identity: ExternalIdentity) -> Result<User, DomainError> {
        self.apply_identity(Some(identity))
            .await?
            .ok_or_else(|| {
                DomainError::unauthorized("identity provider returned an empty identity")
            })
    }
}
