//! Application wiring and start-up.
//!
//! Start-up runs the daily reset, resolves the provider's current session,
//! then follows identity changes for the rest of the process. The order
//! matters: the reset commits before anything reads the user collections.

use std::sync::Arc;
use std::time::Duration;

use mockable::{Clock, DefaultClock};
use thiserror::Error;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use crate::config::FamealySettings;
use crate::domain::ports::{
    FamilyRepository, IdentityProvider, MealRepository, ResetMarkerRepository,
    SessionUserRepository, UsersRepository,
};
use crate::domain::{
    DailyResetPorts, DailyResetService, DomainError, ExternalIdentity, FamilyDirectoryService,
    MealBookService, PresencePoller, RandomInviteCodes, SessionPorts, SessionStore,
};
use crate::outbound::identity::LocalIdentityProvider;
use crate::outbound::kv::{FileBlobStore, FileStoreError};
use crate::outbound::persistence::JsonCollections;

/// Install the global tracing subscriber.
///
/// Filtering follows `RUST_LOG`. A subscriber that is already installed is
/// left in place and reported as a warning.
pub fn init_tracing(json: bool) {
    let builder = fmt().with_env_filter(EnvFilter::from_default_env());
    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    if let Err(e) = installed {
        warn!(error = %e, "tracing init failed");
    }
}

/// Failures that stop the application from starting.
#[derive(Debug, Error)]
pub enum StartupError {
    /// The data directory could not be opened.
    #[error(transparent)]
    Storage(#[from] FileStoreError),
    /// A start-up step failed.
    #[error("start-up failed: {0}")]
    Domain(#[from] DomainError),
}

/// Every driven port the application needs.
#[derive(Clone)]
pub struct FamealyPorts {
    /// Global roster of users.
    pub users: Arc<dyn UsersRepository>,
    /// Cached profile of the signed-in user.
    pub session_user: Arc<dyn SessionUserRepository>,
    /// All families.
    pub families: Arc<dyn FamilyRepository>,
    /// All meals across families.
    pub meals: Arc<dyn MealRepository>,
    /// Date of the last daily reset.
    pub reset_marker: Arc<dyn ResetMarkerRepository>,
    /// External identity provider.
    pub identity: Arc<dyn IdentityProvider>,
}

impl FamealyPorts {
    /// Serve every collection port from one repository value.
    pub fn from_collections<C>(collections: Arc<C>, identity: Arc<dyn IdentityProvider>) -> Self
    where
        C: UsersRepository
            + SessionUserRepository
            + FamilyRepository
            + MealRepository
            + ResetMarkerRepository
            + 'static,
    {
        Self {
            users: collections.clone(),
            session_user: collections.clone(),
            families: collections.clone(),
            meals: collections.clone(),
            reset_marker: collections,
            identity,
        }
    }
}

/// A started application: services plus the identity subscription.
///
/// Dropping the value detaches the subscription; [`Famealy::shutdown`]
/// does the same and waits for the task to end.
pub struct Famealy {
    session: SessionStore,
    families: FamilyDirectoryService,
    meals: MealBookService,
    presence: PresencePoller,
    identity_task: Option<JoinHandle<()>>,
}

impl Famealy {
    /// Start against the file store and local identity provider described
    /// by `settings`.
    pub async fn open(settings: &FamealySettings) -> Result<Self, StartupError> {
        let store = FileBlobStore::open(&settings.data_dir())?;
        info!(data_dir = %store.root(), "using file blob store");
        let identity = Arc::new(LocalIdentityProvider::new(
            settings.require_email_confirmation,
        ));
        let ports = FamealyPorts::from_collections(Arc::new(JsonCollections::new(store)), identity);
        Self::start(ports, Arc::new(DefaultClock), settings.poll_interval())
            .await
            .map_err(StartupError::from)
    }

    /// Run the start-up sequence and begin following identity changes.
    pub async fn start(
        ports: FamealyPorts,
        clock: Arc<dyn Clock>,
        poll_interval: Duration,
    ) -> Result<Self, DomainError> {
        let reset = DailyResetService::new(
            DailyResetPorts {
                users: ports.users.clone(),
                session_user: ports.session_user.clone(),
                marker: ports.reset_marker.clone(),
            },
            clock.clone(),
        );
        reset.run().await?;

        let session = SessionStore::new(SessionPorts {
            users: ports.users.clone(),
            session_user: ports.session_user.clone(),
            identity: ports.identity.clone(),
        });
        // Subscribe before reading the current session so no change is missed.
        let identities = ports.identity.subscribe();
        let snapshot = session.start().await?;
        info!(screen = ?snapshot.screen(), "session started");

        let families = FamilyDirectoryService::new(
            ports.families.clone(),
            ports.users.clone(),
            Arc::new(RandomInviteCodes),
        );
        let meals = MealBookService::new(ports.meals.clone(), clock);
        let presence = PresencePoller::new(families.clone(), poll_interval);
        let identity_task = tokio::spawn(follow_identity(session.clone(), identities));

        Ok(Self {
            session,
            families,
            meals,
            presence,
            identity_task: Some(identity_task),
        })
    }

    /// Session state and profile operations.
    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    /// Family create/join/lookup.
    pub fn families(&self) -> &FamilyDirectoryService {
        &self.families
    }

    /// Meal listing and rating.
    pub fn meals(&self) -> &MealBookService {
        &self.meals
    }

    /// Member status polling for the dashboard.
    pub fn presence(&self) -> &PresencePoller {
        &self.presence
    }

    /// Detach the identity subscription and wait for it to stop.
    pub async fn shutdown(mut self) {
        if let Some(task) = self.identity_task.take() {
            task.abort();
            match task.await {
                Err(error) if !error.is_cancelled() => {
                    warn!(%error, "identity subscription ended abnormally");
                }
                _ => {}
            }
        }
        info!("famealy shut down");
    }
}

impl Drop for Famealy {
    fn drop(&mut self) {
        if let Some(task) = self.identity_task.take() {
            task.abort();
        }
    }
}

async fn follow_identity(
    session: SessionStore,
    mut identities: watch::Receiver<Option<ExternalIdentity>>,
) {
    while identities.changed().await.is_ok() {
        let latest = identities.borrow_and_update().clone();
        debug!(signed_in = latest.is_some(), "identity changed");
        if let Err(error) = session.apply_identity(latest).await {
            warn!(%error, "failed to apply identity change");
        }
    }
    debug!("identity provider closed its subscription");
}
