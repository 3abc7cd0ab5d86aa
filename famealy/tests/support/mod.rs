//! Harness shared by the integration suites.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use famealy::domain::ports::{
    FamilyRepository, MealRepository, ResetMarkerRepository, SessionUserRepository,
    UsersRepository,
};
use famealy::domain::{LoginCredentials, SignUpRequest};
use famealy::outbound::identity::LocalIdentityProvider;
use famealy::{Famealy, FamealyPorts};
use mockable::Clock;
use tokio::runtime::Runtime;

/// Clock pinned to noon UTC, `days` after 2026-10-19.
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    pub fn days_after_fixture(days: i64) -> Arc<Self> {
        let base = Utc
            .with_ymd_and_hms(2026, 10, 19, 12, 0, 0)
            .single()
            .expect("fixture timestamp");
        Arc::new(Self(base + TimeDelta::days(days)))
    }
}

impl Clock for FixedClock {
    fn local(&self) -> DateTime<Local> {
        self.0.with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        self.0
    }
}

/// A started application plus the runtime and provider behind it.
///
/// Step functions are synchronous, so every async call goes through
/// [`Household::run`].
pub struct Household {
    pub app: Famealy,
    pub provider: Arc<LocalIdentityProvider>,
    /// Runtime the application was started on; also drives shutdown.
    pub runtime: Runtime,
}

impl Household {
    /// Start the application over `collections` on a fresh runtime.
    pub fn start<C>(
        collections: Arc<C>,
        clock: Arc<FixedClock>,
        identity: LocalIdentityProvider,
    ) -> Self
    where
        C: UsersRepository
            + SessionUserRepository
            + FamilyRepository
            + MealRepository
            + ResetMarkerRepository
            + 'static,
    {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .expect("test runtime");
        let provider = Arc::new(identity);
        let ports = FamealyPorts::from_collections(collections, provider.clone());
        let app = runtime
            .block_on(Famealy::start(ports, clock, Duration::from_secs(3)))
            .expect("application starts");
        Self {
            app,
            provider,
            runtime,
        }
    }

    pub fn run<F: Future>(&self, future: F) -> F::Output {
        self.runtime.block_on(future)
    }

    /// Let the identity subscription catch up with the provider.
    pub fn settle(&self) {
        self.run(tokio::task::yield_now());
    }

    /// Register `name` and leave them signed in.
    pub fn sign_up(&self, email: &str, name: &str) {
        let request =
            SignUpRequest::try_from_parts(email, "correct horse", name).expect("sign-up request");
        self.run(self.app.session().sign_up(&request))
            .expect("sign up succeeds");
        self.settle();
    }

    /// Sign back in as a previously registered account.
    pub fn sign_in(&self, email: &str) {
        let credentials =
            LoginCredentials::try_from_parts(email, "correct horse").expect("credentials");
        self.run(self.app.session().sign_in(&credentials))
            .expect("sign in succeeds");
        self.settle();
    }

    pub fn sign_out(&self) {
        self.run(self.app.session().logout()).expect("logout succeeds");
        self.settle();
    }
}
