//! Shared test doubles for domain service tests.

use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Local, TimeDelta, TimeZone, Utc};
use mockable::Clock;

use crate::domain::ports::{CollectionError, SessionUserRepository, UsersRepository};
use crate::domain::{DisplayName, FamilyId, User, UserId};

/// Clock that only moves when a test tells it to.
pub struct MutableClock(Mutex<DateTime<Utc>>);

impl MutableClock {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self(Mutex::new(now))
    }

    /// Noon UTC on 2026-10-19, so the local date is stable for any
    /// timezone within twelve hours of UTC.
    pub fn fixture() -> Self {
        Self::new(fixture_timestamp())
    }

    pub fn advance_days(&self, days: i64) {
        *self.lock_clock() += TimeDelta::days(days);
    }

    pub fn advance_seconds(&self, seconds: i64) {
        *self.lock_clock() += TimeDelta::seconds(seconds);
    }

    fn lock_clock(&self) -> std::sync::MutexGuard<'_, DateTime<Utc>> {
        match self.0.lock() {
            Ok(guard) => guard,
            Err(_) => panic!("clock mutex"),
        }
    }
}

impl Clock for MutableClock {
    fn local(&self) -> DateTime<Local> {
        self.utc().with_timezone(&Local)
    }

    fn utc(&self) -> DateTime<Utc> {
        *self.lock_clock()
    }
}

pub fn fixture_timestamp() -> DateTime<Utc> {
    match Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).single() {
        Some(timestamp) => timestamp,
        None => panic!("fixture timestamp must be valid"),
    }
}

/// Build a user with the given id and name, optionally in a family.
pub fn user(id: &str, name: &str, family: Option<&str>) -> User {
    let family_id = family.map(|raw| FamilyId::new(raw).expect("family id"));
    User::new(
        UserId::new(id).expect("user id"),
        DisplayName::new(name).expect("display name"),
        format!("{id}@example.com"),
    )
    .with_optional_family(family_id)
}

/// Roster and session-user collections held in memory.
#[derive(Default)]
pub struct MemoryUsers {
    roster: Mutex<Vec<User>>,
    session: Mutex<Option<User>>,
}

impl MemoryUsers {
    pub fn with(roster: Vec<User>, session: Option<User>) -> Self {
        Self {
            roster: Mutex::new(roster),
            session: Mutex::new(session),
        }
    }

    pub fn roster(&self) -> Vec<User> {
        self.roster.lock().expect("roster mutex").clone()
    }

    pub fn session(&self) -> Option<User> {
        self.session.lock().expect("session mutex").clone()
    }
}

#[async_trait]
impl UsersRepository for MemoryUsers {
    async fn load_all(&self) -> Result<Vec<User>, CollectionError> {
        Ok(self.roster())
    }

    async fn replace_all(&self, users: &[User]) -> Result<(), CollectionError> {
        *self.roster.lock().expect("roster mutex") = users.to_vec();
        Ok(())
    }
}

#[async_trait]
impl SessionUserRepository for MemoryUsers {
    async fn load(&self) -> Result<Option<User>, CollectionError> {
        Ok(self.session())
    }

    async fn save(&self, user: &User) -> Result<(), CollectionError> {
        *self.session.lock().expect("session mutex") = Some(user.clone());
        Ok(())
    }

    async fn clear(&self) -> Result<(), CollectionError> {
        *self.session.lock().expect("session mutex") = None;
        Ok(())
    }
}
