//! Daily status reset.
//!
//! Once per local calendar day every known user's status goes back to
//! `Unset`. The decision ([`maybe_reset`]) is pure and takes "today" as an
//! input; [`DailyResetService`] reads the clock and commits the result.

use std::fmt;
use std::sync::Arc;

use chrono::NaiveDate;
use mockable::Clock;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use super::DomainError;
use super::ports::{ResetMarkerRepository, SessionUserRepository, UsersRepository};
use super::service_support::map_collection_error;
use super::user::{Status, User};

/// Locale-style date string recording the day of the last reset.
///
/// Markers compare by string equality, so the rollover happens whenever the
/// formatted local date changes.
///
/// # Examples
/// ```
/// use chrono::NaiveDate;
/// use famealy::domain::ResetMarker;
///
/// let day = NaiveDate::from_ymd_opt(2026, 3, 7).unwrap();
/// assert_eq!(ResetMarker::for_date(day).as_ref(), "3/7/2026");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ResetMarker(String);

impl ResetMarker {
    /// Marker for a calendar date, formatted `M/D/YYYY`.
    pub fn for_date(date: NaiveDate) -> Self {
        Self(date.format("%-m/%-d/%Y").to_string())
    }

    /// Wrap a marker read back from storage.
    pub fn from_stored(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }
}

impl AsRef<str> for ResetMarker {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for ResetMarker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

/// Writes a reset must commit, in order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResetPlan {
    /// Every roster entry with its status cleared.
    pub users: Vec<User>,
    /// The cached session user with its status cleared, if one exists.
    pub current_user: Option<User>,
    /// Marker to record once the users are written.
    pub marker: ResetMarker,
}

/// Decision taken by [`maybe_reset`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResetOutcome {
    /// A reset already ran today; nothing to write.
    UpToDate,
    /// A new day began; commit the plan.
    Reset(ResetPlan),
}

/// Decide whether statuses must be reset for `today`.
///
/// Idempotent per day: applying the returned plan and calling again with
/// the same `today` yields [`ResetOutcome::UpToDate`].
pub fn maybe_reset(
    all_users: &[User],
    current_user: Option<&User>,
    last_reset: Option<&ResetMarker>,
    today: &ResetMarker,
) -> ResetOutcome {
    if last_reset == Some(today) {
        return ResetOutcome::UpToDate;
    }
    let users = all_users
        .iter()
        .cloned()
        .map(|user| user.with_status(Status::Unset))
        .collect();
    ResetOutcome::Reset(ResetPlan {
        users,
        current_user: current_user.cloned().map(|user| user.with_status(Status::Unset)),
        marker: today.clone(),
    })
}

/// Repositories touched by the daily reset.
#[derive(Clone)]
pub struct DailyResetPorts {
    /// Roster whose statuses are cleared.
    pub users: Arc<dyn UsersRepository>,
    /// Cached session profile, cleared alongside the roster.
    pub session_user: Arc<dyn SessionUserRepository>,
    /// Date of the last completed reset.
    pub marker: Arc<dyn ResetMarkerRepository>,
}

/// Runs the daily reset against the persisted collections.
#[derive(Clone)]
pub struct DailyResetService {
    ports: DailyResetPorts,
    clock: Arc<dyn Clock>,
}

impl DailyResetService {
    /// Create the service over its repositories and clock.
    pub fn new(ports: DailyResetPorts, clock: Arc<dyn Clock>) -> Self {
        Self { ports, clock }
    }

    /// Reset statuses if the local date moved since the last run.
    ///
    /// Returns whether a reset happened. The roster and the session user
    /// are written before the marker, so an interrupted reset runs again
    /// on the next start.
    pub async fn run(&self) -> Result<bool, DomainError> {
        let today = ResetMarker::for_date(self.clock.local().date_naive());
        let last_reset = self
            .ports
            .marker
            .load()
            .await
            .map_err(map_collection_error)?;
        if last_reset.as_ref() == Some(&today) {
            debug!(%today, "daily reset already ran");
            return Ok(false);
        }

        let users = self
            .ports
            .users
            .load_all()
            .await
            .map_err(map_collection_error)?;
        let current_user = self
            .ports
            .session_user
            .load()
            .await
            .map_err(map_collection_error)?;

        let ResetOutcome::Reset(plan) =
            maybe_reset(&users, current_user.as_ref(), last_reset.as_ref(), &today)
        else {
            return Ok(false);
        };

        self.ports
            .users
            .replace_all(&plan.users)
            .await
            .map_err(map_collection_error)?;
        if let Some(user) = &plan.current_user {
            self.ports
                .session_user
                .save(user)
                .await
                .map_err(map_collection_error)?;
        }
        self.ports
            .marker
            .save(&plan.marker)
            .await
            .map_err(map_collection_error)?;

        info!(
            %today,
            previous = last_reset.as_ref().map(ResetMarker::as_ref),
            users = plan.users.len(),
            "daily status reset"
        );
        Ok(true)
    }
}
