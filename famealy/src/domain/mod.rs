//! Domain primitives, aggregates, and services.
//!
//! Purpose: model the household state layer (users, families, meals) and
//! the operations screens drive against it. Types are immutable value
//! objects; services talk to storage and the identity provider only
//! through the traits in [`ports`].
//!
//! Public surface:
//! - DomainError / ErrorCode — transport-agnostic failure payload.
//! - User, Family, Meal and their value objects.
//! - Pure functions: `average_score`, `upsert_rating`, `sort_by_average`,
//!   `maybe_reset`, `resolve_user`.
//! - Services: `DailyResetService`, `FamilyDirectoryService`,
//!   `MealBookService`, `SessionStore`, `PresencePoller`.

pub mod auth;
pub mod daily_reset;
pub mod error;
pub mod family;
pub mod family_directory;
pub mod identity;
pub mod meal;
pub mod meal_book;
pub mod ports;
pub mod presence_poll;
pub mod rating;
pub mod session;
pub mod user;

mod service_support;

pub use self::auth::{LoginCredentials, LoginValidationError, SIGN_UP_NAME_MAX, SignUpRequest};
pub use self::daily_reset::{
    DailyResetPorts, DailyResetService, ResetMarker, ResetOutcome, ResetPlan, maybe_reset,
};
pub use self::error::{DomainError, ErrorCode};
pub use self::family::{Family, FamilyId, FamilyName, FamilyValidationError, InviteCode};
pub use self::family_directory::{FamilyDirectoryService, InviteCodeSource, RandomInviteCodes};
pub use self::identity::{ExternalIdentity, cached_profile_for, resolve_user};
pub use self::meal::{Meal, MealId, MealName, MealRating, MealValidationError, Score};
pub use self::meal_book::MealBookService;
pub use self::presence_poll::{DEFAULT_POLL_INTERVAL, PresencePoll, PresencePoller};
pub use self::rating::{AverageScore, average_score, sort_by_average, upsert_rating};
pub use self::service_support::UNKNOWN_ACCOUNT_MESSAGE;
pub use self::session::{AuthState, Screen, SessionPorts, SessionSnapshot, SessionStore};
pub use self::user::{DisplayName, Status, User, UserId, UserValidationError};
