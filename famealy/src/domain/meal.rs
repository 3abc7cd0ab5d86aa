//! Shared meals and the ratings family members leave on them.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use super::family::FamilyId;
use super::user::{DisplayName, UserId};

/// Lowest accepted rating score.
pub const SCORE_MIN: u8 = 1;
/// Highest accepted rating score.
pub const SCORE_MAX: u8 = 5;

/// Validation errors returned by the meal value-object constructors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MealValidationError {
    /// Identifier is empty after trimming whitespace.
    #[error("meal id must not be empty")]
    EmptyId,
    /// Name is empty after trimming whitespace.
    #[error("meal name must not be empty")]
    EmptyName,
    /// Score lies outside `1..=5`.
    #[error("score must be between 1 and 5, got {score}")]
    ScoreOutOfRange {
        /// The rejected score.
        score: i64,
    },
}

/// Stable meal identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MealId(String);

impl MealId {
    /// Validate and construct a [`MealId`].
    pub fn new(id: impl AsRef<str>) -> Result<Self, MealValidationError> {
        let raw = id.as_ref();
        if raw.trim().is_empty() {
            return Err(MealValidationError::EmptyId);
        }
        Ok(Self(raw.to_owned()))
    }

    /// Generate a new random [`MealId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl AsRef<str> for MealId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for MealId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<MealId> for String {
    fn from(value: MealId) -> Self {
        value.0
    }
}

impl TryFrom<String> for MealId {
    type Error = MealValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Meal name; trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct MealName(String);

impl MealName {
    /// Validate and construct a [`MealName`].
    pub fn new(name: impl AsRef<str>) -> Result<Self, MealValidationError> {
        let trimmed = name.as_ref().trim();
        if trimmed.is_empty() {
            return Err(MealValidationError::EmptyName);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for MealName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for MealName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<MealName> for String {
    fn from(value: MealName) -> Self {
        value.0
    }
}

impl TryFrom<String> for MealName {
    type Error = MealValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A rating score in `1..=5`.
///
/// # Examples
/// ```
/// use famealy::domain::Score;
///
/// let score = Score::new(5).unwrap();
/// assert_eq!(score.label(), "Love it, remake it");
/// assert!(Score::new(6).is_err());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Score(u8);

impl Score {
    /// Validate a raw score.
    pub fn new(score: i64) -> Result<Self, MealValidationError> {
        u8::try_from(score)
            .ok()
            .filter(|value| (SCORE_MIN..=SCORE_MAX).contains(value))
            .map(Self)
            .ok_or(MealValidationError::ScoreOutOfRange { score })
    }

    /// Numeric value of the score.
    pub fn value(self) -> u8 {
        self.0
    }

    /// Human label shown next to the score.
    pub fn label(self) -> &'static str {
        match self.0 {
            1 => "I hate it, never again",
            2 => "Don't like",
            3 => "It's okay",
            4 => "I like it",
            _ => "Love it, remake it",
        }
    }
}

impl From<Score> for u8 {
    fn from(value: Score) -> Self {
        value.0
    }
}

impl TryFrom<i64> for Score {
    type Error = MealValidationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One family member's rating of a meal.
///
/// At most one rating per user exists on a meal; see
/// [`upsert_rating`](super::rating::upsert_rating).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MealRating {
    /// Member who rated the meal.
    pub user_id: UserId,
    /// Rater's display name at the time of rating.
    pub user_name: DisplayName,
    /// Score from 1 to 5.
    pub score: Score,
    /// Trimmed free text; may be empty.
    #[serde(default)]
    pub comment: String,
    /// Time of the last write.
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
}

/// A meal owned by one family.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meal {
    id: MealId,
    family_id: FamilyId,
    name: MealName,
    #[serde(default)]
    ratings: Vec<MealRating>,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    created_at: DateTime<Utc>,
}

impl Meal {
    /// A new, unrated meal.
    pub fn new(id: MealId, family_id: FamilyId, name: MealName, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            family_id,
            name,
            ratings: Vec::new(),
            created_at,
        }
    }

    /// Stable meal identifier.
    pub fn id(&self) -> &MealId {
        &self.id
    }

    /// Owning family; never changes.
    pub fn family_id(&self) -> &FamilyId {
        &self.family_id
    }

    /// Meal name.
    pub fn name(&self) -> &MealName {
        &self.name
    }

    /// Ratings left by family members.
    pub fn ratings(&self) -> &[MealRating] {
        &self.ratings
    }

    /// Creation time.
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Rating left by `user_id`, if any.
    pub fn rating_by(&self, user_id: &UserId) -> Option<&MealRating> {
        self.ratings.iter().find(|rating| &rating.user_id == user_id)
    }

    /// Copy of the meal with a replaced rating list.
    #[must_use]
    pub(crate) fn with_ratings(&self, ratings: Vec<MealRating>) -> Self {
        Self {
            ratings,
            ..self.clone()
        }
    }
}
