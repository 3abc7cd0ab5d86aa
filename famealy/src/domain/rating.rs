//! Rating aggregation over a meal's rating list.
//!
//! Everything here is pure: no clocks, no persistence. Callers inject the
//! write time for [`upsert_rating`].

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::meal::{Meal, MealRating, Score};
use super::user::{DisplayName, UserId};

/// Mean rating score rounded to one decimal place.
///
/// Stored as an integer count of tenths so that equal averages compare
/// equal and ordering is exact.
///
/// # Examples
/// ```
/// use famealy::domain::AverageScore;
///
/// let avg = AverageScore::from_tenths(47);
/// assert_eq!(avg.to_string(), "4.7");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(into = "f64")]
pub struct AverageScore(u32);

impl AverageScore {
    /// Average of a meal with no ratings.
    pub const UNRATED: Self = Self(0);

    /// Build an average from a count of tenths, e.g. `35` for `3.5`.
    pub const fn from_tenths(tenths: u32) -> Self {
        Self(tenths)
    }

    /// Number of tenths, e.g. `47` for `4.7`.
    pub const fn tenths(self) -> u32 {
        self.0
    }

    /// Whether this is the average of an empty rating list.
    pub const fn is_unrated(self) -> bool {
        self.0 == 0
    }

    /// Floating-point view of the average.
    pub fn as_f64(self) -> f64 {
        f64::from(self.0) / 10.0
    }
}

impl From<AverageScore> for f64 {
    fn from(value: AverageScore) -> Self {
        value.as_f64()
    }
}

impl fmt::Display for AverageScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.0.div_euclid(10), self.0.rem_euclid(10))
    }
}

/// Arithmetic mean of the scores, rounded half away from zero to one
/// decimal place. An empty list averages to zero.
///
/// # Examples
/// ```
/// use famealy::domain::{average_score, AverageScore};
///
/// assert_eq!(average_score(&[]), AverageScore::UNRATED);
/// ```
pub fn average_score(ratings: &[MealRating]) -> AverageScore {
    let Ok(count) = u64::try_from(ratings.len()) else {
        return AverageScore::UNRATED;
    };
    if count == 0 {
        return AverageScore::UNRATED;
    }
    let sum: u64 = ratings
        .iter()
        .map(|rating| u64::from(rating.score.value()))
        .sum();
    // Hundredths, truncated, then rounded to tenths. Scores are positive so
    // half-up and half-away-from-zero coincide.
    let hundredths = sum.saturating_mul(100).div_euclid(count);
    let tenths = hundredths.saturating_add(5).div_euclid(10);
    AverageScore(u32::try_from(tenths).unwrap_or(u32::MAX))
}

/// Insert or replace `user_id`'s rating on `meal`.
///
/// Returns a new meal whose ratings are the existing ones minus any entry
/// by `user_id`, followed by the new entry stamped with `at`. The comment
/// is trimmed; the input meal is untouched.
pub fn upsert_rating(
    meal: &Meal,
    user_id: &UserId,
    user_name: &DisplayName,
    score: Score,
    comment: &str,
    at: DateTime<Utc>,
) -> Meal {
    let mut ratings: Vec<MealRating> = meal
        .ratings()
        .iter()
        .filter(|rating| &rating.user_id != user_id)
        .cloned()
        .collect();
    ratings.push(MealRating {
        user_id: user_id.clone(),
        user_name: user_name.clone(),
        score,
        comment: comment.trim().to_owned(),
        timestamp: at,
    });
    meal.with_ratings(ratings)
}

/// Sort meals by ascending average; unrated meals come first.
///
/// The sort is stable, so meals with equal averages keep their input
/// order. Collections are stored in insertion order, which makes ties
/// resolve oldest first.
pub fn sort_by_average(mut meals: Vec<Meal>) -> Vec<Meal> {
    meals.sort_by_cached_key(|meal| average_score(meal.ratings()));
    meals
}
