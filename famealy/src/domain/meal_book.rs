//! Meal collection access for one family: list, add, rate, delete.
//!
//! Meals for every family live in one shared collection. Each operation
//! reads the whole collection, filters or edits by family, and writes the
//! whole collection back; concurrent writers race and the later one wins.

use std::sync::Arc;

use mockable::Clock;
use serde_json::json;
use tracing::{debug, info};

use super::DomainError;
use super::family::FamilyId;
use super::meal::{Meal, MealId, MealName, Score};
use super::ports::MealRepository;
use super::rating::{sort_by_average, upsert_rating};
use super::service_support::map_collection_error;
use super::user::User;

/// Family-scoped operations over the shared meal collection.
#[derive(Clone)]
pub struct MealBookService {
    meals: Arc<dyn MealRepository>,
    clock: Arc<dyn Clock>,
}

impl MealBookService {
    /// Create the service over the meal collection.
    pub fn new(meals: Arc<dyn MealRepository>, clock: Arc<dyn Clock>) -> Self {
        Self { meals, clock }
    }

    async fn load(&self) -> Result<Vec<Meal>, DomainError> {
        self.meals.load_all().await.map_err(map_collection_error)
    }

    async fn store(&self, meals: &[Meal]) -> Result<(), DomainError> {
        self.meals
            .replace_all(meals)
            .await
            .map_err(map_collection_error)
    }

    /// The family's meals, lowest average first.
    pub async fn list_for_family(&self, family_id: &FamilyId) -> Result<Vec<Meal>, DomainError> {
        let meals: Vec<Meal> = self
            .load()
            .await?
            .into_iter()
            .filter(|meal| meal.family_id() == family_id)
            .collect();
        debug!(%family_id, count = meals.len(), "listed meals");
        Ok(sort_by_average(meals))
    }

    /// Add an unrated meal to the family's book.
    pub async fn add_meal(&self, family_id: &FamilyId, name: &str) -> Result<Meal, DomainError> {
        let meal_name = MealName::new(name).map_err(|err| {
            DomainError::invalid_request(err.to_string()).with_details(json!({ "field": "name" }))
        })?;
        let meal = Meal::new(MealId::random(), family_id.clone(), meal_name, self.clock.utc());
        let mut meals = self.load().await?;
        meals.push(meal.clone());
        self.store(&meals).await?;
        info!(%family_id, meal_id = %meal.id(), "meal added");
        Ok(meal)
    }

    /// Record `rater`'s score and comment on a meal, replacing their
    /// previous rating.
    ///
    /// Scores outside `1..=5` fail with `InvalidRequest` before anything is
    /// read. A meal outside `family_id` is reported as `NotFound`.
    pub async fn rate_meal(
        &self,
        family_id: &FamilyId,
        meal_id: &MealId,
        rater: &User,
        score: i64,
        comment: &str,
    ) -> Result<Meal, DomainError> {
        let validated = Score::new(score).map_err(|err| {
            DomainError::invalid_request(err.to_string()).with_details(json!({ "field": "score" }))
        })?;
        let mut meals = self.load().await?;
        let slot = meals
            .iter_mut()
            .find(|meal| meal.id() == meal_id && meal.family_id() == family_id)
            .ok_or_else(|| meal_not_found(meal_id))?;
        let rated = upsert_rating(
            slot,
            rater.id(),
            rater.name(),
            validated,
            comment,
            self.clock.utc(),
        );
        *slot = rated.clone();
        self.store(&meals).await?;
        info!(%meal_id, user_id = %rater.id(), score = validated.value(), "meal rated");
        Ok(rated)
    }

    /// Permanently remove a meal from the family's book.
    pub async fn delete_meal(
        &self,
        family_id: &FamilyId,
        meal_id: &MealId,
    ) -> Result<(), DomainError> {
        let meals = self.load().await?;
        let before = meals.len();
        let remaining: Vec<Meal> = meals
            .into_iter()
            .filter(|meal| !(meal.id() == meal_id && meal.family_id() == family_id))
            .collect();
        if remaining.len() == before {
            return Err(meal_not_found(meal_id));
        }
        self.store(&remaining).await?;
        info!(%family_id, %meal_id, "meal deleted");
        Ok(())
    }
}

fn meal_not_found(meal_id: &MealId) -> DomainError {
    DomainError::not_found("meal not found").with_details(json!({ "mealId": meal_id.as_ref() }))
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::ErrorCode;
    use crate::domain::ports::MockMealRepository;
    use crate::test_support::{MutableClock, fixture_timestamp, user};
    use rstest::{fixture, rstest};

    fn family(id: &str) -> FamilyId {
        FamilyId::new(id).expect("family id")
    }

    fn meal(id: &str, family_id: &str) -> Meal {
        Meal::new(
            MealId::new(id).expect("meal id"),
            family(family_id),
            MealName::new(id).expect("meal name"),
            fixture_timestamp(),
        )
    }

    fn book(meals: MockMealRepository) -> MealBookService {
        MealBookService::new(Arc::new(meals), Arc::new(MutableClock::fixture()))
    }

    #[fixture]
    fn alice() -> User {
        user("u1", "Alice", Some("f1"))
    }

    #[tokio::test]
    async fn list_filters_by_family() {
        let mut meals = MockMealRepository::new();
        meals.expect_load_all().return_once(|| {
            Ok(vec![meal("tacos", "f1"), meal("soup", "f2"), meal("pie", "f1")])
        });

        let listed = book(meals)
            .list_for_family(&family("f1"))
            .await
            .expect("listing");
        let ids: Vec<&str> = listed.iter().map(|m| m.id().as_ref()).collect();
        assert_eq!(ids, ["tacos", "pie"]);
    }

    #[tokio::test]
    async fn add_meal_appends_unrated_meal_stamped_now() {
        let mut meals = MockMealRepository::new();
        meals
            .expect_load_all()
            .return_once(|| Ok(vec![meal("soup", "f1")]));
        meals
            .expect_replace_all()
            .withf(|all| all.len() == 2 && all.last().is_some_and(|m| m.name().as_ref() == "Tacos"))
            .times(1)
            .returning(|_| Ok(()));

        let added = book(meals)
            .add_meal(&family("f1"), " Tacos ")
            .await
            .expect("meal added");
        assert!(added.ratings().is_empty());
        assert_eq!(added.created_at(), fixture_timestamp());
        assert_eq!(added.family_id(), &family("f1"));
    }

    #[tokio::test]
    async fn add_meal_rejects_blank_names() {
        let mut meals = MockMealRepository::new();
        meals.expect_load_all().never();
        let err = book(meals)
            .add_meal(&family("f1"), "  ")
            .await
            .expect_err("blank name");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[tokio::test]
    async fn rate_meal_upserts_and_persists(alice: User) {
        let mut meals = MockMealRepository::new();
        meals
            .expect_load_all()
            .return_once(|| Ok(vec![meal("tacos", "f1")]));
        meals
            .expect_replace_all()
            .withf(|all| {
                all.first()
                    .and_then(|m| m.ratings().first())
                    .is_some_and(|r| r.score.value() == 4 && r.comment == "crispy")
            })
            .times(1)
            .returning(|_| Ok(()));

        let rated = book(meals)
            .rate_meal(
                &family("f1"),
                &MealId::new("tacos").expect("id"),
                &alice,
                4,
                " crispy ",
            )
            .await
            .expect("meal rated");
        assert_eq!(rated.ratings().len(), 1);
        assert_eq!(
            rated.rating_by(alice.id()).map(|r| r.user_name.to_string()),
            Some("Alice".to_owned())
        );
    }

    #[rstest]
    #[case(0)]
    #[case(6)]
    #[tokio::test]
    async fn rate_meal_rejects_out_of_range_scores(alice: User, #[case] score: i64) {
        let mut meals = MockMealRepository::new();
        meals.expect_load_all().never();
        let err = book(meals)
            .rate_meal(&family("f1"), &MealId::new("tacos").expect("id"), &alice, score, "")
            .await
            .expect_err("invalid score");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[tokio::test]
    async fn rate_meal_of_another_family_is_not_found(alice: User) {
        let mut meals = MockMealRepository::new();
        meals
            .expect_load_all()
            .return_once(|| Ok(vec![meal("tacos", "f2")]));
        meals.expect_replace_all().never();
        let err = book(meals)
            .rate_meal(&family("f1"), &MealId::new("tacos").expect("id"), &alice, 3, "")
            .await
            .expect_err("foreign meal");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }

    #[tokio::test]
    async fn delete_meal_removes_only_the_target() {
        let mut meals = MockMealRepository::new();
        meals
            .expect_load_all()
            .return_once(|| Ok(vec![meal("tacos", "f1"), meal("soup", "f1")]));
        meals
            .expect_replace_all()
            .withf(|all| all.len() == 1 && all.first().is_some_and(|m| m.id().as_ref() == "soup"))
            .times(1)
            .returning(|_| Ok(()));

        book(meals)
            .delete_meal(&family("f1"), &MealId::new("tacos").expect("id"))
            .await
            .expect("meal deleted");
    }

    #[tokio::test]
    async fn delete_missing_meal_is_not_found() {
        let mut meals = MockMealRepository::new();
        meals.expect_load_all().return_once(|| Ok(Vec::new()));
        meals.expect_replace_all().never();
        let err = book(meals)
            .delete_meal(&family("f1"), &MealId::new("tacos").expect("id"))
            .await
            .expect_err("missing meal");
        assert_eq!(err.code(), ErrorCode::NotFound);
    }
}
