//! Behaviour tests for the household flows: joining a family by invite
//! code and ranking the family's meals.

mod support;

use std::sync::Arc;

use famealy::domain::{AverageScore, Family, Meal, Screen, User, average_score};
use famealy::outbound::identity::LocalIdentityProvider;
use famealy::outbound::kv::InMemoryBlobStore;
use famealy::outbound::persistence::JsonCollections;
use rstest::{fixture, rstest};
use rstest_bdd_macros::{given, then, when};

use support::{FixedClock, Household};

#[fixture]
fn household() -> Household {
    Household::start(
        Arc::new(JsonCollections::new(InMemoryBlobStore::new())),
        FixedClock::days_after_fixture(0),
        LocalIdentityProvider::default(),
    )
}

fn signed_in_user(household: &Household) -> User {
    household
        .app
        .session()
        .current_user()
        .expect("a signed-in user")
}

fn meal_names(meals: &[Meal]) -> Vec<String> {
    meals.iter().map(|meal| meal.name().to_string()).collect()
}

#[given("Alice has created the family \"Smiths\"")]
fn alice_has_created_the_smiths(household: &Household) -> Family {
    household.sign_up("alice@example.com", "Alice");
    assert_eq!(household.app.session().snapshot().screen(), Screen::Onboarding);

    let family = household
        .run(household.app.families().create("Smiths"))
        .expect("family created");
    household
        .run(household.app.session().assign_family(&family))
        .expect("family assigned");
    assert_eq!(household.app.session().snapshot().screen(), Screen::Main);
    family
}

#[when("Bob signs up and joins with the invite code in lower case")]
fn bob_joins_with_lower_case_code(household: &Household, family: &Family) -> Family {
    household.sign_out();
    household.sign_up("bob@example.com", "Bob");

    let code = family.invite_code().to_string().to_ascii_lowercase();
    let joined = household
        .run(household.app.families().join(&code))
        .expect("join succeeds");
    household
        .run(household.app.session().assign_family(&joined))
        .expect("family assigned");
    joined
}

#[then("both members share the family")]
fn both_members_share_the_family(household: &Household, family: &Family) {
    let members = household
        .run(household.app.families().members_of(family.id()))
        .expect("members listed");
    let mut names: Vec<String> = members.iter().map(|member| member.name().to_string()).collect();
    names.sort();
    assert_eq!(names, vec!["Alice".to_owned(), "Bob".to_owned()]);
    assert!(
        members
            .iter()
            .all(|member| member.family_id() == Some(family.id()))
    );
}

#[given("the family has a meal \"Pasta\" rated 2")]
fn pasta_rated_two(household: &Household, family: &Family) {
    let meals = household.app.meals();
    let pasta = household
        .run(meals.add_meal(family.id(), "Pasta"))
        .expect("pasta added");
    household
        .run(meals.rate_meal(family.id(), pasta.id(), &signed_in_user(household), 2, ""))
        .expect("pasta rated");
}

#[when("a new meal \"Tacos\" is added")]
fn tacos_is_added(household: &Household, family: &Family) -> Meal {
    household
        .run(household.app.meals().add_meal(family.id(), "  Tacos "))
        .expect("tacos added")
}

#[then("the unrated meal is listed first")]
fn unrated_meal_is_listed_first(household: &Household, family: &Family) {
    let listed = household
        .run(household.app.meals().list_for_family(family.id()))
        .expect("meals listed");
    assert_eq!(meal_names(&listed), vec!["Tacos".to_owned(), "Pasta".to_owned()]);
}

#[when("two members rate it 5 and 3")]
fn two_members_rate_it(household: &Household, family: &Family, tacos: &Meal) -> Meal {
    let meals = household.app.meals();
    household
        .run(meals.rate_meal(
            family.id(),
            tacos.id(),
            &signed_in_user(household),
            5,
            "Love it",
        ))
        .expect("first rating");

    household.sign_out();
    household.sign_in("alice@example.com");
    household
        .run(meals.rate_meal(family.id(), tacos.id(), &signed_in_user(household), 3, ""))
        .expect("second rating")
}

#[then("its average is 4.0 and it sorts after lower-rated meals")]
fn average_is_four_and_resorted(household: &Household, family: &Family, rated: &Meal) {
    assert_eq!(rated.ratings().len(), 2);
    assert_eq!(average_score(rated.ratings()), AverageScore::from_tenths(40));
    assert_eq!(average_score(rated.ratings()).to_string(), "4.0");

    let listed = household
        .run(household.app.meals().list_for_family(family.id()))
        .expect("meals listed");
    assert_eq!(meal_names(&listed), vec!["Pasta".to_owned(), "Tacos".to_owned()]);
}

#[rstest]
fn second_member_joins_by_invite_code(household: Household) {
    let family = alice_has_created_the_smiths(&household);
    let code = family.invite_code().as_ref();
    assert_eq!(code.len(), 6);
    assert!(
        code.chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit())
    );

    let joined = bob_joins_with_lower_case_code(&household, &family);
    assert_eq!(joined, family);
    both_members_share_the_family(&household, &family);
}

#[rstest]
fn new_meal_sorts_first_then_by_average(household: Household) {
    let family = alice_has_created_the_smiths(&household);
    bob_joins_with_lower_case_code(&household, &family);
    pasta_rated_two(&household, &family);

    let tacos = tacos_is_added(&household, &family);
    assert!(tacos.ratings().is_empty());
    unrated_meal_is_listed_first(&household, &family);

    let rated = two_members_rate_it(&household, &family, &tacos);
    average_is_four_and_resorted(&household, &family, &rated);
}

#[rstest]
fn unknown_invite_codes_are_not_found(household: Household) {
    household.sign_up("carol@example.com", "Carol");
    let err = household
        .run(household.app.families().join("zzzzzz"))
        .expect_err("no such family");
    assert_eq!(err.code(), famealy::domain::ErrorCode::NotFound);
    assert_eq!(household.app.session().snapshot().screen(), Screen::Onboarding);
}
