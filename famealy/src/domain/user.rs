//! User data model.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::family::FamilyId;

/// Validation errors returned by the user value-object constructors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    /// Identifier is empty after trimming whitespace.
    EmptyId,
    /// Identifier carries leading or trailing whitespace.
    InvalidId,
    /// Display name is empty after trimming whitespace.
    EmptyDisplayName,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyId => write!(f, "user id must not be empty"),
            Self::InvalidId => write!(f, "user id must not contain surrounding whitespace"),
            Self::EmptyDisplayName => write!(f, "display name must not be empty"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Stable user identifier.
///
/// Identifiers are opaque strings issued by the identity provider; locally
/// registered accounts use UUIDs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct UserId(String);

impl UserId {
    /// Validate and construct a [`UserId`] from borrowed input.
    pub fn new(id: impl AsRef<str>) -> Result<Self, UserValidationError> {
        Self::from_owned(id.as_ref().to_owned())
    }

    /// Generate a new random [`UserId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    fn from_owned(id: String) -> Result<Self, UserValidationError> {
        if id.trim().is_empty() {
            return Err(UserValidationError::EmptyId);
        }
        if id.trim() != id {
            return Err(UserValidationError::InvalidId);
        }
        Ok(Self(id))
    }
}

impl AsRef<str> for UserId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<UserId> for String {
    fn from(value: UserId) -> Self {
        value.0
    }
}

impl TryFrom<String> for UserId {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_owned(value)
    }
}

/// Human readable display name for the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct DisplayName(String);

/// Name shown when neither the identity provider nor the local cache has one.
pub const PLACEHOLDER_DISPLAY_NAME: &str = "User";

impl DisplayName {
    /// Validate and construct a [`DisplayName`]; surrounding whitespace is
    /// trimmed.
    ///
    /// Any non-blank name is accepted so provider-issued and stored names
    /// load unchanged. The sign-up form applies its own length limit.
    pub fn new(display_name: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = display_name.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyDisplayName);
        }
        Ok(Self(trimmed.to_owned()))
    }

    /// The fallback display name, [`PLACEHOLDER_DISPLAY_NAME`].
    pub fn placeholder() -> Self {
        Self(PLACEHOLDER_DISPLAY_NAME.to_owned())
    }

    /// First character of the name, used for member avatars.
    pub fn initial(&self) -> char {
        self.0.chars().next().unwrap_or('?')
    }
}

impl AsRef<str> for DisplayName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<DisplayName> for String {
    fn from(value: DisplayName) -> Self {
        value.0
    }
}

impl TryFrom<String> for DisplayName {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Daily self-reported presence of a family member.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Status {
    /// Eating at home today.
    Home,
    /// Not eating at home today.
    Away,
    /// No answer yet today.
    #[default]
    Unset,
}

impl Status {
    /// Sentence shown next to a member on the dashboard.
    pub fn description(self) -> &'static str {
        match self {
            Self::Home => "Eating at home",
            Self::Away => "Not eating at home",
            Self::Unset => "Waiting for status...",
        }
    }
}

/// Application user.
///
/// ## Invariants
/// - `id` is immutable once created.
/// - A user without `family_id` has not finished onboarding.
///
/// The serialised form is the persisted record shape:
/// `{ id, name, email, familyId?, currentStatus }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    id: UserId,
    name: DisplayName,
    #[serde(default)]
    email: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    family_id: Option<FamilyId>,
    #[serde(default)]
    current_status: Status,
}

impl User {
    /// Build a freshly signed-up user: status unset and no family.
    pub fn new(id: UserId, name: DisplayName, email: impl Into<String>) -> Self {
        Self {
            id,
            name,
            email: email.into(),
            family_id: None,
            current_status: Status::Unset,
        }
    }

    /// Stable user identifier.
    pub fn id(&self) -> &UserId {
        &self.id
    }

    /// Display name shown to other family members.
    pub fn name(&self) -> &DisplayName {
        &self.name
    }

    /// Email reported by the identity provider; may be empty.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Family the user belongs to, if onboarding has completed.
    pub fn family_id(&self) -> Option<&FamilyId> {
        self.family_id.as_ref()
    }

    /// Today's presence status.
    pub fn current_status(&self) -> Status {
        self.current_status
    }

    /// Whether the user has been assigned to a family.
    pub fn has_family(&self) -> bool {
        self.family_id.is_some()
    }

    /// Copy of the user with a different status.
    #[must_use]
    pub fn with_status(mut self, status: Status) -> Self {
        self.current_status = status;
        self
    }

    /// Copy of the user assigned to `family_id`.
    #[must_use]
    pub fn with_family(mut self, family_id: FamilyId) -> Self {
        self.family_id = Some(family_id);
        self
    }

    /// Copy of the user carrying over an optional family assignment.
    #[must_use]
    pub fn with_optional_family(mut self, family_id: Option<FamilyId>) -> Self {
        self.family_id = family_id;
        self
    }

    /// Copy of the user with a different display name.
    #[must_use]
    pub fn with_name(mut self, name: DisplayName) -> Self {
        self.name = name;
        self
    }
}
