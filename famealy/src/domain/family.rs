//! Family groups and their invite codes.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Number of characters in an invite code.
pub const INVITE_CODE_LENGTH: usize = 6;

/// Characters an invite code is drawn from.
pub const INVITE_CODE_ALPHABET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Validation errors returned by the family value-object constructors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FamilyValidationError {
    /// Identifier is empty after trimming whitespace.
    #[error("family id must not be empty")]
    EmptyId,
    /// Name is empty after trimming whitespace.
    #[error("family name must not be empty")]
    EmptyName,
    /// Code is not six uppercase letters or digits.
    #[error("invite code must be six letters or digits")]
    MalformedInviteCode,
    /// Stored code is empty after trimming whitespace.
    #[error("invite code must not be empty")]
    EmptyInviteCode,
}

/// Stable family identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FamilyId(String);

impl FamilyId {
    /// Validate and construct a [`FamilyId`].
    pub fn new(id: impl AsRef<str>) -> Result<Self, FamilyValidationError> {
        let raw = id.as_ref();
        if raw.trim().is_empty() {
            return Err(FamilyValidationError::EmptyId);
        }
        Ok(Self(raw.to_owned()))
    }

    /// Generate a new random [`FamilyId`].
    pub fn random() -> Self {
        Self(Uuid::new_v4().to_string())
    }
}

impl AsRef<str> for FamilyId {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for FamilyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<FamilyId> for String {
    fn from(value: FamilyId) -> Self {
        value.0
    }
}

impl TryFrom<String> for FamilyId {
    type Error = FamilyValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Family name chosen at creation; trimmed and non-empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct FamilyName(String);

impl FamilyName {
    /// Validate and construct a [`FamilyName`].
    pub fn new(name: impl AsRef<str>) -> Result<Self, FamilyValidationError> {
        let trimmed = name.as_ref().trim();
        if trimmed.is_empty() {
            return Err(FamilyValidationError::EmptyName);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for FamilyName {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl From<FamilyName> for String {
    fn from(value: FamilyName) -> Self {
        value.0
    }
}

impl TryFrom<String> for FamilyName {
    type Error = FamilyValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

static INVITE_CODE_RE: OnceLock<Regex> = OnceLock::new();

fn invite_code_regex() -> &'static Regex {
    INVITE_CODE_RE.get_or_init(|| {
        let pattern = format!("^[A-Z0-9]{{{INVITE_CODE_LENGTH}}}$");
        Regex::new(&pattern)
            .unwrap_or_else(|error| panic!("invite code regex failed to compile: {error}"))
    })
}

/// Short shared secret used to join a family.
///
/// Stored upper-cased; [`InviteCode::matches`] compares case-insensitively.
/// Newly generated codes are six letters or digits. Codes read back from
/// storage only need to be non-blank so older families stay joinable.
///
/// # Examples
/// ```
/// use famealy::domain::InviteCode;
///
/// let code = InviteCode::new("a1b2c3").unwrap();
/// assert_eq!(code.as_ref(), "A1B2C3");
/// assert!(code.matches(" a1B2c3 "));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InviteCode(String);

impl InviteCode {
    /// Validate a code, normalising it to upper case.
    pub fn new(code: impl AsRef<str>) -> Result<Self, FamilyValidationError> {
        let normalized = code.as_ref().trim().to_ascii_uppercase();
        if !invite_code_regex().is_match(&normalized) {
            return Err(FamilyValidationError::MalformedInviteCode);
        }
        Ok(Self(normalized))
    }

    /// Accept a previously persisted code of any shape, normalising case.
    pub fn from_stored(code: impl AsRef<str>) -> Result<Self, FamilyValidationError> {
        let normalized = code.as_ref().trim().to_ascii_uppercase();
        if normalized.is_empty() {
            return Err(FamilyValidationError::EmptyInviteCode);
        }
        Ok(Self(normalized))
    }

    /// Case-insensitive exact comparison against user input.
    pub fn matches(&self, input: &str) -> bool {
        self.0.eq_ignore_ascii_case(input.trim())
    }
}

impl AsRef<str> for InviteCode {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for InviteCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<InviteCode> for String {
    fn from(value: InviteCode) -> Self {
        value.0
    }
}

impl TryFrom<String> for InviteCode {
    type Error = FamilyValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_stored(value)
    }
}

/// A household group. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Family {
    id: FamilyId,
    name: FamilyName,
    invite_code: InviteCode,
}

impl Family {
    /// Assemble a family from validated parts.
    pub fn new(id: FamilyId, name: FamilyName, invite_code: InviteCode) -> Self {
        Self {
            id,
            name,
            invite_code,
        }
    }

    /// Stable family identifier.
    pub fn id(&self) -> &FamilyId {
        &self.id
    }

    /// Name chosen at creation.
    pub fn name(&self) -> &FamilyName {
        &self.name
    }

    /// Code other members enter to join.
    pub fn invite_code(&self) -> &InviteCode {
        &self.invite_code
    }
}
