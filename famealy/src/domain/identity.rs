//! Identity resolution: merging what the identity provider reports with the
//! locally cached profile.
//!
//! The provider is the source of truth for *who* the user is; the local
//! cache is the source of truth for *their household state* (status and
//! family). [`resolve_user`] is pure and is re-run on every identity change,
//! so the same inputs always produce the same user.

use super::user::{DisplayName, Status, User, UserId};

/// Identity as reported by the identity provider.
///
/// Fields are raw provider values; an identity whose id is blank or carries
/// surrounding whitespace is ambiguous and resolves to no user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExternalIdentity {
    /// Opaque, stable identity.
    pub id: String,
    /// Email on the account, if the provider shares it.
    pub email: Option<String>,
    /// Display name chosen at sign-up, if any.
    pub display_name: Option<String>,
}

impl ExternalIdentity {
    /// Identity with only an id.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            email: None,
            display_name: None,
        }
    }

    /// Attach an email.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Attach a display name.
    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = Some(display_name.into());
        self
    }

    /// The user id this identity maps to, or `None` when it is ambiguous.
    ///
    /// The provider id is used verbatim; it is never trimmed.
    pub fn user_id(&self) -> Option<UserId> {
        UserId::new(&self.id).ok()
    }
}

/// Merge an identity with the locally cached profile into one user.
///
/// - `id` comes from the identity.
/// - `email` comes from the identity, or is empty.
/// - `name` is the identity's display name unless it is blank, else the
///   cached name, else `"User"`. Provider names are not length-limited.
/// - `current_status` and `family_id` come from the cache, else `Unset`
///   and none.
///
/// Returns `None` when the identity is ambiguous (blank or padded id).
///
/// # Examples
/// ```
/// use famealy::domain::{resolve_user, ExternalIdentity};
///
/// let identity = ExternalIdentity::new("u1").with_email("a@b.com");
/// let user = resolve_user(&identity, None).unwrap();
/// assert_eq!(user.name().as_ref(), "User");
/// ```
pub fn resolve_user(identity: &ExternalIdentity, cached: Option<&User>) -> Option<User> {
    let id = identity.user_id()?;
    let email = identity
        .email
        .as_deref()
        .map(str::trim)
        .unwrap_or_default();
    // `DisplayName::new` only rejects blank names.
    let name = identity
        .display_name
        .as_deref()
        .and_then(|name| DisplayName::new(name).ok())
        .or_else(|| cached.map(|user| user.name().clone()))
        .unwrap_or_else(DisplayName::placeholder);
    let status = cached.map_or(Status::Unset, User::current_status);
    let family_id = cached.and_then(|user| user.family_id().cloned());

    Some(
        User::new(id, name, email)
            .with_status(status)
            .with_optional_family(family_id),
    )
}

/// Pick the cached profile that belongs to `id`.
///
/// Prefers the persisted session user when it is the same person, then the
/// roster entry with that id. A session user cached for somebody else is
/// ignored so one account never inherits another's family.
pub fn cached_profile_for(
    id: &UserId,
    session_user: Option<User>,
    roster: &[User],
) -> Option<User> {
    session_user
        .filter(|user| user.id() == id)
        .or_else(|| roster.iter().find(|user| user.id() == id).cloned())
}
