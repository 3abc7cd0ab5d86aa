//! Authentication primitives: sign-in credentials and sign-up requests.
//!
//! Keep form parsing outside the domain by exposing constructors that
//! validate string inputs before anything talks to the identity provider.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use zeroize::Zeroizing;

use super::user::{DisplayName, UserValidationError};

/// Longest display name the sign-up form accepts, in characters.
pub const SIGN_UP_NAME_MAX: usize = 64;

/// Domain error returned when sign-in or sign-up form values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginValidationError {
    /// Email was missing or blank once trimmed.
    EmptyEmail,
    /// Email does not look like `name@host`.
    MalformedEmail,
    /// Password was blank.
    EmptyPassword,
    /// Display name failed validation.
    DisplayName(UserValidationError),
    /// Display name exceeds [`SIGN_UP_NAME_MAX`] characters.
    DisplayNameTooLong {
        /// Character limit that was exceeded.
        max: usize,
    },
}

impl fmt::Display for LoginValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::MalformedEmail => write!(f, "email must look like name@example.com"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::DisplayName(err) => write!(f, "{err}"),
            Self::DisplayNameTooLong { max } => {
                write!(f, "display name must be at most {max} characters")
            }
        }
    }
}

impl std::error::Error for LoginValidationError {}

static EMAIL_RE: OnceLock<Regex> = OnceLock::new();

fn email_regex() -> &'static Regex {
    EMAIL_RE.get_or_init(|| {
        // Shape check only; the identity provider owns real verification.
        Regex::new(r"^[^@\s]+@[^@\s]+$")
            .unwrap_or_else(|error| panic!("email regex failed to compile: {error}"))
    })
}

fn normalize_email(email: &str) -> Result<String, LoginValidationError> {
    let normalized = email.trim();
    if normalized.is_empty() {
        return Err(LoginValidationError::EmptyEmail);
    }
    if !email_regex().is_match(normalized) {
        return Err(LoginValidationError::MalformedEmail);
    }
    Ok(normalized.to_owned())
}

/// Validated sign-in credentials.
///
/// ## Invariants
/// - `email` is trimmed and shaped like `name@host`.
/// - `password` is non-empty but retains caller-provided whitespace to
///   avoid surprising credential comparisons.
///
/// # Examples
/// ```
/// use famealy::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts(" ada@example.com ", "secret").unwrap();
/// assert_eq!(creds.email(), "ada@example.com");
/// assert_eq!(creds.password(), "secret");
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: String,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, LoginValidationError> {
        let normalized = normalize_email(email)?;
        if password.is_empty() {
            return Err(LoginValidationError::EmptyPassword);
        }

        Ok(Self {
            email: normalized,
            password: Zeroizing::new(password.to_owned()),
        })
    }

    /// Email used to look up the account.
    pub fn email(&self) -> &str {
        self.email.as_str()
    }

    /// Password string provided by the caller.
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

/// Validated sign-up form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignUpRequest {
    credentials: LoginCredentials,
    display_name: DisplayName,
}

impl SignUpRequest {
    /// Construct a sign-up request from raw form inputs.
    pub fn try_from_parts(
        email: &str,
        password: &str,
        display_name: &str,
    ) -> Result<Self, LoginValidationError> {
        let name = DisplayName::new(display_name).map_err(LoginValidationError::DisplayName)?;
        if name.as_ref().chars().count() > SIGN_UP_NAME_MAX {
            return Err(LoginValidationError::DisplayNameTooLong {
                max: SIGN_UP_NAME_MAX,
            });
        }
        Ok(Self {
            credentials: LoginCredentials::try_from_parts(email, password)?,
            display_name: name,
        })
    }

    /// Email and password of the new account.
    pub fn credentials(&self) -> &LoginCredentials {
        &self.credentials
    }

    /// Name the account holder wants to be shown as.
    pub fn display_name(&self) -> &DisplayName {
        &self.display_name
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("", "pw", LoginValidationError::EmptyEmail)]
    #[case("   ", "pw", LoginValidationError::EmptyEmail)]
    #[case("not-an-email", "pw", LoginValidationError::MalformedEmail)]
    #[case("a b@c.com", "pw", LoginValidationError::MalformedEmail)]
    #[case("ada@example.com", "", LoginValidationError::EmptyPassword)]
    fn invalid_credentials(
        #[case] email: &str,
        #[case] password: &str,
        #[case] expected: LoginValidationError,
    ) {
        let err = LoginCredentials::try_from_parts(email, password)
            .expect_err("invalid inputs must fail");
        assert_eq!(err, expected);
    }

    #[rstest]
    #[case("  ada@example.com  ", "secret")]
    #[case("bob@home", "correct horse battery staple")]
    fn valid_credentials_trim_email(#[case] email: &str, #[case] password: &str) {
        let creds = LoginCredentials::try_from_parts(email, password)
            .expect("valid inputs should succeed");
        assert_eq!(creds.email(), email.trim());
        assert_eq!(creds.password(), password);
    }

    #[rstest]
    fn sign_up_requires_a_display_name() {
        let err = SignUpRequest::try_from_parts("ada@example.com", "pw", "  ")
            .expect_err("blank display name");
        assert_eq!(
            err,
            LoginValidationError::DisplayName(UserValidationError::EmptyDisplayName)
        );
    }

    #[rstest]
    fn sign_up_caps_display_name_length() {
        let at_limit = "a".repeat(SIGN_UP_NAME_MAX);
        let padded = format!("  {at_limit}  ");
        SignUpRequest::try_from_parts("ada@example.com", "pw", &padded)
            .expect("name at the limit is accepted");

        let over = "a".repeat(SIGN_UP_NAME_MAX + 1);
        let err = SignUpRequest::try_from_parts("ada@example.com", "pw", &over)
            .expect_err("name over the limit");
        assert_eq!(
            err,
            LoginValidationError::DisplayNameTooLong {
                max: SIGN_UP_NAME_MAX
            }
        );
    }

    #[rstest]
    fn sign_up_keeps_trimmed_parts() {
        let request = SignUpRequest::try_from_parts(" ada@example.com", "pw", " Ada ")
            .expect("valid sign-up");
        assert_eq!(request.credentials().email(), "ada@example.com");
        assert_eq!(request.display_name().as_ref(), "Ada");
    }
}
