//! Session user data model.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Validation errors returned by [`SessionUser::try_from_strings`] and the
/// signup request constructor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserValidationError {
    EmptyUsername,
    UsernameTooLong { max: usize },
    EmptyEmail,
    InvalidEmail,
}

impl fmt::Display for UserValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyUsername => write!(f, "username must not be empty"),
            Self::UsernameTooLong { max } => {
                write!(f, "username must be at most {max} characters")
            }
            Self::EmptyEmail => write!(f, "email must not be empty"),
            Self::InvalidEmail => write!(f, "email must look like name@domain"),
        }
    }
}

impl std::error::Error for UserValidationError {}

/// Longest username accepted when creating an account.
///
/// Only new signups are held to it; names the backend already issued are
/// adopted as they are.
pub const USERNAME_MAX: usize = 64;

/// Display identifier chosen by the user at signup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Username(String);

impl Username {
    /// Validate and construct a [`Username`], trimming surrounding whitespace.
    pub fn new(username: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = username.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyUsername);
        }
        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for Username {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<Username> for String {
    fn from(value: Username) -> Self {
        value.0
    }
}

impl TryFrom<String> for Username {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// Email address used as the login identifier.
///
/// Only the shape is checked: one `@`, a non-empty local part and a domain
/// without whitespace. The backend remains the authority on deliverability.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct EmailAddress(String);

impl EmailAddress {
    /// Validate and construct an [`EmailAddress`], trimming surrounding whitespace.
    pub fn new(email: impl AsRef<str>) -> Result<Self, UserValidationError> {
        let trimmed = email.as_ref().trim();
        if trimmed.is_empty() {
            return Err(UserValidationError::EmptyEmail);
        }

        let Some((local, domain)) = trimmed.split_once('@') else {
            return Err(UserValidationError::InvalidEmail);
        };
        let well_formed = !local.is_empty()
            && !domain.is_empty()
            && !domain.contains('@')
            && !trimmed.chars().any(char::is_whitespace);
        if !well_formed {
            return Err(UserValidationError::InvalidEmail);
        }

        Ok(Self(trimmed.to_owned()))
    }
}

impl AsRef<str> for EmailAddress {
    fn as_ref(&self) -> &str {
        self.0.as_str()
    }
}

impl fmt::Display for EmailAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_ref())
    }
}

impl From<EmailAddress> for String {
    fn from(value: EmailAddress) -> Self {
        value.0
    }
}

impl TryFrom<String> for EmailAddress {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// The authenticated principal's display record.
///
/// ## Invariants
/// - `username` is trimmed and non-empty.
/// - `email` is trimmed and shaped like `name@domain`.
///
/// Deserialisation runs the same validation, so a stored record that fails it
/// is rejected rather than adopted. Unknown fields sent by the backend are
/// ignored.
///
/// # Examples
/// ```
/// use client::domain::SessionUser;
///
/// let user = SessionUser::try_from_strings("ada", "ada@example.com").unwrap();
/// assert_eq!(user.username().as_ref(), "ada");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "SessionUserDto", into = "SessionUserDto")]
pub struct SessionUser {
    username: Username,
    email: EmailAddress,
}

impl SessionUser {
    /// Build a new [`SessionUser`] from validated components.
    #[must_use]
    pub fn new(username: Username, email: EmailAddress) -> Self {
        Self { username, email }
    }

    /// Fallible constructor enforcing username and email invariants.
    pub fn try_from_strings(
        username: impl AsRef<str>,
        email: impl AsRef<str>,
    ) -> Result<Self, UserValidationError> {
        Ok(Self::new(Username::new(username)?, EmailAddress::new(email)?))
    }

    /// Display identifier.
    #[must_use]
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Login email.
    #[must_use]
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct SessionUserDto {
    username: String,
    email: String,
}

impl From<SessionUser> for SessionUserDto {
    fn from(value: SessionUser) -> Self {
        Self {
            username: value.username.into(),
            email: value.email.into(),
        }
    }
}

impl TryFrom<SessionUserDto> for SessionUser {
    type Error = UserValidationError;

    fn try_from(value: SessionUserDto) -> Result<Self, Self::Error> {
        Self::try_from_strings(value.username, value.email)
    }
}
