//! Authentication primitives such as login credentials and signup requests.
//!
//! Constructors validate raw string inputs before the session container talks
//! to the backend, so obviously malformed submissions never leave the client.

use std::fmt;

use zeroize::Zeroizing;

use crate::domain::user::{EmailAddress, USERNAME_MAX, UserValidationError, Username};

/// Domain error returned when credential values are invalid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialsValidationError {
    /// Username or email failed validation.
    InvalidIdentity(UserValidationError),
    /// Password was empty.
    EmptyPassword,
    /// Replacement password is shorter than the minimum.
    PasswordTooShort {
        /// Minimum length in characters.
        min: usize,
    },
    /// Replacement password equals the current one.
    PasswordUnchanged,
}

impl fmt::Display for CredentialsValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidIdentity(err) => write!(f, "{err}"),
            Self::EmptyPassword => write!(f, "password must not be empty"),
            Self::PasswordTooShort { min } => {
                write!(f, "new password must be at least {min} characters")
            }
            Self::PasswordUnchanged => {
                write!(f, "new password must differ from the current password")
            }
        }
    }
}

impl std::error::Error for CredentialsValidationError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::InvalidIdentity(err) => Some(err),
            _ => None,
        }
    }
}

impl From<UserValidationError> for CredentialsValidationError {
    fn from(value: UserValidationError) -> Self {
        Self::InvalidIdentity(value)
    }
}

fn validated_password(password: &str) -> Result<Zeroizing<String>, CredentialsValidationError> {
    if password.is_empty() {
        return Err(CredentialsValidationError::EmptyPassword);
    }
    Ok(Zeroizing::new(password.to_owned()))
}

/// Validated login credentials.
///
/// ## Invariants
/// - `email` is a trimmed, well-formed [`EmailAddress`].
/// - `password` is non-empty but keeps caller-provided whitespace.
///
/// # Examples
/// ```
/// use client::domain::LoginCredentials;
///
/// let creds = LoginCredentials::try_from_parts("ada@example.com", "secret").unwrap();
/// assert_eq!(creds.email().as_ref(), "ada@example.com");
/// assert_eq!(creds.password(), "secret");
/// ```
#[derive(Clone, PartialEq, Eq)]
pub struct LoginCredentials {
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl LoginCredentials {
    /// Construct credentials from raw email/password inputs.
    pub fn try_from_parts(email: &str, password: &str) -> Result<Self, CredentialsValidationError> {
        let email = EmailAddress::new(email)?;
        let password = validated_password(password)?;
        Ok(Self { email, password })
    }

    /// Email the account was registered with.
    #[must_use]
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Password provided by the caller.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl fmt::Debug for LoginCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginCredentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Validated account creation request.
///
/// ## Invariants
/// - `username` is trimmed, non-empty and at most [`USERNAME_MAX`] characters.
/// - `email` and `password` follow the [`LoginCredentials`] rules.
#[derive(Clone, PartialEq, Eq)]
pub struct SignupRequest {
    username: Username,
    email: EmailAddress,
    password: Zeroizing<String>,
}

impl SignupRequest {
    /// Construct a signup request from raw inputs.
    pub fn try_from_parts(
        username: &str,
        email: &str,
        password: &str,
    ) -> Result<Self, CredentialsValidationError> {
        let username = Username::new(username)?;
        if username.as_ref().chars().count() > USERNAME_MAX {
            return Err(UserValidationError::UsernameTooLong { max: USERNAME_MAX }.into());
        }
        let email = EmailAddress::new(email)?;
        let password = validated_password(password)?;
        Ok(Self {
            username,
            email,
            password,
        })
    }

    /// Requested display identifier.
    #[must_use]
    pub fn username(&self) -> &Username {
        &self.username
    }

    /// Email for the new account.
    #[must_use]
    pub fn email(&self) -> &EmailAddress {
        &self.email
    }

    /// Password chosen for the new account.
    #[must_use]
    pub fn password(&self) -> &str {
        self.password.as_str()
    }
}

impl fmt::Debug for SignupRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignupRequest")
            .field("username", &self.username)
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Shortest replacement password accepted by [`PasswordChange`].
pub const NEW_PASSWORD_MIN: usize = 6;

/// Validated request to replace the signed-in user's password.
///
/// Both passwords are kept in zeroizing buffers and redacted from `Debug`.
#[derive(Clone, PartialEq, Eq)]
pub struct PasswordChange {
    current: Zeroizing<String>,
    new: Zeroizing<String>,
}

impl PasswordChange {
    /// Construct a change request from the current and the new password.
    ///
    /// # Errors
    ///
    /// Fails when either password is empty, the new one is shorter than
    /// [`NEW_PASSWORD_MIN`], or both are equal.
    pub fn try_from_parts(current: &str, new: &str) -> Result<Self, CredentialsValidationError> {
        let current = validated_password(current)?;
        let new = validated_password(new)?;
        if new.chars().count() < NEW_PASSWORD_MIN {
            return Err(CredentialsValidationError::PasswordTooShort {
                min: NEW_PASSWORD_MIN,
            });
        }
        if current == new {
            return Err(CredentialsValidationError::PasswordUnchanged);
        }
        Ok(Self { current, new })
    }

    /// Password the account currently uses.
    #[must_use]
    pub fn current_password(&self) -> &str {
        self.current.as_str()
    }

    /// Password to switch to.
    #[must_use]
    pub fn new_password(&self) -> &str {
        self.new.as_str()
    }
}

impl fmt::Debug for PasswordChange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PasswordChange")
            .field("current", &"<redacted>")
            .field("new", &"<redacted>")
            .finish()
    }
}
