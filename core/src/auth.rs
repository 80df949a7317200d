//! HTTP Basic credential encoding.
//!
//! `Credentials` only exist long enough to derive an `AuthorizationHeader`:
//! deriving the header consumes them, and the client keeps the header alone.

use std::fmt;

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;

use crate::error::{MalError, Result};

/// Environment variable holding the account name for `Credentials::from_env`.
pub const USERNAME_ENV: &str = "MAL_USERNAME";
/// Environment variable holding the password for `Credentials::from_env`.
pub const PASSWORD_ENV: &str = "MAL_PASSWORD";

/// Username and password for the remote account.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Both fields must be non-empty.
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Result<Self> {
        let username = username.into();
        let password = password.into();
        if username.is_empty() {
            return Err(MalError::Configuration("username is missing".to_string()));
        }
        if password.is_empty() {
            return Err(MalError::Configuration("password is missing".to_string()));
        }
        Ok(Self { username, password })
    }

    /// Read credentials from `MAL_USERNAME` and `MAL_PASSWORD`.
    pub fn from_env() -> Result<Self> {
        let read = |key: &str| {
            std::env::var(key).map_err(|_| MalError::Configuration(format!("{key} is not set")))
        };
        Self::new(read(USERNAME_ENV)?, read(PASSWORD_ENV)?)
    }

    pub fn username(&self) -> &str {
        &self.username
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// The `Authorization` header value, `Basic <base64(username:password)>`.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthorizationHeader(String);

impl AuthorizationHeader {
    pub fn from_credentials(credentials: Credentials) -> Self {
        let Credentials { username, password } = credentials;
        let token = STANDARD.encode(format!("{username}:{password}"));
        Self(format!("Basic {token}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for AuthorizationHeader {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("AuthorizationHeader(Basic <redacted>)")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_is_basic_base64_of_user_colon_password() {
        let creds = Credentials::new("Aladdin", "open sesame").unwrap();
        let header = AuthorizationHeader::from_credentials(creds);
        assert_eq!(header.as_str(), "Basic QWxhZGRpbjpvcGVuIHNlc2FtZQ==");
    }

    #[test]
    fn header_round_trips_through_base64() {
        let header = AuthorizationHeader::from_credentials(Credentials::new("user", "p:ss").unwrap());
        let token = header.as_str().strip_prefix("Basic ").unwrap();
        let decoded = STANDARD.decode(token).unwrap();
        assert_eq!(decoded, b"user:p:ss");
    }

    #[test]
    fn empty_username_is_rejected() {
        let err = Credentials::new("", "secret").unwrap_err();
        assert!(matches!(err, MalError::Configuration(_)));
    }

    #[test]
    fn empty_password_is_rejected() {
        let err = Credentials::new("user", "").unwrap_err();
        assert!(matches!(err, MalError::Configuration(_)));
    }

    #[test]
    fn debug_output_hides_secrets() {
        let creds = Credentials::new("user", "hunter2").unwrap();
        assert!(!format!("{creds:?}").contains("hunter2"));
        let header = AuthorizationHeader::from_credentials(creds);
        assert!(!format!("{header:?}").contains(header.as_str()));
    }
}
