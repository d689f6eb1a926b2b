use std::convert::Infallible;
use std::error::Error;
use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

/// Databricks rejects tokens that expire within 30 seconds,
/// so a token counts as expired this long before its actual expiry
pub const EXPIRY_LEEWAY_SECS: i64 = 40;

/// An OAuth access token as issued by a [`CredentialManager`]
///
/// Tokens are never modified after being issued; refreshing produces a new one.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct Token {
    pub access_token: String,
    #[serde(default = "default_token_type")]
    pub token_type: String,
    /// When the token stops being accepted. `None` means it never expires.
    #[serde(default)]
    pub expiry: Option<DateTime<Utc>>,
}

fn default_token_type() -> String {
    "Bearer".into()
}

impl Token {
    /// A bearer token that never expires
    pub fn new(access_token: impl Into<String>) -> Token {
        Token {
            access_token: access_token.into(),
            token_type: default_token_type(),
            expiry: None,
        }
    }

    pub fn with_expiry(mut self, expiry: DateTime<Utc>) -> Token {
        self.expiry = Some(expiry);
        self
    }

    /// Whether the token should be refreshed before use
    pub fn expired(&self) -> bool {
        self.expired_at(Utc::now())
    }

    /// Whether the token should be refreshed before use at `now`
    pub fn expired_at(&self, now: DateTime<Utc>) -> bool {
        match self.expiry {
            // A deadline too early to represent has long passed
            Some(expiry) => expiry
                .checked_sub_signed(Duration::seconds(EXPIRY_LEEWAY_SECS))
                .map_or(true, |deadline| deadline < now),
            None => false,
        }
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &"***")
            .field("token_type", &self.token_type)
            .field("expiry", &self.expiry)
            .finish()
    }
}

/// The external component that performs the actual OAuth exchange
///
/// Any closure returning `Result<Token, E>` is a credential manager,
/// which is the easiest way to adapt an SDK's token source.
pub trait CredentialManager {
    type Error: Error + Send + Sync + 'static;

    /// Obtain a fresh token
    fn token(&self) -> Result<Token, Self::Error>;
}

impl<F, E> CredentialManager for F
where
    F: Fn() -> Result<Token, E>,
    E: Error + Send + Sync + 'static,
{
    type Error = E;

    fn token(&self) -> Result<Token, E> {
        self()
    }
}

/// Always hands out the same token, e.g. a personal access token
#[derive(Debug, Clone)]
pub struct StaticCredentials {
    token: Token,
}

impl StaticCredentials {
    pub fn new(token: Token) -> StaticCredentials {
        StaticCredentials { token }
    }

    /// Use the token in `DATABRICKS_TOKEN`, if set
    pub fn from_env() -> Option<StaticCredentials> {
        std::env::var("DATABRICKS_TOKEN")
            .ok()
            .filter(|token| !token.is_empty())
            .map(|token| StaticCredentials::new(Token::new(token)))
    }
}

impl CredentialManager for StaticCredentials {
    type Error = Infallible;

    fn token(&self) -> Result<Token, Infallible> {
        Ok(self.token.clone())
    }
}
