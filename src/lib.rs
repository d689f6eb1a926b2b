//! Databricks SQL engines and sessions authenticated with OAuth access tokens.
//!
//! The `lib.rs` file ties the crate together. [`DbConfig`] describes where to connect,
//! a [`CredentialManager`] supplies OAuth tokens, and the [`ConnectionBuilder`] keeps the
//! current token and the engine built from it, handing out sessions on request.
//!
//! Example usage:
//!
//! ```rust,no_run
//! use databricks_oauth_connector::{
//!     ConnectionBuilder, ConnectorError, DbConfig, EngineOptions, Token,
//! };
//!
//! fn main() -> Result<(), ConnectorError> {
//!     let config = DbConfig::new(
//!         "https://our-dev-workspace.cloud.databricks.com",
//!         "/sql/1.0/warehouses/abcdefghijk",
//!         Some("main"),
//!     )?;
//!
//!     // Anything returning `Result<Token, E>` can act as the credential manager,
//!     // usually a call into an OAuth SDK.
//!     let credential_manager = || -> Result<Token, std::io::Error> {
//!         let access_token = std::env::var("DATABRICKS_OAUTH_TOKEN")
//!             .map_err(|e| std::io::Error::new(std::io::ErrorKind::NotFound, e))?;
//!         Ok(Token::new(access_token).with_expiry(chrono::Utc::now() + chrono::Duration::hours(1)))
//!     };
//!
//!     let mut builder = ConnectionBuilder::new(credential_manager, config)
//!         .with_options(EngineOptions { echo: true, ..Default::default() });
//!
//!     // The first call fetches a token and creates the engine, later calls reuse both
//!     let session = builder.get_session()?;
//!     println!("Session {} on {}", session.id(), session.engine().host());
//!
//!     Ok(())
//! }
//! ```
mod builder;
mod config;
mod engine;
mod errors;
mod token;

pub use builder::ConnectionBuilder;
pub use config::DbConfig;
pub use engine::{
    DatabricksEngine, DatabricksEngineFactory, Engine, EngineFactory, EngineOptions, Session,
};
pub use errors::{ConnectorError, ConnectorResult};
pub use token::{CredentialManager, StaticCredentials, Token, EXPIRY_LEEWAY_SECS};
