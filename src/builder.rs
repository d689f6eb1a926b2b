use crate::config::DbConfig;
use crate::engine::{DatabricksEngineFactory, Engine, EngineFactory, EngineOptions};
use crate::errors::{ConnectorError, ConnectorResult};
use crate::token::{CredentialManager, Token};

/// Produces engines and sessions for one [`DbConfig`], fetching OAuth tokens as needed
///
/// The token and the engine are created on first use and kept for the builder's lifetime.
/// An expired token is replaced the next time it is asked for, but once an engine exists
/// it is reused as is: the token it was built with is not checked again.
///
/// Not thread safe; wrap it in a lock if it has to be shared.
pub struct ConnectionBuilder<M, F = DatabricksEngineFactory>
where
    F: EngineFactory,
{
    credential_manager: M,
    config: DbConfig,
    engine_factory: F,
    options: EngineOptions,
    token: Option<Token>,
    engine: Option<F::Engine>,
}

impl<M: CredentialManager> ConnectionBuilder<M> {
    pub fn new(credential_manager: M, config: DbConfig) -> Self {
        ConnectionBuilder::with_engine_factory(credential_manager, config, DatabricksEngineFactory)
    }
}

impl<M: CredentialManager, F: EngineFactory> ConnectionBuilder<M, F> {
    /// Build engines with something other than [`DatabricksEngineFactory`]
    pub fn with_engine_factory(credential_manager: M, config: DbConfig, engine_factory: F) -> Self {
        ConnectionBuilder {
            credential_manager,
            config,
            engine_factory,
            options: EngineOptions::default(),
            token: None,
            engine: None,
        }
    }

    /// Set the options the engine is created with
    ///
    /// These only take effect for an engine that has not been created yet.
    pub fn with_options(mut self, options: EngineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn config(&self) -> &DbConfig {
        &self.config
    }

    /// The last token fetched, expired or not
    pub fn token(&self) -> Option<&Token> {
        self.token.as_ref()
    }

    /// The engine, if one has been created
    pub fn engine(&self) -> Option<&F::Engine> {
        self.engine.as_ref()
    }

    /// Get a usable token, asking the credential manager only when needed
    ///
    /// Errors from the credential manager are returned untouched.
    pub fn get_access_token(&mut self) -> Result<&Token, M::Error> {
        let token = match self.token.take() {
            Some(token) if !token.expired() => {
                log::debug!("Reusing cached access token");
                token
            }
            stale => {
                if stale.is_some() {
                    log::debug!("Access token expired, fetching a new one");
                } else {
                    log::debug!("Fetching access token");
                }
                match self.credential_manager.token() {
                    Ok(fresh) => fresh,
                    Err(e) => {
                        // A failed refresh leaves the previous token in place
                        self.token = stale;
                        return Err(e);
                    }
                }
            }
        };
        Ok(&*self.token.insert(token))
    }

    /// `databricks://token:<access_token>@<hostname>/?http_path=<http_path>[&catalog=<db>]`
    pub fn construct_conn_string(&mut self) -> ConnectorResult<String> {
        let access_token = self
            .get_access_token()
            .map_err(ConnectorError::credential)?
            .access_token
            .clone();
        Ok(format_conn_string(&access_token, &self.config))
    }

    /// The cached engine, or a new one built from a fresh connection string
    pub fn get_engine(&mut self) -> ConnectorResult<&F::Engine> {
        let engine = match self.engine.take() {
            Some(engine) => engine,
            None => {
                let url = self.construct_conn_string()?;
                log::debug!("Creating engine for {}", redact(&url));
                self.engine_factory
                    .create_engine(&url, &self.options)
                    .map_err(Into::<ConnectorError>::into)?
            }
        };
        Ok(&*self.engine.insert(engine))
    }

    /// A new session bound to the engine
    pub fn get_session(&mut self) -> ConnectorResult<<F::Engine as Engine>::Session> {
        Ok(self.get_engine()?.session())
    }
}

fn format_conn_string(access_token: &str, config: &DbConfig) -> String {
    let mut url = format!(
        "databricks://token:{}@{}/?http_path={}",
        access_token,
        config.hostname(),
        config.http_path()
    );
    if let Some(db) = config.db() {
        url.push_str("&catalog=");
        url.push_str(db);
    }
    url
}

/// Hide the access token in a connection string so it can be logged
fn redact(url: &str) -> String {
    let authority = url.split_once('?').map_or(url, |(authority, _)| authority);
    match (url.find("token:"), authority.rfind('@')) {
        (Some(start), Some(end)) if start + 6 <= end => {
            format!("{}***{}", &url[..start + 6], &url[end..])
        }
        _ => url.to_owned(),
    }
}
