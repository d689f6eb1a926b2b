use serde::Deserialize;
use url::Url;

use crate::errors::{ConnectorError, ConnectorResult};

/// Where to connect: a Databricks workspace, a SQL warehouse on it, and optionally a catalog
///
/// Values are validated when constructed (including when deserialized),
/// so a `DbConfig` that exists is always usable.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(try_from = "RawDbConfig")]
pub struct DbConfig {
    hostname: String,
    http_path: String,
    db: Option<String>,
}

#[derive(Deserialize)]
struct RawDbConfig {
    hostname: String,
    http_path: String,
    #[serde(default)]
    db: Option<String>,
}

impl TryFrom<RawDbConfig> for DbConfig {
    type Error = ConnectorError;

    fn try_from(raw: RawDbConfig) -> ConnectorResult<Self> {
        DbConfig::new(&raw.hostname, &raw.http_path, raw.db.as_deref())
    }
}

impl DbConfig {
    /// Validate and build a configuration
    ///
    /// `hostname` is the workspace URL, e.g. `https://my-workspace.cloud.databricks.com`.
    /// Only the host (and port, if any) is kept.
    pub fn new(hostname: &str, http_path: &str, db: Option<&str>) -> ConnectorResult<DbConfig> {
        let hostname = parse_hostname(hostname)?;
        let http_path = http_path.trim();
        if http_path.is_empty() {
            return Err(ConnectorError::invalid_config("http_path", "must not be empty"));
        }
        if let Some(db) = db {
            if db.trim().is_empty() {
                return Err(ConnectorError::invalid_config(
                    "db",
                    "must not be empty when given",
                ));
            }
        }
        Ok(DbConfig {
            hostname,
            http_path: http_path.to_owned(),
            db: db.map(str::to_owned),
        })
    }

    /// Read `DATABRICKS_HOST`, `DATABRICKS_HTTP_PATH` and, optionally, `DATABRICKS_CATALOG`
    pub fn from_env() -> ConnectorResult<DbConfig> {
        let require = |name: &'static str, field: &'static str| {
            std::env::var(name)
                .map_err(|_| ConnectorError::invalid_config(field, format!("{name} not set")))
        };
        let hostname = require("DATABRICKS_HOST", "hostname")?;
        let http_path = require("DATABRICKS_HTTP_PATH", "http_path")?;
        let db = std::env::var("DATABRICKS_CATALOG").ok();
        DbConfig::new(&hostname, &http_path, db.as_deref())
    }

    /// The workspace host, without scheme
    pub fn hostname(&self) -> &str {
        &self.hostname
    }

    pub fn http_path(&self) -> &str {
        &self.http_path
    }

    /// The catalog, if one was configured
    pub fn db(&self) -> Option<&str> {
        self.db.as_deref()
    }
}

fn parse_hostname(hostname: &str) -> ConnectorResult<String> {
    let hostname = hostname.trim();
    if hostname.is_empty() {
        return Err(ConnectorError::invalid_config("hostname", "must not be empty"));
    }
    let url = Url::parse(hostname)
        .map_err(|e| ConnectorError::invalid_config("hostname", format!("invalid URL: {e}")))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(ConnectorError::invalid_config(
            "hostname",
            format!("unsupported scheme `{}`", url.scheme()),
        ));
    }
    let host = url
        .host_str()
        .ok_or_else(|| ConnectorError::invalid_config("hostname", "URL has no host"))?;
    Ok(match url.port() {
        Some(port) => format!("{host}:{port}"),
        None => host.to_owned(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const HTTP_PATH: &str = "/sql/1.0/warehouses/abcdefghijk";

    #[test]
    fn valid_inputs() -> ConnectorResult<()> {
        let config = DbConfig::new(
            "https://our-dev-workspace.cloud.databricks.com",
            HTTP_PATH,
            None,
        )?;
        assert_eq!(config.hostname(), "our-dev-workspace.cloud.databricks.com");
        assert_eq!(config.http_path(), HTTP_PATH);
        assert_eq!(config.db(), None);

        let config = DbConfig::new("https://localhost:8443/", HTTP_PATH, Some("main"))?;
        assert_eq!(config.hostname(), "localhost:8443");
        assert_eq!(config.db(), Some("main"));
        Ok(())
    }

    #[test]
    fn invalid_hostnames() {
        for hostname in ["", "   ", "invalid_url", "ftp://example.com", "unix:/tmp/socket"] {
            let err = DbConfig::new(hostname, HTTP_PATH, None).unwrap_err();
            assert!(
                matches!(err, ConnectorError::InvalidConfig { field: "hostname", .. }),
                "{hostname:?} was accepted"
            );
        }
    }

    #[test]
    fn empty_http_path_and_catalog() {
        let host = "https://example.cloud.databricks.com";
        assert!(matches!(
            DbConfig::new(host, " ", None),
            Err(ConnectorError::InvalidConfig { field: "http_path", .. })
        ));
        assert!(matches!(
            DbConfig::new(host, HTTP_PATH, Some("")),
            Err(ConnectorError::InvalidConfig { field: "db", .. })
        ));
    }

    #[test]
    fn deserialization_is_validated() {
        let config: DbConfig = serde_json::from_str(
            r#"{"hostname": "https://example.cloud.databricks.com", "http_path": "/sql/1.0/warehouses/abc"}"#,
        )
        .unwrap();
        assert_eq!(config.hostname(), "example.cloud.databricks.com");
        assert_eq!(config.db(), None);

        // Missing hostname
        assert!(serde_json::from_str::<DbConfig>(r#"{"http_path": "/sql", "db": null}"#).is_err());
        // Malformed hostname
        assert!(serde_json::from_str::<DbConfig>(
            r#"{"hostname": "invalid_url", "http_path": "/sql", "db": null}"#
        )
        .is_err());
    }
}
