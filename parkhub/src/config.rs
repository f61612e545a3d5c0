//! Application configuration.
//!
//! Settings come from a YAML file merged with `PARKHUB_`-prefixed environment
//! variables, the environment winning. The file path defaults to
//! `config.yaml` and can be changed with `-f` or `PARKHUB_CONFIG`. Nested
//! keys use double underscores in the environment:
//!
//! ```bash
//! PARKHUB_PORT=8081
//! PARKHUB_SECRET_KEY="change-me"
//! PARKHUB_DATABASE__PATH=/var/lib/parkhub/parking.db
//! PARKHUB_AUTH__SESSION__TIMEOUT=12h
//! PARKHUB_AUTH__ALLOW_REGISTRATION=false
//! ```
//!
//! Every field except `secret_key` has a working default; `secret_key` signs
//! session tokens and must always be provided.

use clap::Parser;
use figment::{
    providers::{Env, Format, Yaml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::{path::PathBuf, time::Duration};

use crate::errors::Error;

/// CLI arguments: where the config file lives, and whether to only check it
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the configuration file
    #[arg(short = 'f', long, env = "PARKHUB_CONFIG", default_value = "config.yaml")]
    pub config: String,

    /// Check the configuration and exit without starting the server
    #[arg(long)]
    pub validate: bool,
}

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Host the HTTP listener binds to
    pub host: String,
    /// Port the HTTP listener binds to
    pub port: u16,
    /// Database settings
    pub database: DatabaseConfig,
    /// Signs session tokens; rotating it invalidates every session. Required.
    pub secret_key: Option<String>,
    /// Authentication settings
    pub auth: AuthConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            database: DatabaseConfig::default(),
            secret_key: None,
            auth: AuthConfig::default(),
        }
    }
}

/// Database settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// Path to the sqlite database file. Created on startup if absent.
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("parking.db"),
        }
    }
}

/// Authentication settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct AuthConfig {
    /// Whether new accounts can be registered
    pub allow_registration: bool,
    /// Session cookie settings
    pub session: SessionConfig,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            allow_registration: true,
            session: SessionConfig::default(),
        }
    }
}

/// Session cookie settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    /// Name of the session cookie
    pub cookie_name: String,
    /// How long a session stays valid
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,
    /// Set the `Secure` attribute on the session cookie (requires HTTPS)
    pub cookie_secure: bool,
    /// `SameSite` attribute for the session cookie
    pub cookie_same_site: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            cookie_name: "parkhub_session".to_string(),
            timeout: Duration::from_secs(60 * 60 * 24),
            cookie_secure: false,
            cookie_same_site: "Lax".to_string(),
        }
    }
}

impl Config {
    /// Merge the YAML file with `PARKHUB_` environment overrides and validate.
    #[allow(clippy::result_large_err)]
    pub fn load(args: &Args) -> Result<Self, figment::Error> {
        let config: Self = Figment::new()
            .merge(Yaml::file(&args.config))
            .merge(Env::prefixed("PARKHUB_").split("__"))
            .extract()?;

        config.validate().map_err(|e| figment::Error::from(e.to_string()))?;
        Ok(config)
    }

    /// Address to bind the HTTP listener to
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Check required fields and internal consistency.
    pub fn validate(&self) -> Result<(), Error> {
        let fail = |what: &str| {
            Err(Error::Internal {
                operation: format!("Config validation: {what}"),
            })
        };

        if self.secret_key.is_none() {
            return fail(
                "secret_key is not configured. \
                 Set the PARKHUB_SECRET_KEY environment variable or add secret_key to the config file.",
            );
        }
        if self.auth.session.cookie_name.is_empty() {
            return fail("auth.session.cookie_name must not be empty");
        }
        if self.auth.session.timeout.is_zero() {
            return fail("auth.session.timeout must be greater than zero");
        }

        Ok(())
    }
}
