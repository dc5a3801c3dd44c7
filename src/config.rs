//! Optional TOML configuration file
//!
//! ```toml
//! [account]
//! user_id = "12345"
//! username = "me@example.com"
//!
//! [http]
//! timeout_secs = 30
//! user_agent = "magnetis-crawler/0.1"
//! ```
//!
//! The password is never read from the file; it comes from `--password` or
//! `MAGNETIS_PASS`.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

use crate::session::SessionConfig;

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    pub account: AccountSection,
    pub http: HttpSection,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct AccountSection {
    pub user_id: Option<String>,
    pub username: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, deny_unknown_fields)]
pub struct HttpSection {
    pub timeout_secs: Option<u64>,
    pub user_agent: Option<String>,
}

impl FileConfig {
    pub fn parse(text: &str) -> Result<Self> {
        toml::from_str(text).context("invalid configuration file")
    }

    /// Load `path`, or the default location when `path` is `None`. A missing
    /// default file yields an empty configuration; a missing explicit file is
    /// an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => match default_config_path() {
                Ok(p) => (p, false),
                Err(_) => return Ok(Self::default()),
            },
        };

        if !explicit && !path.exists() {
            return Ok(Self::default());
        }

        let text = std::fs::read_to_string(&path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        Self::parse(&text).with_context(|| format!("in {}", path.display()))
    }

    pub fn session_config(&self, base_url: &str) -> SessionConfig {
        SessionConfig {
            base_url: base_url.to_string(),
            timeout: self.http.timeout_secs.map(Duration::from_secs),
            user_agent: self.http.user_agent.clone(),
        }
    }
}

/// `$XDG_CONFIG_HOME/magnetis/config.toml`, falling back to the platform
/// config directory.
pub fn default_config_path() -> Result<PathBuf> {
    let config_dir = std::env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(dir_spec::config_home)
        .ok_or_else(|| anyhow!("Could not determine config directory"))?;
    Ok(config_dir.join("magnetis").join("config.toml"))
}

/// Credentials resolved from flags/env with the file as fallback
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub user_id: String,
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("user_id", &self.user_id)
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

impl Credentials {
    pub fn resolve(
        user_id: Option<String>,
        username: Option<String>,
        password: Option<String>,
        file: &FileConfig,
    ) -> Result<Self> {
        let user_id = user_id
            .or_else(|| file.account.user_id.clone())
            .ok_or_else(|| anyhow!("missing user id (--user-id or MAGNETIS_USER_ID)"))?;
        let username = username
            .or_else(|| file.account.username.clone())
            .ok_or_else(|| anyhow!("missing username (--username or MAGNETIS_USER)"))?;
        let password =
            password.ok_or_else(|| anyhow!("missing password (--password or MAGNETIS_PASS)"))?;
        Ok(Self {
            user_id,
            username,
            password,
        })
    }
}
