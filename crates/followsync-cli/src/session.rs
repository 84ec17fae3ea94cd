//! Shared setup: options common to every command, config loading, and
//! building the graph client.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use followsync_core::{GraphError, SocialGraph};
use followsync_twitter::{ApiSurface, ConfigError, TwitterApiClient, TwitterConfig};
use tracing::debug;

/// Options accepted by every command.
#[derive(Debug, Clone)]
pub struct Globals {
    pub config: PathBuf,
    pub json: bool,
    pub dry_run: bool,
}

/// API surface selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Api {
    /// v1.1 endpoints (friends/ids, followers/ids, friendships/*).
    Legacy,
    /// v2 endpoints (/2/users/...).
    V2,
}

impl From<Api> for ApiSurface {
    fn from(api: Api) -> Self {
        match api {
            Api::Legacy => Self::Legacy,
            Api::V2 => Self::V2,
        }
    }
}

impl fmt::Display for Api {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&ApiSurface::from(*self), f)
    }
}

/// Load the credential file, turning a missing file into setup instructions.
pub fn load_config(path: &Path) -> Result<TwitterConfig> {
    match TwitterConfig::load(path) {
        Ok(config) => {
            debug!(path = %path.display(), ?config, "Loaded config");
            Ok(config)
        }
        Err(ConfigError::Missing { path }) => bail!(
            "{} not found.\n\
             Please create a config file with your Twitter API credentials:\n\
             {{\"api_key\": \"...\", \"api_secret\": \"...\", \
             \"access_token\": \"...\", \"access_token_secret\": \"...\"}}\n\
             Use --config or FOLLOWSYNC_CONFIG to point at a different file.",
            path.display()
        ),
        Err(e) => Err(e.into()),
    }
}

/// Build a graph client on the chosen API surface.
pub fn connect(config: &TwitterConfig, api: Api) -> Result<Box<dyn SocialGraph>> {
    let client = TwitterApiClient::new(config).context("failed to set up the Twitter client")?;
    debug!(%api, "Connected");
    Ok(ApiSurface::from(api).graph(Arc::new(client)))
}

/// Fatal error for a run that could not identify the caller, pointing at the
/// credential file when the platform rejected it.
pub fn identity_error(error: GraphError, config: &Path) -> anyhow::Error {
    let context = if error.is_auth_failure() {
        format!("the credentials in {} were rejected", config.display())
    } else {
        "failed to identify the authenticated account".to_string()
    };
    anyhow::Error::new(error).context(context)
}
