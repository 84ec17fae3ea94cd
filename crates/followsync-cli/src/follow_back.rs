//! `followsync follow-back` command implementation.

use anyhow::Result;
use clap::Args;
use followsync_core::{workflow, ApplyOptions};

use crate::output::{self, Progress};
use crate::session::{self, Api, Globals};

/// Arguments for the `followsync follow-back` command.
#[derive(Args, Debug)]
pub struct FollowBackArgs {
    /// Account whose followers to follow back. Defaults to
    /// `follow_back_target` from the config, then the authenticated account.
    pub username: Option<String>,

    /// API surface to use.
    #[arg(long, value_enum, default_value_t = Api::V2)]
    pub api: Api,
}

/// Run the follow-back command.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded or the authenticated
/// account cannot be identified.
pub async fn run(args: FollowBackArgs, globals: &Globals) -> Result<()> {
    let config = session::load_config(&globals.config)?;
    let username = args
        .username
        .or_else(|| config.follow_back_target.clone());

    let graph = session::connect(&config, args.api)?;
    let options = ApplyOptions {
        dry_run: globals.dry_run,
    };

    let mut progress = Progress::new(globals.json);
    let report = workflow::follow_back(graph.as_ref(), username.as_deref(), options, |event| {
        progress.event(event);
    })
    .await
    .map_err(|e| session::identity_error(e, &globals.config))?;

    output::finish(&report, globals.json)
}
