//! `followsync mirror` command implementation.
//!
//! Makes the authenticated account follow exactly the followers of a target
//! account.
//!
//! # Usage
//!
//! ```text
//! # Prompt for the target
//! followsync mirror
//!
//! # Scripted, with a JSON report
//! followsync --json mirror some_account
//! ```

use anyhow::Result;
use clap::Args;
use followsync_core::{workflow, ApplyOptions, MirrorOptions};

use crate::output::{self, Progress};
use crate::prompt;
use crate::session::{self, Api, Globals};

/// Arguments for the `followsync mirror` command.
#[derive(Args, Debug)]
pub struct MirrorArgs {
    /// Account whose followers to mirror (prompted for when omitted).
    pub username: Option<String>,

    /// API surface to use.
    #[arg(long, value_enum, default_value_t = Api::Legacy)]
    pub api: Api,

    /// Unfollow even when the target's follower list could not be fetched in full.
    #[arg(long, default_value_t = false)]
    pub allow_partial_unfollow: bool,
}

/// Run the mirror command.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded, no target is given, or
/// the authenticated account cannot be identified.
pub async fn run(args: MirrorArgs, globals: &Globals) -> Result<()> {
    let config = session::load_config(&globals.config)?;

    let target = match args.username {
        Some(username) => username,
        None => prompt::username("Enter the Twitter username to sync followers with")?,
    };

    let graph = session::connect(&config, args.api)?;
    let options = MirrorOptions {
        apply: ApplyOptions {
            dry_run: globals.dry_run,
        },
        allow_partial_unfollow: args.allow_partial_unfollow,
    };

    let mut progress = Progress::new(globals.json);
    let report = workflow::mirror(graph.as_ref(), &target, options, |event| {
        progress.event(event);
    })
    .await
    .map_err(|e| session::identity_error(e, &globals.config))?;

    output::finish(&report, globals.json)
}
