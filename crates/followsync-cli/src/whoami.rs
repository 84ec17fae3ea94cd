//! `followsync whoami` command implementation.

use anyhow::{Context, Result};
use clap::Args;

use crate::session::{self, Api, Globals};

/// Arguments for the `followsync whoami` command.
#[derive(Args, Debug)]
pub struct WhoamiArgs {
    /// API surface to use.
    #[arg(long, value_enum, default_value_t = Api::V2)]
    pub api: Api,
}

/// Run the whoami command.
///
/// # Errors
///
/// Returns an error if the config cannot be loaded or the credentials are
/// rejected.
pub async fn run(args: WhoamiArgs, globals: &Globals) -> Result<()> {
    let config = session::load_config(&globals.config)?;
    let graph = session::connect(&config, args.api)?;

    let me = graph.me().await.context("failed to verify credentials")?;

    if globals.json {
        let output = serde_json::json!({ "id": me, "api": args.api.to_string() });
        println!("{output}");
    } else {
        println!("Authenticated as user {me} ({} API)", args.api);
    }
    Ok(())
}
