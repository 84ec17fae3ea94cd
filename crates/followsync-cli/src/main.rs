//! followsync command-line entrypoint.
//!
//! - `followsync mirror` - follow exactly the followers of another account
//! - `followsync follow-back` - follow back an account's followers
//! - `followsync whoami` - check the configured credentials

#![forbid(unsafe_code)]

mod follow_back;
mod mirror;
mod output;
mod prompt;
mod session;
mod whoami;

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use followsync_twitter::DEFAULT_CONFIG_PATH;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Keep a Twitter/X account's follows in sync with another account's followers.
#[derive(Parser)]
#[command(name = "followsync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Credential file (JSON).
    #[arg(
        long,
        global = true,
        env = "FOLLOWSYNC_CONFIG",
        default_value = DEFAULT_CONFIG_PATH
    )]
    config: PathBuf,

    /// Print only the final report, as JSON.
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    /// Compute the plan without following or unfollowing anyone.
    #[arg(long, global = true, default_value_t = false)]
    dry_run: bool,

    /// Log line format on stderr.
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Follow exactly the followers of another account.
    ///
    /// Unfollows every account you follow that does not follow the target,
    /// then follows every follower of the target you do not follow yet.
    Mirror(mirror::MirrorArgs),

    /// Follow back every follower an account does not follow yet.
    ///
    /// Never unfollows anyone.
    FollowBack(follow_back::FollowBackArgs),

    /// Show which account the configured credentials act for.
    Whoami(whoami::WhoamiArgs),
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_format);

    let globals = session::Globals {
        config: cli.config,
        json: cli.json,
        dry_run: cli.dry_run,
    };

    match cli.command {
        Commands::Mirror(args) => mirror::run(args, &globals).await,
        Commands::FollowBack(args) => follow_back::run(args, &globals).await,
        Commands::Whoami(args) => whoami::run(args, &globals).await,
    }
}

/// Logs go to stderr so stdout stays clean for progress lines and JSON.
fn init_logging(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Text => registry
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .init(),
        LogFormat::Json => registry
            .with(
                fmt::layer()
                    .json()
                    .with_writer(std::io::stderr)
                    .with_current_span(true),
            )
            .init(),
    }
}
