//! Command-line front end.
//!
//! Every command loads configuration, builds a [`JourneyEngine`] over the
//! profile's JSON store, performs one operation and renders the result as
//! text or JSON.
//!
//! [`JourneyEngine`]: crate::services::JourneyEngine

pub mod commands;
pub mod context;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::init::InitArgs;
use commands::nodes::NodesArgs;
use commands::stage::StageArgs;
use commands::trophy::TrophyArgs;
use commands::xp::XpArgs;

#[derive(Parser, Debug)]
#[command(name = "journey")]
#[command(about = "Journey - onboarding progression engine", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Bypass progression guards (administrators and testers)
    #[arg(long, global = true)]
    pub elevated: bool,

    /// Configuration file (defaults to .journey/config.yaml)
    #[arg(short, long, global = true, env = "JOURNEY_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the journey directory and default configuration
    Init(InitArgs),

    /// Show stage, level and trophy overview
    Status,

    /// Stage navigation and completion
    Stage(StageArgs),

    /// Experience points and levels
    Xp(XpArgs),

    /// Trophies and medals
    Trophy(TrophyArgs),

    /// Learning-node progress for a content outline
    Nodes(NodesArgs),
}

/// Print an error in the selected output mode and exit non-zero.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let value = serde_json::json!({
            "success": false,
            "error": format!("{err:#}"),
        });
        println!(
            "{}",
            serde_json::to_string_pretty(&value).unwrap_or_default()
        );
    } else {
        eprintln!("{}", output::action_failure(&format!("{err:#}")));
    }
    std::process::exit(1);
}
