//! Implementation of the `journey init` command.

use anyhow::{Context, Result};
use clap::Args;
use std::fs;
use std::path::PathBuf;

use crate::cli::output::{action_success, output, CommandOutput};
use crate::domain::models::Config;

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing configuration file
    #[arg(long, short)]
    pub force: bool,

    /// Target directory (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

#[derive(Debug, serde::Serialize)]
pub struct InitOutput {
    pub success: bool,
    pub message: String,
    pub config_path: PathBuf,
    pub profile_dir: PathBuf,
}

impl CommandOutput for InitOutput {
    fn to_human(&self) -> String {
        if !self.success {
            return self.message.clone();
        }
        [
            action_success(&self.message),
            format!("  config:  {}", self.config_path.display()),
            format!("  records: {}", self.profile_dir.display()),
        ]
        .join("\n")
    }
}

pub fn execute(args: InitArgs, json_mode: bool) -> Result<()> {
    let config = Config::default();
    let journey_dir = args.path.join(&config.storage.data_dir);
    let config_path = journey_dir.join("config.yaml");
    let profile_dir = args.path.join(config.storage.profile_dir());

    if config_path.exists() && !args.force {
        let out = InitOutput {
            success: false,
            message: "Journey already initialized. Use --force to overwrite the configuration."
                .to_string(),
            config_path,
            profile_dir,
        };
        output(&out, json_mode);
        return Ok(());
    }

    fs::create_dir_all(&profile_dir)
        .with_context(|| format!("Failed to create {}", profile_dir.display()))?;

    let yaml = serde_yaml::to_string(&config).context("Failed to serialize default config")?;
    fs::write(&config_path, yaml)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;

    let out = InitOutput {
        success: true,
        message: "Journey initialized".to_string(),
        config_path,
        profile_dir,
    };
    output(&out, json_mode);
    Ok(())
}
