//! XP CLI commands.

use anyhow::{bail, Result};
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::cli::context::{open_engine, warn_unsaved};
use crate::cli::output::{action_success, label, output, progress_bar, CommandOutput};
use crate::domain::models::{Config, XpGain, XpProgress, XpSource};
use crate::domain::ports::ProgressStore;
use crate::services::JourneyEngine;

#[derive(Args, Debug)]
pub struct XpArgs {
    #[command(subcommand)]
    pub command: XpCommands,
}

#[derive(Subcommand, Debug)]
pub enum XpCommands {
    /// Show XP, level and progress to the next level
    Show,
    /// Grant XP, either a raw amount or the configured reward for a source
    Add {
        /// XP amount
        amount: Option<u64>,
        /// Reward source (quiz, task, curiosity, node, stage)
        #[arg(short, long, conflicts_with = "amount")]
        source: Option<XpSource>,
    },
}

#[derive(Debug, Serialize)]
pub struct XpOutput {
    pub xp: u64,
    pub level: usize,
    pub level_name: String,
    pub next_threshold: Option<u64>,
    pub progress: XpProgress,
}

impl XpOutput {
    fn from_engine<S: ProgressStore>(engine: &JourneyEngine<S>) -> Self {
        let ledger = engine.ledger();
        let level = ledger.current_level();
        Self {
            xp: ledger.current_xp(),
            next_threshold: ledger.levels().thresholds().get(level.index + 1).copied(),
            level: level.index,
            level_name: level.name,
            progress: ledger.xp_progress(),
        }
    }
}

impl CommandOutput for XpOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![
            format!("{} {} ({})", label("Level"), self.level + 1, self.level_name),
            format!("{} {}", label("XP"), self.xp),
        ];
        match self.next_threshold {
            Some(next) => lines.push(format!(
                "{} {}/{} toward {next}",
                label("Progress"),
                self.progress.current,
                self.progress.max
            )),
            None => lines.push(format!("{} max level reached", label("Progress"))),
        }
        lines.push(progress_bar(&self.progress, 20));
        lines.join("\n")
    }
}

#[derive(Debug, Serialize)]
pub struct XpAddOutput {
    pub source: Option<XpSource>,
    pub gain: XpGain,
    pub level_name: String,
}

impl CommandOutput for XpAddOutput {
    fn to_human(&self) -> String {
        let mut message = format!("+{} XP (total {})", self.gain.amount, self.gain.total_xp);
        if let Some(source) = self.source {
            message.push_str(&format!(" from {}", source.as_str()));
        }
        let mut lines = vec![action_success(&message)];
        if self.gain.leveled_up {
            lines.push(format!(
                "  level up! now level {} ({})",
                self.gain.new_level + 1,
                self.level_name
            ));
        }
        lines.join("\n")
    }
}

pub fn execute(args: XpArgs, config: &Config, json_mode: bool) -> Result<()> {
    let mut engine = open_engine(config)?;

    match args.command {
        XpCommands::Show => output(&XpOutput::from_engine(&engine), json_mode),

        XpCommands::Add { amount, source } => {
            let gain = match (amount, source) {
                (Some(amount), None) => engine.ledger_mut().add_xp(amount),
                (None, Some(source)) => engine.ledger_mut().add_xp_for(source),
                _ => bail!("Provide either an XP amount or --source"),
            };
            let out = XpAddOutput {
                source,
                gain,
                level_name: engine.ledger().current_level().name,
            };
            output(&out, json_mode);
        }
    }

    warn_unsaved(&mut engine);
    Ok(())
}
