//! Implementation of the `journey status` command.

use anyhow::Result;
use serde::Serialize;

use crate::cli::context::{open_engine, warn_unsaved};
use crate::cli::output::{label, output, progress_bar, section_header, CommandOutput};
use crate::domain::models::{Config, StageId, XpProgress};
use crate::domain::ports::ProgressStore;
use crate::services::JourneyEngine;

#[derive(Debug, Serialize)]
pub struct StatusOutput {
    pub current_stage: StageId,
    pub current_title: String,
    pub viewing_stage: StageId,
    pub view_mode: String,
    pub completed_stages: Vec<StageId>,
    pub journey_complete: bool,
    pub elevated: bool,
    pub xp: u64,
    pub level: usize,
    pub level_name: String,
    pub progress: XpProgress,
    pub trophies: usize,
}

impl StatusOutput {
    pub fn from_engine<S: ProgressStore>(engine: &JourneyEngine<S>) -> Self {
        let stages = engine.stages();
        let ledger = engine.ledger();
        let level = ledger.current_level();
        Self {
            current_stage: stages.current_stage(),
            current_title: stages.current_stage().title().to_string(),
            viewing_stage: stages.viewing_stage(),
            view_mode: stages.view_mode().as_str().to_string(),
            completed_stages: stages.state().completed_sorted(),
            journey_complete: stages.state().is_journey_complete(),
            elevated: stages.access().is_elevated(),
            xp: ledger.current_xp(),
            level: level.index,
            level_name: level.name,
            progress: ledger.xp_progress(),
            trophies: ledger.trophy_count(),
        }
    }
}

impl CommandOutput for StatusOutput {
    fn to_human(&self) -> String {
        let completed: Vec<String> = self
            .completed_stages
            .iter()
            .map(ToString::to_string)
            .collect();

        let mut lines = vec![
            section_header("Journey"),
            format!(
                "{} {} ({})",
                label("Stage"),
                self.current_stage,
                self.current_title
            ),
            format!(
                "{} {}",
                label("Completed"),
                if completed.is_empty() {
                    "none".to_string()
                } else {
                    completed.join(", ")
                }
            ),
        ];
        if self.viewing_stage != self.current_stage {
            lines.push(format!(
                "{} stage {} ({})",
                label("Viewing"),
                self.viewing_stage,
                self.view_mode
            ));
        }
        if self.journey_complete {
            lines.push("Journey complete!".to_string());
        }
        if self.elevated {
            lines.push(format!("{} elevated", label("Access")));
        }

        lines.push(section_header("Progress"));
        lines.push(format!(
            "{} {} ({})",
            label("Level"),
            self.level + 1,
            self.level_name
        ));
        lines.push(format!("{} {}", label("XP"), self.xp));
        lines.push(progress_bar(&self.progress, 20));
        lines.push(format!("{} {}", label("Trophies"), self.trophies));
        lines.join("\n")
    }
}

pub fn execute(config: &Config, json_mode: bool) -> Result<()> {
    let mut engine = open_engine(config)?;
    output(&StatusOutput::from_engine(&engine), json_mode);
    warn_unsaved(&mut engine);
    Ok(())
}
