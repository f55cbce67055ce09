//! Stage CLI commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::cli::context::{open_engine, warn_unsaved};
use crate::cli::output::{action_failure, action_success, list_table, output, CommandOutput};
use crate::domain::models::{Award, Config, StageId, Trophy, XpGain};
use crate::domain::ports::ProgressStore;
use crate::services::{JourneyEngine, StageCompletion, Transition};

#[derive(Args, Debug)]
pub struct StageArgs {
    #[command(subcommand)]
    pub command: StageCommands,
}

#[derive(Subcommand, Debug)]
pub enum StageCommands {
    /// List all stages with their status
    Show,
    /// Display a stage (current or already completed)
    Go {
        /// Stage number (1-8)
        stage: StageId,
    },
    /// Complete the current stage and collect its rewards
    Complete,
    /// Look back at a completed stage or peek at the next one
    Preview {
        /// Stage number (1-8)
        stage: StageId,
    },
    /// Return to the current stage
    Back,
    /// Restart the journey from stage 1
    Reset,
}

#[derive(Debug, Serialize)]
pub struct StageRow {
    pub stage: StageId,
    pub title: &'static str,
    pub completed: bool,
    pub can_edit: bool,
    pub current: bool,
    pub viewing: bool,
}

#[derive(Debug, Serialize)]
pub struct StageListOutput {
    pub stages: Vec<StageRow>,
    pub view_mode: String,
    pub can_advance: bool,
    pub can_peek_next: bool,
}

impl StageListOutput {
    fn from_engine<S: ProgressStore>(engine: &JourneyEngine<S>) -> Self {
        let machine = engine.stages();
        let stages = StageId::all()
            .map(|stage| {
                let meta = machine.stage_meta(stage);
                StageRow {
                    stage,
                    title: stage.title(),
                    completed: meta.completed,
                    can_edit: meta.can_edit,
                    current: stage == machine.current_stage(),
                    viewing: stage == machine.viewing_stage(),
                }
            })
            .collect();
        Self {
            stages,
            view_mode: machine.view_mode().as_str().to_string(),
            can_advance: machine.can_advance(),
            can_peek_next: machine.can_peek_next(),
        }
    }
}

impl CommandOutput for StageListOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["", "stage", "title", "status"]);
        for row in &self.stages {
            let marker = match (row.current, row.viewing) {
                (_, true) => ">",
                (true, false) => "*",
                _ => "",
            };
            let status = if row.completed {
                "completed"
            } else if row.current {
                "current"
            } else {
                "locked"
            };
            table.add_row(vec![
                marker.to_string(),
                row.stage.to_string(),
                row.title.to_string(),
                status.to_string(),
            ]);
        }
        format!("{table}\n\nview: {}", self.view_mode)
    }
}

#[derive(Debug, Serialize)]
pub struct StageActionOutput {
    pub success: bool,
    pub message: String,
    pub current_stage: StageId,
    pub viewing_stage: StageId,
    pub view_mode: String,
}

impl StageActionOutput {
    fn new<S: ProgressStore>(
        engine: &JourneyEngine<S>,
        transition: Transition,
        applied: String,
        rejected: String,
    ) -> Self {
        let machine = engine.stages();
        Self {
            success: transition.is_applied(),
            message: if transition.is_applied() { applied } else { rejected },
            current_stage: machine.current_stage(),
            viewing_stage: machine.viewing_stage(),
            view_mode: machine.view_mode().as_str().to_string(),
        }
    }
}

impl CommandOutput for StageActionOutput {
    fn to_human(&self) -> String {
        if self.success {
            action_success(&self.message)
        } else {
            action_failure(&self.message)
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StageCompleteOutput {
    pub completed_stage: StageId,
    pub current_stage: StageId,
    pub trophy: Award,
    pub xp: Option<XpGain>,
    pub medals: Vec<Trophy>,
}

impl StageCompleteOutput {
    fn new(result: StageCompletion, current_stage: StageId) -> Self {
        Self {
            completed_stage: result.stage,
            current_stage,
            trophy: result.trophy,
            xp: result.xp,
            medals: result.medals,
        }
    }
}

impl CommandOutput for StageCompleteOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![action_success(&format!(
            "Stage {} ({}) completed",
            self.completed_stage,
            self.completed_stage.title()
        ))];
        if self.trophy.is_new {
            lines.push(format!("  trophy: {}", self.trophy.trophy.name));
        }
        if let Some(gain) = &self.xp {
            lines.push(format!("  +{} XP (total {})", gain.amount, gain.total_xp));
            if gain.leveled_up {
                lines.push(format!("  level up! now level {}", gain.new_level + 1));
            }
        }
        for medal in &self.medals {
            lines.push(format!("  medal: {}", medal.name));
        }
        if self.current_stage != self.completed_stage {
            lines.push(format!(
                "Next: stage {} ({})",
                self.current_stage,
                self.current_stage.title()
            ));
        }
        lines.join("\n")
    }
}

pub fn execute(args: StageArgs, config: &Config, json_mode: bool) -> Result<()> {
    let mut engine = open_engine(config)?;

    match args.command {
        StageCommands::Show => {
            output(&StageListOutput::from_engine(&engine), json_mode);
        }

        StageCommands::Go { stage } => {
            let transition = engine.stages_mut().go_to_stage(stage);
            let out = StageActionOutput::new(
                &engine,
                transition,
                format!("Viewing stage {stage} ({})", stage.title()),
                format!("Stage {stage} is locked"),
            );
            output(&out, json_mode);
        }

        StageCommands::Complete => {
            let result = engine.complete_stage();
            let out = StageCompleteOutput::new(result, engine.stages().current_stage());
            output(&out, json_mode);
        }

        StageCommands::Preview { stage } => {
            let transition = engine.stages_mut().preview_stage(stage);
            let out = StageActionOutput::new(
                &engine,
                transition,
                format!("Previewing stage {stage} ({})", stage.title()),
                format!("Stage {stage} cannot be previewed now"),
            );
            output(&out, json_mode);
        }

        StageCommands::Back => {
            let transition = engine.stages_mut().return_to_current();
            let current = engine.stages().current_stage();
            let out = StageActionOutput::new(
                &engine,
                transition,
                format!("Back to stage {current}"),
                String::new(),
            );
            output(&out, json_mode);
        }

        StageCommands::Reset => {
            let transition = engine.reset_journey();
            let out = StageActionOutput::new(
                &engine,
                transition,
                "Journey reset to stage 1".to_string(),
                String::new(),
            );
            output(&out, json_mode);
        }
    }

    warn_unsaved(&mut engine);
    Ok(())
}
