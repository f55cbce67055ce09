//! Trophy CLI commands.

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::cli::context::{open_engine, warn_unsaved};
use crate::cli::output::{action_success, list_table, output, render_list, CommandOutput};
use crate::domain::models::{Award, Config, Rarity, StageId, Trophy, TrophyKind};

#[derive(Args, Debug)]
pub struct TrophyArgs {
    #[command(subcommand)]
    pub command: TrophyCommands,
}

#[derive(Subcommand, Debug)]
pub enum TrophyCommands {
    /// List trophies in the order they were earned
    List,
    /// Award the trophy for a stage
    Stage {
        /// Stage number (1-8)
        stage: StageId,
    },
    /// Award a learning-unit trophy
    Unit {
        /// Unit identifier
        unit_id: String,
        /// Display title
        #[arg(short, long)]
        title: String,
        /// Rarity (common, uncommon, rare, epic, legendary)
        #[arg(short, long, default_value = "common")]
        rarity: Rarity,
    },
    /// Issue any medals whose conditions are now met
    Medals,
}

#[derive(Debug, Serialize)]
pub struct TrophyListOutput {
    pub trophies: Vec<Trophy>,
    pub total: usize,
}

fn kind_label(trophy: &Trophy) -> String {
    match &trophy.kind {
        TrophyKind::Stage => "stage".to_string(),
        TrophyKind::Unit { rarity, .. } => format!("unit ({rarity})"),
        TrophyKind::Medal => "medal".to_string(),
    }
}

impl CommandOutput for TrophyListOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["id", "name", "kind", "awarded"]);
        for trophy in &self.trophies {
            table.add_row(vec![
                trophy.id.clone(),
                trophy.name.clone(),
                kind_label(trophy),
                trophy.awarded_at.format("%Y-%m-%d").to_string(),
            ]);
        }
        render_list("trophy", "trophies", &table, self.total)
    }
}

#[derive(Debug, Serialize)]
pub struct AwardOutput {
    #[serde(flatten)]
    pub award: Award,
}

impl CommandOutput for AwardOutput {
    fn to_human(&self) -> String {
        if self.award.is_new {
            action_success(&format!("Awarded {}", self.award.trophy.name))
        } else {
            format!("Already held: {}", self.award.trophy.name)
        }
    }
}

#[derive(Debug, Serialize)]
pub struct MedalsOutput {
    pub awarded: Vec<Trophy>,
}

impl CommandOutput for MedalsOutput {
    fn to_human(&self) -> String {
        if self.awarded.is_empty() {
            return "No new medals.".to_string();
        }
        self.awarded
            .iter()
            .map(|medal| action_success(&format!("Medal: {} - {}", medal.name, medal.description)))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

pub fn execute(args: TrophyArgs, config: &Config, json_mode: bool) -> Result<()> {
    let mut engine = open_engine(config)?;

    match args.command {
        TrophyCommands::List => {
            let trophies = engine.ledger().trophies().to_vec();
            let out = TrophyListOutput {
                total: trophies.len(),
                trophies,
            };
            output(&out, json_mode);
        }

        TrophyCommands::Stage { stage } => {
            let award = engine.ledger_mut().award_trophy(stage);
            output(&AwardOutput { award }, json_mode);
        }

        TrophyCommands::Unit {
            unit_id,
            title,
            rarity,
        } => {
            let award = engine
                .ledger_mut()
                .award_unit_trophy(&unit_id, &title, rarity);
            output(&AwardOutput { award }, json_mode);
        }

        TrophyCommands::Medals => {
            let awarded = engine.ledger_mut().check_for_medals();
            output(&MedalsOutput { awarded }, json_mode);
        }
    }

    warn_unsaved(&mut engine);
    Ok(())
}
