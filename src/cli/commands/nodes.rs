//! Learning-node CLI commands.
//!
//! Every subcommand takes the outline file (YAML or JSON) it operates on;
//! progress is stored per outline id.

use std::path::PathBuf;

use anyhow::Result;
use clap::{Args, Subcommand};
use serde::Serialize;

use crate::cli::context::{load_outline, open_engine, warn_unsaved};
use crate::cli::output::{
    action_failure, action_success, action_warning, colorize_state, list_table, output,
    CommandOutput,
};
use crate::domain::models::{Config, NodeProgress, NodeState, XpGain};
use crate::services::{FlatForest, ForestReport, OutlineSummary, UnlockResolver};

#[derive(Args, Debug)]
pub struct NodesArgs {
    #[command(subcommand)]
    pub command: NodesCommands,
}

#[derive(Subcommand, Debug)]
pub enum NodesCommands {
    /// Show every node with its derived status
    Status {
        /// Outline file (YAML or JSON)
        outline: PathBuf,
    },
    /// Recommend the next node to work on
    Next {
        /// Outline file (YAML or JSON)
        outline: PathBuf,
    },
    /// Record a visit to a node
    Visit {
        /// Outline file (YAML or JSON)
        outline: PathBuf,
        /// Node id
        node: String,
    },
    /// Start an unlocked node
    Start {
        /// Outline file (YAML or JSON)
        outline: PathBuf,
        /// Node id
        node: String,
    },
    /// Complete an unlocked node
    Complete {
        /// Outline file (YAML or JSON)
        outline: PathBuf,
        /// Node id
        node: String,
    },
    /// Check an outline for structural problems
    Validate {
        /// Outline file (YAML or JSON)
        outline: PathBuf,
    },
}

#[derive(Debug, Serialize)]
pub struct NodeRow {
    pub id: String,
    pub title: String,
    pub state: NodeState,
}

#[derive(Debug, Serialize)]
pub struct NodeStatusOutput {
    pub outline: String,
    pub nodes: Vec<NodeRow>,
    pub next: Option<String>,
    pub summary: OutlineSummary,
}

impl CommandOutput for NodeStatusOutput {
    fn to_human(&self) -> String {
        let mut table = list_table(&["id", "title", "status"]);
        for node in &self.nodes {
            table.add_row(vec![
                node.id.clone(),
                node.title.clone(),
                colorize_state(node.state).to_string(),
            ]);
        }
        let mut lines = vec![
            format!(
                "{}: {}/{} completed ({}%)",
                self.outline, self.summary.completed, self.summary.total, self.summary.percent_complete
            ),
            table.to_string(),
        ];
        if let Some(next) = &self.next {
            lines.push(format!("\nNext: {next}"));
        }
        lines.join("\n")
    }
}

#[derive(Debug, Serialize)]
pub struct NextOutput {
    pub outline: String,
    pub next: Option<String>,
    pub title: Option<String>,
}

impl CommandOutput for NextOutput {
    fn to_human(&self) -> String {
        match (&self.next, &self.title) {
            (Some(id), Some(title)) => format!("Next: {title} ({id})"),
            (Some(id), None) => format!("Next: {id}"),
            _ => "Nothing left to do in this outline.".to_string(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct NodeActionOutput {
    pub success: bool,
    pub message: String,
    pub node: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub progress: Option<NodeProgress>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub xp: Option<XpGain>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub newly_unlocked: Vec<String>,
}

impl CommandOutput for NodeActionOutput {
    fn to_human(&self) -> String {
        if !self.success {
            return action_failure(&self.message);
        }
        let mut lines = vec![action_success(&self.message)];
        if let Some(gain) = &self.xp {
            lines.push(format!("  +{} XP (total {})", gain.amount, gain.total_xp));
        }
        if !self.newly_unlocked.is_empty() {
            lines.push(format!("  unlocked: {}", self.newly_unlocked.join(", ")));
        }
        lines.join("\n")
    }
}

#[derive(Debug, Serialize)]
pub struct ValidateOutput {
    pub outline: String,
    #[serde(flatten)]
    pub report: ForestReport,
}

impl CommandOutput for ValidateOutput {
    fn to_human(&self) -> String {
        let mut lines = vec![action_success(&format!(
            "{}: {} nodes, structure ok",
            self.outline, self.report.node_count
        ))];
        for unknown in &self.report.unknown_prerequisites {
            lines.push(action_warning(&format!(
                "{} requires unknown node '{}' and will stay locked",
                unknown.node, unknown.prerequisite
            )));
        }
        lines.join("\n")
    }
}

pub fn execute(args: NodesArgs, config: &Config, json_mode: bool) -> Result<()> {
    if let NodesCommands::Validate { outline } = &args.command {
        let outline = load_outline(outline)?;
        let report = UnlockResolver::new().validate(&outline.nodes)?;
        output(
            &ValidateOutput {
                outline: outline.id,
                report,
            },
            json_mode,
        );
        return Ok(());
    }

    let mut engine = open_engine(config)?;

    match args.command {
        NodesCommands::Status { outline } => {
            let outline = load_outline(&outline)?;
            let view = engine.outline_view(&outline.id, &outline.nodes)?;
            let flat = FlatForest::new(&outline.nodes);
            let nodes = view
                .nodes
                .into_iter()
                .map(|(id, state)| NodeRow {
                    title: flat.get(&id).map(|node| node.title.clone()).unwrap_or_default(),
                    id,
                    state,
                })
                .collect();
            let out = NodeStatusOutput {
                outline: view.outline_id,
                nodes,
                next: view.next,
                summary: view.summary,
            };
            output(&out, json_mode);
        }

        NodesCommands::Next { outline } => {
            let outline = load_outline(&outline)?;
            let view = engine.outline_view(&outline.id, &outline.nodes)?;
            let title = view.next.as_deref().and_then(|id| {
                FlatForest::new(&outline.nodes)
                    .get(id)
                    .map(|node| node.title.clone())
            });
            let out = NextOutput {
                outline: view.outline_id,
                next: view.next,
                title,
            };
            output(&out, json_mode);
        }

        NodesCommands::Visit { outline, node } => {
            let outline = load_outline(&outline)?;
            let progress = engine.visit_node(&outline.id, &outline.nodes, &node)?;
            let out = NodeActionOutput {
                success: true,
                message: format!("Visited {node} ({} visits)", progress.visit_count),
                node,
                progress: Some(progress),
                xp: None,
                newly_unlocked: Vec::new(),
            };
            output(&out, json_mode);
        }

        NodesCommands::Start { outline, node } => {
            let outline = load_outline(&outline)?;
            let transition = engine.start_node(&outline.id, &outline.nodes, &node)?;
            let progress = engine.outline(&outline.id)?.get(&node).cloned();
            let message = if transition.is_applied() {
                format!("Started {node}")
            } else {
                format!("{node} is locked or already underway")
            };
            let out = NodeActionOutput {
                success: transition.is_applied(),
                message,
                node,
                progress,
                xp: None,
                newly_unlocked: Vec::new(),
            };
            output(&out, json_mode);
        }

        NodesCommands::Complete { outline, node } => {
            let outline = load_outline(&outline)?;
            let result = engine.complete_node(&outline.id, &outline.nodes, &node)?;
            let progress = engine.outline(&outline.id)?.get(&node).cloned();
            let message = if result.applied {
                format!("Completed {node}")
            } else {
                format!("{node} is locked or already completed")
            };
            let out = NodeActionOutput {
                success: result.applied,
                message,
                node,
                progress,
                xp: result.xp,
                newly_unlocked: result.newly_unlocked,
            };
            output(&out, json_mode);
        }

        NodesCommands::Validate { .. } => {}
    }

    warn_unsaved(&mut engine);
    Ok(())
}
