mod common;

use std::fs;

use common::{stage, temp_dir};
use journey::cli::commands::nodes::{self, NodesArgs, NodesCommands};
use journey::cli::commands::stage::{self as stage_cmd, StageArgs, StageCommands};
use journey::cli::commands::xp::{self, XpArgs, XpCommands};
use journey::cli::context::open_engine;
use journey::domain::models::{Config, ProgressStatus, XpSource};
use tempfile::TempDir;

fn config_in(dir: &TempDir) -> Config {
    let mut config = Config::default();
    config.storage.data_dir = dir.path().join(".journey").to_string_lossy().into_owned();
    config
}

#[test]
fn test_stage_commands_persist_between_invocations() {
    let dir = temp_dir();
    let config = config_in(&dir);

    for _ in 0..2 {
        stage_cmd::execute(
            StageArgs {
                command: StageCommands::Complete,
            },
            &config,
            true,
        )
        .unwrap();
    }
    stage_cmd::execute(
        StageArgs {
            command: StageCommands::Go { stage: stage(1) },
        },
        &config,
        true,
    )
    .unwrap();

    let engine = open_engine(&config).unwrap();
    assert_eq!(engine.stages().current_stage(), stage(3));
    assert_eq!(engine.stages().viewing_stage(), stage(1));
    assert_eq!(engine.ledger().current_xp(), 100);
}

#[test]
fn test_locked_stage_is_not_an_error() {
    let dir = temp_dir();
    let config = config_in(&dir);

    let result = stage_cmd::execute(
        StageArgs {
            command: StageCommands::Go { stage: stage(6) },
        },
        &config,
        true,
    );
    assert!(result.is_ok());
    assert_eq!(open_engine(&config).unwrap().stages().viewing_stage(), stage(1));
}

#[test]
fn test_elevated_config_bypasses_guards() {
    let dir = temp_dir();
    let mut config = config_in(&dir);
    config.access.elevated = true;

    stage_cmd::execute(
        StageArgs {
            command: StageCommands::Go { stage: stage(6) },
        },
        &config,
        true,
    )
    .unwrap();
    assert_eq!(open_engine(&config).unwrap().stages().viewing_stage(), stage(6));
}

#[test]
fn test_xp_add_by_source() {
    let dir = temp_dir();
    let config = config_in(&dir);

    xp::execute(
        XpArgs {
            command: XpCommands::Add {
                amount: None,
                source: Some(XpSource::Task),
            },
        },
        &config,
        true,
    )
    .unwrap();

    assert!(xp::execute(
        XpArgs {
            command: XpCommands::Add {
                amount: None,
                source: None,
            },
        },
        &config,
        true,
    )
    .is_err());

    assert_eq!(open_engine(&config).unwrap().ledger().current_xp(), 15);
}

#[test]
fn test_nodes_complete_from_outline_file() {
    let dir = temp_dir();
    let config = config_in(&dir);
    let outline = dir.path().join("guided.yaml");
    fs::write(
        &outline,
        "id: guided\nnodes:\n  - id: intro\n    title: Intro\n    children:\n      - id: tools\n        title: Tools\n        prerequisites: [intro]\n",
    )
    .unwrap();

    let run = |command| nodes::execute(NodesArgs { command }, &config, true);

    run(NodesCommands::Complete {
        outline: outline.clone(),
        node: "tools".to_string(),
    })
    .unwrap();
    run(NodesCommands::Complete {
        outline: outline.clone(),
        node: "intro".to_string(),
    })
    .unwrap();
    assert!(run(NodesCommands::Visit {
        outline: outline.clone(),
        node: "ghost".to_string(),
    })
    .is_err());
    run(NodesCommands::Validate {
        outline: outline.clone(),
    })
    .unwrap();

    let mut engine = open_engine(&config).unwrap();
    let book = engine.outline("guided").unwrap();
    assert_eq!(book.status("intro"), ProgressStatus::Completed);
    assert_eq!(book.status("tools"), ProgressStatus::NotStarted);
    assert_eq!(engine.ledger().current_xp(), 10);
}
