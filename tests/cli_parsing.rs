use std::path::PathBuf;

use clap::Parser;
use journey::cli::commands::nodes::NodesCommands;
use journey::cli::commands::stage::StageCommands;
use journey::cli::commands::trophy::TrophyCommands;
use journey::cli::commands::xp::XpCommands;
use journey::cli::{Cli, Commands};
use journey::domain::models::{Rarity, StageId, XpSource};

#[test]
fn test_parse_status_with_global_flags() {
    let cli = Cli::try_parse_from(["journey", "status", "--json", "--elevated"]).unwrap();
    assert!(cli.json);
    assert!(cli.elevated);
    assert!(matches!(cli.command, Commands::Status));
}

#[test]
fn test_parse_stage_go() {
    let cli = Cli::try_parse_from(["journey", "stage", "go", "3"]).unwrap();
    match cli.command {
        Commands::Stage(args) => match args.command {
            StageCommands::Go { stage } => assert_eq!(stage, StageId::new(3).unwrap()),
            other => panic!("Wrong stage command: {other:?}"),
        },
        _ => panic!("Wrong top-level command"),
    }
}

#[test]
fn test_parse_stage_out_of_range_fails() {
    assert!(Cli::try_parse_from(["journey", "stage", "go", "9"]).is_err());
    assert!(Cli::try_parse_from(["journey", "stage", "preview", "0"]).is_err());
}

#[test]
fn test_parse_xp_add_amount_or_source() {
    let cli = Cli::try_parse_from(["journey", "xp", "add", "40"]).unwrap();
    match cli.command {
        Commands::Xp(args) => match args.command {
            XpCommands::Add { amount, source } => {
                assert_eq!(amount, Some(40));
                assert!(source.is_none());
            }
            XpCommands::Show => panic!("Wrong xp command"),
        },
        _ => panic!("Wrong top-level command"),
    }

    let cli = Cli::try_parse_from(["journey", "xp", "add", "--source", "quiz"]).unwrap();
    match cli.command {
        Commands::Xp(args) => match args.command {
            XpCommands::Add { source, .. } => assert_eq!(source, Some(XpSource::Quiz)),
            XpCommands::Show => panic!("Wrong xp command"),
        },
        _ => panic!("Wrong top-level command"),
    }
}

#[test]
fn test_parse_xp_add_rejects_both() {
    assert!(Cli::try_parse_from(["journey", "xp", "add", "10", "--source", "task"]).is_err());
    assert!(Cli::try_parse_from(["journey", "xp", "add", "--source", "bribe"]).is_err());
}

#[test]
fn test_parse_trophy_unit_defaults() {
    let cli = Cli::try_parse_from([
        "journey", "trophy", "unit", "sec-101", "--title", "Security Basics",
    ])
    .unwrap();
    match cli.command {
        Commands::Trophy(args) => match args.command {
            TrophyCommands::Unit {
                unit_id,
                title,
                rarity,
            } => {
                assert_eq!(unit_id, "sec-101");
                assert_eq!(title, "Security Basics");
                assert_eq!(rarity, Rarity::Common);
            }
            other => panic!("Wrong trophy command: {other:?}"),
        },
        _ => panic!("Wrong top-level command"),
    }
}

#[test]
fn test_parse_nodes_complete() {
    let cli = Cli::try_parse_from([
        "journey",
        "--config",
        "custom.yaml",
        "nodes",
        "complete",
        "outlines/guided.yaml",
        "intro",
    ])
    .unwrap();
    assert_eq!(cli.config, Some(PathBuf::from("custom.yaml")));
    match cli.command {
        Commands::Nodes(args) => match args.command {
            NodesCommands::Complete { outline, node } => {
                assert_eq!(outline, PathBuf::from("outlines/guided.yaml"));
                assert_eq!(node, "intro");
            }
            other => panic!("Wrong nodes command: {other:?}"),
        },
        _ => panic!("Wrong top-level command"),
    }
}

#[test]
fn test_parse_init_defaults() {
    let cli = Cli::try_parse_from(["journey", "init"]).unwrap();
    match cli.command {
        Commands::Init(args) => {
            assert!(!args.force);
            assert_eq!(args.path, PathBuf::from("."));
        }
        _ => panic!("Wrong top-level command"),
    }
}

#[test]
fn test_missing_subcommand_fails() {
    assert!(Cli::try_parse_from(["journey"]).is_err());
    assert!(Cli::try_parse_from(["journey", "nodes", "visit", "only-file.yaml"]).is_err());
}
