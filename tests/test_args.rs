use std::path::PathBuf;

use clap::Parser;
use cloudmask::cli::args::{Cli, Command, ConfigCommand, RegexCommand};

#[test]
fn test_mask_args() {
    let cli = Cli::parse_from([
        "cloudmask",
        "mask",
        "report.log",
        "--profile",
        "Prod AWS",
        "--mapping",
        "out-mapping.json",
        "--diff",
    ]);

    assert!(!cli.yes);
    assert!(cli.engine_url.is_none());
    match cli.command {
        Command::Mask(args) => {
            assert_eq!(args.input, Some(PathBuf::from("report.log")));
            assert_eq!(args.profile.as_deref(), Some("Prod AWS"));
            assert_eq!(args.mapping, Some(PathBuf::from("out-mapping.json")));
            assert!(args.output.is_none());
            assert!(args.diff);
        }
        other => panic!("unexpected command: {:?}", other),
    }
}

#[test]
fn test_global_flags_after_subcommand() {
    let cli = Cli::parse_from([
        "cloudmask",
        "unmask",
        "--mapping",
        "m.json",
        "--engine-url",
        "http://engine:9000",
        "--timeout",
        "5",
        "-y",
    ]);

    assert_eq!(cli.engine_url.as_deref(), Some("http://engine:9000"));
    assert_eq!(cli.timeout, Some(5));
    assert!(cli.yes);
    assert!(matches!(cli.command, Command::Unmask(ref args) if args.input.is_none()));
}

#[test]
fn test_regex_test_args() {
    let cli = Cli::parse_from(["cloudmask", "regex", "test", r"vpc-\w+", "vpc-1 vpc-2"]);
    match cli.command {
        Command::Regex(RegexCommand::Test { pattern, text }) => {
            assert_eq!(pattern, r"vpc-\w+");
            assert_eq!(text, "vpc-1 vpc-2");
        }
        other => panic!("unexpected command: {:?}", other),
    }
}

#[test]
fn test_config_subcommands() {
    let cli = Cli::parse_from(["cloudmask", "config", "add-pattern", "prod", "ticket", r"TICKET-\d+"]);
    match cli.command {
        Command::Config(ConfigCommand::AddPattern {
            profile,
            name,
            regex,
            sample,
        }) => {
            assert_eq!(profile, "prod");
            assert_eq!(name, "ticket");
            assert_eq!(regex, r"TICKET-\d+");
            assert!(sample.is_none());
        }
        other => panic!("unexpected command: {:?}", other),
    }

    let cli = Cli::parse_from(["cloudmask", "config", "import", "prod.yaml"]);
    assert!(matches!(
        cli.command,
        Command::Config(ConfigCommand::Import { ref name, .. }) if name.is_none()
    ));

    let cli = Cli::parse_from(["cloudmask", "config", "show", "prod", "--format", "yaml"]);
    assert!(matches!(cli.command, Command::Config(ConfigCommand::Show { ref format, .. }) if format == "yaml"));
}

#[test]
fn test_missing_subcommand_is_error() {
    assert!(Cli::try_parse_from(["cloudmask"]).is_err());
}

#[test]
fn test_health_subcommand() {
    let cli = Cli::parse_from(["cloudmask", "health", "--engine-url", "http://localhost:9000"]);
    assert!(matches!(cli.command, Command::Health));
    assert_eq!(cli.engine_url.as_deref(), Some("http://localhost:9000"));
}
