//! Tests for the mgit CLI argument parsing and error taxonomy.

use super::*;
use clap::Parser;

#[test]
fn parses_list_command_with_defaults() {
    let cli = Cli::try_parse_from(["mgit", "list", "contoso/*/*"]).unwrap();
    match cli.command {
        Commands::List {
            query,
            provider,
            format,
            limit,
        } => {
            assert_eq!(query, "contoso/*/*");
            assert!(provider.is_none());
            assert_eq!(format, ListFormat::Human);
            assert!(limit.is_none());
        }
        _ => panic!("expected List command"),
    }
}

#[test]
fn parses_sync_command_with_force_and_concurrency() {
    let cli = Cli::try_parse_from([
        "mgit",
        "sync",
        "contoso/*/*",
        "/tmp/checkouts",
        "--force",
        "--yes",
        "--concurrency",
        "8",
    ])
    .unwrap();
    match cli.command {
        Commands::Sync {
            query,
            path,
            force,
            yes,
            concurrency,
            ..
        } => {
            assert_eq!(query, "contoso/*/*");
            assert_eq!(path, PathBuf::from("/tmp/checkouts"));
            assert!(force);
            assert!(yes);
            assert_eq!(concurrency, Some(8));
        }
        _ => panic!("expected Sync command"),
    }
}

#[test]
fn rejects_sync_missing_required_path() {
    let result = Cli::try_parse_from(["mgit", "sync", "contoso/*/*"]);
    assert!(result.is_err());
}

#[test]
fn update_mode_arg_maps_to_core_update_mode() {
    assert_eq!(UpdateMode::from(UpdateModeArg::Skip), UpdateMode::Skip);
    assert_eq!(UpdateMode::from(UpdateModeArg::Pull), UpdateMode::Pull);
    assert_eq!(UpdateMode::from(UpdateModeArg::Force), UpdateMode::Force);
}

#[test]
fn exit_codes_match_error_taxonomy() {
    assert_eq!(CliError::Validation("bad query".into()).exit_code(), 2);
    assert_eq!(CliError::Cancelled.exit_code(), 130);
    assert_eq!(CliError::Internal("invariant violated".into()).exit_code(), 3);
    assert_eq!(CliError::SyncFailed { failed: 2 }.exit_code(), 1);
    assert_eq!(CliError::ResolverFailed("boom".into()).exit_code(), 1);
}

#[test]
fn parses_login_command() {
    let cli = Cli::try_parse_from(["mgit", "login", "github"]).unwrap();
    match cli.command {
        Commands::Login { kind } => assert_eq!(kind, LoginProviderKind::GitHub),
        _ => panic!("expected Login command"),
    }
}

#[test]
fn global_flags_parse_before_subcommand() {
    let cli = Cli::try_parse_from([
        "mgit",
        "--log-level",
        "debug",
        "--json-logs",
        "status",
        "/tmp/checkouts",
    ])
    .unwrap();
    assert_eq!(cli.log_level, "debug");
    assert!(cli.json_logs);
}
