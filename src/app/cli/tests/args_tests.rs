//! Tests for CLI argument parsing

use crate::app::cli::args::*;

static COMMAND_NAME: &str = "drainq";

#[test]
fn test_no_arguments_leaves_everything_unset() {
    let args = Args::try_parse_args([COMMAND_NAME]).unwrap();

    assert_eq!(args.count, None);
    assert_eq!(args.produce_interval_ms, None);
    assert_eq!(args.join_timeout_ms, None);
    assert!(!args.cancel_on_join_timeout);
    assert!(!args.quiet);
    assert!(!args.json);
    assert_eq!(args.color_choice(), None);
}

#[test]
fn test_scenario_options() {
    let args = Args::try_parse_args([
        COMMAND_NAME,
        "-n",
        "25",
        "--produce-interval-ms",
        "5",
        "--process-delay-ms=10",
        "--drain-timeout-ms",
        "300",
        "--join-timeout-ms",
        "2000",
        "--poll-interval-ms",
        "20",
        "--cancel-on-join-timeout",
    ])
    .unwrap();

    assert_eq!(args.count, Some(25));
    assert_eq!(args.produce_interval_ms, Some(5));
    assert_eq!(args.process_delay_ms, Some(10));
    assert_eq!(args.drain_timeout_ms, Some(300));
    assert_eq!(args.join_timeout_ms, Some(2000));
    assert_eq!(args.poll_interval_ms, Some(20));
    assert!(args.cancel_on_join_timeout);
}

#[test]
fn test_output_and_logging_options() {
    let args = Args::try_parse_args([
        COMMAND_NAME,
        "--quiet",
        "--json",
        "-l",
        "debug",
        "-o",
        "ext",
        "-f",
        "drainq.log",
        "-c",
        "custom.toml",
    ])
    .unwrap();

    assert!(args.quiet);
    assert!(args.json);
    assert_eq!(args.log_level.as_deref(), Some("debug"));
    assert_eq!(args.log_format.as_deref(), Some("ext"));
    assert_eq!(args.log_file, Some("drainq.log".into()));
    assert_eq!(args.config_file, Some("custom.toml".into()));
}

#[test]
fn test_color_flags() {
    let on = Args::try_parse_args([COMMAND_NAME, "--color"]).unwrap();
    let off = Args::try_parse_args([COMMAND_NAME, "--no-color"]).unwrap();

    assert_eq!(on.color_choice(), Some(true));
    assert_eq!(off.color_choice(), Some(false));
    assert!(Args::try_parse_args([COMMAND_NAME, "--color", "--no-color"]).is_err());
}

#[test]
fn test_rejects_bad_values() {
    assert!(Args::try_parse_args([COMMAND_NAME, "--count", "-3"]).is_err());
    assert!(Args::try_parse_args([COMMAND_NAME, "--count", "many"]).is_err());
    assert!(Args::try_parse_args([COMMAND_NAME, "--log-format", "xml"]).is_err());
    assert!(Args::try_parse_args([COMMAND_NAME, "--log-level", "loud"]).is_err());
    assert!(Args::try_parse_args([COMMAND_NAME, "--unknown"]).is_err());
}

#[test]
fn test_long_version_includes_build_info() {
    let err = Args::try_parse_args([COMMAND_NAME, "--version"]).unwrap_err();
    assert_eq!(err.kind(), clap::error::ErrorKind::DisplayVersion);

    let command = Args::command_with_build_info(false);
    let version = command.render_long_version();
    assert!(version.contains(env!("CARGO_PKG_VERSION")));
    assert!(version.contains("config schema:"));
    assert!(version.contains(crate::GIT_HASH));
}
