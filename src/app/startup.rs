//! Application startup: arguments, configuration, logging, then one scenario run

use crate::app::cli::args::Args;
use crate::app::cli::config::{load_config, resolve_color, resolve_logging, resolve_settings};
use crate::app::report::{render_report, render_report_json};
use crate::core::cancel::{install_signal_handlers, CancellationToken};
use crate::core::error_handling::log_error_with_context;
use crate::core::logging::init_logging;
use crate::pipeline::{ConsoleObserver, Pipeline, PipelineObserver, PipelineReport, SilentObserver};
use std::sync::Arc;

pub const EXIT_DRAINED: i32 = 0;
pub const EXIT_NOT_DRAINED: i32 = 1;
pub const EXIT_CONFIG_ERROR: i32 = 2;
pub const EXIT_SIGNALLED: i32 = 130;

/// Run the application and return the process exit code
pub async fn startup() -> i32 {
    let help_color = !std::env::args().any(|arg| arg == "--no-color") && resolve_color(None, None);
    let args = Args::parse_from_env(help_color);

    let config = match load_config(args.config_file.as_deref()).await {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXIT_CONFIG_ERROR;
        }
    };

    let logging = match resolve_logging(&args, &config) {
        Ok(logging) => logging,
        Err(e) => {
            eprintln!("Error: {}", e);
            return EXIT_CONFIG_ERROR;
        }
    };
    colored::control::set_override(logging.color);
    if let Err(e) = init_logging(
        logging.level.as_deref(),
        logging.format,
        logging.file.as_deref(),
        logging.color,
    ) {
        eprintln!("Error: failed to initialise logging: {}", e);
        return EXIT_CONFIG_ERROR;
    }

    log::info!("drainq {} starting", env!("CARGO_PKG_VERSION"));
    if let Some(source) = &config.source {
        log::debug!("Loaded configuration from {}", source.display());
    }

    let settings = match resolve_settings(&args, &config) {
        Ok(settings) => settings,
        Err(e) => {
            log_error_with_context(&e, "Configuration loading");
            return EXIT_CONFIG_ERROR;
        }
    };
    log::debug!("Resolved settings: {:?}", settings);

    let root = CancellationToken::new();
    install_signal_handlers(&root);

    let observer: Arc<dyn PipelineObserver> = if args.quiet {
        Arc::new(SilentObserver)
    } else {
        Arc::new(ConsoleObserver)
    };
    let pipeline = match Pipeline::new(settings) {
        Ok(pipeline) => pipeline
            .with_observer(observer)
            .with_cancellation(root.clone()),
        Err(e) => {
            log_error_with_context(&e, "Scenario setup");
            return EXIT_CONFIG_ERROR;
        }
    };

    let report = match tokio::task::spawn_blocking(move || pipeline.run()).await {
        Ok(Ok(report)) => report,
        Ok(Err(e)) => {
            log_error_with_context(&e, "Scenario run");
            return EXIT_NOT_DRAINED;
        }
        Err(e) => {
            log::error!("FATAL: scenario task failed: {}", e);
            return EXIT_NOT_DRAINED;
        }
    };

    if args.json {
        match render_report_json(&report) {
            Ok(json) => println!("{}", json),
            Err(e) => log::error!("Failed to serialise report: {}", e),
        }
    } else {
        println!("{}", render_report(&report, logging.color));
    }

    exit_code(&report, root.is_cancelled())
}

/// Map a finished run onto the process exit code
pub fn exit_code(report: &PipelineReport, signalled: bool) -> i32 {
    if signalled {
        EXIT_SIGNALLED
    } else if report.is_drained() {
        EXIT_DRAINED
    } else {
        EXIT_NOT_DRAINED
    }
}
