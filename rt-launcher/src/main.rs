/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

use std::path::PathBuf;

use clap::error::ErrorKind;
use clap::Parser;
use tracing::{error, info};

use rt_launcher::config::LauncherConfig;
use rt_launcher::error::{ExitCode, LaunchError};
use rt_launcher::launcher;

// ── CLI argument definition ───────────────────────────────────────────────────

/// Launch every task of a real-time schedule behind a single-use barrier.
///
/// Example:
///   rt-launcher -c launcher.yaml tasksets/video_pipeline
#[derive(Debug, Parser)]
#[command(
    name = "rt-launcher",
    version,
    about = "Real-time schedule launcher",
    long_about = None,
)]
struct Cli {
    /// Taskset/schedule file name without any extension (`<BASE>.rtpt`,
    /// `<BASE>.rtps`).
    base: String,

    /// Path to the YAML launcher configuration file.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,
}

fn load_config(path: Option<&PathBuf>) -> Result<LauncherConfig, LaunchError> {
    match path {
        Some(path) => LauncherConfig::load_from_file(path).map_err(|cause| LaunchError::Config {
            path: path.clone(),
            cause,
        }),
        None => Ok(LauncherConfig::default()),
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> std::process::ExitCode {
    // Initialise structured logging on stderr; stdout belongs to the tasks.
    // Level is controlled by the RUST_LOG env-var (e.g. RUST_LOG=debug).
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    // ── Parse CLI arguments ───────────────────────────────────────────────────
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return ExitCode::Success.into();
        }
        Err(e) => {
            let _ = e.print();
            let err = LaunchError::Argument(
                "The program must receive a single argument which is the taskset/schedule filename without any extension"
                    .to_string(),
            );
            error!("{}", err);
            return err.exit_code().into();
        }
    };

    info!(base = %cli.base, config = ?cli.config, "rt-launcher starting up");

    let result = load_config(cli.config.as_ref()).and_then(|config| launcher::run(&cli.base, &config));

    match result {
        Ok(report) => {
            info!(
                tasks = report.launched.len(),
                reaped = report.reaped,
                "Launch complete"
            );
            ExitCode::Success.into()
        }
        Err(e) => {
            error!("{}", e);
            e.exit_code().into()
        }
    }
}
