//! Stagehand daemon.
//!
//! # Startup
//!
//! ```text
//!   argv ──▶ trim_space_of_arg ──▶ clap ──▶ StartupOptions
//!                                               │
//!   defaults ─▶ config file ─▶ STAGEHAND_* env ─▶ flags ─▶ ConfigStore
//!                                                               │
//!                                                  validate_config (all errors)
//!                                                               │
//!                                  invalid ◀───────────────────┴──────▶ Settings
//!                               (report, exit 1)                          │
//!                                                daemon.enable? ─▶ re-spawn detached
//!                                                                         │
//!                                      logging ─▶ pid file ─▶ status listener ─▶ signal
//! ```

use std::ffi::OsString;
use std::process::ExitCode;

use clap::Parser;

use stagehand::cli::{CheckReport, Cli, Command};
use stagehand::config::trim_os_arg;
use stagehand::config::Settings;
use stagehand::lifecycle::daemonize::{detach_session, is_daemon_child, spawn_background};
use stagehand::lifecycle::pidfile::{check_not_running, read_pid};
use stagehand::lifecycle::signals::{send_terminate, shutdown_signal};
use stagehand::lifecycle::{prepare, utf8_env, PidFile, Shutdown, StartupError};
use stagehand::net::StatusListener;
use stagehand::observability::{init_console_logging, init_logging};

fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let args: Vec<OsString> = std::env::args_os().map(trim_os_arg).collect();
    let cli = Cli::parse_from(&args);

    match &cli.command {
        Command::Start => start(&cli, &args[1..]),
        Command::Stop => stop(&cli),
        Command::Check { json } => check(&cli, *json),
    }
}

/// Build and validate the configuration, reporting every problem on stderr.
fn load_settings(cli: &Cli) -> Result<Option<Settings>, Box<dyn std::error::Error>> {
    match prepare(&cli.startup_options(), utf8_env(std::env::vars_os())) {
        Ok((_, settings)) => Ok(Some(settings)),
        Err(StartupError::Invalid(errors)) => {
            eprint!("invalid configuration: {}", errors);
            Ok(None)
        }
        Err(e) => Err(e.into()),
    }
}

fn start(cli: &Cli, args: &[OsString]) -> Result<ExitCode, Box<dyn std::error::Error>> {
    let Some(settings) = load_settings(cli)? else {
        return Ok(ExitCode::FAILURE);
    };

    if settings.daemon.enable && !is_daemon_child() {
        // the child's stderr is discarded, so refuse here while it can be seen
        check_not_running(&settings.server.pid_file, own_pid())?;
        let pid = spawn_background(args)?;
        println!("{} started in background, pid {}", env!("CARGO_PKG_NAME"), pid);
        return Ok(ExitCode::SUCCESS);
    }
    if is_daemon_child() {
        detach_session()?;
    }

    init_logging(&settings.log)?;
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        daemon = settings.daemon.enable,
        log_file = %settings.log.file_name.display(),
        log_level = %settings.log.level,
        port = settings.server.port,
        pid_file = %settings.server.pid_file.display(),
        "Starting"
    );

    let pid_file = match PidFile::create(&settings.server.pid_file) {
        Ok(pid_file) => pid_file,
        Err(e) => {
            tracing::error!(error = %e, "Pid file unavailable");
            return Err(e.into());
        }
    };

    let runtime = tokio::runtime::Runtime::new()?;
    let result = runtime.block_on(run(settings));

    drop(pid_file);
    match result {
        Ok(()) => {
            tracing::info!("Shutdown complete");
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => {
            tracing::error!(error = %e, "Daemon failed");
            Err(e)
        }
    }
}

async fn run(settings: Settings) -> Result<(), Box<dyn std::error::Error>> {
    let shutdown = Shutdown::new();
    let listener = StatusListener::bind(&settings.server).await?;
    let server = tokio::spawn(listener.run(shutdown.subscribe()));

    let signal = shutdown_signal().await?;
    shutdown.trigger(signal);

    let served = server.await??;
    tracing::info!(served, "Listener drained");
    Ok(())
}

fn own_pid() -> i32 {
    i32::try_from(std::process::id()).unwrap_or(i32::MAX)
}

fn stop(cli: &Cli) -> Result<ExitCode, Box<dyn std::error::Error>> {
    init_console_logging("info")?;
    let Some(settings) = load_settings(cli)? else {
        return Ok(ExitCode::FAILURE);
    };

    let pid_file = &settings.server.pid_file;
    match read_pid(pid_file)? {
        Some(pid) => {
            send_terminate(pid)?;
            tracing::info!(pid, pid_file = %pid_file.display(), "Sent SIGTERM");
            Ok(ExitCode::SUCCESS)
        }
        None => {
            eprintln!("not running: {} does not exist", pid_file.display());
            Ok(ExitCode::FAILURE)
        }
    }
}

fn check(cli: &Cli, json: bool) -> Result<ExitCode, Box<dyn std::error::Error>> {
    init_console_logging("warn")?;
    let result = match prepare(&cli.startup_options(), utf8_env(std::env::vars_os())) {
        Ok((_, settings)) => Ok(settings),
        Err(StartupError::Invalid(errors)) => Err(errors),
        Err(e) => return Err(e.into()),
    };

    let report = CheckReport::from_result(result);
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else if let Some(settings) = &report.settings {
        println!("configuration is valid\n");
        println!("{}", toml::to_string_pretty(settings)?);
    } else {
        println!("configuration is invalid, {} error(s):", report.errors.len());
        for entry in &report.errors {
            println!("  * [{}] {}", entry.key, entry.message);
        }
    }

    Ok(if report.valid {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}
