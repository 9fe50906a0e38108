// gametail - main.rs
//
// Command-line host. Handles:
// 1. CLI argument parsing
// 2. config.toml loading (first run writes a commented default)
// 3. Logging initialisation (debug mode support)
// 4. Running one tail session and printing its lines to stdout

use clap::Parser;
use gametail::app::dispatch::{
    dispatch_for, dispatch_pending, DispatchStatus, LineConsumer, OverlayFeed,
};
use gametail::app::tail::{TailConfig, TailManager};
use gametail::core::format::OutputStyle;
use gametail::core::model::{StopReason, TaggedLine, TailPhase};
use gametail::platform::config::{self, PlatformPaths};
use gametail::platform::process::{ProcessLocator, SystemProcessTable};
use gametail::util;
use std::io::Write;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use std::time::Duration;

/// How long the host blocks on the channel before re-checking the session.
const HOST_WAIT: Duration = Duration::from_millis(500);

/// ANSI "clear screen, cursor home", used by window mode.
const CLEAR_SCREEN: &str = "\u{1b}[2J\u{1b}[H";

/// gametail - follow a game's log file while the game runs.
///
/// Waits for the game process to start, locates its log file, and prints
/// every new line as it is written. Exits when the game exits (unless
/// --no-auto-exit is given).
#[derive(Parser, Debug)]
#[command(name = "gametail", version, about)]
struct Cli {
    /// Follow this log file directly instead of locating it via the game process.
    #[arg(short = 'f', long = "file")]
    file: Option<PathBuf>,

    /// Executable name of the game process (exact, case-sensitive).
    #[arg(short = 'p', long = "process-name")]
    process_name: Option<String>,

    /// Keep running after the game exits.
    #[arg(long = "no-auto-exit")]
    no_auto_exit: bool,

    /// Delay between polls when no new line is available.
    #[arg(long = "poll-interval-ms", value_parser = clap::value_parser!(u64).range(100..=10_000))]
    poll_interval_ms: Option<u64>,

    /// Output style: plain, ansi, or html.
    #[arg(short = 's', long = "style")]
    style: Option<OutputStyle>,

    /// Number of lines kept in window mode.
    #[arg(short = 'n', long = "lines", value_parser = clap::value_parser!(u64).range(1..=100))]
    lines: Option<u64>,

    /// Redraw a fixed window of recent lines instead of streaming.
    #[arg(short = 'w', long = "window")]
    window: bool,

    /// Use this config file instead of the platform default.
    #[arg(short = 'c', long = "config")]
    config: Option<PathBuf>,

    /// Enable debug logging (equivalent to RUST_LOG=debug).
    #[arg(short = 'd', long = "debug")]
    debug: bool,
}

/// Prints tailed lines to stdout, either streamed or as a redrawn window.
struct ConsoleSink {
    feed: OverlayFeed,
    style: OutputStyle,
    window: bool,
}

impl ConsoleSink {
    fn write(&self, text: &str) {
        let mut out = std::io::stdout().lock();
        if let Err(e) = writeln!(out, "{text}").and_then(|_| out.flush()) {
            tracing::debug!(error = %e, "stdout write failed");
        }
    }
}

impl LineConsumer for ConsoleSink {
    fn on_line(&mut self, line: TaggedLine) {
        if self.window {
            self.feed.on_line(line);
            self.write(&format!("{CLEAR_SCREEN}{}", self.feed.render()));
        } else {
            self.write(&self.style.render(&line));
        }
    }

    fn on_producer_ended(&mut self, reason: StopReason) {
        self.feed.on_producer_ended(reason);
    }

    fn on_phase(&mut self, phase: TailPhase) {
        tracing::info!(%phase, "Tail phase changed");
        self.feed.on_phase(phase);
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Config is read before logging starts so its level can seed the filter;
    // its warnings are re-emitted once the subscriber is up.
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| PlatformPaths::resolve().config_file());
    let (mut app_config, config_warnings) = config::load_config(&config_path);

    util::logging::init(cli.debug, app_config.log_level.as_deref());

    tracing::info!(
        version = util::constants::APP_VERSION,
        debug = cli.debug,
        config = %config_path.display(),
        "gametail starting"
    );
    for warning in &config_warnings {
        tracing::warn!(warning = %warning, "Config warning");
    }
    if cli.config.is_none() {
        if let Err(e) = config::write_default_config(&config_path) {
            tracing::warn!(error = %e, "Could not write default config");
        }
    }

    // CLI flags override config.toml.
    if let Some(name) = cli.process_name {
        app_config.process_name = name;
    }
    if cli.no_auto_exit {
        app_config.auto_exit = false;
    }
    if let Some(ms) = cli.poll_interval_ms {
        app_config.poll_interval_ms = ms;
    }
    if let Some(style) = cli.style {
        app_config.style = style;
    }
    if let Some(n) = cli.lines {
        app_config.line_count = n as usize;
    }

    let mut tail_config = TailConfig::from_app_config(&app_config);
    tail_config.log_path_override = cli.file;

    let locator = ProcessLocator::new(
        Arc::new(SystemProcessTable::new()),
        app_config.log_file_name.clone(),
    );

    let mut sink = ConsoleSink {
        feed: OverlayFeed::new(app_config.line_count, app_config.style),
        style: app_config.style,
        window: cli.window,
    };

    let mut manager = TailManager::new();
    manager.start_tail(tail_config, locator);

    let reason = loop {
        match dispatch_for(&manager, &mut sink, HOST_WAIT) {
            DispatchStatus::Ended(reason) => break reason,
            DispatchStatus::Running if manager.is_active() => {}
            DispatchStatus::Running => {
                // The thread may have finished right after the wait timed out.
                if let DispatchStatus::Ended(reason) = dispatch_pending(&manager, &mut sink) {
                    break reason;
                }
                tracing::error!("Tail thread exited without a completion signal");
                return ExitCode::FAILURE;
            }
        }
    };

    manager.stop_tail();
    tracing::info!(?reason, "gametail finished");
    ExitCode::SUCCESS
}
