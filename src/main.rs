//! Entry point for the read-aloud terminal reader.
//!
//! - Parse command-line arguments.
//! - Load configuration from `conf/config.toml` (or `--config`).
//! - Run a single-threaded event loop over typed commands and speech engine
//!   notifications. Helper threads only ever send into the loop's channel.

mod cancellation;
mod command;
mod config;
mod document;
mod engine;
mod error;
mod highlight;
mod loader;
mod narration;
mod normalizer;
mod reader;
mod segmenter;
mod voice;

use crate::command::{HELP_TEXT, TerminalCommand};
use crate::config::{load_config, serialize_config};
use crate::engine::{EngineEvent, EspeakEngine, EventSink, SpeechEngine};
use crate::highlight::{HighlightPresenter, TerminalPresenter};
use crate::narration::ControllerSignal;
use crate::reader::{Reader, ReaderCommand};
use anyhow::{Context, Result, anyhow};
use std::env;
use std::io::{self, BufRead};
use std::path::PathBuf;
use std::sync::{Arc, mpsc};
use std::thread;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{EnvFilter, fmt, prelude::*, reload};

type ReloadHandle = reload::Handle<EnvFilter, tracing_subscriber::Registry>;

const DEFAULT_CONFIG_PATH: &str = "conf/config.toml";
const USAGE: &str = "Usage: read-aloud [--config <path>] [--play] [--print-config] [file]";

enum AppEvent {
    Command(TerminalCommand),
    Engine(EngineEvent),
    Quit,
}

#[derive(Debug, PartialEq, Eq)]
struct CliArgs {
    config_path: PathBuf,
    file: Option<PathBuf>,
    autoplay: bool,
    print_config: bool,
}

fn main() {
    let reload_handle = init_tracing();
    if let Err(err) = run(&reload_handle) {
        error!("{err:?}");
        std::process::exit(1);
    }
}

fn run(reload_handle: &ReloadHandle) -> Result<()> {
    let Some(args) = parse_args(env::args().skip(1))? else {
        println!("{USAGE}");
        return Ok(());
    };
    let config = load_config(&args.config_path);
    set_log_level(reload_handle, config.log_level.as_filter_str());
    if args.print_config {
        let text = serialize_config(&config).context("Failed to serialize configuration")?;
        print!("{text}");
        return Ok(());
    }
    info!(
        config = %args.config_path.display(),
        level = %config.log_level,
        mode = %config.segment_mode,
        chunk_size = config.effective_chunk_size(),
        engine = %config.engine_program,
        "Starting read-aloud reader"
    );

    let (tx, rx) = mpsc::channel::<AppEvent>();

    let engine_tx = tx.clone();
    let sink: EventSink = Arc::new(move |event: EngineEvent| {
        if engine_tx.send(AppEvent::Engine(event)).is_err() {
            debug!("Event loop gone; dropping engine event");
        }
    });
    let engine = EspeakEngine::new(config.engine_program.clone(), sink);
    let presenter = TerminalPresenter::stdout(&config);
    let mut reader = Reader::new(engine, presenter, config);

    let quit_tx = tx.clone();
    let load_cancel = reader.cancellation_token();
    ctrlc::set_handler(move || {
        load_cancel.cancel();
        let _ = quit_tx.send(AppEvent::Quit);
    })
    .context("Failed to install Ctrl-C handler")?;

    spawn_stdin_reader(tx)?;

    if let Some(path) = &args.file {
        reader.load_file(path);
        print_status(&reader);
        if args.autoplay && reader.play().is_err() {
            print_status(&reader);
        }
    }
    println!("Type `help` for commands.");

    while let Ok(event) = rx.recv() {
        match event {
            AppEvent::Command(TerminalCommand::Quit) | AppEvent::Quit => break,
            AppEvent::Command(command) => handle_command(&mut reader, command),
            AppEvent::Engine(event) => {
                let signal = reader.handle_engine_event(event);
                if matches!(
                    signal,
                    ControllerSignal::Exhausted | ControllerSignal::Halted(_)
                ) {
                    print_status(&reader);
                }
            }
        }
    }

    info!("Shutting down");
    reader.cancellation_token().cancel();
    if reader.state().is_live() {
        reader.stop();
    }
    Ok(())
}

fn handle_command<E: SpeechEngine, P: HighlightPresenter>(
    reader: &mut Reader<E, P>,
    command: TerminalCommand,
) {
    match command {
        TerminalCommand::Reader(command) => {
            let event = reader.apply_command(command);
            debug!(action = event.action, playback = %event.snapshot.playback, "Command applied");
            print_status(reader);
        }
        TerminalCommand::Status { json } => {
            let snapshot = reader.apply_command(ReaderCommand::GetSnapshot).snapshot;
            if json {
                match serde_json::to_string_pretty(&snapshot) {
                    Ok(text) => println!("{text}"),
                    Err(err) => warn!("Failed to serialize snapshot: {err}"),
                }
            } else {
                println!(
                    "{} | {} | {} | unit {}/{}",
                    snapshot.page_info,
                    snapshot.voice_label,
                    snapshot.playback,
                    snapshot.cursor,
                    snapshot.unit_count
                );
                if let Some(message) = snapshot.status_message {
                    println!("{message}");
                }
            }
        }
        TerminalCommand::Voices => {
            let voices = reader.voices();
            if voices.is_empty() {
                println!("No voice found");
            }
            for voice in voices {
                println!("{:<24} {}", voice.name, voice.language);
            }
        }
        TerminalCommand::Help => println!("{HELP_TEXT}"),
        TerminalCommand::Quit => {}
    }
}

fn print_status<E: SpeechEngine, P: HighlightPresenter>(reader: &Reader<E, P>) {
    if let Some(message) = reader.status_message() {
        println!("{} | {message}", reader.current_page_info());
    }
}

fn spawn_stdin_reader(tx: mpsc::Sender<AppEvent>) -> Result<()> {
    thread::Builder::new()
        .name("stdin".to_string())
        .spawn(move || {
            let stdin = io::stdin();
            for line in stdin.lock().lines() {
                let line = match line {
                    Ok(line) => line,
                    Err(err) => {
                        warn!("Failed to read from stdin: {err}");
                        break;
                    }
                };
                if line.trim().is_empty() {
                    continue;
                }
                match line.parse::<TerminalCommand>() {
                    Ok(command) => {
                        if tx.send(AppEvent::Command(command)).is_err() {
                            return;
                        }
                    }
                    Err(err) => println!("{err}"),
                }
            }
            let _ = tx.send(AppEvent::Quit);
        })
        .context("Failed to spawn stdin reader")?;
    Ok(())
}

/// `Ok(None)` means `--help` was requested.
fn parse_args(args: impl IntoIterator<Item = String>) -> Result<Option<CliArgs>> {
    let mut config_path = PathBuf::from(DEFAULT_CONFIG_PATH);
    let mut file = None;
    let mut autoplay = false;
    let mut print_config = false;

    let mut args = args.into_iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--config" | "-c" => {
                let value = args
                    .next()
                    .ok_or_else(|| anyhow!("--config needs a path\n{USAGE}"))?;
                config_path = PathBuf::from(value);
            }
            "--play" => autoplay = true,
            "--print-config" => print_config = true,
            "--help" | "-h" => return Ok(None),
            flag if flag.starts_with('-') => {
                return Err(anyhow!("Unknown option {flag}\n{USAGE}"));
            }
            path => {
                if file.is_some() {
                    return Err(anyhow!("Only one file may be given\n{USAGE}"));
                }
                let path = PathBuf::from(path);
                if !path.exists() {
                    return Err(anyhow!("File not found: {}", path.display()));
                }
                file = Some(path);
            }
        }
    }

    Ok(Some(CliArgs {
        config_path,
        file,
        autoplay,
        print_config,
    }))
}

fn init_tracing() -> ReloadHandle {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));
    let (filter_layer, handle) = reload::Layer::new(env_filter);
    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(io::stderr)
                .with_target(true)
                .with_file(true)
                .with_line_number(true)
                .with_filter(filter_layer),
        )
        .init();
    debug!("Logging initialized; override level with config log_level or RUST_LOG");
    handle
}

fn set_log_level(handle: &ReloadHandle, level: &str) {
    let parsed = EnvFilter::builder()
        .parse(level)
        .unwrap_or_else(|_| EnvFilter::new("debug"));
    if let Err(err) = handle.modify(|filter| *filter = parsed.clone()) {
        warn!(%level, "Failed to update log level from config: {err}");
    } else {
        info!(%level, "Applied log level from config");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|arg| arg.to_string()).collect()
    }

    #[test]
    fn defaults_without_arguments() {
        let parsed = parse_args(args(&[])).expect("parses").expect("not help");
        assert_eq!(parsed.config_path, PathBuf::from(DEFAULT_CONFIG_PATH));
        assert_eq!(parsed.file, None);
        assert!(!parsed.autoplay);
        assert!(!parsed.print_config);
    }

    #[test]
    fn config_flag_and_existing_file() {
        let file = tempfile::NamedTempFile::new().expect("temp file");
        let path = file.path().display().to_string();
        let parsed = parse_args(args(&["--config", "alt.toml", "--play", &path]))
            .expect("parses")
            .expect("not help");
        assert_eq!(parsed.config_path, PathBuf::from("alt.toml"));
        assert_eq!(parsed.file.as_deref(), Some(file.path()));
        assert!(parsed.autoplay);
    }

    #[test]
    fn rejects_bad_arguments() {
        assert!(parse_args(args(&["--config"])).is_err());
        assert!(parse_args(args(&["--bogus"])).is_err());
        assert!(parse_args(args(&["/definitely/not/here.pdf"])).is_err());
        assert!(parse_args(args(&["--help"])).expect("parses").is_none());
    }
}
