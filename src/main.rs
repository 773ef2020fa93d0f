use std::io::{self, BufRead};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use anyhow::{anyhow, Context};
use sysinfo::System;

use object_detector::{
    AppResult, Command, CommandExecutor, CommandId, Config, Event, EventBus, ObjectDetector,
};

const LOG_TARGET_STARTUP: &str = "object_detector::startup";
const TELEMETRY_INTERVAL: Duration = Duration::from_secs(1);

/// Initialize tracing with file rotation
///
/// Logs are written to `<config dir>/ObjectDetector/logs/`, one file per day
/// (`object-detector.YYYY-MM-DD.log`). Debug builds also log to the console.
fn initialize_tracing() {
    use tracing_appender::rolling;
    use tracing_subscriber::{fmt, prelude::*, EnvFilter};

    let log_dir = dirs::config_dir()
        .map(|dir| dir.join("ObjectDetector").join("logs"))
        .unwrap_or_else(|| std::path::PathBuf::from("logs"));

    if let Err(e) = std::fs::create_dir_all(&log_dir) {
        eprintln!("Warning: Failed to create log directory: {}", e);
    }

    let file_appender = rolling::daily(&log_dir, "object-detector.log");

    // info level by default, RUST_LOG overrides
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new("info"))
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    let file_layer = fmt::layer()
        .with_writer(file_appender)
        .with_ansi(false)
        .with_target(true)
        .with_thread_names(true)
        .with_line_number(true);

    #[cfg(debug_assertions)]
    {
        let console_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_ansi(true)
            .with_target(false);

        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .with(console_layer)
            .init();
    }

    #[cfg(not(debug_assertions))]
    {
        tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .init();
    }

    tracing::info!("Log directory: {}", log_dir.display());
}

fn log_runtime_environment() {
    let version = env!("CARGO_PKG_VERSION");
    let os_name = System::long_os_version()
        .or_else(System::name)
        .unwrap_or_else(|| "Unknown OS".to_string());
    let kernel = System::kernel_version().unwrap_or_else(|| "Unknown Kernel".to_string());

    tracing::info!(
        target: LOG_TARGET_STARTUP,
        "Starting object-detector v{} on ({})",
        version,
        std::env::consts::ARCH
    );
    tracing::info!(target: LOG_TARGET_STARTUP, "Operating System: {} (kernel {})", os_name, kernel);
}

/// One line typed on the console
#[derive(Debug, PartialEq, Eq)]
enum ConsoleInput {
    Command(Command),
    Count,
    Status,
}

fn parse_console_line(line: &str, seq: u32) -> AppResult<Option<ConsoleInput>> {
    let mut words = line.split_whitespace();
    let Some(verb) = words.next() else {
        return Ok(None);
    };

    let mut trigger = || -> AppResult<u32> {
        let raw = words
            .next()
            .ok_or_else(|| anyhow!("'{verb}' needs a trigger value"))?;
        raw.parse::<u32>()
            .with_context(|| format!("invalid trigger value '{raw}'"))
    };

    let input = match verb.to_ascii_lowercase().as_str() {
        "start" => ConsoleInput::Command(Command::StartDetection {
            id: CommandId::new(Command::START_DETECTION_OPCODE, seq),
            trigger: trigger()?,
        }),
        "stop" => ConsoleInput::Command(Command::StopDetection {
            id: CommandId::new(Command::STOP_DETECTION_OPCODE, seq),
            trigger: trigger()?,
        }),
        "count" => ConsoleInput::Count,
        "status" => ConsoleInput::Status,
        "quit" | "exit" => ConsoleInput::Command(Command::Quit),
        other => return Err(anyhow!("unknown command '{other}'")),
    };
    Ok(Some(input))
}

fn print_events(rx: crossbeam_channel::Receiver<Event>) {
    for event in rx {
        match event {
            Event::Telemetry(_) => {}
            Event::Shutdown => break,
            event => println!("{}", event.description()),
        }
    }
}

fn run() -> AppResult<()> {
    let config = Config::load().context("Failed to load configuration")?;
    tracing::info!(
        "Peer {} | listening on {} | timeout {}ms",
        config.peer_addr,
        config.listen_addr,
        config.recv_timeout_ms
    );

    let bus = EventBus::new();
    let (event_rx, subscription) = bus.subscribe();
    let printer = thread::Builder::new()
        .name("event-printer".to_owned())
        .spawn(move || print_events(event_rx))
        .context("Failed to spawn event printer")?;

    let detector = Arc::new(ObjectDetector::new(&config, Arc::new(bus.clone())));
    let executor = CommandExecutor::new(Arc::clone(&detector), bus.clone());
    let worker = executor
        .start_processing(Some(TELEMETRY_INTERVAL))
        .context("Failed to spawn command executor")?;

    println!("Commands: start <trigger> | stop <trigger> | count | status | quit");

    let mut seq = 0u32;
    for line in io::stdin().lock().lines() {
        let line = line.context("Failed to read console input")?;
        match parse_console_line(&line, seq) {
            Ok(Some(ConsoleInput::Command(Command::Quit))) => break,
            Ok(Some(ConsoleInput::Command(command))) => {
                seq = seq.wrapping_add(1);
                executor.execute(command);
            }
            Ok(Some(ConsoleInput::Count)) => {
                println!("Detections: {}", detector.detection_count())
            }
            Ok(Some(ConsoleInput::Status)) => {
                let state = detector.listener_state();
                let uptime = state
                    .running_duration()
                    .map(|d| format!(" for {}s", d.as_secs()))
                    .unwrap_or_default();
                println!(
                    "Listener: {}{} | peer {} | detections {}",
                    state.description(),
                    uptime,
                    detector.peer_addr(),
                    detector.detection_count()
                )
            }
            Ok(None) => {}
            Err(err) => eprintln!("{err:#}"),
        }
    }

    executor.execute(Command::Quit);
    if worker.join().is_err() {
        tracing::error!("Command executor thread panicked");
    }
    let _ = printer.join();
    bus.unsubscribe(subscription);

    // Last reference: dropping the detector joins the listener
    drop(executor);
    drop(detector);
    tracing::info!("Shutdown complete");
    Ok(())
}

fn main() {
    initialize_tracing();
    log_runtime_environment();

    if let Err(err) = run() {
        tracing::error!("{err:#}");
        eprintln!("✗ {err:#}");
        std::process::exit(1);
    }
}
