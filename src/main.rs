//! Lifeline scenario runner.
//!
//! Replays a JSON-lines scenario through the emergency service and logs
//! every outbound event.
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │  scenario.jsonl ──▶ EventQueue ──▶ EmergencyService            │
//! │                        ▲                 │                     │
//! │   synthetic seconds ───┘                 ├─▶ ConsoleOutputs    │
//! │   (or Runtime ticker with --live)        └─▶ Log / JSON sink   │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Each scenario line is either an event, e.g.
//! `{"event":"manual_trigger","kind":"ManualSos","severity":"High"}`,
//! or a pause, `{"advance_secs":30}`.  Blank lines and lines starting with
//! `#` are skipped.
//!
//! Usage:
//!   cargo run --features cli -- scenario.jsonl --config config.json

#![deny(unused_must_use)]

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use serde::Deserialize;

use lifeline::adapters::console::ConsoleOutputs;
use lifeline::adapters::json_sink::JsonLinesSink;
use lifeline::adapters::log_sink::LogEventSink;
use lifeline::app::events::AppEvent;
use lifeline::app::ports::EventSink;
use lifeline::runtime::Runtime;
use lifeline::{EmergencyConfig, EmergencyService, Event, EventQueue};

/// Replay an emergency scenario through the orchestrator.
#[derive(Parser)]
#[command(name = "lifeline", about = "Replay an emergency scenario through the orchestrator")]
struct Cli {
    /// JSON-lines scenario file.
    scenario: PathBuf,

    /// JSON config override; missing fields keep their defaults.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Drive the countdown with the real 1 s runtime ticker.
    #[arg(long)]
    live: bool,

    /// Print outbound events as JSON lines on stdout instead of logging them.
    #[arg(long)]
    json: bool,

    /// Simulated call length in seconds before the dialer reports the call
    /// ended (synthetic mode only).
    #[arg(long)]
    call_secs: Option<u32>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Step {
    Advance { advance_secs: u32 },
    Event(Event),
}

enum Output {
    Log(LogEventSink),
    Json(JsonLinesSink<io::Stdout>),
}

impl EventSink for Output {
    fn emit(&mut self, event: &AppEvent) {
        match self {
            Self::Log(sink) => sink.emit(event),
            Self::Json(sink) => sink.emit(event),
        }
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => EmergencyConfig::default(),
    };
    let steps = load_scenario(&cli.scenario)?;
    info!("Loaded {} scenario steps from {}", steps.len(), cli.scenario.display());

    let mut service = EmergencyService::new(config);
    let mut out = match cli.call_secs {
        Some(secs) => ConsoleOutputs::new().with_hang_up_after(secs),
        None => ConsoleOutputs::new(),
    };
    let mut sink = if cli.json {
        Output::Json(JsonLinesSink::new(io::stdout()))
    } else {
        Output::Log(LogEventSink::new())
    };

    let queue = EventQueue::new();
    let runtime = Runtime::new(&queue);
    service.start(&mut sink);

    if cli.live {
        run_live(&runtime, steps, &mut service, &mut out, &mut sink);
    } else {
        run_synthetic(&runtime, steps, &mut service, &mut out, &mut sink);
    }

    info!(
        "Finished in {:?} after {} events ({} alerts, {} calls, {} dropped)",
        service.state(),
        service.events_handled(),
        out.delivered(),
        out.dialed().len(),
        queue.dropped_count()
    );
    if let Some(case) = service.current_case() {
        info!(
            "Final case: {} {:?} call={:?} open={}",
            case.id,
            case.status,
            case.call_state,
            service.has_open_case()
        );
    }
    Ok(())
}

fn load_config(path: &Path) -> Result<EmergencyConfig> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    EmergencyConfig::from_json(&text).with_context(|| format!("loading config {}", path.display()))
}

fn load_scenario(path: &Path) -> Result<Vec<Step>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("reading scenario {}", path.display()))?;

    text.lines()
        .enumerate()
        .filter(|(_, line)| {
            let line = line.trim();
            !line.is_empty() && !line.starts_with('#')
        })
        .map(|(n, line)| {
            serde_json::from_str(line)
                .with_context(|| format!("{}:{}: invalid scenario step", path.display(), n + 1))
        })
        .collect()
}

/// Each `advance_secs` second enqueues one countdown tick (if armed) and
/// advances the simulated call, then drains the queue.
fn run_synthetic(
    runtime: &Runtime<'_>,
    steps: Vec<Step>,
    service: &mut EmergencyService,
    out: &mut ConsoleOutputs,
    sink: &mut Output,
) {
    let queue = runtime.queue();
    for step in steps {
        match step {
            Step::Event(event) => {
                queue.push(event);
                runtime.drain_pending(service, out, sink);
            }
            Step::Advance { advance_secs } => {
                for _ in 0..advance_secs {
                    if let Some(case_id) = runtime.armed() {
                        queue.push(Event::CountdownTick { case_id });
                    }
                    if let Some(case_id) = out.advance_call() {
                        queue.submit_call_ended(case_id);
                    }
                    runtime.drain_pending(service, out, sink);
                }
            }
        }
    }
}

/// A feeder thread enqueues events in real time while the runtime drives
/// the countdown with its own ticker.
fn run_live(
    runtime: &Runtime<'_>,
    steps: Vec<Step>,
    service: &mut EmergencyService,
    out: &mut ConsoleOutputs,
    sink: &mut Output,
) {
    let queue = runtime.queue();
    std::thread::scope(|scope| {
        scope.spawn(move || {
            for step in steps {
                match step {
                    Step::Event(event) => {
                        queue.push(event);
                    }
                    Step::Advance { advance_secs } => {
                        std::thread::sleep(Duration::from_secs(u64::from(advance_secs)));
                    }
                }
            }
            queue.request_shutdown();
        });

        runtime.run_blocking(service, out, sink);
    });
}
