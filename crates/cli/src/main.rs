//! Squash-buffer subsystem CLI.
//!
//! This binary replays a recorded pipeline event trace against the configured
//! squash buffer and counter caches, then prints the statistics report. It
//! performs:
//! 1. **Configuration:** JSON config file (`SimConfig`) or built-in defaults.
//! 2. **Replay:** line-oriented event trace applied in order.
//! 3. **Report:** sectioned statistics to stdout.

use clap::{Parser, Subcommand};
use std::cell::RefCell;
use std::path::PathBuf;
use std::process;
use std::rc::Rc;

use replay_core::cache::CounterMap;
use replay_core::config::SimConfig;
use replay_core::stats::STATS_SECTIONS;
use replay_core::trace;
use replay_core::ReplayBridge;

#[derive(Parser, Debug)]
#[command(
    name = "sbsim",
    author,
    version,
    about = "Squash-buffer subsystem simulator",
    long_about = "Replay a recorded pipeline event trace against the squash buffer and \
counter caches.\n\nConfiguration is JSON (see SimConfig); without --config the built-in \
defaults apply.\n\nExamples:\n  sbsim run -t traces/victim.txt\n  sbsim run -t trace.txt \
-c configs/epoch_cbf.json --sections summary"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay an event trace and print statistics.
    Run {
        /// Event trace file (one event per line).
        #[arg(short, long)]
        trace: PathBuf,

        /// JSON configuration file (defaults apply when omitted).
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Statistics sections to print (all when omitted).
        #[arg(long)]
        sections: Vec<String>,
    },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            trace,
            config,
            sections,
        } => cmd_run(trace, config, sections),
    }
}

/// Replays the trace: builds the bridge, applies every event in caller
/// order, then prints the requested report sections.
fn cmd_run(trace_path: PathBuf, config_path: Option<PathBuf>, sections: Vec<String>) {
    for section in &sections {
        if !STATS_SECTIONS.contains(&section.as_str()) {
            eprintln!(
                "Error: unknown section `{}` (expected one of {:?})",
                section, STATS_SECTIONS
            );
            process::exit(1);
        }
    }

    let config = match config_path {
        Some(path) => {
            let text = std::fs::read_to_string(&path).unwrap_or_else(|e| {
                eprintln!("Error reading config {}: {}", path.display(), e);
                process::exit(1);
            });
            serde_json::from_str::<SimConfig>(&text).unwrap_or_else(|e| {
                eprintln!("Error parsing config {}: {}", path.display(), e);
                process::exit(1);
            })
        }
        None => SimConfig::default(),
    };

    let events = trace::load_trace(&trace_path).unwrap_or_else(|e| {
        eprintln!("Error loading trace {}: {}", trace_path.display(), e);
        process::exit(1);
    });

    println!(
        "[*] Replay: {} events  detection={:?}  structure={:?}",
        events.len(),
        config.detection.replay,
        config.squash_buffer.structure
    );

    let counter_table = Rc::new(RefCell::new(CounterMap::new()));
    let mut bridge = ReplayBridge::new(config, counter_table);

    for event in &events {
        bridge.apply(event);
    }

    bridge.print_stats(&sections);
}
