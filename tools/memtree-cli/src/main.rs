//! Memtree CLI: inspect and drive hand-landmark recordings.
//!
//! Usage:
//!   memtree classify <FRAMES>          Print the gesture flags of every frame
//!   memtree replay <FRAMES>            Run the interaction engine on frame timestamps
//!   memtree run <FRAMES>               Drive a recording through the live tick loop
//!   memtree synth <SCENARIO> -o <OUT>  Generate a scripted recording
//!   memtree config                     Show the effective configuration

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use memtree_common::config::AppConfig;

mod commands;

use commands::synth::Scenario;

#[derive(Parser)]
#[command(
    name = "memtree",
    about = "Hand-gesture control for a photo tree, driven by hand-landmark recordings",
    version,
    author
)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Config file to use instead of the user config
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print per-frame gesture flags
    Classify {
        /// Path to a frames JSONL file
        path: PathBuf,
    },

    /// Run the engine deterministically over a recording
    Replay {
        /// Path to a frames JSONL file
        path: PathBuf,

        /// Write one snapshot per frame to this JSONL file
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Number of items in the tree (overrides config)
        #[arg(long)]
        items: Option<usize>,
    },

    /// Drive a recording through the paced tick loop, as if it were a camera
    Run {
        /// Path to a frames JSONL file
        path: PathBuf,

        /// Restart the recording when it ends (stop with Ctrl+C)
        #[arg(long = "loop")]
        looping: bool,

        /// Write one snapshot per tick to this JSONL file
        #[arg(short, long)]
        out: Option<PathBuf>,

        /// Tick rate in Hz (overrides config)
        #[arg(long)]
        fps: Option<u32>,
    },

    /// Generate a scripted recording
    Synth {
        /// Scenario to generate
        #[arg(value_enum)]
        scenario: Scenario,

        /// Output file path
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Show the effective configuration
    Config {
        /// Save it to the user config location
        #[arg(long)]
        init: bool,
    },
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load_from(path)
            .map_err(|e| anyhow::anyhow!("Failed to load config {}: {e}", path.display())),
        None => Ok(AppConfig::load()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = load_config(cli.config.as_ref())?;

    // Initialize logging
    let mut logging = config.logging.clone();
    if cli.verbose {
        logging.level = "debug".to_string();
    }
    memtree_common::logging::init_logging(&logging);

    match cli.command {
        Commands::Classify { path } => commands::classify::run(&config, path),
        Commands::Replay { path, out, items } => commands::replay::run(config, path, out, items),
        Commands::Run {
            path,
            looping,
            out,
            fps,
        } => commands::run::run(config, path, looping, out, fps).await,
        Commands::Synth { scenario, output } => commands::synth::run(scenario, output),
        Commands::Config { init } => commands::config::run(&config, init),
    }
}
