//! Command-line driver for the Pathway engine.

mod commands;
mod logging;

use std::path::PathBuf;
use std::process;
use std::time::Duration;

use clap::{Parser, Subcommand};
use pw_cli::sparks::SparksConfig;

#[derive(Parser)]
#[command(
    name = "pathway",
    about = "Pathway: an event-stack game engine",
    version,
    propagate_version = true
)]
struct Cli {
    /// Log engine activity to stderr (overrides RUST_LOG)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the Sparks bouncing-balls sample
    Sparks {
        /// Arena width in cells
        #[arg(long, default_value_t = 30)]
        width: usize,

        /// Arena height in cells
        #[arg(long, default_value_t = 30)]
        height: usize,

        /// Number of balls
        #[arg(short, long, default_value_t = 1)]
        balls: usize,

        /// RNG seed for ball placement
        #[arg(short, long, default_value_t = 42)]
        seed: u64,

        /// Stop after this many frames (default: run until interrupted)
        #[arg(short, long)]
        frames: Option<u64>,

        /// Milliseconds to wait between frames
        #[arg(short, long, default_value_t = 50)]
        delay: u64,

        /// Do not print frames, only the summary
        #[arg(short, long)]
        quiet: bool,

        /// Print this many of the most recent engine log lines after the run
        #[arg(long, default_value_t = 0)]
        log_tail: usize,
    },

    /// Evaluate a script file resolved through resource roots
    Eval {
        /// Logical path of the script, e.g. /scripts/init.rhai
        path: String,

        /// Directory to mount (repeatable; earlier roots win)
        #[arg(short, long, default_value = ".")]
        root: Vec<PathBuf>,

        /// Bind a variable before evaluation (repeatable, NAME=VALUE)
        #[arg(long = "set", value_name = "NAME=VALUE")]
        set: Vec<String>,

        /// Mount the .zip and .jar archives found in each root
        #[arg(long)]
        archives: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let result = match cli.command {
        Commands::Sparks {
            width,
            height,
            balls,
            seed,
            frames,
            delay,
            quiet,
            log_tail,
        } => {
            let mut config = SparksConfig::default()
                .with_size(width, height)
                .with_balls(balls)
                .with_seed(seed)
                .with_delay(Duration::from_millis(delay))
                .with_quiet(quiet);
            config.frames = frames;
            commands::sparks::run(config, log_tail)
        }
        Commands::Eval {
            path,
            root,
            set,
            archives,
        } => commands::eval::run(&path, &root, &set, archives),
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        process::exit(1);
    }
}
