use std::sync::Arc;
use std::thread;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use pw_cli::sparks::{Sparks, SparksConfig};
use pw_log::{CacheLog, LogTee, Logger, TracingLog};

/// Engine log lines kept for `--log-tail`.
const LOG_HISTORY: usize = 200;

pub fn run(config: SparksConfig, log_tail: usize) -> Result<(), String> {
    let cache = Arc::new(CacheLog::new(LOG_HISTORY).map_err(|e| e.to_string())?);
    let logger: Logger = Arc::new(LogTee::new(cache.clone(), Arc::new(TracingLog)));

    let mut sparks = Sparks::new(config.clone(), logger).map_err(|e| e.to_string())?;

    let mut rendered = 0;
    while config.frames.is_none_or(|limit| rendered < limit) {
        let frame = sparks
            .next_frame()
            .map_err(|e| format!("frame {}: {e}", rendered + 1))?;
        rendered += 1;
        if !config.quiet {
            println!();
            println!("{frame}");
        }
        if !config.delay.is_zero() {
            thread::sleep(config.delay);
        }
    }

    let stats = sparks.stats();
    println!();
    println!(
        "  {} {}",
        "Sparks".bold(),
        format!(
            "({}x{}, {} balls, seed={})",
            config.width, config.height, config.balls, config.seed
        )
        .dimmed()
    );

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Frames", "Events pumped", "Bounces"]);
    table.add_row(vec![
        stats.frames.to_string(),
        stats.pumps.to_string(),
        stats.bounces.to_string(),
    ]);
    println!("{table}");

    if log_tail > 0 {
        let lines = cache.lines();
        println!();
        println!("  {}", "Engine log (newest first)".bold());
        for line in lines.iter().take(log_tail) {
            println!("    {}", line.dimmed());
        }
    }

    Ok(())
}
