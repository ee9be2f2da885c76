mod cli;
mod config;
mod engine;
mod error;
mod livelog;
mod memory;
mod notify;
mod portal;
mod prompt;
mod roster;
mod scraper;
mod supervisor;
mod ui;
mod webdriver;
mod webui;

use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use console::Style;

use cli::{Cli, Command};
use config::SnowwatchConfig;
use error::SnowwatchError;
use livelog::LiveLog;
use memory::DecisionMemory;
use roster::ShiftRoster;
use supervisor::Supervisor;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let mut config = match SnowwatchConfig::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "{} {e}",
                Style::new().red().bold().apply_to("configuration error:")
            );
            std::process::exit(1);
        }
    };
    if let Some(secs) = cli.poll_interval {
        config.triage.poll_interval_secs = secs;
    }
    if let Some(secs) = cli.prompt_timeout {
        config.triage.prompt_timeout_secs = secs;
    }

    let result = match cli.command {
        Command::Run => run(config, cli.verbose).await,
        Command::Memory { shared } => {
            show_memory(&config, shared);
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{} {e}", Style::new().red().bold().apply_to("fatal:"));
        std::process::exit(1);
    }
}

/// Startup sequence, then hand over to the supervisor: storage choice
/// first (the logging context is constructed exactly once), status
/// endpoint, shift roster, decision memory.
async fn run(config: SnowwatchConfig, verbose: bool) -> Result<(), SnowwatchError> {
    let use_shared = !config.storage.shared_dir.is_empty()
        && ui::ask_yes_no("    Use the shared drive for logs and memory?");
    let log = Arc::new(LiveLog::new(
        config.storage.log_path(use_shared),
        config.storage.live_path(use_shared),
    ));
    log.add(&format!(
        "    storage: {}",
        config.storage.base_dir(use_shared).display()
    ));
    println!();

    if ui::ask_yes_no("Enable the live status endpoint?") {
        log.add("status endpoint: enabled");
        webui::announce(&log, config.monitor.port);
        webui::spawn(config.monitor.port, log.clone());
        // Give the listener a moment before narration starts flowing.
        tokio::time::sleep(Duration::from_secs(3)).await;
    } else {
        log.add("status endpoint: disabled");
    }
    println!();

    let roster = ShiftRoster::collect(&log);

    let memory_path = config.storage.memory_path(use_shared);
    if verbose {
        log.add(&format!("    decision memory at {}", memory_path.display()));
    }
    let memory = DecisionMemory::load(memory_path);
    if !memory.is_empty() {
        log.add(&format!(
            "    loaded {} remembered resolution(s)",
            memory.len()
        ));
    }

    Supervisor::new(config, log, memory, roster).run().await
}

fn show_memory(config: &SnowwatchConfig, shared: bool) {
    let memory = DecisionMemory::load(config.storage.memory_path(shared));
    if memory.is_empty() {
        println!("no remembered resolutions");
        return;
    }

    println!("{} remembered resolution(s):", memory.len());
    let mut entries: Vec<_> = memory.iter().collect();
    entries.sort_by(|a, b| a.0.cmp(b.0));
    for (ticket, record) in entries {
        println!("  {ticket}  {} ({})", record.state_name, record.state_value);
    }
}
