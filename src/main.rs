//! tabfsm - table-driven state machine runner
//!
//! Compiles the configured transition table, then feeds stdin to a machine
//! line by line and prints every notification as a JSON line on stdout.

mod config;
mod runner;

use config::Config;
use tabfsm_core::CompiledTable;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Logs go to stderr, stdout carries notifications
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = match Config::load() {
        Ok(c) => {
            if let Ok(path) = std::env::var("TABFSM_CONFIG") {
                tracing::info!("Loaded config from {}", path);
            }
            c
        }
        Err(e) => {
            tracing::error!("Failed to load config: {}", e);
            return Err(e.into());
        }
    };

    if let Err(e) = config.validate() {
        tracing::error!("{}", e);
        return Err(e.into());
    }

    let table = config.table.load()?;
    let compiled = match CompiledTable::compile(&table, config.compile.clone()) {
        Ok(compiled) => compiled,
        Err(e) => {
            tracing::error!("Failed to compile table ({}): {}", e.error_code(), e);
            return Err(e.into());
        }
    };

    let mut machine = match &config.table.initial {
        Some(state) => compiled.machine_in(state.as_str()),
        None => compiled.machine(),
    };

    tracing::info!("Starting tabfsm runner");
    if let Some(path) = &config.table.path {
        tracing::info!("  Table: {}", path.display());
    }
    tracing::info!(
        "  States: {} (checksum {})",
        compiled.states().len(),
        compiled.checksum()
    );
    tracing::info!("  Initial state: {}", machine.state());
    tracing::info!(
        "  Capitalization: {}, wildcard: {:?}, terminal signals: {}",
        compiled.options().capitalization,
        compiled.options().wildcard,
        if compiled.options().terminal_signals {
            "enabled"
        } else {
            "disabled"
        }
    );
    if !compiled.has_state(machine.state()) {
        tracing::warn!(
            "Initial state '{}' is not declared; every input will be ignored",
            machine.state()
        );
    }

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let summary = runner::run(
        &mut machine,
        stdin.lock(),
        stdout.lock(),
        config.output.echo_state,
    )?;

    tracing::info!(
        "Run complete: {} inputs, {} skipped, {} notifications, final state '{}'",
        summary.inputs,
        summary.skipped,
        summary.notifications,
        summary.final_state
    );
    Ok(())
}
