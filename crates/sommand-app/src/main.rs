//! sommand interactive shell.
//!
//! Registers a small demo command set and reads command lines from stdin.
//! Plain lines are executed; `:complete <partial>` prints completions,
//! `:tree` prints the command trees as JSON and `:quit` exits.

mod commands;
mod console;

use std::path::PathBuf;

use anyhow::{Context, Result};

use commands::{ConfigEntities, register_commands};
use console::ConsoleIdentity;
use sommand_core::{CommandRegistry, CommandService};
use sommand_types::SommandConfig;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    // Config path from CLI arg or SOMMAND_CONFIG; built-in defaults otherwise.
    let config = match std::env::args()
        .nth(1)
        .or_else(|| std::env::var("SOMMAND_CONFIG").ok())
    {
        Some(path) => {
            let path = PathBuf::from(path);
            SommandConfig::load(&path)
                .with_context(|| format!("loading config from {}", path.display()))?
        },
        None => SommandConfig::default(),
    };

    let registry = CommandRegistry::global();
    register_commands(registry, ConfigEntities::new(config.entities.clone()))?;
    let service = CommandService::from_config(registry, &config);
    let identity = ConsoleIdentity::from_config(&config.identity);

    log::info!(
        "sommand shell ready: {} commands, running as '{}'",
        registry.all_distinct().len(),
        config.identity.name
    );

    let stdin = std::io::stdin();
    let mut stdout = std::io::stdout();
    console::run(&service, &identity, stdin.lock(), &mut stdout)?;

    log::info!("sommand shell exiting");
    Ok(())
}
