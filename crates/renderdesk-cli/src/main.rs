//! renderdesk: render job database and farm submitter.

mod args;
mod handlers;
mod logging;
mod print;

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use renderdesk::Config;

use args::{Cli, Commands};

/// Loads the config named on the command line, or the per-user default when
/// it exists, or built-in defaults.
fn load_config(explicit: Option<&PathBuf>) -> anyhow::Result<Config> {
    if let Some(path) = explicit {
        return renderdesk::load_config(path)
            .with_context(|| format!("loading config {}", path.display()));
    }

    let default = dirs::config_dir().map(|d| d.join("renderdesk").join("config.json"));
    match default {
        Some(path) if path.is_file() => {
            tracing::debug!(path = %path.display(), "Using user config");
            renderdesk::load_config(&path)
                .with_context(|| format!("loading config {}", path.display()))
        }
        _ => Ok(Config::default()),
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    logging::init(cli.json, cli.verbose)?;

    let config = load_config(cli.config.as_ref())?;

    match cli.command {
        Commands::Frames { expr, span } => handlers::frames::handle(&expr, span),
        Commands::Maya(cmd) => handlers::maya::handle(&config, cmd.action),
        Commands::Nuke(cmd) => handlers::nuke::handle(&config, cmd.action),
        Commands::Presets(cmd) => handlers::presets::handle(&config, cmd.action),
    }
}
