//! Vina - click-to-edit live preview for component sources.

mod actor;
mod cli;
mod config;
mod core;
mod embed;
mod locator;
mod logger;
mod patch;
mod reload;
mod studio;
mod utils;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::{Cli, Commands};
use config::{VinaConfig, init_config};

fn main() -> Result<()> {
    // Setup global Ctrl+C handler (before any blocking operations)
    core::setup_shutdown_handler()?;

    let cli: &'static Cli = Box::leak(Box::new(Cli::parse()));

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }
    logger::set_verbose(cli.verbose);

    let config = init_config(VinaConfig::load(cli)?);

    match &cli.command {
        Commands::Preview { .. } => cli::preview::bind_server()?.run(),
        Commands::Studio { .. } => cli::studio::serve(),
        Commands::Edit { action } => cli::edit::run_edit(action, &config),
        Commands::Locate { dom_path, markup } => cli::locate::run_locate(dom_path, markup, &config),
    }
}
