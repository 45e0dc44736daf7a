//! drupal2md - Convert a Drupal 7 export into Markdown with YAML front matter.

mod cli;
mod config;
mod index;
mod logger;
mod pipeline;
mod source;
mod utils;
mod writer;

use anyhow::Result;
use clap::{ColorChoice, Parser};
use cli::Cli;
use config::MigrateConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set global color override based on CLI option
    match cli.color {
        ColorChoice::Always => owo_colors::set_override(true),
        ColorChoice::Never => owo_colors::set_override(false),
        ColorChoice::Auto => {} // owo-colors auto-detects TTY
    }

    let config = MigrateConfig::load(&cli)?;
    pipeline::run(&config).map(|_| ())
}
