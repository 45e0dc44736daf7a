//! Command-line interface definitions.

use clap::{ColorChoice, Parser};
use std::path::PathBuf;

/// Convert a Drupal 7 export into Markdown files with front matter
#[derive(Parser, Debug, Clone)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Control colored output (auto, always, never)
    #[arg(long, default_value = "auto")]
    pub color: ColorChoice,

    /// Domain pattern; when given, absolute links to it are made root-relative
    #[arg(short = 'd', long = "domain", value_name = "DOMAIN_REGEX")]
    pub domain_regex: Option<String>,

    /// Directory holding the exported tables (url_alias.csv, nodes.csv, ...)
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub input: Option<PathBuf>,

    /// Directory receiving the published/ and unpublished/ trees
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub output: Option<PathBuf>,

    /// Markup expander command for filtered/full HTML bodies (default: ./autop.php)
    #[arg(short, long, value_hint = clap::ValueHint::CommandString)]
    pub expander: Option<String>,

    /// Config file path (read only when it exists)
    #[arg(short = 'C', long, default_value = "drupal2md.toml", value_hint = clap::ValueHint::FilePath)]
    pub config: PathBuf,

    /// Enable verbose output for debugging
    #[arg(short, long)]
    pub verbose: bool,
}
