//! Migration configuration management for `drupal2md.toml`.
//!
//! # Sections
//!
//! | Section       | Purpose                                          |
//! |---------------|--------------------------------------------------|
//! | `[input]`     | Export directory and table file names            |
//! | `[output]`    | Root of the generated `published/` tree          |
//! | `[transform]` | Domain pattern and markup expander command       |
//!
//! Every field has a default, so the file is optional. CLI flags override
//! the file.

mod error;
mod section;

use section::{InputConfig, OutputConfig, TransformConfig};

pub use error::{ConfigDiagnostics, ConfigError};

use crate::{cli::Cli, log};
use anyhow::Result;
use regex::Regex;
use serde::Deserialize;
use std::{
    fs,
    path::{Path, PathBuf},
};

// ============================================================================
// root configuration
// ============================================================================

/// Root configuration structure representing drupal2md.toml
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MigrateConfig {
    /// Export tables
    #[serde(default)]
    pub input: InputConfig,

    /// Output tree
    #[serde(default)]
    pub output: OutputConfig,

    /// Body transformation settings
    #[serde(default)]
    pub transform: TransformConfig,
}

impl MigrateConfig {
    /// Load configuration from CLI arguments.
    ///
    /// The config file is read only when it exists; CLI options are applied
    /// on top and the result is validated.
    pub fn load(cli: &Cli) -> Result<Self> {
        crate::logger::set_verbose(cli.verbose);

        let mut config = if cli.config.exists() {
            Self::from_path(&cli.config)?
        } else {
            Self::default()
        };

        config.apply_cli(cli);
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file path with unknown field detection.
    fn from_path(path: &Path) -> Result<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| ConfigError::Io(path.to_path_buf(), err))?;

        let (config, ignored) = Self::parse_with_ignored(&content)?;
        if !ignored.is_empty() {
            log!("warning"; "unknown fields in {}, ignoring: {}", path.display(), ignored.join(", "));
        }

        Ok(config)
    }

    /// Parse TOML content, collecting any unknown fields.
    fn parse_with_ignored(content: &str) -> Result<(Self, Vec<String>), ConfigError> {
        let mut ignored = Vec::new();
        let deserializer = toml::Deserializer::new(content);
        let config = serde_ignored::deserialize(deserializer, |path: serde_ignored::Path| {
            ignored.push(path.to_string());
        })?;
        Ok((config, ignored))
    }

    /// Apply command-line overrides.
    fn apply_cli(&mut self, cli: &Cli) {
        Self::update_option(&mut self.input.dir, cli.input.as_ref());
        Self::update_option(&mut self.output.dir, cli.output.as_ref());
        Self::update_option(&mut self.transform.expander, cli.expander.as_ref());
        if cli.domain_regex.is_some() {
            self.transform.domain_regex.clone_from(&cli.domain_regex);
        }
    }

    /// Overwrite `target` when the CLI provided a value.
    fn update_option<T: Clone>(target: &mut T, value: Option<&T>) {
        if let Some(v) = value {
            *target = v.clone();
        }
    }

    /// Validate all sections, reporting every problem at once.
    fn validate(&self) -> Result<(), ConfigError> {
        let mut diag = ConfigDiagnostics::new();

        for (field, path) in self.input.tables() {
            if !path.is_file() {
                diag.error_with_hint(
                    field,
                    format!("table `{}` not found", path.display()),
                    "set [input] dir or pass --input",
                );
            }
        }

        if let Some(pattern) = &self.transform.domain_regex
            && let Err(err) = Regex::new(&domain_pattern(pattern))
        {
            diag.error("transform.domain_regex", format!("invalid pattern: {err}"));
        }

        if self.transform.expander_argv().is_empty() {
            diag.error("transform.expander", "expander command is empty");
        } else if !self.transform.expander_available() {
            // Only fatal once a filtered/full HTML body actually needs it
            log!("warning"; "markup expander `{}` not found", self.transform.expander);
        }

        diag.into_result()
    }

    /// Compiled link relativization pattern, if a domain was configured.
    pub fn domain_regex(&self) -> Result<Option<Regex>> {
        let Some(pattern) = &self.transform.domain_regex else {
            return Ok(None);
        };
        Ok(Some(Regex::new(&domain_pattern(pattern))?))
    }

    /// Output root directory.
    pub fn output_dir(&self) -> &Path {
        &self.output.dir
    }

    /// Resolve a table file inside the input directory.
    pub fn input_path(&self, file: impl AsRef<Path>) -> PathBuf {
        self.input.dir.join(file)
    }
}

/// `https?://<domain>/`, the prefix replaced by a single `/`.
fn domain_pattern(domain: &str) -> String {
    format!("https?://{domain}/")
}

#[cfg(test)]
pub fn test_parse_config(content: &str) -> MigrateConfig {
    let (parsed, ignored) = MigrateConfig::parse_with_ignored(content).unwrap();
    assert!(
        ignored.is_empty(),
        "test config has unknown fields: {:?}",
        ignored
    );
    parsed
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_defaults() {
        let config = test_parse_config("");
        assert_eq!(config.input.dir, PathBuf::from("."));
        assert_eq!(config.input.nodes, PathBuf::from("nodes.csv"));
        assert_eq!(config.output.dir, PathBuf::from("."));
        assert_eq!(config.transform.expander, "./autop.php");
        assert!(config.transform.domain_regex.is_none());
        assert!(config.domain_regex().unwrap().is_none());
    }

    #[test]
    fn test_sections_parse() {
        let config = test_parse_config(
            r#"
[input]
dir = "export"
nodes = "node.tsv"

[output]
dir = "content"

[transform]
domain_regex = 'www\.example\.org'
expander = "php autop.php"
"#,
        );
        assert_eq!(config.input_path("x.csv"), PathBuf::from("export/x.csv"));
        assert_eq!(config.input.nodes, PathBuf::from("node.tsv"));
        assert_eq!(config.output_dir(), Path::new("content"));
        assert_eq!(config.transform.expander_argv(), vec!["php", "autop.php"]);

        let re = config.domain_regex().unwrap().unwrap();
        assert!(re.is_match("http://www.example.org/node/1"));
        assert!(re.is_match("https://www.example.org/files/a.png"));
        assert!(!re.is_match("https://example.com/"));
    }

    #[test]
    fn test_unknown_fields_collected() {
        let (_, ignored) = MigrateConfig::parse_with_ignored("[output]\nformat = \"hugo\"").unwrap();
        assert_eq!(ignored, vec!["output.format"]);
    }

    #[test]
    fn test_cli_overrides_file() {
        let mut config = test_parse_config("[transform]\ndomain_regex = \"a\\\\.org\"");
        let cli = Cli::parse_from(["drupal2md", "-d", r"b\.org", "-o", "out"]);
        config.apply_cli(&cli);
        assert_eq!(config.transform.domain_regex.as_deref(), Some(r"b\.org"));
        assert_eq!(config.output.dir, PathBuf::from("out"));
        assert_eq!(config.input.dir, PathBuf::from("."));
    }

    #[test]
    fn test_validate_reports_all_errors() {
        let mut config = test_parse_config("[input]\ndir = \"/nonexistent/export\"");
        config.transform.domain_regex = Some("(unclosed".to_string());

        let err = config.validate().unwrap_err();
        let ConfigError::Diagnostics(diag) = err else {
            panic!("expected diagnostics");
        };
        // four missing tables + bad pattern
        assert_eq!(diag.errors().len(), 5);
        assert!(
            diag.errors()
                .iter()
                .any(|d| d.field == "transform.domain_regex")
        );
    }

    #[test]
    fn test_validate_accepts_existing_tables() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["url_alias.csv", "redirects.csv", "attachments.csv", "nodes.csv"] {
            fs::write(dir.path().join(name), "").unwrap();
        }
        let mut config = MigrateConfig::default();
        config.input.dir = dir.path().to_path_buf();
        config.transform.expander = "cat".to_string();
        assert!(config.validate().is_ok());
    }
}
