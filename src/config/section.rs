//! Configuration sections.

use serde::Deserialize;
use std::path::{Path, PathBuf};

// ============================================================================
// [input]
// ============================================================================

/// `[input]` section: where the exported tables live.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct InputConfig {
    /// Directory holding the tables.
    pub dir: PathBuf,
    /// URL alias table: `(path, node/<id>)`.
    pub aliases: PathBuf,
    /// Redirect table: `(source path, node/<id>)`.
    pub redirects: PathBuf,
    /// Attachment table: `(id, file path, display name)`.
    pub attachments: PathBuf,
    /// Node table, with header row.
    pub nodes: PathBuf,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            aliases: PathBuf::from("url_alias.csv"),
            redirects: PathBuf::from("redirects.csv"),
            attachments: PathBuf::from("attachments.csv"),
            nodes: PathBuf::from("nodes.csv"),
        }
    }
}

impl InputConfig {
    /// All table paths resolved against `dir`, keyed by config field.
    pub fn tables(&self) -> [(&'static str, PathBuf); 4] {
        [
            ("input.aliases", self.dir.join(&self.aliases)),
            ("input.redirects", self.dir.join(&self.redirects)),
            ("input.attachments", self.dir.join(&self.attachments)),
            ("input.nodes", self.dir.join(&self.nodes)),
        ]
    }
}

// ============================================================================
// [output]
// ============================================================================

/// `[output]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Root of the `published/` and `unpublished/` trees.
    pub dir: PathBuf,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
        }
    }
}

// ============================================================================
// [transform]
// ============================================================================

/// `[transform]` section.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TransformConfig {
    /// Domain regex; absolute links matching `https?://<regex>/` become root-relative.
    pub domain_regex: Option<String>,
    /// Shorthand-markup expander, split on whitespace into program and arguments.
    pub expander: String,
}

impl Default for TransformConfig {
    fn default() -> Self {
        Self {
            domain_regex: None,
            expander: "./autop.php".to_string(),
        }
    }
}

impl TransformConfig {
    /// Expander command as an argv vector.
    pub fn expander_argv(&self) -> Vec<&str> {
        self.expander.split_whitespace().collect()
    }

    /// Whether the expander program can be found.
    ///
    /// Programs given with a path are checked on disk, bare names on `PATH`.
    pub fn expander_available(&self) -> bool {
        let Some(program) = self.expander_argv().first().copied() else {
            return false;
        };
        if program.contains(std::path::MAIN_SEPARATOR) || program.contains('/') {
            Path::new(program).is_file()
        } else {
            which::which(program).is_ok()
        }
    }
}
