//! Markdown document writer.
//!
//! Renders front matter, body and attachment list, and never overwrites an
//! existing file: an occupied path gets a `-DUPLICATE` suffix.

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::pipeline::transform::{OutputDocument, OutputPath, Section};

/// Suffix inserted before `.md` on a path collision.
const DUPLICATE_SUFFIX: &str = "-DUPLICATE";

/// Where a document ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Written {
    pub path: PathBuf,
    /// The intended path was already taken.
    pub duplicate: bool,
}

/// Writes documents below an output root.
#[derive(Debug, Clone)]
pub struct DocumentWriter {
    root: PathBuf,
}

impl DocumentWriter {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Create `{published,unpublished}/{pages,posts}`.
    pub fn prepare(&self) -> Result<()> {
        for published in [true, false] {
            for section in [Section::Posts, Section::Pages] {
                let dir = self
                    .root
                    .join(OutputPath::root_name(published))
                    .join(section.dir_name());
                fs::create_dir_all(&dir)
                    .with_context(|| format!("failed to create {}", dir.display()))?;
            }
        }
        Ok(())
    }

    /// Write one document to its path, or to a free duplicate path.
    pub fn write(&self, doc: &OutputDocument) -> Result<Written> {
        let intended = self.root.join(doc.path.relative());
        let path = free_path(&intended);
        let duplicate = path != intended;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
        fs::write(&path, render(doc)?)
            .with_context(|| format!("failed to write {}", path.display()))?;

        Ok(Written { path, duplicate })
    }
}

/// `intended` if free, else the first free `-DUPLICATE`, `-DUPLICATE-2`, ...
fn free_path(intended: &Path) -> PathBuf {
    if !intended.exists() {
        return intended.to_path_buf();
    }

    let stem = intended
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let candidate = |n: usize| {
        let name = match n {
            1 => format!("{stem}{DUPLICATE_SUFFIX}.md"),
            n => format!("{stem}{DUPLICATE_SUFFIX}-{n}.md"),
        };
        intended.with_file_name(name)
    };

    (1..)
        .map(candidate)
        .find(|path| !path.exists())
        .unwrap_or_else(|| intended.to_path_buf())
}

/// Full file content: front matter, body, attachments.
pub fn render(doc: &OutputDocument) -> Result<String> {
    let meta = &doc.meta;
    let mut out = String::from("---\n");

    out.push_str(&yaml_field("title", &meta.title)?);
    writeln!(out, "date: {}", meta.date)?;
    if !meta.author.is_empty() {
        writeln!(out, "author: {}", meta.author)?;
    }
    if let Some(tags) = &meta.tags {
        writeln!(out, "tags: [{}]", tags.join(", "))?;
    }
    if let Some(image) = &meta.image {
        writeln!(out, "image: {image}")?;
    }
    if let Some(alt) = &meta.image_alt {
        out.push_str(&yaml_field("image_alt", alt)?);
    }
    out.push_str("legacy-links:\n");
    for link in &meta.legacy_links {
        writeln!(out, "  - {link}")?;
    }
    writeln!(out, "  - node/{}", meta.node_id)?;
    out.push_str("---\n");
    out.push_str(&doc.body);

    if !doc.attachments.is_empty() {
        out.push_str("\n\nAttachments:\n\n");
        for attachment in &doc.attachments {
            writeln!(out, "* [{}]({})", attachment.name, attachment.path)?;
        }
    }

    Ok(out)
}

/// `key: value` with the value quoted as YAML needs.
fn yaml_field(key: &str, value: &str) -> Result<String> {
    let field = BTreeMap::from([(key, value)]);
    serde_yaml::to_string(&field).with_context(|| format!("failed to serialize `{key}`"))
}
