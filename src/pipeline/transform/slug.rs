//! Slug and output path derivation.

use std::path::PathBuf;
use std::sync::LazyLock;

use regex::Regex;

use super::TransformError;
use crate::source::ContentRecord;
use crate::utils::date::DateTimeUtc;

/// Legacy links that look like generated ids are not used as slugs.
static NUMERIC_ID: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d{6}").unwrap());

/// Characters not allowed in a legacy-link slug.
static NON_SLUG: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{Latin}0-9_-]").unwrap());

/// Runs replaced by `-` when slugifying a title.
static NON_WORD_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{Latin}0-9_]+").unwrap());

/// Top-level directory under each root.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Pages,
    Posts,
}

impl Section {
    pub const fn dir_name(self) -> &'static str {
        match self {
            Self::Pages => "pages",
            Self::Posts => "posts",
        }
    }
}

/// Relative location of a generated document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPath {
    pub published: bool,
    pub section: Section,
    /// File name including the `.md` extension.
    pub file_name: String,
}

impl OutputPath {
    pub const fn root_name(published: bool) -> &'static str {
        if published { "published" } else { "unpublished" }
    }

    pub fn is_post(&self) -> bool {
        self.section == Section::Posts
    }

    /// `<root>/<section>/<file>`, relative to the output directory.
    pub fn relative(&self) -> PathBuf {
        PathBuf::from(Self::root_name(self.published))
            .join(self.section.dir_name())
            .join(&self.file_name)
    }

    /// Path shown in diagnostics.
    pub fn display(&self) -> String {
        format!(
            "{}/{}/{}",
            Self::root_name(self.published),
            self.section.dir_name(),
            self.file_name
        )
    }
}

/// Slug from the first legacy link when it is usable, else from the title.
pub fn derive_slug(legacy: &[String], title: &str) -> String {
    if let Some(first) = legacy.first()
        && !NUMERIC_ID.is_match(first)
        && !NON_SLUG.is_match(first)
    {
        return first.clone();
    }
    slugify_title(title)
}

/// Lowercase, non-word runs collapsed to `-`, edges trimmed.
pub fn slugify_title(title: &str) -> String {
    let lower = title.to_lowercase();
    NON_WORD_RUN
        .replace_all(&lower, "-")
        .trim_matches('-')
        .to_string()
}

/// Pages with a non-zero id go to `pages/`; everything else is a dated post.
pub fn output_path(
    record: &ContentRecord,
    slug: &str,
    created: DateTimeUtc,
) -> Result<OutputPath, TransformError> {
    let as_page = record.is_page()
        && record
            .id
            .trim()
            .parse::<u64>()
            .map_err(|_| TransformError::InvalidPageId(record.id.clone()))?
            != 0;

    let (section, file_name) = if as_page {
        (Section::Pages, format!("{slug}.md"))
    } else {
        (
            Section::Posts,
            format!("{}-{slug}.md", created.date_part()),
        )
    };

    Ok(OutputPath {
        published: record.published,
        section,
        file_name,
    })
}
