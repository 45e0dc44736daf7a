//! Content records from the node table.

/// Node type tag that maps to `pages/`; every other type becomes a post.
pub const PAGE_TYPE: &str = "page";

/// Sentinel in the tags column for "no tags".
pub const NO_TAGS: &str = "NULL";

/// Body text format of a node revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BodyFormat {
    /// Format code 1: filtered HTML with shorthand markup.
    FilteredHtml,
    /// Format code 3: full HTML with shorthand markup.
    FullHtml,
    /// Any other code; the body is used as-is.
    Plain,
}

impl BodyFormat {
    pub fn from_code(code: &str) -> Self {
        match code.trim() {
            "1" => Self::FilteredHtml,
            "3" => Self::FullHtml,
            _ => Self::Plain,
        }
    }

    /// Whether the body goes through the markup expander.
    pub const fn needs_expansion(self) -> bool {
        matches!(self, Self::FilteredHtml | Self::FullHtml)
    }
}

/// One legacy content item. Read once, never modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentRecord {
    pub id: String,
    /// Node type (`page`, `story`, `blog`, ...).
    pub kind: String,
    pub title: String,
    pub published: bool,
    /// Creation time, seconds since the unix epoch.
    pub created: i64,
    pub body: String,
    pub format: BodyFormat,
    /// `None` when the export has the `NULL` sentinel.
    pub tags: Option<Vec<String>>,
    /// May be empty.
    pub author: String,
}

impl ContentRecord {
    pub fn is_page(&self) -> bool {
        self.kind == PAGE_TYPE
    }
}

/// Status column: `0` (or nothing at all) means unpublished.
pub fn parse_status(value: &str) -> bool {
    !matches!(value.trim(), "0" | "")
}

/// Tags column: comma separated, `NULL` for none.
pub fn parse_tags(value: &str) -> Option<Vec<String>> {
    if value == NO_TAGS {
        return None;
    }
    Some(
        value
            .split(',')
            .map(str::trim)
            .filter(|tag| !tag.is_empty())
            .map(String::from)
            .collect(),
    )
}
