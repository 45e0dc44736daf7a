//! Node id → attached files.

use rustc_hash::FxHashMap;

use crate::source::AttachmentRow;

/// A file attached to a node, rendered as a Markdown link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// Display name (link text).
    pub name: String,
    /// Site-absolute path (link target).
    pub path: String,
}

/// Attachments per node id in table order. Duplicates are kept.
#[derive(Debug, Default)]
pub struct AttachmentIndex {
    files: FxHashMap<String, Vec<Attachment>>,
}

impl AttachmentIndex {
    pub fn build(rows: &[AttachmentRow]) -> Self {
        let mut files: FxHashMap<String, Vec<Attachment>> = FxHashMap::default();
        for row in rows {
            files.entry(row.id.clone()).or_default().push(Attachment {
                name: row.name.clone(),
                path: format!("/{}", row.path),
            });
        }
        Self { files }
    }

    pub fn get(&self, id: &str) -> &[Attachment] {
        self.files.get(id).map_or(&[], Vec::as_slice)
    }
}
