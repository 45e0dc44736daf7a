//! Export table readers.
//!
//! Four tab-separated tables come out of the Drupal export:
//!
//! | Table             | Columns                                              |
//! |-------------------|------------------------------------------------------|
//! | `url_alias.csv`   | `node/<id>`, alias path                              |
//! | `redirects.csv`   | source path, `node/<id>`                             |
//! | `attachments.csv` | id, file path, display name                          |
//! | `nodes.csv`       | id, type, title, status, created, changed, body, format, tags, author |
//!
//! Only `nodes.csv` has a header row and quoted fields. A row with the
//! wrong number of columns aborts the run.

mod error;
mod record;
mod table;

pub use error::SourceError;
pub use record::{BodyFormat, ContentRecord};
pub use table::{
    AttachmentRow, LinkRow, read_alias_table, read_attachments, read_nodes, read_redirect_table,
};
