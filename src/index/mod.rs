//! Lookup tables built once before any node is transformed.

mod attachment;
mod legacy;

pub use attachment::{Attachment, AttachmentIndex};
pub use legacy::LegacyLinkIndex;
