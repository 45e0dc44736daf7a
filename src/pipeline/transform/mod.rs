//! Per-record content transformation.
//!
//! One [`ContentRecord`] in, one [`OutputDocument`] out. Steps, in order:
//!
//! 1. `text`: encoding repair of title and body
//! 2. `expand`: shorthand markup through the external expander (formats 1, 3)
//! 3. `slug`: slug and output path
//! 4. `more`: `<!--break-->` normalization
//! 5. `php`: `<?php ?>` blocks shown as code
//! 6. `fragment`: HTML5 fragment parse into an owned tree
//! 7. `more`: automatic excerpt marker (posts)
//! 8. `media`: thumbnail extraction (posts)
//! 9. `link`: absolute links on the site domain made root-relative
//! 10. `markdown`: HTML to Markdown

mod expand;
mod fragment;
mod link;
mod markdown;
mod media;
mod more;
mod php;
mod slug;
mod text;

pub use expand::Expander;
pub use link::LinkRelativizer;
pub use slug::{OutputPath, Section};

use anyhow::{Context, Result};
use regex::Regex;
use thiserror::Error;

use crate::index::{Attachment, AttachmentIndex, LegacyLinkIndex};
use crate::source::ContentRecord;
use crate::utils::date::DateTimeUtc;
use crate::{debug, log};
use fragment::Fragment;

/// Record-level failures that abort the run.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("page has non-numeric id `{0}`")]
    InvalidPageId(String),

    #[error("node {id}: created timestamp {created} is out of range")]
    InvalidDate { id: String, created: i64 },
}

/// Front matter fields, in output order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrontMatter {
    pub title: String,
    pub date: DateTimeUtc,
    /// Omitted when empty.
    pub author: String,
    /// Omitted when `None`.
    pub tags: Option<Vec<String>>,
    pub image: Option<String>,
    pub image_alt: Option<String>,
    pub legacy_links: Vec<String>,
    pub node_id: String,
}

/// A transformed record, ready for the writer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputDocument {
    pub path: OutputPath,
    pub meta: FrontMatter,
    /// Markdown body.
    pub body: String,
    pub attachments: Vec<Attachment>,
}

/// Transforms records using the prebuilt indexes.
pub struct Transformer<'a> {
    legacy: &'a LegacyLinkIndex,
    attachments: &'a AttachmentIndex,
    expander: Expander,
    links: LinkRelativizer<'a>,
}

impl<'a> Transformer<'a> {
    pub fn new(
        legacy: &'a LegacyLinkIndex,
        attachments: &'a AttachmentIndex,
        expander: Expander,
        domain: Option<&'a Regex>,
    ) -> Self {
        Self {
            legacy,
            attachments,
            expander,
            links: LinkRelativizer::new(domain),
        }
    }

    /// Transform one record. Empty bodies yield `None`.
    pub fn transform(&self, record: &ContentRecord) -> Result<Option<OutputDocument>> {
        if record.body.is_empty() {
            debug!("skip"; "node {} has an empty body", record.id);
            return Ok(None);
        }

        let title = text::fix_text(&record.title).trim().to_string();
        let mut body = text::fix_body(&record.body).trim().to_string();
        let date = DateTimeUtc::from_unix(record.created).map_err(|_| {
            TransformError::InvalidDate {
                id: record.id.clone(),
                created: record.created,
            }
        })?;

        if record.format.needs_expansion() {
            body = self
                .expander
                .expand(&body)
                .with_context(|| format!("failed to expand body of node {}", record.id))?;
        }

        let legacy_links = self.legacy.links(&record.id);
        let slug = slug::derive_slug(&legacy_links, &title);
        let path = slug::output_path(record, &slug, date)?;

        let mut body = more::normalize(&body).into_owned();
        let has_more = more::has_marker(&body);

        if php::has_php(&body) {
            log!("php"; "found PHP tag: {}", path.display());
            body = php::neutralize(&body).into_owned();
        }

        let mut fragment = Fragment::parse(&body);

        let thumbnail = if path.is_post() {
            if !has_more {
                more::insert_marker(&mut fragment.root);
            }
            media::extract_thumbnail(&mut fragment.root, &self.links, &path.display())
        } else {
            None
        };

        self.links.apply(&mut fragment.root);
        let body = markdown::to_markdown(fragment);

        let (image, image_alt) = match thumbnail {
            Some(thumb) => (
                Some(thumb.src).filter(|src| !src.is_empty()),
                thumb.alt.filter(|alt| !alt.is_empty()),
            ),
            None => (None, None),
        };

        Ok(Some(OutputDocument {
            path,
            meta: FrontMatter {
                title,
                date,
                author: record.author.clone(),
                tags: record.tags.clone(),
                image,
                image_alt,
                legacy_links,
                node_id: record.id.clone(),
            },
            body,
            attachments: self.attachments.get(&record.id).to_vec(),
        }))
    }
}
