//! Node id → legacy URL paths, from the alias and redirect tables.

use std::sync::LazyLock;

use regex::Regex;
use rustc_hash::{FxHashMap, FxHashSet};

use crate::log;
use crate::source::LinkRow;

/// Prefix of canonical references that point at content.
const NODE_PREFIX: &str = "node/";

static EXTERNAL_URL: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"https?://").unwrap());

/// Legacy paths per node id: aliases first, then redirect sources.
#[derive(Debug, Default)]
pub struct LegacyLinkIndex {
    links: FxHashMap<String, Vec<String>>,
}

impl LegacyLinkIndex {
    /// Build from the alias and redirect tables.
    ///
    /// Rows whose reference is not `node/<id>` are ignored. Redirects whose
    /// source is an absolute URL are reported and left out.
    pub fn build(aliases: &[LinkRow], redirects: &[LinkRow]) -> Self {
        let mut index = Self::default();

        for row in aliases {
            if let Some(id) = row.reference.strip_prefix(NODE_PREFIX) {
                index.push(id, &row.path);
            }
        }

        for row in redirects {
            let Some(id) = row.reference.strip_prefix(NODE_PREFIX) else {
                continue;
            };
            if EXTERNAL_URL.is_match(&row.path) {
                log!("redirect"; "skipping external redirect {} {}", row.reference, row.path);
                continue;
            }
            index.push(id, &row.path);
        }

        index
    }

    fn push(&mut self, id: &str, path: &str) {
        self.links
            .entry(id.to_string())
            .or_default()
            .push(path.to_string());
    }

    /// Legacy paths of a node, duplicates removed keeping first occurrence.
    pub fn links(&self, id: &str) -> Vec<String> {
        let Some(paths) = self.links.get(id) else {
            return Vec::new();
        };
        let mut seen = FxHashSet::default();
        paths
            .iter()
            .filter(|path| seen.insert(path.as_str()))
            .cloned()
            .collect()
    }

    /// Number of nodes with at least one legacy path.
    pub fn len(&self) -> usize {
        self.links.len()
    }
}
