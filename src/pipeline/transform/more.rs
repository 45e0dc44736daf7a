//! The `<!--more-->` excerpt marker.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::Regex;

use super::fragment::{Element, Node};

/// Canonical marker text, as written in the body.
pub const MORE_MARKER: &str = "<!--more-->";

/// Index among non-text children where a marker is inserted.
const INSERT_AT: usize = 2;

static LEGACY_MARKER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"<!-- *(break|more) *-->").unwrap());

/// Rewrite `<!--break-->` and spaced variants to the canonical marker.
pub fn normalize(body: &str) -> Cow<'_, str> {
    LEGACY_MARKER.replace_all(body, MORE_MARKER)
}

pub fn has_marker(body: &str) -> bool {
    body.contains(MORE_MARKER)
}

/// Insert a marker before the third non-text child of `root`.
///
/// Returns `false` when the root has two or fewer such children.
pub fn insert_marker(root: &mut Element) -> bool {
    let Some(position) = root
        .children
        .iter()
        .enumerate()
        .filter(|(_, node)| !matches!(node, Node::Text(_)))
        .nth(INSERT_AT)
        .map(|(i, _)| i)
    else {
        return false;
    };
    root.children
        .insert(position, Node::Comment("more".to_string()));
    true
}
