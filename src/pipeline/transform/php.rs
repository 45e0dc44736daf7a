//! Neutralization of embedded `<?php ... ?>` blocks.

use std::borrow::Cow;
use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::utils::html;

static PHP_BLOCK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?s)<\?php.*?\?>").unwrap());

/// Whether the body contains an opening PHP tag.
pub fn has_php(body: &str) -> bool {
    body.contains("<?php")
}

/// Replace every PHP block with its escaped source inside `<pre>`.
pub fn neutralize(body: &str) -> Cow<'_, str> {
    PHP_BLOCK.replace_all(body, |caps: &Captures| {
        format!("<pre>{}</pre>", html::escape(&caps[0]))
    })
}
