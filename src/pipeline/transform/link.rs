//! Absolute-to-root-relative link rewriting.
//!
//! With a configured domain pattern `D`, every `https?://D/` in a
//! link-bearing attribute or a `<style>` block becomes `/`:
//!
//! | Before                                   | After             |
//! |------------------------------------------|-------------------|
//! | `href="http://www.example.org/about"`    | `href="/about"`   |
//! | `style="background: url(https://www.example.org/x.png)"` | `style="background: url(/x.png)"` |
//! | `href="https://elsewhere.net/"`          | unchanged         |

use std::borrow::Cow;

use regex::Regex;

use super::fragment::{Element, Node};

/// Attributes that may carry a URL.
const LINK_ATTRS: &[&str] = &[
    "href",
    "src",
    "action",
    "cite",
    "data",
    "background",
    "longdesc",
    "poster",
    "formaction",
    "codebase",
    "usemap",
    "style",
];

/// Rewrites absolute links on the configured domain.
#[derive(Debug, Clone, Copy)]
pub struct LinkRelativizer<'a> {
    domain: Option<&'a Regex>,
}

impl<'a> LinkRelativizer<'a> {
    /// `domain` is the compiled `https?://<domain>/` pattern.
    pub fn new(domain: Option<&'a Regex>) -> Self {
        Self { domain }
    }

    /// Rewrite one URL (or any text containing URLs).
    pub fn relativize<'s>(&self, url: &'s str) -> Cow<'s, str> {
        match self.domain {
            Some(domain) => domain.replace_all(url, "/"),
            None => Cow::Borrowed(url),
        }
    }

    /// Rewrite every link in the tree.
    pub fn apply(&self, root: &mut Element) {
        if self.domain.is_none() {
            return;
        }

        root.walk_mut(&mut |elem| {
            for (key, value) in &mut elem.attrs {
                if let Some(value) = value
                    && LINK_ATTRS.contains(&key.as_str())
                    && let Cow::Owned(rewritten) = self.relativize(value)
                {
                    *value = rewritten;
                }
            }

            if elem.name == "style" {
                for child in &mut elem.children {
                    if let Node::Text(text) = child
                        && let Cow::Owned(rewritten) = self.relativize(text)
                    {
                        *text = rewritten;
                    }
                }
            }
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::transform::fragment::Fragment;

    fn domain() -> Regex {
        Regex::new(r"https?://www\.example\.org/").unwrap()
    }

    #[test]
    fn test_relativize_url() {
        let re = domain();
        let links = LinkRelativizer::new(Some(&re));
        assert_eq!(links.relativize("http://www.example.org/node/3"), "/node/3");
        assert_eq!(links.relativize("https://www.example.org/"), "/");
        assert_eq!(links.relativize("https://example.org/x"), "https://example.org/x");
        assert_eq!(links.relativize("/already/relative"), "/already/relative");
    }

    #[test]
    fn test_without_domain_nothing_changes() {
        let links = LinkRelativizer::new(None);
        assert_eq!(links.relativize("http://www.example.org/a"), "http://www.example.org/a");

        let mut fragment = Fragment::parse("<a href=\"http://www.example.org/a\">a</a>");
        let before = fragment.clone();
        links.apply(&mut fragment.root);
        assert_eq!(fragment, before);
    }

    #[test]
    fn test_apply_rewrites_link_attributes() {
        let re = domain();
        let mut fragment = Fragment::parse(concat!(
            "<div>",
            "<a href=\"http://www.example.org/about\" title=\"http://www.example.org/\">x</a>",
            "<img src=\"https://www.example.org/files/a.png\">",
            "<p style=\"background: url(https://www.example.org/bg.png)\">t</p>",
            "<a href=\"https://elsewhere.net/\">y</a>",
            "</div>"
        ));
        LinkRelativizer::new(Some(&re)).apply(&mut fragment.root);
        assert_eq!(
            fragment.to_html(),
            concat!(
                "<div>",
                "<a href=\"/about\" title=\"http://www.example.org/\">x</a>",
                "<img src=\"/files/a.png\">",
                "<p style=\"background: url(/bg.png)\">t</p>",
                "<a href=\"https://elsewhere.net/\">y</a>",
                "</div>"
            )
        );
    }

    #[test]
    fn test_apply_rewrites_style_blocks() {
        let re = domain();
        let mut fragment =
            Fragment::parse("<div><style>body { background: url(http://www.example.org/b.gif) }</style></div>");
        LinkRelativizer::new(Some(&re)).apply(&mut fragment.root);
        assert!(fragment.to_html().contains("url(/b.gif)"));
    }
}
