//! Owned HTML fragment tree.
//!
//! Bodies are parsed with the HTML5 fragment algorithm (`scraper`), which
//! recovers from stray `<`, unclosed paragraphs and similar legacy damage,
//! and copied into a small owned tree that the transform steps can mutate
//! freely. Text and attribute values are stored decoded and escaped again
//! on serialization.

use scraper::{ElementRef, Html};

use crate::utils::html;

/// A node in the fragment tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    /// Decoded text.
    Text(String),
    /// Comment body without the `<!--` and `-->` delimiters.
    Comment(String),
}

/// An element with its attributes in parser order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Lowercase tag name.
    pub name: String,
    /// Decoded `(name, value)`; `None` for empty or bare attributes like `disabled`.
    pub attrs: Vec<(String, Option<String>)>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Value of an attribute; bare attributes read as `""`.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_deref().unwrap_or(""))
    }

    /// Visit this element and every descendant element, parents first.
    pub fn walk_mut(&mut self, f: &mut impl FnMut(&mut Element)) {
        f(self);
        for child in &mut self.children {
            if let Node::Element(elem) = child {
                elem.walk_mut(f);
            }
        }
    }

    fn write_html(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        for (key, value) in &self.attrs {
            out.push(' ');
            out.push_str(key);
            if let Some(value) = value {
                out.push_str("=\"");
                out.push_str(&html::escape_attr(value));
                out.push('"');
            }
        }
        out.push('>');

        if html::is_void_element(&self.name) {
            return;
        }

        let raw_text = matches!(self.name.as_str(), "script" | "style");
        for child in &self.children {
            match child {
                Node::Text(text) if raw_text => out.push_str(text),
                _ => child.write_html(out),
            }
        }
        out.push_str("</");
        out.push_str(&self.name);
        out.push('>');
    }
}

impl Node {
    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.write_html(&mut out);
        out
    }

    fn write_html(&self, out: &mut String) {
        match self {
            Self::Element(elem) => elem.write_html(out),
            Self::Text(text) => out.push_str(&html::escape_text(text)),
            Self::Comment(text) => {
                out.push_str("<!--");
                out.push_str(text);
                out.push_str("-->");
            }
        }
    }

    fn is_blank(&self) -> bool {
        matches!(self, Self::Text(text) if text.trim().is_empty())
    }
}

// ============================================================================
// Fragment
// ============================================================================

/// A parsed body with a single root element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    pub root: Element,
}

impl Fragment {
    /// Parse a body fragment. Never fails; broken markup is repaired the way
    /// a browser would.
    ///
    /// A lone top-level element (whitespace aside) is the root. Anything else
    /// is wrapped in a `div`, or a `span` when no top-level element is
    /// block-level.
    pub fn parse(source: &str) -> Self {
        let document = Html::parse_fragment(source);
        // Fragment content hangs directly below the synthetic `<html>` root.
        let nodes = convert_children(document.root_element());
        Self { root: wrap(nodes) }
    }

    pub fn to_html(&self) -> String {
        let mut out = String::new();
        self.root.write_html(&mut out);
        out
    }
}

fn wrap(mut nodes: Vec<Node>) -> Element {
    let mut significant = nodes
        .iter()
        .enumerate()
        .filter(|(_, node)| !node.is_blank())
        .map(|(i, _)| i);
    let only = match (significant.next(), significant.next()) {
        (Some(i), None) => Some(i),
        _ => None,
    };

    if let Some(i) = only
        && matches!(nodes[i], Node::Element(_))
        && let Node::Element(root) = nodes.swap_remove(i)
    {
        return root;
    }

    let has_block = nodes
        .iter()
        .any(|node| matches!(node, Node::Element(elem) if html::is_block_element(&elem.name)));
    let mut wrapper = Element::new(if has_block { "div" } else { "span" });
    wrapper.children = nodes;
    wrapper
}

fn convert_children(parent: ElementRef<'_>) -> Vec<Node> {
    let mut nodes: Vec<Node> = Vec::new();
    for child in parent.children() {
        let node = match child.value() {
            scraper::Node::Element(_) => match ElementRef::wrap(child) {
                Some(elem) => Node::Element(convert_element(elem)),
                None => continue,
            },
            scraper::Node::Text(text) => {
                // The tree builder may leave adjacent text nodes.
                if let Some(Node::Text(prev)) = nodes.last_mut() {
                    prev.push_str(text);
                    continue;
                }
                Node::Text(text.to_string())
            }
            scraper::Node::Comment(comment) => Node::Comment(comment.to_string()),
            _ => continue,
        };
        nodes.push(node);
    }
    nodes
}

fn convert_element(elem: ElementRef<'_>) -> Element {
    let value = elem.value();
    let mut out = Element::new(value.name().to_ascii_lowercase());
    out.attrs = value
        .attrs()
        .map(|(key, value)| {
            let value = (!value.is_empty()).then(|| value.to_string());
            (key.to_ascii_lowercase(), value)
        })
        .collect();
    out.children = convert_children(elem);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_element_is_root() {
        let fragment = Fragment::parse("\n  <div class=\"post\"><p>Hi</p></div>\n");
        assert_eq!(fragment.root.name, "div");
        assert_eq!(fragment.root.attr("class"), Some("post"));
        assert_eq!(fragment.to_html(), "<div class=\"post\"><p>Hi</p></div>");
    }

    #[test]
    fn test_multiple_blocks_wrapped_in_div() {
        let fragment = Fragment::parse("<p>a</p><p>b</p>");
        assert_eq!(fragment.root.name, "div");
        assert_eq!(fragment.to_html(), "<div><p>a</p><p>b</p></div>");
    }

    #[test]
    fn test_inline_content_wrapped_in_span() {
        let fragment = Fragment::parse("plain <b>bold</b> text");
        assert_eq!(fragment.root.name, "span");
        assert_eq!(fragment.to_html(), "<span>plain <b>bold</b> text</span>");
    }

    #[test]
    fn test_text_only_is_wrapped() {
        let fragment = Fragment::parse("just words");
        assert_eq!(fragment.to_html(), "<span>just words</span>");
    }

    #[test]
    fn test_comments_and_entities_preserved() {
        let fragment = Fragment::parse("<p>a &amp; b</p><!--more--><p>c</p>");
        assert_eq!(
            fragment.to_html(),
            "<div><p>a &amp; b</p><!--more--><p>c</p></div>"
        );
        assert!(matches!(&fragment.root.children[1], Node::Comment(c) if c == "more"));
        let Node::Element(first) = &fragment.root.children[0] else {
            panic!("expected an element");
        };
        assert_eq!(first.children, vec![Node::Text("a & b".to_string())]);
    }

    #[test]
    fn test_void_elements_and_bare_attributes() {
        let fragment = Fragment::parse("<p>x<br><img alt='say \"hi\"'><input disabled></p>");
        assert_eq!(
            fragment.to_html(),
            "<p>x<br><img alt=\"say &quot;hi&quot;\"><input disabled></p>"
        );
    }

    #[test]
    fn test_attributes_decoded() {
        let fragment = Fragment::parse("<img src=\"/files/a.jpg?x=1&amp;y=2\" alt=\"M&uuml;ller\">");
        assert_eq!(fragment.root.name, "img");
        assert_eq!(fragment.root.attr("src"), Some("/files/a.jpg?x=1&y=2"));
        assert_eq!(fragment.root.attr("alt"), Some("Müller"));
    }

    #[test]
    fn test_stray_less_than_keeps_text() {
        let fragment = Fragment::parse("<p>1 < 2 & 3</p><p>x</p>");
        assert_eq!(fragment.root.name, "div");
        assert_eq!(fragment.root.children.len(), 2);
        assert_eq!(
            fragment.to_html(),
            "<div><p>1 &lt; 2 &amp; 3</p><p>x</p></div>"
        );
    }

    #[test]
    fn test_unclosed_paragraphs_become_siblings() {
        let fragment = Fragment::parse("<p>a<p>b<p>c<p>d");
        assert_eq!(
            fragment.to_html(),
            "<div><p>a</p><p>b</p><p>c</p><p>d</p></div>"
        );
    }

    #[test]
    fn test_style_text_not_escaped() {
        let fragment = Fragment::parse("<style>a > b { color: red; }</style>");
        assert_eq!(
            fragment.to_html(),
            "<style>a > b { color: red; }</style>"
        );
    }

    #[test]
    fn test_walk_visits_all_elements() {
        let mut fragment = Fragment::parse("<ul><li><a href=\"/a\">a</a></li><li>b</li></ul>");
        let mut names = Vec::new();
        fragment.root.walk_mut(&mut |elem| names.push(elem.name.clone()));
        assert_eq!(names, vec!["ul", "li", "a", "li"]);
    }
}
