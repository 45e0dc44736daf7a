//! HTML to Markdown conversion.
//!
//! Block structure is laid out here, walking the fragment tree: paragraphs,
//! headings, lists, quotes and code blocks become Markdown blocks separated
//! by a blank line. Runs of inline content (emphasis, links, images, line
//! breaks) are converted with `fast_html2md`.
//!
//! The converter drops HTML comments, but `<!--more-->` must survive into
//! the Markdown. Comments are swapped for plain-word placeholders before
//! conversion and restored afterwards.

use std::sync::LazyLock;

use regex::Regex;

use super::fragment::{Element, Fragment, Node};
use crate::utils::html;

/// Blank line directly before a line end.
static TRAILING_BLANK: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?m)\n\n$").unwrap());

/// Convert a fragment to Markdown without line wrapping.
pub fn to_markdown(fragment: Fragment) -> String {
    let mut blocks = Vec::new();
    element_blocks(&fragment.root, &mut blocks);

    let markdown = blocks.join("\n\n");
    let markdown = TRAILING_BLANK.replace_all(&markdown, "\n");
    let markdown = markdown.trim_end();
    if markdown.is_empty() {
        String::new()
    } else {
        format!("{markdown}\n")
    }
}

/// Blocks of one element, treating an inline root like a paragraph.
fn element_blocks(elem: &Element, out: &mut Vec<String>) {
    match elem.name.as_str() {
        "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            let level = usize::from(elem.name.as_bytes()[1] - b'0');
            let text = inline_markdown(&elem.children).replace('\n', " ");
            if !text.is_empty() {
                out.push(format!("{} {text}", "#".repeat(level)));
            }
        }
        "ul" | "ol" | "menu" => {
            let list = list_block(elem);
            if !list.is_empty() {
                out.push(list);
            }
        }
        "blockquote" => {
            let mut inner = Vec::new();
            container_blocks(&elem.children, &mut inner);
            if !inner.is_empty() {
                out.push(prefix_lines(&inner.join("\n\n"), "> ", ">"));
            }
        }
        "pre" => out.push(code_block(elem)),
        "hr" => out.push("---".to_string()),
        "table" => {
            let table = inline_markdown(std::slice::from_ref(&Node::Element(elem.clone())));
            if !table.is_empty() {
                out.push(table);
            }
        }
        "script" | "style" => {}
        _ if html::is_block_element(&elem.name) || is_wrapper(elem) => {
            container_blocks(&elem.children, out);
        }
        _ => {
            let text = inline_markdown(std::slice::from_ref(&Node::Element(elem.clone())));
            if !text.is_empty() {
                out.push(text);
            }
        }
    }
}

/// The synthetic `span` around inline-only bodies.
fn is_wrapper(elem: &Element) -> bool {
    elem.name == "span" && elem.attrs.is_empty()
}

/// Mixed content: inline runs between block children become paragraphs.
fn container_blocks(children: &[Node], out: &mut Vec<String>) {
    let mut run: Vec<Node> = Vec::new();
    for child in children {
        match child {
            Node::Element(elem) if is_block(&elem.name) => {
                flush_inline(&mut run, out);
                element_blocks(elem, out);
            }
            _ => run.push(child.clone()),
        }
    }
    flush_inline(&mut run, out);
}

fn is_block(name: &str) -> bool {
    html::is_block_element(name) || matches!(name, "menu" | "script" | "style")
}

fn flush_inline(run: &mut Vec<Node>, out: &mut Vec<String>) {
    if run.is_empty() {
        return;
    }
    let text = inline_markdown(run);
    run.clear();
    if !text.is_empty() {
        out.push(text);
    }
}

/// `* item` or `1. item` lines; item continuation lines are indented.
fn list_block(list: &Element) -> String {
    let ordered = list.name == "ol";
    let mut items = Vec::new();

    for child in &list.children {
        let mut blocks = Vec::new();
        match child {
            Node::Element(item) if item.name == "li" => container_blocks(&item.children, &mut blocks),
            Node::Element(other) => element_blocks(other, &mut blocks),
            Node::Text(text) if text.trim().is_empty() => continue,
            other => container_blocks(std::slice::from_ref(other), &mut blocks),
        }

        let marker = if ordered {
            format!("{}. ", items.len() + 1)
        } else {
            "* ".to_string()
        };
        let indent = " ".repeat(marker.len());
        let body = prefix_lines(&blocks.join("\n\n"), &indent, "");
        items.push(format!("{marker}{}", body.trim_start()).trim_end().to_string());
    }

    items.join("\n")
}

/// Fenced code block with the text content left untouched.
fn code_block(pre: &Element) -> String {
    let mut code = String::new();
    text_content(pre, &mut code);
    let code = code.strip_prefix('\n').unwrap_or(&code).trim_end_matches('\n');
    let fence = if code.contains("```") { "~~~" } else { "```" };
    format!("{fence}\n{code}\n{fence}")
}

fn text_content(elem: &Element, out: &mut String) {
    for child in &elem.children {
        match child {
            Node::Text(text) => out.push_str(text),
            Node::Element(inner) if inner.name == "br" => out.push('\n'),
            Node::Element(inner) => text_content(inner, out),
            Node::Comment(_) => {}
        }
    }
}

/// Prefix every non-empty line with `prefix`, empty lines with `empty`.
fn prefix_lines(text: &str, prefix: &str, empty: &str) -> String {
    text.lines()
        .map(|line| {
            if line.is_empty() {
                empty.to_string()
            } else {
                format!("{prefix}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Convert a run of inline nodes, comments kept verbatim.
fn inline_markdown(nodes: &[Node]) -> String {
    let mut holder = Element::new("span");
    holder.children = nodes.to_vec();
    let mut comments = Vec::new();
    stash_comments(&mut holder, &mut comments);

    let mut source = String::new();
    for child in &holder.children {
        source.push_str(&child.to_html());
    }

    let mut markdown = html2md::rewrite_html(&source, false);
    for (i, comment) in comments.iter().enumerate().rev() {
        markdown = markdown.replace(&placeholder(i), &format!("<!--{comment}-->"));
    }
    markdown.trim().to_string()
}

/// Letters and digits only, so the converter never escapes it.
fn placeholder(index: usize) -> String {
    format!("DRUPALCOMMENT{index}X")
}

fn stash_comments(elem: &mut Element, comments: &mut Vec<String>) {
    for child in &mut elem.children {
        match child {
            Node::Comment(text) => {
                let text = std::mem::take(text);
                *child = Node::Text(placeholder(comments.len()));
                comments.push(text);
            }
            Node::Element(inner) => stash_comments(inner, comments),
            Node::Text(_) => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn convert(source: &str) -> String {
        to_markdown(Fragment::parse(source))
    }

    #[test]
    fn test_placeholders_are_unique() {
        assert_ne!(placeholder(1), placeholder(11));
        assert!(!placeholder(11).contains(&placeholder(1)));
    }

    #[test]
    fn test_paragraphs_separated_by_blank_line() {
        assert_eq!(convert("<p>one</p><p>two</p>"), "one\n\ntwo\n");
    }

    #[test]
    fn test_paragraph_after_list_is_separate() {
        assert_eq!(
            convert("<ul><li>a</li><li>b</li></ul><p>c</p>"),
            "* a\n* b\n\nc\n"
        );
        assert_eq!(convert("<ol><li>x</li><li>y</li></ol>"), "1. x\n2. y\n");
    }

    #[test]
    fn test_more_marker_survives() {
        assert_eq!(
            convert("<p>Intro</p><!--more--><p>Rest</p>"),
            "Intro\n\n<!--more-->\n\nRest\n"
        );
    }

    #[test]
    fn test_unclosed_paragraphs() {
        assert_eq!(convert("<p>a<p>b<p>c"), "a\n\nb\n\nc\n");
    }

    #[test]
    fn test_headings_and_quotes() {
        assert_eq!(
            convert("<h2>Title</h2><blockquote><p>q1</p><p>q2</p></blockquote>"),
            "## Title\n\n> q1\n>\n> q2\n"
        );
    }

    #[test]
    fn test_code_block_text_unaltered() {
        assert_eq!(
            convert("<p>x</p><pre>if a &lt; b_c { *d }</pre>"),
            "x\n\n```\nif a < b_c { *d }\n```\n"
        );
    }

    #[test]
    fn test_basic_markup() {
        let markdown = convert("<p>Some <strong>bold</strong> and a <a href=\"/about\">link</a>.</p>");
        assert!(markdown.contains("**bold**"));
        assert!(markdown.contains("[link](/about)"));
        assert!(markdown.ends_with('\n'));
        assert!(!markdown.ends_with("\n\n"));
    }

    #[test]
    fn test_inline_body_is_one_paragraph() {
        assert_eq!(convert("just <b>some</b> words"), "just **some** words\n");
    }

    #[test]
    fn test_long_paragraph_not_wrapped() {
        let words = vec!["word"; 60].join(" ");
        assert_eq!(convert(&format!("<p>{words}</p>")).trim(), words);
    }

    #[test]
    fn test_trailing_blank_lines_collapsed() {
        assert_eq!(TRAILING_BLANK.replace_all("a\n\n\nb\n\n", "\n"), "a\n\nb\n");
    }
}
