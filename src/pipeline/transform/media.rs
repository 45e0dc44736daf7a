//! Thumbnail extraction for posts.

use super::fragment::{Element, Node};
use super::link::LinkRelativizer;
use crate::log;

/// Directory the legacy site served uploads from.
const FILES_PREFIX: &str = "files/";

/// Lead image of a post, moved from the body into the front matter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Thumbnail {
    /// Path relative to the uploads directory.
    pub src: String,
    pub alt: Option<String>,
}

/// Remove the first `<img>` with a `src` below `root` and return it.
///
/// Document order; `root` itself is not considered. Text around the image
/// stays where it was.
pub fn take_first_image(root: &mut Element) -> Option<Element> {
    for i in 0..root.children.len() {
        let is_image = matches!(
            &root.children[i],
            Node::Element(elem) if elem.name == "img" && elem.attr("src").is_some()
        );
        if is_image && let Node::Element(image) = root.children.remove(i) {
            return Some(image);
        }
        if let Node::Element(elem) = &mut root.children[i]
            && let Some(image) = take_first_image(elem)
        {
            return Some(image);
        }
    }
    None
}

/// Extract the thumbnail of a post.
///
/// The `src` is made root-relative, then the leading `/` and `files/` are
/// dropped. An image outside `files/` is reported and kept as is. Both
/// attributes come decoded from the parser.
pub fn extract_thumbnail(
    root: &mut Element,
    links: &LinkRelativizer<'_>,
    path: &str,
) -> Option<Thumbnail> {
    let image = take_first_image(root)?;
    let src = image.attr("src").unwrap_or_default();

    let relative = links.relativize(src);
    let relative = relative.trim_start_matches('/');
    let src = match relative.strip_prefix(FILES_PREFIX) {
        Some(inner) => inner.to_string(),
        None => {
            log!("image"; "invalid image: {path}");
            relative.to_string()
        }
    };

    Some(Thumbnail {
        src,
        alt: image.attr("alt").map(String::from),
    })
}
