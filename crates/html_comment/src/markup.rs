//! Conversion between HTML markup and the document tree.
//!
//! Comments travel as `<!--payload-->` tokens at the textual offset of their
//! anchor. Marks map to `<strong>`, `<em>` and `<u>`; every other tag becomes
//! an element of the same name.

mod downcast;
mod upcast;

pub use downcast::to_html;
pub use upcast::{from_html, Parsed};

use crate::types::Marks;

/// Elements rendered without children or an end tag.
const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input", "wbr"];

/// Mark tags in nesting order, outermost first.
const MARK_TAGS: &[(Marks, &str)] = &[
    (Marks::BOLD, "strong"),
    (Marks::ITALIC, "em"),
    (Marks::UNDERLINE, "u"),
];

pub(crate) fn is_void(name: &str) -> bool {
    VOID_ELEMENTS.contains(&name)
}

fn mark_of(tag: &str) -> Option<Marks> {
    match tag {
        "strong" | "b" => Some(Marks::BOLD),
        "em" | "i" => Some(Marks::ITALIC),
        "u" => Some(Marks::UNDERLINE),
        _ => None,
    }
}
