use std::collections::{BTreeMap, HashMap};

use quick_xml::escape::{escape, partial_escape};

use super::{is_void, MARK_TAGS};
use crate::comments::HtmlComments;
use crate::types::{Descendant, Editor, Element, Marks, Path};

type Anchors = HashMap<Path, BTreeMap<usize, Vec<String>>>;

enum Piece<'a> {
    Text(&'a str, Marks),
    Comment(&'a str),
    Element(&'a Element, Path),
}

/// Serialize the document, emitting every comment as `<!--payload-->` at the
/// point its anchor resolves to.
pub fn to_html(editor: &Editor, comments: &HtmlComments) -> String {
    let mut anchors = Anchors::new();

    for (point, ids) in comments.anchors(editor) {
        let payloads = ids
            .iter()
            .filter_map(|id| comments.store().get(id).ok())
            .map(String::from)
            .collect();
        anchors
            .entry(point.path)
            .or_default()
            .insert(point.offset, payloads);
    }

    let mut out = String::new();
    write_children(&mut out, editor.children(), &Path::root(), &anchors);
    out
}

fn write_children(out: &mut String, children: &[Descendant], path: &Path, anchors: &Anchors) {
    let empty = BTreeMap::new();
    let at = anchors.get(path).unwrap_or(&empty);
    let mut pieces = vec![];
    let mut offset = 0;

    for child in children {
        push_comments(&mut pieces, at.get(&offset));

        match child {
            Descendant::Text(text) => {
                let end = offset + text.len();
                let mut cursor = offset;
                if end > offset + 1 {
                    for (&split, payloads) in at.range(offset + 1..end) {
                        pieces.push(Piece::Text(
                            text.slice(cursor - offset, split - offset),
                            text.marks(),
                        ));
                        push_comments(&mut pieces, Some(payloads));
                        cursor = split;
                    }
                }
                pieces.push(Piece::Text(
                    text.slice(cursor - offset, end - offset),
                    text.marks(),
                ));
            }
            Descendant::Element(element) => {
                pieces.push(Piece::Element(element, path.concat(offset)));
            }
        }

        offset += child.size();
    }

    push_comments(&mut pieces, at.get(&offset));
    write_pieces(out, &pieces, anchors);
}

fn push_comments<'a>(pieces: &mut Vec<Piece<'a>>, payloads: Option<&'a Vec<String>>) {
    for payload in payloads.into_iter().flatten() {
        pieces.push(Piece::Comment(payload));
    }
}

fn write_pieces(out: &mut String, pieces: &[Piece<'_>], anchors: &Anchors) {
    let mut open = Marks::empty();

    for (i, piece) in pieces.iter().enumerate() {
        match piece {
            Piece::Text(text, marks) => {
                if *marks != open {
                    close_marks(out, open);
                    open_marks(out, *marks);
                    open = *marks;
                }
                out.push_str(&partial_escape(*text));
            }
            Piece::Comment(payload) => {
                // Stay inside the mark tags only when the same marks continue.
                if !open.is_empty() && !continues_with(&pieces[i + 1..], open) {
                    close_marks(out, open);
                    open = Marks::empty();
                }
                out.push_str("<!--");
                out.push_str(payload);
                out.push_str("-->");
            }
            Piece::Element(element, path) => {
                close_marks(out, open);
                open = Marks::empty();
                write_element(out, element, path, anchors);
            }
        }
    }

    close_marks(out, open);
}

fn continues_with(rest: &[Piece<'_>], marks: Marks) -> bool {
    match rest.iter().find(|piece| !matches!(piece, Piece::Comment(_))) {
        Some(Piece::Text(_, next)) => *next == marks,
        _ => false,
    }
}

fn write_element(out: &mut String, element: &Element, path: &Path, anchors: &Anchors) {
    out.push('<');
    out.push_str(element.name());
    for (name, value) in element.attributes() {
        out.push(' ');
        out.push_str(name);
        out.push_str("=\"");
        out.push_str(&escape(value.as_str()));
        out.push('"');
    }
    out.push('>');

    if is_void(element.name()) && !element.has_children() && !anchors.contains_key(path) {
        return;
    }

    write_children(out, element.children(), path, anchors);
    out.push_str("</");
    out.push_str(element.name());
    out.push('>');
}

fn open_marks(out: &mut String, marks: Marks) {
    for (mark, tag) in MARK_TAGS {
        if marks.contains(*mark) {
            out.push('<');
            out.push_str(tag);
            out.push('>');
        }
    }
}

fn close_marks(out: &mut String, marks: Marks) {
    for (mark, tag) in MARK_TAGS.iter().rev() {
        if marks.contains(*mark) {
            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::types::{Point, Text};

    fn point(path: Vec<usize>, offset: usize) -> Point {
        Point::new(Path::new(path), offset)
    }

    #[test]
    fn to_html_plain() {
        let editor = Editor::new()
            .add_child(Element::new("p").add_child(Text::new("a < b & c")))
            .add_child(Element::new("p").add_child(Element::new("br")));
        assert_eq!(
            to_html(&editor, &HtmlComments::default()),
            "<p>a &lt; b &amp; c</p><p><br></p>"
        );
    }

    #[test]
    fn to_html_attributes() {
        let editor = Editor::new()
            .add_child(
                Element::new("a")
                    .with_attribute("href", "/x?a=1&b=2")
                    .with_attribute("title", "say \"hi\"")
                    .add_child(Text::new("L")),
            )
            .add_child(Element::new("img").with_attribute("src", "/i.png"));
        assert_eq!(
            to_html(&editor, &HtmlComments::default()),
            r#"<a href="/x?a=1&amp;b=2" title="say &quot;hi&quot;">L</a><img src="/i.png">"#
        );
    }

    #[test]
    fn to_html_empty() {
        assert_eq!(to_html(&Editor::new(), &HtmlComments::default()), "");
    }

    #[test]
    fn to_html_marks() {
        let editor = Editor::new().add_child(
            Element::new("p")
                .add_child(Text::new("a"))
                .add_child(Text::with_marks("b", Marks::BOLD | Marks::ITALIC))
                .add_child(Text::with_marks("c", Marks::ITALIC)),
        );
        assert_eq!(
            to_html(&editor, &HtmlComments::default()),
            "<p>a<strong><em>b</em></strong><em>c</em></p>"
        );
    }

    #[test]
    fn to_html_comment_inside_marks() {
        let mut editor = Editor::new()
            .add_child(Element::new("p").add_child(Text::with_marks("Foo", Marks::BOLD)));
        let mut comments = HtmlComments::default();
        comments.create(&mut editor, point(vec![0], 1), "mid", None).unwrap();
        comments.create(&mut editor, point(vec![0], 3), "end", None).unwrap();
        assert_eq!(
            to_html(&editor, &comments),
            "<p><strong>F<!--mid-->oo</strong><!--end--></p>"
        );
    }

    #[test]
    fn to_html_comment_in_empty_element() {
        let mut editor = Editor::new().add_child(Element::new("p"));
        let mut comments = HtmlComments::default();
        comments.create(&mut editor, point(vec![0], 0), "x", None).unwrap();
        assert_eq!(to_html(&editor, &comments), "<p><!--x--></p>");
    }

    #[test]
    fn to_html_comments_at_text_edges() {
        let mut editor = Editor::new().add_child(
            Element::new("p")
                .add_child(Text::new("ab"))
                .add_child(Element::new("br"))
                .add_child(Text::new("c")),
        );
        let mut comments = HtmlComments::default();
        comments.create(&mut editor, point(vec![0], 0), "0", None).unwrap();
        comments.create(&mut editor, point(vec![0], 2), "2", None).unwrap();
        comments.create(&mut editor, point(vec![0], 3), "3", None).unwrap();
        comments.create(&mut editor, point(vec![0], 4), "4", None).unwrap();
        assert_eq!(
            to_html(&editor, &comments),
            "<p><!--0-->ab<!--2--><br><!--3-->c<!--4--></p>"
        );
    }
}
