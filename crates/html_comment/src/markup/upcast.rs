use quick_xml::escape::resolve_html5_entity;
use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

use super::{is_void, mark_of};
use crate::error::{Error, Result};
use crate::types::{self, Descendant, Element, Marks, Path, Point, Text};

/// The tree read from markup and the comment tokens found in it, in document
/// order.
#[derive(Debug, Clone, PartialEq)]
pub struct Parsed {
    pub children: Vec<Descendant>,
    pub comments: Vec<(Point, String)>,
}

struct Frame {
    element: Element,
    size: usize,
    /// Depth of the mark stack when the element opened.
    marks: usize,
}

impl Frame {
    fn new(element: Element, marks: usize) -> Self {
        Self {
            element,
            size: 0,
            marks,
        }
    }

    fn push(&mut self, node: Descendant) {
        self.size += node.size();
        self.element.children.push(node);
    }
}

/// Read HTML into a tree, turning every `<!--payload-->` token into a comment
/// request at the offset where it was found.
pub fn from_html(html: &str) -> Result<Parsed> {
    let mut reader = Reader::from_str(html);
    reader.config_mut().check_end_names = false;
    reader.config_mut().allow_unmatched_ends = true;

    let mut stack = vec![Frame::new(Element::new(""), 0)];
    let mut marks: Vec<(String, Marks)> = vec![];
    let mut comments = vec![];

    loop {
        let event = reader.read_event().map_err(|err| {
            Error::Markup(format!("{} at byte {}", err, reader.buffer_position()))
        })?;

        match event {
            Event::Start(tag) => {
                let name = tag_name(tag.name().as_ref());
                if let Some(mark) = mark_of(&name) {
                    marks.push((name, mark));
                } else if is_void(&name) {
                    let element = element_of(&tag, name)?;
                    top(&mut stack).push(element.into());
                } else {
                    let element = element_of(&tag, name)?;
                    stack.push(Frame::new(element, marks.len()));
                }
            }
            Event::Empty(tag) => {
                let name = tag_name(tag.name().as_ref());
                if mark_of(&name).is_none() {
                    let element = element_of(&tag, name)?;
                    top(&mut stack).push(element.into());
                }
            }
            Event::End(tag) => {
                let name = tag_name(tag.name().as_ref());
                if mark_of(&name).is_some() {
                    let opened = top(&mut stack).marks;
                    if let Some(i) = marks.iter().rposition(|(open, _)| *open == name) {
                        if i >= opened {
                            marks.truncate(i);
                        }
                    }
                } else if let Some(i) = stack
                    .iter()
                    .rposition(|frame| frame.element.name() == name)
                {
                    if i > 0 {
                        close(&mut stack, &mut marks, i);
                    }
                }
            }
            Event::Text(text) => {
                let text = text
                    .unescape_with(resolve_html5_entity)
                    .map_err(|err| Error::Markup(err.to_string()))?;
                push_text(&mut stack, &text, &marks);
            }
            Event::CData(data) => {
                let data = data.into_inner();
                push_text(&mut stack, &String::from_utf8_lossy(&data), &marks);
            }
            Event::Comment(comment) => {
                let position = Point::new(current_path(&stack), top(&mut stack).size);
                comments.push((position, String::from_utf8_lossy(&comment).into_owned()));
            }
            Event::Eof => break,
            _ => {}
        }
    }

    close(&mut stack, &mut marks, 1);
    let mut children = stack
        .pop()
        .map(|root| root.element.children)
        .unwrap_or_default();
    types::normalize(&mut children);

    debug!(
        nodes = children.len(),
        comments = comments.len(),
        "parsed html"
    );
    Ok(Parsed { children, comments })
}

fn tag_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).to_ascii_lowercase()
}

/// An element named `name` carrying the attributes of `tag`.
fn element_of(tag: &BytesStart<'_>, name: String) -> Result<Element> {
    let mut element = Element::new(name);
    for attr in tag.html_attributes() {
        let attr = attr.map_err(|err| Error::Markup(err.to_string()))?;
        let value = attr
            .unescape_value_with(resolve_html5_entity)
            .map_err(|err| Error::Markup(err.to_string()))?;
        element = element.with_attribute(tag_name(attr.key.as_ref()), value);
    }
    Ok(element)
}

// The root frame is never popped while reading.
fn top(stack: &mut Vec<Frame>) -> &mut Frame {
    let last = stack.len() - 1;
    &mut stack[last]
}

/// Offsets of the open elements, i.e. the path of the container being read.
fn current_path(stack: &[Frame]) -> Path {
    Path::new(
        stack
            .windows(2)
            .map(|pair| pair[0].size)
            .collect(),
    )
}

fn push_text(stack: &mut Vec<Frame>, text: &str, marks: &[(String, Marks)]) {
    if text.is_empty() {
        return;
    }
    let marks = marks
        .iter()
        .fold(Marks::empty(), |acc, (_, mark)| acc | *mark);
    top(stack).push(Text::with_marks(text, marks).into());
}

/// Close every open element above `depth` into its parent, together with the
/// marks opened inside it.
fn close(stack: &mut Vec<Frame>, marks: &mut Vec<(String, Marks)>, depth: usize) {
    while stack.len() > depth {
        if let Some(frame) = stack.pop() {
            marks.truncate(frame.marks);
            let mut element = frame.element;
            types::normalize(&mut element.children);
            top(stack).push(element.into());
        }
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn paragraph(text: &str) -> Descendant {
        Element::new("p").add_child(Text::new(text)).into()
    }

    #[test]
    fn from_html_paragraphs() {
        let parsed = from_html("<p>Foo</p><p>Bar</p>").unwrap();
        assert_eq!(parsed.children, vec![paragraph("Foo"), paragraph("Bar")]);
        assert!(parsed.comments.is_empty());
    }

    #[test]
    fn from_html_comment_inside_text() {
        let parsed = from_html("<p>F<!--foo-->oo</p>").unwrap();
        assert_eq!(parsed.children, vec![paragraph("Foo")]);
        assert_eq!(
            parsed.comments,
            vec![(Point::new(Path::new(vec![0]), 1), "foo".to_string())]
        );
    }

    #[test]
    fn from_html_comments_between_elements() {
        let parsed = from_html("<!--a--><p>Foo</p><!--b--><!--c--><p>Bar</p><!--d-->").unwrap();
        let at = |offset| Point::new(Path::root(), offset);
        assert_eq!(
            parsed.comments,
            vec![
                (at(0), "a".to_string()),
                (at(1), "b".to_string()),
                (at(1), "c".to_string()),
                (at(2), "d".to_string()),
            ]
        );
    }

    #[test]
    fn from_html_nested_path() {
        let parsed = from_html("<p>x</p><ul><li>a</li><li>b<!--c--></li></ul>").unwrap();
        assert_eq!(
            parsed.comments,
            vec![(Point::new(Path::new(vec![1, 1]), 1), "c".to_string())]
        );
    }

    #[test]
    fn from_html_marks() {
        let parsed = from_html("<p>a<b>b<i>c</i></b><em>d</em></p>").unwrap();
        let want: Descendant = Element::new("p")
            .add_child(Text::new("a"))
            .add_child(Text::with_marks("b", Marks::BOLD))
            .add_child(Text::with_marks("c", Marks::BOLD | Marks::ITALIC))
            .add_child(Text::with_marks("d", Marks::ITALIC))
            .into();
        assert_eq!(parsed.children, vec![want]);
    }

    #[test]
    fn from_html_void_and_entities() {
        let parsed = from_html("<P>a &amp; b<br>c<hr/></P>").unwrap();
        let want: Descendant = Element::new("p")
            .add_child(Text::new("a & b"))
            .add_child(Element::new("br"))
            .add_child(Text::new("c"))
            .add_child(Element::new("hr"))
            .into();
        assert_eq!(parsed.children, vec![want]);
    }

    #[test]
    fn from_html_html_entities() {
        let parsed = from_html("<p>a&nbsp;b &copy; &lt;c&gt;</p>").unwrap();
        assert_eq!(parsed.children, vec![paragraph("a\u{a0}b \u{a9} <c>")]);
    }

    #[test]
    fn from_html_attributes() {
        let parsed =
            from_html(r#"<p class="lead" data-x='a &amp; b'>F</p><input disabled><img src="/i.png"/>"#)
                .unwrap();
        let want: Vec<Descendant> = vec![
            Element::new("p")
                .with_attribute("class", "lead")
                .with_attribute("data-x", "a & b")
                .add_child(Text::new("F"))
                .into(),
            Element::new("input").with_attribute("disabled", "").into(),
            Element::new("img").with_attribute("src", "/i.png").into(),
        ];
        assert_eq!(parsed.children, want);
    }

    #[test]
    fn from_html_unclosed_mark_stays_in_its_element() {
        let parsed = from_html("<p><b>a</p><p>b</p>").unwrap();
        let want: Vec<Descendant> = vec![
            Element::new("p")
                .add_child(Text::with_marks("a", Marks::BOLD))
                .into(),
            paragraph("b"),
        ];
        assert_eq!(parsed.children, want);
    }

    #[test]
    fn from_html_unclosed_elements() {
        let parsed = from_html("<div><p>Foo").unwrap();
        let want: Descendant = Element::new("div").add_child(paragraph("Foo")).into();
        assert_eq!(parsed.children, vec![want]);
    }

    #[test]
    fn from_html_stray_end_tag() {
        let parsed = from_html("<p>Foo</span></p>").unwrap();
        assert_eq!(parsed.children, vec![paragraph("Foo")]);
    }

    #[test]
    fn from_html_unterminated_comment() {
        assert!(matches!(
            from_html("<p>Foo<!--bar</p>"),
            Err(Error::Markup(_))
        ));
    }
}
