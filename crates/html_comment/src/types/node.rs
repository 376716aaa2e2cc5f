use std::mem;

use super::{element::Element, location::Location, path::Path, text::Marks, text::Text};

#[derive(Debug, Clone, PartialEq)]
pub enum Descendant {
    Text(Text),
    Element(Element),
}

impl Descendant {
    /// The number of offset units this node occupies in its parent.
    pub fn size(&self) -> usize {
        match self {
            Descendant::Text(t) => t.len(),
            Descendant::Element(_) => 1,
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Descendant::Element(e) => Some(e),
            Descendant::Text(_) => None,
        }
    }
}

/// The number of offset units taken by a list of children.
pub fn size(children: &[Descendant]) -> usize {
    children.iter().map(Descendant::size).sum()
}

/// Get the children of the container at `path`, where every path entry is the
/// offset of an element inside the previous container.
pub fn container<'a>(children: &'a [Descendant], path: &Path) -> Option<&'a [Descendant]> {
    let mut children = children;

    for &offset in path.as_slice() {
        children = match Location::find(children, offset)? {
            Location::Boundary(i) => match children.get(i)? {
                Descendant::Element(e) => &e.children,
                Descendant::Text(_) => return None,
            },
            Location::Within { .. } => return None,
        };
    }

    Some(children)
}

pub fn container_mut<'a>(
    children: &'a mut Vec<Descendant>,
    path: &Path,
) -> Option<&'a mut Vec<Descendant>> {
    let mut children = children;

    for &offset in path.as_slice() {
        let index = match Location::find(children, offset)? {
            Location::Boundary(i) => i,
            Location::Within { .. } => return None,
        };
        children = match children.get_mut(index)? {
            Descendant::Element(e) => &mut e.children,
            Descendant::Text(_) => return None,
        };
    }

    Some(children)
}

/// Make `offset` fall on a child boundary, splitting a text child when needed,
/// and return the index of the child that now starts there.
pub fn split_at(children: &mut Vec<Descendant>, offset: usize) -> Option<usize> {
    match Location::find(children, offset)? {
        Location::Boundary(i) => Some(i),
        Location::Within { index, offset } => {
            let text = match mem::replace(&mut children[index], Descendant::Text(Text::new(""))) {
                Descendant::Text(t) => t,
                element => {
                    children[index] = element;
                    return None;
                }
            };
            let (head, tail) = text.split(offset);
            children[index] = head.into();
            children.insert(index + 1, tail.into());
            Some(index + 1)
        }
    }
}

/// Drop empty text nodes and merge adjacent text nodes with the same marks.
/// Offsets are unaffected.
pub fn normalize(children: &mut Vec<Descendant>) {
    let mut out: Vec<Descendant> = Vec::with_capacity(children.len());

    for child in children.drain(..) {
        if let Descendant::Text(t) = &child {
            if t.is_empty() {
                continue;
            }
            if let Some(Descendant::Text(prev)) = out.last_mut() {
                if Text::matches(prev, t) {
                    prev.push_str(t.as_str());
                    continue;
                }
            }
        }
        out.push(child);
    }

    *children = out;
}

/// The text between `offset` and `offset + len`, or `None` when the span leaves
/// the children or covers an element.
pub fn text_between(children: &[Descendant], offset: usize, len: usize) -> Option<String> {
    let end = offset + len;
    if end > size(children) {
        return None;
    }

    let mut out = String::new();
    let mut start = 0;

    for child in children {
        let child_end = start + child.size();
        if child_end > offset && start < end {
            match child {
                Descendant::Text(t) => {
                    let from = offset.max(start) - start;
                    let to = end.min(child_end) - start;
                    out.push_str(t.slice(from, to));
                }
                Descendant::Element(_) => return None,
            }
        }
        start = child_end;
    }

    Some(out)
}

/// The marks typed text picks up at `offset`: those of the text it lands in,
/// or else of the text right before it.
pub fn marks_at(children: &[Descendant], offset: usize) -> Marks {
    let index = match Location::find(children, offset) {
        Some(Location::Within { index, .. }) => Some(index),
        Some(Location::Boundary(i)) => i.checked_sub(1),
        None => None,
    };

    match index.and_then(|i| children.get(i)) {
        Some(Descendant::Text(t)) => t.marks(),
        _ => Marks::empty(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn paragraph() -> Vec<Descendant> {
        vec![Element::new("p")
            .add_child(Text::new("Foo"))
            .add_child(Text::with_marks("Bar", Marks::BOLD))
            .into()]
    }

    #[test]
    fn size_counts_units() {
        let children = paragraph();
        assert_eq!(size(&children), 1);
        assert_eq!(size(container(&children, &Path::new(vec![0])).unwrap()), 6);
    }

    #[test]
    fn container_root() {
        let children = paragraph();
        assert_eq!(container(&children, &Path::root()).unwrap(), &children[..]);
    }

    #[test]
    fn container_missing() {
        let children = paragraph();
        assert!(container(&children, &Path::new(vec![1])).is_none());
        assert!(container(&children, &Path::new(vec![0, 1])).is_none());
    }

    #[test]
    fn split_at_text() {
        let mut children: Vec<Descendant> = vec![Text::new("Foo").into()];
        assert_eq!(split_at(&mut children, 1), Some(1));
        let want: Vec<Descendant> = vec![Text::new("F").into(), Text::new("oo").into()];
        assert_eq!(children, want);
    }

    #[test]
    fn split_at_boundary() {
        let mut children: Vec<Descendant> = vec![Text::new("Foo").into()];
        assert_eq!(split_at(&mut children, 3), Some(1));
        assert_eq!(children.len(), 1);
        assert_eq!(split_at(&mut children, 4), None);
    }

    #[test]
    fn normalize_merges_texts() {
        let mut children: Vec<Descendant> = vec![
            Text::new("F").into(),
            Text::new("").into(),
            Text::new("oo").into(),
            Text::with_marks("Bar", Marks::BOLD).into(),
        ];
        normalize(&mut children);
        let want: Vec<Descendant> = vec![
            Text::new("Foo").into(),
            Text::with_marks("Bar", Marks::BOLD).into(),
        ];
        assert_eq!(children, want);
    }

    #[test]
    fn text_between_spans_texts() {
        let children = paragraph();
        let inner = container(&children, &Path::new(vec![0])).unwrap();
        assert_eq!(text_between(inner, 2, 2), Some("oB".to_string()));
        assert_eq!(text_between(inner, 5, 2), None);
        assert_eq!(text_between(&children, 0, 1), None);
    }

    #[test]
    fn marks_at_offsets() {
        let children = paragraph();
        let inner = container(&children, &Path::new(vec![0])).unwrap();
        assert_eq!(marks_at(inner, 0), Marks::empty());
        assert_eq!(marks_at(inner, 3), Marks::empty());
        assert_eq!(marks_at(inner, 4), Marks::BOLD);
        assert_eq!(marks_at(inner, 6), Marks::BOLD);
    }
}
