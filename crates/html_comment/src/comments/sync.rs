use std::cmp::Reverse;
use std::collections::BTreeMap;

use serde::Serialize;
use tracing::debug;

use super::store::CommentStore;
use crate::config::CommentConfig;
use crate::error::{Error, Result};
use crate::markup;
use crate::types::{Editor, Operation, Point, Range};

/// The content of a comment and the point it currently resolves to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentData {
    pub content: String,
    pub position: Point,
}

/// Keeps comments anchored in an `Editor`.
///
/// Each comment is a zero-width marker named by the comment id, so the tree
/// moves it along with every edit. When several comments share one point the
/// most recently created one comes first.
#[derive(Debug, Clone, Default)]
pub struct HtmlComments {
    store: CommentStore,
}

impl HtmlComments {
    pub fn new(config: CommentConfig) -> Self {
        Self {
            store: CommentStore::new(config),
        }
    }

    pub fn store(&self) -> &CommentStore {
        &self.store
    }

    /// Create a comment at `position` and return its id.
    pub fn create(
        &mut self,
        editor: &mut Editor,
        position: Point,
        content: impl Into<String>,
        id: Option<&str>,
    ) -> Result<String> {
        // Void elements have no room for a comment token in markup.
        let in_void = editor
            .element(&position.path)
            .map_or(false, |element| markup::is_void(element.name()));
        if in_void || !editor.is_valid(&position) {
            return Err(Error::InvalidPosition(position));
        }
        if let Some(id) = id {
            if editor.has_marker(id) {
                return Err(Error::DuplicateId(id.to_string()));
            }
        }

        let id = self.store.register(id, content)?;
        let op = Operation::SetMarker {
            name: id.clone(),
            old: None,
            new: Some(position.clone()),
        };
        if let Err(err) = editor.apply(op) {
            self.store.unregister(&id)?;
            return Err(err);
        }

        debug!(%id, %position, "created html comment");
        Ok(id)
    }

    pub fn remove(&mut self, editor: &mut Editor, id: &str) -> Result<()> {
        self.store.get(id)?;

        let old = editor.marker(id).cloned();
        if old.is_some() {
            editor.apply(Operation::SetMarker {
                name: id.to_string(),
                old,
                new: None,
            })?;
        }
        self.store.unregister(id)?;

        debug!(%id, "removed html comment");
        Ok(())
    }

    /// Ids of the comments at exactly `position`, most recently created first.
    pub fn resolve_order_at(&self, editor: &Editor, position: &Point) -> Vec<String> {
        let mut ids: Vec<(u64, &str)> = editor
            .markers_at(position)
            .filter_map(|id| Some((self.store.sequence_of(id).ok()?, id)))
            .collect();
        ids.sort_by_key(|(sequence, _)| Reverse(*sequence));
        ids.into_iter().map(|(_, id)| id.to_string()).collect()
    }

    pub fn comment(&self, editor: &Editor, id: &str) -> Result<CommentData> {
        let content = self.store.get(id)?;
        let position = editor
            .marker(id)
            .ok_or_else(|| Error::UnknownId(id.to_string()))?;

        Ok(CommentData {
            content: content.to_string(),
            position: position.clone(),
        })
    }

    /// Ids of the comments inside `range`, in document order. With
    /// `skip_boundaries` the comments sitting on the range edges are left out.
    pub fn comments_in_range(
        &self,
        editor: &Editor,
        range: &Range,
        skip_boundaries: bool,
    ) -> Vec<String> {
        let (start, end) = range.edges(false);

        self.anchors(editor)
            .into_iter()
            .filter(|(point, _)| range.includes_point(point))
            .filter(|(point, _)| !skip_boundaries || (point != start && point != end))
            .flat_map(|(_, ids)| ids)
            .collect()
    }

    /// Every live comment grouped by the point it resolves to, in document
    /// order, each group in serialization order.
    pub fn anchors(&self, editor: &Editor) -> BTreeMap<Point, Vec<String>> {
        let mut groups: BTreeMap<Point, Vec<(u64, String)>> = BTreeMap::new();

        for (id, point) in editor.markers() {
            if let Ok(sequence) = self.store.sequence_of(id) {
                groups
                    .entry(point.clone())
                    .or_default()
                    .push((sequence, id.to_string()));
            }
        }

        groups
            .into_iter()
            .map(|(point, mut ids)| {
                ids.sort_by_key(|(sequence, _)| Reverse(*sequence));
                (point, ids.into_iter().map(|(_, id)| id).collect())
            })
            .collect()
    }

    /// Go back to the comments of `snapshot`, which must match the markers of
    /// the editor being restored alongside.
    pub(crate) fn restore(&mut self, snapshot: &HtmlComments) {
        self.store.restore_entries(&snapshot.store);
    }

    /// Drop every comment without touching the editor, for when the editor
    /// holding the markers is being replaced.
    pub(crate) fn forget_all(&mut self) {
        self.store.clear();
    }

    /// Remove every comment.
    pub fn clear(&mut self, editor: &mut Editor) -> Result<()> {
        let ids: Vec<String> = self.store.ids().map(String::from).collect();
        for id in ids {
            self.remove(editor, &id)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::types::{Element, Path, Text};

    fn editor() -> Editor {
        Editor::new()
            .add_child(Element::new("p").add_child(Text::new("Foo")))
            .add_child(Element::new("p").add_child(Text::new("Bar")))
    }

    fn point(path: Vec<usize>, offset: usize) -> Point {
        Point::new(Path::new(path), offset)
    }

    #[test]
    fn create_returns_explicit_id() {
        let mut editor = editor();
        let mut comments = HtmlComments::default();
        let id = comments
            .create(&mut editor, point(vec![], 1), "foo", Some("comment-id-1"))
            .unwrap();
        assert_eq!(id, "comment-id-1");
        assert_eq!(editor.marker(&id), Some(&point(vec![], 1)));
    }

    #[test]
    fn create_invalid_position() {
        let mut editor = editor();
        let mut comments = HtmlComments::default();
        let result = comments.create(&mut editor, point(vec![5], 0), "foo", None);
        assert!(matches!(result, Err(Error::InvalidPosition(_))));
        assert!(comments.store().is_empty());
        assert_eq!(editor.markers().count(), 0);
    }

    #[test]
    fn create_inside_void_element() {
        let mut editor = Editor::new().add_child(
            Element::new("p")
                .add_child(Text::new("a"))
                .add_child(Element::new("br")),
        );
        let mut comments = HtmlComments::default();
        let result = comments.create(&mut editor, point(vec![0, 1], 0), "x", None);
        assert!(matches!(result, Err(Error::InvalidPosition(_))));
        assert!(comments.store().is_empty());
        comments
            .create(&mut editor, point(vec![0], 2), "x", None)
            .unwrap();
    }

    #[test]
    fn create_duplicate_id() {
        let mut editor = editor();
        let mut comments = HtmlComments::default();
        comments
            .create(&mut editor, point(vec![], 1), "foo", Some("a"))
            .unwrap();
        let result = comments.create(&mut editor, point(vec![], 2), "bar", Some("a"));
        assert!(matches!(result, Err(Error::DuplicateId(_))));
        assert_eq!(comments.comment(&editor, "a").unwrap().content, "foo");
    }

    #[test]
    fn create_id_of_foreign_marker() {
        let mut editor = editor();
        editor
            .apply(Operation::SetMarker {
                name: "search".into(),
                old: None,
                new: Some(point(vec![0], 0)),
            })
            .unwrap();
        let mut comments = HtmlComments::default();
        let result = comments.create(&mut editor, point(vec![], 1), "foo", Some("search"));
        assert!(matches!(result, Err(Error::DuplicateId(_))));
        assert!(comments.store().is_empty());
    }

    #[test]
    fn resolve_order_at_latest_first() {
        let mut editor = editor();
        let mut comments = HtmlComments::default();
        let at = point(vec![0], 1);
        let first = comments.create(&mut editor, at.clone(), "foo", None).unwrap();
        let second = comments.create(&mut editor, at.clone(), "bar", None).unwrap();
        comments
            .create(&mut editor, point(vec![0], 2), "baz", None)
            .unwrap();
        assert_eq!(comments.resolve_order_at(&editor, &at), vec![second, first]);
    }

    #[test]
    fn resolve_order_ignores_foreign_markers() {
        let mut editor = editor();
        let at = point(vec![0], 1);
        editor
            .apply(Operation::SetMarker {
                name: "search".into(),
                old: None,
                new: Some(at.clone()),
            })
            .unwrap();
        let comments = HtmlComments::default();
        assert!(comments.resolve_order_at(&editor, &at).is_empty());
    }

    #[test]
    fn remove_leaves_others() {
        let mut editor = editor();
        let mut comments = HtmlComments::default();
        let a = comments.create(&mut editor, point(vec![0], 1), "a", None).unwrap();
        let b = comments.create(&mut editor, point(vec![1], 2), "b", None).unwrap();
        comments.remove(&mut editor, &a).unwrap();
        assert!(editor.marker(&a).is_none());
        assert_eq!(
            comments.comment(&editor, &b).unwrap(),
            CommentData {
                content: "b".into(),
                position: point(vec![1], 2),
            }
        );
    }

    #[test]
    fn comment_data_to_json() {
        let mut editor = editor();
        let mut comments = HtmlComments::default();
        comments
            .create(&mut editor, point(vec![1], 2), "note", Some("a"))
            .unwrap();
        let data = comments.comment(&editor, "a").unwrap();
        assert_eq!(
            serde_json::to_value(&data).unwrap(),
            serde_json::json!({
                "content": "note",
                "position": { "path": [1], "offset": 2 },
            })
        );
    }

    #[test]
    fn remove_unknown_id() {
        let mut editor = editor();
        let mut comments = HtmlComments::default();
        comments.create(&mut editor, point(vec![0], 1), "a", None).unwrap();
        let before = editor.clone();
        let result = comments.remove(&mut editor, "nonexistent");
        assert!(matches!(result, Err(Error::UnknownId(_))));
        assert_eq!(editor, before);
        assert_eq!(comments.store().len(), 1);
    }

    #[test]
    fn comment_follows_edits() {
        let mut editor = editor();
        let mut comments = HtmlComments::default();
        let id = comments.create(&mut editor, point(vec![1], 1), "a", None).unwrap();
        editor
            .apply(Operation::InsertNode {
                path: Path::root(),
                offset: 0,
                node: Element::new("hr").into(),
            })
            .unwrap();
        assert_eq!(comments.comment(&editor, &id).unwrap().position, point(vec![2], 1));
    }

    #[test]
    fn comments_in_range_boundaries() {
        let mut editor = editor();
        let mut comments = HtmlComments::default();
        let start = comments.create(&mut editor, point(vec![], 0), "s", None).unwrap();
        let inner = comments.create(&mut editor, point(vec![0], 2), "i", None).unwrap();
        let end = comments.create(&mut editor, point(vec![], 1), "e", None).unwrap();
        comments.create(&mut editor, point(vec![1], 0), "out", None).unwrap();

        let range = Range::new(point(vec![], 0), point(vec![], 1));
        assert_eq!(
            comments.comments_in_range(&editor, &range, false),
            vec![start, inner.clone(), end]
        );
        assert_eq!(comments.comments_in_range(&editor, &range, true), vec![inner]);
    }

    #[test]
    fn clear_removes_everything() {
        let mut editor = editor();
        let mut comments = HtmlComments::default();
        comments.create(&mut editor, point(vec![0], 1), "a", None).unwrap();
        comments.create(&mut editor, point(vec![1], 1), "b", None).unwrap();
        comments.clear(&mut editor).unwrap();
        assert!(comments.store().is_empty());
        assert_eq!(editor.markers().count(), 0);
    }
}
