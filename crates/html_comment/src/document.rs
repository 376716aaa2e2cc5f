use std::collections::BTreeMap;

use tracing::debug;

use crate::comments::{CommentData, HtmlComments};
use crate::config::CommentConfig;
use crate::error::{Error, Result};
use crate::markup;
use crate::types::{Descendant, Editor, Operation, Path, Point, Range};

/// One editing session: a document tree and the comments anchored in it.
#[derive(Debug, Clone, Default)]
pub struct Document {
    editor: Editor,
    comments: HtmlComments,
    last_change: Vec<Operation>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: CommentConfig) -> Self {
        Self {
            comments: HtmlComments::new(config),
            ..Self::default()
        }
    }

    pub fn from_html(html: &str, config: CommentConfig) -> Result<Self> {
        let mut document = Self::with_config(config);
        document.set_data(html)?;
        Ok(document)
    }

    pub fn editor(&self) -> &Editor {
        &self.editor
    }

    pub fn comments(&self) -> &HtmlComments {
        &self.comments
    }

    /// The operations of the last committed change.
    pub fn last_change(&self) -> &[Operation] {
        &self.last_change
    }

    /// Replace the content and the comments with those read from `html`.
    /// Ids used earlier in the session stay reserved.
    pub fn set_data(&mut self, html: &str) -> Result<()> {
        let parsed = markup::from_html(html)?;

        // Tokens sharing a point are created last to first so that the first
        // one ends up closest to the point again.
        let mut groups: BTreeMap<Point, Vec<String>> = BTreeMap::new();
        for (point, payload) in parsed.comments {
            groups.entry(point).or_default().push(payload);
        }

        let mut editor = Editor::from_children(parsed.children);
        let mut comments = self.comments.clone();
        comments.forget_all();
        for (point, payloads) in groups {
            for payload in payloads.into_iter().rev() {
                comments.create(&mut editor, point.clone(), payload, None)?;
            }
        }

        debug!(comments = comments.store().len(), "loaded document data");
        editor.take_operations();
        self.editor = editor;
        self.comments = comments;
        self.last_change.clear();
        Ok(())
    }

    pub fn get_data(&self) -> String {
        markup::to_html(&self.editor, &self.comments)
    }

    /// Run `f` as one atomic change. If it fails, the tree and the comments
    /// are left as they were before the change. Ids handed out during the
    /// failed change are not handed out again.
    pub fn change<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut Writer<'_>) -> Result<T>,
    {
        let editor = self.editor.clone();
        let comments = self.comments.clone();

        let result = f(&mut Writer {
            editor: &mut self.editor,
            comments: &mut self.comments,
        });

        match result {
            Ok(value) => {
                self.last_change = self.editor.take_operations();
                Ok(value)
            }
            Err(err) => {
                debug!(error = %err, "change rolled back");
                self.editor = editor;
                self.comments.restore(&comments);
                Err(err)
            }
        }
    }

    pub fn create_comment(
        &mut self,
        position: Point,
        content: impl Into<String>,
        id: Option<&str>,
    ) -> Result<String> {
        let content = content.into();
        self.change(|writer| writer.create_comment(position, content, id))
    }

    pub fn remove_comment(&mut self, id: &str) -> Result<()> {
        self.change(|writer| writer.remove_comment(id))
    }

    pub fn comment(&self, id: &str) -> Result<CommentData> {
        self.comments.comment(&self.editor, id)
    }

    pub fn comments_in_range(&self, range: &Range, skip_boundaries: bool) -> Vec<String> {
        self.comments
            .comments_in_range(&self.editor, range, skip_boundaries)
    }
}

/// Mutable access to a `Document` inside `Document::change`.
pub struct Writer<'a> {
    editor: &'a mut Editor,
    comments: &'a mut HtmlComments,
}

impl<'a> Writer<'a> {
    pub fn editor(&self) -> &Editor {
        self.editor
    }

    /// A position at `offset` inside the container at `path`.
    pub fn create_position(&self, path: Path, offset: usize) -> Result<Point> {
        let point = Point::new(path, offset);
        if self.editor.is_valid(&point) {
            Ok(point)
        } else {
            Err(Error::InvalidPosition(point))
        }
    }

    pub fn insert_text(&mut self, position: &Point, text: impl Into<String>) -> Result<()> {
        self.editor.apply(Operation::InsertText {
            path: position.path.clone(),
            offset: position.offset,
            text: text.into(),
        })
    }

    pub fn insert(&mut self, position: &Point, node: impl Into<Descendant>) -> Result<()> {
        self.editor.apply(Operation::InsertNode {
            path: position.path.clone(),
            offset: position.offset,
            node: node.into(),
        })
    }

    /// Remove the content of a range whose edges share one container.
    pub fn remove(&mut self, range: &Range) -> Result<()> {
        if !range.is_flat() {
            return Err(Error::InvalidOperation(
                "only ranges inside a single container can be removed".into(),
            ));
        }
        if range.is_collapsed() {
            return Ok(());
        }
        let (start, end) = (range.start(), range.end());
        let children = self
            .editor
            .container(&start.path)
            .ok_or_else(|| Error::InvalidPosition(start.clone()))?;
        if !self.editor.is_valid(end) {
            return Err(Error::InvalidPosition(end.clone()));
        }

        // Collect the spans first, then remove them back to front so the
        // offsets stay valid.
        let mut ops = vec![];
        let mut offset = 0;
        for child in children {
            let child_end = offset + child.size();
            let from = offset.max(start.offset);
            let to = child_end.min(end.offset);
            if from < to {
                ops.push(match child {
                    Descendant::Text(text) => Operation::RemoveText {
                        path: start.path.clone(),
                        offset: from,
                        text: text.slice(from - offset, to - offset).to_string(),
                    },
                    Descendant::Element(element) => Operation::RemoveNode {
                        path: start.path.clone(),
                        offset: from,
                        node: element.clone(),
                    },
                });
            }
            offset = child_end;
        }

        for op in ops.into_iter().rev() {
            self.editor.apply(op)?;
        }
        Ok(())
    }

    /// Split the element holding `position` at that position.
    pub fn split(&mut self, position: &Point) -> Result<()> {
        if position.path.is_root() {
            return Err(Error::InvalidOperation("the root cannot be split".into()));
        }
        self.editor.apply(Operation::SplitNode {
            path: position.path.clone(),
            position: position.offset,
        })
    }

    /// Merge the element at `element` into the element right before it.
    pub fn merge(&mut self, element: &Path) -> Result<()> {
        let previous = element
            .previous()
            .and_then(|path| self.editor.element(&path))
            .ok_or_else(|| {
                Error::InvalidOperation(format!(
                    "no element before {:?} to merge into",
                    element.as_slice()
                ))
            })?;
        let position = previous.size();
        self.editor.apply(Operation::MergeNode {
            path: element.clone(),
            position,
        })
    }

    pub fn rename(&mut self, element: &Path, new_name: impl Into<String>) -> Result<()> {
        let name = self
            .editor
            .element(element)
            .map(|e| e.name().to_string())
            .ok_or_else(|| {
                Error::InvalidOperation(format!("no element at {:?}", element.as_slice()))
            })?;
        self.editor.apply(Operation::SetNode {
            path: element.clone(),
            name,
            new_name: new_name.into(),
        })
    }

    pub fn create_comment(
        &mut self,
        position: Point,
        content: impl Into<String>,
        id: Option<&str>,
    ) -> Result<String> {
        self.comments.create(self.editor, position, content, id)
    }

    pub fn remove_comment(&mut self, id: &str) -> Result<()> {
        self.comments.remove(self.editor, id)
    }

    pub fn comment(&self, id: &str) -> Result<CommentData> {
        self.comments.comment(self.editor, id)
    }
}
