use std::collections::BTreeMap;

use tracing::trace;

use super::element::Element;
use super::location::Location;
use super::node::{self, Descendant};
use super::operation::Operation;
use super::path::{Affinity, Path};
use super::point::Point;
use super::text::Text;
use crate::error::{Error, Result};

/// The root of a document tree.
///
/// Besides the content it owns the named zero-width markers anchored in it.
/// Every operation applied to the editor moves the markers it affects before
/// `apply` returns, so a marker always resolves to a point inside the tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Editor {
    children: Vec<Descendant>,
    markers: BTreeMap<String, Point>,
    operations: Vec<Operation>,
}

impl Editor {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_children(mut children: Vec<Descendant>) -> Self {
        node::normalize(&mut children);
        Self {
            children,
            ..Self::default()
        }
    }

    pub fn add_child(mut self, child: impl Into<Descendant>) -> Self {
        self.children.push(child.into());
        node::normalize(&mut self.children);
        self
    }

    pub fn child(&self, i: usize) -> Option<&Descendant> {
        self.children.get(i)
    }

    pub fn children(&self) -> &[Descendant] {
        &self.children
    }

    pub fn has_children(&self) -> bool {
        !self.children.is_empty()
    }

    pub fn num_children(&self) -> usize {
        self.children.len()
    }

    /// The number of offset units in the root.
    pub fn size(&self) -> usize {
        node::size(&self.children)
    }

    /// The children of the container at `path`.
    pub fn container(&self, path: &Path) -> Option<&[Descendant]> {
        node::container(&self.children, path)
    }

    /// The element at `path`.
    pub fn element(&self, path: &Path) -> Option<&Element> {
        let (parent, offset) = path.split_last()?;
        let children = self.container(&parent)?;
        match Location::find(children, offset)? {
            Location::Boundary(i) => children.get(i)?.as_element(),
            Location::Within { .. } => None,
        }
    }

    /// Check that `point` resolves inside the tree.
    pub fn is_valid(&self, point: &Point) -> bool {
        self.container(&point.path)
            .map_or(false, |children| point.offset <= node::size(children))
    }

    pub fn marker(&self, name: &str) -> Option<&Point> {
        self.markers.get(name)
    }

    pub fn has_marker(&self, name: &str) -> bool {
        self.markers.contains_key(name)
    }

    pub fn markers(&self) -> impl Iterator<Item = (&str, &Point)> {
        self.markers.iter().map(|(name, point)| (name.as_str(), point))
    }

    /// Names of the markers currently resolving to exactly `point`.
    pub fn markers_at<'a>(&'a self, point: &'a Point) -> impl Iterator<Item = &'a str> + 'a {
        self.markers
            .iter()
            .filter(move |(_, p)| *p == point)
            .map(|(name, _)| name.as_str())
    }

    /// The operations applied since the log was last taken.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    pub(crate) fn take_operations(&mut self) -> Vec<Operation> {
        std::mem::take(&mut self.operations)
    }

    pub fn apply(&mut self, op: Operation) -> Result<()> {
        trace!(?op, "apply operation");

        match &op {
            Operation::InsertNode { path, offset, node } => {
                let children = self.container_at(path, *offset)?;
                insert(children, *offset, node.clone());
            }
            Operation::InsertText { path, offset, text } => {
                let children = self.container_at(path, *offset)?;
                let marks = node::marks_at(children, *offset);
                insert(children, *offset, Text::with_marks(text.as_str(), marks).into());
            }
            Operation::RemoveText { path, offset, text } => {
                let children = self.container_at(path, *offset)?;
                let len = text.chars().count();
                if node::text_between(children, *offset, len).as_deref() != Some(text.as_str()) {
                    return Err(Error::InvalidOperation(format!(
                        "no text {:?} at {}",
                        text,
                        Point::new(path.clone(), *offset)
                    )));
                }
                remove_span(children, *offset, len);
            }
            Operation::RemoveNode { path, offset, node } => {
                let children = self.container_at(path, *offset)?;
                match Location::find(children, *offset) {
                    Some(Location::Boundary(i))
                        if children.get(i).and_then(Descendant::as_element) == Some(node) =>
                    {
                        children.remove(i);
                        node::normalize(children);
                    }
                    _ => {
                        return Err(Error::InvalidOperation(format!(
                            "no <{}> element at {}",
                            node.name(),
                            Point::new(path.clone(), *offset)
                        )))
                    }
                }
            }
            Operation::SplitNode { path, position } => {
                let (parent, offset) = split_element_path(path)?;
                let tail = {
                    let element = self.element_mut(path)?;
                    let index = node::split_at(&mut element.children, *position)
                        .ok_or_else(|| Error::InvalidPosition(Point::new(path.clone(), *position)))?;
                    element.split_off(index)
                };
                let children = self.container_at(&parent, offset)?;
                insert(children, offset + 1, tail.into());
            }
            Operation::MergeNode { path, position } => {
                let (parent, offset) = split_element_path(path)?;
                let children = self.container_at(&parent, offset)?;
                let index = match Location::find(children, offset) {
                    Some(Location::Boundary(i)) if i > 0 && i < children.len() => i,
                    _ => return Err(no_merge(path)),
                };
                let mergeable = matches!(
                    (&children[index - 1], &children[index]),
                    (Descendant::Element(prev), Descendant::Element(_)) if prev.size() == *position
                );
                if !mergeable {
                    return Err(no_merge(path));
                }
                let merged = children.remove(index);
                if let (Descendant::Element(prev), Descendant::Element(merged)) =
                    (&mut children[index - 1], merged)
                {
                    prev.children.extend(merged.children);
                    node::normalize(&mut prev.children);
                }
            }
            Operation::SetNode {
                path,
                name,
                new_name,
            } => {
                let element = self.element_mut(path)?;
                if element.name() != name.as_str() {
                    return Err(Error::InvalidOperation(format!(
                        "element at {:?} is <{}>, not <{}>",
                        path.as_slice(),
                        element.name(),
                        name
                    )));
                }
                element.rename(new_name.as_str());
            }
            Operation::SetMarker { name, old, new } => {
                if self.markers.get(name) != old.as_ref() {
                    return Err(Error::InvalidOperation(format!(
                        "marker {:?} is not at {:?}",
                        name, old
                    )));
                }
                match new {
                    Some(point) if !self.is_valid(point) => {
                        return Err(Error::InvalidPosition(point.clone()))
                    }
                    Some(point) => {
                        self.markers.insert(name.clone(), point.clone());
                    }
                    None => {
                        self.markers.remove(name);
                    }
                }
            }
        }

        if !op.is_marker_operation() {
            for point in self.markers.values_mut() {
                *point = Point::transform(point, &op, Affinity::default());
            }
        }

        self.operations.push(op);
        Ok(())
    }

    fn container_at(&mut self, path: &Path, offset: usize) -> Result<&mut Vec<Descendant>> {
        let invalid = || Error::InvalidPosition(Point::new(path.clone(), offset));
        let children = node::container_mut(&mut self.children, path).ok_or_else(invalid)?;
        if offset > node::size(children) {
            return Err(invalid());
        }
        Ok(children)
    }

    fn element_mut(&mut self, path: &Path) -> Result<&mut Element> {
        let missing = || Error::InvalidOperation(format!("no element at {:?}", path.as_slice()));
        let (parent, offset) = path.split_last().ok_or_else(missing)?;
        let children = node::container_mut(&mut self.children, &parent).ok_or_else(missing)?;
        let index = match Location::find(children, offset) {
            Some(Location::Boundary(i)) => i,
            _ => return Err(missing()),
        };
        match children.get_mut(index) {
            Some(Descendant::Element(e)) => Ok(e),
            _ => Err(missing()),
        }
    }
}

fn split_element_path(path: &Path) -> Result<(Path, usize)> {
    path.split_last()
        .ok_or_else(|| Error::InvalidOperation("the root is not an element".into()))
}

fn no_merge(path: &Path) -> Error {
    Error::InvalidOperation(format!(
        "no element pair to merge at {:?}",
        path.as_slice()
    ))
}

// Callers check that `offset` is inside the children.
fn insert(children: &mut Vec<Descendant>, offset: usize, node: Descendant) {
    if let Some(i) = node::split_at(children, offset) {
        children.insert(i, node);
        node::normalize(children);
    }
}

fn remove_span(children: &mut Vec<Descendant>, offset: usize, len: usize) {
    if let (Some(start), Some(end)) = (
        node::split_at(children, offset),
        node::split_at(children, offset + len),
    ) {
        children.drain(start..end);
    }
    node::normalize(children);
}
