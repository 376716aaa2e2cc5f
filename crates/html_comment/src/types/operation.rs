use super::element::Element;
use super::node::Descendant;
use super::path::Path;
use super::point::Point;

/// A single change to an `Editor`. Content operations address a container by
/// `path` and a position inside it by `offset`; `SplitNode`, `MergeNode` and
/// `SetNode` address an element by its own path.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    InsertNode {
        path: Path,
        offset: usize,
        node: Descendant,
    },
    InsertText {
        path: Path,
        offset: usize,
        text: String,
    },
    /// Merge the element at `path` into its previous sibling, whose size is
    /// `position`.
    MergeNode {
        path: Path,
        position: usize,
    },
    RemoveNode {
        path: Path,
        offset: usize,
        node: Element,
    },
    RemoveText {
        path: Path,
        offset: usize,
        text: String,
    },
    /// Add (`old` is `None`), move, or remove (`new` is `None`) a marker.
    SetMarker {
        name: String,
        old: Option<Point>,
        new: Option<Point>,
    },
    SetNode {
        path: Path,
        name: String,
        new_name: String,
    },
    /// Split the element at `path`; everything from `position` on moves into
    /// a new sibling with the same name.
    SplitNode {
        path: Path,
        position: usize,
    },
}

impl Operation {
    pub fn is_marker_operation(&self) -> bool {
        matches!(self, Operation::SetMarker { .. })
    }
}
