use serde::{Deserialize, Serialize};

use super::operation::Operation;

/// Which way a position moves when content is inserted exactly at it, or when
/// the element holding it is split exactly at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Affinity {
    Forward,
    Backward,
}

impl Default for Affinity {
    fn default() -> Self {
        Affinity::Forward
    }
}

/// The offsets of the element ancestors of a container, from the root down.
/// The empty path is the root itself.
#[derive(Debug, Default, PartialEq, Eq, PartialOrd, Ord, Clone, Hash, Serialize, Deserialize)]
pub struct Path(Vec<usize>);

impl Path {
    pub fn concat(&self, i: usize) -> Self {
        let mut copy = self.clone();
        copy.0.push(i);
        copy
    }
}

impl Path {
    pub fn new(inner: Vec<usize>) -> Self {
        Self(inner)
    }

    pub fn root() -> Self {
        Self(vec![])
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_root(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[usize] {
        &self.0
    }

    pub fn is_ancestor(&self, other: &Path) -> bool {
        self.0.len() < other.0.len() && other.0.starts_with(&self.0)
    }

    pub fn previous(&self) -> Option<Path> {
        let (parent, last) = self.split_last()?;
        Some(parent.concat(last.checked_sub(1)?))
    }

    /// Split an element path into the path of the container holding the
    /// element and the element's offset inside it.
    pub fn split_last(&self) -> Option<(Path, usize)> {
        let (last, parent) = self.0.split_last()?;
        Some((Path(parent.into()), *last))
    }

    /// Transform a full position path (container offsets followed by the
    /// offset inside the innermost container) through an operation.
    ///
    /// Positions are never invalidated: a position inside removed content
    /// collapses onto the boundary where that content used to start.
    pub fn transform(path: &Path, operation: &Operation, affinity: Affinity) -> Path {
        let mut path = path.clone();

        // PERF: Exit early if the operation is guaranteed not to have an effect.
        if path.0.is_empty() {
            return path;
        }

        match operation {
            Operation::InsertText { path: op, offset, text } => {
                path.shift_for_insert(op, *offset, text.chars().count(), affinity);
            }
            Operation::InsertNode {
                path: op,
                offset,
                node,
            } => {
                path.shift_for_insert(op, *offset, node.size(), affinity);
            }
            Operation::RemoveText { path: op, offset, text } => {
                path.shift_for_remove(op, *offset, text.chars().count());
            }
            Operation::RemoveNode { path: op, offset, .. } => {
                path.shift_for_remove(op, *offset, 1);
            }
            Operation::SplitNode { path: op, position } => {
                let (parent, j) = match op.split_last() {
                    Some(split) => split,
                    None => return path,
                };
                let d = parent.len();

                if op.is_ancestor(&path) {
                    let inner = path.0[d + 1];
                    let moves = if path.0.len() == d + 2 {
                        inner > *position || (inner == *position && affinity == Affinity::Forward)
                    } else {
                        inner >= *position
                    };
                    if moves {
                        path.0[d] += 1;
                        path.0[d + 1] -= position;
                    }
                } else if parent.is_ancestor(&path) && path.0[d] > j {
                    path.0[d] += 1;
                }
            }
            Operation::MergeNode { path: op, position } => {
                let (parent, j) = match op.split_last() {
                    Some(split) => split,
                    None => return path,
                };
                let d = parent.len();

                if op.is_ancestor(&path) {
                    path.0[d] = j.saturating_sub(1);
                    path.0[d + 1] += position;
                } else if parent.is_ancestor(&path) {
                    if path.0[d] > j {
                        path.0[d] -= 1;
                    } else if path.0[d] == j && path.0.len() == d + 1 {
                        // The boundary between the two elements is gone.
                        path.0[d] = j.saturating_sub(1);
                        path.0.push(*position);
                    }
                }
            }
            Operation::SetNode { .. } | Operation::SetMarker { .. } => {}
        }

        path
    }

    fn shift_for_insert(&mut self, op: &Path, k: usize, n: usize, affinity: Affinity) {
        if !op.is_ancestor(self) {
            return;
        }
        let d = op.len();
        let x = self.0[d];
        let shifts = if self.0.len() == d + 1 {
            x > k || (x == k && affinity == Affinity::Forward)
        } else {
            x >= k
        };
        if shifts {
            self.0[d] += n;
        }
    }

    fn shift_for_remove(&mut self, op: &Path, k: usize, n: usize) {
        if !op.is_ancestor(self) {
            return;
        }
        let d = op.len();
        let x = self.0[d];
        if x >= k + n {
            self.0[d] -= n;
        } else if self.0.len() == d + 1 {
            if x > k {
                self.0[d] = k;
            }
        } else if x >= k {
            self.0.truncate(d + 1);
            self.0[d] = k;
        }
    }
}
