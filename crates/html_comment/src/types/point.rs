use std::cmp::{Ord, Ordering};
use std::fmt;

use serde::{Deserialize, Serialize};

use super::operation::Operation;
use super::path::{Affinity, Path};

/// A position between two offset units of the container at `path`.
#[derive(Debug, PartialEq, Eq, Clone, Hash, Serialize, Deserialize)]
pub struct Point {
    pub path: Path,
    pub offset: usize,
}

impl Ord for Point {
    fn cmp(&self, other: &Self) -> Ordering {
        self.position().cmp(&other.position())
    }
}

impl PartialOrd for Point {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self.position().as_slice())
    }
}

impl Point {
    pub fn new(path: Path, offset: usize) -> Self {
        Self { path, offset }
    }

    /// The full position path: container offsets followed by this offset.
    pub fn position(&self) -> Path {
        self.path.concat(self.offset)
    }

    fn from_position(position: &Path) -> Self {
        match position.split_last() {
            Some((path, offset)) => Self { path, offset },
            None => Self::new(Path::root(), 0),
        }
    }

    pub fn is_after(&self, another: &Point) -> bool {
        self > another
    }

    pub fn is_before(&self, another: &Point) -> bool {
        self < another
    }

    pub fn transform(point: &Point, op: &Operation, affinity: Affinity) -> Point {
        Point::from_position(&Path::transform(&point.position(), op, affinity))
    }
}
