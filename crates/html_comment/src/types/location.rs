use super::node::Descendant;

/// Where an offset falls among a container's children.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Location {
    /// Right before the child at this index (or after the last child).
    Boundary(usize),
    /// Inside the text child at `index`, `offset` characters in.
    Within { index: usize, offset: usize },
}

impl Location {
    /// Find the location of `offset`, or `None` past the end of the children.
    pub fn find(children: &[Descendant], offset: usize) -> Option<Location> {
        let mut start = 0;

        for (index, child) in children.iter().enumerate() {
            if offset == start {
                return Some(Location::Boundary(index));
            }
            let end = start + child.size();
            if offset < end {
                return Some(Location::Within {
                    index,
                    offset: offset - start,
                });
            }
            start = end;
        }

        if offset == start {
            Some(Location::Boundary(children.len()))
        } else {
            None
        }
    }
}
