use super::point::Point;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Range {
    anchor: Point,
    focus: Point,
}

impl Range {
    pub fn new(anchor: Point, focus: Point) -> Self {
        Self { anchor, focus }
    }

    pub fn anchor(&self) -> &Point {
        &self.anchor
    }

    pub fn focus(&self) -> &Point {
        &self.focus
    }

    pub fn edges(&self, reverse: bool) -> (&Point, &Point) {
        if self.is_backward() == reverse {
            (&self.anchor, &self.focus)
        } else {
            (&self.focus, &self.anchor)
        }
    }

    pub fn includes_point(&self, target: &Point) -> bool {
        let (start, end) = self.edges(false);
        target >= start && target <= end
    }

    /// Check that both edges sit in the same container.
    pub fn is_flat(&self) -> bool {
        self.anchor.path == self.focus.path
    }

    pub fn is_backward(&self) -> bool {
        self.anchor.is_after(&self.focus)
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    pub fn start(&self) -> &Point {
        self.edges(false).0
    }

    pub fn end(&self) -> &Point {
        self.edges(false).1
    }
}
