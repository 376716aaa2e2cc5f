use super::node::Descendant;

bitflags::bitflags! {
    pub struct Marks: u32 {
        const BOLD = 1 << 1;
        const ITALIC = 1 << 2;
        const UNDERLINE = 1 << 3;
    }
}

/// A run of characters sharing the same marks. Each character occupies one
/// offset unit in the parent container.
#[derive(Debug, Clone, PartialEq)]
pub struct Text(String, Marks);

impl From<Text> for Descendant {
    fn from(node: Text) -> Self {
        Descendant::Text(node)
    }
}

impl Text {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into(), Marks::empty())
    }

    pub fn with_marks(text: impl Into<String>, marks: Marks) -> Self {
        Self(text.into(), marks)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn marks(&self) -> Marks {
        self.1
    }

    pub fn len(&self) -> usize {
        self.0.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Check if two Text nodes have the same **marks** (doesn't compare values).
    pub fn matches(a: &Self, b: &Self) -> bool {
        a.1 == b.1
    }

    /// The characters between two offsets.
    pub fn slice(&self, from: usize, to: usize) -> &str {
        &self.0[byte_index(&self.0, from)..byte_index(&self.0, to)]
    }

    /// Split into the characters before and from `offset`, both keeping the marks.
    pub fn split(self, offset: usize) -> (Text, Text) {
        let Text(mut head, marks) = self;
        let tail = head.split_off(byte_index(&head, offset));
        (Text(head, marks), Text(tail, marks))
    }

    pub(crate) fn push_str(&mut self, text: &str) {
        self.0.push_str(text);
    }
}

fn byte_index(s: &str, offset: usize) -> usize {
    s.char_indices().nth(offset).map_or(s.len(), |(i, _)| i)
}
