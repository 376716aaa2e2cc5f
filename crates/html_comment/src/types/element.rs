use super::node::{self, Descendant};

/// A named container. It occupies one offset unit inside its parent.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    pub(crate) children: Vec<Descendant>,
}

impl From<Element> for Descendant {
    fn from(node: Element) -> Self {
        Descendant::Element(node)
    }
}

impl Element {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: vec![],
            children: vec![],
        }
    }

    /// Set an attribute, keeping the order in which attributes were first set.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        let name = name.into();
        let value = value.into();
        match self.attributes.iter_mut().find(|(key, _)| *key == name) {
            Some((_, old)) => *old = value,
            None => self.attributes.push((name, value)),
        }
        self
    }

    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    pub fn attributes(&self) -> &[(String, String)] {
        &self.attributes
    }

    /// Move the children from `index` on into a new element with the same
    /// name and attributes.
    pub(crate) fn split_off(&mut self, index: usize) -> Element {
        Element {
            name: self.name.clone(),
            attributes: self.attributes.clone(),
            children: self.children.split_off(index),
        }
    }

    pub fn add_child(mut self, child: impl Into<Descendant>) -> Self {
        self.children.push(child.into());
        node::normalize(&mut self.children);
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub(crate) fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
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

    /// The number of offset units inside this element.
    pub fn size(&self) -> usize {
        node::size(&self.children)
    }
}
