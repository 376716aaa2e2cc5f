mod editor;
mod element;
mod location;
mod node;
mod operation;
mod path;
mod point;
mod range;
mod text;

pub use editor::Editor;
pub use element::Element;
pub use location::Location;
pub use node::Descendant;
pub use operation::Operation;
pub use path::{Affinity, Path};
pub use point::Point;
pub use range::Range;
pub use text::{Marks, Text};
pub(crate) use node::normalize;
