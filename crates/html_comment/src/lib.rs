//! Comments embedded in HTML markup as `<!--...-->` tokens, kept anchored to
//! their place in the document while it is edited.
//!
//! Loading markup with [`Document::set_data`] turns every comment token into
//! a comment anchored at the token's position. Edits made through
//! [`Document::change`] move the anchors along with the content, and
//! [`Document::get_data`] writes the tokens back where their anchors ended up.

mod comments;
mod config;
mod document;
mod error;
mod markup;
pub mod types;

pub use comments::{CommentData, CommentStore, HtmlComments};
pub use config::{CommentConfig, IdStrategy};
pub use document::{Document, Writer};
pub use error::{Error, Result};
pub use markup::{from_html, to_html, Parsed};
