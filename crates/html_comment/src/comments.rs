mod store;
mod sync;

pub use store::CommentStore;
pub use sync::{CommentData, HtmlComments};
