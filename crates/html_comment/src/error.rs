//! Error types for the comment engine and the document it is anchored in.

use thiserror::Error;

use crate::types::Point;

#[derive(Debug, Error)]
pub enum Error {
    /// A caller-supplied comment id is already used by a live comment.
    #[error("comment id {0:?} is already in use")]
    DuplicateId(String),

    /// No live comment has this id.
    #[error("no comment with id {0:?}")]
    UnknownId(String),

    /// The position does not resolve inside the current tree.
    #[error("position {0} is outside the document")]
    InvalidPosition(Point),

    /// A tree operation that does not fit the current tree.
    #[error("invalid operation: {0}")]
    InvalidOperation(String),

    #[error("malformed markup: {0}")]
    Markup(String),

    #[error("invalid comment configuration: {0}")]
    Config(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
