use serde::Deserialize;

use crate::error::Result;

/// How ids are generated for comments created without one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IdStrategy {
    /// `<prefix><uuid v4>`.
    Random,
    /// `<prefix>1`, `<prefix>2`, ... counted per session.
    Sequential,
}

impl Default for IdStrategy {
    fn default() -> Self {
        IdStrategy::Random
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CommentConfig {
    pub id_prefix: String,
    pub ids: IdStrategy,
}

impl Default for CommentConfig {
    fn default() -> Self {
        Self {
            id_prefix: "$comment:".into(),
            ids: IdStrategy::default(),
        }
    }
}

impl CommentConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }
}
