use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::identity::SceneItem;

/// A saved arrangement. Saving under an existing name replaces it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scene {
    pub name: String,
    #[serde(default)]
    pub items: Vec<SceneItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_path: Option<PathBuf>,
}

impl Scene {
    pub fn new(name: impl Into<String>, items: Vec<SceneItem>) -> Self {
        Self {
            name: name.into(),
            items,
            thumbnail_path: None,
        }
    }
}
