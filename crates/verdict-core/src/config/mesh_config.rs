use serde::{Deserialize, Serialize};

use super::defaults;

/// Cross-repository state sharing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MeshConfig {
    /// Identity of this repository inside the mesh.
    pub repository_id: String,
}

impl Default for MeshConfig {
    fn default() -> Self {
        Self {
            repository_id: defaults::DEFAULT_REPOSITORY_ID.to_string(),
        }
    }
}
