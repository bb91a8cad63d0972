//! Artifact serialization
//!
//! JSON persistence helpers for trained components. Parent directories are
//! created on save; a missing file on load surfaces as
//! [`TabMlpError::ArtifactMissing`].

use crate::error::{Result, TabMlpError};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::path::Path;

/// Serialize `value` as JSON at `path`, creating parent directories as needed
pub fn save_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    let json = serde_json::to_string(value)?;
    fs::write(path, json)?;
    Ok(())
}

/// Deserialize a JSON artifact from `path`
pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    if !path.exists() {
        return Err(TabMlpError::ArtifactMissing(path.display().to_string()));
    }
    let json = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Artifact {
        name: String,
        values: Vec<f64>,
    }

    #[test]
    fn test_round_trip() {
        let dir = std::env::temp_dir().join(format!("tabmlp_export_{}", std::process::id()));
        let path = dir.join("nested").join("artifact.json");

        let artifact = Artifact {
            name: "scaler".to_string(),
            values: vec![1.0, 2.5, -3.0],
        };
        save_json(&artifact, &path).unwrap();
        let restored: Artifact = load_json(&path).unwrap();

        assert_eq!(artifact, restored);
        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_load_missing_artifact_fails() {
        let path = std::env::temp_dir().join("tabmlp_export_does_not_exist.json");
        let result: Result<Artifact> = load_json(&path);
        assert!(matches!(result, Err(TabMlpError::ArtifactMissing(_))));
    }
}
