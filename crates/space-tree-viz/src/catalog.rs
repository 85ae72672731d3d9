//! Model catalog and per-model asset metadata.
//!
//! Each model lives in its own asset directory holding one or more levels of
//! detail of the solid (`full.bin`, `lod_*.bin`), a normal field
//! (`normals.bin`) and a `metadata.json` describing them. A catalog lists the
//! models available to the viewer.

use std::path::Path;

use nalgebra::{Matrix3, Vector3};
use serde::{Deserialize, Serialize};
use space_tree::rotation;

use crate::error::Result;

/// File name of the full-resolution solid inside a model directory.
pub const FULL_TREE_FILE: &str = "full.bin";
/// File name of the normal field inside a model directory.
pub const NORMALS_FILE: &str = "normals.bin";
/// File name of the metadata document inside a model directory.
pub const METADATA_FILE: &str = "metadata.json";

/// Size and location of one tree file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TreeInfo {
    pub num_leaves: usize,
    pub filename: String,
    pub file_size: u64,
}

/// Contents of a model directory's `metadata.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metadata {
    pub normals: TreeInfo,
    /// Levels of detail, most detailed first.
    pub lods: Vec<TreeInfo>,
}

impl Metadata {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// The most detailed level.
    pub fn full(&self) -> Option<&TreeInfo> {
        self.lods.iter().max_by_key(|lod| lod.num_leaves)
    }

    /// The most detailed level with at most `max_leaves` leaves, falling back
    /// to the coarsest level when every level is larger.
    pub fn lod_within(&self, max_leaves: usize) -> Option<&TreeInfo> {
        self.lods
            .iter()
            .filter(|lod| lod.num_leaves <= max_leaves)
            .max_by_key(|lod| lod.num_leaves)
            .or_else(|| self.lods.iter().min_by_key(|lod| lod.num_leaves))
    }
}

/// Rotation applied to a model before it is shown.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InitialRotation {
    pub axis: [f64; 3],
    pub angle: f64,
}

impl InitialRotation {
    pub fn matrix(&self) -> Matrix3<f64> {
        let axis = Vector3::from(self.axis);
        if axis == Vector3::zeros() {
            Matrix3::identity()
        } else {
            rotation(&axis, self.angle)
        }
    }
}

/// One model listed in the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelEntry {
    pub name: String,
    /// Asset directory, relative to the asset root.
    pub path: String,
    /// Where the original model came from.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotation: Option<InitialRotation>,
    pub metadata: Metadata,
}

impl ModelEntry {
    /// Asset path of the most detailed solid.
    pub fn model_path(&self) -> String {
        let file = self
            .metadata
            .full()
            .map_or(FULL_TREE_FILE, |lod| lod.filename.as_str());
        self.asset_path(file)
    }

    /// Asset path of the level of detail chosen by [`Metadata::lod_within`].
    pub fn lod_path(&self, max_leaves: usize) -> String {
        let file = self
            .metadata
            .lod_within(max_leaves)
            .map_or(FULL_TREE_FILE, |lod| lod.filename.as_str());
        self.asset_path(file)
    }

    /// Asset path of the normal field.
    pub fn normals_path(&self) -> String {
        self.asset_path(&self.metadata.normals.filename)
    }

    /// The initial model rotation, identity if none is set.
    pub fn rotation_matrix(&self) -> Matrix3<f64> {
        self.rotation
            .as_ref()
            .map_or_else(Matrix3::identity, InitialRotation::matrix)
    }

    fn asset_path(&self, file: &str) -> String {
        let dir = self.path.trim_end_matches('/');
        if dir.is_empty() {
            file.to_string()
        } else {
            format!("{dir}/{file}")
        }
    }
}

/// The list of models the viewer can show.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub models: Vec<ModelEntry>,
}

impl Catalog {
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_json(&std::fs::read_to_string(path)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn get(&self, index: usize) -> Option<&ModelEntry> {
        self.models.get(index)
    }
}

impl Default for Catalog {
    /// The bundled demo model.
    fn default() -> Self {
        let info = |num_leaves, filename: &str, file_size| TreeInfo {
            num_leaves,
            filename: filename.to_string(),
            file_size,
        };
        Self {
            models: vec![ModelEntry {
                name: "Curvy Thing".to_string(),
                path: "data/curvy_thing".to_string(),
                source: Some(
                    "https://github.com/unixpickle/model3d/tree/18bdf6c73a91e699501b0c1b441388d1a4350c19/examples/decoration/curvy_thing"
                        .to_string(),
                ),
                rotation: None,
                metadata: Metadata {
                    normals: info(3672, NORMALS_FILE, 146864),
                    lods: vec![
                        info(2011, FULL_TREE_FILE, 64360),
                        info(1024, "lod_1024.bin", 32776),
                        info(512, "lod_512.bin", 16392),
                        info(255, "lod_255.bin", 8168),
                    ],
                },
            }],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use serde_json::json;

    #[test]
    fn metadata_json_shape() {
        let json = r#"{"normals":{"num_leaves":10,"filename":"normals.bin","file_size":400},
            "lods":[{"num_leaves":20,"filename":"full.bin","file_size":800}]}"#;
        let metadata = Metadata::from_json(json).unwrap();
        assert_eq!(metadata.normals.num_leaves, 10);
        assert_eq!(metadata.full().unwrap().filename, "full.bin");
        let back = Metadata::from_json(&metadata.to_json().unwrap()).unwrap();
        assert_eq!(back, metadata);
    }

    #[test]
    fn lod_selection() {
        let catalog = Catalog::default();
        let model = catalog.get(0).unwrap();
        assert_eq!(model.model_path(), "data/curvy_thing/full.bin");
        assert_eq!(model.normals_path(), "data/curvy_thing/normals.bin");
        assert_eq!(model.lod_path(600), "data/curvy_thing/lod_512.bin");
        assert_eq!(model.lod_path(1_000_000), "data/curvy_thing/full.bin");
        assert_eq!(model.lod_path(10), "data/curvy_thing/lod_255.bin");
    }

    #[test]
    fn catalog_from_json() {
        let value = json!({
            "models": [{
                "name": "Corgi",
                "path": "data/corgi/",
                "rotation": { "axis": [0.0, 0.0, 1.0], "angle": std::f64::consts::FRAC_PI_2 },
                "metadata": {
                    "normals": { "num_leaves": 1, "filename": "normals.bin", "file_size": 16 },
                    "lods": []
                }
            }]
        });
        let catalog = Catalog::from_json(&value.to_string()).unwrap();
        assert_eq!(catalog.len(), 1);
        let corgi = catalog.get(0).unwrap();
        assert_eq!(corgi.source, None);
        assert_eq!(corgi.model_path(), "data/corgi/full.bin");
        let m = corgi.rotation_matrix();
        assert_relative_eq!(m * Vector3::x(), Vector3::y(), epsilon = 1e-12);

        let again = Catalog::from_json(&catalog.to_json().unwrap()).unwrap();
        assert_eq!(again, catalog);
    }

    #[test]
    fn invalid_catalog_is_an_error() {
        assert!(Catalog::from_json("{\"models\": 3}").is_err());
        assert!(Catalog::default().get(1).is_none());
        assert!(!Catalog::default().is_empty());
    }
}
