//! Decoded-tree cache keyed by asset path.

use space_tree::codec;
use space_tree::{BoundedSolidTree, DecodeError, NormalField, Normalization};

use crate::error::{RenderError, Result};
use crate::source::AssetSource;

/// A normalized model and its optional normal field, ready to render.
#[derive(Debug, Clone, Copy)]
pub struct Scene<'a> {
    pub model: &'a BoundedSolidTree,
    pub normals: Option<&'a NormalField>,
}

#[derive(Debug)]
struct CachedModel {
    path: String,
    tree: BoundedSolidTree,
    normalization: Normalization,
}

#[derive(Debug)]
struct CachedNormals {
    path: String,
    /// Model path whose normalization was applied.
    model_path: String,
    field: NormalField,
}

/// Caches the most recently requested model and normal field.
///
/// Each slot holds exactly one decoded asset. Requesting a different path
/// decodes the new asset and replaces the slot wholesale. Normal fields are
/// normalized with the model's bounds, so they are reloaded whenever the
/// model changes. A failed load leaves the cache as it was.
#[derive(Debug)]
pub struct SceneCache<S> {
    source: S,
    model: Option<CachedModel>,
    normals: Option<CachedNormals>,
}

impl<S: AssetSource> SceneCache<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            model: None,
            normals: None,
        }
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    /// Path of the cached model, if any.
    pub fn model_path(&self) -> Option<&str> {
        self.model.as_ref().map(|m| m.path.as_str())
    }

    /// Path of the cached normal field, if any.
    pub fn normals_path(&self) -> Option<&str> {
        self.normals.as_ref().map(|n| n.path.as_str())
    }

    /// Returns the scene for the given paths, loading whatever is not cached.
    pub fn load(&mut self, model_path: &str, normals_path: Option<&str>) -> Result<Scene<'_>> {
        if model_path.is_empty() {
            return Err(RenderError::MissingModel);
        }
        self.ensure_model(model_path)?;
        match normals_path {
            Some(path) => self.ensure_normals(path, model_path)?,
            None => self.normals = None,
        }

        let model = self.model.as_ref().ok_or(RenderError::MissingModel)?;
        Ok(Scene {
            model: &model.tree,
            normals: self.normals.as_ref().map(|n| &n.field),
        })
    }

    fn ensure_model(&mut self, path: &str) -> Result<()> {
        if self.model_path() == Some(path) {
            log::debug!("model cache hit: {path}");
            return Ok(());
        }
        log::debug!("model cache miss: {path}");

        let bytes = self.source.load(path)?;
        let raw = codec::decode_bounded(&bytes).map_err(|source| RenderError::Decode {
            path: path.to_string(),
            source,
        })?;
        let normalization = Normalization::for_tree(&raw)
            .ok_or_else(|| RenderError::DegenerateBounds(path.to_string()))?;
        log::info!(
            "loaded model {path}: {} leaves, scale {:.4}",
            raw.inner().num_leaves(),
            normalization.scale()
        );
        self.model = Some(CachedModel {
            path: path.to_string(),
            tree: normalization.apply_bounded(&raw),
            normalization,
        });
        Ok(())
    }

    fn ensure_normals(&mut self, path: &str, model_path: &str) -> Result<()> {
        if let Some(cached) = &self.normals {
            if cached.path == path && cached.model_path == model_path {
                log::debug!("normals cache hit: {path}");
                return Ok(());
            }
        }
        log::debug!("normals cache miss: {path}");

        let normalization = self
            .model
            .as_ref()
            .map(|m| m.normalization)
            .ok_or(RenderError::MissingModel)?;
        let bytes = self.source.load(path)?;
        let decode_err = |source| RenderError::Decode {
            path: path.to_string(),
            source,
        };
        let trees = codec::decode_many(&bytes).map_err(decode_err)?;
        let field =
            NormalField::new(trees).ok_or_else(|| decode_err(DecodeError::EmptyContainer))?;
        log::info!(
            "loaded normal field {path}: {} trees, {} leaves",
            field.trees().len(),
            field.num_leaves()
        );
        self.normals = Some(CachedNormals {
            path: path.to_string(),
            model_path: model_path.to_string(),
            field: normalization.apply_field(&field),
        });
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::source::MemorySource;
    use nalgebra::{Point3, Vector3};
    use space_tree::{SpaceTree, Split};
    use std::sync::Arc;

    /// A solid box spanning `[0, 4] x [0, 2] x [0, 2]`.
    pub(crate) fn box_model() -> Vec<u8> {
        let bounded = BoundedSolidTree::new(
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(4.0, 2.0, 2.0),
            SpaceTree::leaf(true),
        );
        codec::encode_bounded(&bounded).unwrap()
    }

    /// Normals pointing away from the plane x = 2.
    pub(crate) fn split_normals() -> Vec<u8> {
        let tree = SpaceTree::branch(
            Split::new(Vector3::x(), 2.0),
            SpaceTree::leaf(-Vector3::x()),
            SpaceTree::leaf(Vector3::x()),
        );
        codec::encode_many(&[tree]).unwrap()
    }

    pub(crate) fn test_source() -> Arc<MemorySource> {
        Arc::new(
            MemorySource::new()
                .with_asset("box.bin", box_model())
                .with_asset("box2.bin", box_model())
                .with_asset("normals.bin", split_normals())
                .with_asset("broken.bin", vec![0, 0, 128])
                .with_asset(
                    "flat.bin",
                    codec::encode_bounded(&BoundedSolidTree::new(
                        Point3::new(1.0, 1.0, 1.0),
                        Point3::new(1.0, 1.0, 1.0),
                        SpaceTree::leaf(true),
                    ))
                    .unwrap(),
                ),
        )
    }

    #[test]
    fn model_is_normalized() {
        let mut cache = SceneCache::new(test_source());
        let scene = cache.load("box.bin", None).unwrap();
        assert_eq!(scene.model.min(), &Point3::new(-1.0, -0.5, -0.5));
        assert_eq!(scene.model.max(), &Point3::new(1.0, 0.5, 0.5));
        assert!(scene.normals.is_none());
    }

    #[test]
    fn normals_share_the_model_frame() {
        let mut cache = SceneCache::new(test_source());
        let scene = cache.load("box.bin", Some("normals.bin")).unwrap();
        let field = scene.normals.unwrap();
        // The cut at x = 2 is now the center of the normalized box.
        assert_eq!(field.predict(&Point3::new(-0.1, 0.0, 0.0)), -Vector3::x());
        assert_eq!(field.predict(&Point3::new(0.1, 0.0, 0.0)), Vector3::x());
    }

    #[test]
    fn cached_paths_are_not_reloaded() {
        let source = test_source();
        let mut cache = SceneCache::new(Arc::clone(&source));
        cache.load("box.bin", Some("normals.bin")).unwrap();
        cache.load("box.bin", Some("normals.bin")).unwrap();
        assert_eq!(source.load_count(), 2);

        // A new model replaces the model and renormalizes the normals.
        cache.load("box2.bin", Some("normals.bin")).unwrap();
        assert_eq!(source.load_count(), 4);
        assert_eq!(cache.model_path(), Some("box2.bin"));
        assert_eq!(cache.normals_path(), Some("normals.bin"));

        // Dropping the normals does not touch the model.
        cache.load("box2.bin", None).unwrap();
        assert_eq!(source.load_count(), 4);
        assert_eq!(cache.normals_path(), None);
    }

    #[test]
    fn failures_keep_the_previous_model() {
        let mut cache = SceneCache::new(test_source());
        cache.load("box.bin", None).unwrap();

        assert!(matches!(
            cache.load("broken.bin", None),
            Err(RenderError::Decode { ref path, .. }) if path == "broken.bin"
        ));
        assert!(matches!(cache.load("nope.bin", None), Err(RenderError::NotFound(_))));
        assert!(matches!(
            cache.load("flat.bin", None),
            Err(RenderError::DegenerateBounds(_))
        ));
        assert!(matches!(cache.load("", Some("normals.bin")), Err(RenderError::MissingModel)));
        assert_eq!(cache.model_path(), Some("box.bin"));
    }
}
