//! Prefab and scene files
//!
//! A prefab file holds one entity record (with its subtree). A scene file
//! holds an `i32` root count followed by one record per root. Both hold the
//! file handle for the whole operation and release it on return.

use std::path::{Path, PathBuf};

use crate::ecs::EntityKey;
use crate::io::file::{has_extension, with_extension};
use crate::io::{FileStream, StreamReader, StreamWriter};

use super::{Scene, SceneError};

impl Scene {
    /// Save `key` and its subtree as a prefab.
    ///
    /// The configured prefab extension is appended to `path` unless already
    /// present, and the entity is marked as a prefab root. Returns the path
    /// actually written.
    pub fn save_prefab(
        &mut self,
        key: EntityKey,
        path: impl AsRef<Path>,
    ) -> Result<PathBuf, SceneError> {
        let path = with_extension(path.as_ref(), &self.config().prefab_extension);

        self.get_mut(key)
            .ok_or(SceneError::EntityNotFound(key))?
            .set_prefab(true);

        let mut writer = FileStream::create(&path)?;
        self.serialize_entity(key, &mut writer)?;
        writer.finish()?;

        log::info!("Saved prefab {}", path.display());
        Ok(path)
    }

    /// Instantiate a prefab as a new root entity.
    ///
    /// Paths without the configured prefab extension are rejected before the
    /// file is opened.
    pub fn load_prefab(&mut self, path: impl AsRef<Path>) -> Result<EntityKey, SceneError> {
        let path = path.as_ref();
        check_extension(path, &self.config().prefab_extension)?;

        let mut reader = FileStream::open(path)?;
        let key = self.instantiate(&mut reader, None)?;

        log::info!("Loaded prefab {}", path.display());
        Ok(key)
    }

    /// Save every root and its subtree to a scene file.
    ///
    /// The configured scene extension is appended to `path` unless already
    /// present. Returns the path actually written.
    pub fn save_scene(&self, path: impl AsRef<Path>) -> Result<PathBuf, SceneError> {
        let path = with_extension(path.as_ref(), &self.config().scene_extension);
        let roots = self.roots();

        let mut writer = FileStream::create(&path)?;
        writer.write_count(roots.len())?;
        for root in &roots {
            self.serialize_entity(*root, &mut writer)?;
        }
        writer.finish()?;

        log::info!("Saved scene {} ({} entities)", path.display(), self.len());
        Ok(path)
    }

    /// Replace the scene's contents with a scene file
    pub fn load_scene(&mut self, path: impl AsRef<Path>) -> Result<(), SceneError> {
        let path = path.as_ref();
        check_extension(path, &self.config().scene_extension)?;

        let mut reader = FileStream::open(path)?;
        self.clear();

        let root_count = reader.read_count()?;
        for _ in 0..root_count {
            self.instantiate(&mut reader, None)?;
        }

        log::info!("Loaded scene {} ({} entities)", path.display(), self.len());
        Ok(())
    }
}

fn check_extension(path: &Path, expected: &str) -> Result<(), SceneError> {
    if has_extension(path, expected) {
        return Ok(());
    }

    log::warn!("Refusing to load {}: expected a {} file", path.display(), expected);
    Err(SceneError::InvalidExtension {
        path: path.display().to_string(),
        expected: expected.to_string(),
    })
}
