//! Scene file persistence.
//!
//! All scenes live in one pretty-printed JSON array, `scenes.json`, next to
//! their `thumb_<timestamp>.jpg` thumbnails. Writes go through a temp file
//! and a rename.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Local};
use tracing::{debug, info, warn};

use super::errors::SceneError;
use super::thumbnail::ThumbnailCapturer;
use super::types::Scene;
use crate::identity::SceneItem;

const SCENES_FILE: &str = "scenes.json";

/// Name used when the user saves without choosing one, e.g. `03-14 092653 layout`.
pub fn default_scene_name(now: DateTime<Local>) -> String {
    now.format("%m-%d %H%M%S layout").to_string()
}

pub struct SceneStore {
    dir: PathBuf,
    thumbnailer: Arc<dyn ThumbnailCapturer>,
}

impl SceneStore {
    pub fn new(dir: impl Into<PathBuf>, thumbnailer: Arc<dyn ThumbnailCapturer>) -> Self {
        Self {
            dir: dir.into(),
            thumbnailer,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn scenes_file(&self) -> PathBuf {
        self.dir.join(SCENES_FILE)
    }

    /// Every stored scene, in save order. Missing or corrupt files read as empty.
    pub fn load_all(&self) -> Vec<Scene> {
        let path = self.scenes_file();
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
            Err(e) => {
                warn!(
                    event = "core.scene.load_read_error",
                    file = %path.display(),
                    error = %e
                );
                return Vec::new();
            }
        };

        match serde_json::from_str::<Vec<Scene>>(&content) {
            Ok(scenes) => scenes,
            Err(e) => {
                warn!(
                    event = "core.scene.load_invalid_json",
                    file = %path.display(),
                    error = %e,
                    message = "Scene file is corrupt, treating as empty"
                );
                Vec::new()
            }
        }
    }

    /// Names are matched after trimming, the same way `save_scene` stores them.
    pub fn find(&self, name: &str) -> Option<Scene> {
        let name = name.trim();
        self.load_all().into_iter().find(|s| s.name == name)
    }

    /// Store `items` under `name`, replacing any scene with that name.
    pub fn save_scene(&self, name: &str, items: Vec<SceneItem>) -> Result<Scene, SceneError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SceneError::EmptyName);
        }

        fs::create_dir_all(&self.dir).map_err(|e| SceneError::IoError {
            path: self.dir.clone(),
            source: e,
        })?;

        let mut scenes = self.load_all();
        let replaced = scenes
            .iter()
            .position(|s| s.name == name)
            .map(|pos| scenes.remove(pos));

        let mut scene = Scene::new(name, items);
        scene.thumbnail_path = self.capture_thumbnail();
        let same_thumbnail = |old: &Scene| old.thumbnail_path == scene.thumbnail_path;
        scenes.push(scene.clone());

        // The previous thumbnail stays until the new list is on disk.
        if let Err(e) = self.write_all(&scenes) {
            if !replaced.as_ref().is_some_and(same_thumbnail) {
                remove_thumbnail(&scene);
            }
            return Err(e);
        }
        if let Some(old) = &replaced
            && !same_thumbnail(old)
        {
            remove_thumbnail(old);
        }

        info!(
            event = "core.scene.save_completed",
            name = name,
            items = scene.items.len(),
            thumbnail = scene.thumbnail_path.is_some()
        );
        Ok(scene)
    }

    /// Remove the scene and its thumbnail. Returns `false` if no such scene.
    pub fn delete(&self, name: &str) -> Result<bool, SceneError> {
        let name = name.trim();
        let mut scenes = self.load_all();
        let Some(pos) = scenes.iter().position(|s| s.name == name) else {
            return Ok(false);
        };
        let removed = scenes.remove(pos);
        self.write_all(&scenes)?;
        remove_thumbnail(&removed);

        info!(event = "core.scene.delete_completed", name = name);
        Ok(true)
    }

    /// Remove every scene and thumbnail.
    pub fn clear(&self) -> Result<(), SceneError> {
        match fs::remove_dir_all(&self.dir) {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => {
                return Err(SceneError::IoError {
                    path: self.dir.clone(),
                    source: e,
                });
            }
        }
        info!(event = "core.scene.clear_completed", dir = %self.dir.display());
        Ok(())
    }

    fn capture_thumbnail(&self) -> Option<PathBuf> {
        let stamp = Local::now().format("%Y%m%d%H%M%S%3f");
        let target = self.dir.join(format!("thumb_{stamp}.jpg"));
        match self.thumbnailer.capture(&target) {
            Ok(true) => Some(target),
            Ok(false) => None,
            Err(e) => {
                warn!(
                    event = "core.scene.thumbnail_failed",
                    error = %e,
                    message = "Saving scene without thumbnail"
                );
                None
            }
        }
    }

    fn write_all(&self, scenes: &[Scene]) -> Result<(), SceneError> {
        let path = self.scenes_file();
        let json = serde_json::to_string_pretty(scenes).map_err(|e| {
            SceneError::SerializationFailed {
                message: e.to_string(),
            }
        })?;

        let temp_file = path.with_extension("json.tmp");
        if let Err(e) = fs::write(&temp_file, &json) {
            cleanup_temp_file(&temp_file, &e);
            return Err(SceneError::IoError { path, source: e });
        }
        if let Err(e) = fs::rename(&temp_file, &path) {
            cleanup_temp_file(&temp_file, &e);
            return Err(SceneError::IoError { path, source: e });
        }

        debug!(event = "core.scene.write_completed", count = scenes.len());
        Ok(())
    }
}

fn cleanup_temp_file(temp_file: &Path, original_error: &std::io::Error) {
    if let Err(cleanup_err) = fs::remove_file(temp_file) {
        warn!(
            event = "core.scene.temp_file_cleanup_failed",
            temp_file = %temp_file.display(),
            original_error = %original_error,
            cleanup_error = %cleanup_err
        );
    }
}

fn remove_thumbnail(scene: &Scene) {
    let Some(path) = &scene.thumbnail_path else {
        return;
    };
    if let Err(e) = fs::remove_file(path)
        && e.kind() != std::io::ErrorKind::NotFound
    {
        warn!(
            event = "core.scene.thumbnail_remove_failed",
            path = %path.display(),
            error = %e
        );
    }
}
