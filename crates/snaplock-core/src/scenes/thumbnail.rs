use std::path::Path;

use super::errors::SceneError;

/// Captures a small screenshot to accompany a saved scene.
pub trait ThumbnailCapturer: Send + Sync {
    /// Write a JPEG to `target`. Returns `false` when nothing was written.
    fn capture(&self, target: &Path) -> Result<bool, SceneError>;
}

/// Writes nothing. Used when screen capture is unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopThumbnailer;

impl ThumbnailCapturer for NoopThumbnailer {
    fn capture(&self, _target: &Path) -> Result<bool, SceneError> {
        Ok(false)
    }
}

#[cfg(feature = "thumbnails")]
pub use screen::ScreenThumbnailer;

#[cfg(feature = "thumbnails")]
mod screen {
    use std::path::Path;

    use image::{DynamicImage, ImageFormat, imageops};
    use tracing::debug;

    use super::ThumbnailCapturer;
    use crate::scenes::errors::SceneError;

    const THUMB_WIDTH: u32 = 160;
    const THUMB_HEIGHT: u32 = 90;

    /// Primary monitor screenshot scaled to a 160x90 JPEG.
    #[derive(Debug, Clone, Copy, Default)]
    pub struct ScreenThumbnailer;

    impl ThumbnailCapturer for ScreenThumbnailer {
        fn capture(&self, target: &Path) -> Result<bool, SceneError> {
            let monitors = xcap::Monitor::all().map_err(|e| SceneError::ThumbnailFailed {
                message: e.to_string(),
            })?;
            let Some(monitor) = monitors
                .iter()
                .find(|m| m.is_primary().unwrap_or(false))
                .or_else(|| monitors.first())
            else {
                return Ok(false);
            };

            let shot = monitor
                .capture_image()
                .map_err(|e| SceneError::ThumbnailFailed {
                    message: e.to_string(),
                })?;
            let small = imageops::thumbnail(&shot, THUMB_WIDTH, THUMB_HEIGHT);
            // JPEG has no alpha channel.
            let rgb = DynamicImage::ImageRgba8(small).to_rgb8();
            rgb.save_with_format(target, ImageFormat::Jpeg)
                .map_err(|e| SceneError::ThumbnailFailed {
                    message: e.to_string(),
                })?;

            debug!(event = "core.scene.thumbnail_captured", path = %target.display());
            Ok(true)
        }
    }
}
