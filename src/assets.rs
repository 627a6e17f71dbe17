//! Image asset cache.
//!
//! Owns every decoded image the board references, deduplicated by path, and
//! lazily uploads egui textures on the UI thread at first draw. Cards hold
//! only an [`crate::types::ImageRef`]; the pixels and GPU handle live here.

use eframe::egui;
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};

/// One cached image: pixel size plus decode/upload state.
pub struct ImageAsset {
    /// Pixel dimensions of the decoded image.
    pub size: (u32, u32),
    /// Decoded pixels, held until the texture is uploaded.
    pixels: Option<egui::ColorImage>,
    /// GPU texture, created lazily on the UI thread.
    texture: Option<egui::TextureHandle>,
}

/// Path-keyed cache of decoded images and their textures.
#[derive(Default)]
pub struct ImageAssets {
    entries: HashMap<PathBuf, ImageAsset>,
    /// Paths that failed to load or bind; each is reported once.
    failed: HashSet<PathBuf>,
}

impl ImageAssets {
    /// Creates an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes an image file into an egui color image.
    ///
    /// This is the only disk/CPU-heavy step and is safe to call off the UI
    /// thread; feed the result back through [`Self::insert_decoded`].
    pub fn decode(path: &Path) -> Result<egui::ColorImage, String> {
        let dynamic = image::open(path)
            .map_err(|err| format!("failed to load {}: {err}", path.display()))?;
        let rgba = dynamic.to_rgba8();
        let size = [rgba.width() as usize, rgba.height() as usize];
        Ok(egui::ColorImage::from_rgba_unmultiplied(size, rgba.as_raw()))
    }

    /// Loads an image from disk, deduplicating by path.
    ///
    /// # Returns
    ///
    /// The image's pixel size, whether freshly decoded or already cached.
    pub fn load(&mut self, path: &Path) -> Result<(u32, u32), String> {
        if let Some(asset) = self.entries.get(path) {
            return Ok(asset.size);
        }
        let pixels = Self::decode(path)?;
        Ok(self.insert_decoded(path.to_path_buf(), pixels))
    }

    /// Inserts an already-decoded image (e.g. from the import worker).
    ///
    /// # Returns
    ///
    /// The image's pixel size.
    pub fn insert_decoded(&mut self, path: PathBuf, pixels: egui::ColorImage) -> (u32, u32) {
        let size = (pixels.size[0] as u32, pixels.size[1] as u32);
        self.failed.remove(&path);
        self.entries.insert(
            path,
            ImageAsset {
                size,
                pixels: Some(pixels),
                texture: None,
            },
        );
        size
    }

    /// Pixel size of a cached image, if present.
    pub fn size(&self, path: &Path) -> Option<(u32, u32)> {
        self.entries.get(path).map(|asset| asset.size)
    }

    /// Whether a path is cached.
    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    /// Returns the GPU texture for a path, uploading or disk-loading lazily.
    ///
    /// Must be called from the UI thread. A missing or unbindable image is a
    /// hard error for that card's draw: it is reported once via `log::error!`
    /// and `None` is returned so the caller skips the image pass.
    pub fn texture(&mut self, ctx: &egui::Context, path: &Path) -> Option<egui::TextureId> {
        if !self.entries.contains_key(path) {
            if self.failed.contains(path) {
                return None;
            }
            if let Err(err) = self.load(path) {
                log::error!("image bind failed: {err}");
                self.failed.insert(path.to_path_buf());
                return None;
            }
        }
        let asset = self.entries.get_mut(path)?;
        if asset.texture.is_none() {
            let pixels = asset.pixels.take()?;
            let name = path.display().to_string();
            asset.texture = Some(ctx.load_texture(name, pixels, egui::TextureOptions::LINEAR));
        }
        asset.texture.as_ref().map(|tex| tex.id())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_reports_an_error() {
        let mut assets = ImageAssets::new();
        let result = assets.load(Path::new("/nonexistent/image.png"));
        assert!(result.is_err());
        assert!(!assets.contains(Path::new("/nonexistent/image.png")));
    }

    #[test]
    fn insert_decoded_is_deduplicated_by_path() {
        let mut assets = ImageAssets::new();
        let path = PathBuf::from("/tmp/fake.png");
        let img = egui::ColorImage::filled([4, 2], egui::Color32::WHITE);
        assert_eq!(assets.insert_decoded(path.clone(), img), (4, 2));
        assert_eq!(assets.size(&path), Some((4, 2)));
        // A second load of a cached path never touches the disk.
        assert_eq!(assets.load(&path).unwrap(), (4, 2));
    }
}
