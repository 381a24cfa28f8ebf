use crate::foundation::error::BeatframeResult;
use crate::render::cpu::premul_bytes_to_image;
use anyhow::Context;
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Decoded image with premultiplied pixels.
#[derive(Clone, Debug)]
pub struct PreparedImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Premultiplied RGBA8.
    pub rgba8_premul: Arc<Vec<u8>>,
}

/// Decode any format the `image` crate understands into premultiplied RGBA8.
pub fn decode_image(bytes: &[u8]) -> BeatframeResult<PreparedImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    let rgba = dyn_img.to_rgba8();
    let (width, height) = rgba.dimensions();

    let mut rgba8_premul = rgba.into_raw();
    premultiply_rgba8_in_place(&mut rgba8_premul);

    Ok(PreparedImage {
        width,
        height,
        rgba8_premul: Arc::new(rgba8_premul),
    })
}

fn premultiply_rgba8_in_place(rgba: &mut [u8]) {
    for px in rgba.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * a + 127) / 255) as u8;
        }
    }
}

/// Scene images keyed by the reference string used in the config.
///
/// References that are not registered explicitly are loaded from disk on first use. Failed loads
/// are remembered so a missing file is not retried every frame.
#[derive(Default)]
pub struct ImageStore {
    entries: HashMap<String, Option<(PreparedImage, vello_cpu::Image)>>,
    revision: u64,
}

impl std::fmt::Debug for ImageStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageStore")
            .field("entries", &self.entries.len())
            .field("revision", &self.revision)
            .finish()
    }
}

impl ImageStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register encoded image bytes under `key`.
    pub fn insert_bytes(&mut self, key: impl Into<String>, bytes: &[u8]) -> BeatframeResult<()> {
        let img = decode_image(bytes)?;
        self.insert(key, img)
    }

    /// Register a decoded image under `key`.
    pub fn insert(&mut self, key: impl Into<String>, img: PreparedImage) -> BeatframeResult<()> {
        let paint = premul_bytes_to_image(&img.rgba8_premul, img.width, img.height)?;
        self.entries.insert(key.into(), Some((img, paint)));
        self.revision += 1;
        Ok(())
    }

    /// Forget `key` (and any remembered load failure).
    pub fn remove(&mut self, key: &str) {
        if self.entries.remove(key).is_some() {
            self.revision += 1;
        }
    }

    /// Bumped whenever a registered image is replaced or removed.
    pub(crate) fn revision(&self) -> u64 {
        self.revision
    }

    /// Whether `key` resolves to a decoded image, loading it from disk if needed.
    pub fn contains(&mut self, key: &str) -> bool {
        self.get_or_load(key).is_some()
    }

    pub(crate) fn get_or_load(&mut self, key: &str) -> Option<&(PreparedImage, vello_cpu::Image)> {
        if !self.entries.contains_key(key) {
            let loaded = match load_path(Path::new(key)) {
                Ok(img) => premul_bytes_to_image(&img.rgba8_premul, img.width, img.height)
                    .ok()
                    .map(|paint| (img, paint)),
                Err(e) => {
                    tracing::debug!(key, error = %e, "image unavailable");
                    None
                }
            };
            self.entries.insert(key.to_owned(), loaded);
        }
        self.entries.get(key).and_then(Option::as_ref)
    }
}

fn load_path(path: &Path) -> BeatframeResult<PreparedImage> {
    let bytes = std::fs::read(path).with_context(|| format!("read image '{}'", path.display()))?;
    decode_image(&bytes)
}

/// Scale and offset that cover `dst_w x dst_h` with a `src_w x src_h` image, centered.
pub(crate) fn cover_fit(src_w: f64, src_h: f64, dst_w: f64, dst_h: f64) -> (f64, f64, f64) {
    if src_w <= 0.0 || src_h <= 0.0 {
        return (1.0, 0.0, 0.0);
    }
    let s = (dst_w / src_w).max(dst_h / src_h);
    (s, (dst_w - src_w * s) * 0.5, (dst_h - src_h * s) * 0.5)
}

#[cfg(test)]
#[path = "../../tests/unit/render/image.rs"]
mod tests;
