//! Derived rasters for image, QR code and shape objects.
//!
//! Rasters are never persisted. Each object keeps a [`RasterCache`] keyed by
//! the source fields the raster was produced from; when those fields change
//! the key no longer matches and the next refresh regenerates it.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use egui::{Color32, ColorImage, Rect};
use log::debug;
use thiserror::Error;

/// Errors produced while generating a raster from its source.
#[derive(Debug, Error)]
pub enum RasterError {
    #[error("file not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode image: {0}")]
    Decode(#[from] image::ImageError),

    #[error("failed to render SVG: {0}")]
    Svg(String),

    #[error("QR code text cannot be empty")]
    EmptyQrData,

    #[error("{0} generation is not available")]
    Unsupported(&'static str),

    #[error("invalid raster dimensions {0}x{1}")]
    InvalidDimensions(usize, usize),
}

static NEXT_RASTER_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a generated raster, used to key GPU textures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RasterId(u64);

impl RasterId {
    fn next() -> Self {
        Self(NEXT_RASTER_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// An immutable, shareable bitmap.
#[derive(Clone)]
pub struct Raster {
    id: RasterId,
    image: Arc<ColorImage>,
}

impl Raster {
    pub fn new(image: ColorImage) -> Self {
        Self {
            id: RasterId::next(),
            image: Arc::new(image),
        }
    }

    pub fn id(&self) -> RasterId {
        self.id
    }

    pub fn image(&self) -> &Arc<ColorImage> {
        &self.image
    }

    /// `[width, height]` in pixels.
    pub fn size(&self) -> [usize; 2] {
        self.image.size
    }
}

impl fmt::Debug for Raster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Raster")
            .field("id", &self.id)
            .field("size", &self.image.size)
            .finish()
    }
}

/// Pixel size for rasterizing into `bounds`, at least 1x1.
pub fn pixel_size(bounds: Rect) -> [usize; 2] {
    [
        bounds.width().round().max(1.0) as usize,
        bounds.height().round().max(1.0) as usize,
    ]
}

/// A single memoized raster, valid only for the key it was generated from.
pub struct RasterCache<K> {
    entry: Option<(K, Raster)>,
}

impl<K: PartialEq> RasterCache<K> {
    /// The cached raster if it was generated from `key`.
    pub fn get(&self, key: &K) -> Option<&Raster> {
        match &self.entry {
            Some((cached, raster)) if cached == key => Some(raster),
            _ => None,
        }
    }

    pub fn is_fresh(&self, key: &K) -> bool {
        self.get(key).is_some()
    }

    /// Returns the raster for `key`, generating it when the cache is stale.
    ///
    /// The flag is `true` when `generate` ran. On error the stale entry is dropped.
    pub fn get_or_try_insert_with<F>(&mut self, key: K, generate: F) -> Result<(&Raster, bool), RasterError>
    where
        F: FnOnce(&K) -> Result<ColorImage, RasterError>,
    {
        let regenerated = !self.is_fresh(&key);
        if regenerated {
            self.entry = None;
            let image = generate(&key)?;
            let [w, h] = image.size;
            if w == 0 || h == 0 {
                return Err(RasterError::InvalidDimensions(w, h));
            }
            debug!("generated {w}x{h} raster");
            self.entry = Some((key, Raster::new(image)));
        }
        match &self.entry {
            Some((_, raster)) => Ok((raster, regenerated)),
            None => unreachable!("entry populated above"),
        }
    }

    pub fn insert(&mut self, key: K, raster: Raster) {
        self.entry = Some((key, raster));
    }

    pub fn invalidate(&mut self) {
        self.entry = None;
    }
}

impl<K> Default for RasterCache<K> {
    fn default() -> Self {
        Self { entry: None }
    }
}

impl<K: Clone> Clone for RasterCache<K> {
    fn clone(&self) -> Self {
        Self {
            entry: self.entry.clone(),
        }
    }
}

// Derived state: two objects with equal source fields are equal whatever
// their caches hold.
impl<K> PartialEq for RasterCache<K> {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl<K> fmt::Debug for RasterCache<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.entry {
            Some((_, raster)) => f.debug_tuple("RasterCache").field(raster).finish(),
            None => f.write_str("RasterCache(empty)"),
        }
    }
}

/// Produces rasters for objects whose pixels come from outside the core:
/// decoded image files, encoded QR codes and rasterized SVG documents.
///
/// Implementations are treated as pure functions of their arguments.
pub trait RasterProvider {
    fn decode_image(&self, path: &Path) -> Result<ColorImage, RasterError>;

    fn encode_qr(&self, data: &str, size: [usize; 2]) -> Result<ColorImage, RasterError>;

    fn rasterize_svg(&self, path: &Path, size: [usize; 2]) -> Result<ColorImage, RasterError>;
}

/// A pluggable QR encoder, `(text, [width, height]) -> pixels`.
pub type QrEncoder = Box<dyn Fn(&str, [usize; 2]) -> Result<ColorImage, RasterError>>;

/// Reads images and SVG documents from the local filesystem.
///
/// QR encoding is delegated to an encoder supplied by the host; without
/// one, QR objects draw as placeholders.
#[derive(Default)]
pub struct FileRasterProvider {
    qr_encoder: Option<QrEncoder>,
}

impl FileRasterProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_qr_encoder(mut self, encoder: QrEncoder) -> Self {
        self.qr_encoder = Some(encoder);
        self
    }

    fn read(path: &Path) -> Result<Vec<u8>, RasterError> {
        if !path.exists() {
            return Err(RasterError::NotFound(path.to_path_buf()));
        }
        std::fs::read(path).map_err(|source| RasterError::Io {
            path: path.to_path_buf(),
            source,
        })
    }
}

impl RasterProvider for FileRasterProvider {
    fn decode_image(&self, path: &Path) -> Result<ColorImage, RasterError> {
        let bytes = Self::read(path)?;
        let image = image::load_from_memory(&bytes)?;
        let size = [image.width() as usize, image.height() as usize];
        let buffer = image.to_rgba8();
        let pixels = buffer.as_flat_samples();
        Ok(ColorImage::from_rgba_unmultiplied(size, pixels.as_slice()))
    }

    fn encode_qr(&self, data: &str, size: [usize; 2]) -> Result<ColorImage, RasterError> {
        if data.is_empty() {
            return Err(RasterError::EmptyQrData);
        }
        match &self.qr_encoder {
            Some(encoder) => encoder(data, size),
            None => Err(RasterError::Unsupported("QR code")),
        }
    }

    #[cfg(feature = "svg")]
    fn rasterize_svg(&self, path: &Path, size: [usize; 2]) -> Result<ColorImage, RasterError> {
        use resvg::{tiny_skia, usvg};

        let bytes = Self::read(path)?;
        let tree = usvg::Tree::from_data(&bytes, &usvg::Options::default())
            .map_err(|e| RasterError::Svg(e.to_string()))?;

        let [w, h] = size;
        let mut pixmap = tiny_skia::Pixmap::new(w as u32, h as u32)
            .ok_or(RasterError::InvalidDimensions(w, h))?;
        pixmap.fill(tiny_skia::Color::WHITE);

        let svg_size = tree.size();
        let transform = tiny_skia::Transform::from_scale(
            w as f32 / svg_size.width(),
            h as f32 / svg_size.height(),
        );
        resvg::render(&tree, transform, &mut pixmap.as_mut());

        Ok(ColorImage::from_rgba_premultiplied(size, pixmap.data()))
    }

    #[cfg(not(feature = "svg"))]
    fn rasterize_svg(&self, path: &Path, _size: [usize; 2]) -> Result<ColorImage, RasterError> {
        Self::read(path)?;
        Err(RasterError::Unsupported("SVG"))
    }
}

/// A flat-color image, handy as a stand-in encoder and in tests.
pub fn solid_image(size: [usize; 2], color: Color32) -> ColorImage {
    ColorImage::new(size, color)
}
