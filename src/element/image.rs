use std::path::{Path, PathBuf};

use egui::{Color32, Rect, Stroke};
use log::info;
use serde::{Deserialize, Serialize};

use super::{Element, ObjectFrame};
use crate::element::common;
use crate::raster::{Raster, RasterCache, RasterError, RasterProvider};
use crate::renderer::Surface;

/// A bitmap loaded from a file and stretched to the object's bounds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageObject {
    path: PathBuf,
    // Decoded once per path; resizing only changes how it is stretched.
    #[serde(skip)]
    raster: RasterCache<PathBuf>,
}

impl ImageObject {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            raster: RasterCache::default(),
        }
    }

    /// Builds an image object around an already decoded raster, so the
    /// first frame does not decode the file again.
    pub fn with_raster(path: impl Into<PathBuf>, raster: Raster) -> Self {
        let mut image = Self::new(path);
        image.raster.insert(image.path.clone(), raster);
        image
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn set_path(&mut self, path: impl Into<PathBuf>) {
        self.path = path.into();
    }

    pub fn raster(&self) -> Option<&Raster> {
        self.raster.get(&self.path)
    }
}

impl Element for ImageObject {
    fn element_type(&self) -> &'static str {
        "image"
    }

    fn draw(&self, frame: &ObjectFrame, surface: &mut dyn Surface) {
        match self.raster() {
            Some(raster) => surface.draw_raster(
                frame.bounds,
                frame.transform,
                raster,
                common::with_opacity(Color32::WHITE, frame.opacity),
            ),
            None => draw_placeholder(frame, surface),
        }
    }

    fn refresh_raster(&mut self, _bounds: Rect, provider: &dyn RasterProvider) -> Result<bool, RasterError> {
        let (_, regenerated) = self
            .raster
            .get_or_try_insert_with(self.path.clone(), |path| provider.decode_image(path))?;
        if regenerated {
            info!("Decoded image {}", self.path.display());
        }
        Ok(regenerated)
    }
}

/// Grey box shown while a raster is missing.
pub(crate) fn draw_placeholder(frame: &ObjectFrame, surface: &mut dyn Surface) {
    surface.fill_rect(
        frame.bounds,
        frame.transform,
        common::with_opacity(common::PLACEHOLDER_FILL, frame.opacity),
    );
    surface.stroke_rect(
        frame.bounds,
        frame.transform,
        Stroke::new(1.0, common::with_opacity(common::PLACEHOLDER_STROKE, frame.opacity)),
    );
}
