use std::path::{Path, PathBuf};

use egui::{Color32, Rect};
use log::info;
use serde::{Deserialize, Serialize};

use super::image::draw_placeholder;
use super::{Element, ObjectFrame};
use crate::element::common;
use crate::raster::{self, Raster, RasterCache, RasterError, RasterProvider};
use crate::renderer::Surface;

type ShapeKey = (PathBuf, [usize; 2]);

/// A vector document referenced by path.
///
/// The SVG file stays the source of truth (and is what native export
/// writes); the raster is an on-screen snapshot at the current size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeObject {
    svg_path: PathBuf,
    #[serde(skip)]
    raster: RasterCache<ShapeKey>,
}

impl ShapeObject {
    pub fn new(svg_path: impl Into<PathBuf>) -> Self {
        Self {
            svg_path: svg_path.into(),
            raster: RasterCache::default(),
        }
    }

    pub fn svg_path(&self) -> &Path {
        &self.svg_path
    }

    fn key(&self, bounds: Rect) -> ShapeKey {
        (self.svg_path.clone(), raster::pixel_size(bounds))
    }

    pub fn raster(&self, bounds: Rect) -> Option<&Raster> {
        self.raster.get(&self.key(bounds))
    }
}

impl Element for ShapeObject {
    fn element_type(&self) -> &'static str {
        "shape"
    }

    fn draw(&self, frame: &ObjectFrame, surface: &mut dyn Surface) {
        match self.raster(frame.bounds) {
            Some(raster) => surface.draw_raster(
                frame.bounds,
                frame.transform,
                raster,
                common::with_opacity(Color32::WHITE, frame.opacity),
            ),
            None => draw_placeholder(frame, surface),
        }
    }

    fn refresh_raster(&mut self, bounds: Rect, provider: &dyn RasterProvider) -> Result<bool, RasterError> {
        let key = self.key(bounds);
        let (_, regenerated) = self
            .raster
            .get_or_try_insert_with(key, |(path, size)| provider.rasterize_svg(path, *size))?;
        if regenerated {
            info!("Rasterized shape {}", self.svg_path.display());
        }
        Ok(regenerated)
    }
}
