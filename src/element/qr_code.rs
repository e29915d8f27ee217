use egui::{Color32, Rect};
use log::info;
use serde::{Deserialize, Serialize};

use super::image::draw_placeholder;
use super::{Element, ObjectFrame};
use crate::element::common;
use crate::raster::{self, Raster, RasterCache, RasterError, RasterProvider};
use crate::renderer::Surface;

type QrKey = (String, [usize; 2]);

/// A QR code encoding `data`, rendered at the object's pixel size.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QrCodeObject {
    data: String,
    // Regenerated whenever the data or the pixel size changes.
    #[serde(skip)]
    raster: RasterCache<QrKey>,
}

impl QrCodeObject {
    pub fn new(data: impl Into<String>) -> Self {
        Self {
            data: data.into(),
            raster: RasterCache::default(),
        }
    }

    pub fn data(&self) -> &str {
        &self.data
    }

    pub fn set_data(&mut self, data: impl Into<String>) {
        self.data = data.into();
    }

    fn key(&self, bounds: Rect) -> QrKey {
        (self.data.clone(), raster::pixel_size(bounds))
    }

    /// The cached raster, if it matches the current data and `bounds`.
    pub fn raster(&self, bounds: Rect) -> Option<&Raster> {
        self.raster.get(&self.key(bounds))
    }
}

impl Element for QrCodeObject {
    fn element_type(&self) -> &'static str {
        "qr_code"
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
        // Nothing to encode; the placeholder stands in.
        if self.data.is_empty() {
            self.raster.invalidate();
            return Ok(false);
        }
        let key = self.key(bounds);
        let (_, regenerated) = self
            .raster
            .get_or_try_insert_with(key, |(data, size)| provider.encode_qr(data, *size))?;
        if regenerated {
            info!("Encoded QR code ({} chars)", self.data.len());
        }
        Ok(regenerated)
    }
}
