use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;

use egui::{Color32, Vec2, vec2};
use serde::{Deserialize, Serialize};

use crate::state::persistence::{PersistenceError, PersistenceResult};

/// Editor-wide constants.
///
/// Every field has a default, so a config file only needs the values it
/// overrides.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Side length of a handle square, in canvas pixels.
    pub handle_size: f32,
    /// Distance from the top edge midpoint to the rotation handle.
    pub rotation_handle_offset: f32,
    /// Smallest width or height a resize may produce.
    pub min_object_size: f32,
    pub min_font_size: f32,
    pub max_font_size: f32,
    pub default_canvas_size: Vec2,
    pub min_canvas_size: u32,
    pub max_canvas_size: u32,
    pub background_color: Color32,
    pub border_width: f32,
    /// Undo snapshots kept; the oldest are dropped first.
    pub history_limit: usize,
    pub default_font_family: String,
    pub default_font_size: f32,
    /// GPU textures kept alive by the painter surface.
    pub texture_cache_size: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            handle_size: 10.0,
            rotation_handle_offset: 20.0,
            min_object_size: crate::element::MIN_ELEMENT_SIZE,
            min_font_size: 8.0,
            max_font_size: 72.0,
            default_canvas_size: vec2(1000.0, 700.0),
            min_canvas_size: 100,
            max_canvas_size: 2000,
            background_color: Color32::WHITE,
            border_width: 2.0,
            history_limit: 100,
            default_font_family: "Arial".to_owned(),
            default_font_size: 16.0,
            texture_cache_size: 64,
        }
    }
}

impl EditorConfig {
    pub fn canvas_size_range(&self) -> RangeInclusive<u32> {
        self.min_canvas_size..=self.max_canvas_size
    }

    pub fn clamp_font_size(&self, size: f32) -> f32 {
        size.clamp(self.min_font_size, self.max_font_size)
    }

    pub fn from_json_str(json: &str) -> PersistenceResult<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> PersistenceResult<Self> {
        let json = fs::read_to_string(path.as_ref())
            .map_err(|e| PersistenceError::ReadError(format!("{}: {e}", path.as_ref().display())))?;
        Self::from_json_str(&json)
    }

    fn validate(&self) -> PersistenceResult<()> {
        if !(self.handle_size > 0.0) {
            return Err(PersistenceError::InvalidState("handle_size must be positive".to_owned()));
        }
        if !(self.min_object_size > 0.0) {
            return Err(PersistenceError::InvalidState("min_object_size must be positive".to_owned()));
        }
        if !(self.min_font_size > 0.0 && self.min_font_size <= self.max_font_size) {
            return Err(PersistenceError::InvalidState(format!(
                "font size range {}..={} is empty",
                self.min_font_size, self.max_font_size
            )));
        }
        if self.min_canvas_size == 0 || self.min_canvas_size > self.max_canvas_size {
            return Err(PersistenceError::InvalidState(format!(
                "canvas size range {}..={} is invalid",
                self.min_canvas_size, self.max_canvas_size
            )));
        }
        if self.history_limit == 0 {
            return Err(PersistenceError::InvalidState("history_limit must be at least 1".to_owned()));
        }
        Ok(())
    }
}
