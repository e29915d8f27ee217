use std::fmt;

use egui::{Color32, Rect};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Smallest width or height an interactive resize may produce.
pub const MIN_ELEMENT_SIZE: f32 = 20.0;

/// Fill used when an image, QR code or shape has no raster to show.
pub(crate) const PLACEHOLDER_FILL: Color32 = Color32::from_gray(200);
pub(crate) const PLACEHOLDER_STROKE: Color32 = Color32::from_gray(100);

/// Stable identity of a canvas object.
///
/// Persisted with the object, so it survives undo/redo and save/load. Used by
/// asynchronous collaborators to find their target again; the selection
/// itself is an index and never relies on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ObjectId(Uuid);

impl ObjectId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ObjectId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ObjectId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Scales a color's alpha by the object's opacity.
pub(crate) fn with_opacity(color: Color32, opacity: f32) -> Color32 {
    if opacity >= 1.0 {
        color
    } else {
        color.gamma_multiply(opacity.clamp(0.0, 1.0))
    }
}

/// True when every coordinate of `rect` is a finite number.
pub(crate) fn is_finite_rect(rect: &Rect) -> bool {
    rect.min.x.is_finite() && rect.min.y.is_finite() && rect.max.x.is_finite() && rect.max.y.is_finite()
}

pub(crate) fn default_opacity() -> f32 {
    1.0
}

pub(crate) fn default_stroke_color() -> Color32 {
    Color32::BLACK
}
