use std::ops::RangeInclusive;
use std::str::FromStr;

use egui::{Pos2, Vec2, vec2};
use log::warn;
use serde::{Deserialize, Serialize};

use crate::element::{CanvasObject, ObjectId, ObjectKind, ShapeObject};
use crate::geometry::hit_testing;
use crate::raster::RasterProvider;

/// The label being edited: a canvas size and its objects in z-order.
///
/// Index 0 paints first (bottom); the last object paints on top.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    canvas_size: Vec2,
    objects: Vec<CanvasObject>,
}

impl Document {
    pub fn new(canvas_size: Vec2) -> Self {
        Self {
            canvas_size,
            objects: Vec::new(),
        }
    }

    pub fn canvas_size(&self) -> Vec2 {
        self.canvas_size
    }

    pub fn set_canvas_size(&mut self, size: Vec2) {
        self.canvas_size = size;
    }

    pub fn objects(&self) -> &[CanvasObject] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&CanvasObject> {
        self.objects.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut CanvasObject> {
        self.objects.get_mut(index)
    }

    /// Adds `object` on top and returns its index.
    pub fn push(&mut self, object: CanvasObject) -> usize {
        self.objects.push(object);
        self.objects.len() - 1
    }

    pub fn remove(&mut self, index: usize) -> Option<CanvasObject> {
        (index < self.objects.len()).then(|| self.objects.remove(index))
    }

    /// Moves the object to the end of the sequence (top of the z-order).
    ///
    /// Returns the new index, or `None` when `index` is out of range.
    pub fn bring_to_front(&mut self, index: usize) -> Option<usize> {
        let object = self.remove(index)?;
        Some(self.push(object))
    }

    /// Moves the object to the start of the sequence (bottom of the z-order).
    pub fn send_to_back(&mut self, index: usize) -> Option<usize> {
        let object = self.remove(index)?;
        self.objects.insert(0, object);
        Some(0)
    }

    pub fn index_of(&self, id: ObjectId) -> Option<usize> {
        self.objects.iter().position(|object| object.id() == id)
    }

    /// Replaces every object at once, as undo, redo and load do.
    pub fn replace_objects(&mut self, objects: Vec<CanvasObject>) {
        self.objects = objects;
    }

    pub fn take_objects(&mut self) -> Vec<CanvasObject> {
        std::mem::take(&mut self.objects)
    }

    /// Top-most object whose unrotated bounds contain `pos`.
    pub fn object_at(&self, pos: Pos2) -> Option<usize> {
        hit_testing::object_at(&self.objects, pos)
    }

    /// Removes every shape object, returning how many were removed.
    pub fn remove_shapes(&mut self) -> usize {
        let before = self.objects.len();
        self.objects.retain(|object| !object.is_shape());
        before - self.objects.len()
    }

    /// The bottom-most shape object, if any.
    pub fn first_shape(&self) -> Option<&ShapeObject> {
        self.objects.iter().find_map(|object| match object.kind() {
            ObjectKind::Shape(shape) => Some(shape),
            _ => None,
        })
    }

    /// Brings every derived raster up to date.
    ///
    /// Failures are logged and leave the object drawing as a placeholder.
    /// Returns how many rasters were regenerated.
    pub fn refresh_rasters(&mut self, provider: &dyn RasterProvider) -> usize {
        let mut regenerated = 0;
        for object in &mut self.objects {
            match object.refresh_raster(provider) {
                Ok(true) => regenerated += 1,
                Ok(false) => {}
                Err(err) => warn!("Could not produce raster for {} {}: {err}", object.element_type(), object.id()),
            }
        }
        regenerated
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new(vec2(1000.0, 700.0))
    }
}

/// Units the canvas size may be entered in, at 96 pixels per inch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CanvasUnit {
    #[default]
    Px,
    In,
    Cm,
    Mm,
}

impl CanvasUnit {
    pub const ALL: [CanvasUnit; 4] = [CanvasUnit::Px, CanvasUnit::In, CanvasUnit::Cm, CanvasUnit::Mm];

    pub fn pixels_per_unit(&self) -> f64 {
        match self {
            CanvasUnit::Px => 1.0,
            CanvasUnit::In => 96.0,
            CanvasUnit::Cm => 96.0 / 2.54,
            CanvasUnit::Mm => 96.0 / 25.4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CanvasUnit::Px => "px",
            CanvasUnit::In => "in",
            CanvasUnit::Cm => "cm",
            CanvasUnit::Mm => "mm",
        }
    }

    /// Converts `value` in this unit to whole pixels, clamped to `range`.
    pub fn to_pixels(&self, value: f64, range: &RangeInclusive<u32>) -> u32 {
        let pixels = (value * self.pixels_per_unit()).round();
        if pixels.is_nan() {
            return *range.start();
        }
        pixels.clamp(*range.start() as f64, *range.end() as f64) as u32
    }

    /// Converts a pixel length to this unit, for display.
    pub fn from_pixels(&self, pixels: f64) -> f64 {
        pixels / self.pixels_per_unit()
    }
}

impl FromStr for CanvasUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "px" => Ok(CanvasUnit::Px),
            "in" => Ok(CanvasUnit::In),
            "cm" => Ok(CanvasUnit::Cm),
            "mm" => Ok(CanvasUnit::Mm),
            other => Err(format!("unknown canvas unit: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::factory;
    use egui::{Rect, pos2};

    fn qr(data: &str) -> CanvasObject {
        factory::create_qr_code(data, factory::default_qr_bounds())
    }

    fn data_order(document: &Document) -> Vec<String> {
        document
            .objects()
            .iter()
            .map(|object| match object.kind() {
                ObjectKind::QrCode(qr) => qr.data().to_owned(),
                _ => String::new(),
            })
            .collect()
    }

    #[test]
    fn test_z_order_moves() {
        let mut document = Document::default();
        for data in ["a", "b", "c"] {
            document.push(qr(data));
        }

        assert_eq!(document.bring_to_front(0), Some(2));
        assert_eq!(data_order(&document), ["b", "c", "a"]);

        assert_eq!(document.send_to_back(2), Some(0));
        assert_eq!(data_order(&document), ["a", "b", "c"]);

        assert_eq!(document.bring_to_front(5), None);
        assert_eq!(document.len(), 3);
    }

    #[test]
    fn test_index_of_follows_moves() {
        let mut document = Document::default();
        let first = qr("a");
        let id = first.id();
        document.push(first);
        document.push(qr("b"));
        document.bring_to_front(0);
        assert_eq!(document.index_of(id), Some(1));
        document.remove(1);
        assert_eq!(document.index_of(id), None);
    }

    #[test]
    fn test_remove_shapes() {
        let mut document = Document::default();
        document.push(factory::create_shape("a.svg", document.canvas_size()));
        document.push(qr("x"));
        document.push(factory::create_shape("b.svg", document.canvas_size()));

        assert_eq!(document.first_shape().unwrap().svg_path(), std::path::Path::new("a.svg"));
        assert_eq!(document.remove_shapes(), 2);
        assert_eq!(document.len(), 1);
        assert!(document.first_shape().is_none());
    }

    #[test]
    fn test_object_at_uses_z_order() {
        let mut document = Document::default();
        document.push(factory::create_qr_code("bottom", Rect::from_min_size(pos2(0.0, 0.0), vec2(100.0, 100.0))));
        document.push(factory::create_qr_code("top", Rect::from_min_size(pos2(50.0, 50.0), vec2(100.0, 100.0))));
        assert_eq!(document.object_at(pos2(60.0, 60.0)), Some(1));
        document.send_to_back(1);
        assert_eq!(document.object_at(pos2(60.0, 60.0)), Some(1));
    }

    #[test]
    fn test_canvas_units() {
        let range = 100..=2000;
        assert_eq!(CanvasUnit::In.to_pixels(4.0, &range), 384);
        assert_eq!(CanvasUnit::Cm.to_pixels(10.0, &range), 378);
        assert_eq!(CanvasUnit::Mm.to_pixels(100.0, &range), 378);
        assert_eq!(CanvasUnit::Px.to_pixels(50.0, &range), 100);
        assert_eq!(CanvasUnit::In.to_pixels(100.0, &range), 2000);
        assert_eq!(CanvasUnit::Px.to_pixels(f64::NAN, &range), 100);
        assert!((CanvasUnit::In.from_pixels(192.0) - 2.0).abs() < 1e-9);
        assert_eq!("MM".parse::<CanvasUnit>(), Ok(CanvasUnit::Mm));
        assert!("ft".parse::<CanvasUnit>().is_err());
    }
}
