use std::borrow::Cow;

use egui::{Color32, Pos2, Rect, Stroke, Vec2};
use serde::{Deserialize, Serialize};

mod common;
pub(crate) mod image;
pub(crate) mod qr_code;
pub(crate) mod shape;
pub(crate) mod text;

pub use common::{MIN_ELEMENT_SIZE, ObjectId};
pub use image::ImageObject;
pub use qr_code::QrCodeObject;
pub use shape::ShapeObject;
pub use text::{FontSpec, TextObject};

use crate::geometry::{ObjectTransform, to_object_space};
use crate::raster::{RasterError, RasterProvider};
use crate::renderer::Surface;
use crate::variables::{self, VariableMap};

/// The draw capability shared by every object variant.
pub trait Element {
    /// Get the element type as a string
    fn element_type(&self) -> &'static str;

    /// Draw the variant's content inside `frame`.
    ///
    /// The frame already carries the object's rotation; implementations lay
    /// out geometry in unrotated coordinates and pass the transform through.
    fn draw(&self, frame: &ObjectFrame, surface: &mut dyn Surface);

    /// Bring any derived raster up to date with the source fields and `bounds`.
    ///
    /// Returns `true` when a new raster was produced.
    fn refresh_raster(&mut self, _bounds: Rect, _provider: &dyn RasterProvider) -> Result<bool, RasterError> {
        Ok(false)
    }
}

/// Where and how an object is drawn this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectFrame {
    pub bounds: Rect,
    pub transform: ObjectTransform,
    pub opacity: f32,
}

/// Variant payload of a canvas object.
///
/// Persisted with a `type` tag so every object comes back as the variant it
/// was saved as.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum ObjectKind {
    Text(TextObject),
    Image(ImageObject),
    QrCode(QrCodeObject),
    Shape(ShapeObject),
}

impl Element for ObjectKind {
    fn element_type(&self) -> &'static str {
        match self {
            ObjectKind::Text(t) => t.element_type(),
            ObjectKind::Image(i) => i.element_type(),
            ObjectKind::QrCode(q) => q.element_type(),
            ObjectKind::Shape(s) => s.element_type(),
        }
    }

    fn draw(&self, frame: &ObjectFrame, surface: &mut dyn Surface) {
        match self {
            ObjectKind::Text(t) => t.draw(frame, surface),
            ObjectKind::Image(i) => i.draw(frame, surface),
            ObjectKind::QrCode(q) => q.draw(frame, surface),
            ObjectKind::Shape(s) => s.draw(frame, surface),
        }
    }

    fn refresh_raster(&mut self, bounds: Rect, provider: &dyn RasterProvider) -> Result<bool, RasterError> {
        match self {
            ObjectKind::Text(t) => t.refresh_raster(bounds, provider),
            ObjectKind::Image(i) => i.refresh_raster(bounds, provider),
            ObjectKind::QrCode(q) => q.refresh_raster(bounds, provider),
            ObjectKind::Shape(s) => s.refresh_raster(bounds, provider),
        }
    }
}

/// One item on the canvas: shared geometry and style plus a variant payload.
///
/// `bounds` is the rectangle before rotation; `rotation` (degrees) is applied
/// about its center when drawing. The object itself does not enforce a
/// minimum size, the interaction controller does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanvasObject {
    #[serde(default)]
    id: ObjectId,
    bounds: Rect,
    #[serde(default)]
    rotation: f32,
    #[serde(default = "common::default_opacity")]
    opacity: f32,
    #[serde(default = "common::default_stroke_color")]
    stroke_color: Color32,
    #[serde(default)]
    fill_color: Color32,
    #[serde(default)]
    stroke_width: f32,
    kind: ObjectKind,
}

impl CanvasObject {
    pub fn new(bounds: Rect, kind: ObjectKind) -> Self {
        Self {
            id: ObjectId::new(),
            bounds,
            rotation: 0.0,
            opacity: common::default_opacity(),
            stroke_color: common::default_stroke_color(),
            fill_color: Color32::TRANSPARENT,
            stroke_width: 0.0,
            kind,
        }
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    pub fn set_bounds(&mut self, bounds: Rect) {
        self.bounds = bounds;
    }

    pub fn translate(&mut self, delta: Vec2) {
        self.bounds = self.bounds.translate(delta);
    }

    pub fn rotation(&self) -> f32 {
        self.rotation
    }

    pub fn set_rotation(&mut self, degrees: f32) {
        self.rotation = degrees;
    }

    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    pub fn stroke_color(&self) -> Color32 {
        self.stroke_color
    }

    pub fn set_stroke_color(&mut self, color: Color32) {
        self.stroke_color = color;
    }

    pub fn fill_color(&self) -> Color32 {
        self.fill_color
    }

    pub fn set_fill_color(&mut self, color: Color32) {
        self.fill_color = color;
    }

    pub fn stroke_width(&self) -> f32 {
        self.stroke_width
    }

    pub fn set_stroke_width(&mut self, width: f32) {
        self.stroke_width = width.max(0.0);
    }

    pub fn kind(&self) -> &ObjectKind {
        &self.kind
    }

    pub fn kind_mut(&mut self) -> &mut ObjectKind {
        &mut self.kind
    }

    pub fn element_type(&self) -> &'static str {
        self.kind.element_type()
    }

    pub fn as_text(&self) -> Option<&TextObject> {
        match &self.kind {
            ObjectKind::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn as_text_mut(&mut self) -> Option<&mut TextObject> {
        match &mut self.kind {
            ObjectKind::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self.kind, ObjectKind::Text(_))
    }

    pub fn is_shape(&self) -> bool {
        matches!(self.kind, ObjectKind::Shape(_))
    }

    /// The rotation this object is drawn with.
    pub fn transform(&self) -> ObjectTransform {
        ObjectTransform::for_bounds(self.bounds, self.rotation)
    }

    pub fn frame(&self) -> ObjectFrame {
        ObjectFrame {
            bounds: self.bounds,
            transform: self.transform(),
            opacity: self.opacity,
        }
    }

    /// `point` in this object's unrotated frame, top-left of `bounds` at the origin.
    pub fn to_object_space(&self, point: Pos2) -> Pos2 {
        to_object_space(point, self.bounds, self.rotation)
    }

    /// Draws fill, content and outline, all rotated about the bounds center.
    pub fn draw(&self, surface: &mut dyn Surface) {
        let frame = self.frame();
        if self.fill_color.a() > 0 {
            surface.fill_rect(
                frame.bounds,
                frame.transform,
                common::with_opacity(self.fill_color, self.opacity),
            );
        }
        self.kind.draw(&frame, surface);
        if self.stroke_width > 0.0 && self.stroke_color.a() > 0 {
            surface.stroke_rect(
                frame.bounds,
                frame.transform,
                Stroke::new(
                    self.stroke_width,
                    common::with_opacity(self.stroke_color, self.opacity),
                ),
            );
        }
    }

    pub fn refresh_raster(&mut self, provider: &dyn RasterProvider) -> Result<bool, RasterError> {
        self.kind.refresh_raster(self.bounds, provider)
    }

    /// This object with `[Name]` placeholders in its text replaced.
    ///
    /// Borrowed unchanged unless it is text and something was substituted.
    pub fn substituted(&self, vars: &VariableMap) -> Cow<'_, CanvasObject> {
        let Some(text) = self.as_text() else {
            return Cow::Borrowed(self);
        };
        match variables::substitute(text.text(), vars) {
            Cow::Borrowed(_) => Cow::Borrowed(self),
            Cow::Owned(replaced) => {
                let mut object = self.clone();
                if let Some(text) = object.as_text_mut() {
                    text.set_text(replaced);
                }
                Cow::Owned(object)
            }
        }
    }

    /// Checks the invariants a loaded object must hold, naming the first one broken.
    pub(crate) fn check_consistency(&self) -> Result<(), String> {
        if !common::is_finite_rect(&self.bounds) || !self.rotation.is_finite() {
            return Err("non-finite geometry".to_owned());
        }
        if self.bounds.min.x > self.bounds.max.x || self.bounds.min.y > self.bounds.max.y {
            return Err(format!("inverted bounds {:?}", self.bounds));
        }
        if !(0.0..=1.0).contains(&self.opacity) {
            return Err(format!("opacity {} is outside 0..=1", self.opacity));
        }
        if !(self.stroke_width.is_finite() && self.stroke_width >= 0.0) {
            return Err(format!("stroke width {} is negative", self.stroke_width));
        }
        if let Some(text) = self.as_text() {
            let size = text.font_size();
            if !(size.is_finite() && size > 0.0) {
                return Err(format!("font size {size} is not positive"));
            }
        }
        Ok(())
    }
}

/// Factory functions for creating canvas objects with their usual defaults
pub mod factory {
    use std::path::PathBuf;

    use egui::{Color32, Pos2, Rect, Vec2, pos2, vec2};

    use super::*;
    use crate::raster::Raster;

    /// Where new text objects are placed.
    pub fn default_text_bounds() -> Rect {
        Rect::from_min_size(pos2(150.0, 150.0), vec2(200.0, 30.0))
    }

    /// Where new QR codes are placed.
    pub fn default_qr_bounds() -> Rect {
        Rect::from_min_size(pos2(100.0, 100.0), vec2(150.0, 150.0))
    }

    /// Top-left corner of newly added images.
    pub const IMAGE_ORIGIN: Pos2 = pos2(100.0, 100.0);

    pub const CUSTOM_TEXT: &str = "New Custom Text";

    /// Create a new text element
    pub fn create_text(text: impl Into<String>, font: FontSpec, color: Color32, bounds: Rect) -> CanvasObject {
        CanvasObject::new(bounds, ObjectKind::Text(TextObject::new(text, font, color)))
    }

    /// The free-form text object added from the toolbar.
    pub fn create_custom_text(font_family: &str, font_size: f32) -> CanvasObject {
        create_text(
            CUSTOM_TEXT,
            FontSpec::new(font_family, font_size),
            Color32::BLACK,
            default_text_bounds(),
        )
    }

    /// A text object holding one of the preset variable labels.
    pub fn create_variable_text(label: &str, font_family: &str, font_size: f32) -> CanvasObject {
        create_text(
            label,
            FontSpec::new(font_family, font_size),
            Color32::BLACK,
            default_text_bounds(),
        )
    }

    /// Decodes `path` and sizes the object to the image.
    ///
    /// Nothing is created when the file is missing or cannot be decoded.
    pub fn create_image(path: impl Into<PathBuf>, provider: &dyn RasterProvider) -> Result<CanvasObject, RasterError> {
        let path = path.into();
        let image = provider.decode_image(&path)?;
        let [w, h] = image.size;
        if w == 0 || h == 0 {
            return Err(RasterError::InvalidDimensions(w, h));
        }
        let bounds = Rect::from_min_size(IMAGE_ORIGIN, vec2(w as f32, h as f32));
        let object = ImageObject::with_raster(path, Raster::new(image));
        Ok(CanvasObject::new(bounds, ObjectKind::Image(object)))
    }

    pub fn create_qr_code(data: impl Into<String>, bounds: Rect) -> CanvasObject {
        CanvasObject::new(bounds, ObjectKind::QrCode(QrCodeObject::new(data)))
    }

    /// A vector background covering the whole canvas.
    pub fn create_shape(svg_path: impl Into<PathBuf>, canvas_size: Vec2) -> CanvasObject {
        CanvasObject::new(
            Rect::from_min_size(Pos2::ZERO, canvas_size),
            ObjectKind::Shape(ShapeObject::new(svg_path)),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::{pos2, vec2};

    #[test]
    fn test_kind_is_tagged_in_json() {
        let object = factory::create_qr_code("abc", factory::default_qr_bounds());
        let json = serde_json::to_value(&object).unwrap();
        assert_eq!(json["kind"]["type"], "QrCode");
        assert_eq!(json["kind"]["data"], "abc");
    }

    #[test]
    fn test_defaults_applied_to_sparse_json() {
        let json = r#"{
            "bounds": {"min": {"x": 0.0, "y": 0.0}, "max": {"x": 40.0, "y": 30.0}},
            "kind": {"type": "Text", "text": "hi"}
        }"#;
        let object: CanvasObject = serde_json::from_str(json).unwrap();
        assert_eq!(object.opacity(), 1.0);
        assert_eq!(object.rotation(), 0.0);
        assert_eq!(object.stroke_color(), Color32::BLACK);
        assert_eq!(object.fill_color(), Color32::TRANSPARENT);
        let text = object.as_text().unwrap();
        assert_eq!(text.font().family, "Arial");
        assert_eq!(text.font_size(), 12.0);
    }

    #[test]
    fn test_custom_text_defaults() {
        let object = factory::create_custom_text("Arial", 16.0);
        assert_eq!(object.bounds(), Rect::from_min_size(pos2(150.0, 150.0), vec2(200.0, 30.0)));
        let text = object.as_text().unwrap();
        assert_eq!(text.text(), "New Custom Text");
        assert_eq!(text.font_size(), 16.0);
    }

    #[test]
    fn test_shape_covers_canvas() {
        let object = factory::create_shape("bg.svg", vec2(640.0, 480.0));
        assert_eq!(object.bounds(), Rect::from_min_size(Pos2::ZERO, vec2(640.0, 480.0)));
        assert!(object.is_shape());
    }

    #[test]
    fn test_opacity_is_clamped() {
        let mut object = factory::create_qr_code("x", factory::default_qr_bounds());
        object.set_opacity(1.5);
        assert_eq!(object.opacity(), 1.0);
        object.set_opacity(-0.5);
        assert_eq!(object.opacity(), 0.0);
    }

    #[test]
    fn test_substituted_borrows_when_unchanged() {
        let vars = VariableMap::from([("Mileage".to_owned(), "10005".to_owned())]);
        let qr = factory::create_qr_code("[Mileage]", factory::default_qr_bounds());
        assert!(matches!(qr.substituted(&vars), Cow::Borrowed(_)));

        let text = factory::create_variable_text("Mileage: [Mileage]", "Arial", 16.0);
        let preview = text.substituted(&vars);
        assert_eq!(preview.as_text().unwrap().text(), "Mileage: 10005");
        assert_eq!(text.as_text().unwrap().text(), "Mileage: [Mileage]");
    }

    #[test]
    fn test_ids_are_unique_and_persisted() {
        let a = factory::create_custom_text("Arial", 16.0);
        let b = factory::create_custom_text("Arial", 16.0);
        assert_ne!(a.id(), b.id());

        let json = serde_json::to_string(&a).unwrap();
        let back: CanvasObject = serde_json::from_str(&json).unwrap();
        assert_eq!(back.id(), a.id());
        assert_eq!(back, a);
    }
}
