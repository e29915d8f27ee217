//! Render pipeline.
//!
//! Drawing goes through the [`Surface`] trait so the pipeline can target an
//! egui [`egui::Painter`] on screen ([`PainterSurface`]) or anything else that
//! can fill, stroke, lay out text and blit images under a rotation.

use egui::{Color32, Pos2, Rect, Stroke, Vec2};

use crate::config::EditorConfig;
use crate::document::Document;
use crate::element::FontSpec;
use crate::geometry::ObjectTransform;
use crate::gizmo;
use crate::raster::Raster;
use crate::variables::VariableMap;

mod painter;

pub use painter::PainterSurface;

/// A run of text to lay out from a top-left origin.
#[derive(Debug, Clone, Copy)]
pub struct TextRun<'a> {
    pub text: &'a str,
    pub font: &'a FontSpec,
    pub color: Color32,
}

/// A 2-D drawing target in canvas coordinates.
///
/// Geometry is passed unrotated together with the transform to apply, so
/// every primitive of one object turns about the same pivot.
pub trait Surface {
    /// Fill the whole canvas extent.
    fn clear(&mut self, color: Color32);

    fn fill_rect(&mut self, rect: Rect, transform: ObjectTransform, color: Color32);

    fn stroke_rect(&mut self, rect: Rect, transform: ObjectTransform, stroke: Stroke);

    fn draw_text(&mut self, origin: Pos2, transform: ObjectTransform, run: TextRun<'_>);

    /// Stretch `raster` over `rect`, multiplied by `tint`.
    fn draw_raster(&mut self, rect: Rect, transform: ObjectTransform, raster: &Raster, tint: Color32);
}

/// Draws a document: background, objects back to front, selection handles, border.
#[derive(Debug, Clone)]
pub struct Renderer {
    background: Color32,
    border: Stroke,
    handle_size: f32,
    rotation_handle_offset: f32,
}

impl Renderer {
    pub fn new(config: &EditorConfig) -> Self {
        Self {
            background: config.background_color,
            border: Stroke::new(config.border_width, Color32::BLACK),
            handle_size: config.handle_size,
            rotation_handle_offset: config.rotation_handle_offset,
        }
    }

    /// Renders the editing view, with handles around `selection` if any.
    pub fn render(&self, document: &Document, selection: Option<usize>, surface: &mut dyn Surface) {
        surface.clear(self.background);
        for object in document.objects() {
            object.draw(surface);
        }
        if let Some(object) = selection.and_then(|index| document.get(index)) {
            let handles = gizmo::compute_handles(
                object.bounds(),
                object.rotation(),
                self.handle_size,
                self.rotation_handle_offset,
            );
            for (_, rect) in handles.iter() {
                surface.fill_rect(rect, ObjectTransform::IDENTITY, Color32::WHITE);
                surface.stroke_rect(rect, ObjectTransform::IDENTITY, Stroke::new(1.0, Color32::BLACK));
            }
        }
        self.draw_border(document.canvas_size(), surface);
    }

    /// Renders what would be printed: placeholders substituted, no handles.
    pub fn render_preview(&self, document: &Document, vars: &VariableMap, surface: &mut dyn Surface) {
        surface.clear(self.background);
        for object in document.objects() {
            object.substituted(vars).draw(surface);
        }
        self.draw_border(document.canvas_size(), surface);
    }

    fn draw_border(&self, canvas_size: Vec2, surface: &mut dyn Surface) {
        if self.border.width > 0.0 {
            surface.stroke_rect(
                Rect::from_min_size(Pos2::ZERO, canvas_size),
                ObjectTransform::IDENTITY,
                self.border,
            );
        }
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new(&EditorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::factory;
    use egui::{pos2, vec2};

    #[derive(Debug, PartialEq)]
    enum Call {
        Clear,
        Fill(Rect, f32),
        Stroke(Rect),
        Text(String, f32),
        Raster,
    }

    #[derive(Default)]
    struct Recorder(Vec<Call>);

    impl Surface for Recorder {
        fn clear(&mut self, _color: Color32) {
            self.0.push(Call::Clear);
        }
        fn fill_rect(&mut self, rect: Rect, transform: ObjectTransform, _color: Color32) {
            self.0.push(Call::Fill(rect, transform.degrees));
        }
        fn stroke_rect(&mut self, rect: Rect, _transform: ObjectTransform, _stroke: Stroke) {
            self.0.push(Call::Stroke(rect));
        }
        fn draw_text(&mut self, _origin: Pos2, transform: ObjectTransform, run: TextRun<'_>) {
            self.0.push(Call::Text(run.text.to_owned(), transform.degrees));
        }
        fn draw_raster(&mut self, _rect: Rect, _transform: ObjectTransform, _raster: &Raster, _tint: Color32) {
            self.0.push(Call::Raster);
        }
    }

    fn document_with_text() -> Document {
        let mut document = Document::new(vec2(400.0, 300.0));
        let mut text = factory::create_variable_text("RO # [RONumber]", "Arial", 16.0);
        text.set_rotation(30.0);
        document.push(text);
        document
    }

    #[test]
    fn test_render_order() {
        let document = document_with_text();
        let mut surface = Recorder::default();
        Renderer::default().render(&document, None, &mut surface);

        assert_eq!(surface.0.first(), Some(&Call::Clear));
        assert_eq!(surface.0[1], Call::Text("RO # [RONumber]".to_owned(), 30.0));
        assert_eq!(
            surface.0.last(),
            Some(&Call::Stroke(Rect::from_min_size(Pos2::ZERO, vec2(400.0, 300.0))))
        );
        assert_eq!(surface.0.len(), 3);
    }

    #[test]
    fn test_selection_draws_nine_handles() {
        let document = document_with_text();
        let mut surface = Recorder::default();
        Renderer::default().render(&document, Some(0), &mut surface);

        let handle_fills = surface
            .0
            .iter()
            .filter(|call| matches!(call, Call::Fill(rect, degrees) if rect.width() == 10.0 && *degrees == 0.0))
            .count();
        assert_eq!(handle_fills, 9);
    }

    #[test]
    fn test_stale_selection_is_ignored() {
        let document = document_with_text();
        let mut surface = Recorder::default();
        Renderer::default().render(&document, Some(7), &mut surface);
        assert_eq!(surface.0.len(), 3);
    }

    #[test]
    fn test_preview_substitutes_without_handles() {
        let document = document_with_text();
        let vars = VariableMap::from([("RONumber".to_owned(), "1523".to_owned())]);
        let mut surface = Recorder::default();
        Renderer::default().render_preview(&document, &vars, &mut surface);

        assert_eq!(surface.0[1], Call::Text("RO # 1523".to_owned(), 30.0));
        assert_eq!(surface.0.len(), 3);
    }

    #[test]
    fn test_placeholder_for_missing_raster() {
        let mut document = Document::new(vec2(400.0, 300.0));
        let bounds = Rect::from_min_size(pos2(10.0, 10.0), vec2(50.0, 50.0));
        document.push(factory::create_qr_code("x", bounds));
        let mut surface = Recorder::default();
        Renderer::default().render(&document, None, &mut surface);

        assert_eq!(surface.0[1], Call::Fill(bounds, 0.0));
        assert_eq!(surface.0[2], Call::Stroke(bounds));
    }
}
