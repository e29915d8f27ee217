use egui::epaint::{TextShape, Vertex};
use egui::text::{LayoutJob, TextFormat};
use egui::{Color32, FontFamily, FontId, Mesh, Painter, Pos2, Rect, Shape, Stroke, Vec2, pos2};

use super::{Surface, TextRun};
use crate::geometry::ObjectTransform;
use crate::raster::Raster;
use crate::texture_manager::TextureManager;

/// Horizontal shift of the second pass used to embolden text.
const FAUX_BOLD_OFFSET: f32 = 0.6;

/// Draws into an egui [`Painter`], with the canvas origin at `canvas.min`.
pub struct PainterSurface<'a> {
    painter: &'a Painter,
    textures: &'a mut TextureManager,
    canvas: Rect,
}

impl<'a> PainterSurface<'a> {
    pub fn new(painter: &'a Painter, textures: &'a mut TextureManager, canvas: Rect) -> Self {
        Self {
            painter,
            textures,
            canvas,
        }
    }

    fn offset(&self) -> Vec2 {
        self.canvas.min.to_vec2()
    }

    fn screen_corners(&self, rect: Rect, transform: ObjectTransform) -> Vec<Pos2> {
        let offset = self.offset();
        transform.corners(rect).iter().map(|p| *p + offset).collect()
    }

    // Unknown family names fall back to the default proportional face.
    fn resolve_family(&self, name: &str) -> FontFamily {
        let wanted = FontFamily::Name(name.into());
        let known = self.painter.ctx().fonts(|fonts| fonts.families());
        if known.contains(&wanted) {
            wanted
        } else {
            FontFamily::Proportional
        }
    }
}

impl Surface for PainterSurface<'_> {
    fn clear(&mut self, color: Color32) {
        self.painter.rect_filled(self.canvas, 0.0, color);
    }

    fn fill_rect(&mut self, rect: Rect, transform: ObjectTransform, color: Color32) {
        let points = self.screen_corners(rect, transform);
        self.painter.add(Shape::convex_polygon(points, color, Stroke::NONE));
    }

    fn stroke_rect(&mut self, rect: Rect, transform: ObjectTransform, stroke: Stroke) {
        let points = self.screen_corners(rect, transform);
        self.painter.add(Shape::closed_line(points, stroke));
    }

    fn draw_text(&mut self, origin: Pos2, transform: ObjectTransform, run: TextRun<'_>) {
        let format = TextFormat {
            font_id: FontId::new(run.font.size, self.resolve_family(&run.font.family)),
            color: run.color,
            italics: run.font.italic,
            ..Default::default()
        };
        let job = LayoutJob::single_section(run.text.to_owned(), format);
        let galley = self.painter.layout_job(job);

        // TextShape rotates about its own position, so place the rotated
        // top-left corner and turn the galley by the same angle.
        let pos = transform.apply(origin) + self.offset();
        let angle = transform.radians();
        if run.font.bold {
            let shift = ObjectTransform::new(Pos2::ZERO, transform.degrees).apply(pos2(FAUX_BOLD_OFFSET, 0.0));
            self.painter.add(TextShape::new(pos + shift.to_vec2(), galley.clone(), run.color).with_angle(angle));
        }
        self.painter.add(TextShape::new(pos, galley, run.color).with_angle(angle));
    }

    fn draw_raster(&mut self, rect: Rect, transform: ObjectTransform, raster: &Raster, tint: Color32) {
        let texture = self.textures.texture_for(self.painter.ctx(), raster);
        let corners = self.screen_corners(rect, transform);
        let uvs = [pos2(0.0, 0.0), pos2(1.0, 0.0), pos2(1.0, 1.0), pos2(0.0, 1.0)];

        let mut mesh = Mesh::with_texture(texture);
        for (pos, uv) in corners.into_iter().zip(uvs) {
            mesh.vertices.push(Vertex { pos, uv, color: tint });
        }
        mesh.add_triangle(0, 1, 2);
        mesh.add_triangle(0, 2, 3);
        self.painter.add(Shape::mesh(mesh));
    }
}
