use egui::Color32;
use serde::{Deserialize, Serialize};

use super::{Element, ObjectFrame};
use crate::element::common;
use crate::renderer::{Surface, TextRun};

/// Font selection for a text object.
///
/// The family is a name resolved by the drawing surface; unknown names fall
/// back to the surface's proportional face.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FontSpec {
    pub family: String,
    pub size: f32,
    pub bold: bool,
    pub italic: bool,
}

impl FontSpec {
    pub fn new(family: impl Into<String>, size: f32) -> Self {
        Self {
            family: family.into(),
            size,
            bold: false,
            italic: false,
        }
    }
}

impl Default for FontSpec {
    fn default() -> Self {
        Self::new("Arial", 12.0)
    }
}

fn default_fore_color() -> Color32 {
    Color32::BLACK
}

/// A run of text drawn from the top-left of its bounds.
///
/// Content may contain `[Name]` placeholders; they are kept verbatim here and
/// only substituted when a preview is rendered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextObject {
    text: String,
    #[serde(default)]
    font: FontSpec,
    #[serde(default = "default_fore_color")]
    fore_color: Color32,
}

impl TextObject {
    pub fn new(text: impl Into<String>, font: FontSpec, fore_color: Color32) -> Self {
        Self {
            text: text.into(),
            font,
            fore_color,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    pub fn font(&self) -> &FontSpec {
        &self.font
    }

    pub fn font_size(&self) -> f32 {
        self.font.size
    }

    pub fn set_font_size(&mut self, size: f32) {
        self.font.size = size;
    }

    pub fn set_font_family(&mut self, family: impl Into<String>) {
        self.font.family = family.into();
    }

    pub fn toggle_bold(&mut self) -> bool {
        self.font.bold = !self.font.bold;
        self.font.bold
    }

    pub fn toggle_italic(&mut self) -> bool {
        self.font.italic = !self.font.italic;
        self.font.italic
    }

    pub fn fore_color(&self) -> Color32 {
        self.fore_color
    }

    pub fn set_fore_color(&mut self, color: Color32) {
        self.fore_color = color;
    }
}

impl Default for TextObject {
    fn default() -> Self {
        Self::new(String::new(), FontSpec::default(), default_fore_color())
    }
}

impl Element for TextObject {
    fn element_type(&self) -> &'static str {
        "text"
    }

    fn draw(&self, frame: &ObjectFrame, surface: &mut dyn Surface) {
        if self.text.is_empty() {
            return;
        }
        surface.draw_text(
            frame.bounds.min,
            frame.transform,
            TextRun {
                text: &self.text,
                font: &self.font,
                color: common::with_opacity(self.fore_color, frame.opacity),
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_toggles() {
        let mut text = TextObject::new("hi", FontSpec::new("Arial", 16.0), Color32::BLACK);
        assert!(text.toggle_bold());
        assert!(text.font().bold);
        assert!(!text.toggle_bold());
        assert!(text.toggle_italic());
        assert!(text.font().italic);
    }

    #[test]
    fn test_font_defaults_fill_missing_fields() {
        let font: FontSpec = serde_json::from_str(r#"{"family":"Courier"}"#).unwrap();
        assert_eq!(font.family, "Courier");
        assert_eq!(font.size, 12.0);
        assert!(!font.bold);
    }
}
