use serde::{Serialize, Deserialize};
use std::collections::HashSet;
use std::fs;
use std::ops::RangeInclusive;
use std::path::Path;
use thiserror::Error;
use egui::vec2;
use log::info;

use crate::document::Document;
use crate::element::CanvasObject;

/// Errors that can occur while reading or writing design files
#[derive(Debug, Error)]
pub enum PersistenceError {
    #[error("Failed to serialize state: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Failed to write state: {0}")]
    WriteError(#[from] std::io::Error),

    #[error("Failed to read state file: {0}")]
    ReadError(String),

    #[error("Invalid state data: {0}")]
    InvalidState(String),
}

/// Result type for persistence operations
pub type PersistenceResult<T> = Result<T, PersistenceError>;

pub const DESIGN_FILE_VERSION: u32 = 1;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CanvasSize {
    pub width: f32,
    pub height: f32,
}

/// On-disk form of a [`Document`].
///
/// Objects carry a `type` tag so each one loads back as the same variant.
/// Rasters are never stored; they are regenerated from source fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DesignFile {
    #[serde(default = "default_version")]
    pub version: u32,
    pub canvas_size: CanvasSize,
    #[serde(default)]
    pub objects: Vec<CanvasObject>,
}

fn default_version() -> u32 {
    DESIGN_FILE_VERSION
}

impl DesignFile {
    pub fn from_document(document: &Document) -> Self {
        let size = document.canvas_size();
        Self {
            version: DESIGN_FILE_VERSION,
            canvas_size: CanvasSize {
                width: size.x,
                height: size.y,
            },
            objects: document.objects().to_vec(),
        }
    }

    /// Checks the structure and builds a document from it.
    pub fn into_document(self, canvas_range: &RangeInclusive<u32>) -> PersistenceResult<Document> {
        if self.version > DESIGN_FILE_VERSION {
            return Err(PersistenceError::InvalidState(format!(
                "unsupported design file version {}",
                self.version
            )));
        }

        let CanvasSize { width, height } = self.canvas_size;
        let min = *canvas_range.start() as f32;
        let max = *canvas_range.end() as f32;
        for (name, value) in [("width", width), ("height", height)] {
            if !(min..=max).contains(&value) {
                return Err(PersistenceError::InvalidState(format!(
                    "canvas {name} {value} is outside {min}..={max}"
                )));
            }
        }

        let mut seen = HashSet::with_capacity(self.objects.len());
        for (index, object) in self.objects.iter().enumerate() {
            object
                .check_consistency()
                .map_err(|reason| PersistenceError::InvalidState(format!("object {index}: {reason}")))?;
            if !seen.insert(object.id()) {
                return Err(PersistenceError::InvalidState(format!(
                    "object {index} repeats id {}",
                    object.id()
                )));
            }
        }

        let mut document = Document::new(vec2(width, height));
        document.replace_objects(self.objects);
        Ok(document)
    }
}

pub fn to_json(document: &Document) -> PersistenceResult<String> {
    Ok(serde_json::to_string_pretty(&DesignFile::from_document(document))?)
}

pub fn from_json(json: &str, canvas_range: &RangeInclusive<u32>) -> PersistenceResult<Document> {
    let file: DesignFile = serde_json::from_str(json)?;
    file.into_document(canvas_range)
}

pub fn save(document: &Document, path: impl AsRef<Path>) -> PersistenceResult<()> {
    let path = path.as_ref();
    fs::write(path, to_json(document)?)?;
    info!("Saved {} objects to {}", document.len(), path.display());
    Ok(())
}

pub fn load(path: impl AsRef<Path>, canvas_range: &RangeInclusive<u32>) -> PersistenceResult<Document> {
    let path = path.as_ref();
    let json = fs::read_to_string(path)
        .map_err(|e| PersistenceError::ReadError(format!("{}: {e}", path.display())))?;
    let document = from_json(&json, canvas_range)?;
    info!("Loaded {} objects from {}", document.len(), path.display());
    Ok(document)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::factory;
    use egui::{Rect, pos2};

    const RANGE: RangeInclusive<u32> = 100..=2000;

    #[test]
    fn test_round_trip_keeps_order_and_size() {
        let mut document = Document::new(vec2(400.0, 300.0));
        document.push(factory::create_custom_text("Arial", 16.0));
        document.push(factory::create_qr_code("abc", factory::default_qr_bounds()));

        let json = to_json(&document).unwrap();
        let loaded = from_json(&json, &RANGE).unwrap();
        assert_eq!(loaded.canvas_size(), vec2(400.0, 300.0));
        assert_eq!(loaded.objects(), document.objects());
    }

    #[test]
    fn test_canvas_out_of_range_rejected() {
        let json = r#"{"canvas_size": {"width": 50.0, "height": 300.0}, "objects": []}"#;
        assert!(matches!(from_json(json, &RANGE), Err(PersistenceError::InvalidState(_))));
    }

    #[test]
    fn test_unknown_variant_rejected() {
        let json = r#"{"canvas_size": {"width": 500.0, "height": 300.0},
            "objects": [{"bounds": {"min": {"x": 0.0, "y": 0.0}, "max": {"x": 10.0, "y": 10.0}},
                         "kind": {"type": "Ellipse"}}]}"#;
        assert!(matches!(from_json(json, &RANGE), Err(PersistenceError::SerializationError(_))));
    }

    #[test]
    fn test_newer_version_rejected() {
        let json = r#"{"version": 99, "canvas_size": {"width": 500.0, "height": 300.0}}"#;
        assert!(matches!(from_json(json, &RANGE), Err(PersistenceError::InvalidState(_))));
    }

    #[test]
    fn test_file_round_trip() {
        let path = std::env::temp_dir().join(format!("label_canvas_{}.json", uuid::Uuid::new_v4()));
        let mut document = Document::default();
        document.push(factory::create_qr_code("x", Rect::from_min_size(pos2(1.0, 2.0), vec2(30.0, 40.0))));
        save(&document, &path).unwrap();
        let loaded = load(&path, &RANGE).unwrap();
        let _ = fs::remove_file(&path);
        assert_eq!(loaded.objects(), document.objects());
    }

    #[test]
    fn test_missing_file_is_read_error() {
        assert!(matches!(
            load("/no/such/design.json", &RANGE),
            Err(PersistenceError::ReadError(_))
        ));
    }
}
