mod history;

use std::path::PathBuf;

use egui::Color32;
use log::warn;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::config::EditorConfig;
use crate::document::Document;
use crate::element::{CanvasObject, TextObject, factory};
use crate::raster::{RasterError, RasterProvider};
use crate::tools::{ContextAction, SelectionTool};

pub use history::{CommandHistory, HistoryError, Snapshot};

/// Result type for command operations
pub type CommandResult = Result<(), CommandError>;

/// Errors that can occur during command execution
///
/// A failed command leaves the document as it was.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error("no object is selected")]
    NoSelection,

    #[error("selected object is {found}, expected {expected}")]
    WrongKind {
        expected: &'static str,
        found: &'static str,
    },

    #[error(transparent)]
    Resource(#[from] RasterError),
}

/// What a command may touch while it runs.
pub struct CommandContext<'a> {
    pub document: &'a mut Document,
    pub tool: &'a mut SelectionTool,
    pub config: &'a EditorConfig,
    pub rasters: &'a dyn RasterProvider,
}

impl CommandContext<'_> {
    fn selected_index(&self) -> Result<usize, CommandError> {
        self.tool
            .selected()
            .filter(|&index| index < self.document.len())
            .ok_or(CommandError::NoSelection)
    }

    fn selected_object(&mut self) -> Result<&mut CanvasObject, CommandError> {
        let index = self.selected_index()?;
        self.document.get_mut(index).ok_or(CommandError::NoSelection)
    }

    fn selected_text(&mut self) -> Result<&mut TextObject, CommandError> {
        let object = self.selected_object()?;
        let found = object.element_type();
        object.as_text_mut().ok_or(CommandError::WrongKind {
            expected: "text",
            found,
        })
    }
}

/// Discrete user actions. Each one is followed by exactly one history
/// checkpoint when it succeeds.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Command {
    /// Add "New Custom Text" and select it
    AddCustomText,
    /// Add a text object holding a preset variable label
    InsertVariable { label: String },
    /// Add an image, sized to the decoded file
    AddImage { path: PathBuf },
    /// Add a QR code encoding `data`
    AddQrCode { data: String },
    /// Replace the vector background with `svg_path`
    AddShape { svg_path: PathBuf },

    SetText(String),
    SetFontFamily(String),
    /// Clamped to the configured font size range
    SetFontSize(f32),
    ToggleBold,
    ToggleItalic,
    SetForeColor(Color32),

    SetOpacity(f32),
    SetFillColor(Color32),
    SetStrokeColor(Color32),
    SetStrokeWidth(f32),

    /// Move the selection to the top of the z-order
    BringForward,
    /// Move the selection to the bottom of the z-order
    SendBackward,
    Delete,
}

impl Command {
    pub fn name(&self) -> &'static str {
        match self {
            Command::AddCustomText => "add custom text",
            Command::InsertVariable { .. } => "insert variable",
            Command::AddImage { .. } => "add image",
            Command::AddQrCode { .. } => "add QR code",
            Command::AddShape { .. } => "add shape",
            Command::SetText(_) => "set text",
            Command::SetFontFamily(_) => "set font family",
            Command::SetFontSize(_) => "set font size",
            Command::ToggleBold => "toggle bold",
            Command::ToggleItalic => "toggle italic",
            Command::SetForeColor(_) => "set text color",
            Command::SetOpacity(_) => "set opacity",
            Command::SetFillColor(_) => "set fill color",
            Command::SetStrokeColor(_) => "set stroke color",
            Command::SetStrokeWidth(_) => "set stroke width",
            Command::BringForward => "bring forward",
            Command::SendBackward => "send backward",
            Command::Delete => "delete",
        }
    }

    /// Runs the command against `ctx`.
    pub fn execute(&self, ctx: &mut CommandContext<'_>) -> CommandResult {
        match self {
            Command::AddCustomText => {
                let object = factory::create_custom_text(&ctx.config.default_font_family, ctx.config.default_font_size);
                let index = ctx.document.push(object);
                ctx.tool.select(Some(index));
            }
            Command::InsertVariable { label } => {
                let object = factory::create_variable_text(
                    label,
                    &ctx.config.default_font_family,
                    ctx.config.default_font_size,
                );
                ctx.document.push(object);
            }
            Command::AddImage { path } => {
                let object = factory::create_image(path.clone(), ctx.rasters)?;
                ctx.document.push(object);
            }
            Command::AddQrCode { data } => {
                if data.is_empty() {
                    return Err(RasterError::EmptyQrData.into());
                }
                let mut object = factory::create_qr_code(data.clone(), factory::default_qr_bounds());
                prepare_raster(&mut object, ctx.rasters)?;
                ctx.document.push(object);
            }
            Command::AddShape { svg_path } => {
                let mut object = factory::create_shape(svg_path.clone(), ctx.document.canvas_size());
                prepare_raster(&mut object, ctx.rasters)?;
                if ctx.document.remove_shapes() > 0 {
                    ctx.tool.clear_selection();
                }
                ctx.document.push(object);
            }
            Command::SetText(text) => ctx.selected_text()?.set_text(text.clone()),
            Command::SetFontFamily(family) => ctx.selected_text()?.set_font_family(family.clone()),
            Command::SetFontSize(size) => {
                let size = ctx.config.clamp_font_size(*size);
                ctx.selected_text()?.set_font_size(size);
            }
            Command::ToggleBold => {
                ctx.selected_text()?.toggle_bold();
            }
            Command::ToggleItalic => {
                ctx.selected_text()?.toggle_italic();
            }
            Command::SetForeColor(color) => ctx.selected_text()?.set_fore_color(*color),
            Command::SetOpacity(opacity) => ctx.selected_object()?.set_opacity(*opacity),
            Command::SetFillColor(color) => ctx.selected_object()?.set_fill_color(*color),
            Command::SetStrokeColor(color) => ctx.selected_object()?.set_stroke_color(*color),
            Command::SetStrokeWidth(width) => ctx.selected_object()?.set_stroke_width(*width),
            Command::BringForward => {
                let index = ctx.selected_index()?;
                let moved = ctx.document.bring_to_front(index);
                ctx.tool.select(moved);
            }
            Command::SendBackward => {
                let index = ctx.selected_index()?;
                let moved = ctx.document.send_to_back(index);
                ctx.tool.select(moved);
            }
            Command::Delete => {
                let index = ctx.selected_index()?;
                ctx.document.remove(index);
                ctx.tool.clear_selection();
            }
        }
        Ok(())
    }
}

impl From<ContextAction> for Command {
    fn from(action: ContextAction) -> Self {
        match action {
            ContextAction::BringForward => Command::BringForward,
            ContextAction::SendBackward => Command::SendBackward,
            ContextAction::Delete => Command::Delete,
        }
    }
}

/// Produces the first raster for a new object.
///
/// A generator that is not available leaves the object drawing as a
/// placeholder; any other failure aborts the command.
fn prepare_raster(object: &mut CanvasObject, rasters: &dyn RasterProvider) -> CommandResult {
    match object.refresh_raster(rasters) {
        Ok(_) => Ok(()),
        Err(RasterError::Unsupported(what)) => {
            warn!("{what} generation is not available, adding {} without a raster", object.element_type());
            Ok(())
        }
        Err(err) => Err(err.into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ObjectKind;
    use crate::raster::{FileRasterProvider, solid_image};

    struct Fixture {
        document: Document,
        tool: SelectionTool,
        config: EditorConfig,
        rasters: FileRasterProvider,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                document: Document::default(),
                tool: SelectionTool::default(),
                config: EditorConfig::default(),
                rasters: FileRasterProvider::new()
                    .with_qr_encoder(Box::new(|_: &str, size: [usize; 2]| Ok(solid_image(size, Color32::BLACK)))),
            }
        }

        fn run(&mut self, command: Command) -> CommandResult {
            let mut ctx = CommandContext {
                document: &mut self.document,
                tool: &mut self.tool,
                config: &self.config,
                rasters: &self.rasters,
            };
            command.execute(&mut ctx)
        }
    }

    #[test]
    fn test_custom_text_is_selected() {
        let mut fx = Fixture::new();
        fx.run(Command::AddCustomText).unwrap();
        assert_eq!(fx.tool.selected(), Some(0));
        let text = fx.document.get(0).unwrap().as_text().unwrap();
        assert_eq!(text.text(), "New Custom Text");
        assert_eq!(text.font().family, "Arial");
        assert_eq!(text.font_size(), 16.0);
    }

    #[test]
    fn test_variable_is_not_selected() {
        let mut fx = Fixture::new();
        fx.run(Command::InsertVariable {
            label: "Mileage: [Mileage]".to_owned(),
        })
        .unwrap();
        assert_eq!(fx.tool.selected(), None);
        assert_eq!(fx.document.get(0).unwrap().as_text().unwrap().text(), "Mileage: [Mileage]");
    }

    #[test]
    fn test_empty_qr_adds_nothing() {
        let mut fx = Fixture::new();
        let result = fx.run(Command::AddQrCode { data: String::new() });
        assert!(matches!(result, Err(CommandError::Resource(RasterError::EmptyQrData))));
        assert!(fx.document.is_empty());
    }

    #[test]
    fn test_qr_gets_raster_at_its_size() {
        let mut fx = Fixture::new();
        fx.run(Command::AddQrCode { data: "hello".to_owned() }).unwrap();
        let object = fx.document.get(0).unwrap();
        let ObjectKind::QrCode(qr) = object.kind() else {
            panic!("expected a QR code");
        };
        assert_eq!(qr.raster(object.bounds()).unwrap().size(), [150, 150]);
    }

    #[test]
    fn test_missing_image_adds_nothing() {
        let mut fx = Fixture::new();
        let result = fx.run(Command::AddImage {
            path: PathBuf::from("/no/such/image.png"),
        });
        assert!(matches!(result, Err(CommandError::Resource(RasterError::NotFound(_)))));
        assert!(fx.document.is_empty());
    }

    #[test]
    fn test_missing_shape_keeps_old_background() {
        let mut fx = Fixture::new();
        let canvas = fx.document.canvas_size();
        fx.document.push(factory::create_shape("old.svg", canvas));
        let result = fx.run(Command::AddShape {
            svg_path: PathBuf::from("/no/such/shape.svg"),
        });
        assert!(result.is_err());
        assert_eq!(fx.document.len(), 1);
    }

    #[test]
    fn test_text_commands_need_text_selection() {
        let mut fx = Fixture::new();
        assert!(matches!(fx.run(Command::ToggleBold), Err(CommandError::NoSelection)));

        fx.run(Command::AddQrCode { data: "x".to_owned() }).unwrap();
        fx.tool.select(Some(0));
        assert!(matches!(
            fx.run(Command::SetText("t".to_owned())),
            Err(CommandError::WrongKind { expected: "text", found: "qr_code" })
        ));
        // Object-level style applies to any variant.
        fx.run(Command::SetOpacity(0.5)).unwrap();
        assert_eq!(fx.document.get(0).unwrap().opacity(), 0.5);
    }

    #[test]
    fn test_text_styling() {
        let mut fx = Fixture::new();
        fx.run(Command::AddCustomText).unwrap();
        fx.run(Command::SetText("Hello".to_owned())).unwrap();
        fx.run(Command::SetFontFamily("Courier New".to_owned())).unwrap();
        fx.run(Command::SetFontSize(200.0)).unwrap();
        fx.run(Command::ToggleItalic).unwrap();
        fx.run(Command::SetForeColor(Color32::RED)).unwrap();

        let text = fx.document.get(0).unwrap().as_text().unwrap();
        assert_eq!(text.text(), "Hello");
        assert_eq!(text.font().family, "Courier New");
        assert_eq!(text.font_size(), 72.0);
        assert!(text.font().italic);
        assert!(!text.font().bold);
        assert_eq!(text.fore_color(), Color32::RED);
    }

    #[test]
    fn test_layering_keeps_selection_on_object() {
        let mut fx = Fixture::new();
        fx.run(Command::AddCustomText).unwrap();
        fx.run(Command::AddQrCode { data: "x".to_owned() }).unwrap();
        fx.tool.select(Some(0));
        let id = fx.document.get(0).unwrap().id();

        fx.run(Command::BringForward).unwrap();
        assert_eq!(fx.tool.selected(), Some(1));
        assert_eq!(fx.document.index_of(id), Some(1));

        fx.run(Command::SendBackward).unwrap();
        assert_eq!(fx.tool.selected(), Some(0));
        assert_eq!(fx.document.index_of(id), Some(0));

        fx.run(Command::Delete).unwrap();
        assert_eq!(fx.tool.selected(), None);
        assert_eq!(fx.document.index_of(id), None);
        assert_eq!(fx.document.len(), 1);
    }

    #[test]
    fn test_context_actions_map_to_commands() {
        let commands: Vec<Command> = ContextAction::ALL.into_iter().map(Command::from).collect();
        assert_eq!(commands, vec![Command::BringForward, Command::SendBackward, Command::Delete]);
    }
}
