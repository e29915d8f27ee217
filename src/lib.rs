#![warn(clippy::all, rust_2018_idioms)]

pub mod assistant;
pub mod command;
pub mod config;
pub mod document;
pub mod element;
pub mod error;
pub mod geometry;
pub mod gizmo;
pub mod input;
pub mod raster;
pub mod renderer;
pub mod state;
pub mod texture_manager;
pub mod tools;
pub mod variables;

pub use assistant::{PendingRewrite, RewriteAction, TextAssistant};
pub use command::{Command, CommandHistory};
pub use config::EditorConfig;
pub use document::{CanvasUnit, Document};
pub use element::{CanvasObject, ObjectId, ObjectKind};
pub use error::{EditorError, EditorResult};
pub use input::{InputHandler, PointerEvent};
pub use raster::{FileRasterProvider, RasterProvider};
pub use renderer::{PainterSurface, Renderer, Surface};
pub use state::{Editor, EventResponse};
pub use tools::SelectionTool;
