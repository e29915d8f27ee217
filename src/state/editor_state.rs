//! The editor aggregate: one document, the selection tool driving it, the
//! undo history and the collaborators that produce rasters.
//!
//! Every path that changes the object sequence ends in exactly one history
//! checkpoint:
//!
//! ```text
//!   pointer down ──► move ──► move ──► up ──────────┐
//!                                                    │
//!   Command::execute ────────────────────────────────┼──► checkpoint
//!                                                    │
//!   assistant result ──► apply_rewrite ──────────────┘
//!
//!   undo / redo / load ──► replace objects ──► reset selection, rebuild rasters
//! ```
//!
//! # Examples
//!
//! ```rust,no_run
//! use egui::{PointerButton, pos2};
//! use label_canvas::{Command, Editor};
//!
//! let mut editor = Editor::default();
//! editor.execute(Command::AddCustomText)?;
//! editor.pointer_down(pos2(160.0, 160.0), PointerButton::Primary);
//! editor.pointer_move(pos2(180.0, 170.0));
//! editor.pointer_up()?;
//! editor.undo()?;
//! # Ok::<(), label_canvas::EditorError>(())
//! ```
use std::fs;
use std::path::Path;

use egui::{CursorIcon, PointerButton, Pos2, Vec2, vec2};
use log::{debug, info, warn};

use super::persistence;
use crate::assistant::{AssistantError, PendingRewrite, RewriteAction, TextAssistant, clean_response};
use crate::command::{Command, CommandContext, CommandError, CommandHistory};
use crate::config::EditorConfig;
use crate::document::{CanvasUnit, Document};
use crate::element::{CanvasObject, ObjectId};
use crate::error::{EditorError, EditorResult};
use crate::input::PointerEvent;
use crate::raster::{FileRasterProvider, RasterProvider};
use crate::renderer::{Renderer, Surface};
use crate::tools::{ContextAction, PointerDownOutcome, SelectionTool, SelectionToolConfig};
use crate::variables::VariableMap;

/// What a pointer event did.
#[derive(Debug, Clone, PartialEq)]
pub enum EventResponse {
    Pressed(PointerDownOutcome),
    Moved { changed: bool },
    Released { checkpointed: bool },
    /// Double-click landed on a text object, now selected, that the host
    /// should open for editing.
    EditText(usize),
    Ignored,
}

pub struct Editor {
    document: Document,
    tool: SelectionTool,
    history: CommandHistory,
    config: EditorConfig,
    renderer: Renderer,
    rasters: Box<dyn RasterProvider>,
}

impl Editor {
    pub fn new(config: EditorConfig, rasters: Box<dyn RasterProvider>) -> Self {
        let mut history = CommandHistory::new(config.history_limit);
        let document = Document::new(config.default_canvas_size);
        if let Err(err) = history.reset(document.objects()) {
            warn!("Could not record the initial checkpoint: {err}");
        }
        Self {
            document,
            tool: SelectionTool::new(SelectionToolConfig::from_config(&config)),
            history,
            renderer: Renderer::new(&config),
            config,
            rasters,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn tool(&self) -> &SelectionTool {
        &self.tool
    }

    pub fn history(&self) -> &CommandHistory {
        &self.history
    }

    pub fn selected(&self) -> Option<usize> {
        self.tool.selected()
    }

    pub fn selected_object(&self) -> Option<&CanvasObject> {
        self.tool.selected().and_then(|index| self.document.get(index))
    }

    pub fn select(&mut self, index: Option<usize>) {
        self.tool.select(index.filter(|&i| i < self.document.len()));
    }

    pub fn can_undo(&self) -> bool {
        self.history.can_undo()
    }

    pub fn can_redo(&self) -> bool {
        self.history.can_redo()
    }

    /// Routes one pointer event to the selection tool.
    pub fn handle_event(&mut self, event: PointerEvent) -> EditorResult<EventResponse> {
        Ok(match event {
            PointerEvent::Down { pos, button } => EventResponse::Pressed(self.pointer_down(pos, button)),
            PointerEvent::Move { pos } => EventResponse::Moved {
                changed: self.pointer_move(pos),
            },
            PointerEvent::Up { pos, .. } => {
                // The release position may carry motion no move event reported.
                self.pointer_move(pos);
                EventResponse::Released {
                    checkpointed: self.pointer_up()?,
                }
            }
            PointerEvent::DoubleClick { pos } => match self.edit_text_at(pos) {
                Some(index) => EventResponse::EditText(index),
                None => EventResponse::Ignored,
            },
        })
    }

    pub fn pointer_down(&mut self, pos: Pos2, button: PointerButton) -> PointerDownOutcome {
        self.tool.on_pointer_down(pos, button, &self.document)
    }

    /// Applies the active gesture. Returns `true` if the document changed.
    pub fn pointer_move(&mut self, pos: Pos2) -> bool {
        let changed = self.tool.on_pointer_move(pos, &mut self.document);
        if changed {
            self.refresh_selected_raster();
        }
        changed
    }

    /// Ends the gesture, checkpointing once if it changed anything.
    pub fn pointer_up(&mut self) -> EditorResult<bool> {
        if !self.tool.on_pointer_up() {
            return Ok(false);
        }
        let pushed = self.history.commit(self.document.objects())?;
        if pushed {
            info!("Transformed object {:?}", self.tool.selected());
        }
        Ok(pushed)
    }

    /// Selects the top-most text object under `pos` for in-place editing.
    pub fn edit_text_at(&mut self, pos: Pos2) -> Option<usize> {
        let index = self.document.object_at(pos)?;
        if !self.document.get(index)?.is_text() {
            return None;
        }
        self.tool.select(Some(index));
        Some(index)
    }

    pub fn hover_cursor(&self, pos: Pos2) -> CursorIcon {
        self.tool.hover_cursor(pos, &self.document)
    }

    /// Runs a discrete action and checkpoints it.
    ///
    /// On error nothing is added, changed or checkpointed.
    pub fn execute(&mut self, command: Command) -> EditorResult<()> {
        let mut ctx = CommandContext {
            document: &mut self.document,
            tool: &mut self.tool,
            config: &self.config,
            rasters: self.rasters.as_ref(),
        };
        command.execute(&mut ctx)?;
        self.refresh_selected_raster();
        self.history.commit(self.document.objects())?;
        info!("Executed {}", command.name());
        Ok(())
    }

    pub fn context_action(&mut self, action: ContextAction) -> EditorResult<()> {
        self.execute(action.into())
    }

    pub fn undo(&mut self) -> EditorResult<bool> {
        let restored = self.history.undo(&mut self.document)?;
        if restored {
            self.after_replace();
        }
        Ok(restored)
    }

    pub fn redo(&mut self) -> EditorResult<bool> {
        let restored = self.history.redo(&mut self.document)?;
        if restored {
            self.after_replace();
        }
        Ok(restored)
    }

    /// Sets the canvas size from values in `unit`, clamped to the configured
    /// pixel range. Not recorded in history.
    pub fn set_canvas_size(&mut self, width: f64, height: f64, unit: CanvasUnit) -> Vec2 {
        let range = self.config.canvas_size_range();
        let size = vec2(unit.to_pixels(width, &range) as f32, unit.to_pixels(height, &range) as f32);
        self.document.set_canvas_size(size);
        info!("Canvas resized to {}x{} px", size.x, size.y);
        size
    }

    /// Starts over with an empty canvas of the default size.
    pub fn new_document(&mut self) -> EditorResult<()> {
        self.replace_document(Document::new(self.config.default_canvas_size))
    }

    pub fn to_json(&self) -> EditorResult<String> {
        Ok(persistence::to_json(&self.document)?)
    }

    /// Replaces the document with one parsed from `json`.
    ///
    /// A malformed file leaves the current document untouched.
    pub fn load_json(&mut self, json: &str) -> EditorResult<()> {
        let document = persistence::from_json(json, &self.config.canvas_size_range())?;
        self.replace_document(document)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> EditorResult<()> {
        Ok(persistence::save(&self.document, path)?)
    }

    pub fn load(&mut self, path: impl AsRef<Path>) -> EditorResult<()> {
        let document = persistence::load(path, &self.config.canvas_size_range())?;
        self.replace_document(document)
    }

    /// Copies the source file of the first shape to `dest`.
    pub fn export_native_svg(&self, dest: impl AsRef<Path>) -> EditorResult<()> {
        let dest = dest.as_ref();
        let shape = self.document.first_shape().ok_or(EditorError::NoShape)?;
        fs::copy(shape.svg_path(), dest).map_err(|source| EditorError::Export {
            path: dest.to_path_buf(),
            source,
        })?;
        info!("Exported {} to {}", shape.svg_path().display(), dest.display());
        Ok(())
    }

    pub fn render(&self, surface: &mut dyn Surface) {
        self.renderer.render(&self.document, self.tool.selected(), surface);
    }

    pub fn render_preview(&self, vars: &VariableMap, surface: &mut dyn Surface) {
        self.renderer.render_preview(&self.document, vars, surface);
    }

    /// Sends the selected text to `assistant`. The returned future runs
    /// independently; hand its result to [`apply_rewrite`](Self::apply_rewrite).
    pub fn request_rewrite(
        &self,
        assistant: &dyn TextAssistant,
        action: RewriteAction,
    ) -> EditorResult<PendingRewrite> {
        let object = self.selected_object().ok_or(CommandError::NoSelection)?;
        let text = object.as_text().ok_or(CommandError::WrongKind {
            expected: "text",
            found: object.element_type(),
        })?;
        info!("Requested '{}' for object {}", action.label(), object.id());
        let future = assistant.complete(action.prompt(text.text()));
        Ok(PendingRewrite::new(object.id(), action, future))
    }

    /// Applies a finished rewrite to `target` if it is still a text object.
    ///
    /// Returns `Ok(true)` when the text changed and was checkpointed. A blank
    /// reply or a vanished target is ignored.
    pub fn apply_rewrite(&mut self, target: ObjectId, result: Result<String, AssistantError>) -> EditorResult<bool> {
        let Some(text) = clean_response(&result?) else {
            info!("Assistant returned no text for object {target}");
            return Ok(false);
        };
        let Some(object) = self
            .document
            .index_of(target)
            .and_then(|index| self.document.get_mut(index))
            .and_then(|object| object.as_text_mut())
        else {
            warn!("Rewrite target {target} is no longer a text object on the canvas");
            return Ok(false);
        };
        object.set_text(text);
        let pushed = self.history.commit(self.document.objects())?;
        if pushed {
            info!("Applied assistant text to object {target}");
        }
        Ok(pushed)
    }

    /// Polls `pending` once and applies its result if ready.
    ///
    /// `None` while the assistant is still working.
    pub fn poll_rewrite(&mut self, pending: &mut PendingRewrite) -> Option<EditorResult<bool>> {
        let result = pending.try_complete()?;
        Some(self.apply_rewrite(pending.target(), result))
    }

    fn replace_document(&mut self, document: Document) -> EditorResult<()> {
        self.history.reset(document.objects())?;
        self.document = document;
        self.after_replace();
        Ok(())
    }

    fn after_replace(&mut self) {
        self.tool.reset();
        let regenerated = self.document.refresh_rasters(self.rasters.as_ref());
        debug!("Regenerated {regenerated} rasters for {} objects", self.document.len());
    }

    fn refresh_selected_raster(&mut self) {
        let Some(object) = self.tool.selected().and_then(|index| self.document.get_mut(index)) else {
            return;
        };
        if let Err(err) = object.refresh_raster(self.rasters.as_ref()) {
            debug!("Raster for {} {} unavailable: {err}", object.element_type(), object.id());
        }
    }
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(EditorConfig::default(), Box::new(FileRasterProvider::new()))
    }
}

impl std::fmt::Debug for Editor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Editor")
            .field("document", &self.document)
            .field("tool", &self.tool)
            .field("history", &self.history)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use egui::Color32;

    #[test]
    fn test_starts_with_baseline() {
        let editor = Editor::default();
        assert!(editor.document().is_empty());
        assert_eq!(editor.history().undo_len(), 1);
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_command_checkpoints_once() {
        let mut editor = Editor::default();
        editor.execute(Command::AddCustomText).unwrap();
        editor.execute(Command::SetForeColor(Color32::RED)).unwrap();
        assert_eq!(editor.history().undo_len(), 3);

        assert!(editor.undo().unwrap());
        let text = editor.document().get(0).unwrap().as_text().unwrap();
        assert_eq!(text.fore_color(), Color32::BLACK);
        assert_eq!(editor.selected(), None);
    }

    #[test]
    fn test_failed_command_not_checkpointed() {
        let mut editor = Editor::default();
        assert!(editor.execute(Command::Delete).is_err());
        assert_eq!(editor.history().undo_len(), 1);
    }

    #[test]
    fn test_click_without_motion_not_checkpointed() {
        let mut editor = Editor::default();
        editor.execute(Command::AddCustomText).unwrap();
        editor.pointer_down(egui::pos2(160.0, 160.0), PointerButton::Primary);
        assert!(!editor.pointer_up().unwrap());
        assert_eq!(editor.history().undo_len(), 2);
    }

    #[test]
    fn test_canvas_size_clamped_and_unversioned() {
        let mut editor = Editor::default();
        let size = editor.set_canvas_size(5.0, 50.0, CanvasUnit::In);
        assert_eq!(size, vec2(480.0, 2000.0));
        assert_eq!(editor.document().canvas_size(), size);
        assert!(!editor.can_undo());
    }

    #[test]
    fn test_edit_text_only_hits_text() {
        let mut editor = Editor::default();
        editor.execute(Command::InsertVariable { label: "[Notes]".to_owned() }).unwrap();
        assert_eq!(editor.edit_text_at(egui::pos2(160.0, 160.0)), Some(0));
        assert_eq!(editor.selected(), Some(0));
        assert_eq!(editor.edit_text_at(egui::pos2(5.0, 5.0)), None);
    }

    #[test]
    fn test_export_without_shape() {
        let editor = Editor::default();
        assert!(matches!(editor.export_native_svg("/tmp/out.svg"), Err(EditorError::NoShape)));
    }
}
