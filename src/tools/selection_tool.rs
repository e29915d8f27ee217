use egui::{CursorIcon, PointerButton, Pos2, Rect, Vec2, pos2};
use log::debug;

use crate::config::EditorConfig;
use crate::document::Document;
use crate::gizmo::{self, HandleKind, Handles};
use crate::geometry::to_object_space;

/// Interaction constants the selection tool works with.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionToolConfig {
    pub handle_size: f32,
    pub rotation_handle_offset: f32,
    pub min_object_size: f32,
    pub min_font_size: f32,
    pub max_font_size: f32,
}

impl SelectionToolConfig {
    pub fn from_config(config: &EditorConfig) -> Self {
        Self {
            handle_size: config.handle_size,
            rotation_handle_offset: config.rotation_handle_offset,
            min_object_size: config.min_object_size,
            min_font_size: config.min_font_size,
            max_font_size: config.max_font_size,
        }
    }
}

impl Default for SelectionToolConfig {
    fn default() -> Self {
        Self::from_config(&EditorConfig::default())
    }
}

/// What a resize gesture measures against.
///
/// Captured once on pointer-down so the mapping into object space stays
/// fixed while the bounds change under the pointer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResizeOrigin {
    pub bounds: Rect,
    pub rotation: f32,
    /// Pointer position in the object's unrotated frame at gesture start.
    pub pointer_local: Pos2,
    /// Font size at gesture start, for text objects.
    pub font_size: Option<f32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum SelectionState {
    #[default]
    Idle,
    Dragging {
        last_pos: Pos2,
    },
    Resizing {
        handle: HandleKind,
        origin: ResizeOrigin,
    },
    Rotating {
        /// Pointer angle about the bounds center at gesture start, radians.
        initial_angle: f32,
        /// Object rotation at gesture start, degrees.
        initial_rotation: f32,
    },
}

/// Actions offered by the secondary-button menu over an object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextAction {
    BringForward,
    SendBackward,
    Delete,
}

impl ContextAction {
    pub const ALL: [ContextAction; 3] = [
        ContextAction::BringForward,
        ContextAction::SendBackward,
        ContextAction::Delete,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ContextAction::BringForward => "Bring Forward",
            ContextAction::SendBackward => "Send Backward",
            ContextAction::Delete => "Delete",
        }
    }
}

/// Result of a pointer press.
#[derive(Debug, Clone, PartialEq)]
pub enum PointerDownOutcome {
    /// Secondary press over an object: it is now selected and the host
    /// should offer `actions`. The interaction state is unchanged.
    ContextMenu {
        index: usize,
        actions: [ContextAction; 3],
    },
    BeganResize(HandleKind),
    BeganRotate,
    BeganDrag(usize),
    /// Nothing under the pointer; the selection was cleared.
    Cleared,
}

/// Pointer-driven selection, drag, resize and rotate.
///
/// The selection is an index into the document's object sequence. Anything
/// that replaces the sequence (undo, redo, load) must call [`reset`].
///
/// [`reset`]: SelectionTool::reset
#[derive(Debug, Clone, Default)]
pub struct SelectionTool {
    state: SelectionState,
    selected: Option<usize>,
    config: SelectionToolConfig,
    gesture_changed: bool,
}

impl SelectionTool {
    pub fn new(config: SelectionToolConfig) -> Self {
        Self {
            state: SelectionState::Idle,
            selected: None,
            config,
            gesture_changed: false,
        }
    }

    pub fn name(&self) -> &'static str {
        "Selection"
    }

    pub fn state(&self) -> &SelectionState {
        &self.state
    }

    pub fn current_state_name(&self) -> &'static str {
        match self.state {
            SelectionState::Idle => "Idle",
            SelectionState::Dragging { .. } => "Dragging",
            SelectionState::Resizing { .. } => "Resizing",
            SelectionState::Rotating { .. } => "Rotating",
        }
    }

    pub fn has_active_transform(&self) -> bool {
        !matches!(self.state, SelectionState::Idle)
    }

    pub fn selected(&self) -> Option<usize> {
        self.selected
    }

    pub fn select(&mut self, index: Option<usize>) {
        self.selected = index;
    }

    pub fn clear_selection(&mut self) {
        self.selected = None;
    }

    /// Drops the selection and any gesture in progress.
    pub fn reset(&mut self) {
        self.state = SelectionState::Idle;
        self.selected = None;
        self.gesture_changed = false;
    }

    fn handles_for(&self, document: &Document, index: usize) -> Option<Handles> {
        let object = document.get(index)?;
        Some(gizmo::compute_handles(
            object.bounds(),
            object.rotation(),
            self.config.handle_size,
            self.config.rotation_handle_offset,
        ))
    }

    /// The handle of the current selection under `pos`, if any.
    pub fn handle_at(&self, pos: Pos2, document: &Document) -> Option<HandleKind> {
        let index = self.selected?;
        self.handles_for(document, index)?.hit(pos)
    }

    /// Cursor to show for `pos` while idle.
    pub fn hover_cursor(&self, pos: Pos2, document: &Document) -> CursorIcon {
        match self.state {
            SelectionState::Dragging { .. } => return CursorIcon::Grabbing,
            SelectionState::Resizing { handle, .. } => return handle.cursor_icon(),
            SelectionState::Rotating { .. } => return CursorIcon::Grabbing,
            SelectionState::Idle => {}
        }
        if let Some(handle) = self.handle_at(pos, document) {
            handle.cursor_icon()
        } else if document.object_at(pos).is_some() {
            CursorIcon::Move
        } else {
            CursorIcon::Default
        }
    }

    pub fn on_pointer_down(&mut self, pos: Pos2, button: PointerButton, document: &Document) -> PointerDownOutcome {
        self.gesture_changed = false;

        if button == PointerButton::Secondary {
            if let Some(index) = document.object_at(pos) {
                debug!("Context menu for object {index}");
                self.selected = Some(index);
                return PointerDownOutcome::ContextMenu {
                    index,
                    actions: ContextAction::ALL,
                };
            }
        }

        if let Some(index) = self.selected {
            if let (Some(handle), Some(object)) = (self.handle_at(pos, document), document.get(index)) {
                let bounds = object.bounds();
                if handle == HandleKind::Rotation {
                    let center = bounds.center();
                    self.state = SelectionState::Rotating {
                        initial_angle: pointer_angle(pos, center),
                        initial_rotation: object.rotation(),
                    };
                    debug!("Idle -> Rotating object {index}");
                    return PointerDownOutcome::BeganRotate;
                }

                let origin = ResizeOrigin {
                    bounds,
                    rotation: object.rotation(),
                    pointer_local: to_object_space(pos, bounds, object.rotation()),
                    font_size: object.as_text().map(|text| text.font_size()),
                };
                self.state = SelectionState::Resizing { handle, origin };
                debug!("Idle -> Resizing object {index} by {}", handle.as_str());
                return PointerDownOutcome::BeganResize(handle);
            }
        }

        if let Some(index) = document.object_at(pos) {
            self.selected = Some(index);
            self.state = SelectionState::Dragging { last_pos: pos };
            debug!("Idle -> Dragging object {index}");
            return PointerDownOutcome::BeganDrag(index);
        }

        self.selected = None;
        self.state = SelectionState::Idle;
        PointerDownOutcome::Cleared
    }

    /// Applies the active gesture. Returns `true` when the document changed.
    pub fn on_pointer_move(&mut self, pos: Pos2, document: &mut Document) -> bool {
        let Some(object) = self.selected.and_then(|index| document.get_mut(index)) else {
            if self.has_active_transform() {
                debug!("Selection vanished mid-gesture, returning to Idle");
                self.state = SelectionState::Idle;
            }
            return false;
        };

        let changed = match &mut self.state {
            SelectionState::Idle => false,
            SelectionState::Dragging { last_pos } => {
                let delta = pos - *last_pos;
                *last_pos = pos;
                if delta == Vec2::ZERO {
                    false
                } else {
                    object.translate(delta);
                    true
                }
            }
            SelectionState::Rotating {
                initial_angle,
                initial_rotation,
            } => {
                let current = pointer_angle(pos, object.bounds().center());
                let rotation = *initial_rotation + (current - *initial_angle).to_degrees();
                let changed = rotation != object.rotation();
                object.set_rotation(rotation);
                changed
            }
            SelectionState::Resizing { handle, origin } => {
                let local = to_object_space(pos, origin.bounds, origin.rotation);
                let delta = local - origin.pointer_local;
                let bounds = resize_bounds(*handle, origin.bounds, delta, self.config.min_object_size);
                let changed = bounds != object.bounds();
                object.set_bounds(bounds);

                if let (Some(original), Some(text)) = (origin.font_size, object.as_text_mut()) {
                    if origin.bounds.width() > 0.0 {
                        let scale = bounds.width() / origin.bounds.width();
                        text.set_font_size(
                            (original * scale).clamp(self.config.min_font_size, self.config.max_font_size),
                        );
                    }
                }
                changed
            }
        };

        self.gesture_changed |= changed;
        changed
    }

    /// Ends the gesture. Returns `true` if it changed the document.
    pub fn on_pointer_up(&mut self) -> bool {
        if self.has_active_transform() {
            debug!("{} -> Idle", self.current_state_name());
        }
        self.state = SelectionState::Idle;
        std::mem::take(&mut self.gesture_changed)
    }
}

/// Angle of `pos` about `center`, radians, y-down.
fn pointer_angle(pos: Pos2, center: Pos2) -> f32 {
    (pos.y - center.y).atan2(pos.x - center.x)
}

/// Moves the edges a handle controls by `delta` (object space).
///
/// Width and height never drop below `min_size`; when clamped, the edge
/// opposite the dragged one stays where it was.
pub fn resize_bounds(handle: HandleKind, origin: Rect, delta: Vec2, min_size: f32) -> Rect {
    let (mut left, mut top, mut right, mut bottom) = (origin.min.x, origin.min.y, origin.max.x, origin.max.y);

    let (moves_left, moves_top, moves_right, moves_bottom) = match handle {
        HandleKind::TopLeft => (true, true, false, false),
        HandleKind::Top => (false, true, false, false),
        HandleKind::TopRight => (false, true, true, false),
        HandleKind::Right => (false, false, true, false),
        HandleKind::BottomRight => (false, false, true, true),
        HandleKind::Bottom => (false, false, false, true),
        HandleKind::BottomLeft => (true, false, false, true),
        HandleKind::Left => (true, false, false, false),
        HandleKind::Rotation => return origin,
    };

    if moves_left {
        left += delta.x;
    }
    if moves_right {
        right += delta.x;
    }
    if moves_top {
        top += delta.y;
    }
    if moves_bottom {
        bottom += delta.y;
    }

    if right - left < min_size {
        if moves_left {
            left = right - min_size;
        } else {
            right = left + min_size;
        }
    }
    if bottom - top < min_size {
        if moves_top {
            top = bottom - min_size;
        } else {
            bottom = top + min_size;
        }
    }

    Rect::from_min_max(pos2(left, top), pos2(right, bottom))
}
