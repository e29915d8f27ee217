//! Resize and rotation handles around the selected object.
//!
//! Handles are recomputed from the object's current bounds and rotation on
//! every frame and every pointer press; nothing here is cached.

use egui::{CursorIcon, Pos2, Rect, Vec2};

use crate::geometry::rotate_point;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    TopLeft,
    Top,
    TopRight,
    Right,
    BottomRight,
    Bottom,
    BottomLeft,
    Left,
    Rotation,
}

impl HandleKind {
    /// Every handle, in hit-test priority order.
    pub const ALL: [HandleKind; 9] = [
        HandleKind::TopLeft,
        HandleKind::Top,
        HandleKind::TopRight,
        HandleKind::Right,
        HandleKind::BottomRight,
        HandleKind::Bottom,
        HandleKind::BottomLeft,
        HandleKind::Left,
        HandleKind::Rotation,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HandleKind::TopLeft => "top_left",
            HandleKind::Top => "top",
            HandleKind::TopRight => "top_right",
            HandleKind::Right => "right",
            HandleKind::BottomRight => "bottom_right",
            HandleKind::Bottom => "bottom",
            HandleKind::BottomLeft => "bottom_left",
            HandleKind::Left => "left",
            HandleKind::Rotation => "rotation",
        }
    }

    pub fn is_resize(&self) -> bool {
        *self != HandleKind::Rotation
    }

    /// Cursor to show while hovering this handle on an unrotated object.
    pub fn cursor_icon(&self) -> CursorIcon {
        match self {
            HandleKind::TopLeft | HandleKind::BottomRight => CursorIcon::ResizeNwSe,
            HandleKind::TopRight | HandleKind::BottomLeft => CursorIcon::ResizeNeSw,
            HandleKind::Top | HandleKind::Bottom => CursorIcon::ResizeVertical,
            HandleKind::Left | HandleKind::Right => CursorIcon::ResizeHorizontal,
            HandleKind::Rotation => CursorIcon::Grab,
        }
    }

    /// The unrotated anchor point of a resize handle on `bounds`.
    fn anchor(&self, bounds: Rect) -> Pos2 {
        match self {
            HandleKind::TopLeft => bounds.left_top(),
            HandleKind::Top => bounds.center_top(),
            HandleKind::TopRight => bounds.right_top(),
            HandleKind::Right => bounds.right_center(),
            HandleKind::BottomRight => bounds.right_bottom(),
            HandleKind::Bottom => bounds.center_bottom(),
            HandleKind::BottomLeft => bounds.left_bottom(),
            HandleKind::Left => bounds.left_center(),
            // Derived from the top anchor in compute_handles.
            HandleKind::Rotation => bounds.center_top(),
        }
    }
}

/// Screen-space handle squares for one object.
#[derive(Debug, Clone, PartialEq)]
pub struct Handles {
    rects: [(HandleKind, Rect); 9],
}

impl Handles {
    pub fn get(&self, kind: HandleKind) -> Rect {
        self.rects
            .iter()
            .find(|(k, _)| *k == kind)
            .map(|(_, rect)| *rect)
            .unwrap_or(Rect::NOTHING)
    }

    pub fn iter(&self) -> impl Iterator<Item = (HandleKind, Rect)> + '_ {
        self.rects.iter().copied()
    }

    /// First handle whose square contains `pos`.
    pub fn hit(&self, pos: Pos2) -> Option<HandleKind> {
        self.iter().find(|(_, rect)| rect.contains(pos)).map(|(kind, _)| kind)
    }
}

/// Computes the eight resize handles and the rotation handle.
///
/// Anchors are rotated about the bounds center by `rotation` degrees. The
/// rotation handle sits `rotation_offset` past the rotated top-middle anchor,
/// along the ray from the center through it.
pub fn compute_handles(bounds: Rect, rotation: f32, handle_size: f32, rotation_offset: f32) -> Handles {
    let center = bounds.center();
    let square = |point: Pos2| Rect::from_center_size(point, Vec2::splat(handle_size));

    let rects = HandleKind::ALL.map(|kind| {
        let top = rotate_point(kind.anchor(bounds), center, rotation);
        let point = if kind == HandleKind::Rotation {
            let radial = top - center;
            let length = radial.length();
            if length > f32::EPSILON {
                center + radial * ((length + rotation_offset) / length)
            } else {
                // Zero-height bounds: fall back to straight up, turned with the object.
                rotate_point(top - Vec2::new(0.0, rotation_offset), center, rotation)
            }
        } else {
            top
        };
        (kind, square(point))
    });

    Handles { rects }
}
