use egui::{Pos2, Rect};

/// Rotates `point` about `center` by `angle_degrees`.
///
/// Canvas space is y-down, so a positive angle turns clockwise on screen,
/// matching how objects are drawn.
pub fn rotate_point(point: Pos2, center: Pos2, angle_degrees: f32) -> Pos2 {
    // f64 keeps rotate/unrotate round trips tight for large canvases.
    let (sin, cos) = (angle_degrees as f64).to_radians().sin_cos();
    let dx = (point.x - center.x) as f64;
    let dy = (point.y - center.y) as f64;
    Pos2::new(
        (dx * cos - dy * sin) as f32 + center.x,
        (dx * sin + dy * cos) as f32 + center.y,
    )
}

/// Maps a canvas point into the unrotated frame of `bounds`, with the
/// top-left corner of `bounds` at the origin.
///
/// This is the inverse of the draw transform: translate to the center,
/// rotate by `rotation`, translate back by half the size.
pub fn to_object_space(point: Pos2, bounds: Rect, rotation: f32) -> Pos2 {
    let unrotated = rotate_point(point, bounds.center(), -rotation);
    Pos2::new(unrotated.x - bounds.min.x, unrotated.y - bounds.min.y)
}

/// Maps a point expressed in the unrotated frame of `bounds` back to canvas space.
pub fn from_object_space(local: Pos2, bounds: Rect, rotation: f32) -> Pos2 {
    let unrotated = Pos2::new(local.x + bounds.min.x, local.y + bounds.min.y);
    rotate_point(unrotated, bounds.center(), rotation)
}

/// A rotation about a pivot point.
///
/// Every object is drawn through one of these: its geometry is laid out in
/// unrotated canvas coordinates and the surface maps each point through
/// [`ObjectTransform::apply`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ObjectTransform {
    pub pivot: Pos2,
    pub degrees: f32,
}

impl ObjectTransform {
    pub const IDENTITY: Self = Self {
        pivot: Pos2::ZERO,
        degrees: 0.0,
    };

    pub fn new(pivot: Pos2, degrees: f32) -> Self {
        Self { pivot, degrees }
    }

    /// The transform that rotates `bounds` about its own center.
    pub fn for_bounds(bounds: Rect, degrees: f32) -> Self {
        Self::new(bounds.center(), degrees)
    }

    pub fn is_identity(&self) -> bool {
        self.degrees == 0.0
    }

    pub fn radians(&self) -> f32 {
        self.degrees.to_radians()
    }

    pub fn apply(&self, point: Pos2) -> Pos2 {
        if self.is_identity() {
            point
        } else {
            rotate_point(point, self.pivot, self.degrees)
        }
    }

    pub fn invert(&self, point: Pos2) -> Pos2 {
        if self.is_identity() {
            point
        } else {
            rotate_point(point, self.pivot, -self.degrees)
        }
    }

    /// The four corners of `rect` in canvas space, clockwise from top-left.
    pub fn corners(&self, rect: Rect) -> [Pos2; 4] {
        [
            self.apply(rect.left_top()),
            self.apply(rect.right_top()),
            self.apply(rect.right_bottom()),
            self.apply(rect.left_bottom()),
        ]
    }
}

impl Default for ObjectTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}
