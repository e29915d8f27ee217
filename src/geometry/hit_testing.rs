use egui::Pos2;

use crate::element::CanvasObject;

/// Index of the top-most object whose unrotated bounds contain `pos`.
///
/// Later entries paint over earlier ones, so the scan runs from the end.
/// Rotation is ignored: a rotated object is hit through its axis-aligned
/// bounds, not its visible outline.
pub fn object_at(objects: &[CanvasObject], pos: Pos2) -> Option<usize> {
    objects
        .iter()
        .rposition(|object| object.bounds().contains(pos))
}

/// Every object under `pos`, top-most first.
pub fn objects_at(objects: &[CanvasObject], pos: Pos2) -> Vec<usize> {
    (0..objects.len())
        .rev()
        .filter(|&index| objects[index].bounds().contains(pos))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::factory;
    use egui::{Rect, pos2, vec2};

    fn qr_at(x: f32, y: f32) -> CanvasObject {
        factory::create_qr_code(
            "data",
            Rect::from_min_size(pos2(x, y), vec2(100.0, 100.0)),
        )
    }

    #[test]
    fn test_top_most_wins() {
        let objects = vec![qr_at(0.0, 0.0), qr_at(50.0, 50.0)];
        assert_eq!(object_at(&objects, pos2(75.0, 75.0)), Some(1));
        assert_eq!(object_at(&objects, pos2(25.0, 25.0)), Some(0));
        assert_eq!(objects_at(&objects, pos2(75.0, 75.0)), vec![1, 0]);
    }

    #[test]
    fn test_miss_and_out_of_range() {
        let objects = vec![qr_at(0.0, 0.0)];
        assert_eq!(object_at(&objects, pos2(500.0, 500.0)), None);
        assert_eq!(object_at(&objects, pos2(-1.0e9, f32::MAX)), None);
        assert_eq!(object_at(&[], pos2(1.0, 1.0)), None);
    }

    #[test]
    fn test_rotation_ignored() {
        let mut object = qr_at(0.0, 0.0);
        object.set_rotation(45.0);
        // The corner is outside the rotated outline but inside the bounds.
        assert_eq!(object_at(&[object], pos2(2.0, 2.0)), Some(0));
    }
}
