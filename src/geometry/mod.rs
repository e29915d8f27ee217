pub mod hit_testing;
pub mod transform;

pub use hit_testing::{object_at, objects_at};
pub use transform::{ObjectTransform, from_object_space, rotate_point, to_object_space};
