pub mod hit;
pub mod paint;

pub use hit::{PointerTarget, hit_test};
pub use paint::paint_scene;
