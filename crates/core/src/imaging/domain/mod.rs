pub mod frame_animator;
pub mod image_mutator;
