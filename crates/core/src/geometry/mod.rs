pub mod alignment;
pub mod content_shrink;
