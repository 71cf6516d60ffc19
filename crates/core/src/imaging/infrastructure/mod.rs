pub mod gif_animator;
pub mod raster_mutator;
