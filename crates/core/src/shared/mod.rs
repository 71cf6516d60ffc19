pub mod alignment_target;
pub mod constants;
pub mod landmark;
pub mod session_counts;
pub mod ticket;
pub mod work_image;
