pub mod detection;
pub mod geometry;
pub mod imaging;
pub mod messaging;
pub mod pipeline;
pub mod session;
pub mod shared;
pub mod storage;
