//! Data models for the application

mod aspect;
mod storage;
mod video;

pub use aspect::*;
pub use storage::*;
pub use video::*;
