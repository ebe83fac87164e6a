//! Tubely Database Layer
//!
//! Access to video records. The upload pipeline talks to the [`VideoStore`] trait;
//! [`VideoRepository`] is the Postgres implementation.

pub mod traits;
pub mod video;

pub use traits::VideoStore;
pub use video::VideoRepository;
