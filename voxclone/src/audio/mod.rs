//! Audio post-processing through FFmpeg.

pub mod transform;

pub use transform::{AudioTools, Emotion, TransformSettings};
