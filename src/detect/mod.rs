//! Detection pipeline: motion gating and heuristic shape classification.
//!
//! A captured frame flows through two stages:
//! - `gate`: frame-difference motion detection with a per-fire cooldown,
//! - `classifier`: edge/region extraction plus size and aspect filters that
//!   assign a category and a sampled confidence.
//!
//! The classifier only runs on frames the gate lets through.

pub mod classifier;
pub mod gate;
pub mod result;
pub mod sampler;

pub use classifier::{extract_contours, ShapeClassifier};
pub use gate::{changed_pixels, MotionGate};
pub use result::{BoundingBox, Category, Contour, Detection};
pub use sampler::{ConfidenceSampler, FixedSampler, UniformSampler};
