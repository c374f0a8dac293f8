//! bagscan - heuristic bag detection pipeline.
//!
//! This crate implements a webcam detection loop that is deliberately honest
//! about what it is: there is no neural network here. Frames are gated by
//! frame-difference motion detection, "detection" is edge/region extraction
//! with size and aspect-ratio filters, and confidence values are sampled from
//! per-category ranges rather than computed by a model.
//!
//! # Pipeline
//!
//! ```text
//! CameraSource -> MotionGate -> (gated) ShapeClassifier -> Annotator
//!                                        |
//!                                        v
//!                              CycleSummary + recommendations
//! ```
//!
//! # Module structure
//!
//! - `ingest`: camera frame sources (V4L2 devices, synthetic stub)
//! - `detect`: motion gate, shape classifier, detection types
//! - `annotate`: bounding-box and label overlays
//! - `recommend`: static category-keyed product tables
//! - `controller`: the Idle/Detecting lifecycle driving one cycle per tick
//! - `config`: defaults, JSON config file, env overrides

pub mod annotate;
pub mod config;
pub mod controller;
pub mod detect;
pub mod frame;
pub mod ingest;
pub mod recommend;

pub use config::{CameraSettings, DetectorConfig, GateSettings, ShapeSettings};
pub use controller::{CycleOutput, CycleSummary, DetectorState, PipelineController};
pub use detect::{
    BoundingBox, Category, ConfidenceSampler, Contour, Detection, FixedSampler, MotionGate,
    ShapeClassifier, UniformSampler,
};
pub use frame::Frame;
pub use ingest::{CameraSource, CameraStats};
pub use recommend::Product;
