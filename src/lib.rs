//! # face-shape
//!
//! Face shape classification for style recommendation.
//!
//! A face is assigned one of six categories (oval, round, oblong, square,
//! heart, inverted triangle) by one of two strategies:
//! - **Landmark tier**: widths, heights and the jawline angle are measured from
//!   a 468-point face mesh and run through an ordered rule list.
//! - **Heuristic tier**: when no usable landmarks exist, the image's pixel
//!   dimensions and file size (read from the JPEG/PNG header only) are scored
//!   against fixed priors.
//!
//! If both tiers fail the analyzer answers oval with confidence 0.65, so a
//! caller always receives a result.
//!
//! ## Quick Start
//!
//! ```rust
//! use face_shape::{Analyzer, FaceShape, Tier};
//!
//! let analyzer = Analyzer::default();
//!
//! // A 600x800 PNG header, no landmarks available.
//! let mut png = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
//! png.extend_from_slice(&13u32.to_be_bytes());
//! png.extend_from_slice(b"IHDR");
//! png.extend_from_slice(&600u32.to_be_bytes());
//! png.extend_from_slice(&800u32.to_be_bytes());
//!
//! let result = analyzer.analyze(&png, None).unwrap();
//! assert_eq!(result.tier(), Tier::Heuristic);
//! assert_eq!(result.face_shape, FaceShape::Oblong);
//! ```
//!
//! ## Landmark Extraction
//!
//! Implement [`LandmarkExtractor`] for your face-mesh backend and call
//! [`Analyzer::analyze_with_extractor`]; extraction failures and timeouts
//! fall through to the heuristic tier.

mod analyzer;
mod classifier;
mod config;
mod error;
mod extractor;
mod geometry;
mod heuristic;
mod image_info;
mod metrics;
mod types;

pub use analyzer::{
    AnalysisResult, Analyzer, AnalyzerBuilder, ImageInfo, Tier, SAFE_DEFAULT_CONFIDENCE,
};
pub use classifier::{
    classify_features, classify_measurements, landmark_confidence, ShapeFeatures, ShapeRule,
    SHAPE_RULES,
};
pub use config::{AnalyzerConfig, ValidationLimits};
pub use error::{Error, Result, ValidationFailure};
pub use extractor::{Detection, LandmarkExtractor};
pub use geometry::{angle_between, cross, distance, dot, magnitude, vertex_angle};
pub use heuristic::{
    classify_metadata, score_metadata, validate_metadata, HeuristicEstimate, ShapeScores,
};
pub use image_info::{
    jpeg_dimensions, png_dimensions, read_dimensions, Dimensions, ImageFormat, ImageMetadata,
};
pub use metrics::{FaceMeasurements, LandmarkIndices, LANDMARK_INDICES};
pub use types::{FaceShape, Landmark, LandmarkSet};
