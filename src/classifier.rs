//! Rule-based face shape classification from landmark measurements.
//!
//! Rules are evaluated in order and the first match wins. Several rules can
//! hold for the same face, so the ordering below is part of the behaviour.

use tracing::debug;

use crate::metrics::FaceMeasurements;
use crate::types::FaceShape;

/// Ratios the rule list is evaluated over.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeFeatures {
    pub aspect_ratio: f64,
    pub jaw_cheek_ratio: f64,
    pub forehead_cheek_ratio: f64,
    pub jaw_forehead_ratio: f64,
    pub jawline_angle: f64,
}

impl ShapeFeatures {
    pub fn from_measurements(m: &FaceMeasurements) -> Self {
        Self {
            aspect_ratio: m.aspect_ratio,
            jaw_cheek_ratio: m.jaw_cheek_ratio(),
            forehead_cheek_ratio: m.forehead_cheek_ratio(),
            jaw_forehead_ratio: m.jaw_forehead_ratio(),
            jawline_angle: m.jawline_angle,
        }
    }
}

pub type ShapeRule = (FaceShape, fn(&ShapeFeatures) -> bool);

/// Ordered (label, predicate) list; oval is the fallthrough.
pub const SHAPE_RULES: [ShapeRule; 5] = [
    (FaceShape::Round, is_round),
    (FaceShape::Oblong, is_oblong),
    (FaceShape::Square, is_square),
    (FaceShape::Heart, is_heart),
    (FaceShape::InvertedTriangle, is_inverted_triangle),
];

fn is_round(f: &ShapeFeatures) -> bool {
    f.aspect_ratio < 1.2 && f.jaw_cheek_ratio > 0.80 && f.forehead_cheek_ratio > 0.85
}

fn is_oblong(f: &ShapeFeatures) -> bool {
    f.aspect_ratio > 1.5 && f.jaw_cheek_ratio > 0.75 && (f.jaw_forehead_ratio - 1.0).abs() < 0.2
}

fn is_square(f: &ShapeFeatures) -> bool {
    (1.0..=1.3).contains(&f.aspect_ratio)
        && f.jawline_angle > 120.0
        && (f.jaw_forehead_ratio - 1.0).abs() < 0.15
}

fn is_heart(f: &ShapeFeatures) -> bool {
    f.forehead_cheek_ratio > 0.90 && f.jaw_cheek_ratio < 0.75 && f.jawline_angle < 100.0
}

fn is_inverted_triangle(f: &ShapeFeatures) -> bool {
    f.jaw_cheek_ratio > 0.95 && f.forehead_cheek_ratio < 0.80 && f.jawline_angle > 110.0
}

/// Classify precomputed ratios.
pub fn classify_features(features: &ShapeFeatures) -> FaceShape {
    SHAPE_RULES
        .iter()
        .find(|(_, rule)| rule(features))
        .map_or(FaceShape::Oval, |(shape, _)| *shape)
}

/// Classify a face from its measurements.
pub fn classify_measurements(measurements: &FaceMeasurements) -> FaceShape {
    let features = ShapeFeatures::from_measurements(measurements);
    debug!(
        aspect_ratio = features.aspect_ratio,
        jaw_cheek_ratio = features.jaw_cheek_ratio,
        forehead_cheek_ratio = features.forehead_cheek_ratio,
        jaw_forehead_ratio = features.jaw_forehead_ratio,
        jawline_angle = features.jawline_angle,
        "face ratios"
    );
    classify_features(&features)
}

const BASE_CONFIDENCE: f64 = 0.70;
const CONFIDENCE_STEP: f64 = 0.10;
pub const MAX_CONFIDENCE: f64 = 0.95;

/// Confidence of a landmark-based classification, in `[0.70, 0.95]`.
///
/// Extreme aspect ratios or jaw angles count as stronger evidence.
pub fn landmark_confidence(m: &FaceMeasurements) -> f64 {
    let mut confidence = BASE_CONFIDENCE;

    if m.aspect_ratio < 1.0 || m.aspect_ratio > 1.8 {
        confidence += CONFIDENCE_STEP;
    }
    if m.jawline_angle < 90.0 || m.jawline_angle > 130.0 {
        confidence += CONFIDENCE_STEP;
    }
    if m.face_width > 0.0 && m.face_height > 0.0 {
        confidence += CONFIDENCE_STEP;
    }

    confidence.min(MAX_CONFIDENCE)
}
