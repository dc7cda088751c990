//! Coarse face shape estimate from image metadata alone.
//!
//! Used when no landmarks are available. Each category starts from a fixed
//! prior and is nudged by the image aspect ratio, resolution and file size.

use crate::classifier::MAX_CONFIDENCE;
use crate::config::ValidationLimits;
use crate::error::ValidationFailure;
use crate::image_info::ImageMetadata;
use crate::types::FaceShape;

const MIB: usize = 1024 * 1024;

/// Added to the winning score to obtain a confidence.
const CONFIDENCE_OFFSET: f64 = 0.60;

/// Per-category weights, indexed in [`FaceShape::ALL`] order.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShapeScores {
    scores: [f64; 6],
}

impl ShapeScores {
    pub fn priors() -> Self {
        let mut scores = Self { scores: [0.0; 6] };
        scores.set(FaceShape::Oval, 0.20);
        scores.set(FaceShape::Round, 0.15);
        scores.set(FaceShape::Oblong, 0.15);
        scores.set(FaceShape::Square, 0.15);
        scores.set(FaceShape::Heart, 0.15);
        scores.set(FaceShape::InvertedTriangle, 0.20);
        scores
    }

    pub fn get(&self, shape: FaceShape) -> f64 {
        self.scores[shape.index()]
    }

    pub fn set(&mut self, shape: FaceShape, value: f64) {
        self.scores[shape.index()] = value;
    }

    pub fn add(&mut self, shape: FaceShape, delta: f64) {
        self.scores[shape.index()] += delta;
    }

    pub fn iter(&self) -> impl Iterator<Item = (FaceShape, f64)> + '_ {
        FaceShape::ALL.iter().map(move |&shape| (shape, self.get(shape)))
    }

    /// Highest-scoring category; ties go to the earliest in enumeration order.
    pub fn best(&self) -> (FaceShape, f64) {
        self.iter()
            .fold((FaceShape::Oval, f64::NEG_INFINITY), |best, candidate| {
                if candidate.1 > best.1 {
                    candidate
                } else {
                    best
                }
            })
    }
}

/// Outcome of heuristic scoring.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeuristicEstimate {
    pub shape: FaceShape,
    pub confidence: f64,
    pub scores: ShapeScores,
}

/// Check that an image is usable for heuristic scoring.
pub fn validate_metadata(
    meta: &ImageMetadata,
    limits: &ValidationLimits,
) -> Result<(), ValidationFailure> {
    if meta.width < limits.min_dimension || meta.height < limits.min_dimension {
        return Err(ValidationFailure::ResolutionTooLow {
            width: meta.width,
            height: meta.height,
            min: limits.min_dimension,
        });
    }
    if meta.size_bytes > limits.max_file_size {
        return Err(ValidationFailure::FileTooLarge {
            size: meta.size_bytes,
            max: limits.max_file_size,
        });
    }
    if meta.aspect_ratio > limits.max_aspect_ratio || meta.aspect_ratio < limits.min_aspect_ratio
    {
        return Err(ValidationFailure::AspectRatioOutOfRange {
            ratio: meta.aspect_ratio,
            min: limits.min_aspect_ratio,
            max: limits.max_aspect_ratio,
        });
    }
    Ok(())
}

/// Apply the metadata adjustments to the priors.
pub fn score_metadata(meta: &ImageMetadata) -> ShapeScores {
    let mut scores = ShapeScores::priors();

    if meta.aspect_ratio > 1.2 {
        scores.add(FaceShape::Round, 0.20);
        scores.add(FaceShape::Square, 0.15);
        scores.add(FaceShape::Oblong, -0.10);
    }
    if meta.aspect_ratio < 0.9 {
        scores.add(FaceShape::Oblong, 0.20);
        scores.add(FaceShape::Heart, 0.15);
        scores.add(FaceShape::Round, -0.10);
    }
    if meta.width > 1000 && meta.height > 1000 {
        scores.add(FaceShape::Oval, 0.10);
        scores.add(FaceShape::Heart, 0.10);
    }
    if meta.size_bytes > 2 * MIB {
        scores.add(FaceShape::Oval, 0.05);
        scores.add(FaceShape::Square, 0.05);
    }

    scores
}

/// Validate, score and pick a category from image metadata.
pub fn classify_metadata(
    meta: &ImageMetadata,
    limits: &ValidationLimits,
) -> Result<HeuristicEstimate, ValidationFailure> {
    validate_metadata(meta, limits)?;
    let scores = score_metadata(meta);
    let (shape, score) = scores.best();
    Ok(HeuristicEstimate {
        shape,
        confidence: (score + CONFIDENCE_OFFSET).min(MAX_CONFIDENCE),
        scores,
    })
}
