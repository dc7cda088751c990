use std::future::Future;

use crate::error::Result;
use crate::types::LandmarkSet;

/// Faces found by a landmark extractor in one image.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Detection {
    /// One landmark set per detected face, most prominent first.
    pub faces: Vec<LandmarkSet>,
    pub image_width: u32,
    pub image_height: u32,
}

impl Detection {
    pub fn single(face: LandmarkSet, image_width: u32, image_height: u32) -> Self {
        Self {
            faces: vec![face],
            image_width,
            image_height,
        }
    }

    /// The face to analyze, or `None` if nothing was detected.
    pub fn primary_face(&self) -> Option<&LandmarkSet> {
        self.faces.first()
    }
}

/// Pluggable face-mesh landmark extraction.
///
/// Implement this trait to connect a face-mesh model or service and pass it
/// to [`crate::Analyzer::analyze_with_extractor`]. Implementations may be
/// I/O-bound; the analyzer bounds both calls with timeouts.
pub trait LandmarkExtractor: Send + Sync {
    /// Prepare the underlying model. Called before every extraction, so it
    /// must be cheap once initialization has completed.
    fn initialize(&self) -> impl Future<Output = Result<()>> + Send {
        async { Ok(()) }
    }

    /// Extract landmarks from encoded image bytes.
    ///
    /// A detection with no faces means no face was found.
    fn extract_landmarks(&self, image: &[u8]) -> impl Future<Output = Result<Detection>> + Send;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Landmark;

    #[test]
    fn primary_face_is_first() {
        let a = LandmarkSet::new(vec![Landmark::new(0.1, 0.1, 0.0)]);
        let b = LandmarkSet::new(vec![Landmark::new(0.9, 0.9, 0.0)]);
        let detection = Detection {
            faces: vec![a.clone(), b],
            image_width: 640,
            image_height: 480,
        };
        assert_eq!(detection.primary_face(), Some(&a));
        assert!(Detection::default().primary_face().is_none());
    }
}
