//! Two-tier analysis with a guaranteed answer.
//!
//! The landmark tier runs first when landmarks are available. Any extraction
//! or geometry failure drops to the metadata heuristic, and a rejected or
//! failing heuristic drops to a fixed oval answer. Each tier runs at most once
//! per call.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::time::timeout;
use tracing::{debug, warn};

use crate::classifier::{classify_measurements, landmark_confidence};
use crate::config::{AnalyzerConfig, ValidationLimits};
use crate::error::{Error, Result};
use crate::extractor::{Detection, LandmarkExtractor};
use crate::heuristic::classify_metadata;
use crate::image_info::ImageMetadata;
use crate::metrics::FaceMeasurements;
use crate::types::{FaceShape, LandmarkSet};

/// Confidence reported with the safe default.
pub const SAFE_DEFAULT_CONFIDENCE: f64 = 0.65;

/// Which strategy produced a result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Landmark,
    Heuristic,
    SafeDefault,
}

/// Image facts reported alongside a heuristic result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageInfo {
    pub width: u32,
    pub height: u32,
    /// Encoded size in bytes
    pub size: usize,
}

impl From<&ImageMetadata> for ImageInfo {
    fn from(meta: &ImageMetadata) -> Self {
        ImageInfo {
            width: meta.width,
            height: meta.height,
            size: meta.size_bytes,
        }
    }
}

/// The answer to one analysis call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub face_shape: FaceShape,
    pub description: String,
    /// In `[0.60, 0.95]`
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub measurements: Option<FaceMeasurements>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_info: Option<ImageInfo>,
    /// Number of landmarks the landmark tier consumed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub landmark_count: Option<usize>,
}

impl AnalysisResult {
    fn new(face_shape: FaceShape, confidence: f64) -> Self {
        AnalysisResult {
            face_shape,
            description: face_shape.description().to_string(),
            confidence,
            measurements: None,
            image_info: None,
            landmark_count: None,
        }
    }

    /// The fixed answer when neither tier produced one.
    pub fn safe_default() -> Self {
        Self::new(FaceShape::Oval, SAFE_DEFAULT_CONFIDENCE)
    }

    pub fn tier(&self) -> Tier {
        if self.measurements.is_some() {
            Tier::Landmark
        } else if self.image_info.is_some() {
            Tier::Heuristic
        } else {
            Tier::SafeDefault
        }
    }
}

/// Orchestrator states; `Done` carries the final answer.
enum Step<'a> {
    AttemptLandmark(&'a LandmarkSet),
    AttemptHeuristic,
    SafeDefault,
    Done(AnalysisResult),
}

/// Face shape analyzer.
///
/// Holds only configuration, so one instance can serve concurrent calls.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    config: AnalyzerConfig,
}

impl Analyzer {
    pub fn new(config: AnalyzerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn builder() -> AnalyzerBuilder {
        AnalyzerBuilder::new()
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Analyze an image, using landmarks when the caller already has them.
    ///
    /// Fails only with [`Error::MissingInput`] when there is neither image
    /// data nor landmarks, or with [`Error::Validation`] in strict mode.
    pub fn analyze(&self, image: &[u8], landmarks: Option<&LandmarkSet>) -> Result<AnalysisResult> {
        if image.is_empty() && landmarks.is_none() {
            return Err(Error::MissingInput);
        }
        debug!(
            image_bytes = image.len(),
            landmarks = landmarks.map(LandmarkSet::len),
            "starting face shape analysis"
        );

        let mut step = match landmarks {
            Some(set) => Step::AttemptLandmark(set),
            None => Step::AttemptHeuristic,
        };

        let result = loop {
            step = match step {
                Step::AttemptLandmark(set) => match self.landmark_tier(set) {
                    Ok(result) => Step::Done(result),
                    Err(err) => {
                        warn!(error = %err, "landmark analysis failed, using image metadata");
                        Step::AttemptHeuristic
                    }
                },
                Step::AttemptHeuristic => match self.heuristic_tier(image) {
                    Ok(result) => Step::Done(result),
                    Err(Error::Validation(failure)) if self.config.strict_validation => {
                        return Err(Error::Validation(failure));
                    }
                    Err(err) => {
                        warn!(error = %err, "metadata analysis failed, using safe default");
                        Step::SafeDefault
                    }
                },
                Step::SafeDefault => Step::Done(AnalysisResult::safe_default()),
                Step::Done(result) => break result,
            };
        };

        debug!(
            face_shape = %result.face_shape,
            confidence = result.confidence,
            tier = ?result.tier(),
            "face shape analysis finished"
        );
        Ok(result)
    }

    /// Extract landmarks with `extractor`, then analyze.
    ///
    /// Warm-up and extraction are each bounded by the configured timeouts;
    /// a timeout, an extractor error or an image without faces all continue
    /// with the metadata heuristic. Must be awaited inside a tokio runtime.
    pub async fn analyze_with_extractor<E: LandmarkExtractor>(
        &self,
        extractor: &E,
        image: &[u8],
    ) -> Result<AnalysisResult> {
        if image.is_empty() {
            return Err(Error::MissingInput);
        }
        match self.extract(extractor, image).await {
            Ok(detection) => {
                debug!(
                    faces = detection.faces.len(),
                    width = detection.image_width,
                    height = detection.image_height,
                    "landmarks extracted"
                );
                self.analyze(image, detection.primary_face())
            }
            Err(err) => {
                warn!(error = %err, "landmark extraction failed, using image metadata");
                self.analyze(image, None)
            }
        }
    }

    async fn extract<E: LandmarkExtractor>(&self, extractor: &E, image: &[u8]) -> Result<Detection> {
        bounded(self.config.warmup_timeout(), "warm-up", extractor.initialize()).await?;
        let detection = bounded(
            self.config.extraction_timeout(),
            "extraction",
            extractor.extract_landmarks(image),
        )
        .await?;
        if detection.faces.is_empty() {
            return Err(Error::Extraction("no face detected".into()));
        }
        Ok(detection)
    }

    /// Classify from landmarks only, surfacing any failure.
    pub fn landmark_tier(&self, landmarks: &LandmarkSet) -> Result<AnalysisResult> {
        let measurements = FaceMeasurements::from_landmarks(landmarks)?;
        let shape = classify_measurements(&measurements);
        let mut result = AnalysisResult::new(shape, landmark_confidence(&measurements));
        result.measurements = Some(measurements);
        result.landmark_count = Some(landmarks.len());
        Ok(result)
    }

    /// Classify from image metadata only, surfacing validation failures.
    ///
    /// Empty image data has no metadata and fails with [`Error::MissingInput`].
    pub fn heuristic_tier(&self, image: &[u8]) -> Result<AnalysisResult> {
        if image.is_empty() {
            return Err(Error::MissingInput);
        }
        let meta = ImageMetadata::from_bytes(image);
        let estimate = classify_metadata(&meta, &self.config.limits)?;
        let mut result = AnalysisResult::new(estimate.shape, estimate.confidence);
        result.image_info = Some(ImageInfo::from(&meta));
        Ok(result)
    }
}

async fn bounded<T, F>(limit: Duration, stage: &str, fut: F) -> Result<T>
where
    F: std::future::Future<Output = Result<T>>,
{
    match timeout(limit, fut).await {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(Error::Extraction(format!("{stage}: {err}"))),
        Err(_) => Err(Error::Extraction(format!(
            "{stage} timed out after {} ms",
            limit.as_millis()
        ))),
    }
}

/// Builder for an [`Analyzer`].
pub struct AnalyzerBuilder {
    config: AnalyzerConfig,
}

impl AnalyzerBuilder {
    pub fn new() -> Self {
        Self {
            config: AnalyzerConfig::default(),
        }
    }

    /// Replace the whole configuration.
    pub fn config(mut self, config: AnalyzerConfig) -> Self {
        self.config = config;
        self
    }

    pub fn limits(mut self, limits: ValidationLimits) -> Self {
        self.config.limits = limits;
        self
    }

    pub fn warmup_timeout(mut self, limit: Duration) -> Self {
        self.config.warmup_timeout_ms = limit.as_millis() as u64;
        self
    }

    pub fn extraction_timeout(mut self, limit: Duration) -> Self {
        self.config.extraction_timeout_ms = limit.as_millis() as u64;
        self
    }

    pub fn strict_validation(mut self, strict: bool) -> Self {
        self.config.strict_validation = strict;
        self
    }

    pub fn build(self) -> Result<Analyzer> {
        Analyzer::new(self.config)
    }
}

impl Default for AnalyzerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::metrics::tests::{synthetic_face, FaceSpec};
    use crate::types::Landmark;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let mut buf = vec![0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];
        buf.extend_from_slice(&13u32.to_be_bytes());
        buf.extend_from_slice(b"IHDR");
        buf.extend_from_slice(&width.to_be_bytes());
        buf.extend_from_slice(&height.to_be_bytes());
        buf
    }

    fn heart_face() -> LandmarkSet {
        synthetic_face(&FaceSpec {
            width: 0.5,
            height: 0.75,
            jaw: 0.3,
            cheekbone: 0.5,
            forehead: 0.48,
            chin_drop: 0.25,
        })
    }

    enum Behaviour {
        Face(LandmarkSet),
        NoFace,
        Fail,
        Hang,
        SlowWarmup,
    }

    struct FakeExtractor {
        behaviour: Behaviour,
        calls: AtomicUsize,
    }

    impl FakeExtractor {
        fn new(behaviour: Behaviour) -> Self {
            Self {
                behaviour,
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl LandmarkExtractor for FakeExtractor {
        async fn initialize(&self) -> Result<()> {
            if let Behaviour::SlowWarmup = self.behaviour {
                tokio::time::sleep(Duration::from_secs(60)).await;
            }
            Ok(())
        }

        async fn extract_landmarks(&self, _image: &[u8]) -> Result<Detection> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.behaviour {
                Behaviour::Face(set) => Ok(Detection::single(set.clone(), 640, 480)),
                Behaviour::NoFace => Ok(Detection::default()),
                Behaviour::Fail => Err(Error::Extraction("model not loaded".into())),
                Behaviour::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(Detection::default())
                }
                Behaviour::SlowWarmup => Ok(Detection::default()),
            }
        }
    }

    #[test]
    fn landmarks_take_priority() {
        let analyzer = Analyzer::default();
        let result = analyzer.analyze(&png(800, 600), Some(&heart_face())).unwrap();
        assert_eq!(result.face_shape, FaceShape::Heart);
        assert_eq!(result.tier(), Tier::Landmark);
        assert_eq!(result.landmark_count, Some(468));
        assert!(result.image_info.is_none());
        assert_eq!(result.description, FaceShape::Heart.description());
    }

    #[test]
    fn degenerate_landmarks_fall_back_to_metadata() {
        let analyzer = Analyzer::default();
        let flat = LandmarkSet::new(vec![Landmark::new(0.5, 0.5, 0.0); 468]);
        let result = analyzer.analyze(&png(600, 800), Some(&flat)).unwrap();
        assert_eq!(result.tier(), Tier::Heuristic);
        assert_eq!(result.face_shape, FaceShape::Oblong);
        assert_eq!(
            result.image_info,
            Some(ImageInfo {
                width: 600,
                height: 800,
                size: 24
            })
        );
    }

    #[test]
    fn short_landmark_set_falls_back() {
        let analyzer = Analyzer::default();
        let short = LandmarkSet::new(vec![Landmark::new(0.1, 0.2, 0.0); 100]);
        let result = analyzer.analyze(&png(500, 500), Some(&short)).unwrap();
        assert_eq!(result.tier(), Tier::Heuristic);
    }

    #[test]
    fn invalid_metadata_gives_safe_default() {
        let analyzer = Analyzer::default();
        let result = analyzer.analyze(&png(100, 100), None).unwrap();
        assert_eq!(result, AnalysisResult::safe_default());
        assert_eq!(result.face_shape, FaceShape::Oval);
        assert!((result.confidence - 0.65).abs() < 1e-12);
        assert_eq!(result.tier(), Tier::SafeDefault);
    }

    #[test]
    fn strict_mode_surfaces_validation_failure() {
        let analyzer = Analyzer::builder().strict_validation(true).build().unwrap();
        match analyzer.analyze(&png(100, 100), None) {
            Err(Error::Validation(failure)) => {
                assert!(failure.to_string().contains("100x100"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn missing_input_is_an_error() {
        let analyzer = Analyzer::default();
        assert!(matches!(analyzer.analyze(&[], None), Err(Error::MissingInput)));
    }

    #[test]
    fn landmarks_without_image_still_classify() {
        let analyzer = Analyzer::default();
        let result = analyzer.analyze(&[], Some(&heart_face())).unwrap();
        assert_eq!(result.face_shape, FaceShape::Heart);
    }

    #[test]
    fn failed_landmarks_without_image_give_safe_default() {
        let analyzer = Analyzer::default();
        let short = LandmarkSet::new(vec![Landmark::new(0.4, 0.4, 0.0); 10]);
        let result = analyzer.analyze(&[], Some(&short)).unwrap();
        assert_eq!(result, AnalysisResult::safe_default());
        assert!(result.image_info.is_none());

        let strict = Analyzer::builder().strict_validation(true).build().unwrap();
        assert_eq!(
            strict.analyze(&[], Some(&short)).unwrap(),
            AnalysisResult::safe_default()
        );
        assert!(matches!(analyzer.heuristic_tier(&[]), Err(Error::MissingInput)));
    }

    #[test]
    fn builder_rejects_zero_timeout() {
        let built = Analyzer::builder()
            .extraction_timeout(Duration::from_millis(0))
            .build();
        assert!(matches!(built, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn serializes_documented_shape() {
        let analyzer = Analyzer::default();
        let result = analyzer.analyze(&png(600, 800), None).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["faceShape"], "oblong");
        assert_eq!(json["imageInfo"]["width"], 600);
        assert_eq!(json["imageInfo"]["size"], 24);
        assert!(json.get("measurements").is_none());
        assert!(json.get("landmarkCount").is_none());

        let result = analyzer.analyze(&[], Some(&heart_face())).unwrap();
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["faceShape"], "heart");
        assert!(json["measurements"]["jawlineAngle"].is_number());
        assert!(json.get("imageInfo").is_none());
    }

    #[tokio::test]
    async fn extractor_face_is_used() {
        let analyzer = Analyzer::default();
        let extractor = FakeExtractor::new(Behaviour::Face(heart_face()));
        let result = analyzer
            .analyze_with_extractor(&extractor, &png(800, 600))
            .await
            .unwrap();
        assert_eq!(result.face_shape, FaceShape::Heart);
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn no_face_falls_back_once() {
        let analyzer = Analyzer::default();
        let extractor = FakeExtractor::new(Behaviour::NoFace);
        let result = analyzer
            .analyze_with_extractor(&extractor, &png(800, 600))
            .await
            .unwrap();
        assert_eq!(result.tier(), Tier::Heuristic);
        assert_eq!(result.face_shape, FaceShape::Round);
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn extractor_error_falls_back() {
        let analyzer = Analyzer::default();
        let extractor = FakeExtractor::new(Behaviour::Fail);
        let result = analyzer
            .analyze_with_extractor(&extractor, &png(150, 150))
            .await
            .unwrap();
        assert_eq!(result, AnalysisResult::safe_default());
    }

    #[tokio::test(start_paused = true)]
    async fn extraction_timeout_falls_back() {
        let analyzer = Analyzer::default();
        let extractor = FakeExtractor::new(Behaviour::Hang);
        let result = analyzer
            .analyze_with_extractor(&extractor, &png(500, 500))
            .await
            .unwrap();
        assert_eq!(result.tier(), Tier::Heuristic);
        assert_eq!(result.face_shape, FaceShape::Oval);
    }

    #[tokio::test(start_paused = true)]
    async fn warmup_timeout_falls_back() {
        let analyzer = Analyzer::default();
        let extractor = FakeExtractor::new(Behaviour::SlowWarmup);
        let result = analyzer
            .analyze_with_extractor(&extractor, &png(500, 500))
            .await
            .unwrap();
        assert_eq!(result.tier(), Tier::Heuristic);
        assert_eq!(extractor.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn extractor_requires_image() {
        let analyzer = Analyzer::default();
        let extractor = FakeExtractor::new(Behaviour::NoFace);
        assert!(matches!(
            analyzer.analyze_with_extractor(&extractor, &[]).await,
            Err(Error::MissingInput)
        ));
    }
}
