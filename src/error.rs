use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("landmark extraction failed: {0}")]
    Extraction(String),

    #[error("degenerate face geometry: {0} has zero length")]
    DegenerateGeometry(&'static str),

    #[error("landmark {index} requested from a set of {len} points")]
    MissingLandmark { index: usize, len: usize },

    #[error("image rejected: {0}")]
    Validation(#[from] ValidationFailure),

    #[error("image header could not be decoded: {0}")]
    Decode(String),

    #[error("no image data and no landmarks were supplied")]
    MissingInput,

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl Error {
    /// Whether the orchestrator may recover from this error by moving to the next tier.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::Extraction(_)
                | Error::DegenerateGeometry(_)
                | Error::MissingLandmark { .. }
                | Error::Decode(_)
        )
    }
}

/// A user-correctable reason an image was rejected by the heuristic tier.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationFailure {
    #[error("resolution {width}x{height} is below the {min}px minimum")]
    ResolutionTooLow { width: u32, height: u32, min: u32 },

    #[error("file size {size} bytes exceeds the {max} byte limit")]
    FileTooLarge { size: usize, max: usize },

    #[error("aspect ratio {ratio:.3} is outside [{min}, {max}]")]
    AspectRatioOutOfRange { ratio: f64, min: f64, max: f64 },
}

pub type Result<T> = std::result::Result<T, Error>;
