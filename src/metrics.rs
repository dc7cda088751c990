//! Face measurements derived from mesh landmarks.
//!
//! Twelve fixed mesh positions are read, grouped into the face-oval extremes,
//! the jawline, the cheekbones and the forehead. From them we derive five
//! widths/heights, the jawline angle and the height/width aspect ratio.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::geometry::{distance, vertex_angle};
use crate::types::{Landmark, LandmarkSet};

/// Mesh indices of the landmarks used for measurement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LandmarkIndices {
    pub oval_top: usize,
    pub oval_bottom: usize,
    pub oval_left: usize,
    pub oval_right: usize,
    pub jaw_left: usize,
    pub jaw_center: usize,
    pub jaw_right: usize,
    pub cheekbone_left: usize,
    pub cheekbone_right: usize,
    pub forehead_left: usize,
    pub forehead_right: usize,
    pub forehead_center: usize,
}

impl LandmarkIndices {
    pub const fn all(&self) -> [usize; 12] {
        [
            self.oval_top,
            self.oval_bottom,
            self.oval_left,
            self.oval_right,
            self.jaw_left,
            self.jaw_center,
            self.jaw_right,
            self.cheekbone_left,
            self.cheekbone_right,
            self.forehead_left,
            self.forehead_right,
            self.forehead_center,
        ]
    }

    /// Smallest landmark set that covers every index.
    pub fn required_len(&self) -> usize {
        self.all().iter().max().map_or(0, |max| max + 1)
    }
}

/// Positions in the 468-point face mesh.
pub const LANDMARK_INDICES: LandmarkIndices = LandmarkIndices {
    oval_top: 10,
    oval_bottom: 152,
    oval_left: 234,
    oval_right: 454,
    jaw_left: 172,
    jaw_center: 18,
    jaw_right: 397,
    cheekbone_left: 137,
    cheekbone_right: 366,
    forehead_left: 21,
    forehead_right: 251,
    forehead_center: 9,
};

/// Geometric measurements of a face, in normalized landmark units.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FaceMeasurements {
    /// Cheek to cheek across the face oval
    pub face_width: f64,

    /// Forehead top to chin bottom
    pub face_height: f64,

    /// Left to right jawline
    pub jaw_width: f64,

    pub cheekbone_width: f64,

    pub forehead_width: f64,

    /// Angle at the chin between the rays to both jaw corners, in degrees
    pub jawline_angle: f64,

    /// face_height / face_width
    pub aspect_ratio: f64,
}

impl FaceMeasurements {
    /// Measure a face from a full landmark set.
    ///
    /// Fails with [`Error::MissingLandmark`] if the set is shorter than the
    /// index table requires and with [`Error::DegenerateGeometry`] if the face
    /// width, cheekbone width or a jaw ray has zero length.
    pub fn from_landmarks(landmarks: &LandmarkSet) -> Result<Self> {
        let idx = &LANDMARK_INDICES;
        let point = |index: usize| -> Result<Landmark> {
            let p = landmarks.get(index)?;
            if !p.is_finite() {
                return Err(Error::Extraction(format!("landmark {index} is not finite")));
            }
            Ok(p)
        };

        // Face oval
        let top = point(idx.oval_top)?;
        let bottom = point(idx.oval_bottom)?;
        let left = point(idx.oval_left)?;
        let right = point(idx.oval_right)?;

        // Jawline
        let jaw_left = point(idx.jaw_left)?;
        let jaw_center = point(idx.jaw_center)?;
        let jaw_right = point(idx.jaw_right)?;

        // Cheekbones
        let cheek_left = point(idx.cheekbone_left)?;
        let cheek_right = point(idx.cheekbone_right)?;

        // Forehead; the center point is part of the extractor contract but
        // does not enter any measurement.
        let forehead_left = point(idx.forehead_left)?;
        let forehead_right = point(idx.forehead_right)?;
        point(idx.forehead_center)?;

        let face_height = distance(&top, &bottom);
        let face_width = distance(&left, &right);
        let jaw_width = distance(&jaw_left, &jaw_right);
        let cheekbone_width = distance(&cheek_left, &cheek_right);
        let forehead_width = distance(&forehead_left, &forehead_right);

        if face_width == 0.0 {
            return Err(Error::DegenerateGeometry("face width"));
        }
        if cheekbone_width == 0.0 {
            return Err(Error::DegenerateGeometry("cheekbone width"));
        }

        // The jaw angle is taken in the image plane.
        let jawline_angle = vertex_angle(
            &jaw_left.planar(),
            &jaw_center.planar(),
            &jaw_right.planar(),
            "jaw ray",
        )?;

        Ok(Self {
            face_width,
            face_height,
            jaw_width,
            cheekbone_width,
            forehead_width,
            jawline_angle,
            aspect_ratio: face_height / face_width,
        })
    }

    /// jaw_width / cheekbone_width
    pub fn jaw_cheek_ratio(&self) -> f64 {
        self.jaw_width / self.cheekbone_width
    }

    /// forehead_width / cheekbone_width
    pub fn forehead_cheek_ratio(&self) -> f64 {
        self.forehead_width / self.cheekbone_width
    }

    /// jaw_width / forehead_width
    pub fn jaw_forehead_ratio(&self) -> f64 {
        self.jaw_width / self.forehead_width
    }
}
