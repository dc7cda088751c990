use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A single facial landmark in normalized coordinates.
///
/// `x` and `y` are roughly in `[0, 1]` relative to the image; `z` is depth
/// on the same scale as `x`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "LandmarkRepr")]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

/// Landmark files come either as `[x, y, z]` triples or as `{x, y, z}` objects.
#[derive(Deserialize)]
#[serde(untagged)]
enum LandmarkRepr {
    Triple([f64; 3]),
    Object {
        x: f64,
        y: f64,
        #[serde(default)]
        z: f64,
    },
}

impl From<LandmarkRepr> for Landmark {
    fn from(repr: LandmarkRepr) -> Self {
        match repr {
            LandmarkRepr::Triple([x, y, z]) => Landmark::new(x, y, z),
            LandmarkRepr::Object { x, y, z } => Landmark::new(x, y, z),
        }
    }
}

impl Landmark {
    pub const fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Projection onto the image plane (depth dropped).
    pub const fn planar(&self) -> Self {
        Self {
            x: self.x,
            y: self.y,
            z: 0.0,
        }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl std::ops::Sub for Landmark {
    type Output = Self;

    fn sub(self, rhs: Self) -> Self::Output {
        Self {
            x: self.x - rhs.x,
            y: self.y - rhs.y,
            z: self.z - rhs.z,
        }
    }
}

/// An ordered set of landmarks as produced by the extractor.
///
/// Point indices follow the 468-point face mesh numbering; see
/// [`crate::LANDMARK_INDICES`] for the positions this crate reads.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkSet {
    pub points: Vec<Landmark>,
}

impl LandmarkSet {
    pub fn new(points: Vec<Landmark>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Fetch a landmark by mesh index, failing if the set is too short.
    pub fn get(&self, index: usize) -> Result<Landmark> {
        self.points
            .get(index)
            .copied()
            .ok_or(Error::MissingLandmark {
                index,
                len: self.points.len(),
            })
    }
}

impl From<Vec<Landmark>> for LandmarkSet {
    fn from(points: Vec<Landmark>) -> Self {
        Self::new(points)
    }
}

impl std::ops::Index<usize> for LandmarkSet {
    type Output = Landmark;

    fn index(&self, idx: usize) -> &Self::Output {
        &self.points[idx]
    }
}

/// The closed set of face shape categories.
///
/// Declaration order is the enumeration order used to break ties in
/// heuristic scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaceShape {
    Oval,
    Round,
    Oblong,
    Square,
    Heart,
    InvertedTriangle,
}

impl FaceShape {
    pub const ALL: [FaceShape; 6] = [
        FaceShape::Oval,
        FaceShape::Round,
        FaceShape::Oblong,
        FaceShape::Square,
        FaceShape::Heart,
        FaceShape::InvertedTriangle,
    ];

    /// Wire label, as used in serialized results.
    pub fn label(&self) -> &'static str {
        match self {
            FaceShape::Oval => "oval",
            FaceShape::Round => "round",
            FaceShape::Oblong => "oblong",
            FaceShape::Square => "square",
            FaceShape::Heart => "heart",
            FaceShape::InvertedTriangle => "inverted_triangle",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            FaceShape::Oval => "Oval",
            FaceShape::Round => "Round",
            FaceShape::Oblong => "Oblong",
            FaceShape::Square => "Square",
            FaceShape::Heart => "Heart",
            FaceShape::InvertedTriangle => "Inverted triangle",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            FaceShape::Oval => "Oval - well-balanced proportions, slightly longer than wide",
            FaceShape::Round => "Round - soft curves with full cheeks",
            FaceShape::Oblong => "Oblong - face noticeably longer than it is wide",
            FaceShape::Square => "Square - defined jawline with a broad forehead",
            FaceShape::Heart => "Heart - wide forehead tapering to a pointed chin",
            FaceShape::InvertedTriangle => {
                "Inverted triangle - narrow forehead with a wide jawline"
            }
        }
    }

    pub(crate) fn index(&self) -> usize {
        match self {
            FaceShape::Oval => 0,
            FaceShape::Round => 1,
            FaceShape::Oblong => 2,
            FaceShape::Square => 3,
            FaceShape::Heart => 4,
            FaceShape::InvertedTriangle => 5,
        }
    }
}

impl fmt::Display for FaceShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FaceShape {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "oval" => Ok(FaceShape::Oval),
            "round" => Ok(FaceShape::Round),
            "oblong" => Ok(FaceShape::Oblong),
            "square" => Ok(FaceShape::Square),
            "heart" => Ok(FaceShape::Heart),
            "inverted_triangle" | "inverted-triangle" => Ok(FaceShape::InvertedTriangle),
            other => Err(format!("unknown face shape '{other}'")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn landmark_arithmetic() {
        let a = Landmark::new(1.0, 2.0, 3.0);
        let b = Landmark::new(3.0, 4.0, 5.0);

        let diff = b - a;
        assert_eq!(diff, Landmark::new(2.0, 2.0, 2.0));

        assert_eq!(b.planar().z, 0.0);
    }

    #[test]
    fn short_set_reports_missing_index() {
        let set = LandmarkSet::new(vec![Landmark::new(0.0, 0.0, 0.0); 3]);
        assert!(set.get(2).is_ok());
        match set.get(152) {
            Err(Error::MissingLandmark { index, len }) => {
                assert_eq!(index, 152);
                assert_eq!(len, 3);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn landmark_set_accepts_both_json_forms() {
        let triples: LandmarkSet = serde_json::from_str("[[0.1, 0.2, 0.3], [0.4, 0.5, 0.6]]").unwrap();
        assert_eq!(triples.len(), 2);
        assert_eq!(triples[1], Landmark::new(0.4, 0.5, 0.6));

        let objects: LandmarkSet =
            serde_json::from_str(r#"[{"x": 0.1, "y": 0.2, "z": 0.3}, {"x": 0.5, "y": 0.5}]"#)
                .unwrap();
        assert_eq!(objects[0], Landmark::new(0.1, 0.2, 0.3));
        assert_eq!(objects[1].z, 0.0);
    }

    #[test]
    fn face_shape_labels() {
        assert_eq!(
            serde_json::to_string(&FaceShape::InvertedTriangle).unwrap(),
            "\"inverted_triangle\""
        );
        for shape in FaceShape::ALL {
            assert_eq!(shape.label().parse::<FaceShape>().unwrap(), shape);
            assert_eq!(FaceShape::ALL[shape.index()], shape);
        }
        assert_eq!(
            "Inverted-Triangle".parse::<FaceShape>().unwrap(),
            FaceShape::InvertedTriangle
        );
        assert!("diamond".parse::<FaceShape>().is_err());
    }
}
