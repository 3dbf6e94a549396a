use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Paths with fewer segments than this are "nothing to verify".
pub const MIN_VERIFIABLE_SEGMENTS: usize = 2;

/// One straight toolpath move, in millimetres.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub a: Point2<f64>,
    pub b: Point2<f64>,
}

impl Segment {
    pub fn new(a: Point2<f64>, b: Point2<f64>) -> Self {
        Self { a, b }
    }

    pub fn from_xy(ax: f64, ay: f64, bx: f64, by: f64) -> Self {
        Self::new(Point2::new(ax, ay), Point2::new(bx, by))
    }

    /// Euclidean length in millimetres.
    #[inline]
    pub fn length(&self) -> f64 {
        (self.b - self.a).norm()
    }

    /// Point `distance` millimetres from `a` towards `b` (linear interpolation).
    ///
    /// A zero-length segment always yields `a`.
    pub fn point_at(&self, distance: f64) -> Point2<f64> {
        let len = self.length();
        if len <= f64::EPSILON {
            return self.a;
        }
        self.a + (self.b - self.a) * (distance / len)
    }
}

/// Ordered toolpath moves of one extruder on one layer.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExtruderPath {
    segments: Vec<Segment>,
}

impl ExtruderPath {
    pub fn new(segments: Vec<Segment>) -> Self {
        Self { segments }
    }

    /// Open polyline through `points` (one segment per consecutive pair).
    pub fn polyline(points: &[Point2<f64>]) -> Self {
        points
            .windows(2)
            .map(|w| Segment::new(w[0], w[1]))
            .collect()
    }

    #[inline]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.segments.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.segments.is_empty()
    }

    /// `false` for paths the inspection treats as "nothing to verify".
    #[inline]
    pub fn is_verifiable(&self) -> bool {
        self.segments.len() >= MIN_VERIFIABLE_SEGMENTS
    }

    pub fn total_length(&self) -> f64 {
        self.segments.iter().map(Segment::length).sum()
    }
}

impl FromIterator<Segment> for ExtruderPath {
    fn from_iter<I: IntoIterator<Item = Segment>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

/// All extruder paths of one layer, indexed by extruder number.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct LayerToolpath {
    pub extruders: Vec<ExtruderPath>,
}

impl LayerToolpath {
    pub fn new(extruders: Vec<ExtruderPath>) -> Self {
        Self { extruders }
    }

    #[inline]
    pub fn extruder_count(&self) -> usize {
        self.extruders.len()
    }

    #[inline]
    pub fn path(&self, extruder: usize) -> Option<&ExtruderPath> {
        self.extruders.get(extruder)
    }

    /// Bounding box over every extruder's segments.
    pub fn bounds(&self) -> Result<LayerBounds, ConfigError> {
        LayerBounds::from_segments(self.extruders.iter().flat_map(|p| p.segments().iter()))
    }
}

/// Millimetre bounding box of a full layer (all extruders).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LayerBounds {
    pub min_x: f64,
    pub min_y: f64,
    pub max_x: f64,
    pub max_y: f64,
}

impl LayerBounds {
    /// Validated bounds. A zero extent on one axis (a single straight line) is
    /// allowed; zero extent on both axes is not.
    pub fn new(min_x: f64, min_y: f64, max_x: f64, max_y: f64) -> Result<Self, ConfigError> {
        let bounds = Self {
            min_x,
            min_y,
            max_x,
            max_y,
        };
        bounds.validate()?;
        Ok(bounds)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let finite = [self.min_x, self.min_y, self.max_x, self.max_y]
            .iter()
            .all(|v| v.is_finite());
        let inverted = self.max_x < self.min_x || self.max_y < self.min_y;
        let point = self.max_x == self.min_x && self.max_y == self.min_y;
        if !finite || inverted || point {
            return Err(ConfigError::DegenerateBounds {
                min_x: self.min_x,
                min_y: self.min_y,
                max_x: self.max_x,
                max_y: self.max_y,
            });
        }
        Ok(())
    }

    pub fn from_segments<'a, I>(segments: I) -> Result<Self, ConfigError>
    where
        I: IntoIterator<Item = &'a Segment>,
    {
        let mut min_x = f64::INFINITY;
        let mut min_y = f64::INFINITY;
        let mut max_x = f64::NEG_INFINITY;
        let mut max_y = f64::NEG_INFINITY;
        let mut any = false;
        for s in segments {
            for p in [s.a, s.b] {
                min_x = min_x.min(p.x);
                min_y = min_y.min(p.y);
                max_x = max_x.max(p.x);
                max_y = max_y.max(p.y);
            }
            any = true;
        }
        if !any {
            return Err(ConfigError::NoGeometry);
        }
        Self::new(min_x, min_y, max_x, max_y)
    }

    #[inline]
    pub fn range_x(&self) -> f64 {
        self.max_x - self.min_x
    }

    #[inline]
    pub fn range_y(&self) -> f64 {
        self.max_y - self.min_y
    }
}
