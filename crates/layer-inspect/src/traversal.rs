//! Coverage check along the toolpath.
//!
//! Each segment is walked in steps of half the extrusion width. At every
//! sample point a disk of the scaled extrusion width is laid over the
//! classified image; if too few of its pixels carry the highlight colour the
//! point is a defect and gets a filled disk on the report image.
//!
//! Out-of-image policy: the sampling window is clipped to the image and the
//! clipped-away kernel pixels count as non-matching (the denominator is
//! always the full kernel size).

use layer_inspect_core::{
    validate_extrusion_width, Bgr, ColorImage, ConfigError, CoordinateMapper, ExtruderPath,
};
use nalgebra::Point2;
use serde::{Deserialize, Serialize};

use crate::params::TraversalParams;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Filled-circle sampling footprint, `diameter × diameter` pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CircleKernel {
    diameter: i32,
    /// Kernel pixels relative to the window's top-left corner.
    offsets: Vec<(i32, i32)>,
}

impl CircleKernel {
    /// Disk of radius `diameter / 2` centred at `(diameter / 2, diameter / 2)`,
    /// cut to the `diameter × diameter` window. Diameters below 1 become 1.
    pub fn new(diameter: i32) -> Self {
        let diameter = diameter.max(1);
        let c = diameter / 2;
        let r2 = c * c;
        let mut offsets = Vec::new();
        for ky in 0..diameter {
            for kx in 0..diameter {
                if (kx - c).pow(2) + (ky - c).pow(2) <= r2 {
                    offsets.push((kx, ky));
                }
            }
        }
        Self { diameter, offsets }
    }

    #[inline]
    pub fn diameter(&self) -> i32 {
        self.diameter
    }

    #[inline]
    pub fn radius(&self) -> i32 {
        self.diameter / 2
    }

    /// Number of kernel pixels (`circle_pixels`).
    #[inline]
    pub fn pixel_count(&self) -> usize {
        self.offsets.len()
    }

    /// Window-relative kernel pixels, row-major.
    pub fn offsets(&self) -> &[(i32, i32)] {
        &self.offsets
    }

    /// Top-left corner of the window centred on `center`.
    #[inline]
    pub fn window_origin(&self, center: Point2<i32>) -> Point2<i32> {
        Point2::new(center.x - self.radius(), center.y - self.radius())
    }

    /// Count kernel pixels exactly equal to `color` in the window around `center`.
    pub fn coverage(&self, image: &ColorImage, center: Point2<i32>, color: Bgr) -> Coverage {
        let origin = self.window_origin(center);
        let matched = self
            .offsets
            .iter()
            .filter(|&&(kx, ky)| image.get(origin.x + kx, origin.y + ky) == Some(color))
            .count();
        Coverage {
            matched,
            total: self.pixel_count(),
        }
    }
}

/// Highlighted pixels inside one kernel window.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coverage {
    pub matched: usize,
    pub total: usize,
}

impl Coverage {
    #[inline]
    pub fn ratio(&self) -> f64 {
        if self.total == 0 {
            return 0.0;
        }
        self.matched as f64 / self.total as f64
    }

    /// `true` when the ratio is strictly below `min_coverage`.
    #[inline]
    pub fn is_underfilled(&self, min_coverage: f64) -> bool {
        self.ratio() < min_coverage
    }
}

/// One underfilled sample point.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct DefectSite {
    /// Index of the segment within the extruder path.
    pub segment: usize,
    /// Arc length from the segment start, millimetres.
    pub distance_mm: f64,
    pub point_mm: Point2<f64>,
    pub pixel: Point2<i32>,
    pub coverage: f64,
}

/// Outcome of walking one extruder's path.
#[derive(Clone, Debug)]
pub struct DefectReport {
    pub passed: bool,
    /// Original image with a filled disk on every defect.
    pub image: ColorImage,
    pub defects: Vec<DefectSite>,
    pub samples_checked: usize,
}

/// Walk `path` over the `classified` image and report underfilled sample points.
///
/// Paths with fewer than two segments pass with an unchanged copy of `original`.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip_all, fields(segments = path.len()))
)]
pub fn inspect_path(
    classified: &ColorImage,
    original: &ColorImage,
    mapper: &CoordinateMapper,
    path: &ExtruderPath,
    extrusion_width_mm: f64,
    highlight: Bgr,
    params: &TraversalParams,
) -> Result<DefectReport, ConfigError> {
    validate_extrusion_width(extrusion_width_mm)?;

    let mut image = original.clone();
    let mut defects = Vec::new();
    let mut samples_checked = 0usize;

    if path.is_verifiable() {
        let kernel = CircleKernel::new(mapper.scaled_width(extrusion_width_mm));
        let step = extrusion_width_mm / 2.0;

        for (segment, seg) in path.segments().iter().enumerate() {
            let length = seg.length();
            let mut k = 0usize;
            loop {
                let distance = k as f64 * step;
                if distance >= length {
                    break;
                }
                k += 1;
                samples_checked += 1;

                let point_mm = seg.point_at(distance);
                let pixel = mapper.translate(point_mm);
                let coverage = kernel.coverage(classified, pixel, highlight);
                if coverage.is_underfilled(params.min_coverage) {
                    image.fill_disk(pixel, kernel.radius(), params.defect_color);
                    defects.push(DefectSite {
                        segment,
                        distance_mm: distance,
                        point_mm,
                        pixel,
                        coverage: coverage.ratio(),
                    });
                }
            }
        }
        log::debug!(
            "traversal: {} of {samples_checked} sample points underfilled (kernel {} px, {} pixels)",
            defects.len(),
            kernel.diameter(),
            kernel.pixel_count()
        );
    }

    Ok(DefectReport {
        passed: defects.is_empty(),
        image,
        defects,
        samples_checked,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use layer_inspect_core::{LayerBounds, PixelDensity, Segment};

    const RED: Bgr = [0, 0, 255];

    #[test]
    fn kernel_sizes() {
        assert_eq!(CircleKernel::new(0).pixel_count(), 1);
        assert_eq!(CircleKernel::new(1).pixel_count(), 1);
        assert_eq!(CircleKernel::new(3).pixel_count(), 5);
        assert_eq!(CircleKernel::new(4).pixel_count(), 11);
        assert_eq!(CircleKernel::new(5).pixel_count(), 13);
        let k = CircleKernel::new(6);
        assert!(k.offsets().iter().all(|&(x, y)| (0..6).contains(&x) && (0..6).contains(&y)));
    }

    #[test]
    fn coverage_counts_exact_colour_matches() {
        let kernel = CircleKernel::new(5);
        let mut img = ColorImage::new(20, 20);
        let center = Point2::new(10, 10);
        let origin = kernel.window_origin(center);
        for &(kx, ky) in kernel.offsets().iter().take(4) {
            img.set((origin.x + kx) as usize, (origin.y + ky) as usize, RED);
        }
        // near-miss colour does not count
        let &(kx, ky) = kernel.offsets().last().expect("non-empty");
        img.set((origin.x + kx) as usize, (origin.y + ky) as usize, [0, 0, 254]);
        let cov = kernel.coverage(&img, center, RED);
        assert_eq!(cov, Coverage { matched: 4, total: 13 });
    }

    #[test]
    fn threshold_is_strict() {
        assert!(!Coverage { matched: 3, total: 10 }.is_underfilled(0.3));
        assert!(Coverage { matched: 299, total: 1000 }.is_underfilled(0.3));
        assert!(Coverage { matched: 0, total: 0 }.is_underfilled(0.3));
    }

    #[test]
    fn windows_past_the_edge_count_as_uncovered() {
        let kernel = CircleKernel::new(5);
        let img = ColorImage::filled(10, 10, RED);
        let inside = kernel.coverage(&img, Point2::new(5, 5), RED);
        assert_eq!(inside.matched, inside.total);
        let corner = kernel.coverage(&img, Point2::new(0, 0), RED);
        assert_eq!(corner.matched, 6);
        assert_eq!(corner.total, 13);
        let outside = kernel.coverage(&img, Point2::new(-50, 3), RED);
        assert_eq!(outside.matched, 0);
    }

    fn mapper() -> CoordinateMapper {
        let bounds = LayerBounds::new(0.0, 0.0, 20.0, 10.0).expect("bounds");
        CoordinateMapper::new(PixelDensity::uniform(10.0).expect("density"), &bounds, 300, 200)
            .expect("mapper")
    }

    #[test]
    fn short_paths_pass_untouched() {
        let m = mapper();
        let original = ColorImage::filled(300, 200, [10, 20, 30]);
        let classified = ColorImage::new(300, 200);
        let single = ExtruderPath::new(vec![Segment::from_xy(0.0, 5.0, 20.0, 5.0)]);
        for path in [ExtruderPath::default(), single] {
            let report = inspect_path(
                &classified,
                &original,
                &m,
                &path,
                0.4,
                RED,
                &TraversalParams::default(),
            )
            .expect("report");
            assert!(report.passed);
            assert_eq!(report.image, original);
            assert_eq!(report.samples_checked, 0);
        }
    }

    #[test]
    fn samples_every_half_width_up_to_segment_end() {
        let m = mapper();
        let img = ColorImage::filled(300, 200, RED);
        let path = ExtruderPath::new(vec![
            Segment::from_xy(0.0, 5.0, 1.0, 5.0),
            Segment::from_xy(1.0, 5.0, 1.0, 6.1),
        ]);
        let report =
            inspect_path(&img, &img, &m, &path, 0.4, RED, &TraversalParams::default()).expect("ok");
        // 0.0, 0.2, .., 0.8 on the first segment; 0.0, .., 1.0 on the second
        assert_eq!(report.samples_checked, 5 + 6);
        assert!(report.passed);
    }

    #[test]
    fn invalid_width_is_rejected() {
        let m = mapper();
        let img = ColorImage::new(300, 200);
        let path = ExtruderPath::default();
        let err = inspect_path(&img, &img, &m, &path, 0.0, RED, &TraversalParams::default());
        assert_eq!(err.err(), Some(ConfigError::InvalidExtrusionWidth(0.0)));
    }
}
