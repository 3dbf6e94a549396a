use layer_inspect::core::{
    Bgr, ColorImage, CoordinateMapper, ExtruderPath, LayerBounds, PixelDensity, Segment,
};
use layer_inspect::{inspect_path, CircleKernel, TraversalParams};

const RED: Bgr = [0, 0, 255];
const GREY: Bgr = [90, 90, 90];

fn mapper(width: usize, height: usize) -> CoordinateMapper {
    let bounds = LayerBounds::new(0.0, 0.0, 20.0, 10.0).expect("bounds");
    CoordinateMapper::new(PixelDensity::uniform(10.0).expect("density"), &bounds, width, height)
        .expect("mapper")
}

/// y = 5 mm across the whole layer: row 100, cols 50..=250.
fn centre_line() -> ExtruderPath {
    ExtruderPath::new(vec![
        Segment::from_xy(0.0, 5.0, 10.0, 5.0),
        Segment::from_xy(10.0, 5.0, 20.0, 5.0),
    ])
}

fn covered_band() -> ColorImage {
    let mut img = ColorImage::filled(300, 200, GREY);
    img.fill_rect(40, 90, 260, 110, RED);
    img
}

#[test]
fn covered_path_passes() {
    let m = mapper(300, 200);
    let original = ColorImage::filled(300, 200, GREY);
    let report = inspect_path(
        &covered_band(),
        &original,
        &m,
        &centre_line(),
        0.4,
        RED,
        &TraversalParams::default(),
    )
    .expect("report");
    assert!(report.passed);
    assert!(report.defects.is_empty());
    assert_eq!(report.samples_checked, 100);
    assert_eq!(report.image, original);
}

#[test]
fn gap_is_flagged_inside_the_gap_only() {
    let m = mapper(300, 200);
    let mut classified = covered_band();
    // x in [5, 10) mm
    classified.fill_rect(100, 90, 150, 110, GREY);
    let original = ColorImage::filled(300, 200, GREY);
    let params = TraversalParams::default();
    let report = inspect_path(&classified, &original, &m, &centre_line(), 0.4, RED, &params)
        .expect("report");

    assert!(!report.passed);
    assert!(!report.defects.is_empty());
    for site in &report.defects {
        assert!((5.0..=10.0).contains(&site.point_mm.x), "{site:?}");
        assert_eq!(site.pixel.y, 100);
        assert!(site.coverage < params.min_coverage);
    }
    // the gap lies entirely on the first segment
    assert!(report.defects.iter().all(|s| s.segment == 0));
    let hit = report.defects[0].pixel;
    assert_eq!(report.image.pixel(hit.x as usize, hit.y as usize), params.defect_color);
    assert_eq!(report.image.pixel(20, 20), GREY);
}

#[test]
fn coverage_exactly_at_threshold_passes() {
    let m = mapper(300, 200);
    // leave the kernel's single top-row pixel (row 98) uncovered: 10 of 11 match
    let mut classified = ColorImage::filled(300, 200, GREY);
    classified.fill_rect(40, 99, 260, 110, RED);
    let kernel = CircleKernel::new(m.scaled_width(0.4));
    assert_eq!(kernel.pixel_count(), 11);

    let at = TraversalParams {
        min_coverage: 10.0 / 11.0,
        ..TraversalParams::default()
    };
    let above = TraversalParams {
        min_coverage: 10.0 / 11.0 + 1e-9,
        ..TraversalParams::default()
    };
    let original = ColorImage::filled(300, 200, GREY);
    let pass = inspect_path(&classified, &original, &m, &centre_line(), 0.4, RED, &at)
        .expect("report");
    assert!(pass.passed);
    let fail = inspect_path(&classified, &original, &m, &centre_line(), 0.4, RED, &above)
        .expect("report");
    assert!(!fail.passed);
    assert_eq!(fail.defects.len(), fail.samples_checked);
}

#[test]
fn off_image_samples_count_as_uncovered() {
    // 100 x 100 photo only shows x in [5, 15] mm of the 20 mm layer
    let m = mapper(100, 100);
    let classified = ColorImage::filled(100, 100, RED);
    let report = inspect_path(
        &classified,
        &classified,
        &m,
        &centre_line(),
        0.4,
        RED,
        &TraversalParams::default(),
    )
    .expect("report");

    assert!(!report.passed);
    for site in &report.defects {
        assert!(site.pixel.x < 2 || site.pixel.x > 98, "{site:?}");
    }
    // sample points well inside the photo are fine
    assert!(report
        .defects
        .iter()
        .all(|s| s.point_mm.x < 5.5 || s.point_mm.x > 14.5));
}
