/// Invalid calibration or input geometry, detected at construction time.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("pixel density must be finite and > 0 (x={x}, y={y})")]
    InvalidDensity { x: f64, y: f64 },
    #[error("layer bounds are degenerate ({min_x}, {min_y}) .. ({max_x}, {max_y})")]
    DegenerateBounds {
        min_x: f64,
        min_y: f64,
        max_x: f64,
        max_y: f64,
    },
    #[error("image must have non-zero size (width={width}, height={height})")]
    EmptyImage { width: usize, height: usize },
    #[error("extrusion width must be finite and > 0 (got {0})")]
    InvalidExtrusionWidth(f64),
    #[error("toolpath has no segments to derive layer bounds from")]
    NoGeometry,
}
