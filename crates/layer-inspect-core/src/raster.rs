//! Integer rasterisation of round-capped strokes and filled disks.
//!
//! Both visitors clip to `width × height` and test pixel centres at integer
//! coordinates, so drawing the same primitive twice touches the same pixels.

use nalgebra::Point2;

/// Visit every pixel whose centre lies within `radius` of the segment `a..b`.
///
/// The covered shape is a capsule: a thick line with round caps, so chained
/// segments get round joins for free.
pub fn for_each_capsule_pixel(
    width: usize,
    height: usize,
    a: Point2<f64>,
    b: Point2<f64>,
    radius: f64,
    mut visit: impl FnMut(usize, usize),
) {
    if width == 0 || height == 0 || !(radius >= 0.0) {
        return;
    }
    let x0 = ((a.x.min(b.x) - radius).floor() as i64).max(0);
    let y0 = ((a.y.min(b.y) - radius).floor() as i64).max(0);
    let x1 = ((a.x.max(b.x) + radius).ceil() as i64).min(width as i64 - 1);
    let y1 = ((a.y.max(b.y) + radius).ceil() as i64).min(height as i64 - 1);
    if x0 > x1 || y0 > y1 {
        return;
    }

    let ab = b - a;
    let len2 = ab.norm_squared();
    let r2 = radius * radius + 1e-9;

    for y in y0..=y1 {
        for x in x0..=x1 {
            let p = Point2::new(x as f64, y as f64);
            let t = if len2 > 0.0 {
                ((p - a).dot(&ab) / len2).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let q = a + ab * t;
            if (p - q).norm_squared() <= r2 {
                visit(x as usize, y as usize);
            }
        }
    }
}

/// Visit every pixel of the filled disk `|p - center| <= radius`.
pub fn for_each_disk_pixel(
    width: usize,
    height: usize,
    center: Point2<i32>,
    radius: i32,
    mut visit: impl FnMut(usize, usize),
) {
    if radius < 0 {
        return;
    }
    let r2 = radius as i64 * radius as i64;
    for dy in -radius..=radius {
        let y = center.y as i64 + dy as i64;
        if y < 0 || y >= height as i64 {
            continue;
        }
        for dx in -radius..=radius {
            let x = center.x as i64 + dx as i64;
            if x < 0 || x >= width as i64 {
                continue;
            }
            if (dx as i64).pow(2) + (dy as i64).pow(2) <= r2 {
                visit(x as usize, y as usize);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collect_capsule(a: (f64, f64), b: (f64, f64), r: f64) -> Vec<(usize, usize)> {
        let mut out = Vec::new();
        for_each_capsule_pixel(
            20,
            20,
            Point2::new(a.0, a.1),
            Point2::new(b.0, b.1),
            r,
            |x, y| out.push((x, y)),
        );
        out
    }

    #[test]
    fn thin_horizontal_stroke_is_one_row() {
        let px = collect_capsule((2.0, 5.0), (8.0, 5.0), 0.5);
        assert_eq!(px.len(), 7);
        assert!(px.iter().all(|&(_, y)| y == 5));
    }

    #[test]
    fn round_caps_extend_past_endpoints() {
        let px = collect_capsule((5.0, 5.0), (10.0, 5.0), 2.0);
        assert!(px.contains(&(3, 5)));
        assert!(px.contains(&(12, 5)));
        assert!(!px.contains(&(3, 3)), "cap corner must stay round");
    }

    #[test]
    fn capsule_is_clipped_to_image() {
        let px = collect_capsule((-5.0, -5.0), (1.0, 1.0), 1.0);
        assert!(!px.is_empty());
        assert!(px.iter().all(|&(x, y)| x < 20 && y < 20));
    }

    #[test]
    fn disk_counts_match_radius() {
        let mut n = 0;
        for_each_disk_pixel(50, 50, Point2::new(25, 25), 2, |_, _| n += 1);
        assert_eq!(n, 13);
        let mut edge = 0;
        for_each_disk_pixel(50, 50, Point2::new(0, 0), 2, |_, _| edge += 1);
        assert_eq!(edge, 6);
    }
}
