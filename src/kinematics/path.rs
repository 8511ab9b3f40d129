//! Path Geometry
//!
//! Lifts a scalar progress curve into a curved 2-D path between two
//! endpoints. Curvature is a perpendicular offset shaped like the
//! parabola `4 s (1 - s)`: zero at both endpoints, maximal at the
//! midpoint of progress.

use crate::trace::Point;

/// Movements shorter than this are rendered without curvature.
const MIN_CURVED_DISTANCE_PX: f64 = 1.0;

/// Lift `progress` into points from `p0` to `p1`.
///
/// `deviation_frac` is the peak perpendicular offset as a fraction of the
/// chord length; `sign` selects the side (+1/-1). Endpoints are exact.
pub fn curved_path(p0: Point, p1: Point, progress: &[f64], deviation_frac: f64, sign: f64) -> Vec<Point> {
    let dx = p1.x - p0.x;
    let dy = p1.y - p0.y;
    let distance = (dx * dx + dy * dy).sqrt();

    let mut points = Vec::with_capacity(progress.len());

    if distance < MIN_CURVED_DISTANCE_PX {
        // Degenerate leg: constant-to-endpoint interpolation, no bow.
        for &s in progress {
            points.push(Point::new(p0.x + s * dx, p0.y + s * dy));
        }
    } else {
        // Unit normal to the chord.
        let (nx, ny) = (-dy / distance, dx / distance);
        let peak_offset = deviation_frac * distance * sign;

        for &s in progress {
            let bow = 4.0 * s * (1.0 - s) * peak_offset;
            points.push(Point::new(
                p0.x + s * dx + bow * nx,
                p0.y + s * dy + bow * ny,
            ));
        }
    }

    if let Some(first) = points.first_mut() {
        *first = p0;
    }
    if let Some(last) = points.last_mut() {
        *last = p1;
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    fn progress_grid(n: usize) -> Vec<f64> {
        (0..n).map(|i| i as f64 / (n - 1) as f64).collect()
    }

    #[test]
    fn test_endpoints_exact() {
        let p0 = Point::new(100.0, 100.0);
        let p1 = Point::new(500.0, 300.0);
        let path = curved_path(p0, p1, &progress_grid(50), 0.06, 1.0);
        assert_eq!(path[0], p0);
        assert_eq!(*path.last().unwrap(), p1);
    }

    #[test]
    fn test_peak_deviation_at_mid_progress() {
        let p0 = Point::new(0.0, 0.0);
        let p1 = Point::new(400.0, 0.0);
        let path = curved_path(p0, p1, &progress_grid(101), 0.10, 1.0);
        // chord lies on the x-axis, so |y| is the perpendicular deviation
        let (peak_idx, peak_dev) = path
            .iter()
            .enumerate()
            .map(|(i, p)| (i, p.y.abs()))
            .max_by(|a, b| a.1.partial_cmp(&b.1).unwrap())
            .unwrap();
        assert_eq!(peak_idx, 50);
        assert!((peak_dev - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_sign_selects_side() {
        let p0 = Point::new(0.0, 0.0);
        let p1 = Point::new(100.0, 0.0);
        let grid = progress_grid(21);
        let up = curved_path(p0, p1, &grid, 0.1, 1.0);
        let down = curved_path(p0, p1, &grid, 0.1, -1.0);
        assert!(up[10].y > 0.0);
        assert!(down[10].y < 0.0);
        assert!((up[10].y + down[10].y).abs() < 1e-9);
    }

    #[test]
    fn test_zero_length_leg_is_constant() {
        let p = Point::new(42.0, 17.0);
        let path = curved_path(p, p, &progress_grid(10), 0.15, 1.0);
        assert!(path.iter().all(|q| q.distance_to(p) < 1e-9));
    }

    #[test]
    fn test_sub_pixel_leg_suppresses_curvature() {
        let p0 = Point::new(0.0, 0.0);
        let p1 = Point::new(0.5, 0.0);
        let path = curved_path(p0, p1, &progress_grid(10), 0.15, 1.0);
        assert!(path.iter().all(|q| q.y == 0.0));
    }

    #[test]
    fn test_zero_deviation_is_straight() {
        let p0 = Point::new(10.0, 20.0);
        let p1 = Point::new(310.0, 420.0);
        let path = curved_path(p0, p1, &progress_grid(40), 0.0, 1.0);
        for (i, q) in path.iter().enumerate() {
            let s = i as f64 / 39.0;
            let straight = Point::new(p0.x + s * 300.0, p0.y + s * 400.0);
            assert!(q.distance_to(straight) < 1e-9);
        }
    }

    #[test]
    fn test_nonuniform_progress_respected() {
        let p0 = Point::new(0.0, 0.0);
        let p1 = Point::new(100.0, 0.0);
        // minimum-jerk-like spacing: slow ends, fast middle
        let progress = vec![0.0, 0.05, 0.5, 0.95, 1.0];
        let path = curved_path(p0, p1, &progress, 0.0, 1.0);
        assert!((path[1].x - 5.0).abs() < 1e-9);
        assert!((path[2].x - 50.0).abs() < 1e-9);
        assert!((path[3].x - 95.0).abs() < 1e-9);
    }
}
