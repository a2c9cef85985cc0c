// src/interp.rs

//! Pure resampling primitives shared by the voice playback path.

/// 4-point cubic Hermite interpolation.
///
/// `y1` and `y2` are the samples being interpolated between; `y0` and `y3`
/// are their outer neighbors. `x` is the fractional position in [0, 1).
/// At `x == 0.0` this returns `y1` exactly.
#[inline(always)]
pub fn hermite(x: f32, y0: f32, y1: f32, y2: f32, y3: f32) -> f32 {
    let c0 = y1;
    let c1 = 0.5 * (y2 - y0);
    let c2 = y0 - 2.5 * y1 + 2.0 * y2 - 0.5 * y3;
    let c3 = 0.5 * (y3 - y0) + 1.5 * (y1 - y2);
    ((c3 * x + c2) * x + c1) * x + c0
}

/// Lagrange polynomial interpolation over an arbitrary set of control points.
///
/// Evaluates the unique polynomial passing through every `(x, y)` pair at
/// position `x`. Control points must have distinct x coordinates.
pub fn lagrange(x: f32, points: &[(f32, f32)]) -> f32 {
    let mut result = 0.0;
    for (i, &(xi, yi)) in points.iter().enumerate() {
        let mut term = yi;
        for (j, &(xj, _)) in points.iter().enumerate() {
            if i != j {
                term *= (x - xj) / (xi - xj);
            }
        }
        result += term;
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hermite_is_exact_at_zero() {
        assert_eq!(hermite(0.0, -0.3, 0.75, 0.2, -0.9), 0.75);
        assert_eq!(hermite(0.0, 0.0, 0.0, 1.0, 0.0), 0.0);
    }

    #[test]
    fn hermite_midpoint_of_line_is_on_the_line() {
        // For collinear control points the cubic degenerates to the line.
        let y = hermite(0.5, 0.0, 1.0, 2.0, 3.0);
        assert!((y - 1.5).abs() < 1e-6);
    }

    #[test]
    fn lagrange_passes_through_control_points() {
        let points = [(0.0, 1.0), (1.0, 3.0), (2.0, 2.0), (4.0, -1.0)];
        for &(x, y) in &points {
            assert!((lagrange(x, &points) - y).abs() < 1e-4);
        }
    }

    #[test]
    fn lagrange_reconstructs_a_quadratic() {
        // y = x^2 through three points.
        let points = [(0.0, 0.0), (1.0, 1.0), (2.0, 4.0)];
        assert!((lagrange(1.5, &points) - 2.25).abs() < 1e-5);
        assert!((lagrange(-1.0, &points) - 1.0).abs() < 1e-5);
    }
}
