//! CPU mirror of the plot vertex shader's axis mapping.
//!
//! The GPU evaluates the same expressions per vertex; these functions exist
//! so visibility can be counted and tested without a device.

use crate::range::{AxisRange, AxisRanges};

/// Map `value` from `range` onto `0..=span`.
pub fn normalize(value: f32, range: AxisRange, span: f32) -> f32 {
    (value - range.min()) * span / (range.max() - range.min())
}

pub fn normalize_point(value: [f32; 3], limits: &AxisRanges, axes: [f32; 3]) -> [f32; 3] {
    [
        normalize(value[0], limits.x, axes[0]),
        normalize(value[1], limits.y, axes[1]),
        normalize(value[2], limits.z, axes[2]),
    ]
}

/// Whether the shader would rasterize a sample.
///
/// A point is drawn iff every normalized coordinate lies in `[0, span + 1]`
/// and its normalized x does not exceed `up_to`.
pub fn is_point_visible(value: [f32; 3], limits: &AxisRanges, axes: [f32; 3], up_to: f32) -> bool {
    let real = normalize_point(value, limits, axes);
    real[0] <= up_to
        && real
            .iter()
            .zip(axes)
            .all(|(coord, span)| *coord >= 0.0 && *coord <= span + 1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_values_in_range_land_in_span() {
        let range = AxisRange::new(-50.0, 150.0).unwrap();
        for step in 0..=20 {
            let value = -50.0 + step as f32 * 10.0;
            let real = normalize(value, range, 500.0);
            assert!((0.0..=500.0).contains(&real), "{} -> {}", value, real);
        }
    }

    #[test]
    fn test_values_outside_range_leave_span() {
        let range = AxisRange::new(0.0, 1000.0).unwrap();
        assert!(normalize(-0.5, range, 1000.0) < 0.0);
        assert!(normalize(1001.5, range, 1000.0) > 1000.0);
    }

    #[test]
    fn test_visibility_rule() {
        let limits = AxisRanges::graph_default();
        let axes = limits.maxs();

        assert!(is_point_visible([500.0, 250.0, 0.0], &limits, axes, 1000.0));
        // Cut off by the sweep.
        assert!(!is_point_visible([500.0, 250.0, 0.0], &limits, axes, 499.0));
        // One unit of slack past the span.
        assert!(is_point_visible([1000.5, 0.0, 0.0], &limits, axes, 2000.0));
        assert!(!is_point_visible([1001.5, 0.0, 0.0], &limits, axes, 2000.0));
        assert!(!is_point_visible([10.0, -1.0, 0.0], &limits, axes, 1000.0));
    }

    #[test]
    fn test_zoomed_limits_hide_outside_points() {
        let mut limits = AxisRanges::graph_default();
        limits.x = AxisRange::new(250.0, 500.0).unwrap();
        let axes = AxisRanges::graph_default().maxs();

        assert!(!is_point_visible([200.0, 10.0, 0.0], &limits, axes, 1000.0));
        assert!(is_point_visible([300.0, 10.0, 0.0], &limits, axes, 1000.0));
    }
}
