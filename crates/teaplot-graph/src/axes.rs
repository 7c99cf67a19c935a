//! Principal axis and grid line geometry.

use glam::Vec3;
use teaplot_render::{Color, LineInstance};

use crate::range::{Axis, AxisRanges};

pub const AXIS_THICKNESS: f32 = 3.0;
pub const GRID_THICKNESS: f32 = 0.1;
pub const GRID_OPACITY: f32 = 0.10;

/// Subdivision counts per axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Sections {
    pub x: u32,
    pub y: u32,
    pub z: u32,
}

impl Sections {
    pub const fn uniform(count: u32) -> Self {
        Self {
            x: count,
            y: count,
            z: count,
        }
    }

    pub fn get(&self, axis: Axis) -> u32 {
        match axis {
            Axis::X => self.x,
            Axis::Y => self.y,
            Axis::Z => self.z,
        }
    }
}

/// Colours of the three principal axes.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AxisColours {
    pub x: Color,
    pub y: Color,
    pub z: Color,
}

impl AxisColours {
    pub const BLACK: AxisColours = AxisColours {
        x: Color::BLACK,
        y: Color::BLACK,
        z: Color::BLACK,
    };

    pub const RGB: AxisColours = AxisColours {
        x: Color::RED,
        y: Color::GREEN,
        z: Color::BLUE,
    };
}

impl Default for AxisColours {
    fn default() -> Self {
        Self::BLACK
    }
}

/// Limits translated by the graph origin.
pub(crate) fn world_bounds(origin: Vec3, limits: &AxisRanges) -> (Vec3, Vec3) {
    let min = origin + Vec3::from_array(limits.mins());
    let max = origin + Vec3::from_array(limits.maxs());
    (min, max)
}

/// Segments from the origin along +X and +Y, plus +Z in perspective mode.
pub fn principal_axes(
    origin: Vec3,
    limits: &AxisRanges,
    colours: AxisColours,
    perspective: bool,
) -> Vec<LineInstance> {
    let (_, max) = world_bounds(origin, limits);

    let mut axes = vec![
        LineInstance::new(origin, Vec3::new(max.x, origin.y, origin.z), AXIS_THICKNESS, colours.x),
        LineInstance::new(origin, Vec3::new(origin.x, max.y, origin.z), AXIS_THICKNESS, colours.y),
    ];
    if perspective {
        axes.push(LineInstance::new(
            origin,
            Vec3::new(origin.x, origin.y, max.z),
            AXIS_THICKNESS,
            colours.z,
        ));
    }
    axes
}

/// Evenly spaced subdivision points on `min..=max`. Empty for zero sections.
fn subdivisions(min: f32, max: f32, sections: u32) -> Vec<f32> {
    if sections == 0 {
        return Vec::new();
    }
    let step = (max - min) / sections as f32;
    (0..=sections).map(|i| min + step * i as f32).collect()
}

/// Grid lines parallel to each axis through every pair of subdivision
/// points of the other two axes.
///
/// In orthographic mode only the `z = zmin` plane is gridded and no lines
/// run along z.
pub fn grid_lines(
    origin: Vec3,
    limits: &AxisRanges,
    sections: Sections,
    perspective: bool,
) -> Vec<LineInstance> {
    let (min, max) = world_bounds(origin, limits);
    let colour = Color::BLACK.with_alpha(GRID_OPACITY);
    let line = |start: Vec3, end: Vec3| LineInstance::new(start, end, GRID_THICKNESS, colour);

    let xs = subdivisions(min.x, max.x, sections.x);
    let ys = subdivisions(min.y, max.y, sections.y);
    let zs = if perspective {
        subdivisions(min.z, max.z, sections.z)
    } else {
        vec![min.z]
    };

    let mut lines = Vec::new();

    for &z in &zs {
        for &y in &ys {
            lines.push(line(Vec3::new(min.x, y, z), Vec3::new(max.x, y, z)));
        }
        for &x in &xs {
            lines.push(line(Vec3::new(x, min.y, z), Vec3::new(x, max.y, z)));
        }
    }

    if perspective {
        for &x in &xs {
            for &y in &ys {
                lines.push(line(Vec3::new(x, y, min.z), Vec3::new(x, y, max.z)));
            }
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_principal_axis_count() {
        let limits = AxisRanges::graph_default();
        assert_eq!(principal_axes(Vec3::ZERO, &limits, AxisColours::BLACK, false).len(), 2);
        assert_eq!(principal_axes(Vec3::ZERO, &limits, AxisColours::RGB, true).len(), 3);
    }

    #[test]
    fn test_principal_axes_span_limits() {
        let origin = Vec3::new(-100.0, -50.0, 0.0);
        let axes = principal_axes(origin, &AxisRanges::graph_default(), AxisColours::RGB, true);

        assert_eq!(axes[0].end, [900.0, -50.0, 0.0]);
        assert_eq!(axes[1].end, [-100.0, 450.0, 0.0]);
        assert_eq!(axes[2].end, [-100.0, -50.0, 500.0]);
        assert_eq!(axes[0].color, Color::RED.to_array());
        assert_eq!(axes[0].width, AXIS_THICKNESS);
    }

    #[test]
    fn test_grid_counts() {
        let limits = AxisRanges::graph_default();
        let sections = Sections::uniform(4);

        // z = zmin plane only: 5 lines along x and 5 along y.
        assert_eq!(grid_lines(Vec3::ZERO, &limits, sections, false).len(), 10);
        // Three families of 5 x 5 lines.
        assert_eq!(grid_lines(Vec3::ZERO, &limits, sections, true).len(), 75);

        let uneven = Sections { x: 2, y: 3, z: 1 };
        // along x: 4 * 2, along y: 3 * 2, along z: 3 * 4
        assert_eq!(grid_lines(Vec3::ZERO, &limits, uneven, true).len(), 8 + 6 + 12);
    }

    #[test]
    fn test_grid_is_translucent_and_inside_bounds() {
        let limits = AxisRanges::graph_default();
        for line in grid_lines(Vec3::ZERO, &limits, Sections::uniform(4), true) {
            assert!(line.color[3] < 1.0);
            for point in [line.start, line.end] {
                assert!((0.0..=1000.0).contains(&point[0]));
                assert!((0.0..=500.0).contains(&point[1]));
                assert!((0.0..=500.0).contains(&point[2]));
            }
        }
    }

    #[test]
    fn test_zero_sections_drop_dependent_lines() {
        let limits = AxisRanges::graph_default();
        let sections = Sections { x: 0, y: 4, z: 4 };
        // Only lines along x (through y subdivisions) remain in the flat grid.
        assert_eq!(grid_lines(Vec3::ZERO, &limits, sections, false).len(), 5);
    }
}
