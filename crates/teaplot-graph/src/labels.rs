//! Placement of axis titles, tick markers, graph names and axis labels.
//!
//! Positions are the sprite centres in world space, offset from the axes by
//! multiples of the font size.

use std::f32::consts::FRAC_PI_2;

use glam::Vec3;
use teaplot_render::SpriteLabel;

use crate::range::{Axis, AxisRange, AxisRanges};

/// Font size of titles and tick markers.
pub const MARKER_SIZE: f32 = 45.0;
/// Font size of graph names and axis labels.
pub const LABEL_SIZE: f32 = 70.0;

/// Axis label text that suppresses the label.
pub const NO_LABEL: &str = "NOTHING";

/// Display text for an axis label, or `None` when suppressed.
pub fn axis_label_text(text: &str) -> Option<&str> {
    match text {
        NO_LABEL => None,
        "TIME" => Some("Time"),
        other => Some(other),
    }
}

/// `"X"`, `"Y"` and `"Z"` titles at the end of each non-empty axis.
pub fn axis_titles(origin: Vec3, limits: &AxisRanges, perspective: bool) -> Vec<SpriteLabel> {
    let size = MARKER_SIZE;
    let mut titles = Vec::with_capacity(3);

    if perspective && limits.z.max() > 0.0 {
        titles.push(SpriteLabel::new(
            "Z",
            size,
            Vec3::new(
                origin.x + size,
                origin.y - size / 4.0,
                origin.z + limits.z.max() + size / 2.0,
            ),
        ));
    }
    if limits.y.max() > 0.0 {
        titles.push(SpriteLabel::new(
            "Y",
            size,
            Vec3::new(origin.x + size, origin.y + limits.y.max(), origin.z),
        ));
    }
    if limits.x.max() > 0.0 {
        titles.push(SpriteLabel::new(
            "X",
            size,
            Vec3::new(
                origin.x + limits.x.max() + size * 1.5,
                origin.y - size / 4.0,
                origin.z,
            ),
        ));
    }

    titles
}

/// Offsets along the axis and the rounded value shown at each.
///
/// Values run from `label_range.min` at the origin to `label_range.max` at
/// the end of the axis. Nothing is produced when the label range has no
/// positive maximum, the axis has no sections or no length.
pub fn marker_values(label_range: AxisRange, sections: u32, axis_max: f32) -> Vec<(f32, i64)> {
    if label_range.max() <= 0.0 || sections == 0 || axis_max <= 0.0 {
        return Vec::new();
    }

    let range = label_range.span() as f64;
    (0..=sections)
        .map(|k| {
            let offset = axis_max * k as f32 / sections as f32;
            let value = (offset as f64 / axis_max as f64 * range + label_range.min() as f64).round();
            (offset, value as i64)
        })
        .collect()
}

/// Tick markers along one axis.
pub fn axis_markers(
    axis: Axis,
    origin: Vec3,
    label_range: AxisRange,
    sections: u32,
    limits: AxisRange,
) -> Vec<SpriteLabel> {
    let size = MARKER_SIZE;
    marker_values(label_range, sections, limits.max())
        .into_iter()
        .map(|(offset, value)| {
            let position = match axis {
                Axis::X => Vec3::new(origin.x + offset + size, origin.y - size, origin.z),
                Axis::Y => Vec3::new(
                    origin.x - size / 2.0,
                    origin.y + offset - size / 4.0,
                    origin.z + size / 2.0,
                ),
                Axis::Z => Vec3::new(origin.x, origin.y + size / 8.0, origin.z + offset),
            };
            SpriteLabel::new(value.to_string(), size, position)
        })
        .collect()
}

/// The graph name, centred above the Y axis.
pub fn name_label(name: &str, origin: Vec3, limits: &AxisRanges) -> Option<SpriteLabel> {
    if name.is_empty() {
        return None;
    }
    let size = LABEL_SIZE;
    Some(SpriteLabel::new(
        name,
        size,
        Vec3::new(
            origin.x + limits.x.span() / 2.0,
            origin.y + limits.y.max() + size / 4.0,
            origin.z,
        ),
    ))
}

/// The metric label beside one axis. The Y label reads bottom to top.
pub fn axis_label(axis: Axis, text: &str, origin: Vec3, limits: &AxisRanges) -> Option<SpriteLabel> {
    let text = axis_label_text(text)?;
    let size = LABEL_SIZE;

    let label = match axis {
        Axis::X => SpriteLabel::new(
            text,
            size,
            Vec3::new(
                origin.x + limits.x.span() / 2.0,
                origin.y - size * 1.5,
                origin.z,
            ),
        ),
        Axis::Y => SpriteLabel::new(
            text,
            size,
            Vec3::new(
                origin.x - size * 1.5,
                origin.y + limits.y.span() / 2.0 - size / 2.0,
                origin.z,
            ),
        )
        .rotated(FRAC_PI_2),
        Axis::Z => SpriteLabel::new(
            text,
            size,
            Vec3::new(
                origin.x,
                origin.y - size / 2.0,
                origin.z + limits.z.span() / 2.0,
            ),
        ),
    };
    Some(label)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_label_text_rules() {
        assert_eq!(axis_label_text("NOTHING"), None);
        assert_eq!(axis_label_text("TIME"), Some("Time"));
        assert_eq!(axis_label_text("spprtt"), Some("spprtt"));
    }

    #[test]
    fn test_marker_values_are_rounded() {
        let range = AxisRange::new(0.0, 37.0).unwrap();
        let values: Vec<i64> = marker_values(range, 4, 1000.0)
            .into_iter()
            .map(|(_, value)| value)
            .collect();
        // 0, 9.25, 18.5, 27.75, 37
        assert_eq!(values, vec![0, 9, 19, 28, 37]);
    }

    #[test]
    fn test_marker_offsets_span_axis() {
        let range = AxisRange::new(10.0, 20.0).unwrap();
        let markers = marker_values(range, 8, 500.0);
        assert_eq!(markers.len(), 9);
        assert_eq!(markers[0], (0.0, 10));
        assert_eq!(markers[8], (500.0, 20));
    }

    #[test]
    fn test_no_markers_without_label_range() {
        assert!(marker_values(AxisRange::ZERO, 8, 1000.0).is_empty());
        assert!(marker_values(AxisRange::new(0.0, 5.0).unwrap(), 0, 1000.0).is_empty());
    }

    #[test]
    fn test_axis_markers_positions() {
        let origin = Vec3::new(-320.0, -200.0, 0.0);
        let markers = axis_markers(
            Axis::X,
            origin,
            AxisRange::new(0.0, 100.0).unwrap(),
            4,
            AxisRange::new(0.0, 1000.0).unwrap(),
        );
        assert_eq!(markers.len(), 5);
        assert_eq!(markers[1].text, "25");
        assert_eq!(markers[1].position, Vec3::new(-320.0 + 250.0 + 45.0, -245.0, 0.0));
        assert_eq!(markers[1].font_size, MARKER_SIZE);
    }

    #[test]
    fn test_titles_depend_on_projection() {
        let limits = AxisRanges::graph_default();
        assert_eq!(axis_titles(Vec3::ZERO, &limits, false).len(), 2);
        assert_eq!(axis_titles(Vec3::ZERO, &limits, true).len(), 3);
    }

    #[test]
    fn test_name_label_placement() {
        let limits = AxisRanges::graph_default();
        assert!(name_label("", Vec3::ZERO, &limits).is_none());

        let name = name_label("cwnd", Vec3::ZERO, &limits).unwrap();
        assert_eq!(name.position, Vec3::new(500.0, 500.0 + 17.5, 0.0));
        assert_eq!(name.font_size, LABEL_SIZE);
    }

    #[test]
    fn test_y_label_is_rotated() {
        let limits = AxisRanges::graph_default();
        let label = axis_label(Axis::Y, "TIME", Vec3::ZERO, &limits).unwrap();
        assert_eq!(label.text, "Time");
        assert_eq!(label.rotation, FRAC_PI_2);
        assert!(axis_label(Axis::X, "NOTHING", Vec3::ZERO, &limits).is_none());
    }
}
