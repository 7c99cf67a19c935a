use std::ops::Mul;

/// A size in device-independent pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct LogicalSize<T> {
    pub width: T,
    pub height: T,
}

/// A size in physical (framebuffer) pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct PhysicalSize<T> {
    pub width: T,
    pub height: T,
}

/// A position in device-independent pixels, origin at the top-left.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct LogicalPosition<T> {
    pub x: T,
    pub y: T,
}

/// Ratio between physical and logical pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFactor(pub f64);

impl<T> LogicalSize<T> {
    pub const fn new(width: T, height: T) -> Self {
        Self { width, height }
    }
}

impl<T> PhysicalSize<T> {
    pub const fn new(width: T, height: T) -> Self {
        Self { width, height }
    }
}

impl<T> LogicalPosition<T> {
    pub const fn new(x: T, y: T) -> Self {
        Self { x, y }
    }
}

impl<T: Mul<Output = T> + Copy> Mul<T> for LogicalSize<T> {
    type Output = LogicalSize<T>;

    fn mul(self, rhs: T) -> Self::Output {
        LogicalSize::new(self.width * rhs, self.height * rhs)
    }
}

impl LogicalSize<u32> {
    /// Width divided by height, or 1.0 for an empty size.
    pub fn aspect_ratio(&self) -> f32 {
        if self.height == 0 {
            1.0
        } else {
            self.width as f32 / self.height as f32
        }
    }

    pub fn to_physical(self, scale: ScaleFactor) -> PhysicalSize<u32> {
        PhysicalSize::new(
            (self.width as f64 * scale.0).round() as u32,
            (self.height as f64 * scale.0).round() as u32,
        )
    }
}

impl PhysicalSize<u32> {
    pub fn to_logical(self, scale: ScaleFactor) -> LogicalSize<u32> {
        LogicalSize::new(
            (self.width as f64 / scale.0) as u32,
            (self.height as f64 / scale.0) as u32,
        )
    }
}

impl LogicalPosition<f64> {
    /// Component-wise difference `self - other`.
    pub fn delta_from(&self, other: LogicalPosition<f64>) -> (f64, f64) {
        (self.x - other.x, self.y - other.y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aspect_ratio() {
        assert_eq!(LogicalSize::new(1600u32, 800).aspect_ratio(), 2.0);
        assert_eq!(LogicalSize::new(10u32, 0).aspect_ratio(), 1.0);
    }

    #[test]
    fn test_physical_logical_round_trip() {
        let scale = ScaleFactor(2.0);
        let logical = LogicalSize::new(640u32, 480);
        let physical = logical.to_physical(scale);
        assert_eq!(physical, PhysicalSize::new(1280, 960));
        assert_eq!(physical.to_logical(scale), logical);
    }

    #[test]
    fn test_position_delta() {
        let a = LogicalPosition::new(10.0, 20.0);
        let b = LogicalPosition::new(4.0, 25.0);
        assert_eq!(a.delta_from(b), (6.0, -5.0));
    }
}
