//! DrawingML measurement units.

/// English Metric Units per inch.
pub const EMU_PER_INCH: i64 = 914_400;

/// 16:9 slide width (13.333in).
pub const SLIDE_WIDTH: i64 = 12_192_000;

/// 16:9 slide height (7.5in).
pub const SLIDE_HEIGHT: i64 = 6_858_000;

/// Convert inches to EMU.
pub fn inches(value: f64) -> i64 {
    (value * EMU_PER_INCH as f64).round() as i64
}

/// Convert points to the hundredths used by `sz` and `spcPts`.
pub fn hundredths(points: f64) -> i64 {
    (points * 100.0).round() as i64
}

/// Position and size of a shape, in EMU.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame {
    pub x: i64,
    pub y: i64,
    pub cx: i64,
    pub cy: i64,
}

impl Frame {
    pub fn new(x: i64, y: i64, cx: i64, cy: i64) -> Self {
        Self { x, y, cx, cy }
    }

    /// Frame from inch measurements.
    pub fn inches(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self::new(inches(x), inches(y), inches(width), inches(height))
    }

    /// The whole slide.
    pub fn full_slide() -> Self {
        Self::new(0, 0, SLIDE_WIDTH, SLIDE_HEIGHT)
    }

    /// Frame of `width` inches at (`x`, `y`) whose height keeps the
    /// `pixel_width` x `pixel_height` aspect ratio.
    pub fn with_aspect(x: f64, y: f64, width: f64, pixel_width: u32, pixel_height: u32) -> Self {
        let cx = inches(width);
        let cy = if pixel_width == 0 {
            cx
        } else {
            (cx as f64 * pixel_height as f64 / pixel_width as f64).round() as i64
        };
        Self::new(inches(x), inches(y), cx, cy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_conversions() {
        assert_eq!(inches(1.0), 914_400);
        assert_eq!(inches(0.75), 685_800);
        assert_eq!(inches(13.333), 12_191_695);
        assert_eq!(hundredths(18.0), 1800);
    }

    #[test]
    fn test_aspect_frame() {
        let frame = Frame::with_aspect(10.0, 0.5, 2.5, 400, 100);
        assert_eq!(frame.cx, inches(2.5));
        assert_eq!(frame.cy, inches(2.5) / 4);

        // Degenerate images come out square
        let square = Frame::with_aspect(0.0, 0.0, 1.0, 0, 50);
        assert_eq!(square.cx, square.cy);
    }
}
