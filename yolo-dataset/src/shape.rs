//! The input image shape.

use crate::common::*;

/// The granularity of input widths and heights in pixels.
pub const SHAPE_STRIDE: u32 = 32;

/// The input image size in `(width, height)` pixels.
///
/// Both sides are positive multiples of [SHAPE_STRIDE].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "[u32; 2]", into = "[u32; 2]")]
pub struct Shape {
    width: u32,
    height: u32,
}

impl Shape {
    pub fn new(width: u32, height: u32) -> Result<Self> {
        ensure!(
            width > 0 && height > 0,
            "shape sides must be positive, but get {}x{}",
            width,
            height
        );
        ensure!(
            width % SHAPE_STRIDE == 0 && height % SHAPE_STRIDE == 0,
            "shape sides must be multiples of {}, but get {}x{}",
            SHAPE_STRIDE,
            width,
            height
        );
        Ok(Self { width, height })
    }

    /// The square shape with `steps` strides per side.
    pub fn square(steps: u32) -> Result<Self> {
        let side = steps * SHAPE_STRIDE;
        Self::new(side, side)
    }

    pub(crate) fn square_unchecked(steps: u32) -> Self {
        debug_assert!(steps > 0);
        let side = steps * SHAPE_STRIDE;
        Self {
            width: side,
            height: side,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}

impl TryFrom<[u32; 2]> for Shape {
    type Error = Error;

    fn try_from([width, height]: [u32; 2]) -> Result<Self, Self::Error> {
        Self::new(width, height)
    }
}

impl From<Shape> for [u32; 2] {
    fn from(shape: Shape) -> Self {
        [shape.width, shape.height]
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn shape_sides_are_stride_multiples() {
        assert!(Shape::new(416, 416).is_ok());
        assert!(Shape::new(608, 320).is_ok());
        assert!(Shape::new(0, 32).is_err());
        assert!(Shape::new(400, 416).is_err());
        assert_eq!(Shape::square(13).unwrap(), Shape::new(416, 416).unwrap());
    }
}
