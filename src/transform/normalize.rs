use crate::transform::{min_max, IntensityArray, Transform};

/// Upper bound of the 8-bit display range
pub const DISPLAY_MAX: f32 = 255.0;

/// Min-max normalization to `[0, scale]`.
///
/// A flat image (`min == max`) normalizes to NaN everywhere. This is intentional: the NaN is
/// detected downstream and the image is discarded.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Normalize {
    pub scale: f32,
}

impl Normalize {
    pub fn new(scale: f32) -> Self {
        Normalize { scale }
    }

    /// Normalize to `[0, 255]`
    pub fn display() -> Self {
        Self::new(DISPLAY_MAX)
    }
}

impl Default for Normalize {
    fn default() -> Self {
        Self::display()
    }
}

impl Transform<IntensityArray> for Normalize {
    fn apply(&self, image: &IntensityArray) -> IntensityArray {
        let Some((min, max)) = min_max(image) else {
            return image.clone();
        };
        let range = max - min;
        image.mapv(|value| (value - min) / range * self.scale)
    }
}
