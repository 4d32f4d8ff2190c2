use crate::metadata::WindowingMetadata;
use crate::transform::{IntensityArray, Transform};

/// Linear rescale followed by clipping to a window.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Window {
    pub intercept: f32,
    pub slope: f32,
    pub low: f32,
    pub high: f32,
}

impl Window {
    pub fn new(window_center: i32, window_width: i32, intercept: i32, slope: i32) -> Self {
        // Floor division on the width, as integers
        let half_width = i64::from(window_width).div_euclid(2);
        let center = i64::from(window_center);
        Window {
            intercept: intercept as f32,
            slope: slope as f32,
            low: (center - half_width) as f32,
            high: (center + half_width) as f32,
        }
    }
}

impl From<&WindowingMetadata> for Window {
    fn from(metadata: &WindowingMetadata) -> Self {
        Window::new(
            metadata.window_center,
            metadata.window_width,
            metadata.intercept,
            metadata.slope,
        )
    }
}

impl Transform<IntensityArray> for Window {
    fn apply(&self, image: &IntensityArray) -> IntensityArray {
        image.mapv(|value| {
            let value = value * self.slope + self.intercept;
            let value = if value < self.low { self.low } else { value };
            if value > self.high {
                self.high
            } else {
                value
            }
        })
    }
}
