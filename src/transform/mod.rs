pub mod invert;
pub mod normalize;
pub mod pad;
pub mod resize;
pub mod window;

pub use invert::*;
pub use normalize::*;
pub use pad::*;
pub use resize::*;
pub use window::*;

use ndarray::Array2;

/// A 2D array of intensities flowing through the preprocessing pipeline.
pub type IntensityArray = Array2<f32>;

pub trait Transform<T> {
    fn apply(&self, target: &T) -> T;
}

/// Minimum and maximum of an array, propagating NaN.
/// Returns `None` for an empty array.
pub fn min_max(image: &IntensityArray) -> Option<(f32, f32)> {
    let mut values = image.iter().copied();
    let first = values.next()?;
    Some(values.fold((first, first), |(min, max), v| {
        if min.is_nan() || v.is_nan() {
            (f32::NAN, f32::NAN)
        } else {
            (min.min(v), max.max(v))
        }
    }))
}

/// Returns true if any element of the array is NaN.
pub fn contains_nan(image: &IntensityArray) -> bool {
    image.iter().any(|v| v.is_nan())
}
