use image::{imageops, ImageBuffer, Luma};
use ndarray::{Array2, Axis};
use std::fmt;

use crate::transform::{min_max, IntensityArray, Transform};

#[derive(Default, Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum FilterType {
    /// Bilinear interpolation between pixel centers
    #[default]
    Linear,
    Nearest,
    /// Area-weighted averaging over the source pixels covered by each output pixel
    Area,
}

impl fmt::Display for FilterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let filter_str = match self {
            FilterType::Linear => "linear",
            FilterType::Nearest => "nearest",
            FilterType::Area => "area",
        };
        write!(f, "{filter_str}")
    }
}

impl From<FilterType> for imageops::FilterType {
    fn from(filter: FilterType) -> Self {
        match filter {
            FilterType::Linear => imageops::FilterType::Triangle,
            FilterType::Nearest => imageops::FilterType::Nearest,
            FilterType::Area => imageops::FilterType::Triangle, // Area is resampled by hand
        }
    }
}

/// Source indices and weights contributing to each output sample when averaging
/// `input_len` samples down (or up) to `output_len` samples.
fn area_weights(input_len: usize, output_len: usize) -> Vec<Vec<(usize, f32)>> {
    let scale = input_len as f64 / output_len as f64;
    (0..output_len)
        .map(|i| {
            let start = i as f64 * scale;
            let end = (i + 1) as f64 * scale;
            let first = start.floor() as usize;
            let stop = (end.ceil() as usize).min(input_len);
            (first..stop)
                .filter_map(|j| {
                    let overlap = end.min((j + 1) as f64) - start.max(j as f64);
                    (overlap > 0.0).then(|| (j, (overlap / scale) as f32))
                })
                .collect()
        })
        .collect()
}

/// Area-resample a single axis of the image to `len` samples.
fn area_resample_axis(image: &IntensityArray, axis: Axis, len: usize) -> IntensityArray {
    let (height, width) = image.dim();
    let shape = match axis {
        Axis(0) => (len, width),
        _ => (height, len),
    };
    let mut output = Array2::zeros(shape);
    for (i, weights) in area_weights(image.len_of(axis), len).iter().enumerate() {
        let mut lane = output.index_axis_mut(axis, i);
        for &(j, weight) in weights {
            lane.scaled_add(weight, &image.index_axis(axis, j));
        }
    }
    output
}

/// Aspect-preserving resize so that the longest side matches a target size.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Resize {
    pub height: usize,
    pub width: usize,
    pub filter: FilterType,
}

impl Resize {
    pub fn new(image: &IntensityArray, target_size: u32, filter: FilterType) -> Self {
        let (height, width) = image.dim();
        let target_size = target_size as usize;
        let ratio = target_size as f64 / height.max(width).max(1) as f64;
        let scaled = |dim: usize| ((dim as f64 * ratio).round() as usize).clamp(1, target_size);
        Resize {
            height: scaled(height),
            width: scaled(width),
            filter,
        }
    }

    /// Resample through `image::imageops`. Float samples are clamped to `[0, 1]` there,
    /// so the array is mapped into that range and back.
    fn resize_with_imageops(&self, image: &IntensityArray) -> IntensityArray {
        let shape = (self.height, self.width);
        let (min, max) = match min_max(image) {
            Some((min, max)) if max > min => (min, max),
            Some((value, _)) => return IntensityArray::from_elem(shape, value),
            None => return IntensityArray::zeros(shape),
        };
        let range = max - min;

        let (height, width) = image.dim();
        let buffer = ImageBuffer::from_fn(width as u32, height as u32, |x, y| {
            Luma([(image[[y as usize, x as usize]] - min) / range])
        });
        let resized: ImageBuffer<Luma<f32>, Vec<f32>> = imageops::resize(
            &buffer,
            self.width as u32,
            self.height as u32,
            self.filter.into(),
        );
        IntensityArray::from_shape_fn(shape, |(y, x)| {
            resized.get_pixel(x as u32, y as u32).0[0] * range + min
        })
    }
}

impl Transform<IntensityArray> for Resize {
    fn apply(&self, image: &IntensityArray) -> IntensityArray {
        if image.is_empty() || image.dim() == (self.height, self.width) {
            return image.clone();
        }
        match self.filter {
            FilterType::Area => {
                let image = area_resample_axis(image, Axis(0), self.height);
                area_resample_axis(&image, Axis(1), self.width)
            }
            FilterType::Linear | FilterType::Nearest => self.resize_with_imageops(image),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rand::Rng;
    use rstest::rstest;

    fn assert_close(actual: &IntensityArray, expected: &IntensityArray) {
        assert_eq!(actual.dim(), expected.dim());
        for (a, e) in actual.iter().zip(expected.iter()) {
            assert!((a - e).abs() < 1e-4, "{actual:?} != {expected:?}");
        }
    }

    #[rstest]
    #[case::area_downsample(
        array![
            [1.0, 1.0, 2.0, 2.0],
            [1.0, 1.0, 2.0, 2.0],
            [3.0, 3.0, 4.0, 4.0],
            [3.0, 3.0, 4.0, 4.0],
        ],
        2,
        FilterType::Area,
        array![[1.0, 2.0], [3.0, 4.0]],
    )]
    #[case::area_averages(
        array![
            [1.0, 2.0, 3.0, 4.0],
            [5.0, 6.0, 7.0, 8.0],
            [9.0, 10.0, 11.0, 12.0],
            [13.0, 14.0, 15.0, 16.0],
        ],
        2,
        FilterType::Area,
        array![[3.5, 5.5], [11.5, 13.5]],
    )]
    #[case::area_fractional(
        array![[0.0, 3.0, 6.0]],
        2,
        FilterType::Area,
        array![[1.0, 5.0]],
    )]
    #[case::area_upsample(
        array![[1.0, 2.0], [3.0, 4.0]],
        4,
        FilterType::Area,
        array![
            [1.0, 1.0, 2.0, 2.0],
            [1.0, 1.0, 2.0, 2.0],
            [3.0, 3.0, 4.0, 4.0],
            [3.0, 3.0, 4.0, 4.0],
        ],
    )]
    #[case::nearest_downsample(
        array![
            [1.0, 1.0, 2.0, 2.0],
            [1.0, 1.0, 2.0, 2.0],
            [3.0, 3.0, 4.0, 4.0],
            [3.0, 3.0, 4.0, 4.0],
        ],
        2,
        FilterType::Nearest,
        array![[1.0, 2.0], [3.0, 4.0]],
    )]
    #[case::linear_upsample(
        array![[0.0, 4.0]],
        4,
        FilterType::Linear,
        array![[0.0, 1.0, 3.0, 4.0], [0.0, 1.0, 3.0, 4.0]],
    )]
    fn test_resize(
        #[case] image: IntensityArray,
        #[case] target_size: u32,
        #[case] filter: FilterType,
        #[case] expected: IntensityArray,
    ) {
        let resize = Resize::new(&image, target_size, filter);
        assert_close(&resize.apply(&image), &expected);
    }

    #[rstest]
    #[case::landscape((512, 1024), 384, (192, 384))]
    #[case::portrait((1000, 300), 384, (384, 115))]
    #[case::square((64, 64), 384, (384, 384))]
    #[case::rounds_half_up((4, 2), 5, (5, 3))]
    #[case::thin((1, 5000), 384, (1, 384))]
    fn test_resize_dimensions(
        #[case] shape: (usize, usize),
        #[case] target_size: u32,
        #[case] expected: (usize, usize),
    ) {
        let image = IntensityArray::zeros(shape);
        let resize = Resize::new(&image, target_size, FilterType::Area);
        assert_eq!((resize.height, resize.width), expected);
        assert_eq!(resize.apply(&image).dim(), expected);
    }

    #[rstest]
    #[case(FilterType::Area)]
    #[case(FilterType::Linear)]
    #[case(FilterType::Nearest)]
    fn test_resize_preserves_constant(#[case] filter: FilterType) {
        let mut rng = rand::thread_rng();
        let shape = (rng.gen_range(1..300), rng.gen_range(1..300));
        let image = IntensityArray::from_elem(shape, 200.0);
        let resize = Resize::new(&image, 384, filter);
        let resized = resize.apply(&image);
        assert!(resized.iter().all(|&v| (v - 200.0).abs() < 1e-3));
    }

    #[rstest]
    #[case::linear_upsample_edges(
        array![
            [0.0, 0.0, 0.0, 0.0],
            [0.0, 0.0, 0.0, 0.0],
            [255.0, 255.0, 255.0, 255.0],
            [255.0, 255.0, 255.0, 255.0],
        ],
        FilterType::Linear,
    )]
    #[case::nearest_negative(array![[-50.0, 10.0], [30.0, 90.0]], FilterType::Nearest)]
    fn test_resize_keeps_value_range(#[case] image: IntensityArray, #[case] filter: FilterType) {
        let (min, max) = min_max(&image).unwrap();
        let resize = Resize::new(&image, 384, filter);
        let resized = resize.apply(&image);
        assert_eq!(resized.dim(), (384, 384));

        // Values are not clamped to the unit range used internally by imageops
        let (resized_min, resized_max) = min_max(&resized).unwrap();
        assert!((resized_min - min).abs() < 1e-2, "{resized_min} != {min}");
        assert!((resized_max - max).abs() < 1e-2, "{resized_max} != {max}");
    }

    #[test]
    fn test_default_filter_is_linear() {
        assert_eq!(FilterType::default(), FilterType::Linear);
        assert_eq!(
            imageops::FilterType::from(FilterType::default()),
            imageops::FilterType::Triangle
        );
    }

    #[rstest]
    #[case(FilterType::Area, "area")]
    #[case(FilterType::Linear, "linear")]
    #[case(FilterType::Nearest, "nearest")]
    fn test_filter_display(#[case] filter: FilterType, #[case] expected: &str) {
        assert_eq!(filter.to_string(), expected);
    }
}
