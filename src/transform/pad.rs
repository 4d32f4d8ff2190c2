use ndarray::s;

use crate::transform::{IntensityArray, Transform};

/// Value written into the padded border
pub const PAD_VALUE: f32 = 0.0;

/// Constant padding that centers an image within a target canvas.
/// When the padding along an axis is odd, the extra pixel goes after the image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Padding {
    pub left: usize,
    pub top: usize,
    pub right: usize,
    pub bottom: usize,
}

impl Padding {
    pub fn is_zero(&self) -> bool {
        self.left == 0 && self.top == 0 && self.right == 0 && self.bottom == 0
    }

    pub fn new(image: &IntensityArray, target_width: usize, target_height: usize) -> Self {
        let (height, width) = image.dim();
        let delta_width = target_width.saturating_sub(width);
        let delta_height = target_height.saturating_sub(height);
        Padding {
            left: delta_width / 2,
            top: delta_height / 2,
            right: delta_width - delta_width / 2,
            bottom: delta_height - delta_height / 2,
        }
    }
}

impl Transform<IntensityArray> for Padding {
    fn apply(&self, image: &IntensityArray) -> IntensityArray {
        if self.is_zero() {
            return image.clone();
        }
        let (height, width) = image.dim();
        let mut padded = IntensityArray::from_elem(
            (
                height + self.top + self.bottom,
                width + self.left + self.right,
            ),
            PAD_VALUE,
        );
        padded
            .slice_mut(s![self.top..self.top + height, self.left..self.left + width])
            .assign(image);
        padded
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;
    use rstest::rstest;

    #[rstest]
    #[case::even((2, 2), (6, 6), Padding { left: 2, top: 2, right: 2, bottom: 2 })]
    #[case::odd((3, 2), (4, 4), Padding { left: 1, top: 0, right: 1, bottom: 1 })]
    #[case::already_full((4, 4), (4, 4), Padding { left: 0, top: 0, right: 0, bottom: 0 })]
    fn test_padding_new(
        #[case] shape: (usize, usize),
        #[case] (target_width, target_height): (usize, usize),
        #[case] expected: Padding,
    ) {
        let image = IntensityArray::zeros(shape);
        let padding = Padding::new(&image, target_width, target_height);
        assert_eq!(padding, expected);
    }

    #[rstest]
    #[case(
        array![[1.0, 1.0], [1.0, 1.0]],
        (4, 4),
        array![
            [0.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 1.0, 0.0],
            [0.0, 1.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 0.0],
        ],
    )]
    #[case(
        array![[5.0, 6.0, 7.0]],
        (3, 4),
        array![
            [0.0, 0.0, 0.0],
            [5.0, 6.0, 7.0],
            [0.0, 0.0, 0.0],
            [0.0, 0.0, 0.0],
        ],
    )]
    fn test_pad(
        #[case] image: IntensityArray,
        #[case] (target_width, target_height): (usize, usize),
        #[case] expected: IntensityArray,
    ) {
        let padding = Padding::new(&image, target_width, target_height);
        assert_eq!(padding.apply(&image), expected);
    }
}
