use dicom::pixeldata::PhotometricInterpretation;

use crate::transform::{min_max, IntensityArray, Transform};

/// Photometric correction for MONOCHROME1 images, where low values are displayed as bright.
///
/// Each value `x` is replaced with `(max - min) - x`, using the observed range of the image
/// rather than the range of the stored bit depth.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Invert;

impl Invert {
    /// Returns the correction required for the given photometric interpretation, if any.
    pub fn for_photometric(photometric_interpretation: &PhotometricInterpretation) -> Option<Self> {
        match photometric_interpretation {
            PhotometricInterpretation::Monochrome1 => Some(Invert),
            _ => None,
        }
    }
}

impl Transform<IntensityArray> for Invert {
    fn apply(&self, image: &IntensityArray) -> IntensityArray {
        let Some((min, max)) = min_max(image) else {
            return image.clone();
        };
        let pixel_range = max - min;
        image.mapv(|value| pixel_range - value)
    }
}
