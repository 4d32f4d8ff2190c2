use image::codecs::png::{CompressionType, FilterType as PngFilterType, PngEncoder};
use image::GrayImage;
use snafu::{OptionExt, ResultExt};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use crate::errors::save::{CreateFileSnafu, InvalidShapeSnafu, SaveError, WritePngSnafu};
use crate::transform::IntensityArray;

/// Convert an intensity array in the display range to an 8-bit luminance image.
/// Values are rounded and clamped to `[0, 255]`.
pub fn to_luma8(image: &IntensityArray) -> Result<GrayImage, SaveError> {
    let (height, width) = image.dim();
    let pixels = image
        .iter()
        .map(|value| value.round().clamp(0.0, 255.0) as u8)
        .collect::<Vec<_>>();
    GrayImage::from_raw(width as u32, height as u32, pixels)
        .context(InvalidShapeSnafu { width, height })
}

// Writes 8-bit grayscale PNGs
#[derive(Debug, Clone, Copy)]
pub struct PngSaver {
    compression: CompressionType,
}

impl Default for PngSaver {
    fn default() -> Self {
        PngSaver {
            compression: CompressionType::Default,
        }
    }
}

impl PngSaver {
    pub fn save<P: AsRef<Path>>(&self, image: &IntensityArray, path: P) -> Result<(), SaveError> {
        let path = path.as_ref();
        let image = to_luma8(image)?;
        let file = File::create(path).context(CreateFileSnafu { path })?;
        let encoder = PngEncoder::new_with_quality(
            BufWriter::new(file),
            self.compression,
            PngFilterType::Adaptive,
        );
        image
            .write_with_encoder(encoder)
            .context(WritePngSnafu { path })?;
        Ok(())
    }
}
