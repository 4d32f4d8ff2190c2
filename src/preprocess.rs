use tracing::{debug, warn};

use crate::errors::DicomError;
use crate::metadata::{SourceRecord, WindowingMetadata};
use crate::transform::{
    contains_nan, FilterType, IntensityArray, Invert, Normalize, Padding, Resize, Transform,
    Window,
};

/// Side length of the square output image
pub const TARGET_SIZE: u32 = 384;

// Responsible for turning a source record into a display-ready square image
#[derive(Debug, Clone, Copy)]
pub struct Preprocessor {
    pub size: u32,
    pub filter: FilterType,
}

impl Default for Preprocessor {
    fn default() -> Self {
        Preprocessor {
            size: TARGET_SIZE,
            filter: FilterType::default(),
        }
    }
}

impl Preprocessor {
    pub fn new(filter: FilterType) -> Self {
        Preprocessor {
            filter,
            ..Default::default()
        }
    }

    /// Window, normalize to the display range and apply the photometric correction.
    /// The result may contain NaN if the windowed image was flat.
    pub fn window_and_normalize(
        &self,
        record: &SourceRecord,
    ) -> Result<IntensityArray, DicomError> {
        let metadata = WindowingMetadata::try_from(record)?;
        debug!("Windowing metadata for {}: {:?}", record.sop_instance_uid, metadata);

        let image = Window::from(&metadata).apply(&record.pixels);
        let image = Normalize::display().apply(&image);
        let image = match Invert::for_photometric(&record.photometric_interpretation) {
            Some(invert) => invert.apply(&image),
            None => image,
        };
        Ok(image)
    }

    /// Resize the longest side to the target size and pad to a square canvas.
    pub fn resize_and_pad(&self, image: &IntensityArray) -> IntensityArray {
        let resize = Resize::new(image, self.size, self.filter);
        let image = resize.apply(image);
        let size = self.size as usize;
        let padding = Padding::new(&image, size, size);
        padding.apply(&image)
    }

    /// Run the full pipeline. Returns `None` if the image is degenerate (NaN after
    /// normalization), in which case nothing should be written.
    pub fn prepare_image(
        &self,
        record: &SourceRecord,
    ) -> Result<Option<IntensityArray>, DicomError> {
        let image = self.window_and_normalize(record)?;
        if contains_nan(&image) {
            warn!(
                "Discarding {}: image is flat after windowing",
                record.sop_instance_uid
            );
            return Ok(None);
        }
        Ok(Some(self.resize_and_pad(&image)))
    }
}
