use dicom::core::Tag;
use dicom::dictionary_std::tags;
use dicom::object::{FileDicomObject, InMemDicomObject};
use dicom::pixeldata::{ConvertOptions, ModalityLutOption, PhotometricInterpretation, PixelDecoder};
use ndarray::{Array2, Axis, Ix2};
use snafu::{OptionExt, ResultExt};

use crate::errors::{
    dicom::{
        ConvertValueSnafu, InvalidShapeSnafu, InvalidValueSnafu, MissingPropertySnafu,
        PixelDataSnafu, UnsupportedSamplesPerPixelSnafu,
    },
    DicomError,
};

/// A single grayscale image extracted from a parsed DICOM file.
///
/// Windowing attributes are kept exactly as stored (possibly multi-valued). Missing attributes
/// are represented as `None` and resolved by [`WindowingMetadata`](crate::metadata::WindowingMetadata).
#[derive(Debug, Clone, PartialEq)]
pub struct SourceRecord {
    /// Stored pixel values of the first frame, without any modality or VOI LUT applied.
    pub pixels: Array2<f32>,
    pub photometric_interpretation: PhotometricInterpretation,
    pub sop_instance_uid: String,
    pub window_center: Option<Vec<f64>>,
    pub window_width: Option<Vec<f64>>,
    pub rescale_intercept: Option<Vec<f64>>,
    pub rescale_slope: Option<Vec<f64>>,
}

/// Read an optional decimal attribute as a list of values
fn read_decimals(
    file: &FileDicomObject<InMemDicomObject>,
    tag: Tag,
    name: &'static str,
) -> Result<Option<Vec<f64>>, DicomError> {
    file.get(tag)
        .map(|element| {
            element
                .value()
                .to_multi_float64()
                .context(ConvertValueSnafu { name })
        })
        .transpose()
}

/// Read the SOP Instance UID, which is used as the output file stem.
pub fn sop_instance_uid(file: &FileDicomObject<InMemDicomObject>) -> Result<String, DicomError> {
    let uid = file
        .get(tags::SOP_INSTANCE_UID)
        .context(MissingPropertySnafu {
            name: "SOP Instance UID",
        })?
        .value()
        .to_str()
        .context(ConvertValueSnafu {
            name: "SOP Instance UID",
        })?
        .trim_end_matches('\0')
        .trim()
        .to_string();

    // The UID becomes a file name, so it must not be able to escape the output directory
    if uid.is_empty() || uid.contains(['/', '\\']) || uid == "." || uid == ".." {
        return InvalidValueSnafu {
            name: "SOP Instance UID",
            value: uid,
        }
        .fail();
    }
    Ok(uid)
}

pub fn photometric_interpretation(
    file: &FileDicomObject<InMemDicomObject>,
) -> Result<PhotometricInterpretation, DicomError> {
    let value = file
        .get(tags::PHOTOMETRIC_INTERPRETATION)
        .context(MissingPropertySnafu {
            name: "Photometric Interpretation",
        })?
        .value()
        .to_str()
        .context(ConvertValueSnafu {
            name: "Photometric Interpretation",
        })?;
    Ok(PhotometricInterpretation::from(value.trim_end_matches('\0').trim()))
}

/// Decode the first frame of a single-sample image into stored pixel values.
pub fn decode_first_frame(
    file: &FileDicomObject<InMemDicomObject>,
) -> Result<Array2<f32>, DicomError> {
    let decoded = file.decode_pixel_data().context(PixelDataSnafu)?;

    let samples = decoded.samples_per_pixel();
    if samples != 1 {
        return UnsupportedSamplesPerPixelSnafu { samples }.fail();
    }

    // Rescale and windowing are applied by the pipeline, so keep the stored values
    let options = ConvertOptions::new().with_modality_lut(ModalityLutOption::None);
    let volume = decoded
        .to_ndarray_with_options::<f32>(&options)
        .context(PixelDataSnafu)?
        .into_dyn();

    // Volume is (frames, rows, columns, samples)
    let shape = volume.shape().to_vec();
    if shape.len() != 4 || shape.contains(&0) {
        return InvalidShapeSnafu { shape }.fail();
    }
    volume
        .index_axis_move(Axis(0), 0)
        .index_axis_move(Axis(2), 0)
        .into_dimensionality::<Ix2>()
        .ok()
        .context(InvalidShapeSnafu { shape })
}

impl TryFrom<&FileDicomObject<InMemDicomObject>> for SourceRecord {
    type Error = DicomError;

    fn try_from(file: &FileDicomObject<InMemDicomObject>) -> Result<Self, Self::Error> {
        Ok(SourceRecord {
            pixels: decode_first_frame(file)?,
            photometric_interpretation: photometric_interpretation(file)?,
            sop_instance_uid: sop_instance_uid(file)?,
            window_center: read_decimals(file, tags::WINDOW_CENTER, "Window Center")?,
            window_width: read_decimals(file, tags::WINDOW_WIDTH, "Window Width")?,
            rescale_intercept: read_decimals(file, tags::RESCALE_INTERCEPT, "Rescale Intercept")?,
            rescale_slope: read_decimals(file, tags::RESCALE_SLOPE, "Rescale Slope")?,
        })
    }
}
