use snafu::OptionExt;

use crate::errors::{
    dicom::{EmptyPropertySnafu, MissingPropertySnafu},
    DicomError,
};
use crate::metadata::SourceRecord;

/// Default used for Rescale Intercept and Rescale Slope when the attribute is absent
pub const DEFAULT_RESCALE: f64 = 0.0;

/// Integer windowing and rescale parameters for a single image.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct WindowingMetadata {
    pub window_center: i32,
    pub window_width: i32,
    pub intercept: i32,
    pub slope: i32,
}

/// Take the first value of a (possibly multi-valued) attribute, truncated toward zero.
fn first_as_int(values: &[f64], name: &'static str) -> Result<i32, DicomError> {
    let first = values.first().context(EmptyPropertySnafu { name })?;
    Ok(*first as i32)
}

fn mandatory(values: &Option<Vec<f64>>, name: &'static str) -> Result<i32, DicomError> {
    let values = values.as_deref().context(MissingPropertySnafu { name })?;
    first_as_int(values, name)
}

fn with_default(values: &Option<Vec<f64>>, name: &'static str) -> Result<i32, DicomError> {
    match values.as_deref() {
        Some([]) | None => Ok(DEFAULT_RESCALE as i32),
        Some(values) => first_as_int(values, name),
    }
}

impl TryFrom<&SourceRecord> for WindowingMetadata {
    type Error = DicomError;

    /// Window Center and Window Width are mandatory. Rescale Intercept and Rescale Slope
    /// fall back to [`DEFAULT_RESCALE`].
    fn try_from(record: &SourceRecord) -> Result<Self, Self::Error> {
        Ok(WindowingMetadata {
            window_center: mandatory(&record.window_center, "Window Center")?,
            window_width: mandatory(&record.window_width, "Window Width")?,
            intercept: with_default(&record.rescale_intercept, "Rescale Intercept")?,
            slope: with_default(&record.rescale_slope, "Rescale Slope")?,
        })
    }
}
