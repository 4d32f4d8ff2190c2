use dicom::core::value::ConvertValueError;
use dicom::object::ReadError;
pub use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum DicomError {
    #[snafu(display("error reading DICOM file: {:?}", source))]
    ReadError {
        #[snafu(source(from(ReadError, Box::new)))]
        source: Box<ReadError>,
    },

    #[snafu(display("missing DICOM property: {}", name))]
    MissingPropertyError { name: &'static str },

    #[snafu(display("unable to convert DICOM property value '{}': {:?}", name, source))]
    ConvertValueError {
        name: &'static str,
        #[snafu(source(from(ConvertValueError, Box::new)))]
        source: Box<ConvertValueError>,
    },

    #[snafu(display("invalid DICOM property value '{}': {}", name, value))]
    InvalidValueError { name: &'static str, value: String },

    #[snafu(display("DICOM property '{}' has no values", name))]
    EmptyPropertyError { name: &'static str },

    #[snafu(display("error processing DICOM pixel data: {:?}", source))]
    PixelDataError {
        #[snafu(source(from(dicom::pixeldata::Error, Box::new)))]
        source: Box<dicom::pixeldata::Error>,
    },

    #[snafu(display("unsupported samples per pixel: {} (only grayscale is supported)", samples))]
    UnsupportedSamplesPerPixel { samples: u16 },

    #[snafu(display("pixel data has an invalid shape: {:?}", shape))]
    InvalidShape { shape: Vec<usize> },
}
