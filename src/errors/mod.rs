pub mod dicom;
pub mod save;

pub use dicom::DicomError;
pub use save::SaveError;
