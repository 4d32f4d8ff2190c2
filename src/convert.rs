use snafu::{Report, ResultExt, Snafu};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, error};

use crate::errors::{dicom::ReadSnafu, DicomError, SaveError};
use crate::file::DicomFileOperations;
use crate::metadata::{sop_instance_uid, SourceRecord};
use crate::preprocess::Preprocessor;
use crate::save::PngSaver;

pub const OUTPUT_EXTENSION: &str = "png";

#[derive(Debug, Snafu)]
pub enum ConvertError {
    #[snafu(display("DICOM error on {}: {}", path.display(), source))]
    Dicom {
        path: PathBuf,
        #[snafu(source(from(DicomError, Box::new)))]
        source: Box<DicomError>,
    },

    #[snafu(display("PNG error on {}: {}", path.display(), source))]
    Save {
        path: PathBuf,
        #[snafu(source(from(SaveError, Box::new)))]
        source: Box<SaveError>,
    },
}

/// Outcome of converting a single file
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConversionStatus {
    /// The image was written to the given path
    Saved(PathBuf),
    /// An output for this image already exists at the given path
    Skipped(PathBuf),
    /// The file could not be read or converted
    ReadFailed(String),
    /// The image was flat after windowing and nothing was written
    Discarded,
}

impl fmt::Display for ConversionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConversionStatus::Saved(path) => write!(f, "saved {}", path.display()),
            ConversionStatus::Skipped(path) => write!(f, "skipped, {} exists", path.display()),
            ConversionStatus::ReadFailed(reason) => write!(f, "failed: {reason}"),
            ConversionStatus::Discarded => write!(f, "discarded"),
        }
    }
}

/// Converts single DICOM files into PNGs named by SOP Instance UID
#[derive(Debug, Clone)]
pub struct Converter {
    pub preprocessor: Preprocessor,
    pub saver: PngSaver,
    pub output_dir: PathBuf,
}

impl Converter {
    pub fn new<P: AsRef<Path>>(output_dir: P) -> Self {
        Converter {
            preprocessor: Preprocessor::default(),
            saver: PngSaver::default(),
            output_dir: output_dir.as_ref().to_path_buf(),
        }
    }

    pub fn with_preprocessor(self, preprocessor: Preprocessor) -> Self {
        Converter {
            preprocessor,
            ..self
        }
    }

    /// Path of the output image for a given SOP Instance UID
    pub fn output_path(&self, sop_instance_uid: &str) -> PathBuf {
        self.output_dir
            .join(format!("{sop_instance_uid}.{OUTPUT_EXTENSION}"))
    }

    /// Convert a file, never failing. Errors are logged and reported as
    /// [`ConversionStatus::ReadFailed`].
    pub fn convert<P: AsRef<Path>>(&self, task_key: &str, source: P) -> ConversionStatus {
        let source = source.as_ref();
        match self.try_convert(task_key, source) {
            Ok(status) => {
                debug!("{} ({}): {}", task_key, source.display(), status);
                status
            }
            Err(e) => {
                let report = Report::from_error(&e).to_string();
                error!(
                    "Error processing file {} ({}): {}",
                    source.display(),
                    task_key,
                    report
                );
                ConversionStatus::ReadFailed(report)
            }
        }
    }

    pub fn try_convert(
        &self,
        task_key: &str,
        source: &Path,
    ) -> Result<ConversionStatus, ConvertError> {
        // Resolve the output identity from the header alone, so existing outputs
        // are skipped without decoding pixel data
        let header = source
            .dcmread_header()
            .context(ReadSnafu)
            .context(DicomSnafu { path: source })?;
        let uid = sop_instance_uid(&header).context(DicomSnafu { path: source })?;
        let dest = self.output_path(&uid);
        if dest.is_file() {
            return Ok(ConversionStatus::Skipped(dest));
        }
        drop(header);

        debug!(
            "Processing {} ({}) -> {}",
            source.display(),
            task_key,
            dest.display()
        );
        let file = source
            .dcmread()
            .context(ReadSnafu)
            .context(DicomSnafu { path: source })?;
        let record = SourceRecord::try_from(&file).context(DicomSnafu { path: source })?;
        drop(file);

        let image = match self
            .preprocessor
            .prepare_image(&record)
            .context(DicomSnafu { path: source })?
        {
            Some(image) => image,
            None => return Ok(ConversionStatus::Discarded),
        };

        let dest = self.output_path(&record.sop_instance_uid);
        self.saver
            .save(&image, &dest)
            .context(SaveSnafu { path: dest.as_path() })?;
        Ok(ConversionStatus::Saved(dest))
    }
}
