use dicom::core::Tag;
use dicom::dictionary_std::tags;
use dicom::object::{
    DefaultDicomObject, FileMetaTableBuilder, InMemDicomObject, OpenFileOptions, ReadError,
    ReadPreamble,
};
use dicom::transfer_syntax::entries::{EXPLICIT_VR_LITTLE_ENDIAN, IMPLICIT_VR_LITTLE_ENDIAN};
use std::fs::File;
use std::io::{BufReader, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub const DICM_PREFIX: &[u8; 4] = b"DICM";
pub const DICM_PREFIX_LOCATION: u64 = 128;
pub const DICOM_EXTENSION: &str = ".dcm";
pub const TASK_KEY_PREFIX: &str = "img_";

type IOResult<T> = Result<T, std::io::Error>;

pub trait DicomFileOperations
where
    Self: AsRef<Path>,
{
    /// Check if a file has a DICM prefix.
    /// This will only return an error if the file cannot be opened.
    /// Any other errors mapped to `false`.
    fn has_dicm_prefix(&self) -> IOResult<bool> {
        let mut reader = File::open(self.as_ref())?;
        let mut buffer = [0; DICM_PREFIX.len()];
        reader
            .seek(SeekFrom::Start(DICM_PREFIX_LOCATION))
            .and_then(|_| reader.read_exact(&mut buffer))
            .map_or(Ok(false), |_| Ok(&buffer == DICM_PREFIX))
    }

    /// Check if a file name ends with `.dcm`, ignoring case.
    fn has_dicom_extension(&self) -> bool {
        self.as_ref()
            .file_name()
            .map(|name| {
                name.to_string_lossy()
                    .to_lowercase()
                    .ends_with(DICOM_EXTENSION)
            })
            .unwrap_or(false)
    }

    /// Recursively find all files with a DICOM extension, in directory walk order.
    /// Errors encountered while walking the directory are propagated.
    fn find_dicoms(&self) -> IOResult<Vec<PathBuf>> {
        let dir = self.as_ref();
        if !dir.is_dir() {
            return Err(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                "Not a directory",
            ));
        }
        WalkDir::new(dir)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) if entry.path().is_file() && entry.path().has_dicom_extension() => {
                    Some(Ok(entry.into_path()))
                }
                Ok(_) => None,
                Err(e) => Some(Err(e.into())),
            })
            .collect()
    }

    /// Choose how to treat the 128-byte preamble. Files without the DICM marker after the
    /// preamble are read as if the preamble were missing.
    fn preamble_option(&self) -> ReadPreamble {
        match self.has_dicm_prefix() {
            Ok(false) => ReadPreamble::Never,
            _ => ReadPreamble::Always,
        }
    }

    /// Read the DICOM file, tolerating a missing preamble or file meta group.
    fn dcmread(&self) -> Result<DefaultDicomObject, ReadError> {
        OpenFileOptions::new()
            .read_preamble(self.preamble_option())
            .open_file(self.as_ref())
            .or_else(|e| self.dcmread_dataset().ok_or(e))
    }

    /// Read the DICOM file up to (excluding) the pixel data.
    /// Bare data sets are read in full.
    fn dcmread_header(&self) -> Result<DefaultDicomObject, ReadError> {
        OpenFileOptions::new()
            .read_preamble(self.preamble_option())
            .read_until(tags::PIXEL_DATA)
            .open_file(self.as_ref())
            .or_else(|e| self.dcmread_dataset().ok_or(e))
    }

    /// Read a bare data set with no file meta group, trying implicit VR little endian
    /// and then explicit VR little endian. A file meta group is synthesized from the
    /// data set. Data sets without a SOP Instance UID are rejected.
    fn dcmread_dataset(&self) -> Option<DefaultDicomObject> {
        [IMPLICIT_VR_LITTLE_ENDIAN, EXPLICIT_VR_LITTLE_ENDIAN]
            .into_iter()
            .find_map(|ts| {
                let ts = ts.erased();
                let reader = BufReader::new(File::open(self.as_ref()).ok()?);
                let obj = InMemDicomObject::read_dataset_with_ts(reader, &ts).ok()?;

                let read_uid = |tag: Tag| {
                    obj.get(tag)
                        .and_then(|elem| elem.to_str().ok())
                        .map(|uid| uid.trim_end_matches(['\0', ' ']).to_string())
                        .filter(|uid| !uid.is_empty())
                };
                let sop_instance_uid = read_uid(tags::SOP_INSTANCE_UID)?;
                let sop_class_uid = read_uid(tags::SOP_CLASS_UID).unwrap_or_default();
                let meta = FileMetaTableBuilder::new()
                    .transfer_syntax(ts.uid())
                    .media_storage_sop_class_uid(sop_class_uid)
                    .media_storage_sop_instance_uid(sop_instance_uid)
                    .build()
                    .ok()?;
                Some(obj.with_exact_meta(meta))
            })
    }
}

impl<P: AsRef<Path>> DicomFileOperations for P {}

/// A discovered input file and the synthetic key it was registered under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Task {
    pub key: String,
    pub path: PathBuf,
}

/// Immutable list of conversion tasks, keyed `img_<n>` in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskRegistry {
    tasks: Vec<Task>,
}

impl TaskRegistry {
    /// Discover all DICOM files under `dir` and register them in walk order.
    pub fn discover<P: AsRef<Path>>(dir: P) -> IOResult<Self> {
        Ok(dir.as_ref().find_dicoms()?.into_iter().collect())
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }
}

impl FromIterator<PathBuf> for TaskRegistry {
    fn from_iter<I: IntoIterator<Item = PathBuf>>(paths: I) -> Self {
        let tasks = paths
            .into_iter()
            .enumerate()
            .map(|(index, path)| Task {
                key: format!("{TASK_KEY_PREFIX}{index}"),
                path,
            })
            .collect();
        TaskRegistry { tasks }
    }
}
