use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuildError, ThreadPoolBuilder};
use snafu::{ResultExt, Snafu};
use std::ffi::OsString;
use std::fmt;
use std::num::NonZero;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::path::{Path, PathBuf};
use std::thread::available_parallelism;
use tracing::{error, info, warn};

use crate::convert::{ConversionStatus, Converter};
use crate::file::{Task, TaskRegistry};

/// Suffix appended to the source directory to form the default output directory
pub const OUTPUT_DIR_SUFFIX: &str = "_png";

#[derive(Debug, Snafu)]
pub enum BatchError {
    #[snafu(display("Invalid source path: {}", path.display()))]
    InvalidSourcePath { path: PathBuf },

    #[snafu(display("Failed to search for DICOM files in {}", path.display()))]
    Discover {
        path: PathBuf,
        #[snafu(source(from(std::io::Error, Box::new)))]
        source: Box<std::io::Error>,
    },

    #[snafu(display("Failed to create directory: {}", path.display()))]
    CreateDir {
        path: PathBuf,
        #[snafu(source(from(std::io::Error, Box::new)))]
        source: Box<std::io::Error>,
    },

    #[snafu(display("Failed to build a worker pool with {} threads", threads))]
    ThreadPool {
        threads: usize,
        #[snafu(source(from(ThreadPoolBuildError, Box::new)))]
        source: Box<ThreadPoolBuildError>,
    },
}

/// The sibling directory `<source>_png`
pub fn default_output_dir<P: AsRef<Path>>(source: P) -> PathBuf {
    // Rebuilding from components drops any trailing separator
    let source: PathBuf = source.as_ref().components().collect();
    let mut name = OsString::from(source.as_os_str());
    name.push(OUTPUT_DIR_SUFFIX);
    PathBuf::from(name)
}

/// Number of worker threads to use when none is requested
pub fn default_threads() -> usize {
    available_parallelism()
        .unwrap_or(NonZero::<usize>::MIN)
        .get()
}

/// Counts of per-file outcomes for a batch run
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub saved: usize,
    pub skipped: usize,
    pub failed: usize,
    pub discarded: usize,
}

impl BatchSummary {
    pub fn record(mut self, status: &ConversionStatus) -> Self {
        match status {
            ConversionStatus::Saved(_) => self.saved += 1,
            ConversionStatus::Skipped(_) => self.skipped += 1,
            ConversionStatus::ReadFailed(_) => self.failed += 1,
            ConversionStatus::Discarded => self.discarded += 1,
        }
        self
    }

    pub fn merge(self, other: Self) -> Self {
        BatchSummary {
            saved: self.saved + other.saved,
            skipped: self.skipped + other.skipped,
            failed: self.failed + other.failed,
            discarded: self.discarded + other.discarded,
        }
    }

    pub fn total(&self) -> usize {
        self.saved + self.skipped + self.failed + self.discarded
    }
}

impl fmt::Display for BatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} files: {} saved, {} skipped, {} failed, {} discarded",
            self.total(),
            self.saved,
            self.skipped,
            self.failed,
            self.discarded
        )
    }
}

/// Run a single task, reporting a panic as a failed conversion so it cannot
/// take down the rest of the batch.
fn contain_panic<F>(task: &Task, convert: F) -> ConversionStatus
where
    F: FnOnce() -> ConversionStatus,
{
    catch_unwind(AssertUnwindSafe(convert)).unwrap_or_else(|payload| {
        let reason = payload
            .downcast_ref::<&str>()
            .map(|msg| msg.to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "unknown panic".to_string());
        error!(
            "Panic while processing file {} ({}): {}",
            task.path.display(),
            task.key,
            reason
        );
        ConversionStatus::ReadFailed(format!("panic: {reason}"))
    })
}

/// Runs the converter over every discovered file on a bounded worker pool.
pub struct BatchDriver {
    converter: Converter,
    pool: ThreadPool,
}

impl BatchDriver {
    pub fn new(converter: Converter, threads: Option<usize>) -> Result<Self, BatchError> {
        let threads = threads.unwrap_or_else(default_threads).max(1);
        let pool = ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("dicom2png-{i}"))
            .build()
            .context(ThreadPoolSnafu { threads })?;
        Ok(BatchDriver { converter, pool })
    }

    /// Convert every task in the registry and wait for all of them to finish.
    /// Per-file failures are contained in the returned summary.
    pub fn run(&self, registry: &TaskRegistry) -> BatchSummary {
        self.run_with(registry, |task| {
            self.converter.convert(&task.key, &task.path)
        })
    }

    fn run_with<F>(&self, registry: &TaskRegistry, convert: F) -> BatchSummary
    where
        F: Fn(&Task) -> ConversionStatus + Sync,
    {
        self.pool.install(|| {
            registry
                .tasks()
                .par_iter()
                .map(|task| {
                    let status = contain_panic(task, || convert(task));
                    BatchSummary::default().record(&status)
                })
                .reduce(BatchSummary::default, BatchSummary::merge)
        })
    }

    /// Create the output directory, discover DICOM files under `source` and convert them.
    pub fn run_dir<P: AsRef<Path>>(&self, source: P) -> Result<BatchSummary, BatchError> {
        let source = source.as_ref();
        if !source.is_dir() {
            return InvalidSourcePathSnafu { path: source }.fail();
        }

        let output_dir = &self.converter.output_dir;
        std::fs::create_dir_all(output_dir).context(CreateDirSnafu { path: output_dir })?;

        let registry = TaskRegistry::discover(source).context(DiscoverSnafu { path: source })?;
        if registry.is_empty() {
            warn!("No DICOM files found in {}", source.display());
        } else {
            info!("Number of sources found: {}", registry.len());
        }

        let summary = self.run(&registry);
        info!("Finished {}: {}", source.display(), summary);
        Ok(summary)
    }
}
