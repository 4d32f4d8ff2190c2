use std::path::PathBuf;

use clap::Parser;
use snafu::{Report, ResultExt, Snafu, Whatever};
use tracing::{error, Level};

use dicom2png::batch::{default_output_dir, BatchDriver, BatchError};
use dicom2png::convert::Converter;
use dicom2png::preprocess::Preprocessor;
use dicom2png::transform::FilterType;

#[derive(Debug, Snafu)]
pub enum Error {
    #[snafu(display("Batch conversion failed"))]
    Batch {
        #[snafu(source(from(BatchError, Box::new)))]
        source: Box<BatchError>,
    },

    #[snafu(display("{} of {} files could not be converted", failed, total))]
    StrictFailure { failed: usize, total: usize },
}

#[derive(Parser, Debug)]
#[command(author = "Scott Chase Waggener", version = env!("CARGO_PKG_VERSION"), about = "Convert a directory of DICOM files into 384x384 grayscale PNGs", long_about = None)]
struct Args {
    #[arg(help = "Source directory. Searched recursively for files ending in .dcm")]
    source: PathBuf,

    #[arg(
        help = "Output directory. Defaults to the source directory with a _png suffix",
        long = "output",
        short = 'o'
    )]
    output: Option<PathBuf>,

    #[arg(
        help = "Number of worker threads. Defaults to the available parallelism",
        long = "threads",
        short = 'j'
    )]
    threads: Option<usize>,

    #[arg(
        help = "Resampling filter used when resizing",
        long = "filter",
        short = 'f',
        value_parser = clap::value_parser!(FilterType),
        default_value_t = FilterType::default(),
    )]
    filter: FilterType,

    #[arg(
        help = "Exit with an error if any file could not be converted",
        long = "strict",
        default_value_t = false
    )]
    strict: bool,

    #[arg(
        help = "Increase logging verbosity (-v, -vv, -vvv, -vvvv)",
        short = 'v',
        action = clap::ArgAction::Count
    )]
    verbose: u8,
}

fn log_level(verbose: u8) -> Level {
    match verbose {
        0 => Level::ERROR,
        1 => Level::WARN,
        2 => Level::INFO,
        3 => Level::DEBUG,
        _ => Level::TRACE,
    }
}

fn main() {
    let args = Args::parse();

    tracing::subscriber::set_global_default(
        tracing_subscriber::FmtSubscriber::builder()
            .with_max_level(log_level(args.verbose))
            .finish(),
    )
    .whatever_context("Could not set up global logging subscriber")
    .unwrap_or_else(|e: Whatever| {
        eprintln!("[ERROR] {}", Report::from_error(e));
    });

    run(args).unwrap_or_else(|e| {
        error!("{}", Report::from_error(e));
        std::process::exit(-1);
    });
}

fn run(args: Args) -> Result<(), Error> {
    let output = args
        .output
        .unwrap_or_else(|| default_output_dir(&args.source));

    let converter = Converter::new(output).with_preprocessor(Preprocessor::new(args.filter));
    let driver = BatchDriver::new(converter, args.threads).context(BatchSnafu)?;
    let summary = driver.run_dir(&args.source).context(BatchSnafu)?;

    if args.strict && summary.failed > 0 {
        return StrictFailureSnafu {
            failed: summary.failed,
            total: summary.total(),
        }
        .fail();
    }
    Ok(())
}
