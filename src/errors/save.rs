use std::path::PathBuf;

pub use snafu::Snafu;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum SaveError {
    #[snafu(display("could not create PNG file {}", path.display()))]
    CreateFile {
        path: PathBuf,
        #[snafu(source(from(std::io::Error, Box::new)))]
        source: Box<std::io::Error>,
    },

    #[snafu(display("error writing PNG file {}", path.display()))]
    WritePng {
        path: PathBuf,
        #[snafu(source(from(image::ImageError, Box::new)))]
        source: Box<image::ImageError>,
    },

    #[snafu(display("array of shape {}x{} cannot be encoded as an image", width, height))]
    InvalidShape { width: usize, height: usize },
}
