use std::path::PathBuf;

use thiserror::Error;

/// Structural failures that abort flag assembly.
///
/// Missing or broken metadata is never reported here: the colorspace
/// resolver and the framerate estimator fall back to defaults instead.
#[derive(Debug, Error)]
pub enum FlagsError {
    #[error("no input files given")]
    NoInputFiles,

    #[error("cannot find a frame number in file name: {path}")]
    PatternNotFound { path: String },

    #[error("frame number {digits} in {path} is too large")]
    FrameNumberOutOfRange { path: String, digits: String },

    #[error("failed to write concat manifest {}", path.display())]
    ManifestWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}
