//! ffinput Core - computes FFmpeg input flags for videos and image bursts
//!
//! This library decides which input-stage arguments FFmpeg needs to ingest
//! either a single video file or a numbered sequence of still images:
//! - Video vs. still-image classification by file extension
//! - Colorspace detection from the embedded ICC profile (via exiftool)
//! - printf-style sequence templates derived from frame file names
//! - Playback framerate estimation from capture timestamps
//! - An alternative concat-demuxer manifest with per-frame durations
//!
//! The result is a flat list of tokens meant to be passed verbatim to FFmpeg.

pub mod classify;
pub mod colorspace;
pub mod concat;
pub mod error;
pub mod exiftool;
pub mod framerate;
pub mod input_flags;
pub mod metadata;
pub mod sequence_pattern;
pub mod strategy;

// Re-export commonly used types at the crate root
pub use classify::is_video;
pub use colorspace::{ColorSpace, guess_color_space};
pub use concat::{ConcatManifest, DEFAULT_MIN_FRAME_DURATION};
pub use error::FlagsError;
pub use exiftool::{DEFAULT_EXIFTOOL, ExifTool, check_exiftool};
pub use framerate::{DEFAULT_FRAMERATE, FramerateEstimator, estimate_framerate, quantize_framerate};
pub use input_flags::{InputFlags, assemble_input_flags};
pub use metadata::{MetadataProvider, MetadataSource, StaticMetadata};
pub use sequence_pattern::{SequencePattern, extract_pattern};
pub use strategy::{ConcatSequence, FramerateSequence, SequenceStrategy, SequenceStrategyKind};

use std::path::Path;

/// Render a path the way it is handed to FFmpeg on the command line.
pub(crate) fn path_token(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
