use std::path::{Path, PathBuf};

use crate::classify::is_video;
use crate::colorspace::guess_color_space;
use crate::error::FlagsError;
use crate::framerate::{DEFAULT_FRAMERATE, FramerateEstimator};
use crate::metadata::MetadataSource;
use crate::path_token;
use crate::strategy::{FramerateSequence, SequenceStrategy};

/// Builds the FFmpeg input-stage flags for one video or one image sequence.
///
/// The flags come out in a fixed order: input color tagging, the input
/// itself, then output color tagging. Video files skip color handling
/// entirely.
pub struct InputFlags {
    paths: Vec<PathBuf>,
    default_framerate: u32,
    strategy: Option<Box<dyn SequenceStrategy>>,
}

impl InputFlags {
    pub fn new<P: AsRef<Path>>(paths: impl IntoIterator<Item = P>) -> Self {
        Self {
            paths: paths
                .into_iter()
                .map(|path| path.as_ref().to_path_buf())
                .collect(),
            default_framerate: DEFAULT_FRAMERATE,
            strategy: None,
        }
    }

    /// Rate used by the default framerate strategy when capture times are
    /// unusable.
    pub fn default_framerate(mut self, fps: u32) -> Self {
        self.default_framerate = fps;
        self
    }

    /// Replace the image-sequence strategy (image2 with an estimated rate by
    /// default).
    pub fn strategy(mut self, strategy: impl SequenceStrategy + 'static) -> Self {
        self.strategy = Some(Box::new(strategy));
        self
    }

    /// Assemble the full token list. Nothing is returned on failure, so a
    /// truncated flag list never reaches the encoder.
    pub fn build(&self, metadata: &MetadataSource) -> Result<Vec<String>, FlagsError> {
        let primary = self.paths.first().ok_or(FlagsError::NoInputFiles)?;

        if is_video(primary) {
            log::debug!("{:?} is a video, passing it through", primary);
            return Ok(vec!["-i".to_string(), path_token(primary)]);
        }

        let space = guess_color_space(primary, metadata);
        let mut flags = space.input_flags();

        if self.paths.len() < 2 {
            flags.push("-i".to_string());
            flags.push(path_token(primary));
        } else {
            log::debug!("Treating {} files as an image sequence", self.paths.len());
            let sequence_flags = match &self.strategy {
                Some(strategy) => strategy.input_flags(&self.paths, metadata)?,
                None => {
                    let estimator = FramerateEstimator::new().default_rate(self.default_framerate);
                    FramerateSequence::new(estimator).input_flags(&self.paths, metadata)?
                }
            };
            flags.extend(sequence_flags);
        }

        flags.extend(space.output_flags());
        Ok(flags)
    }
}

/// Assemble input flags with the default strategy.
pub fn assemble_input_flags<P: AsRef<Path>>(
    paths: impl IntoIterator<Item = P>,
    metadata: &MetadataSource,
) -> Result<Vec<String>, FlagsError> {
    InputFlags::new(paths).build(metadata)
}
