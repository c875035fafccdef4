use std::path::{Path, PathBuf};

use crate::concat::{ConcatManifest, DEFAULT_MIN_FRAME_DURATION};
use crate::error::FlagsError;
use crate::framerate::FramerateEstimator;
use crate::metadata::MetadataSource;
use crate::path_token;
use crate::sequence_pattern::extract_pattern;

/// Turns a multi-frame image sequence into FFmpeg input flags.
pub trait SequenceStrategy {
    fn input_flags(
        &self,
        paths: &[PathBuf],
        metadata: &MetadataSource,
    ) -> Result<Vec<String>, FlagsError>;
}

/// Available ways of feeding an image sequence to FFmpeg
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SequenceStrategyKind {
    /// image2 demuxer with one estimated, quantized framerate
    #[default]
    Framerate,
    /// concat demuxer with a per-frame duration manifest
    Concat,
}

impl SequenceStrategyKind {
    pub const ALL: [SequenceStrategyKind; 2] =
        [SequenceStrategyKind::Framerate, SequenceStrategyKind::Concat];

    /// Get strategy from string name
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "framerate" | "fps" | "image2" => Some(SequenceStrategyKind::Framerate),
            "concat" | "manifest" | "durations" => Some(SequenceStrategyKind::Concat),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            SequenceStrategyKind::Framerate => "framerate",
            SequenceStrategyKind::Concat => "concat",
        }
    }

    /// Get description of the strategy
    pub fn description(&self) -> &'static str {
        match self {
            SequenceStrategyKind::Framerate => {
                "image2 pattern played at a standard rate estimated from capture times"
            }
            SequenceStrategyKind::Concat => {
                "concat manifest giving each frame its own captured duration"
            }
        }
    }

    /// List all available strategies
    pub fn list_all() -> Vec<(&'static str, &'static str)> {
        Self::ALL
            .iter()
            .map(|kind| (kind.as_str(), kind.description()))
            .collect()
    }
}

/// `-f image2 -r <rate> -start_number <n> -i <template>`
#[derive(Debug, Clone, Copy, Default)]
pub struct FramerateSequence {
    estimator: FramerateEstimator,
}

impl FramerateSequence {
    pub fn new(estimator: FramerateEstimator) -> Self {
        Self { estimator }
    }
}

impl SequenceStrategy for FramerateSequence {
    fn input_flags(
        &self,
        paths: &[PathBuf],
        metadata: &MetadataSource,
    ) -> Result<Vec<String>, FlagsError> {
        let first = paths.first().ok_or(FlagsError::NoInputFiles)?;
        let pattern = extract_pattern(first)?;

        let strays = paths.iter().filter(|path| !pattern.matches(path)).count();
        if strays > 0 {
            log::warn!(
                "{} of {} files do not match {} and will not be read",
                strays,
                paths.len(),
                pattern.template
            );
        }

        let rate = self.estimator.estimate(paths, metadata);

        Ok(vec![
            "-f".to_string(),
            "image2".to_string(),
            "-r".to_string(),
            rate.to_string(),
            "-start_number".to_string(),
            pattern.start_number.to_string(),
            "-i".to_string(),
            pattern.template,
        ])
    }
}

/// `-f concat -safe 0 -i <manifest>`, writing the manifest to a path owned by
/// the caller. Removing the file afterwards is the caller's job.
#[derive(Debug, Clone)]
pub struct ConcatSequence {
    manifest: PathBuf,
    min_duration: f64,
    default_rate: u32,
}

impl ConcatSequence {
    pub fn new(manifest: impl AsRef<Path>) -> Self {
        Self {
            manifest: manifest.as_ref().to_path_buf(),
            min_duration: DEFAULT_MIN_FRAME_DURATION,
            default_rate: FramerateEstimator::default().fallback(),
        }
    }

    /// Floor for per-frame durations, in seconds.
    pub fn min_duration(mut self, seconds: f64) -> Self {
        if seconds.is_finite() && seconds > 0.0 {
            self.min_duration = seconds;
        } else {
            log::warn!("Ignoring invalid minimum frame duration {}", seconds);
        }
        self
    }

    /// Rate used for uniform durations when no capture time is known.
    pub fn default_rate(mut self, fps: u32) -> Self {
        self.default_rate = fps.max(1);
        self
    }

    pub fn build_manifest(&self, paths: &[PathBuf], metadata: &MetadataSource) -> ConcatManifest {
        let uniform = || ConcatManifest::uniform(paths, 1.0 / f64::from(self.default_rate));

        let Some(provider) = metadata.provider() else {
            return uniform();
        };

        match provider.capture_timestamps(paths) {
            Ok(times) => {
                let manifest = ConcatManifest::from_timestamps(paths, &times, self.min_duration);
                if manifest.is_empty() {
                    log::debug!("No capture times found, using {} fps", self.default_rate);
                    uniform()
                } else {
                    manifest
                }
            }
            Err(e) => {
                log::warn!("Could not read capture times: {:#}", e);
                uniform()
            }
        }
    }
}

impl SequenceStrategy for ConcatSequence {
    fn input_flags(
        &self,
        paths: &[PathBuf],
        metadata: &MetadataSource,
    ) -> Result<Vec<String>, FlagsError> {
        if paths.is_empty() {
            return Err(FlagsError::NoInputFiles);
        }

        self.build_manifest(paths, metadata)
            .write_to(&self.manifest)?;

        Ok(vec![
            "-f".to_string(),
            "concat".to_string(),
            "-safe".to_string(),
            "0".to_string(),
            "-i".to_string(),
            path_token(&self.manifest),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::StaticMetadata;
    use std::fs;

    fn frames(count: usize) -> Vec<PathBuf> {
        (1..=count)
            .map(|i| PathBuf::from(format!("IMG_{:04}.JPG", i)))
            .collect()
    }

    #[test]
    fn test_from_name() {
        assert_eq!(
            SequenceStrategyKind::from_name("Framerate"),
            Some(SequenceStrategyKind::Framerate)
        );
        assert_eq!(
            SequenceStrategyKind::from_name("manifest"),
            Some(SequenceStrategyKind::Concat)
        );
        assert_eq!(SequenceStrategyKind::from_name("gif"), None);
    }

    #[test]
    fn test_list_all_matches_names() {
        for (name, description) in SequenceStrategyKind::list_all() {
            let kind = SequenceStrategyKind::from_name(name).unwrap();
            assert_eq!(kind.as_str(), name);
            assert_eq!(kind.description(), description);
        }
    }

    #[test]
    fn test_framerate_flags() {
        let paths = frames(3);
        let metadata = MetadataSource::available(
            StaticMetadata::new()
                .timestamp(&paths[0], 0.0)
                .timestamp(&paths[2], 0.2),
        );

        let flags = FramerateSequence::default()
            .input_flags(&paths, &metadata)
            .unwrap();
        assert_eq!(
            flags,
            vec!["-f", "image2", "-r", "10", "-start_number", "1", "-i", "IMG_%04d.JPG"]
        );
    }

    #[test]
    fn test_framerate_tolerates_foreign_frames() {
        let paths = vec![
            PathBuf::from("IMG_0001.JPG"),
            PathBuf::from("IMG_0002.JPG"),
            PathBuf::from("edited.png"),
        ];
        let pattern = extract_pattern(&paths[0]).unwrap();
        assert!(pattern.matches(&paths[1]));
        assert!(!pattern.matches(&paths[2]));

        let flags = FramerateSequence::default()
            .input_flags(&paths, &MetadataSource::Unavailable)
            .unwrap();
        assert_eq!(flags[7], "IMG_%04d.JPG");
    }

    #[test]
    fn test_framerate_requires_pattern() {
        let paths = vec![PathBuf::from("photo.jpg"), PathBuf::from("photo-b.jpg")];
        let err = FramerateSequence::default()
            .input_flags(&paths, &MetadataSource::Unavailable)
            .unwrap_err();
        assert!(matches!(err, FlagsError::PatternNotFound { .. }));
    }

    #[test]
    fn test_concat_writes_manifest() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("burst.concat");
        let paths = frames(2);
        let metadata = MetadataSource::available(
            StaticMetadata::new()
                .timestamp(&paths[0], 50.0)
                .timestamp(&paths[1], 50.125),
        );

        let flags = ConcatSequence::new(&manifest)
            .input_flags(&paths, &metadata)
            .unwrap();

        assert_eq!(
            flags,
            vec![
                "-f".to_string(),
                "concat".to_string(),
                "-safe".to_string(),
                "0".to_string(),
                "-i".to_string(),
                manifest.to_string_lossy().into_owned(),
            ]
        );
        assert_eq!(
            fs::read_to_string(&manifest).unwrap(),
            "file 'IMG_0001.JPG'\nduration 0.125\n\
             file 'IMG_0002.JPG'\nduration 0.125\n\
             file 'IMG_0002.JPG'\n"
        );
    }

    #[test]
    fn test_concat_without_metadata_is_uniform() {
        let strategy = ConcatSequence::new("unused.concat").default_rate(4);
        let manifest = strategy.build_manifest(&frames(3), &MetadataSource::Unavailable);

        assert_eq!(manifest.entries().len(), 3);
        assert!(manifest.entries().iter().all(|e| e.duration == 0.25));
    }

    #[test]
    fn test_concat_does_not_need_frame_numbers() {
        let dir = tempfile::tempdir().unwrap();
        let manifest = dir.path().join("burst.concat");
        let paths = vec![PathBuf::from("photo.jpg"), PathBuf::from("other.jpg")];

        let flags = ConcatSequence::new(&manifest)
            .input_flags(&paths, &MetadataSource::Unavailable)
            .unwrap();
        assert_eq!(flags[1], "concat");
    }

    #[test]
    fn test_invalid_min_duration_is_ignored() {
        let strategy = ConcatSequence::new("x.concat").min_duration(-1.0);
        assert_eq!(strategy.min_duration, DEFAULT_MIN_FRAME_DURATION);
    }
}
