use anyhow::Result;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};

use crate::exiftool::{ExifTool, check_exiftool};

/// Source of per-file metadata needed to tag and pace the input.
pub trait MetadataProvider {
    /// ICC profile description, e.g. "sRGB IEC61966-2.1" or "Display P3".
    /// An empty string means the file carries no profile.
    fn color_profile_description(&self, path: &Path) -> Result<String>;

    /// Capture time in seconds since the Unix epoch, including the sub-second
    /// fraction. `None` when the file has no capture time.
    fn capture_timestamp(&self, path: &Path) -> Result<Option<f64>>;

    /// Capture times for many files, in the order given.
    fn capture_timestamps(&self, paths: &[PathBuf]) -> Result<Vec<Option<f64>>> {
        paths
            .iter()
            .map(|path| self.capture_timestamp(path))
            .collect()
    }
}

/// Metadata capability handed to the assembler.
///
/// `Unavailable` is a normal operating mode (the tool is not installed),
/// in which colorspace and framerate fall back to their defaults.
pub enum MetadataSource {
    Available(Box<dyn MetadataProvider>),
    Unavailable,
}

impl MetadataSource {
    pub fn available(provider: impl MetadataProvider + 'static) -> Self {
        MetadataSource::Available(Box::new(provider))
    }

    /// Probe for exiftool once and wrap it if it runs.
    pub fn detect(binary: impl AsRef<Path>) -> Self {
        let binary = binary.as_ref();
        match check_exiftool(binary) {
            Ok(version) => {
                log::debug!("exiftool version {} detected", version);
                Self::available(ExifTool::new(binary))
            }
            Err(e) => {
                log::warn!("Metadata unavailable, using defaults: {:#}", e);
                MetadataSource::Unavailable
            }
        }
    }

    pub fn provider(&self) -> Option<&dyn MetadataProvider> {
        match self {
            MetadataSource::Available(provider) => Some(provider.as_ref()),
            MetadataSource::Unavailable => None,
        }
    }
}

impl fmt::Debug for MetadataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetadataSource::Available(_) => f.write_str("MetadataSource::Available(..)"),
            MetadataSource::Unavailable => f.write_str("MetadataSource::Unavailable"),
        }
    }
}

/// In-memory provider with fixed answers.
///
/// Every file reports the same profile description; capture times are looked
/// up per path and files without an entry have none.
#[derive(Debug, Clone, Default)]
pub struct StaticMetadata {
    profile_description: String,
    timestamps: HashMap<PathBuf, f64>,
}

impl StaticMetadata {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn profile_description(mut self, description: &str) -> Self {
        self.profile_description = description.to_string();
        self
    }

    pub fn timestamp(mut self, path: impl AsRef<Path>, seconds: f64) -> Self {
        self.timestamps.insert(path.as_ref().to_path_buf(), seconds);
        self
    }
}

impl MetadataProvider for StaticMetadata {
    fn color_profile_description(&self, _path: &Path) -> Result<String> {
        Ok(self.profile_description.clone())
    }

    fn capture_timestamp(&self, path: &Path) -> Result<Option<f64>> {
        Ok(self.timestamps.get(path).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_metadata_answers() {
        let metadata = StaticMetadata::new()
            .profile_description("Display P3")
            .timestamp("a.jpg", 12.5);

        assert_eq!(
            metadata.color_profile_description(Path::new("b.jpg")).unwrap(),
            "Display P3"
        );
        assert_eq!(
            metadata.capture_timestamp(Path::new("a.jpg")).unwrap(),
            Some(12.5)
        );
        assert_eq!(metadata.capture_timestamp(Path::new("b.jpg")).unwrap(), None);
    }

    #[test]
    fn test_batch_timestamps_keep_order() {
        let metadata = StaticMetadata::new()
            .timestamp("a.jpg", 1.0)
            .timestamp("c.jpg", 3.0);
        let paths = vec![
            PathBuf::from("c.jpg"),
            PathBuf::from("b.jpg"),
            PathBuf::from("a.jpg"),
        ];

        let times = metadata.capture_timestamps(&paths).unwrap();
        assert_eq!(times, vec![Some(3.0), None, Some(1.0)]);
    }

    #[test]
    fn test_source_availability() {
        let source = MetadataSource::available(StaticMetadata::new());
        assert!(source.provider().is_some());

        let source = MetadataSource::Unavailable;
        assert!(source.provider().is_none());
    }

    #[test]
    fn test_detect_missing_binary_is_unavailable() {
        let source = MetadataSource::detect("/nonexistent/ffinput-test-exiftool");
        assert!(matches!(source, MetadataSource::Unavailable));
    }
}
