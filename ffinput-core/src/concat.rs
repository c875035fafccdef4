//! FFmpeg concat-demuxer manifests with explicit per-frame durations.
//!
//! Unlike the image2 template, a manifest keeps the real capture cadence of a
//! burst: every frame is shown for as long as it took to capture the next one.

use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::FlagsError;
use crate::path_token;

/// Shortest duration a frame may get, so equal or reordered capture times
/// never produce zero or negative durations.
pub const DEFAULT_MIN_FRAME_DURATION: f64 = 1.0 / 60.0;

#[derive(Debug, Clone, PartialEq)]
pub struct ConcatEntry {
    pub path: String,
    pub duration: f64,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ConcatManifest {
    entries: Vec<ConcatEntry>,
}

impl ConcatManifest {
    /// Build a manifest from capture times, one per path.
    ///
    /// Frames without a capture time are left out. Each remaining frame lasts
    /// until the next one was captured, floored at `min_duration`; the last
    /// frame repeats the previous duration.
    pub fn from_timestamps(paths: &[PathBuf], times: &[Option<f64>], min_duration: f64) -> Self {
        let timed: Vec<(&PathBuf, f64)> = paths
            .iter()
            .zip(times)
            .filter_map(|(path, time)| time.map(|t| (path, t)))
            .collect();

        let mut entries = Vec::with_capacity(timed.len());
        let mut last_duration = round_micros(min_duration);

        for (i, (path, time)) in timed.iter().enumerate() {
            if let Some((_, next)) = timed.get(i + 1) {
                last_duration = round_micros((next - time).max(min_duration));
            }
            entries.push(ConcatEntry {
                path: path_token(path),
                duration: last_duration,
            });
        }

        Self { entries }
    }

    /// Every frame shown for the same `duration`.
    pub fn uniform(paths: &[PathBuf], duration: f64) -> Self {
        let duration = round_micros(duration);
        Self {
            entries: paths
                .iter()
                .map(|path| ConcatEntry {
                    path: path_token(path),
                    duration,
                })
                .collect(),
        }
    }

    pub fn entries(&self) -> &[ConcatEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Render in concat-demuxer syntax. The last file is listed twice, since
    /// the demuxer ignores the duration of the final entry.
    pub fn render(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            let _ = writeln!(out, "file '{}'", quote(&entry.path));
            let _ = writeln!(out, "duration {}", entry.duration);
        }
        if let Some(last) = self.entries.last() {
            let _ = writeln!(out, "file '{}'", quote(&last.path));
        }
        out
    }

    pub fn write_to(&self, path: impl AsRef<Path>) -> Result<(), FlagsError> {
        let path = path.as_ref();
        fs::write(path, self.render()).map_err(|source| FlagsError::ManifestWrite {
            path: path.to_path_buf(),
            source,
        })?;
        log::debug!(
            "Wrote concat manifest with {} frames to {:?}",
            self.entries.len(),
            path
        );
        Ok(())
    }
}

fn round_micros(seconds: f64) -> f64 {
    (seconds * 1_000_000.0).round() / 1_000_000.0
}

/// Close the quote, emit an escaped quote, reopen.
fn quote(path: &str) -> String {
    path.replace('\'', r"'\''")
}
