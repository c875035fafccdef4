use regex::Regex;
use std::path::Path;
use std::sync::LazyLock;

use crate::error::FlagsError;

/// The last digit run in a file name and everything after it.
static FRAME_INDEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([0-9]+)([^0-9]*)$").expect("frame index regex is valid"));

/// printf-style address of a numbered image sequence, as understood by
/// FFmpeg's image2 demuxer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequencePattern {
    /// Frame number of the first file.
    pub start_number: u64,
    /// Width of the frame number, leading zeros included.
    pub num_digits: usize,
    /// Template with a `%0Nd` placeholder; literal `%` are doubled.
    pub template: String,
    prefix: String,
    suffix: String,
}

impl SequencePattern {
    /// The file path of frame `index`.
    pub fn format(&self, index: u64) -> String {
        format!(
            "{}{:0width$}{}",
            self.prefix,
            index,
            self.suffix,
            width = self.num_digits
        )
    }

    /// Whether `path` belongs to this sequence.
    pub fn matches(&self, path: impl AsRef<Path>) -> bool {
        let path = path.as_ref().to_string_lossy();
        path.strip_prefix(self.prefix.as_str())
            .and_then(|rest| rest.strip_suffix(self.suffix.as_str()))
            .is_some_and(|digits| {
                digits.len() == self.num_digits && digits.bytes().all(|b| b.is_ascii_digit())
            })
    }
}

/// Derive the sequence pattern from the first frame of a sequence.
///
/// Only the file-name component is searched, so digits in directory names
/// stay literal. When the name holds several digit runs, the last one is the
/// frame number.
pub fn extract_pattern(first: impl AsRef<Path>) -> Result<SequencePattern, FlagsError> {
    let path = first.as_ref().to_string_lossy();
    let not_found = || FlagsError::PatternNotFound {
        path: path.to_string(),
    };

    let name_start = path
        .rfind(std::path::is_separator)
        .map(|pos| pos + 1)
        .unwrap_or(0);
    let name = &path[name_start..];

    let caps = FRAME_INDEX.captures(name).ok_or_else(not_found)?;
    let (digits, suffix) = match (caps.get(1), caps.get(2)) {
        (Some(digits), Some(suffix)) => (digits, suffix),
        _ => return Err(not_found()),
    };

    let start_number: u64 = digits.as_str().parse().map_err(|_| {
        FlagsError::FrameNumberOutOfRange {
            path: path.to_string(),
            digits: digits.as_str().to_string(),
        }
    })?;
    let num_digits = digits.as_str().len();
    let prefix = &path[..name_start + digits.start()];
    let suffix = suffix.as_str();

    let template = format!(
        "{}%0{}d{}",
        escape_percent(prefix),
        num_digits,
        escape_percent(suffix)
    );

    log::debug!(
        "Sequence pattern for {:?}: {} starting at {}",
        path,
        template,
        start_number
    );

    Ok(SequencePattern {
        start_number,
        num_digits,
        template,
        prefix: prefix.to_string(),
        suffix: suffix.to_string(),
    })
}

fn escape_percent(text: &str) -> String {
    text.replace('%', "%%")
}
