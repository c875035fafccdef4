use anyhow::{Context, Result};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::process::Command;

use crate::metadata::MetadataProvider;

/// Binary looked up on `PATH` when no explicit location is given.
pub const DEFAULT_EXIFTOOL: &str = "exiftool";

/// Check if exiftool is available and return version info
pub fn check_exiftool(binary: impl AsRef<Path>) -> Result<String> {
    let output = Command::new(binary.as_ref())
        .arg("-ver")
        .output()
        .context("exiftool not found. Please install exiftool.")?;

    if !output.status.success() {
        anyhow::bail!(
            "exiftool -ver failed with exit code: {:?}",
            output.status.code()
        );
    }

    let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
    if version.is_empty() {
        Ok("unknown".to_string())
    } else {
        Ok(version)
    }
}

/// Metadata provider backed by the exiftool command-line tool.
#[derive(Debug, Clone)]
pub struct ExifTool {
    binary: PathBuf,
}

impl ExifTool {
    pub fn new(binary: impl AsRef<Path>) -> Self {
        Self {
            binary: binary.as_ref().to_path_buf(),
        }
    }

    /// Run exiftool in JSON mode over `paths` and key the records by the
    /// file argument they were produced for.
    fn query(&self, tags: &[&str], paths: &[PathBuf]) -> Result<HashMap<String, ExifRecord>> {
        let file_args: Vec<String> = paths.iter().map(|path| file_arg(path)).collect();

        let mut cmd = Command::new(&self.binary);
        cmd.args(["-json", "-quiet"]).args(tags).args(&file_args);

        log::debug!("Executing exiftool command: {:?}", cmd);

        let output = cmd.output().context("Failed to run exiftool")?;
        let stdout = String::from_utf8_lossy(&output.stdout);

        if stdout.trim().is_empty() {
            // exiftool exits non-zero when a file cannot be read, but still
            // prints records for the others
            if !output.status.success() {
                anyhow::bail!(
                    "exiftool failed with exit code {:?}: {}",
                    output.status.code(),
                    String::from_utf8_lossy(&output.stderr).trim()
                );
            }
            return Ok(HashMap::new());
        }

        let records = parse_records(&stdout)?;
        Ok(records
            .into_iter()
            .map(|record| (record.source_file.clone(), record))
            .collect())
    }
}

impl MetadataProvider for ExifTool {
    fn color_profile_description(&self, path: &Path) -> Result<String> {
        let paths = [path.to_path_buf()];
        let records = self.query(&["-ProfileDescription"], &paths)?;

        Ok(records
            .get(&file_arg(path))
            .and_then(|record| record.profile_description.as_ref())
            .and_then(value_text)
            .unwrap_or_default())
    }

    fn capture_timestamp(&self, path: &Path) -> Result<Option<f64>> {
        let paths = [path.to_path_buf()];
        Ok(self.capture_timestamps(&paths)?.pop().flatten())
    }

    fn capture_timestamps(&self, paths: &[PathBuf]) -> Result<Vec<Option<f64>>> {
        if paths.is_empty() {
            return Ok(Vec::new());
        }

        let records = self.query(
            &[
                "-dateFormat",
                "%s",
                "-DateTimeOriginal",
                "-SubSecTimeOriginal",
            ],
            paths,
        )?;

        Ok(paths
            .iter()
            .map(|path| {
                records
                    .get(&file_arg(path))
                    .and_then(ExifRecord::capture_timestamp)
            })
            .collect())
    }
}

/// One element of exiftool's `-json` output array.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct ExifRecord {
    source_file: String,
    #[serde(default)]
    profile_description: Option<Value>,
    #[serde(default)]
    date_time_original: Option<Value>,
    #[serde(default)]
    sub_sec_time_original: Option<Value>,
}

impl ExifRecord {
    /// Combine `DateTimeOriginal` (epoch seconds) with `SubSecTimeOriginal`
    /// (fraction digits, so "05" is 0.05 s).
    fn capture_timestamp(&self) -> Option<f64> {
        let seconds = self.date_time_original.as_ref().and_then(value_text)?;
        let subsec = self.sub_sec_time_original.as_ref().and_then(value_text);

        let text = match subsec {
            Some(digits) if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => {
                format!("{}.{}", seconds, digits)
            }
            _ => seconds,
        };

        match text.parse::<f64>() {
            Ok(time) if time.is_finite() => Some(time),
            _ => {
                log::debug!("Ignoring unparseable capture time {:?}", text);
                None
            }
        }
    }
}

fn parse_records(json: &str) -> Result<Vec<ExifRecord>> {
    serde_json::from_str(json).context("Failed to parse exiftool JSON output")
}

/// exiftool reads a leading `-` as an option, so such relative paths are
/// anchored to the current directory.
fn file_arg(path: &Path) -> String {
    let text = path.to_string_lossy();
    if text.starts_with('-') {
        format!("./{}", text)
    } else {
        text.into_owned()
    }
}

/// exiftool emits numeric-looking values as JSON numbers.
fn value_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
