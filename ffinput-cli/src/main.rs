use anyhow::{Context, Result};
use clap::Parser;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use ffinput_core::{
    ConcatSequence, DEFAULT_EXIFTOOL, DEFAULT_FRAMERATE, DEFAULT_MIN_FRAME_DURATION, InputFlags,
    MetadataSource, SequenceStrategyKind,
};

#[derive(Parser, Debug)]
#[command(name = "ffinput")]
#[command(
    about = "Print FFmpeg input flags for a video file or a burst of still images, one per line"
)]
#[command(version)]
struct Args {
    /// Video file, single image, or the ordered frames of an image sequence
    files: Vec<PathBuf>,

    /// How image sequences are fed to FFmpeg (see --list-strategies)
    #[arg(short, long, value_name = "STRATEGY", default_value = "framerate")]
    strategy: String,

    /// Where to write the concat manifest (default: a new temporary file)
    #[arg(short, long)]
    manifest: Option<PathBuf>,

    /// Shortest per-frame duration in seconds for the concat strategy
    #[arg(long, value_parser = parse_seconds)]
    min_frame_duration: Option<f64>,

    /// Playback rate used when capture times are unusable
    #[arg(long, default_value_t = DEFAULT_FRAMERATE, value_parser = clap::value_parser!(u32).range(1..))]
    default_framerate: u32,

    /// Do not read metadata, as if exiftool were not installed
    #[arg(long)]
    no_metadata: bool,

    /// exiftool executable to use
    #[arg(long, default_value = DEFAULT_EXIFTOOL)]
    exiftool: PathBuf,

    /// List available sequence strategies
    #[arg(long)]
    list_strategies: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn parse_seconds(value: &str) -> Result<f64, String> {
    let seconds: f64 = value
        .parse()
        .map_err(|_| format!("`{}` is not a number", value))?;
    if seconds.is_finite() && seconds > 0.0 {
        Ok(seconds)
    } else {
        Err(format!("`{}` must be a positive number of seconds", value))
    }
}

fn resolve_strategy(name: &str) -> Result<SequenceStrategyKind> {
    match SequenceStrategyKind::from_name(name) {
        Some(kind) => Ok(kind),
        None => anyhow::bail!(
            "Unknown strategy: {}. Use --list-strategies to see available options.",
            name
        ),
    }
}

/// Scratch file for the concat manifest. Removed unless `keep` is called,
/// so failed runs leave nothing behind. A file the user pointed at that
/// already existed is never removed.
struct ScratchManifest {
    path: PathBuf,
    temp: Option<NamedTempFile>,
    preexisting: bool,
    kept: bool,
}

impl ScratchManifest {
    fn create(explicit: Option<PathBuf>) -> Result<Self> {
        match explicit {
            Some(path) => Ok(Self {
                preexisting: path.exists(),
                path,
                temp: None,
                kept: false,
            }),
            None => {
                let temp = tempfile::Builder::new()
                    .prefix("ffinput.")
                    .suffix(".concat")
                    .tempfile()
                    .context("Failed to create concat manifest file")?;
                Ok(Self {
                    path: temp.path().to_path_buf(),
                    temp: Some(temp),
                    preexisting: false,
                    kept: false,
                })
            }
        }
    }

    fn path(&self) -> &Path {
        &self.path
    }

    fn keep(mut self) -> Result<PathBuf> {
        if let Some(temp) = self.temp.take() {
            temp.keep().context("Failed to keep concat manifest file")?;
        }
        self.kept = true;
        Ok(self.path.clone())
    }
}

impl Drop for ScratchManifest {
    fn drop(&mut self) {
        // a NamedTempFile removes itself when dropped
        if !self.kept
            && self.temp.is_none()
            && !self.preexisting
            && self.path.exists()
            && let Err(e) = fs::remove_file(&self.path)
        {
            log::warn!("Failed to remove {:?}: {}", self.path, e);
        }
    }
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging; stdout is reserved for the flags
    if args.verbose {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("debug")).init();
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    // List strategies if requested
    if args.list_strategies {
        println!("\nAvailable strategies:");
        println!("{:-<50}", "");
        for (name, description) in SequenceStrategyKind::list_all() {
            println!("{:<15} - {}", name, description);
        }
        println!("\nUsage: ffinput --strategy concat IMG_0001.JPG IMG_0002.JPG ...");
        return Ok(());
    }

    let strategy = resolve_strategy(&args.strategy)?;
    log::debug!("Using {} strategy", strategy.as_str());

    let metadata = if args.no_metadata {
        MetadataSource::Unavailable
    } else {
        MetadataSource::detect(&args.exiftool)
    };

    log::debug!("Input files: {:?}", args.files);

    let mut flags = InputFlags::new(&args.files).default_framerate(args.default_framerate);
    let mut scratch = None;

    // The framerate strategy is the builder's default
    if strategy == SequenceStrategyKind::Concat {
        let manifest = ScratchManifest::create(args.manifest.clone())?;
        let concat = ConcatSequence::new(manifest.path())
            .min_duration(args.min_frame_duration.unwrap_or(DEFAULT_MIN_FRAME_DURATION))
            .default_rate(args.default_framerate);
        flags = flags.strategy(concat);
        scratch = Some(manifest);
    }

    let tokens = flags.build(&metadata)?;

    // The encoder reads the manifest later, so it outlives this process
    // whenever the flags point at it.
    if let Some(manifest) = scratch {
        let token = manifest.path().to_string_lossy().into_owned();
        if tokens.contains(&token) {
            let path = manifest.keep()?;
            log::info!("Concat manifest kept at {:?}", path);
        }
    }

    let mut out = std::io::stdout().lock();
    for token in &tokens {
        writeln!(out, "{}", token).context("Failed to write flags")?;
    }
    out.flush().context("Failed to write flags")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_seconds() {
        assert_eq!(parse_seconds("0.05"), Ok(0.05));
        assert!(parse_seconds("0").is_err());
        assert!(parse_seconds("-1").is_err());
        assert!(parse_seconds("fast").is_err());
    }

    #[test]
    fn test_args_defaults() {
        let args = Args::try_parse_from(["ffinput", "a1.jpg", "a2.jpg"]).unwrap();
        assert_eq!(args.files.len(), 2);
        assert_eq!(
            resolve_strategy(&args.strategy).unwrap(),
            SequenceStrategyKind::Framerate
        );
        assert_eq!(args.default_framerate, DEFAULT_FRAMERATE);
        assert!(args.min_frame_duration.is_none());
    }

    #[test]
    fn test_strategy_aliases() {
        for (alias, expected) in [
            ("fps", SequenceStrategyKind::Framerate),
            ("image2", SequenceStrategyKind::Framerate),
            ("manifest", SequenceStrategyKind::Concat),
            ("durations", SequenceStrategyKind::Concat),
            ("Concat", SequenceStrategyKind::Concat),
        ] {
            let args =
                Args::try_parse_from(["ffinput", "--strategy", alias, "a1.jpg", "a2.jpg"]).unwrap();
            assert_eq!(resolve_strategy(&args.strategy).unwrap(), expected);
        }
    }

    #[test]
    fn test_unknown_strategy() {
        let err = resolve_strategy("gif").unwrap_err();
        assert!(err.to_string().contains("--list-strategies"));
    }

    #[test]
    fn test_args_reject_zero_framerate() {
        assert!(Args::try_parse_from(["ffinput", "--default-framerate", "0", "a.jpg"]).is_err());
    }

    #[test]
    fn test_unkept_temp_manifest_is_removed() {
        let manifest = ScratchManifest::create(None).unwrap();
        let path = manifest.path().to_path_buf();
        assert!(path.exists());

        drop(manifest);
        assert!(!path.exists());
    }

    #[test]
    fn test_kept_temp_manifest_survives() {
        let manifest = ScratchManifest::create(None).unwrap();
        let path = manifest.keep().unwrap();
        assert!(path.exists());
        fs::remove_file(path).unwrap();
    }

    #[test]
    fn test_explicit_manifest_cleanup() {
        let dir = tempfile::tempdir().unwrap();

        let fresh = dir.path().join("fresh.concat");
        let manifest = ScratchManifest::create(Some(fresh.clone())).unwrap();
        fs::write(manifest.path(), "file 'a.jpg'\n").unwrap();
        drop(manifest);
        assert!(!fresh.exists());

        let existing = dir.path().join("existing.concat");
        fs::write(&existing, "keep me").unwrap();
        drop(ScratchManifest::create(Some(existing.clone())).unwrap());
        assert!(existing.exists());
    }
}
