use std::path::PathBuf;

use crate::metadata::MetadataSource;

/// Playback rate used whenever capture times cannot pace the sequence.
pub const DEFAULT_FRAMERATE: u32 = 10;

/// Upper-exclusive bounds of the standard rates, checked in order.
/// Anything faster than the last bound plays at 60.
const RATE_MENU: [(f64, u32); 7] = [
    (7.0, 6),
    (9.0, 8),
    (11.0, 10),
    (13.5, 12),
    (17.5, 15),
    (25.0, 20),
    (45.0, 30),
];

/// Snap a raw capture rate to a standard playback rate.
///
/// Rates below 6 fps are rounded up to the next whole frame per second.
pub fn quantize_framerate(fps: f64) -> u32 {
    if fps < 6.0 {
        return fps.ceil().max(1.0) as u32;
    }

    RATE_MENU
        .iter()
        .find(|(bound, _)| fps < *bound)
        .map(|(_, rate)| *rate)
        .unwrap_or(60)
}

/// Estimates the playback framerate of an image sequence from the capture
/// times of its first and last frame.
#[derive(Debug, Clone, Copy)]
pub struct FramerateEstimator {
    default_rate: u32,
}

impl Default for FramerateEstimator {
    fn default() -> Self {
        Self {
            default_rate: DEFAULT_FRAMERATE,
        }
    }
}

impl FramerateEstimator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rate returned when timestamps are missing, unusable, or unavailable.
    pub fn default_rate(mut self, fps: u32) -> Self {
        self.default_rate = fps.max(1);
        self
    }

    pub fn fallback(&self) -> u32 {
        self.default_rate
    }

    pub fn estimate(&self, paths: &[PathBuf], metadata: &MetadataSource) -> u32 {
        let (Some(first), Some(last)) = (paths.first(), paths.last()) else {
            return self.default_rate;
        };
        if paths.len() < 2 {
            return self.default_rate;
        }
        let Some(provider) = metadata.provider() else {
            return self.default_rate;
        };

        let times = provider
            .capture_timestamp(first)
            .and_then(|t1| Ok((t1, provider.capture_timestamp(last)?)));

        let (time_first, time_last) = match times {
            Ok((Some(t1), Some(t2))) => (t1, t2),
            Ok(_) => {
                log::debug!("Capture time missing, using {} fps", self.default_rate);
                return self.default_rate;
            }
            Err(e) => {
                log::warn!("Could not read capture times: {:#}", e);
                return self.default_rate;
            }
        };

        if time_last <= time_first {
            log::debug!(
                "Capture times do not increase ({} -> {}), using {} fps",
                time_first,
                time_last,
                self.default_rate
            );
            return self.default_rate;
        }

        let interval = (time_last - time_first) / (paths.len() - 1) as f64;
        let raw = 1.0 / interval;
        if !raw.is_finite() {
            return self.default_rate;
        }

        let rate = quantize_framerate(raw);
        log::debug!("Estimated framerate: {:.3} fps, using {} fps", raw, rate);
        rate
    }
}

/// Estimate with the default fallback rate.
pub fn estimate_framerate(paths: &[PathBuf], metadata: &MetadataSource) -> u32 {
    FramerateEstimator::default().estimate(paths, metadata)
}
