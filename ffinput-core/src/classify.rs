use std::path::Path;

/// Extensions treated as ready-to-ingest video containers.
pub const VIDEO_EXTENSIONS: [&str; 5] = ["mp4", "m4v", "mov", "avi", "webm"];

/// Whether `path` names a video file rather than a still image.
///
/// Only the extension is inspected, case-insensitively; the file is never opened.
pub fn is_video(path: impl AsRef<Path>) -> bool {
    path.as_ref()
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            VIDEO_EXTENSIONS
                .iter()
                .any(|video| ext.eq_ignore_ascii_case(video))
        })
}
