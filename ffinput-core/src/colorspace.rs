use std::path::Path;

use crate::metadata::MetadataSource;

/// Color space of the source material, as far as the ICC profile tells.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorSpace {
    Srgb,
    P3,
    Unknown,
}

impl ColorSpace {
    /// Classify an ICC profile description. "sRGB" is checked before "P3",
    /// so a description containing both is treated as sRGB.
    pub fn from_profile_description(description: &str) -> Self {
        if description.contains("sRGB") {
            ColorSpace::Srgb
        } else if description.contains("P3") {
            ColorSpace::P3
        } else {
            ColorSpace::Unknown
        }
    }

    /// Flags declaring how the decoded pixels are to be interpreted.
    pub fn input_flags(self) -> Vec<String> {
        let primaries = match self {
            ColorSpace::Srgb => "bt709",
            ColorSpace::P3 => "smpte432",
            ColorSpace::Unknown => return Vec::new(),
        };

        [
            "-colorspace",
            "bt709",
            "-color_primaries",
            primaries,
            "-color_trc",
            "iec61966-2-1",
        ]
        .into_iter()
        .map(String::from)
        .collect()
    }

    /// Flags tagging the output target space.
    pub fn output_flags(self) -> Vec<String> {
        match self {
            ColorSpace::Srgb | ColorSpace::P3 => vec!["-colorspace".to_string(), "bt709".to_string()],
            ColorSpace::Unknown => Vec::new(),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ColorSpace::Srgb => "sRGB",
            ColorSpace::P3 => "P3",
            ColorSpace::Unknown => "unknown",
        }
    }
}

/// Guess the color space of `path` from its embedded profile.
///
/// Unavailable metadata or a failed query yields `Unknown`, which leaves the
/// material untagged.
pub fn guess_color_space(path: impl AsRef<Path>, metadata: &MetadataSource) -> ColorSpace {
    let path = path.as_ref();
    let Some(provider) = metadata.provider() else {
        return ColorSpace::Unknown;
    };

    let space = match provider.color_profile_description(path) {
        Ok(description) => {
            log::debug!("Profile description of {:?}: {:?}", path, description);
            ColorSpace::from_profile_description(&description)
        }
        Err(e) => {
            log::warn!("Could not read color profile of {:?}: {:#}", path, e);
            ColorSpace::Unknown
        }
    };

    log::debug!("Guessed color space: {}", space.as_str());
    space
}
