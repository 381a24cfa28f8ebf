use crate::foundation::core::{Canvas, Fps};
use serde::{Deserialize, Serialize};

/// Export resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum)]
pub enum ExportResolution {
    /// 1280x720
    #[serde(rename = "720p")]
    #[value(name = "720p")]
    P720,
    /// 1920x1080
    #[default]
    #[serde(rename = "1080p")]
    #[value(name = "1080p")]
    P1080,
    /// 2560x1440
    #[serde(rename = "2k")]
    #[value(name = "2k")]
    K2,
    /// 3840x2160
    #[serde(rename = "4k")]
    #[value(name = "4k")]
    K4,
}

impl ExportResolution {
    /// Pixel size.
    pub fn canvas(self) -> Canvas {
        let (width, height) = match self {
            Self::P720 => (1280, 720),
            Self::P1080 => (1920, 1080),
            Self::K2 => (2560, 1440),
            Self::K4 => (3840, 2160),
        };
        Canvas { width, height }
    }

    /// Bitrate multiplier relative to the quality's base rate.
    pub fn bitrate_factor(self) -> f64 {
        match self {
            Self::K4 => 2.0,
            Self::K2 => 1.5,
            Self::P720 | Self::P1080 => 1.0,
        }
    }
}

/// Export frame rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum)]
pub enum ExportFrameRate {
    /// 30 fps
    #[serde(rename = "30")]
    #[value(name = "30")]
    Fps30,
    /// 60 fps
    #[default]
    #[serde(rename = "60")]
    #[value(name = "60")]
    Fps60,
}

impl ExportFrameRate {
    /// Frames per second as an integer.
    pub fn as_u32(self) -> u32 {
        match self {
            Self::Fps30 => 30,
            Self::Fps60 => 60,
        }
    }

    /// Frames per second as a rational.
    pub fn fps(self) -> Fps {
        Fps {
            num: self.as_u32(),
            den: 1,
        }
    }
}

/// Export quality preset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportQuality {
    /// 2.5 Mbps base
    Low,
    /// 5 Mbps base
    Medium,
    /// 8 Mbps base
    #[default]
    High,
}

impl ExportQuality {
    /// Base video bitrate in bits per second.
    pub fn base_bitrate(self) -> u64 {
        match self {
            Self::Low => 2_500_000,
            Self::Medium => 5_000_000,
            Self::High => 8_000_000,
        }
    }
}

/// Everything chosen for one export.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportSettings {
    /// Output size.
    pub resolution: ExportResolution,
    /// Output frame rate.
    pub frame_rate: ExportFrameRate,
    /// Output quality.
    pub quality: ExportQuality,
}

impl ExportSettings {
    /// Video bitrate in bits per second, scaled for 2K/4K.
    pub fn video_bitrate(&self) -> u64 {
        (self.quality.base_bitrate() as f64 * self.resolution.bitrate_factor()).round() as u64
    }

    /// `<slug>-<height>p<fps>-<unix secs>.<ext>`
    pub fn file_name(&self, preset_name: &str, extension: &str, unix_secs: u64) -> String {
        format!(
            "{}-{}p{}-{}.{}",
            slugify(preset_name),
            self.resolution.canvas().height,
            self.frame_rate.as_u32(),
            unix_secs,
            extension
        )
    }
}

/// Lowercase ASCII alphanumerics joined by single dashes; `visualizer` when nothing is left.
pub fn slugify(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    for ch in name.chars() {
        if ch.is_ascii_alphanumeric() {
            out.push(ch.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('-') {
            out.push('-');
        }
    }
    while out.ends_with('-') {
        out.pop();
    }
    if out.is_empty() {
        "visualizer".to_owned()
    } else {
        out
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/settings.rs"]
mod tests;
