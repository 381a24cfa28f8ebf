use std::collections::BTreeSet;
use std::process::{Command, Stdio};

/// Output container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Container {
    /// ISO BMFF (`.mp4`)
    Mp4,
    /// Matroska WebM (`.webm`)
    Webm,
}

/// One container/codec combination an encoder may support.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EncoderProfile {
    /// Output container.
    pub container: Container,
    /// MIME type including codecs.
    pub mime_type: &'static str,
    /// File extension without dot.
    pub extension: &'static str,
    /// `ffmpeg` video encoder name.
    pub video_encoder: &'static str,
    /// `ffmpeg` audio encoder name.
    pub audio_encoder: &'static str,
    /// `ffmpeg` muxer name.
    pub muxer: &'static str,
}

/// Candidate profiles, highest quality first.
pub const PROBE_LIST: [EncoderProfile; 3] = [
    EncoderProfile {
        container: Container::Mp4,
        mime_type: "video/mp4;codecs=avc1,mp4a",
        extension: "mp4",
        video_encoder: "libx264",
        audio_encoder: "aac",
        muxer: "mp4",
    },
    EncoderProfile {
        container: Container::Webm,
        mime_type: "video/webm;codecs=vp9,opus",
        extension: "webm",
        video_encoder: "libvpx-vp9",
        audio_encoder: "libopus",
        muxer: "webm",
    },
    EncoderProfile {
        container: Container::Webm,
        mime_type: "video/webm;codecs=vp8,opus",
        extension: "webm",
        video_encoder: "libvpx",
        audio_encoder: "libopus",
        muxer: "webm",
    },
];

/// Answers whether a profile can be encoded here.
pub trait EncoderProbe {
    /// `true` when both codecs of `profile` are available.
    fn is_supported(&self, profile: &EncoderProfile) -> bool;
}

/// First supported profile of [`PROBE_LIST`].
pub fn select_profile(probe: &dyn EncoderProbe) -> Option<EncoderProfile> {
    PROBE_LIST.iter().copied().find(|p| probe.is_supported(p))
}

/// Probe backed by `ffmpeg -encoders`, queried once at construction.
#[derive(Debug, Clone, Default)]
pub struct FfmpegProbe {
    encoders: BTreeSet<String>,
}

impl FfmpegProbe {
    /// Query the `ffmpeg` on PATH. An unavailable binary yields an empty probe.
    pub fn detect() -> Self {
        let out = Command::new("ffmpeg")
            .args(["-hide_banner", "-encoders"])
            .stdin(Stdio::null())
            .stderr(Stdio::null())
            .output();
        match out {
            Ok(out) if out.status.success() => {
                Self::from_listing(&String::from_utf8_lossy(&out.stdout))
            }
            Ok(out) => {
                tracing::debug!(status = %out.status, "ffmpeg -encoders failed");
                Self::default()
            }
            Err(e) => {
                tracing::debug!(error = %e, "ffmpeg not available");
                Self::default()
            }
        }
    }

    /// Parse `ffmpeg -encoders` output.
    ///
    /// Encoder rows look like ` V....D libx264   description`; the header block above the
    /// ` ------` separator is skipped.
    pub fn from_listing(listing: &str) -> Self {
        let encoders = listing
            .lines()
            .skip_while(|l| !l.trim_start().starts_with("------"))
            .skip(1)
            .filter_map(|l| {
                let mut cols = l.split_whitespace();
                let flags = cols.next()?;
                let name = cols.next()?;
                (flags.len() == 6).then(|| name.to_owned())
            })
            .collect();
        Self { encoders }
    }

    /// Encoder names found.
    pub fn encoders(&self) -> impl Iterator<Item = &str> {
        self.encoders.iter().map(String::as_str)
    }
}

impl EncoderProbe for FfmpegProbe {
    fn is_supported(&self, profile: &EncoderProfile) -> bool {
        self.encoders.contains(profile.video_encoder) && self.encoders.contains(profile.audio_encoder)
    }
}

/// Fixed answer probe.
#[derive(Debug, Clone, Default)]
pub struct StaticProbe {
    supported: Vec<EncoderProfile>,
}

impl StaticProbe {
    /// Supports every profile.
    pub fn all() -> Self {
        Self {
            supported: PROBE_LIST.to_vec(),
        }
    }

    /// Supports nothing.
    pub fn none() -> Self {
        Self::default()
    }

    /// Supports exactly `profiles`.
    pub fn only(profiles: impl IntoIterator<Item = EncoderProfile>) -> Self {
        Self {
            supported: profiles.into_iter().collect(),
        }
    }
}

impl EncoderProbe for StaticProbe {
    fn is_supported(&self, profile: &EncoderProfile) -> bool {
        self.supported.contains(profile)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/capture/profile.rs"]
mod tests;
