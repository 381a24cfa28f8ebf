use crate::foundation::error::{BeatframeError, BeatframeResult};
use anyhow::Context;
use std::path::Path;

/// Largest accepted audio file (100 MiB).
pub const MAX_AUDIO_BYTES: u64 = 104_857_600;

/// File extensions accepted when the MIME type is missing or not `audio/*`.
pub const AUDIO_EXTENSIONS: [&str; 7] = ["mp3", "wav", "ogg", "m4a", "flac", "aac", "wma"];

/// An accepted audio file, ready to be decoded.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AudioFile {
    /// Original file name.
    pub file_name: String,
    /// MIME type, either as given or inferred from the extension.
    pub mime_type: String,
    /// Raw file contents.
    pub bytes: Vec<u8>,
}

/// Whether a file looks like audio by MIME prefix or extension.
pub fn is_audio_type(file_name: &str, mime_type: Option<&str>) -> bool {
    if mime_type.is_some_and(|m| m.trim().to_ascii_lowercase().starts_with("audio/")) {
        return true;
    }
    extension_of(file_name).is_some_and(|ext| AUDIO_EXTENSIONS.contains(&ext.as_str()))
}

/// Check type then size.
///
/// Returns `Ok(false)` for unrecognized types and `Err(FileTooLarge)` when the size limit is
/// exceeded.
pub fn validate_audio_input(file_name: &str, mime_type: Option<&str>, size: u64) -> BeatframeResult<bool> {
    if !is_audio_type(file_name, mime_type) {
        tracing::debug!(file_name, "rejecting non-audio input");
        return Ok(false);
    }
    if size > MAX_AUDIO_BYTES {
        return Err(BeatframeError::FileTooLarge {
            size,
            max: MAX_AUDIO_BYTES,
        });
    }
    Ok(true)
}

/// Validate and read an audio file from disk.
///
/// The size check uses file metadata, so oversized files are never read.
pub fn load_audio_file(path: &Path, mime_type: Option<&str>) -> BeatframeResult<Option<AudioFile>> {
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let meta = std::fs::metadata(path)
        .with_context(|| format!("stat audio file '{}'", path.display()))?;

    if !validate_audio_input(&file_name, mime_type, meta.len())? {
        return Ok(None);
    }

    let bytes =
        std::fs::read(path).with_context(|| format!("read audio file '{}'", path.display()))?;
    let mime_type = match mime_type {
        Some(m) if !m.trim().is_empty() => m.trim().to_owned(),
        _ => mime_for_extension(&file_name).to_owned(),
    };
    Ok(Some(AudioFile {
        file_name,
        mime_type,
        bytes,
    }))
}

fn extension_of(file_name: &str) -> Option<String> {
    let (_, ext) = file_name.rsplit_once('.')?;
    Some(ext.to_ascii_lowercase())
}

fn mime_for_extension(file_name: &str) -> &'static str {
    match extension_of(file_name).as_deref() {
        Some("mp3") => "audio/mpeg",
        Some("wav") => "audio/wav",
        Some("ogg") => "audio/ogg",
        Some("m4a") => "audio/mp4",
        Some("flac") => "audio/flac",
        Some("aac") => "audio/aac",
        Some("wma") => "audio/x-ms-wma",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
#[path = "../../tests/unit/audio/input.rs"]
mod tests;
