use super::*;

#[test]
fn accepts_by_mime_prefix_or_extension() {
    assert!(is_audio_type("track.bin", Some("audio/x-custom")));
    assert!(is_audio_type("TRACK.FLAC", None));
    assert!(is_audio_type("song.Mp3", Some("application/octet-stream")));
    assert!(!is_audio_type("video.mp4", Some("video/mp4")));
    assert!(!is_audio_type("noext", None));
}

#[test]
fn unknown_type_is_silently_rejected_even_when_huge() {
    assert!(!validate_audio_input("doc.pdf", Some("application/pdf"), u64::MAX).unwrap());
}

#[test]
fn size_limit_is_inclusive() {
    assert!(validate_audio_input("a.wav", None, MAX_AUDIO_BYTES).unwrap());
    let err = validate_audio_input("a.wav", None, MAX_AUDIO_BYTES + 1).unwrap_err();
    assert!(matches!(
        err,
        BeatframeError::FileTooLarge {
            size: 104_857_601,
            max: 104_857_600
        }
    ));
}

#[test]
fn load_reads_accepted_files_and_infers_mime() {
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("beat.OGG");
    std::fs::write(&p, b"OggS").unwrap();

    let f = load_audio_file(&p, None).unwrap().unwrap();
    assert_eq!(f.file_name, "beat.OGG");
    assert_eq!(f.mime_type, "audio/ogg");
    assert_eq!(f.bytes, b"OggS");

    let txt = dir.path().join("notes.txt");
    std::fs::write(&txt, b"hi").unwrap();
    assert!(load_audio_file(&txt, None).unwrap().is_none());
}

#[test]
fn load_missing_file_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    assert!(load_audio_file(&dir.path().join("gone.mp3"), None).is_err());
}
