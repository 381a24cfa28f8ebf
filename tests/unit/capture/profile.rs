use super::*;

const LISTING: &str = "Encoders:
 V..... = Video
 A..... = Audio
 ------
 V....D libvpx               libvpx VP8 (codec vp8)
 V....D libvpx-vp9           libvpx VP9 (codec vp9)
 A....D libopus              libopus Opus (codec opus)
 A....D aac                  AAC (Advanced Audio Coding)
";

#[test]
fn listing_parse_skips_header() {
    let p = FfmpegProbe::from_listing(LISTING);
    let names: Vec<_> = p.encoders().collect();
    assert_eq!(names, vec!["aac", "libopus", "libvpx", "libvpx-vp9"]);
}

#[test]
fn selection_prefers_higher_quality() {
    let p = FfmpegProbe::from_listing(LISTING);
    let chosen = select_profile(&p).unwrap();
    assert_eq!(chosen.video_encoder, "libvpx-vp9");
    assert_eq!(chosen.extension, "webm");

    assert_eq!(select_profile(&StaticProbe::all()), Some(PROBE_LIST[0]));
    assert_eq!(
        select_profile(&StaticProbe::only([PROBE_LIST[2]])),
        Some(PROBE_LIST[2])
    );
}

#[test]
fn nothing_supported_selects_nothing() {
    assert_eq!(select_profile(&StaticProbe::none()), None);
    assert_eq!(select_profile(&FfmpegProbe::default()), None);
}
