use super::*;

fn system_font() -> Option<Vec<u8>> {
    [
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
        "/usr/share/fonts/dejavu/DejaVuSans.ttf",
        "/System/Library/Fonts/Supplemental/Arial.ttf",
    ]
    .iter()
    .find_map(|p| std::fs::read(p).ok())
}

#[test]
fn empty_book_lays_out_nothing() {
    let mut book = FontBook::new();
    assert!(book.is_empty());
    assert!(
        book.layout_line("hello", "sans-serif", 32.0, 0.0, TextBrush::default())
            .is_none()
    );
}

#[test]
fn garbage_font_bytes_are_rejected() {
    let mut book = FontBook::new();
    assert!(book.register(b"definitely not a font".to_vec()).is_err());
    assert!(book.is_empty());
}

#[test]
fn registered_font_is_used_as_fallback_and_spacing_widens() {
    let Some(bytes) = system_font() else {
        eprintln!("skipping: no system font found");
        return;
    };
    let mut book = FontBook::new();
    let family = book.register(bytes).unwrap();
    assert_eq!(book.families(), vec![family.as_str()]);

    let brush = TextBrush {
        r: 255,
        g: 255,
        b: 255,
        a: 255,
    };
    let tight = book.layout_line("BEAT", "no-such-family", 40.0, 0.0, brush).unwrap();
    let loose = book.layout_line("BEAT", &family, 40.0, 10.0, brush).unwrap();
    assert!(tight.width() > 0.0);
    assert!(loose.width() > tight.width());
    assert!(book.layout_line("   ", &family, 40.0, 0.0, brush).is_none());
}
