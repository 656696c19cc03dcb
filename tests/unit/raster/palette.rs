use super::*;
use crate::foundation::error::ErrorCode;

#[test]
fn new_palette_is_black() {
    let mut engine = Engine::new();
    let pal = engine.create_palette(8).unwrap();
    assert_eq!(engine.palette_len(pal).unwrap(), 8);
    for i in 0..8 {
        assert_eq!(engine.palette_color(pal, i).unwrap(), Rgb8::default());
    }
}

#[test]
fn color_round_trip() {
    let mut engine = Engine::new();
    let pal = engine.create_palette(4).unwrap();
    let color = Rgb8 { r: 1, g: 2, b: 3 };
    engine.set_palette_color(pal, 3, color).unwrap();
    assert_eq!(engine.palette_color(pal, 3).unwrap(), color);
}

#[test]
fn index_is_bounds_checked() {
    let mut engine = Engine::new();
    let pal = engine.create_palette(4).unwrap();

    let err = engine.palette_color(pal, 4).unwrap_err();
    assert!(matches!(err, RastelError::OutOfRange(_)));
    assert_eq!(engine.last_error(), ErrorCode::OutOfRange);

    assert!(
        engine
            .set_palette_color(pal, 100, Rgb8::default())
            .is_err()
    );
}

#[test]
fn bitmap_reference_is_rejected() {
    let mut engine = Engine::new();
    let bmp = engine.create_bitmap(2, 2, 8).unwrap();
    // Smuggle a bitmap reference into a palette-typed call.
    let bogus = PaletteRef(bmp.raw());
    let err = engine.palette_len(bogus).unwrap_err();
    assert!(matches!(
        err,
        RastelError::WrongReference(ObjectKind::Palette)
    ));
}

#[test]
fn empty_palette_is_allowed() {
    let mut engine = Engine::new();
    let pal = engine.create_palette(0).unwrap();
    assert_eq!(engine.palette_len(pal).unwrap(), 0);
    assert!(engine.palette_color(pal, 0).is_err());
}
