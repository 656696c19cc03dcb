use super::*;
use crate::foundation::error::ErrorCode;

#[test]
fn create_computes_aligned_pitch_and_storage() {
    let mut engine = Engine::new();
    let bmp = engine.create_bitmap(10, 10, 8).unwrap();

    assert_eq!(engine.bitmap_width(bmp).unwrap(), 10);
    assert_eq!(engine.bitmap_height(bmp).unwrap(), 10);
    assert_eq!(engine.bitmap_depth(bmp).unwrap(), 8);
    assert_eq!(engine.bitmap_pitch(bmp).unwrap(), 12);

    // Full storage = pitch * height, zero-initialized.
    let all = engine.bitmap_pixels(bmp, 0, 0).unwrap();
    assert_eq!(all.len(), 120);
    assert!(all.iter().all(|&b| b == 0));
}

#[test]
fn pitch_stays_aligned_across_depths() {
    let mut engine = Engine::new();
    for bpp in [8u32, 16, 24, 32] {
        let bmp = engine.create_bitmap(13, 3, bpp).unwrap();
        let pitch = engine.bitmap_pitch(bmp).unwrap();
        assert_eq!(pitch % 4, 0);
        assert!(u64::from(pitch) >= (u64::from(13u32) * u64::from(bpp)).div_ceil(8));
    }
}

#[test]
fn oversized_bitmap_reports_out_of_memory() {
    let mut engine = Engine::new();
    let err = engine.create_bitmap(u32::MAX, u32::MAX, 32).unwrap_err();
    assert!(matches!(err, RastelError::OutOfMemory(_)));
    assert_eq!(engine.last_error(), ErrorCode::OutOfMemory);
}

#[test]
fn pixel_view_rejects_upper_bounds() {
    let mut engine = Engine::new();
    let bmp = engine.create_bitmap(10, 10, 8).unwrap();

    assert!(engine.bitmap_pixels(bmp, 10, 0).is_err());
    assert_eq!(engine.last_error(), ErrorCode::OutOfRange);
    assert!(engine.bitmap_pixels(bmp, 0, 10).is_err());
    assert!(engine.bitmap_pixels_mut(bmp, 9, 9).is_ok());
    assert_eq!(engine.last_error(), ErrorCode::Ok);
}

#[test]
fn pixel_view_starts_at_requested_offset() {
    let mut engine = Engine::new();
    let bmp = engine.create_bitmap(4, 4, 32).unwrap();

    let row = engine.bitmap_pixels_mut(bmp, 2, 1).unwrap();
    row[0] = 0xAB;

    // pitch = 16; (2, 1) starts at byte 1 * 16 + 2 * 4 = 24.
    let all = engine.bitmap_pixels(bmp, 0, 0).unwrap();
    assert_eq!(all[24], 0xAB);

    // The raw view runs to the end of storage, not the end of the row.
    let tail = engine.bitmap_pixels(bmp, 2, 1).unwrap();
    assert_eq!(tail.len(), 16 * 4 - 24);
}

#[test]
fn clone_duplicates_pixels_into_distinct_storage() {
    let mut engine = Engine::new();
    let src = engine.create_bitmap(6, 2, 8).unwrap();
    engine.bitmap_pixels_mut(src, 0, 0).unwrap()[0] = 42;

    let copy = engine.clone_bitmap(src).unwrap();
    assert_eq!(engine.bitmap_width(copy).unwrap(), 6);
    assert_eq!(engine.bitmap_pitch(copy).unwrap(), 8);
    assert_eq!(engine.bitmap_pixels(copy, 0, 0).unwrap()[0], 42);

    // Mutating the clone must not mutate the source.
    engine.bitmap_pixels_mut(copy, 0, 0).unwrap()[0] = 7;
    assert_eq!(engine.bitmap_pixels(src, 0, 0).unwrap()[0], 42);
}

#[test]
fn clone_shares_the_palette_without_owning_it() {
    let mut engine = Engine::new();
    let src = engine.create_bitmap(4, 4, 8).unwrap();
    let pal = engine.create_palette(16).unwrap();
    engine.adopt_bitmap_palette(src, pal).unwrap();

    let copy = engine.clone_bitmap(src).unwrap();
    assert_eq!(engine.bitmap_palette(copy).unwrap(), Some(pal));

    // Deleting the clone must not cascade into the shared palette.
    engine.delete_bitmap(copy).unwrap();
    assert!(engine.palette_len(pal).is_ok());

    // Deleting the owner does.
    engine.delete_bitmap(src).unwrap();
    assert!(engine.palette_len(pal).is_err());
}

#[test]
fn shared_palette_survives_bitmap_deletion() {
    let mut engine = Engine::new();
    let bmp = engine.create_bitmap(4, 4, 8).unwrap();
    let pal = engine.create_palette(16).unwrap();
    engine.set_bitmap_palette(bmp, pal).unwrap();
    assert_eq!(engine.bitmap_palette(bmp).unwrap(), Some(pal));

    engine.delete_bitmap(bmp).unwrap();
    assert_eq!(engine.palette_len(pal).unwrap(), 16);
    assert_eq!(engine.last_error(), ErrorCode::Ok);
}

#[test]
fn owned_palette_is_deleted_with_its_bitmap() {
    let mut engine = Engine::new();
    let bmp = engine.create_bitmap(4, 4, 8).unwrap();
    let pal = engine.create_palette(16).unwrap();
    engine.adopt_bitmap_palette(bmp, pal).unwrap();

    engine.delete_bitmap(bmp).unwrap();
    assert!(engine.palette_len(pal).is_err());
    assert_eq!(engine.last_error(), ErrorCode::WrongPaletteRef);
}

#[test]
fn replacing_an_owned_palette_releases_it() {
    let mut engine = Engine::new();
    let bmp = engine.create_bitmap(4, 4, 8).unwrap();
    let owned = engine.create_palette(16).unwrap();
    let shared = engine.create_palette(4).unwrap();
    engine.adopt_bitmap_palette(bmp, owned).unwrap();

    engine.set_bitmap_palette(bmp, shared).unwrap();
    assert!(engine.palette_len(owned).is_err());
    assert_eq!(engine.bitmap_palette(bmp).unwrap(), Some(shared));

    // The replacement link is shared, so bitmap deletion leaves it alive.
    engine.delete_bitmap(bmp).unwrap();
    assert_eq!(engine.palette_len(shared).unwrap(), 4);
}

#[test]
fn palette_argument_is_kind_checked() {
    let mut engine = Engine::new();
    let bmp = engine.create_bitmap(4, 4, 8).unwrap();
    let pal = engine.create_palette(4).unwrap();
    engine.delete_palette(pal).unwrap();

    let err = engine.set_bitmap_palette(bmp, pal).unwrap_err();
    assert!(matches!(
        err,
        RastelError::WrongReference(ObjectKind::Palette)
    ));
    assert_eq!(engine.last_error(), ErrorCode::WrongPaletteRef);
    assert_eq!(engine.bitmap_palette(bmp).unwrap(), None);
}

#[test]
fn accessors_report_wrong_reference_on_stale_handles() {
    let mut engine = Engine::new();
    let bmp = engine.create_bitmap(4, 4, 8).unwrap();
    engine.delete_bitmap(bmp).unwrap();

    assert!(engine.bitmap_width(bmp).is_err());
    assert!(engine.bitmap_height(bmp).is_err());
    assert!(engine.bitmap_depth(bmp).is_err());
    assert!(engine.bitmap_pitch(bmp).is_err());
    assert_eq!(engine.last_error(), ErrorCode::WrongBitmapRef);
}
