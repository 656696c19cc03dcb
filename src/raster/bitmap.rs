use crate::foundation::error::{RastelError, RastelResult};
use crate::foundation::math;
use crate::object::engine::Engine;
use crate::object::store::{ObjectKind, Payload, RawRef};
use crate::raster::palette::PaletteRef;

/// Typed reference to a bitmap object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct BitmapRef(pub(crate) RawRef);

impl BitmapRef {
    /// Untyped view of this reference, for generic object-model calls such as
    /// [`Engine::check`].
    pub fn raw(self) -> RawRef {
        self.0
    }
}

/// Link from a bitmap to its associated palette.
///
/// Owning links cascade when the bitmap is deleted; shared links leave the
/// palette's lifetime to the caller.
#[derive(Clone, Copy, Debug)]
pub(crate) struct PaletteLink {
    pub(crate) palette: PaletteRef,
    pub(crate) owned: bool,
}

/// Bitmap payload: header fields plus inline pixel storage.
///
/// `pitch` is the row stride in bytes, padded to a 4-byte boundary; storage is
/// exactly `pitch * height` bytes and its size never changes after creation
/// (resizing means creating a new object).
#[derive(Debug)]
pub(crate) struct BitmapData {
    pub(crate) width: u32,
    pub(crate) height: u32,
    pub(crate) bpp: u32,
    pub(crate) pitch: u32,
    pub(crate) palette: Option<PaletteLink>,
    pub(crate) pixels: Vec<u8>,
}

impl BitmapData {
    fn new(width: u32, height: u32, bpp: u32) -> RastelResult<Self> {
        let pitch64 = math::aligned_pitch(width, bpp);
        let pitch = u32::try_from(pitch64)
            .map_err(|_| RastelError::out_of_memory("bitmap pitch overflow"))?;
        let size = pitch64
            .checked_mul(u64::from(height))
            .and_then(|v| usize::try_from(v).ok())
            .ok_or_else(|| RastelError::out_of_memory("bitmap storage size overflow"))?;

        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(size)
            .map_err(|_| RastelError::out_of_memory("bitmap pixel storage"))?;
        pixels.resize(size, 0);

        Ok(Self {
            width,
            height,
            bpp,
            pitch,
            palette: None,
            pixels,
        })
    }

    /// Byte offset of pixel `(x, y)` within storage. Callers validate bounds.
    fn offset_of(&self, x: u32, y: u32) -> usize {
        y as usize * self.pitch as usize + (x as usize * self.bpp as usize) / 8
    }

    fn check_bounds(&self, x: u32, y: u32) -> RastelResult<()> {
        if x >= self.width || y >= self.height {
            return Err(RastelError::out_of_range(format!(
                "pixel ({x}, {y}) outside {}x{} bitmap",
                self.width, self.height
            )));
        }
        Ok(())
    }

    /// Shallow copy: duplicates pixel storage, keeps the palette link as
    /// shared. The clone never owns the source's palette.
    pub(crate) fn clone_shared(&self) -> RastelResult<Self> {
        let mut pixels = Vec::new();
        pixels
            .try_reserve_exact(self.pixels.len())
            .map_err(|_| RastelError::out_of_memory("bitmap clone storage"))?;
        pixels.extend_from_slice(&self.pixels);

        Ok(Self {
            width: self.width,
            height: self.height,
            bpp: self.bpp,
            pitch: self.pitch,
            palette: self.palette.map(|link| PaletteLink {
                palette: link.palette,
                owned: false,
            }),
            pixels,
        })
    }
}

impl Engine {
    /// Creates a `width` x `height` memory bitmap with `bpp` bits per pixel.
    ///
    /// Storage is zero-initialized; rows are padded so `pitch % 4 == 0`.
    pub fn create_bitmap(&mut self, width: u32, height: u32, bpp: u32) -> RastelResult<BitmapRef> {
        let result = BitmapData::new(width, height, bpp)
            .and_then(|data| self.objects.create(Payload::Bitmap(data)))
            .map(BitmapRef);
        if let Ok(bmp) = &result {
            tracing::debug!(?bmp, width, height, bpp, "created bitmap");
        }
        self.track(result)
    }

    /// Creates a copy of `src` with identical header fields and pixel bytes
    /// but its own storage. An associated palette is referenced as shared,
    /// never owned, by the copy.
    pub fn clone_bitmap(&mut self, src: BitmapRef) -> RastelResult<BitmapRef> {
        let result = self
            .objects
            .clone_of(src.0, ObjectKind::Bitmap)
            .map(BitmapRef);
        self.track(result)
    }

    /// Deletes `bmp` and frees its resources. If the bitmap owns its palette
    /// (see [`Engine::adopt_bitmap_palette`]), the palette is deleted first.
    pub fn delete_bitmap(&mut self, bmp: BitmapRef) -> RastelResult<()> {
        let result = self.objects.delete(bmp.0, ObjectKind::Bitmap);
        self.track(result)
    }

    /// Read view over pixel storage starting at `(x, y)`.
    ///
    /// See [`Engine::bitmap_pixels_mut`] for the exact contract.
    pub fn bitmap_pixels(&self, bmp: BitmapRef, x: u32, y: u32) -> RastelResult<&[u8]> {
        let result = self.objects.bitmap(bmp.0).and_then(|data| {
            data.check_bounds(x, y)?;
            Ok(&data.pixels[data.offset_of(x, y)..])
        });
        self.track(result)
    }

    /// Direct access to pixel storage for manual manipulation.
    ///
    /// The returned slice starts at byte `y * pitch + x * bpp / 8` and runs to
    /// the end of storage, spanning row padding and all following rows. Only
    /// the upper bounds (`x < width`, `y < height`) are validated here; the
    /// engine performs no further checking on accesses through the slice, so
    /// callers indexing past the row they asked for get exactly the adjacent
    /// storage bytes a raw pointer would.
    pub fn bitmap_pixels_mut(
        &mut self,
        bmp: BitmapRef,
        x: u32,
        y: u32,
    ) -> RastelResult<&mut [u8]> {
        let offset = {
            let probe = self.objects.bitmap(bmp.0).and_then(|data| {
                data.check_bounds(x, y)?;
                Ok(data.offset_of(x, y))
            });
            self.track(probe)?
        };
        let data = self.objects.bitmap_mut(bmp.0)?;
        Ok(&mut data.pixels[offset..])
    }

    /// The palette currently associated with `bmp`, if any.
    pub fn bitmap_palette(&self, bmp: BitmapRef) -> RastelResult<Option<PaletteRef>> {
        let result = self
            .objects
            .bitmap(bmp.0)
            .map(|data| data.palette.map(|link| link.palette));
        self.track(result)
    }

    /// Associates `pal` with `bmp` as a shared reference.
    ///
    /// The palette's lifetime stays caller-managed; deleting the bitmap leaves
    /// it untouched. A previously owned palette is deleted on replacement so
    /// it cannot leak in the object table.
    pub fn set_bitmap_palette(&mut self, bmp: BitmapRef, pal: PaletteRef) -> RastelResult<()> {
        let result = self.link_palette(bmp, pal, false);
        self.track(result)
    }

    /// Associates `pal` with `bmp` and transfers ownership: deleting the
    /// bitmap cascades into the palette from now on.
    pub fn adopt_bitmap_palette(&mut self, bmp: BitmapRef, pal: PaletteRef) -> RastelResult<()> {
        let result = self.link_palette(bmp, pal, true);
        self.track(result)
    }

    fn link_palette(&mut self, bmp: BitmapRef, pal: PaletteRef, owned: bool) -> RastelResult<()> {
        if !self.objects.check(bmp.0, ObjectKind::Bitmap) {
            return Err(RastelError::WrongReference(ObjectKind::Bitmap));
        }
        if !self.objects.check(pal.0, ObjectKind::Palette) {
            return Err(RastelError::WrongReference(ObjectKind::Palette));
        }

        let old = self.objects.bitmap(bmp.0)?.palette;
        if let Some(link) = old.filter(|l| l.owned && l.palette != pal)
            && self.objects.check(link.palette.0, ObjectKind::Palette)
        {
            self.objects.delete(link.palette.0, ObjectKind::Palette)?;
        }

        self.objects.bitmap_mut(bmp.0)?.palette = Some(PaletteLink {
            palette: pal,
            owned,
        });
        Ok(())
    }

    /// Width in pixels.
    pub fn bitmap_width(&self, bmp: BitmapRef) -> RastelResult<u32> {
        let result = self.objects.bitmap(bmp.0).map(|data| data.width);
        self.track(result)
    }

    /// Height in pixels.
    pub fn bitmap_height(&self, bmp: BitmapRef) -> RastelResult<u32> {
        let result = self.objects.bitmap(bmp.0).map(|data| data.height);
        self.track(result)
    }

    /// Bits per pixel.
    pub fn bitmap_depth(&self, bmp: BitmapRef) -> RastelResult<u32> {
        let result = self.objects.bitmap(bmp.0).map(|data| data.bpp);
        self.track(result)
    }

    /// Bytes per scanline, including alignment padding.
    pub fn bitmap_pitch(&self, bmp: BitmapRef) -> RastelResult<u32> {
        let result = self.objects.bitmap(bmp.0).map(|data| data.pitch);
        self.track(result)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/bitmap.rs"]
mod tests;
