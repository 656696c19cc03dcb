use crate::foundation::error::{RastelError, RastelResult};
use crate::object::engine::Engine;
use crate::object::store::{ObjectKind, Payload, RawRef};

/// Straight (non-premultiplied) RGB8 palette color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgb8 {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
}

/// Typed reference to a palette object.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct PaletteRef(pub(crate) RawRef);

impl PaletteRef {
    /// Untyped view of this reference, for generic object-model calls such as
    /// [`Engine::check`].
    pub fn raw(self) -> RawRef {
        self.0
    }
}

/// Palette payload: a fixed-size color table.
pub(crate) struct PaletteData {
    pub(crate) colors: Vec<Rgb8>,
}

impl PaletteData {
    fn new(entries: usize) -> RastelResult<Self> {
        let mut colors = Vec::new();
        colors
            .try_reserve_exact(entries)
            .map_err(|_| RastelError::out_of_memory("palette color storage"))?;
        colors.resize(entries, Rgb8::default());
        Ok(Self { colors })
    }

    pub(crate) fn clone_data(&self) -> RastelResult<Self> {
        let mut colors = Vec::new();
        colors
            .try_reserve_exact(self.colors.len())
            .map_err(|_| RastelError::out_of_memory("palette clone storage"))?;
        colors.extend_from_slice(&self.colors);
        Ok(Self { colors })
    }

    fn check_index(&self, index: usize) -> RastelResult<()> {
        if index >= self.colors.len() {
            return Err(RastelError::out_of_range(format!(
                "palette index {index} outside {} entries",
                self.colors.len()
            )));
        }
        Ok(())
    }
}

impl Engine {
    /// Creates a palette with `entries` colors, initialized to black.
    pub fn create_palette(&mut self, entries: usize) -> RastelResult<PaletteRef> {
        let result = PaletteData::new(entries)
            .and_then(|data| self.objects.create(Payload::Palette(data)))
            .map(PaletteRef);
        self.track(result)
    }

    /// Creates a copy of `src` with its own color storage.
    pub fn clone_palette(&mut self, src: PaletteRef) -> RastelResult<PaletteRef> {
        let result = self
            .objects
            .clone_of(src.0, ObjectKind::Palette)
            .map(PaletteRef);
        self.track(result)
    }

    /// Deletes `pal`. Bitmaps still holding a shared reference to it will
    /// fail their next palette access with a wrong-reference error.
    pub fn delete_palette(&mut self, pal: PaletteRef) -> RastelResult<()> {
        let result = self.objects.delete(pal.0, ObjectKind::Palette);
        self.track(result)
    }

    /// Number of color entries in `pal`.
    pub fn palette_len(&self, pal: PaletteRef) -> RastelResult<usize> {
        let result = self.objects.palette(pal.0).map(|data| data.colors.len());
        self.track(result)
    }

    /// Color at `index`.
    pub fn palette_color(&self, pal: PaletteRef, index: usize) -> RastelResult<Rgb8> {
        let result = self.objects.palette(pal.0).and_then(|data| {
            data.check_index(index)?;
            Ok(data.colors[index])
        });
        self.track(result)
    }

    /// Replaces the color at `index`.
    pub fn set_palette_color(
        &mut self,
        pal: PaletteRef,
        index: usize,
        color: Rgb8,
    ) -> RastelResult<()> {
        let result = self.objects.palette_mut(pal.0).and_then(|data| {
            data.check_index(index)?;
            data.colors[index] = color;
            Ok(())
        });
        self.track(result)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/raster/palette.rs"]
mod tests;
