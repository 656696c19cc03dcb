use crate::foundation::error::{RastelError, RastelResult};
use crate::raster::bitmap::BitmapData;
use crate::raster::palette::PaletteData;

/// Concrete kind of an engine object. Fixed at creation time and re-validated
/// by every typed operation that takes a reference argument.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ObjectKind {
    /// Raster pixel surface with header fields and inline storage.
    Bitmap,
    /// Indexed color table.
    Palette,
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Bitmap => f.write_str("bitmap"),
            Self::Palette => f.write_str("palette"),
        }
    }
}

/// Untyped generational reference to an engine object.
///
/// A `RawRef` stays cheap to copy and never dangles silently: once the slot it
/// points at is released, the stored generation no longer matches and every
/// subsequent access reports a wrong-reference error.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct RawRef {
    pub(crate) index: u32,
    pub(crate) generation: u32,
}

/// Kind-specific payload stored in an object slot.
pub(crate) enum Payload {
    Bitmap(BitmapData),
    Palette(PaletteData),
}

impl Payload {
    pub(crate) fn kind(&self) -> ObjectKind {
        match self {
            Self::Bitmap(_) => ObjectKind::Bitmap,
            Self::Palette(_) => ObjectKind::Palette,
        }
    }

    /// Shallow copy. Pixel/color storage is duplicated because it is inline
    /// payload; an embedded palette reference is copied as shared, so the
    /// clone never owns the source's sub-object.
    fn clone_shared(&self) -> RastelResult<Self> {
        match self {
            Self::Bitmap(b) => Ok(Self::Bitmap(b.clone_shared()?)),
            Self::Palette(p) => Ok(Self::Palette(p.clone_data()?)),
        }
    }
}

struct Slot {
    generation: u32,
    payload: Option<Payload>,
}

/// Arena-indexed table of all live engine objects.
///
/// This is the single allocation/validation choke-point of the engine: every
/// resource kind shares the create/clone/delete/check logic here and is
/// distinguished purely by its [`ObjectKind`] and payload.
#[derive(Default)]
pub(crate) struct ObjectStore {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl ObjectStore {
    /// Allocates a fresh slot for `payload` and returns its reference.
    pub(crate) fn create(&mut self, payload: Payload) -> RastelResult<RawRef> {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.payload = Some(payload);
            return Ok(RawRef {
                index,
                generation: slot.generation,
            });
        }

        let index = u32::try_from(self.slots.len())
            .map_err(|_| RastelError::out_of_memory("object table index space exhausted"))?;
        self.slots
            .try_reserve(1)
            .map_err(|_| RastelError::out_of_memory("object table slot"))?;
        self.slots.push(Slot {
            generation: 0,
            payload: Some(payload),
        });
        Ok(RawRef {
            index,
            generation: 0,
        })
    }

    /// Pure predicate: does `raw` resolve to a live object of `kind`?
    pub(crate) fn check(&self, raw: RawRef, kind: ObjectKind) -> bool {
        self.payload(raw).is_some_and(|p| p.kind() == kind)
    }

    /// Duplicates the object behind `raw` into a fresh slot.
    ///
    /// The clone receives its own lifetime; see [`Payload::clone_shared`] for
    /// the ownership semantics of embedded references.
    pub(crate) fn clone_of(&mut self, raw: RawRef, kind: ObjectKind) -> RastelResult<RawRef> {
        let copy = match self.payload(raw) {
            Some(p) if p.kind() == kind => p.clone_shared()?,
            _ => return Err(RastelError::WrongReference(kind)),
        };
        self.create(copy)
    }

    /// Deletes the object behind `raw`, cascading into an owned sub-object
    /// first. The slot generation is bumped so surviving references to the
    /// deleted object fail their next kind check.
    pub(crate) fn delete(&mut self, raw: RawRef, kind: ObjectKind) -> RastelResult<()> {
        if !self.check(raw, kind) {
            return Err(RastelError::WrongReference(kind));
        }

        // Only bitmaps embed an ownable sub-object today. An owned link whose
        // target is already gone is skipped, not an error.
        let owned_link = match self.bitmap(raw) {
            Ok(bitmap) => bitmap.palette.filter(|link| link.owned),
            Err(_) => None,
        };
        if let Some(link) = owned_link {
            let pal = link.palette.raw();
            if self.check(pal, ObjectKind::Palette) {
                self.delete(pal, ObjectKind::Palette)?;
            }
        }

        self.release(raw);
        Ok(())
    }

    fn release(&mut self, raw: RawRef) {
        let slot = &mut self.slots[raw.index as usize];
        slot.payload = None;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(raw.index);
    }

    fn payload(&self, raw: RawRef) -> Option<&Payload> {
        self.slots
            .get(raw.index as usize)
            .filter(|slot| slot.generation == raw.generation)
            .and_then(|slot| slot.payload.as_ref())
    }

    fn payload_mut(&mut self, raw: RawRef) -> Option<&mut Payload> {
        self.slots
            .get_mut(raw.index as usize)
            .filter(|slot| slot.generation == raw.generation)
            .and_then(|slot| slot.payload.as_mut())
    }

    pub(crate) fn bitmap(&self, raw: RawRef) -> RastelResult<&BitmapData> {
        match self.payload(raw) {
            Some(Payload::Bitmap(b)) => Ok(b),
            _ => Err(RastelError::WrongReference(ObjectKind::Bitmap)),
        }
    }

    pub(crate) fn bitmap_mut(&mut self, raw: RawRef) -> RastelResult<&mut BitmapData> {
        match self.payload_mut(raw) {
            Some(Payload::Bitmap(b)) => Ok(b),
            _ => Err(RastelError::WrongReference(ObjectKind::Bitmap)),
        }
    }

    pub(crate) fn palette(&self, raw: RawRef) -> RastelResult<&PaletteData> {
        match self.payload(raw) {
            Some(Payload::Palette(p)) => Ok(p),
            _ => Err(RastelError::WrongReference(ObjectKind::Palette)),
        }
    }

    pub(crate) fn palette_mut(&mut self, raw: RawRef) -> RastelResult<&mut PaletteData> {
        match self.payload_mut(raw) {
            Some(Payload::Palette(p)) => Ok(p),
            _ => Err(RastelError::WrongReference(ObjectKind::Palette)),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/object/store.rs"]
mod tests;
