use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use rayon::prelude::*;

use crate::foundation::error::{RastelError, RastelResult};

/// Number of entries in one blend LUT: one byte per `(a, b)` pair of 8-bit
/// intensities, indexed by `(a << 8) | b`.
pub const BLEND_TABLE_LEN: usize = 1 << 16;

/// Pixel-combination function for the [`BlendMode::Custom`] slot.
pub type BlendFn = fn(u8, u8) -> u8;

/// Named pixel-combination function used when compositing layers.
///
/// `a` is the source intensity, `b` the destination intensity, both in
/// `[0, 255]`; every formula uses integer arithmetic and lands in `[0, 255]`
/// by construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum BlendMode {
    /// `(a + 2b) / 3` -- source weighted at 25%.
    Mix25,
    /// `(a + b) / 2` -- even mix.
    Mix50,
    /// `(2a + b) / 3` -- source weighted at 75%.
    Mix75,
    /// `min(a + b, 255)` -- additive.
    Add,
    /// `max(a - b, 0)` -- subtractive.
    Sub,
    /// `(a * b) / 255` -- multiplicative.
    Mod,
    /// `a` (identity passthrough) unless overridden with
    /// [`set_custom_blend`].
    Custom,
}

impl BlendMode {
    /// All supported modes, in table order.
    pub const ALL: [BlendMode; 7] = [
        BlendMode::Mix25,
        BlendMode::Mix50,
        BlendMode::Mix75,
        BlendMode::Add,
        BlendMode::Sub,
        BlendMode::Mod,
        BlendMode::Custom,
    ];

    fn index(self) -> usize {
        self as usize
    }

    fn combine(self, a: u8, b: u8, custom: BlendFn) -> u8 {
        let (wa, wb) = (u16::from(a), u16::from(b));
        match self {
            Self::Mix25 => ((wa + 2 * wb) / 3) as u8,
            Self::Mix50 => ((wa + wb) / 2) as u8,
            Self::Mix75 => ((2 * wa + wb) / 3) as u8,
            Self::Add => (wa + wb).min(255) as u8,
            Self::Sub => a.saturating_sub(b),
            Self::Mod => ((wa * wb) / 255) as u8,
            Self::Custom => custom(a, b),
        }
    }
}

/// One precomputed 65536-entry blend LUT.
#[derive(Clone)]
pub struct BlendTable {
    lut: Box<[u8]>, // always BLEND_TABLE_LEN bytes
}

impl BlendTable {
    fn build(mode: BlendMode, custom: BlendFn) -> RastelResult<Self> {
        let mut lut = Vec::new();
        lut.try_reserve_exact(BLEND_TABLE_LEN)
            .map_err(|_| RastelError::out_of_memory("blend table"))?;
        for a in 0..=255u8 {
            for b in 0..=255u8 {
                lut.push(mode.combine(a, b, custom));
            }
        }
        Ok(Self {
            lut: lut.into_boxed_slice(),
        })
    }

    /// Full LUT of [`BLEND_TABLE_LEN`] bytes, indexed by `(a << 8) | b`.
    pub fn as_slice(&self) -> &[u8] {
        &self.lut
    }

    /// Blends source intensity `a` with destination intensity `b`.
    #[inline]
    pub fn apply(&self, a: u8, b: u8) -> u8 {
        self.lut[(usize::from(a) << 8) | usize::from(b)]
    }
}

struct LutSet {
    tables: Vec<BlendTable>, // indexed by BlendMode::index()
}

fn build_set(custom: BlendFn) -> RastelResult<LutSet> {
    let tables = BlendMode::ALL
        .par_iter()
        .map(|mode| BlendTable::build(*mode, custom))
        .collect::<RastelResult<Vec<_>>>()?;
    Ok(LutSet { tables })
}

fn default_custom(a: u8, _b: u8) -> u8 {
    a
}

struct Registry {
    instances: usize,
    luts: Option<Arc<LutSet>>,
    custom: BlendFn,
}

static REGISTRY: Mutex<Registry> = Mutex::new(Registry {
    instances: 0,
    luts: None,
    custom: default_custom,
});

fn registry() -> MutexGuard<'static, Registry> {
    REGISTRY.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
fn instances() -> usize {
    registry().instances
}

/// Scoped handle to the process-wide set of precomputed blend tables.
///
/// The first live handle triggers the one-time build of every table; later
/// acquisitions only bump a reference count and share the same immutable set.
/// When the last handle drops, the registry releases the tables. Because
/// [`BlendTables::select`] borrows from the handle, a LUT cannot be torn down
/// while any lookup result is still in use.
pub struct BlendTables {
    luts: Arc<LutSet>,
}

impl BlendTables {
    /// Acquires the shared table set, building it on the inactive-to-active
    /// transition.
    ///
    /// If any table allocation fails, nothing is published and the engine
    /// stays inactive; the call can simply be retried.
    #[tracing::instrument]
    pub fn acquire() -> RastelResult<Self> {
        let mut reg = registry();
        let luts = match &reg.luts {
            Some(luts) => luts.clone(),
            None => {
                tracing::debug!("building blend tables");
                let set = Arc::new(build_set(reg.custom)?);
                reg.luts = Some(set.clone());
                set
            }
        };
        reg.instances += 1;
        Ok(Self { luts })
    }

    /// LUT for `mode`. Pure lookup.
    pub fn select(&self, mode: BlendMode) -> &BlendTable {
        &self.luts.tables[mode.index()]
    }

    /// Convenience for `select(mode).apply(a, b)`.
    pub fn apply(&self, mode: BlendMode, a: u8, b: u8) -> u8 {
        self.select(mode).apply(a, b)
    }
}

impl Clone for BlendTables {
    /// Cloning a handle is an acquisition: the reference count goes up and
    /// the clone shares this handle's table snapshot.
    fn clone(&self) -> Self {
        registry().instances += 1;
        Self {
            luts: self.luts.clone(),
        }
    }
}

impl Drop for BlendTables {
    fn drop(&mut self) {
        let mut reg = registry();
        reg.instances = reg.instances.saturating_sub(1);
        if reg.instances == 0 {
            reg.luts = None;
        }
    }
}

/// Overrides the formula behind [`BlendMode::Custom`], or restores the
/// identity passthrough when given `None`.
///
/// Takes effect for subsequently acquired handles. Handles already issued
/// keep their immutable snapshot of the tables; tables are never mutated once
/// built. If the rebuild fails, the previous tables and formula stay in
/// place.
pub fn set_custom_blend(f: Option<BlendFn>) -> RastelResult<()> {
    let mut reg = registry();
    let custom = f.unwrap_or(default_custom);
    if reg.luts.is_some() {
        let set = build_set(custom)?;
        reg.luts = Some(Arc::new(set));
    }
    reg.custom = custom;
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/blend/tables.rs"]
mod tests;
