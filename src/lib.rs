//! Rastel is the resource core of a 2D raster rendering engine.
//!
//! It provides the two pieces of shared infrastructure every other engine
//! layer (rasterizer, compositor, loaders) builds on:
//!
//! 1. **Object model**: a typed, arena-indexed table of engine resources
//!    (bitmaps, palettes) with kind-checked access, shallow cloning, and
//!    ownership-aware cascading deletion. See [`Engine`].
//! 2. **Blend tables**: a process-wide, reference-counted set of precomputed
//!    256x256 pixel-combination LUTs, one per [`BlendMode`], shared by all
//!    active rendering consumers. See [`BlendTables`].
//!
//! The key design constraints:
//!
//! - **No unsafe**: `unsafe` is forbidden in this crate. The raw pixel view
//!   ([`Engine::bitmap_pixels_mut`]) is a plain slice whose interior is not
//!   re-checked by the engine, not a raw pointer.
//! - **Allocation failure is reported, not fatal**: object and table creation
//!   use fallible reservation and surface [`RastelError::OutOfMemory`].
//! - **Dangling references are detected, not undefined**: generational
//!   references make stale or double-deleted handles an error rather than UB.
//! - **Scoped blend-table lifetime**: a LUT borrow cannot outlive the
//!   [`BlendTables`] handle that produced it, so teardown races are
//!   unrepresentable.
#![forbid(unsafe_code)]
#![deny(missing_docs)]

mod blend;
mod foundation;
mod object;
mod raster;

pub use blend::tables::{
    BLEND_TABLE_LEN, BlendFn, BlendMode, BlendTable, BlendTables, set_custom_blend,
};
pub use foundation::error::{ErrorCode, RastelError, RastelResult};
pub use object::engine::Engine;
pub use object::store::{ObjectKind, RawRef};
pub use raster::bitmap::BitmapRef;
pub use raster::palette::{PaletteRef, Rgb8};
