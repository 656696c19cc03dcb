use std::cell::Cell;

use crate::foundation::error::{ErrorCode, RastelResult};
use crate::object::store::{ObjectKind, ObjectStore, RawRef};

/// A single engine instance: the arena of live resource objects plus
/// per-instance diagnostics.
///
/// All object operations go through an `Engine`; one instance is expected per
/// logical rendering thread. The bitmap and palette operation surfaces live in
/// [`crate::raster`] as further `impl Engine` blocks.
#[derive(Default)]
pub struct Engine {
    pub(crate) objects: ObjectStore,
    last_error: Cell<ErrorCode>,
}

impl Engine {
    /// Creates an engine with an empty object table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Diagnostic code left by the most recent operation on this engine.
    ///
    /// Every operation overwrites it: [`ErrorCode::Ok`] on success, the
    /// matching failure code otherwise. Callers inspect the returned
    /// `Result` first; this code exists for after-the-fact diagnostics.
    pub fn last_error(&self) -> ErrorCode {
        self.last_error.get()
    }

    /// Pure kind predicate: does `raw` resolve to a live object of `kind`?
    ///
    /// Never mutates and never records diagnostics; this is the guard the
    /// typed operations run before touching a reference argument.
    pub fn check(&self, raw: RawRef, kind: ObjectKind) -> bool {
        self.objects.check(raw, kind)
    }

    /// Records the diagnostic code of `result` and passes it through.
    pub(crate) fn track<T>(&self, result: RastelResult<T>) -> RastelResult<T> {
        self.last_error.set(match &result {
            Ok(_) => ErrorCode::Ok,
            Err(e) => e.code(),
        });
        result
    }
}
