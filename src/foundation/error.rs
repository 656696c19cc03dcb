use crate::object::store::ObjectKind;

/// Convenience result type used across Rastel.
pub type RastelResult<T> = Result<T, RastelError>;

/// Closed set of diagnostic codes recorded by every engine operation.
///
/// Exposed through [`Engine::last_error`](crate::Engine::last_error) for
/// callers that prefer a code inspection after a sentinel return.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize,
)]
pub enum ErrorCode {
    /// The most recent operation completed without error.
    #[default]
    Ok,
    /// Heap allocation failed, or a storage size computation overflowed.
    OutOfMemory,
    /// A reference argument did not resolve to a live bitmap.
    WrongBitmapRef,
    /// A reference argument did not resolve to a live palette.
    WrongPaletteRef,
    /// A pixel coordinate or palette index was outside declared bounds.
    OutOfRange,
}

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum RastelError {
    /// Heap exhaustion (or size overflow) during object or table creation.
    #[error("out of memory: {0}")]
    OutOfMemory(String),

    /// A reference argument does not carry the expected object kind, or the
    /// object behind it has already been deleted.
    #[error("wrong {0} reference")]
    WrongReference(ObjectKind),

    /// A pixel coordinate or palette index outside the declared bounds.
    #[error("out of range: {0}")]
    OutOfRange(String),
}

impl RastelError {
    /// Build a [`RastelError::OutOfMemory`] value.
    pub fn out_of_memory(msg: impl Into<String>) -> Self {
        Self::OutOfMemory(msg.into())
    }

    /// Build a [`RastelError::OutOfRange`] value.
    pub fn out_of_range(msg: impl Into<String>) -> Self {
        Self::OutOfRange(msg.into())
    }

    /// Diagnostic code for this error, as recorded by
    /// [`Engine::last_error`](crate::Engine::last_error).
    pub fn code(&self) -> ErrorCode {
        match self {
            Self::OutOfMemory(_) => ErrorCode::OutOfMemory,
            Self::WrongReference(ObjectKind::Bitmap) => ErrorCode::WrongBitmapRef,
            Self::WrongReference(ObjectKind::Palette) => ErrorCode::WrongPaletteRef,
            Self::OutOfRange(_) => ErrorCode::OutOfRange,
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
