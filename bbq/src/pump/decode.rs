//! Fixed-layout record decoding

use std::mem;
use std::ptr;

use aya::Pod;

use crate::domain::DecodeError;

/// Decode the leading `size_of::<T>()` bytes of `raw` into a `T`
///
/// Fields are read in `T`'s declared (`#[repr(C)]`) order using native byte
/// order, which is what the eBPF side wrote. Trailing bytes are ignored.
///
/// # Errors
/// Returns [`DecodeError::UnexpectedEof`] if `raw` is shorter than `T`
pub fn decode<T: Pod>(raw: &[u8]) -> Result<T, DecodeError> {
    let needed = mem::size_of::<T>();
    if raw.len() < needed {
        return Err(DecodeError::UnexpectedEof { needed, available: raw.len() });
    }

    // SAFETY: the buffer holds at least size_of::<T>() bytes and T: Pod is
    // valid for any bit pattern; read_unaligned copes with the sample offset.
    #[allow(unsafe_code)]
    let value = unsafe { ptr::read_unaligned(raw.as_ptr().cast::<T>()) };
    Ok(value)
}
