//! Utility functions for moving typed data in and out of device memory.
//!
//! Device memory is byte-addressed; these helpers perform the conversions
//! between host slices of [`Prm`] scalars and raw byte buffers.

use std::mem;
use std::ptr;
use std::slice;

use crate::Prm;

/// Views a host slice as raw bytes.
pub fn as_bytes<T: Prm>(slice: &[T]) -> &[u8] {
    // Safe per the `Prm` contract: implementors are plain-old-data with no
    // padding-sensitive invariants.
    unsafe { slice::from_raw_parts(slice.as_ptr() as *const u8, mem::size_of_val(slice)) }
}

/// Builds a `Vec<T>` from raw bytes.
///
/// ## Panics
///
/// Panics if `bytes.len()` is not a multiple of `size_of::<T>()`.
pub fn vec_from_bytes<T: Prm>(bytes: &[u8]) -> Vec<T> {
    let elem_size = mem::size_of::<T>();
    assert_eq!(
        bytes.len() % elem_size,
        0,
        "util::vec_from_bytes: byte length ({}) is not a multiple of the element size ({})",
        bytes.len(),
        elem_size
    );
    let len = bytes.len() / elem_size;
    let mut vec = vec![T::default(); len];
    unsafe {
        ptr::copy_nonoverlapping(bytes.as_ptr(), vec.as_mut_ptr() as *mut u8, bytes.len());
    }
    vec
}

/// Copies raw bytes into a typed host slice.
///
/// ## Panics
///
/// Panics if `bytes.len()` does not equal the byte length of `dst`.
pub fn copy_to_slice<T: Prm>(bytes: &[u8], dst: &mut [T]) {
    assert_eq!(
        bytes.len(),
        mem::size_of_val(dst),
        "util::copy_to_slice: byte length mismatch"
    );
    unsafe {
        ptr::copy_nonoverlapping(bytes.as_ptr(), dst.as_mut_ptr() as *mut u8, bytes.len());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trip() {
        let vals: Vec<u32> = vec![0xdead_beef, 1, 2, 3];
        let bytes = as_bytes(&vals).to_vec();
        assert_eq!(bytes.len(), 16);
        let back: Vec<u32> = vec_from_bytes(&bytes);
        assert_eq!(back, vals);

        let mut dst = [0u32; 4];
        copy_to_slice(&bytes, &mut dst);
        assert_eq!(&dst[..], &vals[..]);
    }
}
