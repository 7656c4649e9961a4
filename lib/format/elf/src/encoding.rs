//! Little-endian field decoding.
//!
//! Only the two's complement little-endian data encoding is supported, so
//! these helpers are fixed rather than parameterized over an encoding.

/// Copies the `N` bytes at `offset` into an array.
///
/// # Panics
///
/// Panics if `bytes` does not contain `offset + N` bytes. Every caller in
/// this crate has already validated the slice length against the fixed
/// layout it decodes, so an out-of-bounds read here is a logic error.
fn read_array<const N: usize>(bytes: &[u8], offset: usize) -> [u8; N] {
    let mut arr = [0; N];
    arr.copy_from_slice(&bytes[offset..offset + N]);
    arr
}

/// Decodes the little-endian `u16` at `offset` bytes into `bytes`.
pub(crate) fn read_u16(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes(read_array(bytes, offset))
}

/// Decodes the little-endian `u32` at `offset` bytes into `bytes`.
pub(crate) fn read_u32(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes(read_array(bytes, offset))
}

/// Decodes the little-endian `u64` at `offset` bytes into `bytes`.
pub(crate) fn read_u64(bytes: &[u8], offset: usize) -> u64 {
    u64::from_le_bytes(read_array(bytes, offset))
}
