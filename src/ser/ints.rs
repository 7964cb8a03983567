use core::mem::size_of;

use super::cursor::ByteReader;
use super::error::{SerError, SerKind, SerResult};

macro_rules! le_int {
    ($write:ident, $read:ident, $ty:ty) => {
        pub fn $write(out: &mut Vec<u8>, value: $ty) {
            out.extend_from_slice(&value.to_le_bytes());
        }

        pub fn $read(cursor: &mut ByteReader<'_>, kind: SerKind, field: &'static str) -> SerResult<$ty> {
            cursor
                .read_array::<{ size_of::<$ty>() }>(kind, field)
                .map(<$ty>::from_le_bytes)
        }
    };
}

le_int!(write_u16, read_u16, u16);
le_int!(write_u32, read_u32, u32);
le_int!(write_u64, read_u64, u64);

/// Converts a length into a `u32` prefix.
pub fn ensure_u32(value: usize, kind: SerKind, field: &'static str) -> SerResult<u32> {
    u32::try_from(value).map_err(|_| SerError::invalid_length(kind, field))
}
