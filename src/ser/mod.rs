//! Canonical byte encoding primitives.
//!
//! Every integer is little-endian, every variable-length sequence carries a
//! `u32` item count, and field elements are written in their canonical `u32`
//! form. Decoders reject non-canonical field elements and leftover input.

mod collections;
mod cursor;
mod digest;
mod error;
mod felt;
mod ints;

pub use collections::{read_vec, write_vec};
pub use cursor::ByteReader;
pub use digest::{read_digest, read_digest_vec, write_digest, write_digest_vec};
pub use error::{SerError, SerKind, SerResult};
pub use felt::{
    read_m31, read_m31_vec, read_qm31, read_qm31_vec, write_m31, write_m31_vec, write_qm31,
    write_qm31_vec, M31_ENCODED_SIZE, QM31_ENCODED_SIZE,
};
pub use ints::{ensure_u32, read_u16, read_u32, read_u64, write_u16, write_u32, write_u64};
