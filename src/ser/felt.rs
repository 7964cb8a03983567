use super::collections::{read_vec, write_vec};
use super::cursor::ByteReader;
use super::error::{SerError, SerKind, SerResult};
use crate::field::{M31, QM31, SECURE_EXTENSION_DEGREE};

pub const M31_ENCODED_SIZE: usize = 4;
pub const QM31_ENCODED_SIZE: usize = M31_ENCODED_SIZE * SECURE_EXTENSION_DEGREE;

pub fn write_m31(out: &mut Vec<u8>, value: M31) {
    out.extend_from_slice(&value.to_le_bytes());
}

/// Reads a base field element, rejecting values `>= P`.
pub fn read_m31(cursor: &mut ByteReader<'_>, kind: SerKind, field: &'static str) -> SerResult<M31> {
    let bytes = cursor.read_array::<M31_ENCODED_SIZE>(kind, field)?;
    M31::from_le_bytes(bytes).map_err(|_| SerError::invalid_value(kind, field))
}

/// Writes the four base field coordinates in `(a, b, c, d)` order.
pub fn write_qm31(out: &mut Vec<u8>, value: QM31) {
    for coordinate in value.to_m31_array() {
        write_m31(out, coordinate);
    }
}

pub fn read_qm31(cursor: &mut ByteReader<'_>, kind: SerKind, field: &'static str) -> SerResult<QM31> {
    let mut coordinates = [M31::default(); SECURE_EXTENSION_DEGREE];
    for coordinate in &mut coordinates {
        *coordinate = read_m31(cursor, kind, field)?;
    }
    Ok(QM31::from_m31_array(coordinates))
}

pub fn write_m31_vec(
    out: &mut Vec<u8>,
    values: &[M31],
    kind: SerKind,
    field: &'static str,
) -> SerResult<()> {
    write_vec(out, values, kind, field, |out, value| {
        write_m31(out, *value);
        Ok(())
    })
}

pub fn read_m31_vec(
    cursor: &mut ByteReader<'_>,
    kind: SerKind,
    field: &'static str,
) -> SerResult<Vec<M31>> {
    read_vec(cursor, kind, field, |cursor| read_m31(cursor, kind, field))
}

pub fn write_qm31_vec(
    out: &mut Vec<u8>,
    values: &[QM31],
    kind: SerKind,
    field: &'static str,
) -> SerResult<()> {
    write_vec(out, values, kind, field, |out, value| {
        write_qm31(out, *value);
        Ok(())
    })
}

pub fn read_qm31_vec(
    cursor: &mut ByteReader<'_>,
    kind: SerKind,
    field: &'static str,
) -> SerResult<Vec<QM31>> {
    read_vec(cursor, kind, field, |cursor| read_qm31(cursor, kind, field))
}
