use super::cursor::ByteReader;
use super::error::{SerError, SerKind, SerResult};
use super::ints;

/// Writes `items` behind a `u32` item count.
pub fn write_vec<T, F>(
    out: &mut Vec<u8>,
    items: &[T],
    kind: SerKind,
    field: &'static str,
    mut write_item: F,
) -> SerResult<()>
where
    F: FnMut(&mut Vec<u8>, &T) -> SerResult<()>,
{
    let count = ints::ensure_u32(items.len(), kind, field)?;
    ints::write_u32(out, count);
    for item in items {
        write_item(out, item)?;
    }
    Ok(())
}

/// Reads a sequence written by [`write_vec`].
///
/// Every item occupies at least one byte, so a count larger than the
/// remaining input is rejected before anything is allocated.
pub fn read_vec<T, F>(
    cursor: &mut ByteReader<'_>,
    kind: SerKind,
    field: &'static str,
    mut read_item: F,
) -> SerResult<Vec<T>>
where
    F: FnMut(&mut ByteReader<'_>) -> SerResult<T>,
{
    let count = ints::read_u32(cursor, kind, field)? as usize;
    if count > cursor.remaining() {
        return Err(SerError::invalid_length(kind, field));
    }
    let mut out = Vec::with_capacity(count);
    for _ in 0..count {
        out.push(read_item(cursor)?);
    }
    Ok(out)
}
