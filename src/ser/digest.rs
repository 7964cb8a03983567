use super::collections::{read_vec, write_vec};
use super::cursor::ByteReader;
use super::error::{SerKind, SerResult};
use crate::hash::{HashDigest, DIGEST_SIZE};

pub fn write_digest<D: HashDigest>(out: &mut Vec<u8>, digest: &D) {
    out.extend_from_slice(&digest.to_bytes());
}

pub fn read_digest<D: HashDigest>(
    cursor: &mut ByteReader<'_>,
    kind: SerKind,
    field: &'static str,
) -> SerResult<D> {
    cursor
        .read_array::<DIGEST_SIZE>(kind, field)
        .map(D::from_bytes)
}

pub fn write_digest_vec<D: HashDigest>(
    out: &mut Vec<u8>,
    digests: &[D],
    kind: SerKind,
    field: &'static str,
) -> SerResult<()> {
    write_vec(out, digests, kind, field, |out, digest| {
        write_digest(out, digest);
        Ok(())
    })
}

pub fn read_digest_vec<D: HashDigest>(
    cursor: &mut ByteReader<'_>,
    kind: SerKind,
    field: &'static str,
) -> SerResult<Vec<D>> {
    read_vec(cursor, kind, field, |cursor| read_digest(cursor, kind, field))
}
