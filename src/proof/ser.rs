//! Canonical byte encoding of [`StarkProof`].
//!
//! ```text
//! +--------------------------+-------------------------------------------+
//! | Section                  | Encoding                                  |
//! +==========================+===========================================+
//! | version                  | u16                                       |
//! | config                   | 20 bytes, see `config::encode_config`     |
//! | commitments              | vec<digest>                               |
//! | sampled values           | vec<vec<vec<qm31>>> (tree, column, point) |
//! | decommitments            | vec<(vec<digest>, vec<m31>)>              |
//! | queried values           | vec<vec<m31>>                             |
//! | proof of work            | u64                                       |
//! | fri first layer          | layer                                     |
//! | fri inner layers         | vec<layer>                                |
//! | fri last layer poly      | vec<qm31>, power-of-two length            |
//! +--------------------------+-------------------------------------------+
//! ```
//!
//! A `layer` is `vec<qm31>` witness, the Merkle decommitment, then the
//! digest of the layer's commitment. `vec<T>` is a `u32` count followed by
//! the items.

use super::StarkProof;
use crate::config::encode_config;
use crate::fri::{FriConfig, FriLayerProof, FriProof};
use crate::merkle::{MerkleDecommitment, MerkleHasher};
use crate::pcs::{CommitmentSchemeProof, PcsConfig, TreeVec};
use crate::poly::LinePoly;
use crate::ser::{
    read_digest, read_digest_vec, read_m31_vec, read_qm31_vec, read_u16, read_u32, read_u64,
    read_vec, write_digest, write_digest_vec, write_m31_vec, write_qm31_vec, write_u16,
    write_u64, write_vec, ByteReader, SerError, SerKind, SerResult,
};

pub const PROOF_VERSION: u16 = 1;

pub fn encode_proof<H: MerkleHasher>(proof: &StarkProof<H>) -> SerResult<Vec<u8>> {
    let CommitmentSchemeProof {
        config,
        commitments,
        sampled_values,
        decommitments,
        queried_values,
        proof_of_work,
        fri_proof,
    } = &proof.0;

    let mut out = Vec::new();
    write_u16(&mut out, PROOF_VERSION);
    out.extend_from_slice(&encode_config(config));
    write_digest_vec(&mut out, commitments.as_slice(), SerKind::Commitments, "roots")?;

    write_vec(&mut out, sampled_values.as_slice(), SerKind::SampledValues, "trees", |out, tree| {
        write_vec(out, tree, SerKind::SampledValues, "columns", |out, column| {
            write_qm31_vec(out, column, SerKind::SampledValues, "values")
        })
    })?;
    write_vec(&mut out, decommitments.as_slice(), SerKind::Decommitments, "trees", |out, decommitment| {
        write_decommitment(out, decommitment, SerKind::Decommitments)
    })?;
    write_vec(&mut out, queried_values.as_slice(), SerKind::QueriedValues, "trees", |out, values| {
        write_m31_vec(out, values, SerKind::QueriedValues, "values")
    })?;
    write_u64(&mut out, *proof_of_work);

    write_layer(&mut out, &fri_proof.first_layer)?;
    write_vec(&mut out, &fri_proof.inner_layers, SerKind::Fri, "inner layers", |out, layer| {
        write_layer(out, layer)
    })?;
    write_qm31_vec(
        &mut out,
        fri_proof.last_layer_poly.coeffs(),
        SerKind::Fri,
        "last layer poly",
    )?;
    Ok(out)
}

/// Decodes a proof written by [`encode_proof`], rejecting unknown versions,
/// invalid configurations, non-canonical field elements and trailing bytes.
pub fn decode_proof<H: MerkleHasher>(bytes: &[u8]) -> SerResult<StarkProof<H>> {
    let mut cursor = ByteReader::new(bytes);
    if read_u16(&mut cursor, SerKind::Proof, "version")? != PROOF_VERSION {
        return Err(SerError::invalid_value(SerKind::Proof, "version"));
    }
    let config = read_config(&mut cursor)?;
    let commitments = read_digest_vec(&mut cursor, SerKind::Commitments, "roots")?;

    let sampled_values = read_vec(&mut cursor, SerKind::SampledValues, "trees", |cursor| {
        read_vec(cursor, SerKind::SampledValues, "columns", |cursor| {
            read_qm31_vec(cursor, SerKind::SampledValues, "values")
        })
    })?;
    let decommitments = read_vec(&mut cursor, SerKind::Decommitments, "trees", |cursor| {
        read_decommitment(cursor, SerKind::Decommitments)
    })?;
    let queried_values = read_vec(&mut cursor, SerKind::QueriedValues, "trees", |cursor| {
        read_m31_vec(cursor, SerKind::QueriedValues, "values")
    })?;
    let proof_of_work = read_u64(&mut cursor, SerKind::Proof, "proof of work")?;

    let first_layer = read_layer(&mut cursor)?;
    let inner_layers = read_vec(&mut cursor, SerKind::Fri, "inner layers", read_layer)?;
    let last_layer_poly = LinePoly::new(read_qm31_vec(&mut cursor, SerKind::Fri, "last layer poly")?)
        .map_err(|_| SerError::invalid_length(SerKind::Fri, "last layer poly"))?;
    cursor.ensure_consumed(SerKind::Proof)?;

    Ok(StarkProof(CommitmentSchemeProof {
        config,
        commitments: TreeVec::new(commitments),
        sampled_values: TreeVec::new(sampled_values),
        decommitments: TreeVec::new(decommitments),
        queried_values: TreeVec::new(queried_values),
        proof_of_work,
        fri_proof: FriProof {
            first_layer,
            inner_layers,
            last_layer_poly,
        },
    }))
}

fn read_config(cursor: &mut ByteReader<'_>) -> SerResult<PcsConfig> {
    let pow_bits = read_u32(cursor, SerKind::Config, "pow bits")?;
    let log_blowup_factor = read_u32(cursor, SerKind::Config, "log blowup factor")?;
    let log_last_layer_degree_bound = read_u32(cursor, SerKind::Config, "log last layer degree bound")?;
    let n_queries = usize::try_from(read_u64(cursor, SerKind::Config, "queries")?)
        .map_err(|_| SerError::invalid_value(SerKind::Config, "queries"))?;
    let fri_config = FriConfig::new(log_blowup_factor, log_last_layer_degree_bound, n_queries)
        .map_err(|_| SerError::invalid_value(SerKind::Config, "fri config"))?;
    PcsConfig::new(pow_bits, fri_config)
        .map_err(|_| SerError::invalid_value(SerKind::Config, "pow bits"))
}

fn write_decommitment<H: MerkleHasher>(
    out: &mut Vec<u8>,
    decommitment: &MerkleDecommitment<H>,
    kind: SerKind,
) -> SerResult<()> {
    write_digest_vec(out, &decommitment.hash_witness, kind, "hash witness")?;
    write_m31_vec(out, &decommitment.column_witness, kind, "column witness")
}

fn read_decommitment<H: MerkleHasher>(
    cursor: &mut ByteReader<'_>,
    kind: SerKind,
) -> SerResult<MerkleDecommitment<H>> {
    Ok(MerkleDecommitment {
        hash_witness: read_digest_vec(cursor, kind, "hash witness")?,
        column_witness: read_m31_vec(cursor, kind, "column witness")?,
    })
}

fn write_layer<H: MerkleHasher>(out: &mut Vec<u8>, layer: &FriLayerProof<H>) -> SerResult<()> {
    write_qm31_vec(out, &layer.fri_witness, SerKind::Fri, "fri witness")?;
    write_decommitment(out, &layer.decommitment, SerKind::Fri)?;
    write_digest(out, &layer.commitment);
    Ok(())
}

fn read_layer<H: MerkleHasher>(cursor: &mut ByteReader<'_>) -> SerResult<FriLayerProof<H>> {
    Ok(FriLayerProof {
        fri_witness: read_qm31_vec(cursor, SerKind::Fri, "fri witness")?,
        decommitment: read_decommitment(cursor, SerKind::Fri)?,
        commitment: read_digest(cursor, SerKind::Fri, "commitment")?,
    })
}
