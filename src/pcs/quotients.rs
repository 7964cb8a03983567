use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::{PcsError, PcsResult};
use crate::circle::CirclePoint;
use crate::field::{batch_inverse, Field, FieldExpOps, CM31, M31, QM31};
use crate::poly::{CanonicCoset, SecureColumnByCoords, SecureEvaluation};
use crate::utils::{bit_reverse_index, lifted_index};

/// A claimed evaluation of a column at an out-of-domain point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PointSample {
    pub point: CirclePoint<QM31>,
    pub value: QM31,
}

/// All samples taken at one point, as `(column index, value)` pairs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnSampleBatch {
    pub point: CirclePoint<QM31>,
    pub columns_and_values: Vec<(usize, QM31)>,
}

impl ColumnSampleBatch {
    /// Groups the samples of every column by point. Batches appear in order
    /// of first use and keep column order within a batch.
    pub fn new_vec(samples: &[&[PointSample]]) -> Vec<Self> {
        let mut batches: Vec<Self> = Vec::new();
        for (column_index, column_samples) in samples.iter().enumerate() {
            for sample in column_samples.iter() {
                match batches.iter_mut().find(|batch| batch.point == sample.point) {
                    Some(batch) => batch.columns_and_values.push((column_index, sample.value)),
                    None => batches.push(Self {
                        point: sample.point,
                        columns_and_values: vec![(column_index, sample.value)],
                    }),
                }
            }
        }
        batches
    }
}

/// Line coefficients `(a, b, c)` of every sample, batch by batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotientConstants {
    pub line_coeffs: Vec<Vec<(QM31, QM31, QM31)>>,
}

impl QuotientConstants {
    /// Weights the `k`-th sample overall by `random_coeff^(k+1)`.
    pub fn new(batches: &[ColumnSampleBatch], random_coeff: QM31) -> PcsResult<Self> {
        let mut alpha = QM31::ONE;
        let mut line_coeffs = Vec::with_capacity(batches.len());
        for batch in batches {
            let mut batch_coeffs = Vec::with_capacity(batch.columns_and_values.len());
            for &(_, value) in &batch.columns_and_values {
                alpha *= random_coeff;
                let sample = PointSample {
                    point: batch.point,
                    value,
                };
                batch_coeffs.push(complex_conjugate_line_coeffs(&sample, alpha)?);
            }
            line_coeffs.push(batch_coeffs);
        }
        Ok(Self { line_coeffs })
    }
}

/// Coefficients of the line through `(p.y, v)` and its complex conjugate,
/// scaled by `alpha`. For a row value `f` at `y` the numerator is
/// `c·f - (a·y + b)`, which vanishes at the sample and at its conjugate.
pub fn complex_conjugate_line_coeffs(
    sample: &PointSample,
    alpha: QM31,
) -> PcsResult<(QM31, QM31, QM31)> {
    let point = sample.point;
    if point.y == point.y.complex_conjugate() {
        return Err(PcsError::DegenerateSample);
    }
    let a = sample.value.complex_conjugate() - sample.value;
    let c = point.complex_conjugate().y - point.y;
    let b = sample.value * c - a * point.y;
    Ok((alpha * a, alpha * b, alpha * c))
}

/// Value at `domain_point` of the line through `sample_point` and its
/// conjugate, which lies in `CM31`.
fn denominator(sample_point: CirclePoint<QM31>, domain_point: CirclePoint<M31>) -> CM31 {
    let (prx, pix) = (sample_point.x.0, sample_point.x.1);
    let (pry, piy) = (sample_point.y.0, sample_point.y.1);
    (prx - domain_point.x) * piy - (pry - domain_point.y) * pix
}

fn denominator_inverses(
    batches: &[ColumnSampleBatch],
    domain_point: CirclePoint<M31>,
) -> PcsResult<Vec<CM31>> {
    let denominators: Vec<CM31> = batches
        .iter()
        .map(|batch| denominator(batch.point, domain_point))
        .collect();
    Ok(batch_inverse(&denominators)?)
}

fn accumulate_with_inverses(
    batches: &[ColumnSampleBatch],
    row: &[M31],
    constants: &QuotientConstants,
    domain_y: M31,
    denominator_inverse: impl Fn(usize) -> CM31,
) -> QM31 {
    let mut accumulator = QM31::ZERO;
    for (batch_index, (batch, line_coeffs)) in batches.iter().zip(&constants.line_coeffs).enumerate() {
        let mut numerator = QM31::ZERO;
        for (&(column_index, _), &(a, b, c)) in batch.columns_and_values.iter().zip(line_coeffs) {
            numerator += c * row[column_index] - (a * domain_y + b);
        }
        accumulator += numerator.mul_cm31(denominator_inverse(batch_index));
    }
    accumulator
}

/// The combined quotient at one row, given the row's value in every column.
pub fn accumulate_row_quotients(
    batches: &[ColumnSampleBatch],
    row: &[M31],
    constants: &QuotientConstants,
    domain_point: CirclePoint<M31>,
) -> PcsResult<QM31> {
    let inverses = denominator_inverses(batches, domain_point)?;
    Ok(accumulate_with_inverses(
        batches,
        row,
        constants,
        domain_point.y,
        |batch| inverses[batch],
    ))
}

fn check_lifting(column_log_sizes: &[u32], lifting_log_size: u32) -> PcsResult<()> {
    match column_log_sizes.iter().copied().find(|&log_size| log_size > lifting_log_size) {
        Some(log_size) => Err(PcsError::ShapeMismatch {
            what: "column log size within the lifting domain",
            expected: lifting_log_size as usize,
            got: log_size as usize,
        }),
        None => Ok(()),
    }
}

/// Computes the quotient column over the lifting domain.
///
/// `columns` are the extended evaluations with their log sizes, flattened
/// over all trees; `samples[i]` are the samples of `columns[i]`.
pub fn compute_fri_quotients(
    columns: &[(&[M31], u32)],
    samples: &[Vec<PointSample>],
    random_coeff: QM31,
    lifting_log_size: u32,
) -> PcsResult<SecureEvaluation> {
    if columns.len() != samples.len() {
        return Err(PcsError::ShapeMismatch {
            what: "sampled columns",
            expected: columns.len(),
            got: samples.len(),
        });
    }
    let log_sizes: Vec<u32> = columns.iter().map(|&(_, log_size)| log_size).collect();
    check_lifting(&log_sizes, lifting_log_size)?;
    for &(values, log_size) in columns {
        if values.len() != 1 << log_size {
            return Err(PcsError::ShapeMismatch {
                what: "column length",
                expected: 1 << log_size,
                got: values.len(),
            });
        }
    }

    let domain = CanonicCoset::try_new(lifting_log_size)?.circle_domain();
    let sample_refs: Vec<&[PointSample]> = samples.iter().map(Vec::as_slice).collect();
    let batches = ColumnSampleBatch::new_vec(&sample_refs);
    let constants = QuotientConstants::new(&batches, random_coeff)?;

    let size = domain.size();
    let points: Vec<CirclePoint<M31>> = (0..size)
        .map(|i| domain.at(bit_reverse_index(i, lifting_log_size)))
        .collect();
    let inverses = batches
        .iter()
        .map(|batch| {
            let denominators: Vec<CM31> = points.iter().map(|&p| denominator(batch.point, p)).collect();
            batch_inverse(&denominators)
        })
        .collect::<Result<Vec<_>, _>>()?;
    let shifts: Vec<u32> = log_sizes.iter().map(|log_size| lifting_log_size - log_size).collect();

    let row_quotient = |i: usize| {
        let row: Vec<M31> = columns
            .iter()
            .zip(&shifts)
            .map(|(&(values, _), &shift)| values[lifted_index(i, shift)])
            .collect();
        accumulate_with_inverses(&batches, &row, &constants, points[i].y, |batch| {
            inverses[batch][i]
        })
    };

    #[cfg(feature = "parallel")]
    {
        if crate::utils::parallelism_enabled() {
            use rayon::prelude::*;
            let chunk = crate::utils::preferred_chunk_size(size);
            let values: Vec<QM31> = (0..size)
                .into_par_iter()
                .with_min_len(chunk)
                .map(row_quotient)
                .collect();
            return Ok(SecureEvaluation::new(domain, values.into_iter().collect())?);
        }
    }

    let values: SecureColumnByCoords = (0..size).map(row_quotient).collect();
    Ok(SecureEvaluation::new(domain, values)?)
}

/// Recomputes the quotient column at the queried positions of the lifting
/// domain from the opened column values.
///
/// `column_values[i]` maps positions of column `i` (extended log size
/// `column_log_sizes[i]`) to the opened values.
pub fn fri_answers(
    column_log_sizes: &[u32],
    column_values: &[BTreeMap<usize, M31>],
    samples: &[Vec<PointSample>],
    random_coeff: QM31,
    lifting_log_size: u32,
    queries: &[usize],
) -> PcsResult<Vec<QM31>> {
    if column_log_sizes.len() != samples.len() || column_values.len() != samples.len() {
        return Err(PcsError::ShapeMismatch {
            what: "sampled columns",
            expected: column_log_sizes.len(),
            got: samples.len(),
        });
    }
    check_lifting(column_log_sizes, lifting_log_size)?;

    let domain = CanonicCoset::try_new(lifting_log_size)?.circle_domain();
    let sample_refs: Vec<&[PointSample]> = samples.iter().map(Vec::as_slice).collect();
    let batches = ColumnSampleBatch::new_vec(&sample_refs);
    let constants = QuotientConstants::new(&batches, random_coeff)?;

    queries
        .iter()
        .map(|&position| {
            let row = column_log_sizes
                .iter()
                .zip(column_values)
                .enumerate()
                .map(|(column, (&log_size, values))| {
                    let lifted = lifted_index(position, lifting_log_size - log_size);
                    values.get(&lifted).copied().ok_or(PcsError::MissingQueriedValue {
                        column,
                        position: lifted,
                    })
                })
                .collect::<PcsResult<Vec<M31>>>()?;
            let point = domain.at(bit_reverse_index(position, lifting_log_size));
            accumulate_row_quotients(&batches, &row, &constants, point)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::circle::CirclePointIndex;
    use crate::fft::TwiddleTree;
    use crate::poly::CirclePoly;

    fn secure_point(index: usize) -> CirclePoint<QM31> {
        CirclePointIndex(index).to_point().into_ef()
    }

    fn off_domain_point() -> CirclePoint<QM31> {
        let mut channel = crate::channel::Blake2sChannel::default();
        CirclePoint::get_random_point(&mut channel).expect("point")
    }

    fn column(log_size: u32, seed: u32) -> (CirclePoly, Vec<M31>) {
        let coeffs = (0..1u32 << (log_size - 1))
            .map(|i| M31::from(i * 31 + seed))
            .collect();
        let poly = CirclePoly::new(coeffs).expect("power of two");
        let domain = CanonicCoset::new(log_size).circle_domain();
        let twiddles = TwiddleTree::for_log_size(log_size).expect("twiddles");
        let values = poly.evaluate(domain, &twiddles).expect("evaluate").values;
        (poly, values)
    }

    #[test]
    fn batches_group_by_point_in_first_use_order() {
        let p = secure_point(5);
        let q = secure_point(9);
        let value = |v: u32| QM31::from_u32_unchecked(v, 0, 0, 0);
        let column0 = [PointSample { point: q, value: value(1) }];
        let column1 = [
            PointSample { point: p, value: value(2) },
            PointSample { point: q, value: value(3) },
        ];
        let batches = ColumnSampleBatch::new_vec(&[&column0, &column1]);
        assert_eq!(batches.len(), 2);
        assert_eq!(batches[0].point, q);
        assert_eq!(batches[0].columns_and_values, vec![(0, value(1)), (1, value(3))]);
        assert_eq!(batches[1].columns_and_values, vec![(1, value(2))]);
    }

    #[test]
    fn base_field_points_are_degenerate() {
        let sample = PointSample {
            point: secure_point(77),
            value: QM31::ONE,
        };
        assert_eq!(
            complex_conjugate_line_coeffs(&sample, QM31::ONE),
            Err(PcsError::DegenerateSample)
        );
    }

    #[test]
    fn line_passes_through_sample_and_conjugate() {
        let point = off_domain_point();
        let value = QM31::from_u32_unchecked(3, 1, 4, 1);
        let sample = PointSample { point, value };
        let (a, b, c) = complex_conjugate_line_coeffs(&sample, QM31::ONE).expect("coeffs");
        assert_eq!(c * value, a * point.y + b);
        let conjugate = point.complex_conjugate();
        assert_eq!(c * value.complex_conjugate(), a * conjugate.y + b);
    }

    #[test]
    fn answers_match_quotient_column() {
        let point = off_domain_point();
        let (poly_big, big) = column(4, 3);
        let (poly_small, small) = column(3, 8);
        let lifting_log_size = 4;
        let samples = vec![
            vec![PointSample {
                point,
                value: poly_big.eval_at_point(point),
            }],
            vec![PointSample {
                point,
                value: poly_small.eval_at_point(point.double()),
            }],
        ];
        let random_coeff = QM31::from_u32_unchecked(7, 0, 2, 9);
        let quotients = compute_fri_quotients(
            &[(&big, 4), (&small, 3)],
            &samples,
            random_coeff,
            lifting_log_size,
        )
        .expect("quotients");

        let queries = [0usize, 3, 10, 15];
        let column_values: Vec<BTreeMap<usize, M31>> = [&big, &small]
            .iter()
            .map(|values| values.iter().copied().enumerate().collect())
            .collect();
        let answers = fri_answers(
            &[4, 3],
            &column_values,
            &samples,
            random_coeff,
            lifting_log_size,
            &queries,
        )
        .expect("answers");
        for (&position, answer) in queries.iter().zip(answers) {
            assert_eq!(quotients.values.at(position), answer);
        }
    }

    #[test]
    fn missing_values_are_reported() {
        let point = off_domain_point();
        let samples = vec![vec![PointSample {
            point,
            value: QM31::ONE,
        }]];
        let column_values = vec![BTreeMap::from([(0usize, M31::from(1u32))])];
        assert_eq!(
            fri_answers(&[2], &column_values, &samples, QM31::ONE, 2, &[1]),
            Err(PcsError::MissingQueriedValue {
                column: 0,
                position: 1
            })
        );
    }
}
