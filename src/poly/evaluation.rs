use super::barycentric::barycentric_weights;
use super::canonic::CanonicCoset;
use super::circle_poly::{check_twiddles, CirclePoly};
use super::domain::CircleDomain;
use super::{PolyError, PolyResult};
use crate::circle::CirclePoint;
use crate::fft::{
    circle_twiddles_from_line_twiddles, domain_line_twiddles_from_tree, fft_layer_loop,
    ibutterfly, TwiddleTree,
};
use crate::field::{M31, QM31};
use crate::utils::bit_reverse;

/// Base-field values of a column over a circle domain, in bit-reversed order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CircleEvaluation {
    pub domain: CircleDomain,
    pub values: Vec<M31>,
}

impl CircleEvaluation {
    pub fn new(domain: CircleDomain, values: Vec<M31>) -> PolyResult<Self> {
        if values.len() != domain.size() {
            return Err(PolyError::ShapeMismatch {
                expected: domain.size(),
                got: values.len(),
            });
        }
        Ok(Self { domain, values })
    }

    /// Builds an evaluation from values listed in natural domain order.
    pub fn from_natural_order(domain: CircleDomain, mut values: Vec<M31>) -> PolyResult<Self> {
        if !bit_reverse(&mut values) {
            return Err(PolyError::NotPowerOfTwo(values.len()));
        }
        Self::new(domain, values)
    }

    pub fn to_natural_order(&self) -> Vec<M31> {
        let mut values = self.values.clone();
        bit_reverse(&mut values);
        values
    }

    pub fn log_size(&self) -> u32 {
        self.domain.log_size()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Recovers the unique polynomial of log size `domain.log_size()`
    /// matching these values.
    pub fn interpolate(&self, twiddles: &TwiddleTree) -> PolyResult<CirclePoly> {
        check_twiddles(self.domain, twiddles)?;
        let log_size = self.domain.log_size();
        let mut values = self.values.clone();

        if log_size == 1 {
            // Points of order 4 have y = ±1, so y is its own inverse.
            let y_inv = self.domain.half_coset.initial.y;
            let n_inv = M31::pow2_inverse(1);
            let (mut v0, mut v1) = (values[0], values[1]);
            ibutterfly(&mut v0, &mut v1, y_inv);
            return Ok(CirclePoly::from_fft_output(vec![v0 * n_inv, v1 * n_inv], 1));
        }
        if log_size == 2 {
            // Points of order 8 satisfy x^2 = y^2 = 1/2.
            let CirclePoint { x, y } = self.domain.half_coset.initial;
            let x_inv = x + x;
            let y_inv = y + y;
            let n_inv = M31::pow2_inverse(2);
            let (mut v0, mut v1, mut v2, mut v3) = (values[0], values[1], values[2], values[3]);
            ibutterfly(&mut v0, &mut v1, y_inv);
            ibutterfly(&mut v2, &mut v3, -y_inv);
            ibutterfly(&mut v0, &mut v2, x_inv);
            ibutterfly(&mut v1, &mut v3, x_inv);
            return Ok(CirclePoly::from_fft_output(
                vec![v0 * n_inv, v1 * n_inv, v2 * n_inv, v3 * n_inv],
                2,
            ));
        }

        let line_twiddles =
            domain_line_twiddles_from_tree(self.domain.half_coset.log_size, &twiddles.itwiddles);
        for (h, t) in circle_twiddles_from_line_twiddles(line_twiddles[0]).enumerate() {
            fft_layer_loop(&mut values, 0, h, t, ibutterfly);
        }
        for (layer, layer_twiddles) in line_twiddles.iter().enumerate() {
            for (h, &t) in layer_twiddles.iter().enumerate() {
                fft_layer_loop(&mut values, layer + 1, h, t, ibutterfly);
            }
        }

        let n_inv = M31::pow2_inverse(log_size);
        values.iter_mut().for_each(|v| *v = *v * n_inv);
        Ok(CirclePoly::from_fft_output(values, log_size))
    }

    /// Interpolates with a freshly computed twiddle tree.
    pub fn interpolate_default(&self) -> PolyResult<CirclePoly> {
        let twiddles = TwiddleTree::for_log_size(self.log_size())?;
        self.interpolate(&twiddles)
    }

    /// `Σ values[i] · weights[i]` for weights from [`barycentric_weights`].
    pub fn barycentric_eval_at_point(&self, weights: &[QM31]) -> PolyResult<QM31> {
        if weights.len() != self.values.len() {
            return Err(PolyError::ShapeMismatch {
                expected: self.values.len(),
                got: weights.len(),
            });
        }
        Ok(self
            .values
            .iter()
            .zip(weights)
            .map(|(value, weight)| *weight * *value)
            .sum())
    }

    /// Evaluates the interpolant at an off-domain point without interpolating.
    pub fn eval_at_point(&self, point: CirclePoint<QM31>) -> PolyResult<QM31> {
        if !self.domain.is_canonic() {
            return Err(PolyError::InvalidDomainLogSize(self.log_size()));
        }
        let weights = barycentric_weights(CanonicCoset::new(self.log_size()), point)?;
        self.barycentric_eval_at_point(&weights)
    }
}
