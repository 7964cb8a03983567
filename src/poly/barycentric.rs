use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::trace;

use super::canonic::CanonicCoset;
use super::{PolyError, PolyResult};
use crate::circle::CirclePoint;
use crate::field::{batch_inverse, Field, FieldExpOps, M31, QM31};
use crate::utils::bit_reverse_index;

/// Barycentric weights of `coset` at `point`, in bit-reversed domain order.
///
/// For a domain point `s`, with `V(p) = π^{n-1}(p.x)` the domain vanishing
/// polynomial and `h = p - s`, the weight is
/// `V(p) · (1 + h.x) / (S_s · h.y)` where `S_s = -2 · V'(s.x) · s.y` and
/// `V'(x) = Π_{j < n-1} 4 · π^j(x)`.
pub fn barycentric_weights(coset: CanonicCoset, point: CirclePoint<QM31>) -> PolyResult<Vec<QM31>> {
    let log_size = coset.log_size();
    let domain = coset.circle_domain();

    let mut vanishing = point.x;
    for _ in 1..log_size {
        vanishing = CirclePoint::double_x(vanishing);
    }
    if vanishing.is_zero() {
        return Err(PolyError::PointOnDomain);
    }

    let four = M31::from(4u32);
    let minus_two = -M31::from(2u32);
    let size = domain.size();
    let mut numerators = Vec::with_capacity(size);
    let mut denominators = Vec::with_capacity(size);
    for i in 0..size {
        let s = domain.at(bit_reverse_index(i, log_size));
        let mut derivative = M31::ONE;
        let mut x = s.x;
        for _ in 1..log_size {
            derivative *= four * x;
            x = CirclePoint::double_x(x);
        }
        let shift = point - s.into_ef::<QM31>();
        numerators.push(vanishing * (shift.x + QM31::ONE));
        denominators.push(shift.y * (minus_two * derivative * s.y));
    }

    let inverses = batch_inverse(&denominators)?;
    Ok(numerators
        .into_iter()
        .zip(inverses)
        .map(|(num, inv)| num * inv)
        .collect())
}

/// Session memo of barycentric weights keyed by `(log_size, point)`.
#[derive(Debug, Default)]
pub struct BarycentricCache {
    weights: Mutex<HashMap<(u32, CirclePoint<QM31>), Arc<Vec<QM31>>>>,
}

impl BarycentricCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the weights for `(log_size, point)`, computing them once.
    pub fn get(&self, log_size: u32, point: CirclePoint<QM31>) -> PolyResult<Arc<Vec<QM31>>> {
        let mut weights = self.weights.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(cached) = weights.get(&(log_size, point)) {
            return Ok(Arc::clone(cached));
        }
        trace!(log_size, "computing barycentric weights");
        let computed = Arc::new(barycentric_weights(CanonicCoset::try_new(log_size)?, point)?);
        weights.insert((log_size, point), Arc::clone(&computed));
        Ok(computed)
    }

    pub fn len(&self) -> usize {
        self.weights
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
