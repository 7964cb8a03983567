use serde::{Deserialize, Serialize};

use super::domain::CircleDomain;
use super::{PolyError, PolyResult};
use crate::field::{Field, M31, QM31, SECURE_EXTENSION_DEGREE};

/// A secure-field column stored as four base-field coordinate columns.
///
/// Committing the coordinates separately keeps every Merkle leaf in the
/// base field.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecureColumnByCoords {
    pub columns: [Vec<M31>; SECURE_EXTENSION_DEGREE],
}

impl SecureColumnByCoords {
    pub fn zeros(len: usize) -> Self {
        Self {
            columns: std::array::from_fn(|_| vec![M31::ZERO; len]),
        }
    }

    pub fn len(&self) -> usize {
        self.columns[0].len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns[0].is_empty()
    }

    pub fn at(&self, index: usize) -> QM31 {
        QM31::from_m31_array(std::array::from_fn(|i| self.columns[i][index]))
    }

    pub fn set(&mut self, index: usize, value: QM31) {
        for (column, coord) in self.columns.iter_mut().zip(value.to_m31_array()) {
            column[index] = coord;
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = QM31> + '_ {
        (0..self.len()).map(|i| self.at(i))
    }

    pub fn to_vec(&self) -> Vec<QM31> {
        self.iter().collect()
    }
}

impl FromIterator<QM31> for SecureColumnByCoords {
    fn from_iter<I: IntoIterator<Item = QM31>>(iter: I) -> Self {
        let mut columns: [Vec<M31>; SECURE_EXTENSION_DEGREE] = Default::default();
        for value in iter {
            for (column, coord) in columns.iter_mut().zip(value.to_m31_array()) {
                column.push(coord);
            }
        }
        Self { columns }
    }
}

/// A secure-field column over a circle domain, in bit-reversed order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SecureEvaluation {
    pub domain: CircleDomain,
    pub values: SecureColumnByCoords,
}

impl SecureEvaluation {
    pub fn new(domain: CircleDomain, values: SecureColumnByCoords) -> PolyResult<Self> {
        if values.len() != domain.size() {
            return Err(PolyError::ShapeMismatch {
                expected: domain.size(),
                got: values.len(),
            });
        }
        Ok(Self { domain, values })
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn is_zero(&self) -> bool {
        self.values.iter().all(|v| v.is_zero())
    }
}
