//! Radix-2 butterflies and layer loops for the circle FFT.
//!
//! Evaluation runs the line layers from the top down and finishes with the
//! circle layer, whose twiddles are y-coordinates. Interpolation runs the
//! same layers in the opposite order with inverse twiddles. All arrays are in
//! bit-reversed order.

mod twiddles;

use core::ops::{Add, Mul, Sub};

pub use twiddles::{
    circle_twiddles_from_line_twiddles, domain_line_twiddles_from_tree, slow_precompute_twiddles,
    TwiddleCache, TwiddleTree,
};

use crate::field::M31;

/// `(v0, v1) <- (v0 + v1·t, v0 - v1·t)`.
#[inline]
pub fn butterfly<F>(v0: &mut F, v1: &mut F, twid: M31)
where
    F: Copy + Add<Output = F> + Sub<Output = F> + Mul<M31, Output = F>,
{
    let tmp = *v1 * twid;
    *v1 = *v0 - tmp;
    *v0 = *v0 + tmp;
}

/// Inverse of [`butterfly`] up to a factor of two: `(v0, v1) <- (v0 + v1, (v0 - v1)·it)`.
#[inline]
pub fn ibutterfly<F>(v0: &mut F, v1: &mut F, itwid: M31)
where
    F: Copy + Add<Output = F> + Sub<Output = F> + Mul<M31, Output = F>,
{
    let tmp = *v0;
    *v0 = tmp + *v1;
    *v1 = (tmp - *v1) * itwid;
}

/// Applies `butterfly_fn` to the `h`-th block of layer `i`.
///
/// The block pairs index `(h << (i + 1)) + l` with the index `2^i` above it,
/// for `l` in `0..2^i`.
pub fn fft_layer_loop<F>(
    values: &mut [F],
    i: usize,
    h: usize,
    twid: M31,
    butterfly_fn: impl Fn(&mut F, &mut F, M31),
) where
    F: Copy,
{
    for l in 0..(1 << i) {
        let idx0 = (h << (i + 1)) + l;
        let idx1 = idx0 + (1 << i);
        let (mut val0, mut val1) = (values[idx0], values[idx1]);
        butterfly_fn(&mut val0, &mut val1, twid);
        values[idx0] = val0;
        values[idx1] = val1;
    }
}
