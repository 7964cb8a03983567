//! The circle group `x^2 + y^2 = 1` over the field tower.
//!
//! Points of order `2^31` over [`M31`](crate::field::M31) index every
//! evaluation domain; points over the secure field serve as out-of-domain
//! samples.

mod coset;
mod index;
mod point;

pub use coset::{Coset, CosetIterator};
pub use index::CirclePointIndex;
pub use point::{CirclePoint, M31_CIRCLE_GEN, M31_CIRCLE_LOG_ORDER};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::{Field, FieldExpOps, M31, QM31};

    #[test]
    fn trivial_subgroup_generator_is_reduced() {
        assert_eq!(CirclePointIndex::subgroup_gen(0), CirclePointIndex::zero());
        assert_eq!(CirclePointIndex::subgroup_gen(2) * 4, CirclePointIndex::subgroup_gen(0));
        assert_eq!(Coset::subgroup(0).step_size, CirclePointIndex::zero());
    }

    #[test]
    fn generator_has_order_two_pow_31() {
        let g = M31_CIRCLE_GEN;
        assert_eq!(g.x.square() + g.y.square(), M31::ONE);
        assert_eq!(g.repeated_double(M31_CIRCLE_LOG_ORDER), CirclePoint::zero());
        assert_ne!(
            g.repeated_double(M31_CIRCLE_LOG_ORDER - 1),
            CirclePoint::zero()
        );
    }

    #[test]
    fn index_arithmetic_matches_group_law() {
        let a = CirclePointIndex(12345);
        let b = CirclePointIndex(987654321);
        assert_eq!((a + b).to_point(), a.to_point() + b.to_point());
        assert_eq!((a - b).to_point(), a.to_point() - b.to_point());
        assert_eq!((-a).to_point(), a.to_point().conjugate());
        assert_eq!((a * 3).to_point(), a.to_point().mul(3));
        assert_eq!(CirclePointIndex::zero().to_point(), CirclePoint::zero());
    }

    #[test]
    fn subgroup_generator_order() {
        let g = CirclePointIndex::subgroup_gen(5).to_point();
        assert_eq!(g.repeated_double(5), CirclePoint::zero());
        assert_ne!(g.repeated_double(4), CirclePoint::zero());
        assert_eq!(g.repeated_double(4), CirclePoint::zero().antipode());
    }

    #[test]
    fn double_x_matches_point_doubling() {
        let p = CirclePointIndex(777).to_point();
        assert_eq!(CirclePoint::double_x(p.x), p.double().x);
    }

    #[test]
    fn coset_iteration_matches_indexing() {
        let coset = Coset::new(CirclePointIndex(5), 4);
        let points: Vec<_> = coset.iter().collect();
        assert_eq!(points.len(), 16);
        for (i, point) in points.iter().enumerate() {
            assert_eq!(*point, coset.at(i));
        }
        assert_eq!(coset.double().size(), 8);
        assert!(coset.double().is_doubling_of(&coset));
        assert_eq!(coset.double().at(3), coset.at(3).double());
    }

    #[test]
    fn odds_and_half_odds_are_disjoint_from_subgroup() {
        let subgroup: Vec<_> = Coset::subgroup(3).iter().collect();
        assert!(Coset::odds(3).iter().all(|p| !subgroup.contains(&p)));
        let odds: Vec<_> = Coset::odds(4).iter().collect();
        assert!(Coset::half_odds(3).iter().all(|p| odds.contains(&p)));
    }

    #[test]
    fn secure_points_embed_base_points() {
        let p = CirclePointIndex(31337).to_point();
        let ext = p.into_ef::<QM31>();
        assert_eq!(ext.x, QM31::from(p.x));
        assert_eq!(ext.x.square() + ext.y.square(), QM31::ONE);
        assert!(!ext.x.is_zero());
    }
}
