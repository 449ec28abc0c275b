//! Cone search over a star table's unit vectors.
//!
//! A cone search returns an owned result set rather than reusing
//! shared mutable scratch, which makes nested/reentrant/concurrent
//! searches safe for free.

use geo_nd::Vector;

use crate::{Star, Subcube};

//tp AngularIndex
/// A bucket index of a star table's unit vectors, keyed by [Subcube],
/// supporting cone searches.
///
/// Built once from a star table's final (post-sort) star list; the
/// index is immutable thereafter, so any number of [AngularIndex::cone_search]
/// calls may be interleaved or run from multiple threads against
/// `&AngularIndex`.
#[derive(Debug, Clone)]
pub struct AngularIndex {
    buckets: Vec<Vec<usize>>,
}

impl AngularIndex {
    //cp build
    /// Build an index over `stars`, bucketing each by the [Subcube] its
    /// unit vector falls in.
    pub fn build(stars: &[Star]) -> Self {
        let mut buckets = vec![Vec::new(); Subcube::NUM_SUBCUBES];
        for (i, s) in stars.iter().enumerate() {
            let sc = Subcube::of_vector(s.vector());
            buckets[sc.as_usize()].push(i);
        }
        Self { buckets }
    }

    //mp cone_search
    /// Return every star index whose unit vector lies within
    /// `half_angle` (radians) of `axis`, and whose brightness is at
    /// least `brightness_cutoff`.
    pub fn cone_search(
        &self,
        stars: &[Star],
        axis: &crate::Vec3,
        half_angle: f32,
        brightness_cutoff: f32,
    ) -> ConeSearch {
        let min_cos = half_angle.cos();
        let rings = Subcube::rings_for_angle(half_angle);
        let center = Subcube::of_vector(axis);
        let mut found = Vec::new();
        for sc in center.iter_range(rings) {
            for &i in &self.buckets[sc.as_usize()] {
                let s = &stars[i];
                if s.photons() < brightness_cutoff {
                    continue;
                }
                if axis.dot(s.vector()) >= min_cos {
                    found.push(i);
                }
            }
        }
        ConeSearch { found }
    }
}

//tp ConeSearch
/// The owned result of a [AngularIndex::cone_search]. Dropping it (or
/// calling [ConeSearch::undo] explicitly) is the entire "undo"
/// contract: since the index holds no mutable scratch, there is
/// nothing else to restore.
#[derive(Debug, Clone)]
pub struct ConeSearch {
    found: Vec<usize>,
}

impl ConeSearch {
    //mp stars
    /// The star indices found by the search.
    pub fn stars(&self) -> &[usize] {
        &self.found
    }

    //mp undo
    /// Release the search's working set. Named to match the spec's
    /// cone-search/undo contract; under the owned-result design this
    /// is exactly `drop(self)`.
    pub fn undo(self) {}
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Star;

    fn star(id: u32, ra: f32, de: f32, photons: f32) -> Star {
        Star::from_ra_de(id, ra, de, photons)
    }

    #[test]
    fn finds_nearby_and_excludes_far() {
        let stars = vec![
            star(1, 0.0, 0.0, 10.0),
            star(2, 0.01, 0.0, 10.0),
            star(3, std::f32::consts::PI, 0.0, 10.0),
        ];
        let index = AngularIndex::build(&stars);
        let axis = Star::vec_of_ra_de(0.0, 0.0);
        let result = index.cone_search(&stars, &axis, 0.1, 0.0);
        let mut ids: Vec<u32> = result.stars().iter().map(|&i| stars[i].id()).collect();
        ids.sort();
        assert_eq!(ids, vec![1, 2]);
        result.undo();
    }

    #[test]
    fn brightness_cutoff_excludes_dim_stars() {
        let stars = vec![star(1, 0.0, 0.0, 1.0), star(2, 0.0, 0.0, 100.0)];
        let index = AngularIndex::build(&stars);
        let axis = Star::vec_of_ra_de(0.0, 0.0);
        let result = index.cone_search(&stars, &axis, 0.01, 50.0);
        assert_eq!(result.stars(), &[1]);
    }

    #[test]
    fn reentrant_nested_search_is_stable() {
        let stars = vec![
            star(1, 0.0, 0.0, 10.0),
            star(2, 0.5, 0.3, 10.0),
            star(3, -0.5, -0.3, 10.0),
        ];
        let index = AngularIndex::build(&stars);
        for i in 0..stars.len() {
            let outer = index.cone_search(&stars, stars[i].vector(), 2.0, 0.0);
            for &j in outer.stars() {
                let inner = index.cone_search(&stars, stars[j].vector(), 2.0, 0.0);
                assert!(!inner.stars().is_empty());
                inner.undo();
            }
            outer.undo();
        }
    }
}
