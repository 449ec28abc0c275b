//! A "constellation" table: star pairs annotated by angular
//! separation, sorted for fast range lookup.

use serde::{Deserialize, Serialize};

use crate::Star;

//tp Pair
/// An unordered pair of stars in some star table, annotated with their
/// angular separation.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Pair {
    /// Separation between `s1` and `s2`, in arcseconds.
    pub p: f32,
    /// Index of the first star in the parent table. On the catalog
    /// side this is, by convention, the brighter of the two.
    pub s1: usize,
    /// Index of the second star in the parent table.
    pub s2: usize,
    /// Position of this pair within its [PairTable], post-sort.
    pub idx: usize,
}

//fp arcsec_separation
/// Great-circle separation between two stars' unit vectors, in
/// arcseconds.
pub fn arcsec_separation(a: &Star, b: &Star) -> f32 {
    a.angle_between(b) * (180.0 * 3600.0 / std::f32::consts::PI)
}

//tp PairTable
/// A pair table sorted by separation ascending, supporting binary
/// search range lookup.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PairTable {
    pairs: Vec<Pair>,
}

impl PairTable {
    //cp from_pairs
    /// Build a [PairTable] from an unsorted list of `(p, s1, s2)`
    /// triples, stable-sorting by separation and assigning dense
    /// `idx` values in sorted order.
    pub fn from_pairs(mut pairs: Vec<(f32, usize, usize)>) -> Self {
        pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).expect("NaN separation"));
        let pairs = pairs
            .into_iter()
            .enumerate()
            .map(|(idx, (p, s1, s2))| Pair { p, s1, s2, idx })
            .collect();
        Self { pairs }
    }

    //mp len
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    //mp is_empty
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    //mp iter
    pub fn iter(&self) -> std::slice::Iter<'_, Pair> {
        self.pairs.iter()
    }

    //mp range
    /// Every pair with `p_lo <= p.p <= p_hi`, as a contiguous slice
    /// (the table is sorted by `p` ascending).
    pub fn range(&self, p_lo: f32, p_hi: f32) -> &[Pair] {
        let lo = self.pairs.partition_point(|pair| pair.p < p_lo);
        let hi = self.pairs.partition_point(|pair| pair.p <= p_hi);
        if hi <= lo {
            &[]
        } else {
            &self.pairs[lo..hi]
        }
    }
}

impl std::ops::Index<usize> for PairTable {
    type Output = Pair;
    fn index(&self, i: usize) -> &Pair {
        &self.pairs[i]
    }
}
