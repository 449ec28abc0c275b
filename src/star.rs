//a Imports
use geo_nd::Vector;
use serde::{Deserialize, Serialize};

use crate::Vec3;

//a Star
//tp Star
/// A single star observation, on either side of the match: a catalog
/// entry (celestial frame) or a detected image star (camera frame).
///
/// `idx` is the star's dense position within its owning [crate::StarTable]
/// and is kept explicit rather than derived from pointer arithmetic, so
/// that a [crate::StarTable] can be freely moved, cloned or serialized.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct Star {
    /// Stable catalog identifier.
    id: u32,
    /// Position within the owning star table.
    idx: usize,
    /// Unit vector in the owning table's reference frame.
    vector: Vec3,
    /// Brightness proxy (nonnegative; higher is brighter).
    photons: f32,
    /// Pixel x coordinate; meaningless (zero) on the catalog side.
    px: f32,
    /// Pixel y coordinate; meaningless (zero) on the catalog side.
    py: f32,
    /// Positional variance in image-plane units; zero on the catalog side.
    sigma_sq: f32,
}

//ip Star
impl Star {
    //fi vec_of_ra_de
    /// Calculate a unit vector from a right ascension and declination
    /// (both in radians).
    pub fn vec_of_ra_de(ra: f32, de: f32) -> Vec3 {
        let vx = ra.cos() * de.cos();
        let vy = ra.sin() * de.cos();
        let vz = de.sin();
        [vx, vy, vz].into()
    }

    //cp from_ra_de
    /// Create a catalog-side star from right ascension, declination
    /// and brightness. `idx` is assigned later by the owning table.
    pub fn from_ra_de(id: u32, ra: f32, de: f32, photons: f32) -> Self {
        let vector = Self::vec_of_ra_de(ra, de);
        Self {
            id,
            idx: 0,
            vector,
            photons,
            px: 0.0,
            py: 0.0,
            sigma_sq: 0.0,
        }
    }

    //cp from_detection
    /// Create an image-side star from a centroided detection: its
    /// pixel position, brightness, positional variance, and the
    /// camera-frame unit vector the centroider's inverse projection
    /// produced for it.
    pub fn from_detection(
        id: u32,
        vector: Vec3,
        photons: f32,
        px: f32,
        py: f32,
        sigma_sq: f32,
    ) -> Self {
        Self {
            id,
            idx: 0,
            vector,
            photons,
            px,
            py,
            sigma_sq,
        }
    }

    //ap set_idx
    /// Set the dense index of the star within its owning table. Only
    /// the table itself should call this, when it is built or sorted.
    pub(crate) fn set_idx(&mut self, idx: usize) {
        self.idx = idx;
    }

    //ap id
    pub fn id(&self) -> u32 {
        self.id
    }

    //ap idx
    pub fn idx(&self) -> usize {
        self.idx
    }

    //ap vector
    pub fn vector(&self) -> &Vec3 {
        &self.vector
    }

    //ap photons
    pub fn photons(&self) -> f32 {
        self.photons
    }

    //ap px
    pub fn px(&self) -> f32 {
        self.px
    }

    //ap py
    pub fn py(&self) -> f32 {
        self.py
    }

    //ap sigma_sq
    pub fn sigma_sq(&self) -> f32 {
        self.sigma_sq
    }

    //mp is_unit_norm
    /// True if the star's vector is unit-norm within `1e-5`, the
    /// tolerance invariant 1 requires of every star table.
    pub fn is_unit_norm(&self) -> bool {
        (self.vector.length() - 1.0).abs() <= 1e-5
    }

    //mp cos_angle_between
    /// Cosine of the angle between this star and another.
    pub fn cos_angle_between(&self, other: &Star) -> f32 {
        self.vector.dot(&other.vector)
    }

    //mp angle_between
    /// Angle between this star and another, in radians.
    pub fn angle_between(&self, other: &Star) -> f32 {
        self.cos_angle_between(other).clamp(-1.0, 1.0).acos()
    }
}
