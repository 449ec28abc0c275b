//! Process-wide, read-only configuration.
//!
//! A [Config] is built once per process (or once per camera, for a
//! multi-camera system) and passed by reference into every function
//! that needs it. It is never mutated after construction and never
//! stored as global state.

use crate::{Error, Vec3};

//tp Config
/// Immutable configuration shared by the catalog builder, image
/// builder, scorer and matcher.
#[derive(Debug, Clone, Copy, serde::Serialize, serde::Deserialize)]
pub struct Config {
    /// Sensor width in pixels.
    pub img_w: usize,
    /// Sensor height in pixels.
    pub img_h: usize,
    /// Tangent of the half horizontal field of view.
    pub pixx_tangent: f32,
    /// Tangent of the half vertical field of view.
    pub pixy_tangent: f32,
    /// Arcseconds per pixel.
    pub pixscale: f32,
    /// Diagonal field of view, in radians; catalog neighborhoods use half of this.
    pub max_fov: f32,
    /// Photon cutoff below which a catalog star is not considered visible.
    pub bright_thresh: f32,
    /// Target per-cell catalog density used by the catalog builder.
    pub required_stars: usize,
    /// Allowance of spurious image detections used to size image pair tables.
    pub max_false_stars: usize,
    /// Tolerance multiplier (in sigmas) for pair-distance matching.
    pub pos_err_sigma: f32,
    /// Scoring threshold inside the Gaussian log-likelihood.
    pub match_value: f32,
    /// Prior expected number of false detections per frame.
    pub expected_false_stars: f32,
}

impl Config {
    //cp new
    /// Construct a [Config], validating that geometric parameters are
    /// sane. Nonpositive `img_w`, `img_h`, `pixscale` or `max_fov` is a
    /// configuration error: fatal, per the error-handling design.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        img_w: usize,
        img_h: usize,
        pixx_tangent: f32,
        pixy_tangent: f32,
        pixscale: f32,
        max_fov: f32,
        bright_thresh: f32,
        required_stars: usize,
        max_false_stars: usize,
        pos_err_sigma: f32,
        match_value: f32,
        expected_false_stars: f32,
    ) -> Result<Self, Error> {
        if img_w == 0 {
            return Err(Error::Config("img_w must be positive".into()));
        }
        if img_h == 0 {
            return Err(Error::Config("img_h must be positive".into()));
        }
        if pixscale <= 0.0 {
            return Err(Error::Config("pixscale must be positive".into()));
        }
        if max_fov <= 0.0 {
            return Err(Error::Config("max_fov must be positive".into()));
        }
        Ok(Self {
            img_w,
            img_h,
            pixx_tangent,
            pixy_tangent,
            pixscale,
            max_fov,
            bright_thresh,
            required_stars,
            max_false_stars,
            pos_err_sigma,
            match_value,
            expected_false_stars,
        })
    }

    //mp half_fov
    /// Half of the diagonal field of view, in radians.
    pub fn half_fov(&self) -> f32 {
        self.max_fov / 2.0
    }

    //mp catalog_neighborhood_radius
    /// Radius used by the catalog builder to query a star's local
    /// crowd: the diameter of the widest field, i.e. `max_fov`.
    pub fn catalog_neighborhood_radius(&self) -> f32 {
        self.max_fov
    }

    //mp pixel_to_vector
    /// Invert the pixel-plane projection used by the scorer, turning a
    /// detected centroid into a camera-frame unit vector.
    ///
    /// This is the inverse of the projection in [Config::project]: it
    /// assumes the camera looks down `+x`, with `y` to the right and
    /// `z` up, matching the scorer's convention that `R`'s first row is
    /// the catalog direction mapped to `+x`.
    pub fn pixel_to_vector(&self, px: f32, py: f32) -> Vec3 {
        let x_off = px - (self.img_w as f32) / 2.0;
        let y_off = py - (self.img_h as f32) / 2.0;
        let y = x_off * self.pixx_tangent;
        let z = y_off * self.pixy_tangent;
        let v: Vec3 = [1.0, y, z].into();
        use geo_nd::Vector;
        v.normalize()
    }

    //mp project
    /// Project a camera-frame vector `(x,y,z)` (already rotated into
    /// the camera frame) onto the image plane, returning pixel
    /// coordinates without clipping or the mask lookup the scorer
    /// layers on top.
    pub fn project(&self, v: &Vec3) -> (f32, f32) {
        let px = (v[1] / v[0]) / self.pixx_tangent + (self.img_w as f32) / 2.0;
        let py = (v[2] / v[0]) / self.pixy_tangent + (self.img_h as f32) / 2.0;
        (px, py)
    }
}
