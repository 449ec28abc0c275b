//! The weighted TRIAD attitude solver: two star correspondences in,
//! a rotation matrix out.
//!
//! Two independent TRIAD estimates (one anchored on each star of the
//! pair) are fused in Euler-angle space, weighted by each star's
//! combined catalog/image variance.

use geo_nd::Vector;

use crate::Vec3;

const DEGENERACY_EPS: f32 = 1e-6;

//tp DegenerateGeometry
/// The two reference (or two body) vectors were (anti)parallel, so no
/// triad basis could be formed. Not a crate-wide [crate::Error]: this
/// is a per-candidate condition the caller discards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DegenerateGeometry;

impl std::fmt::Display for DegenerateGeometry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "degenerate TRIAD geometry: reference or body vectors nearly parallel")
    }
}

impl std::error::Error for DegenerateGeometry {}

//tp Rotation
/// A 3×3 rotation matrix, row-major.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rotation {
    m: [[f32; 3]; 3],
}

impl Rotation {
    //cp identity
    pub fn identity() -> Self {
        Self {
            m: [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]],
        }
    }

    //cp from_euler_zyx
    /// Build `R = Rz(yaw) * Ry(pitch) * Rx(roll)`.
    pub fn from_euler_zyx(yaw: f32, pitch: f32, roll: f32) -> Self {
        let (sy, cy) = yaw.sin_cos();
        let (sp, cp) = pitch.sin_cos();
        let (sr, cr) = roll.sin_cos();
        Self {
            m: [
                [cy * cp, cy * sp * sr - sy * cr, cy * sp * cr + sy * sr],
                [sy * cp, sy * sp * sr + cy * cr, sy * sp * cr - cy * sr],
                [-sp, cp * sr, cp * cr],
            ],
        }
    }

    //mp to_euler_zyx
    /// Recover `(yaw, pitch, roll)` such that
    /// [Rotation::from_euler_zyx] reconstructs this matrix (assuming
    /// it actually is a ZYX rotation).
    pub fn to_euler_zyx(&self) -> (f32, f32, f32) {
        let yaw = self.m[1][0].atan2(self.m[0][0]);
        let pitch = (-self.m[2][0]).atan2(self.m[0][0].hypot(self.m[1][0]));
        let roll = self.m[2][1].atan2(self.m[2][2]);
        (yaw, pitch, roll)
    }

    //mp row
    /// Row `i` (0-indexed) of the matrix, as a unit vector when `R` is
    /// a proper rotation.
    pub fn row(&self, i: usize) -> Vec3 {
        [self.m[i][0], self.m[i][1], self.m[i][2]].into()
    }

    //mp apply
    pub fn apply(&self, v: &Vec3) -> Vec3 {
        let x = self.m[0][0] * v[0] + self.m[0][1] * v[1] + self.m[0][2] * v[2];
        let y = self.m[1][0] * v[0] + self.m[1][1] * v[1] + self.m[1][2] * v[2];
        let z = self.m[2][0] * v[0] + self.m[2][1] * v[1] + self.m[2][2] * v[2];
        [x, y, z].into()
    }

    //mp transpose
    pub fn transpose(&self) -> Self {
        let m = self.m;
        Self {
            m: [
                [m[0][0], m[1][0], m[2][0]],
                [m[0][1], m[1][1], m[2][1]],
                [m[0][2], m[1][2], m[2][2]],
            ],
        }
    }

    //mp determinant
    pub fn determinant(&self) -> f32 {
        let m = &self.m;
        m[0][0] * (m[1][1] * m[2][2] - m[1][2] * m[2][1])
            - m[0][1] * (m[1][0] * m[2][2] - m[1][2] * m[2][0])
            + m[0][2] * (m[1][0] * m[2][1] - m[1][1] * m[2][0])
    }

    //mp orthogonality_error
    /// `‖R Rᵀ − I‖∞`, the quantity invariant 4 bounds.
    pub fn orthogonality_error(&self) -> f32 {
        let t = self.transpose();
        let mut worst = 0.0_f32;
        for i in 0..3 {
            for j in 0..3 {
                let mut s = 0.0;
                for k in 0..3 {
                    s += self.m[i][k] * t.m[k][j];
                }
                let expected = if i == j { 1.0 } else { 0.0 };
                worst = worst.max((s - expected).abs());
            }
        }
        worst
    }
}

fn triad_basis(primary: &Vec3, secondary: &Vec3) -> Option<[Vec3; 3]> {
    let third = primary.cross_product(secondary);
    if third.length() < DEGENERACY_EPS {
        return None;
    }
    let third = third.normalize();
    Some([*primary, *secondary, third])
}

fn negate(v: &Vec3) -> Vec3 {
    [-v[0], -v[1], -v[2]].into()
}

fn rotation_from_bases(reference: &[Vec3; 3], body: &[Vec3; 3]) -> Rotation {
    let mut m = [[0.0_f32; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            let mut s = 0.0;
            for k in 0..3 {
                s += body[k][i] * reference[k][j];
            }
            m[i][j] = s;
        }
    }
    Rotation { m }
}

//fp weighted_triad
/// Two star correspondences `(w_a ↔ v_a)`, `(w_b ↔ v_b)` (catalog
/// frame ↔ camera frame), with each star's combined positional
/// variance, produce a fused rotation.
///
/// Returns [DegenerateGeometry] if `w_a`/`w_b` or `v_a`/`v_b` are
/// (anti)parallel.
#[allow(clippy::too_many_arguments)]
pub fn weighted_triad(
    w_a: &Vec3,
    w_b: &Vec3,
    v_a: &Vec3,
    v_b: &Vec3,
    sigma_sq_w_a: f32,
    sigma_sq_w_b: f32,
    sigma_sq_v_a: f32,
    sigma_sq_v_b: f32,
) -> Result<Rotation, DegenerateGeometry> {
    let wc = w_a.cross_product(w_b);
    let vc = v_a.cross_product(v_b);
    if wc.length() < DEGENERACY_EPS || vc.length() < DEGENERACY_EPS {
        return Err(DegenerateGeometry);
    }
    let wc = wc.normalize();
    let vc = vc.normalize();

    let wc_neg = negate(&wc);
    let vc_neg = negate(&vc);

    let reference_a = triad_basis(w_a, &wc).ok_or(DegenerateGeometry)?;
    let body_a = triad_basis(v_a, &vc).ok_or(DegenerateGeometry)?;
    let r1 = rotation_from_bases(&reference_a, &body_a);

    let reference_b = triad_basis(w_b, &wc_neg).ok_or(DegenerateGeometry)?;
    let body_b = triad_basis(v_b, &vc_neg).ok_or(DegenerateGeometry)?;
    let r2 = rotation_from_bases(&reference_b, &body_b);

    let weight_a = 1.0 / (sigma_sq_w_a + sigma_sq_v_a).max(1e-12);
    let weight_b = 1.0 / (sigma_sq_w_b + sigma_sq_v_b).max(1e-12);
    let sum = weight_a + weight_b;
    let (wa, wb) = (weight_a / sum, weight_b / sum);

    let (yaw1, pitch1, roll1) = r1.to_euler_zyx();
    let (yaw2, pitch2, roll2) = r2.to_euler_zyx();

    let fuse = |a: f32, b: f32| -> f32 {
        let s = wa * a.sin() + wb * b.sin();
        let c = wa * a.cos() + wb * b.cos();
        s.atan2(c)
    };

    let yaw = fuse(yaw1, yaw2);
    let pitch = fuse(pitch1, pitch2);
    let roll = fuse(roll1, roll2);

    Ok(Rotation::from_euler_zyx(yaw, pitch, roll))
}
