//! Candidate scoring: reproject the catalog through a candidate
//! rotation and grade how well it explains the observed image.

use crate::catalog_builder::CatalogDb;
use crate::config::Config;
use crate::star_table::{PixelMask, StarTable};
use crate::triad::Rotation;

//tp Candidate
/// The result of scoring one `(catalog pair, image pair, orientation)`
/// trial.
#[derive(Debug, Clone)]
pub struct Candidate {
    /// Catalog idx of the pair's first star.
    pub db_id1: usize,
    /// Catalog idx of the pair's second star.
    pub db_id2: usize,
    /// Image idx of the pair's first star.
    pub img_id1: usize,
    /// Image idx of the pair's second star.
    pub img_id2: usize,
    /// For each image star idx, the catalog idx this candidate's
    /// rotation maps it to, or `None`.
    pub id_map: Vec<Option<usize>>,
    /// Per-image-star log-likelihood contribution; `0.0` where no
    /// catalog star beat the no-match baseline (`id_map[n]` is
    /// `None`).
    pub scores: Vec<f32>,
    /// Sum of `scores` over every image star, plus the background
    /// prior term; the quantity candidates are ranked by.
    pub total: f32,
}

fn clip_to_border(v: f32, len: usize) -> Option<isize> {
    let max_i = len as isize;
    let vi = v as isize;
    if vi < -1 || vi > max_i {
        return None;
    }
    Some(vi.clamp(0, max_i - 1))
}

//fp score_candidate
/// Score `rotation` (mapping catalog directions into the camera
/// frame) against `img`'s detections, using `db`'s angular index for
/// the reprojection cone search and `pixel_mask` for O(1) reverse
/// lookup.
#[allow(clippy::too_many_arguments)]
pub fn score_candidate(
    rotation: &Rotation,
    db: &CatalogDb,
    img: &StarTable,
    pixel_mask: &PixelMask,
    config: &Config,
    db_id1: usize,
    db_id2: usize,
    img_id1: usize,
    img_id2: usize,
) -> Candidate {
    let mut id_map = vec![None; img.len()];
    let mut scores = vec![0.0_f32; img.len()];

    let axis = rotation.row(0);
    let found = db
        .index()
        .cone_search(db.stars().stars(), &axis, config.half_fov(), config.bright_thresh);

    for &o in found.stars() {
        let u_o = db.stars()[o].vector();
        let cam = rotation.apply(u_o);
        if cam[0] <= 0.0 {
            continue;
        }
        let px = (cam[1] / cam[0]) / config.pixx_tangent + (config.img_w as f32) / 2.0;
        let py = (cam[2] / cam[0]) / config.pixy_tangent + (config.img_h as f32) / 2.0;
        let (Some(x), Some(y)) = (clip_to_border(px, config.img_w), clip_to_border(py, config.img_h)) else {
            continue;
        };
        let Some(n) = pixel_mask.get(x, y) else {
            continue;
        };

        let star_n = &img[n];
        let sigma_sq = star_n.sigma_sq() + db.stars().max_variance();
        let max_d2 = -sigma_sq * (sigma_sq.ln() + config.match_value);
        let dx = px - star_n.px();
        let dy = py - star_n.py();
        let d2 = dx * dx + dy * dy;
        let score = (max_d2 - d2) / (2.0 * sigma_sq);
        if score > scores[n] {
            scores[n] = score;
            id_map[n] = Some(o);
        }
    }
    found.undo();

    let prior = (config.expected_false_stars / (config.img_w * config.img_h) as f32).ln()
        * 2.0
        * (img.len() as f32);
    let total = scores.iter().sum::<f32>() + prior;

    Candidate {
        db_id1,
        db_id2,
        img_id1,
        img_id2,
        id_map,
        scores,
        total,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog_builder::{CatalogBuilder, RawCatalogStar};
    use crate::star::Star;

    fn config() -> Config {
        Config::new(100, 100, 0.01, 0.01, 20.0, 1.0, 0.0, 10, 4, 3.0, 1.0, 0.5).unwrap()
    }

    #[test]
    fn matched_star_wins_and_total_exceeds_background_only() {
        let cfg = config();
        let raw = vec![
            RawCatalogStar { id: 1, ra: 0.0, dec: 0.0, photons: 100.0 },
            RawCatalogStar { id: 2, ra: 0.05, dec: 0.0, photons: 90.0 },
            RawCatalogStar { id: 3, ra: 0.0, dec: 0.05, photons: 80.0 },
        ];
        let db = CatalogBuilder::build(raw, &cfg).unwrap();
        let rotation = Rotation::identity();

        let image_stars: Vec<Star> = (0..db.stars().len())
            .map(|i| {
                let s = &db.stars()[i];
                let (px, py) = cfg.project(s.vector());
                Star::from_detection(s.id(), *s.vector(), s.photons(), px, py, 0.1)
            })
            .collect();
        let img = StarTable::sorted_by_photons_desc(image_stars);
        let mask = img.build_pixel_mask(cfg.img_w, cfg.img_h, db.stars().max_variance());

        let candidate = score_candidate(&rotation, &db, &img, &mask, &cfg, 0, 1, 0, 1);
        assert!(candidate.id_map.iter().any(Option::is_some));

        let background = score_candidate(
            &Rotation::from_euler_zyx(std::f32::consts::PI, 0.0, 0.0),
            &db,
            &img,
            &mask,
            &cfg,
            0,
            1,
            0,
            1,
        );
        assert!(candidate.total > background.total);
    }

    #[test]
    fn each_image_star_wins_at_most_one_catalog_star() {
        let cfg = config();
        let raw = vec![
            RawCatalogStar { id: 1, ra: 0.0, dec: 0.0, photons: 100.0 },
            RawCatalogStar { id: 2, ra: 0.001, dec: 0.0, photons: 99.0 },
        ];
        let db = CatalogBuilder::build(raw, &cfg).unwrap();
        let image_stars = vec![Star::from_detection(1, *db.stars()[0].vector(), 100.0, 50.0, 50.0, 0.1)];
        let img = StarTable::new(image_stars);
        let mask = img.build_pixel_mask(cfg.img_w, cfg.img_h, db.stars().max_variance());
        let candidate = score_candidate(&Rotation::identity(), &db, &img, &mask, &cfg, 0, 0, 0, 0);
        assert!(candidate.id_map.iter().filter(|m| m.is_some()).count() <= img.len());
    }
}
