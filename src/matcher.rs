//! The hypothesis ranker: enumerate pair correspondences between the
//! catalog and an image, score every candidate rotation, and report
//! the winning identification with a Bayesian confidence.
//!
//! Modeled as a single pure function rather than an explicit state
//! machine: no intermediate state is ever observed by a caller.

use log::{debug, trace};

use crate::catalog_builder::CatalogDb;
use crate::image_builder::ImageDb;
use crate::scorer::{score_candidate, Candidate};
use crate::triad::{weighted_triad, Rotation};
use crate::Config;

//tp MatchResult
/// The outcome of one [identify] call.
#[derive(Debug, Clone)]
pub struct MatchResult {
    /// Rotation from catalog (celestial) frame to camera frame.
    pub rotation: Rotation,
    /// For each image star idx, the catalog id it was identified as,
    /// or `None`.
    pub winner_id_map: Vec<Option<u32>>,
    /// Per-image-star score of the winning candidate.
    pub winner_scores: Vec<f32>,
    /// Bayesian posterior that the reported identification is
    /// correct, in `[0, 1]`.
    pub p_match: f32,
}

impl MatchResult {
    fn null(n_img: usize) -> Self {
        Self {
            rotation: Rotation::identity(),
            winner_id_map: vec![None; n_img],
            winner_scores: vec![f32::NEG_INFINITY; n_img],
            p_match: 0.0,
        }
    }
}

struct Trial {
    candidate: Candidate,
    rotation: Rotation,
}

//fp identify
/// Identify the stars in `img` against the catalog `db`, per `config`.
pub fn identify(db: &CatalogDb, img: &ImageDb, config: &Config) -> MatchResult {
    let n_img = img.stars().len();
    if db.stars().len() < 2 || n_img < 2 {
        debug!("matcher: insufficient stars (catalog={}, image={})", db.stars().len(), n_img);
        return MatchResult::null(n_img);
    }

    let pixel_mask = img
        .stars()
        .build_pixel_mask(config.img_w, config.img_h, db.stars().max_variance());

    let mut trials: Vec<Trial> = Vec::with_capacity(img.pairs().len() * 8);

    for q in img.pairs().iter() {
        let sigma_sq_1 = img.stars()[q.s1].sigma_sq();
        let sigma_sq_2 = img.stars()[q.s2].sigma_sq();
        let delta = config.pos_err_sigma
            * config.pixscale
            * (sigma_sq_1 + sigma_sq_2 + 2.0 * db.stars().max_variance()).sqrt();
        let catalog_pairs = db.pairs().range(q.p - delta, q.p + delta);

        for r in catalog_pairs {
            for &(img_id1, img_id2) in &[(q.s1, q.s2), (q.s2, q.s1)] {
                let w_a = db.stars()[r.s1].vector();
                let w_b = db.stars()[r.s2].vector();
                let v_a = img.stars()[img_id1].vector();
                let v_b = img.stars()[img_id2].vector();
                let rotation = match weighted_triad(
                    w_a,
                    w_b,
                    v_a,
                    v_b,
                    0.0,
                    0.0,
                    img.stars()[img_id1].sigma_sq(),
                    img.stars()[img_id2].sigma_sq(),
                ) {
                    Ok(r) => r,
                    Err(_) => continue,
                };
                let candidate = score_candidate(
                    &rotation,
                    db,
                    img.stars(),
                    &pixel_mask,
                    config,
                    r.s1,
                    r.s2,
                    img_id1,
                    img_id2,
                );
                trace!("matcher: candidate total={}", candidate.total);
                trials.push(Trial { candidate, rotation });
            }
        }
    }

    if trials.is_empty() {
        debug!("matcher: no candidates generated");
        return MatchResult::null(n_img);
    }

    trials.sort_by(|a, b| {
        b.candidate
            .total
            .partial_cmp(&a.candidate.total)
            .expect("NaN candidate score")
    });

    let best = &trials[0];
    let s_star = best.candidate.total;
    let img_id1_best = best.candidate.img_id1;
    let img_id2_best = best.candidate.img_id2;
    let db_id1_best = best.candidate.db_id1;
    let db_id2_best = best.candidate.db_id2;

    let mut z = 1.0_f64;
    for t in &trials[1..] {
        let c = &t.candidate;
        let disjoint = c.id_map[img_id1_best] != Some(db_id1_best)
            && c.id_map[img_id2_best] != Some(db_id2_best);
        if disjoint {
            z += ((c.total - s_star) as f64).exp();
        }
    }
    let p_match = (1.0 / z) as f32;

    let winner_id_map = best
        .candidate
        .id_map
        .iter()
        .map(|m| m.map(|o| db.stars()[o].id()))
        .collect();
    let winner_scores = best.candidate.scores.clone();
    let rotation = best.rotation;

    debug!("matcher: winner total={s_star}, p_match={p_match}");

    MatchResult {
        rotation,
        winner_id_map,
        winner_scores,
        p_match,
    }
}
