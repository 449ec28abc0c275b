//! End-to-end matcher scenarios: small synthetic catalogs and images
//! exercising identity recovery, noise tolerance, false-star
//! rejection, insufficient input, pair-separation ambiguity, and
//! unrelated-image low confidence.

use star_tracker_core::{
    CatalogBuilder, Config, DetectedStar, ImageBuilder, RawCatalogStar, Star,
};

// A catalog config with narrow-angle stars clustered near +x, so the
// tangent-plane projection stays well-conditioned, plus a generous
// `required_stars` so the catalog builder's density filter never
// rejects a star in these small synthetic catalogs.
fn config() -> Config {
    Config::new(
        /* img_w */ 500,
        /* img_h */ 500,
        /* pixx_tangent */ 0.002,
        /* pixy_tangent */ 0.002,
        /* pixscale */ 4.0,
        /* max_fov */ 0.2,
        /* bright_thresh */ 0.0,
        /* required_stars */ 50,
        /* max_false_stars */ 4,
        /* pos_err_sigma */ 3.0,
        /* match_value */ 1.0,
        /* expected_false_stars */ 0.5,
    )
    .unwrap()
}

fn base_catalog() -> Vec<RawCatalogStar> {
    vec![
        RawCatalogStar { id: 1, ra: 0.0, dec: 0.0, photons: 100.0 },
        RawCatalogStar { id: 2, ra: 0.02, dec: 0.0, photons: 90.0 },
        RawCatalogStar { id: 3, ra: 0.0, dec: 0.02, photons: 80.0 },
        RawCatalogStar { id: 4, ra: 0.02, dec: 0.02, photons: 70.0 },
    ]
}

#[test]
fn identity_rotation_recovers_three_stars() {
    let cfg = config();
    let db = CatalogBuilder::build(base_catalog(), &cfg).unwrap();

    let detections: Vec<DetectedStar> = (0..3)
        .map(|i| {
            let s = &db.stars()[i];
            let (px, py) = cfg.project(s.vector());
            DetectedStar { id: s.id(), px, py, photons: s.photons(), sigma_sq: 0.01 }
        })
        .collect();
    let img = ImageBuilder::build(detections, &cfg);
    let result = star_tracker_core::identify(&db, &img, &cfg);

    assert_eq!(
        result.winner_id_map.iter().filter(|m| m.is_some()).count(),
        3,
        "winner_id_map = {:?}",
        result.winner_id_map
    );
    assert!(result.p_match > 0.99, "p_match = {}", result.p_match);
    assert!(result.rotation.orthogonality_error() < 1e-3);
    assert!(result.rotation.determinant() > 0.0);
    // Boresight should map back to +x within a small angle.
    let row0 = result.rotation.row(0);
    assert!((row0[0] - 1.0).abs() < 1e-2, "row0 = {row0:?}");
}

#[test]
fn rotated_noisy_image_still_identifies_most_stars() {
    let cfg = config();
    let db = CatalogBuilder::build(base_catalog(), &cfg).unwrap();

    // A modest camera rotation plus a small fixed pixel offset
    // standing in for centroiding noise.
    let truth = star_tracker_core::Rotation::from_euler_zyx(0.08, 0.0, 0.0);
    let detections: Vec<DetectedStar> = (0..3)
        .map(|i| {
            let s = &db.stars()[i];
            let cam = truth.apply(s.vector());
            let (px, py) = cfg.project(&cam);
            DetectedStar {
                id: s.id(),
                px: px + 0.3,
                py: py - 0.2,
                photons: s.photons(),
                sigma_sq: 0.25,
            }
        })
        .collect();
    let img = ImageBuilder::build(detections, &cfg);
    let result = star_tracker_core::identify(&db, &img, &cfg);

    assert!(
        result.winner_id_map.iter().filter(|m| m.is_some()).count() >= 2,
        "winner_id_map = {:?}",
        result.winner_id_map
    );
    assert!(result.p_match > 0.5, "p_match = {}", result.p_match);
    // The recovered boresight should be close to the true rotation's.
    let truth_row0 = truth.row(0);
    let got_row0 = result.rotation.row(0);
    let cos_angle = truth_row0[0] * got_row0[0]
        + truth_row0[1] * got_row0[1]
        + truth_row0[2] * got_row0[2];
    assert!(cos_angle > 0.99, "cos_angle = {cos_angle}");
}

#[test]
fn injected_false_star_is_left_unidentified() {
    let cfg = config();
    let db = CatalogBuilder::build(base_catalog(), &cfg).unwrap();

    let mut detections: Vec<DetectedStar> = (0..3)
        .map(|i| {
            let s = &db.stars()[i];
            let (px, py) = cfg.project(s.vector());
            DetectedStar { id: s.id(), px, py, photons: s.photons(), sigma_sq: 0.01 }
        })
        .collect();
    // A false detection far from every catalog direction in this
    // narrow field.
    detections.push(DetectedStar { id: 999, px: 10.0, py: 480.0, photons: 60.0, sigma_sq: 0.01 });

    let img = ImageBuilder::build(detections, &cfg);
    let result = star_tracker_core::identify(&db, &img, &cfg);

    let false_idx = img.stars().stars().iter().position(|s| s.id() == 999).unwrap();
    assert_eq!(result.winner_id_map[false_idx], None);
    assert!(
        result.winner_id_map.iter().filter(|m| m.is_some()).count() >= 3,
        "winner_id_map = {:?}",
        result.winner_id_map
    );
    assert!(result.p_match > 0.5, "p_match = {}", result.p_match);
}

#[test]
fn single_star_image_yields_null_result() {
    let cfg = config();
    let db = CatalogBuilder::build(base_catalog(), &cfg).unwrap();
    let detections = vec![DetectedStar { id: 1, px: 250.0, py: 250.0, photons: 100.0, sigma_sq: 0.01 }];
    let img = ImageBuilder::build(detections, &cfg);
    let result = star_tracker_core::identify(&db, &img, &cfg);
    assert_eq!(result.p_match, 0.0);
    assert!(result.winner_id_map.iter().all(Option::is_none));
}

#[test]
fn a_second_catalog_pair_of_equal_separation_reduces_confidence() {
    // Two catalog pairs, far enough apart that neither's reprojection
    // lands in the other's image cluster, share the exact same
    // angular separation. A two-star image matching that separation
    // can honestly be explained by either pair, so the posterior
    // should be no more confident than when only one such pair
    // exists in the catalog.
    let cfg = config();
    let a = RawCatalogStar { id: 1, ra: 0.0, dec: 0.0, photons: 100.0 };
    let b = RawCatalogStar { id: 2, ra: 0.02, dec: 0.0, photons: 90.0 };
    let c = RawCatalogStar { id: 3, ra: 1.3, dec: 0.0, photons: 100.0 };
    let d = RawCatalogStar { id: 4, ra: 1.32, dec: 0.0, photons: 90.0 };

    let build_detections = || {
        let va = Star::vec_of_ra_de(a.ra, a.dec);
        let vb = Star::vec_of_ra_de(b.ra, b.dec);
        let (pxa, pya) = cfg.project(&va);
        let (pxb, pyb) = cfg.project(&vb);
        vec![
            DetectedStar { id: a.id, px: pxa, py: pya, photons: a.photons, sigma_sq: 0.01 },
            DetectedStar { id: b.id, px: pxb, py: pyb, photons: b.photons, sigma_sq: 0.01 },
        ]
    };

    let db_unambiguous = CatalogBuilder::build(vec![a, b], &cfg).unwrap();
    let img_unambiguous = ImageBuilder::build(build_detections(), &cfg);
    let unambiguous = star_tracker_core::identify(&db_unambiguous, &img_unambiguous, &cfg);

    let db_ambiguous = CatalogBuilder::build(vec![a, b, c, d], &cfg).unwrap();
    let img_ambiguous = ImageBuilder::build(build_detections(), &cfg);
    let ambiguous = star_tracker_core::identify(&db_ambiguous, &img_ambiguous, &cfg);

    assert!(unambiguous.p_match > 0.9, "p_match = {}", unambiguous.p_match);
    assert!(
        ambiguous.p_match <= unambiguous.p_match + 1e-6,
        "ambiguous ({}) should not exceed unambiguous ({})",
        ambiguous.p_match,
        unambiguous.p_match
    );
    assert!(ambiguous.p_match <= 0.7, "p_match = {}", ambiguous.p_match);
}

#[test]
fn unrelated_random_image_has_low_confidence() {
    let cfg = config();
    let db = CatalogBuilder::build(base_catalog(), &cfg).unwrap();

    let detections = vec![
        DetectedStar { id: 101, px: 20.0, py: 30.0, photons: 40.0, sigma_sq: 0.05 },
        DetectedStar { id: 102, px: 460.0, py: 40.0, photons: 35.0, sigma_sq: 0.05 },
        DetectedStar { id: 103, px: 50.0, py: 470.0, photons: 30.0, sigma_sq: 0.05 },
    ];
    let img = ImageBuilder::build(detections, &cfg);
    let result = star_tracker_core::identify(&db, &img, &cfg);
    assert!(result.p_match < 0.5, "p_match = {}", result.p_match);
}
