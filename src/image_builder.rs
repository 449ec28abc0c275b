//! Wraps centroided image detections into a brightness-ranked star
//! table and its pair table.

use log::debug;

use crate::config::Config;
use crate::pair_table::PairTable;
use crate::star::Star;
use crate::star_table::StarTable;

//tp DetectedStar
/// The shape of data the external centroider collaborator yields: a
/// centroided detection, not yet turned into a camera-frame unit
/// vector.
#[derive(Debug, Clone, Copy)]
pub struct DetectedStar {
    /// Detection identifier, meaningful only for diagnostics (the
    /// matcher never assumes it equals a catalog id).
    pub id: u32,
    /// Pixel x coordinate of the centroid.
    pub px: f32,
    /// Pixel y coordinate of the centroid.
    pub py: f32,
    /// Brightness proxy.
    pub photons: f32,
    /// Positional variance of the centroid, in image-plane units.
    pub sigma_sq: f32,
}

//tp ImageDb
/// The per-frame, exclusively-owned image-side bundle: a
/// brightness-sorted star table and its pair table.
#[derive(Debug, Clone)]
pub struct ImageDb {
    pub(crate) stars: StarTable,
    pub(crate) pairs: PairTable,
}

impl ImageDb {
    pub fn stars(&self) -> &StarTable {
        &self.stars
    }

    pub fn pairs(&self) -> &PairTable {
        &self.pairs
    }
}

//tp ImageBuilder
pub struct ImageBuilder;

impl ImageBuilder {
    //cp build
    /// Build an [ImageDb] from raw detections: sort by descending
    /// brightness, keep the brightest `min(len, required_stars +
    /// max_false_stars)`, and emit every pair among those.
    pub fn build(detections: Vec<DetectedStar>, config: &Config) -> ImageDb {
        let stars: Vec<Star> = detections
            .iter()
            .map(|d| {
                let vector = config.pixel_to_vector(d.px, d.py);
                Star::from_detection(d.id, vector, d.photons, d.px, d.py, d.sigma_sq)
            })
            .collect();
        let table = StarTable::sorted_by_photons_desc(stars);

        let n = table.len().min(config.required_stars + config.max_false_stars);
        let mut pairs = Vec::with_capacity(n * n.saturating_sub(1) / 2);
        for i in 0..n {
            for j in (i + 1)..n {
                pairs.push((table.angular_distance_arcsec(i, j), i, j));
            }
        }
        let pair_table = PairTable::from_pairs(pairs);
        debug!(
            "image_builder: {} detections, kept {}, {} pairs",
            table.len(),
            n,
            pair_table.len()
        );

        ImageDb {
            stars: table,
            pairs: pair_table,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config::new(100, 100, 0.01, 0.01, 20.0, 1.0, 0.0, 2, 1, 3.0, 10.0, 0.5).unwrap()
    }

    #[test]
    fn keeps_brightest_n_and_sorts_pairs() {
        let cfg = config();
        let detections = vec![
            DetectedStar { id: 1, px: 10.0, py: 10.0, photons: 5.0, sigma_sq: 0.1 },
            DetectedStar { id: 2, px: 20.0, py: 10.0, photons: 50.0, sigma_sq: 0.1 },
            DetectedStar { id: 3, px: 30.0, py: 10.0, photons: 20.0, sigma_sq: 0.1 },
            DetectedStar { id: 4, px: 40.0, py: 10.0, photons: 10.0, sigma_sq: 0.1 },
        ];
        let img = ImageBuilder::build(detections, &cfg);
        // required_stars(2) + max_false_stars(1) = 3 kept of 4
        assert_eq!(img.stars().len(), 4);
        assert_eq!(img.stars()[0].id(), 2);
        assert_eq!(img.stars()[1].id(), 3);
        // n = 3 => 3 pairs
        assert_eq!(img.pairs().len(), 3);
        let mut last = 0.0_f32;
        for p in img.pairs().iter() {
            assert!(p.p >= last);
            last = p.p;
        }
    }
}
