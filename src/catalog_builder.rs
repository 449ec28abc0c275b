//! Builds the catalog-side star table and pair table: a
//! density-uniform sample of the raw catalog, so no field of view is
//! starved and no cluster dominates, plus every brighter-neighbor pair
//! within the widest field of view.

use std::collections::{HashMap, HashSet};

use log::debug;
#[cfg(feature = "postcard")]
use serde::{Deserialize, Serialize};

use crate::angular_index::AngularIndex;
use crate::pair_table::PairTable;
use crate::star_table::StarTable;
use crate::{Config, Error, Star};

//tp RawCatalogStar
/// The shape of data the external catalog-source collaborator yields:
/// this crate defines the interface, not a loader for any particular
/// survey format.
#[derive(Debug, Clone, Copy)]
pub struct RawCatalogStar {
    /// Stable catalog identifier (e.g. a Hipparcos number).
    pub id: u32,
    /// Right ascension, radians.
    pub ra: f32,
    /// Declination, radians.
    pub dec: f32,
    /// Brightness proxy (nonnegative; higher is brighter).
    pub photons: f32,
}

//tp CatalogSource
/// A source of raw catalog stars. Out of core: this crate never
/// implements one (no network download, no survey-file parser) but
/// accepts anything that does.
pub trait CatalogSource {
    fn raw_stars(&self) -> Vec<RawCatalogStar>;
}

//tp CatalogDb
/// The immutable, shareable catalog-side bundle: a density-uniform
/// star table, its angular index, and its pair table. Built once per
/// process and shared read-only across all matches.
#[derive(Debug, Clone)]
pub struct CatalogDb {
    pub(crate) stars: StarTable,
    pub(crate) index: AngularIndex,
    pub(crate) pairs: PairTable,
}

impl CatalogDb {
    pub fn stars(&self) -> &StarTable {
        &self.stars
    }

    pub fn pairs(&self) -> &PairTable {
        &self.pairs
    }

    pub fn index(&self) -> &AngularIndex {
        &self.index
    }

    //fp save
    /// Serialize the star table and pair table to a `postcard` byte
    /// buffer. The angular index is not part of the wire format: it is
    /// rebuilt from the star table on load, the way the donor crate's
    /// `Catalog` recomputes its derived subcube data after a reload
    /// rather than persisting it.
    #[cfg(feature = "postcard")]
    pub fn save(&self) -> Result<Vec<u8>, Error> {
        let bundle = CatalogBundle {
            stars: self.stars.clone(),
            pairs: self.pairs.clone(),
        };
        postcard::to_allocvec(&bundle).map_err(|e| Error::Serde(e.to_string()))
    }

    //fp load
    /// Rebuild a [CatalogDb] from bytes produced by [CatalogDb::save].
    #[cfg(feature = "postcard")]
    pub fn load(bytes: &[u8]) -> Result<CatalogDb, Error> {
        let bundle: CatalogBundle =
            postcard::from_bytes(bytes).map_err(|e| Error::Serde(e.to_string()))?;
        let index = AngularIndex::build(bundle.stars.stars());
        Ok(CatalogDb {
            stars: bundle.stars,
            index,
            pairs: bundle.pairs,
        })
    }

    //fp save_to_file
    /// Write [CatalogDb::save]'s bytes to `path`.
    #[cfg(feature = "postcard")]
    pub fn save_to_file(&self, path: &std::path::Path) -> Result<(), Error> {
        std::fs::write(path, self.save()?)?;
        Ok(())
    }

    //fp load_from_file
    /// Read and rebuild a [CatalogDb] previously written by
    /// [CatalogDb::save_to_file].
    #[cfg(feature = "postcard")]
    pub fn load_from_file(path: &std::path::Path) -> Result<CatalogDb, Error> {
        Self::load(&std::fs::read(path)?)
    }
}

#[cfg(feature = "postcard")]
#[derive(Serialize, Deserialize)]
struct CatalogBundle {
    stars: StarTable,
    pairs: PairTable,
}

//tp CatalogBuilder
/// Stateless builder for [CatalogDb]: a density-uniform sample of the
/// raw catalog followed by a full brighter-neighbor pair sweep.
pub struct CatalogBuilder;

impl CatalogBuilder {
    //cp build
    /// Build a [CatalogDb] from raw catalog stars.
    ///
    /// Fatal (`Error::CatalogCorrupt`) on a duplicate id or a
    /// direction that fails to normalize to unit length: catalog
    /// corruption is detected at build time, not tolerated downstream.
    pub fn build(raw_stars: Vec<RawCatalogStar>, config: &Config) -> Result<CatalogDb, Error> {
        Self::build_from_source_stars(raw_stars, config)
    }

    //cp build_from_source
    /// Build a [CatalogDb] from an external [CatalogSource].
    pub fn build_from_source(
        source: &dyn CatalogSource,
        config: &Config,
    ) -> Result<CatalogDb, Error> {
        Self::build_from_source_stars(source.raw_stars(), config)
    }

    fn build_from_source_stars(
        raw_stars: Vec<RawCatalogStar>,
        config: &Config,
    ) -> Result<CatalogDb, Error> {
        let mut seen_ids = HashSet::with_capacity(raw_stars.len());
        for r in &raw_stars {
            if !seen_ids.insert(r.id) {
                return Err(Error::CatalogCorrupt(format!("duplicate id {}", r.id)));
            }
        }

        // Brightest-first so the density pass below is a simple greedy
        // "keep unless already crowded" sweep.
        let mut stars: Vec<Star> = raw_stars
            .iter()
            .map(|r| Star::from_ra_de(r.id, r.ra, r.dec, r.photons))
            .collect();
        stars.sort_by(|a, b| {
            b.photons()
                .partial_cmp(&a.photons())
                .expect("NaN photon count")
        });
        for (i, s) in stars.iter_mut().enumerate() {
            s.set_idx(i);
        }
        if !stars.iter().all(Star::is_unit_norm) {
            return Err(Error::CatalogCorrupt(
                "star direction failed to normalize to unit length".into(),
            ));
        }
        debug!("catalog_builder: loaded {} raw stars", stars.len());

        let radius = config.catalog_neighborhood_radius();
        let scan_index = AngularIndex::build(&stars);
        let mut kept = vec![false; stars.len()];
        for i in 0..stars.len() {
            if stars[i].photons() < config.bright_thresh {
                continue;
            }
            let crowd = scan_index.cone_search(&stars, stars[i].vector(), radius, 0.0);
            let crowd_count = crowd.stars().iter().filter(|&&j| j != i && kept[j]).count();
            crowd.undo();
            if crowd_count < config.required_stars {
                kept[i] = true;
            }
        }

        let final_stars: Vec<Star> = (0..stars.len()).filter(|&i| kept[i]).map(|i| stars[i]).collect();
        debug!(
            "catalog_builder: retained {} of {} stars after density filter",
            final_stars.len(),
            stars.len()
        );
        let table = StarTable::new(final_stars);
        let index = AngularIndex::build(table.stars());

        let mut pair_set: HashMap<(usize, usize), f32> = HashMap::new();
        for i in 0..table.len() {
            let neighbors = index.cone_search(table.stars(), table[i].vector(), radius, 0.0);
            for &j in neighbors.stars() {
                if i == j {
                    continue;
                }
                let (s1, s2) = if i <= j { (i, j) } else { (j, i) };
                pair_set
                    .entry((s1, s2))
                    .or_insert_with(|| table.angular_distance_arcsec(s1, s2));
            }
            neighbors.undo();
        }
        let pairs: Vec<(f32, usize, usize)> = pair_set
            .into_iter()
            .map(|((s1, s2), p)| (p, s1, s2))
            .collect();
        let pair_table = PairTable::from_pairs(pairs);
        debug!("catalog_builder: built {} pairs", pair_table.len());

        Ok(CatalogDb {
            stars: table,
            index,
            pairs: pair_table,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config::new(
            512, 512, 0.5, 0.5, 206265.0 / 3600.0, 0.6, 0.0, 10, 8, 3.0, 10.0, 1.0,
        )
        .unwrap()
    }

    fn grid_catalog(n: usize) -> Vec<RawCatalogStar> {
        let mut stars = Vec::new();
        for i in 0..n {
            let ra = (i as f32) * 0.01;
            let dec = 0.0;
            stars.push(RawCatalogStar {
                id: i as u32,
                ra,
                dec,
                photons: 100.0 - i as f32,
            });
        }
        stars
    }

    #[test]
    fn rejects_duplicate_ids() {
        let mut raw = grid_catalog(3);
        raw[1].id = raw[0].id;
        let err = CatalogBuilder::build(raw, &config()).unwrap_err();
        assert!(matches!(err, Error::CatalogCorrupt(_)));
    }

    #[test]
    fn pair_table_has_no_self_pairs_and_is_sorted() {
        let raw = grid_catalog(20);
        let db = CatalogBuilder::build(raw, &config()).unwrap();
        assert!(!db.pairs().is_empty());
        let mut last = 0.0_f32;
        for p in db.pairs().iter() {
            assert_ne!(p.s1, p.s2);
            assert!(p.p >= last);
            last = p.p;
        }
    }

    #[test]
    fn density_filter_caps_crowding() {
        // Many stars in a tight cluster plus one isolated star; the
        // cluster should not all survive given required_stars = 10.
        let mut raw = grid_catalog(0);
        for i in 0..50 {
            raw.push(RawCatalogStar {
                id: i,
                ra: (i as f32) * 0.0001,
                dec: 0.0,
                photons: 100.0 - i as f32,
            });
        }
        raw.push(RawCatalogStar {
            id: 1000,
            ra: 3.0,
            dec: 0.0,
            photons: 50.0,
        });
        let db = CatalogBuilder::build(raw, &config()).unwrap();
        // At most 10 of the 50 clustered stars survive, plus the isolated one.
        assert!(db.stars().len() <= 11, "kept {} stars", db.stars().len());
    }

    #[test]
    #[cfg(feature = "postcard")]
    fn save_and_load_round_trips_stars_and_pairs() {
        let cfg = config();
        let db = CatalogBuilder::build(grid_catalog(10), &cfg).unwrap();
        let bytes = db.save().unwrap();
        let reloaded = CatalogDb::load(&bytes).unwrap();

        assert_eq!(reloaded.stars().len(), db.stars().len());
        assert_eq!(reloaded.pairs().len(), db.pairs().len());
        for i in 0..db.stars().len() {
            assert_eq!(reloaded.stars()[i].id(), db.stars()[i].id());
        }

        // The angular index isn't persisted; confirm it was rebuilt
        // correctly by checking it still finds the same neighbors.
        let radius = cfg.catalog_neighborhood_radius();
        let original = db
            .index()
            .cone_search(db.stars().stars(), db.stars()[0].vector(), radius, 0.0);
        let after_reload = reloaded.index().cone_search(
            reloaded.stars().stars(),
            reloaded.stars()[0].vector(),
            radius,
            0.0,
        );
        assert_eq!(original.stars().len(), after_reload.stars().len());
        original.undo();
        after_reload.undo();
    }
}
