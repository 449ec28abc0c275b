/*!
Lost-in-space star identification: a pair-distance catalog index,
a weighted TRIAD attitude solver, and a Bayesian hypothesis ranker
that turns a list of centroided image stars into a recovered
attitude and a per-star identification.

Image processing, catalog ingest, and outward-facing serving/CLI
concerns are not part of this crate; it is a library consumed by
something that does those things.
*/

pub type Vec3 = geo_nd::FArray<f32, 3>;

mod error;
pub use error::Error;

mod config;
pub use config::Config;

mod subcube;
pub use subcube::{Subcube, SubcubeMask};

mod star;
pub use star::Star;

mod star_table;
pub use star_table::{PixelMask, StarTable};

mod angular_index;
pub use angular_index::{AngularIndex, ConeSearch};

mod pair_table;
pub use pair_table::{arcsec_separation, Pair, PairTable};

mod catalog_builder;
pub use catalog_builder::{CatalogBuilder, CatalogDb, CatalogSource, RawCatalogStar};

mod image_builder;
pub use image_builder::{DetectedStar, ImageBuilder, ImageDb};

mod triad;
pub use triad::{weighted_triad, DegenerateGeometry, Rotation};

mod scorer;
pub use scorer::{score_candidate, Candidate};

mod matcher;
pub use matcher::{identify, MatchResult};
