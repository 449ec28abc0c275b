//! Error taxonomy for the star-tracker core.
//!
//! Per the error-handling design: configuration and catalog-corruption
//! errors are fatal at construction time; everything that can happen
//! per-frame or per-candidate (insufficient stars, degenerate TRIAD
//! geometry, numerical drift) is absorbed into the ordinary return
//! value of the matcher rather than surfaced here.

//tp Error
/// Errors raised while building process-wide state (configuration,
/// catalog) or while persisting/loading a catalog bundle.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A configuration value was out of range (e.g. a nonpositive
    /// `img_w`/`img_h`/`pixscale`/`max_fov`).
    #[error("invalid configuration: {0}")]
    Config(String),

    /// The raw catalog input was corrupt: a duplicate id, or a
    /// direction vector that was not unit-norm within tolerance.
    #[error("catalog corrupt: {0}")]
    CatalogCorrupt(String),

    /// Failed to (de)serialize a persisted catalog bundle.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Failed to read or write a persisted catalog bundle.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
