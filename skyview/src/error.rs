use starfield::CatalogError;
use thiserror::Error;

/// Errors produced while configuring the sky view engine.
///
/// Nothing on the per-frame path returns one of these: projection, hit-testing
/// and artwork mapping report typed outcomes instead.
#[derive(Error, Debug)]
pub enum SkyError {
    /// Configuration validation failure.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Configuration file could not be read.
    #[error("failed to read configuration: {0}")]
    ConfigIo(#[from] std::io::Error),

    /// Configuration file is not valid JSON for [`crate::SkyConfig`].
    #[error("failed to parse configuration: {0}")]
    ConfigParse(#[from] serde_json::Error),

    /// Catalog records were rejected.
    #[error("catalog rejected: {0}")]
    Catalog(#[from] CatalogError),
}
