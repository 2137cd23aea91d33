use thiserror::Error;

///
/// Failure of a shift query. The only way a query can fail is for the point to fall
/// outside the surveyed coverage, which is static, so callers should not retry.
///
#[derive(Error, Copy, Clone, Debug, PartialEq)]
pub enum LookupError
{
    #[error("no OSTN15 coverage at easting {easting}, northing {northing}")]
    NoCoverage { easting: f64, northing: f64 },
}

///
/// Invalid build data detected while constructing a `GridStore`. All of these abort
/// construction; the builder never drops or overwrites a conflicting entry.
///
#[derive(Error, Clone, Debug, PartialEq)]
pub enum BuildError
{
    #[error("duplicate node at grid ({grid_x}, {grid_y})")]
    DuplicateNode { grid_x: i32, grid_y: i32 },

    #[error("node at grid ({grid_x}, {grid_y}) lies outside the {columns}x{rows} lattice")]
    NodeOutsideLattice { grid_x: i32, grid_y: i32, columns: u32, rows: u32 },

    #[error("node at grid ({grid_x}, {grid_y}) has a non-finite shift component")]
    NonFiniteShift { grid_x: i32, grid_y: i32 },

    #[error("point id {0} does not address a lattice node")]
    InvalidPointId(u32),

    #[error("invalid lattice: {0}")]
    InvalidLattice(String),

    #[error("no perfect hash found after {attempts} seeds")]
    HashConstruction { attempts: u32 },
}

/// Errors raised while loading or persisting a `GridStore`.
#[derive(Error, Clone, Debug, PartialEq)]
pub enum StoreError
{
    #[error(transparent)]
    Build(#[from] BuildError),

    #[error("file I/O failed: {0}")]
    FileIO(String),

    #[error("serialization failed: {0}")]
    Serialization(String),

    #[error("deserialization failed: {0}")]
    Deserialization(String),

    #[error("LZ4 decompression failed: {0}")]
    Lz4Decompression(String),

    #[error("corrupt grid store: {0}")]
    Corrupt(String),

    #[error("default grid store not configured, set {0}")]
    NotConfigured(&'static str),
}

impl From<std::io::Error> for StoreError
{
    fn from(value: std::io::Error) -> Self
    {
        StoreError::FileIO(value.to_string())
    }
}
