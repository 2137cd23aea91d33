//! OSTN15 grid-shift lookup.
//!
//! Holds the OSTN15 correction nodes in an immutable, perfect-hashed [`GridStore`] and
//! bilinearly interpolates them with a [`ShiftInterpolator`] to give the `(dx, dy, dz)`
//! shift, in metres, for any ETRS89 easting/northing inside coverage. Points whose cell
//! has a missing corner fail with [`LookupError::NoCoverage`] rather than being guessed.
//!
//! Stores are built once from a node table with [`GridStoreBuilder`], saved in a compact
//! LZ4-compressed format, and loaded read-only at startup (see [`default_store()`]).

pub mod default_store;
pub mod errors;
pub mod interpolation;
pub mod lattice;
pub mod serialization;
pub mod shift;
pub mod storage;

pub use default_store::{default_interpolator, default_store};
pub use errors::{BuildError, LookupError, StoreError};
pub use interpolation::ShiftInterpolator;
pub use lattice::{Cell, Lattice};
pub use shift::{GridNode, GridReference, Shift};
pub use storage::{builder::GridStoreBuilder, grid_store::GridStore, perfect_hash::HashConfig};
