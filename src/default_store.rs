//! Process-wide store, loaded once on first use and shared read-only afterwards.

use std::ffi::OsString;

use static_init::dynamic;

use crate::{errors::StoreError, interpolation::ShiftInterpolator, storage::grid_store::GridStore};

/// Environment variable naming the saved store to load.
pub const GRID_PATH_VAR: &str = "OSTN15_GRID_PATH";

#[dynamic(lazy)]
static DEFAULT_STORE: Result<GridStore, StoreError> = load(std::env::var_os(GRID_PATH_VAR));

fn load(path: Option<OsString>) -> Result<GridStore, StoreError>
{
    let Some(path) = path.filter(|p| !p.is_empty()) else
    {
        tracing::warn!(var = GRID_PATH_VAR, "no default OSTN15 grid store configured");
        return Err(StoreError::NotConfigured(GRID_PATH_VAR));
    };
    GridStore::open(&path).inspect_err(|e|
    {
        tracing::warn!(path = ?path, error = %e, "failed to load default OSTN15 grid store");
    })
}

///
/// The store named by `OSTN15_GRID_PATH`. The file is read on the first call; later
/// calls return the same store, or the same error.
///
pub fn default_store() -> Result<&'static GridStore, StoreError>
{
    let store: &'static Result<GridStore, StoreError> = &DEFAULT_STORE;
    store.as_ref().map_err(Clone::clone)
}

pub fn default_interpolator() -> Result<ShiftInterpolator<'static>, StoreError>
{
    default_store().map(ShiftInterpolator::new)
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::{lattice::Lattice, shift::{GridNode, Shift}};

    #[test]
    fn unset_or_empty_path_is_not_configured()
    {
        assert_eq!(load(None).unwrap_err(), StoreError::NotConfigured(GRID_PATH_VAR));
        assert_eq!(load(Some(OsString::new())).unwrap_err(), StoreError::NotConfigured(GRID_PATH_VAR));
    }

    #[test]
    fn loads_a_saved_store()
    {
        let store = GridStore::from_nodes(Lattice::OSTN15, [GridNode::new(651, 313, (102.787, -78.242, 44.236))]).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("default.grid");
        store.save(&path).unwrap();

        let loaded = load(Some(path.into_os_string())).unwrap();
        assert_eq!(loaded.lookup(651, 313), Some(Shift::new(102.787, -78.242, 44.236)));

        let missing = load(Some(dir.path().join("nope.grid").into_os_string())).unwrap_err();
        assert!(matches!(missing, StoreError::FileIO(_)));
    }
}
