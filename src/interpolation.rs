use rayon::iter::{IndexedParallelIterator, IntoParallelRefIterator, IntoParallelRefMutIterator, ParallelIterator};

use crate::{errors::LookupError, lattice::Cell, shift::{GridReference, Shift}, storage::grid_store::GridStore};

///
/// Bilinear interpolation of OSTN15 shifts over a borrowed `GridStore`. Holds no state of
/// its own, so it is `Copy` and can be shared freely between threads.
///
/// ```
/// use ostn15::{interpolation::ShiftInterpolator, lattice::Lattice, shift::GridNode, storage::grid_store::GridStore};
///
/// let store = GridStore::from_nodes(Lattice::OSTN15, [
///     GridNode::new(651, 313, (102.787, -78.242, 44.236)),
///     GridNode::new(652, 313, (102.791, -78.240, 44.229)),
///     GridNode::new(651, 314, (102.784, -78.251, 44.241)),
///     GridNode::new(652, 314, (102.789, -78.249, 44.233)),
/// ]).unwrap();
/// let interpolator = ShiftInterpolator::new(&store);
/// let shift = interpolator.get_shift(651307.003, 313255.686).unwrap();
/// assert!((shift.dx - 102.787).abs() < 1e-2);
/// ```
///
#[derive(Copy, Clone, Debug)]
pub struct ShiftInterpolator<'a>
{
    store: &'a GridStore,
}

impl<'a> ShiftInterpolator<'a>
{
    pub fn new(store: &'a GridStore) -> Self
    {
        Self { store }
    }

    pub fn store(&self) -> &'a GridStore
    {
        self.store
    }

    /// Cell containing the point, or `None` off the lattice.
    #[inline]
    pub fn locate(&self, easting: f64, northing: f64) -> Option<Cell>
    {
        self.store.lattice().locate(easting, northing)
    }

    ///
    /// Interpolated shift at `(easting, northing)`, in metres. Fails with `NoCoverage` if
    /// the point is off the lattice or any corner of its cell is missing; partial cells are
    /// never blended.
    ///
    #[inline]
    pub fn get_shift(&self, easting: f64, northing: f64) -> Result<Shift, LookupError>
    {
        let no_coverage = LookupError::NoCoverage { easting, northing };
        let cell = self.locate(easting, northing).ok_or(no_coverage)?;
        let [c00, c10, c01, c11] = cell.corners();
        let corners = [
            self.store.lookup(c00.0, c00.1).ok_or(no_coverage)?,
            self.store.lookup(c10.0, c10.1).ok_or(no_coverage)?,
            self.store.lookup(c01.0, c01.1).ok_or(no_coverage)?,
            self.store.lookup(c11.0, c11.1).ok_or(no_coverage)?,
        ];
        Ok(Shift::bilinear(&corners, cell.t, cell.u))
    }

    #[inline]
    pub fn get_shift_at(&self, reference: GridReference) -> Result<Shift, LookupError>
    {
        self.get_shift(reference.easting, reference.northing)
    }

    ///
    /// Raw shift of lattice node `(grid_x, grid_y)`, without interpolation. This is the
    /// kilometre-square lookup for the default lattice.
    ///
    #[inline]
    pub fn node_shift(&self, grid_x: i32, grid_y: i32) -> Result<Shift, LookupError>
    {
        self.store.lookup(grid_x, grid_y).ok_or_else(||
        {
            let (easting, northing) = self.store.lattice().node_position(grid_x, grid_y);
            LookupError::NoCoverage { easting, northing }
        })
    }

    ///
    /// Evaluates a batch of points in parallel. Results are in input order.
    ///
    pub fn get_shifts(&self, references: &[GridReference]) -> Vec<Result<Shift, LookupError>>
    {
        let mut results = vec![Ok(Shift::default()); references.len()];
        references.par_iter().zip(results.par_iter_mut()).for_each(
            |(reference, result)|
            {
                *result = self.get_shift_at(*reference);
            }
        );
        results
    }
}
