use serde::{Deserialize, Serialize};

use crate::errors::BuildError;

/// OSTN15 node spacing, in metres.
pub const OSTN15_CELL_SIZE: f64 = 1000.0;
/// Nodes per row, covering eastings 0..=700 km.
pub const OSTN15_COLUMNS: u32 = 701;
/// Nodes per column, covering northings 0..=1250 km.
pub const OSTN15_ROWS: u32 = 1251;

///
/// The regular sampling lattice a correction grid is defined on. Grid indices run from
/// `(0, 0)` at the origin to `(columns - 1, rows - 1)`; node `(x, y)` sits at
/// `origin + (x, y) * cell_size`.
///
/// Every node is addressed by a 1-based point id `x + y * columns + 1`, which for the
/// default lattice is the `Point_ID` column of the OSTN15 distribution.
///
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Lattice
{
    pub origin_easting: f64,
    pub origin_northing: f64,
    pub cell_size: f64,
    pub columns: u32,
    pub rows: u32,
}

impl Default for Lattice
{
    fn default() -> Self
    {
        Self::OSTN15
    }
}

///
/// A lattice cell selected for a query point: the lower-left node and the fractional
/// offsets `(t, u)` of the point inside the cell, each in `[0, 1)`.
///
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Cell
{
    pub grid_x: i32,
    pub grid_y: i32,
    pub t: f64,
    pub u: f64,
}

impl Cell
{
    ///
    /// Corner indices in the order `[v00, v10, v01, v11]`. On an axis where the offset
    /// is exactly zero the upper corner carries no weight, so it collapses onto the
    /// lower one and a point on the last grid line still has a complete cell.
    ///
    #[inline]
    pub fn corners(&self) -> [(i32, i32); 4]
    {
        let x1 = if self.t == 0.0 { self.grid_x } else { self.grid_x + 1 };
        let y1 = if self.u == 0.0 { self.grid_y } else { self.grid_y + 1 };
        [(self.grid_x, self.grid_y), (x1, self.grid_y), (self.grid_x, y1), (x1, y1)]
    }
}

impl Lattice
{
    pub const OSTN15: Lattice = Lattice {
        origin_easting: 0.0,
        origin_northing: 0.0,
        cell_size: OSTN15_CELL_SIZE,
        columns: OSTN15_COLUMNS,
        rows: OSTN15_ROWS,
    };

    pub fn new(origin_easting: f64, origin_northing: f64, cell_size: f64, columns: u32, rows: u32) -> Result<Self, BuildError>
    {
        let lattice = Self { origin_easting, origin_northing, cell_size, columns, rows };
        lattice.validate()?;
        Ok(lattice)
    }

    ///
    /// Checks the lattice is usable: finite origin, positive spacing, and a point id space
    /// that fits in `u32` (id 0 is reserved as "no node").
    ///
    pub fn validate(&self) -> Result<(), BuildError>
    {
        if !self.origin_easting.is_finite() || !self.origin_northing.is_finite()
        {
            return Err(BuildError::InvalidLattice("origin must be finite".to_string()));
        }
        if !self.cell_size.is_finite() || self.cell_size <= 0.0
        {
            return Err(BuildError::InvalidLattice(format!("cell size {} must be positive", self.cell_size)));
        }
        if self.columns == 0 || self.rows == 0
        {
            return Err(BuildError::InvalidLattice("lattice must have at least one row and column".to_string()));
        }
        if self.columns > i32::MAX as u32 || self.rows > i32::MAX as u32
            || self.columns as u64 * self.rows as u64 >= u32::MAX as u64
        {
            return Err(BuildError::InvalidLattice(format!("{}x{} nodes overflow the point id space", self.columns, self.rows)));
        }
        Ok(())
    }

    /// Number of nodes in the full rectangular lattice.
    #[inline]
    pub fn node_count(&self) -> usize
    {
        self.columns as usize * self.rows as usize
    }

    #[inline]
    pub fn contains(&self, grid_x: i32, grid_y: i32) -> bool
    {
        grid_x >= 0 && grid_y >= 0 && (grid_x as u32) < self.columns && (grid_y as u32) < self.rows
    }

    #[inline]
    pub fn point_id(&self, grid_x: i32, grid_y: i32) -> Option<u32>
    {
        if self.contains(grid_x, grid_y)
        {
            Some(grid_x as u32 + grid_y as u32 * self.columns + 1)
        }
        else
        {
            None
        }
    }

    /// Inverse of `point_id`.
    #[inline]
    pub fn grid_index(&self, point_id: u32) -> Option<(i32, i32)>
    {
        if point_id == 0 || point_id as usize > self.node_count()
        {
            return None;
        }
        let offset = point_id - 1;
        Some(((offset % self.columns) as i32, (offset / self.columns) as i32))
    }

    /// Easting and northing of a node, in metres.
    #[inline]
    pub fn node_position(&self, grid_x: i32, grid_y: i32) -> (f64, f64)
    {
        (self.origin_easting + grid_x as f64 * self.cell_size, self.origin_northing + grid_y as f64 * self.cell_size)
    }

    ///
    /// Selects the cell containing `(easting, northing)`. Points on a grid line always
    /// belong to the cell whose lower-left corner lies on that line. Returns `None` for
    /// non-finite input or points outside the lattice.
    ///
    #[inline]
    pub fn locate(&self, easting: f64, northing: f64) -> Option<Cell>
    {
        let x = (easting - self.origin_easting) / self.cell_size;
        let y = (northing - self.origin_northing) / self.cell_size;
        if !x.is_finite() || !y.is_finite()
        {
            return None;
        }
        let gx = x.floor();
        let gy = y.floor();
        if gx < 0.0 || gy < 0.0 || gx > self.columns.saturating_sub(1) as f64 || gy > self.rows.saturating_sub(1) as f64
        {
            return None;
        }
        Some(Cell { grid_x: gx as i32, grid_y: gy as i32, t: x - gx, u: y - gy })
    }
}
