use serde::{Deserialize, Serialize};

///
/// An OSTN15 correction triple, in metres. Adding `dx` and `dy` to an ETRS89 easting and
/// northing gives the OSGB36 easting and northing; subtracting `dz` from an ETRS89
/// ellipsoidal height gives the OSGM15 orthometric height.
///
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Shift
{
    pub dx: f64,
    pub dy: f64,
    pub dz: f64,
}

impl Shift
{
    #[inline]
    pub const fn new(dx: f64, dy: f64, dz: f64) -> Self
    {
        Self { dx, dy, dz }
    }

    #[inline]
    pub fn is_finite(&self) -> bool
    {
        self.dx.is_finite() && self.dy.is_finite() && self.dz.is_finite()
    }

    ///
    /// Bilinear blend of the four corners `[v00, v10, v01, v11]` at offsets `(t, u)`,
    /// applied to each component independently.
    ///
    #[inline]
    pub fn bilinear(corners: &[Shift; 4], t: f64, u: f64) -> Shift
    {
        let w00 = (1.0 - t) * (1.0 - u);
        let w10 = t * (1.0 - u);
        let w01 = (1.0 - t) * u;
        let w11 = t * u;
        let blend = |f: fn(&Shift) -> f64| w00 * f(&corners[0]) + w10 * f(&corners[1]) + w01 * f(&corners[2]) + w11 * f(&corners[3]);
        Shift { dx: blend(|s: &Shift| s.dx), dy: blend(|s: &Shift| s.dy), dz: blend(|s: &Shift| s.dz) }
    }
}

impl From<(f64, f64, f64)> for Shift
{
    fn from(value: (f64, f64, f64)) -> Self
    {
        Shift { dx: value.0, dy: value.1, dz: value.2 }
    }
}

impl From<Shift> for (f64, f64, f64)
{
    fn from(value: Shift) -> Self
    {
        (value.dx, value.dy, value.dz)
    }
}

/// A query point: easting and northing in metres.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct GridReference
{
    pub easting: f64,
    pub northing: f64,
}

impl GridReference
{
    #[inline]
    pub const fn new(easting: f64, northing: f64) -> Self
    {
        Self { easting, northing }
    }
}

impl From<(f64, f64)> for GridReference
{
    fn from(value: (f64, f64)) -> Self
    {
        GridReference { easting: value.0, northing: value.1 }
    }
}

impl From<GridReference> for (f64, f64)
{
    fn from(value: GridReference) -> Self
    {
        (value.easting, value.northing)
    }
}

/// One sample of the correction surface, addressed by lattice index.
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridNode
{
    pub grid_x: i32,
    pub grid_y: i32,
    pub shift: Shift,
}

impl GridNode
{
    #[inline]
    pub fn new(grid_x: i32, grid_y: i32, shift: impl Into<Shift>) -> Self
    {
        Self { grid_x, grid_y, shift: shift.into() }
    }
}
