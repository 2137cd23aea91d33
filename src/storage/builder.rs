use rustc_hash::FxHashMap;

use crate::{errors::BuildError, lattice::Lattice, shift::{GridNode, Shift}};

use super::{grid_store::GridStore, perfect_hash::HashConfig};

///
/// Collects nodes for a `GridStore`, rejecting anything that would make the store
/// inconsistent: duplicates, nodes off the lattice and non-finite shifts. A rejected node
/// leaves the builder unchanged, but callers are expected to abort the build.
///
/// ```
/// use ostn15::{storage::builder::GridStoreBuilder, shift::{GridNode, Shift}};
///
/// let mut builder = GridStoreBuilder::new();
/// builder.insert(GridNode::new(651, 313, (102.787, -78.242, 44.236))).unwrap();
/// builder.insert_point_id(220066, (102.791, -78.240, 44.229)).unwrap();
/// let store = builder.build().unwrap();
/// assert_eq!(store.lookup(652, 313), Some(Shift::new(102.791, -78.240, 44.229)));
/// ```
///
#[derive(Clone, Debug, Default)]
pub struct GridStoreBuilder
{
    lattice: Lattice,
    config: HashConfig,
    nodes: FxHashMap<u32, Shift>,
}

impl GridStoreBuilder
{
    /// Builder for the OSTN15 lattice.
    pub fn new() -> Self
    {
        Self::default()
    }

    pub fn with_lattice(lattice: Lattice) -> Result<Self, BuildError>
    {
        lattice.validate()?;
        Ok(Self { lattice, ..Default::default() })
    }

    pub fn hash_config(mut self, config: HashConfig) -> Self
    {
        self.config = config;
        self
    }

    pub fn lattice(&self) -> &Lattice
    {
        &self.lattice
    }

    pub fn len(&self) -> usize
    {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool
    {
        self.nodes.is_empty()
    }

    pub fn insert(&mut self, node: GridNode) -> Result<&mut Self, BuildError>
    {
        let GridNode { grid_x, grid_y, shift } = node;
        let point_id = self.lattice.point_id(grid_x, grid_y).ok_or(BuildError::NodeOutsideLattice {
            grid_x,
            grid_y,
            columns: self.lattice.columns,
            rows: self.lattice.rows,
        })?;
        if !shift.is_finite()
        {
            return Err(BuildError::NonFiniteShift { grid_x, grid_y });
        }
        if self.nodes.contains_key(&point_id)
        {
            return Err(BuildError::DuplicateNode { grid_x, grid_y });
        }
        self.nodes.insert(point_id, shift);
        Ok(self)
    }

    /// Inserts a node addressed by its point id (`Point_ID` in the OSTN15 distribution).
    pub fn insert_point_id(&mut self, point_id: u32, shift: impl Into<Shift>) -> Result<&mut Self, BuildError>
    {
        let (grid_x, grid_y) = self.lattice.grid_index(point_id).ok_or(BuildError::InvalidPointId(point_id))?;
        self.insert(GridNode { grid_x, grid_y, shift: shift.into() })
    }

    pub fn extend<I: IntoIterator<Item = GridNode>>(&mut self, nodes: I) -> Result<&mut Self, BuildError>
    {
        for node in nodes
        {
            self.insert(node)?;
        }
        Ok(self)
    }

    pub fn build(self) -> Result<GridStore, BuildError>
    {
        tracing::debug!(nodes = self.nodes.len(), keys_per_bucket = self.config.keys_per_bucket, load_factor = self.config.load_factor, "building grid store");
        GridStore::from_entries(self.lattice, self.nodes.into_iter().collect(), &self.config)
    }
}
