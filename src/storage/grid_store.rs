use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::{errors::{BuildError, StoreError}, lattice::Lattice, serialization::{deserialize, serialize, SerializationFormat}, shift::{GridNode, Shift}};

use super::perfect_hash::{HashConfig, PerfectHash};

/// Version tag written into every saved store.
pub const STORE_FORMAT_VERSION: u32 = 1;

/// Point ids are 1-based, so 0 marks an unused slot.
const EMPTY_SLOT: u32 = 0;

///
/// Immutable store of every covered lattice node. Nodes are addressed through a perfect
/// hash over their point ids; slot `i` holds the id of the node living there (or
/// `EMPTY_SLOT`) alongside its shift, so a lookup is one hash, one comparison and one load.
///
/// Cells outside coverage are simply absent. The store never fabricates a value for them.
///
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct GridStore
{
    format_version: u32,
    lattice: Lattice,
    hash: PerfectHash,
    keys: Vec<u32>,
    shifts: Vec<Shift>,
    len: usize,
}

impl GridStore
{
    ///
    /// Builds a store from `(point id, shift)` entries. The ids must be distinct and valid
    /// for `lattice`, which the builder guarantees.
    ///
    pub(crate) fn from_entries(lattice: Lattice, mut entries: Vec<(u32, Shift)>, config: &HashConfig) -> Result<Self, BuildError>
    {
        entries.sort_unstable_by_key(|&(key, _)| key);
        let ids: Vec<u32> = entries.iter().map(|&(key, _)| key).collect();
        let hash = PerfectHash::build(&ids, config)?;

        let mut keys = vec![EMPTY_SLOT; hash.slots()];
        let mut shifts = vec![Shift::default(); hash.slots()];
        for &(key, shift) in &entries
        {
            let slot = hash.index(key);
            keys[slot] = key;
            shifts[slot] = shift;
        }
        tracing::info!(nodes = entries.len(), slots = hash.slots(), columns = lattice.columns, rows = lattice.rows, "grid store built");
        Ok(Self { format_version: STORE_FORMAT_VERSION, lattice, hash, keys, shifts, len: entries.len() })
    }

    /// Builds a store for `lattice` from a node table with default hash settings.
    pub fn from_nodes<I: IntoIterator<Item = GridNode>>(lattice: Lattice, nodes: I) -> Result<Self, BuildError>
    {
        let mut builder = super::builder::GridStoreBuilder::with_lattice(lattice)?;
        builder.extend(nodes)?;
        builder.build()
    }

    ///
    /// Shift stored at lattice node `(grid_x, grid_y)`, or `None` if the node is not
    /// covered or lies off the lattice.
    ///
    #[inline]
    pub fn lookup(&self, grid_x: i32, grid_y: i32) -> Option<Shift>
    {
        let point_id = self.lattice.point_id(grid_x, grid_y)?;
        self.lookup_point_id(point_id)
    }

    #[inline]
    pub fn lookup_point_id(&self, point_id: u32) -> Option<Shift>
    {
        if point_id == EMPTY_SLOT
        {
            return None;
        }
        let slot = self.hash.index(point_id);
        match self.keys.get(slot)
        {
            Some(&key) if key == point_id => Some(self.shifts[slot]),
            _ => None,
        }
    }

    #[inline]
    pub fn contains(&self, grid_x: i32, grid_y: i32) -> bool
    {
        self.lookup(grid_x, grid_y).is_some()
    }

    #[inline]
    pub fn len(&self) -> usize
    {
        self.len
    }

    #[inline]
    pub fn is_empty(&self) -> bool
    {
        self.len == 0
    }

    #[inline]
    pub fn lattice(&self) -> &Lattice
    {
        &self.lattice
    }

    /// Stored nodes in ascending point id order.
    pub fn nodes(&self) -> Vec<GridNode>
    {
        let mut entries: Vec<(u32, Shift)> = self.keys.iter().zip(&self.shifts)
            .filter(|(&key, _)| key != EMPTY_SLOT)
            .map(|(&key, &shift)| (key, shift))
            .collect();
        entries.sort_unstable_by_key(|&(key, _)| key);
        entries.into_iter().filter_map(|(key, shift)|
        {
            let (grid_x, grid_y) = self.lattice.grid_index(key)?;
            Some(GridNode { grid_x, grid_y, shift })
        }).collect()
    }

    pub fn to_bytes(&self) -> Result<Vec<u8>, StoreError>
    {
        serialize(self, SerializationFormat::BincodeLz4)
    }

    ///
    /// Saves the store to `path` in the compressed binary format.
    ///
    pub fn save<P: AsRef<std::path::Path>>(&self, path: P) -> Result<(), StoreError>
    {
        let file = std::fs::File::create(path.as_ref())?;
        self.write(std::io::BufWriter::new(file))?;
        tracing::info!(path = %path.as_ref().display(), nodes = self.len, "grid store saved");
        Ok(())
    }

    pub fn write<W: Write>(&self, mut writer: W) -> Result<(), StoreError>
    {
        writer.write_all(&self.to_bytes()?)?;
        writer.flush()?;
        Ok(())
    }

    ///
    /// Reads a store from a buffer written by `to_bytes`, checking it for consistency.
    ///
    pub fn read_buffer(buffer: &[u8]) -> Result<Self, StoreError>
    {
        let store: Self = deserialize(buffer, SerializationFormat::BincodeLz4)?;
        store.verify()?;
        tracing::debug!(bytes = buffer.len(), nodes = store.len, "grid store decoded");
        Ok(store)
    }

    pub fn read<R: std::io::Read>(mut reader: R) -> Result<Self, StoreError>
    {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::read_buffer(&bytes)
    }

    pub fn open<P: AsRef<std::path::Path>>(path: P) -> Result<Self, StoreError>
    {
        let bytes = std::fs::read(path.as_ref())?;
        let store = Self::read_buffer(&bytes)?;
        tracing::info!(path = %path.as_ref().display(), nodes = store.len, "grid store loaded");
        Ok(store)
    }

    fn verify(&self) -> Result<(), StoreError>
    {
        if self.format_version != STORE_FORMAT_VERSION
        {
            return Err(StoreError::Corrupt(format!("unsupported format version {}", self.format_version)));
        }
        self.lattice.validate().map_err(|e| StoreError::Corrupt(e.to_string()))?;
        if !self.hash.is_well_formed() || self.keys.len() != self.hash.slots() || self.shifts.len() != self.hash.slots()
        {
            return Err(StoreError::Corrupt(format!("{} keys and {} shifts for {} slots", self.keys.len(), self.shifts.len(), self.hash.slots())));
        }
        let mut count = 0;
        for (slot, (&key, shift)) in self.keys.iter().zip(&self.shifts).enumerate()
        {
            if key == EMPTY_SLOT
            {
                continue;
            }
            if self.lattice.grid_index(key).is_none()
            {
                return Err(StoreError::Corrupt(format!("point id {key} is off the lattice")));
            }
            if self.hash.index(key) != slot
            {
                return Err(StoreError::Corrupt(format!("point id {key} stored in slot {slot}")));
            }
            if !shift.is_finite()
            {
                return Err(StoreError::Corrupt(format!("point id {key} has a non-finite shift")));
            }
            count += 1;
        }
        if count != self.len
        {
            return Err(StoreError::Corrupt(format!("{count} nodes present, {} recorded", self.len)));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::storage::builder::GridStoreBuilder;

    fn caister_square() -> Vec<GridNode>
    {
        vec![
            GridNode::new(651, 313, (102.787, -78.242, 44.236)),
            GridNode::new(652, 313, (102.791, -78.240, 44.229)),
            GridNode::new(651, 314, (102.784, -78.251, 44.241)),
            GridNode::new(652, 314, (102.789, -78.249, 44.233)),
        ]
    }

    #[test]
    fn lookup_returns_stored_node()
    {
        let store = GridStore::from_nodes(Lattice::OSTN15, caister_square()).unwrap();
        assert_eq!(store.len(), 4);
        assert_eq!(store.lookup(651, 313), Some(Shift::new(102.787, -78.242, 44.236)));
        assert_eq!(store.lookup_point_id(220065), Some(Shift::new(102.787, -78.242, 44.236)));
        assert!(store.contains(652, 314));
    }

    #[test]
    fn absent_nodes_are_distinct_from_zero_shift()
    {
        let mut nodes = caister_square();
        nodes.push(GridNode::new(0, 0, (0.0, 0.0, 0.0)));
        let store = GridStore::from_nodes(Lattice::OSTN15, nodes).unwrap();
        assert_eq!(store.lookup(0, 0), Some(Shift::default()));
        assert_eq!(store.lookup(1, 0), None);
        assert_eq!(store.lookup(650, 313), None);
        assert_eq!(store.lookup(-1, 313), None);
        assert_eq!(store.lookup(701, 313), None);
        assert_eq!(store.lookup_point_id(0), None);
        assert_eq!(store.lookup_point_id(u32::MAX), None);
    }

    #[test]
    fn nodes_come_back_in_point_id_order()
    {
        let mut nodes = caister_square();
        nodes.reverse();
        let store = GridStore::from_nodes(Lattice::OSTN15, nodes).unwrap();
        assert_eq!(store.nodes(), caister_square());
    }

    #[test]
    fn repeated_builds_are_identical()
    {
        let a = GridStore::from_nodes(Lattice::OSTN15, caister_square()).unwrap();
        let mut reversed = caister_square();
        reversed.reverse();
        let b = GridStore::from_nodes(Lattice::OSTN15, reversed).unwrap();
        assert_eq!(a, b);
        assert_eq!(a.to_bytes().unwrap(), b.to_bytes().unwrap());
    }

    #[test]
    fn empty_store()
    {
        let store = GridStoreBuilder::new().build().unwrap();
        assert!(store.is_empty());
        assert_eq!(store.lookup(651, 313), None);
        assert!(store.nodes().is_empty());
    }

    #[test]
    fn save_and_open_round_trip()
    {
        let store = GridStore::from_nodes(Lattice::OSTN15, caister_square()).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ostn15.grid");
        store.save(&path).unwrap();
        let loaded = GridStore::open(&path).unwrap();
        assert_eq!(loaded, store);
        assert_eq!(loaded.lookup(652, 314), Some(Shift::new(102.789, -78.249, 44.233)));

        let read = GridStore::read(std::fs::File::open(&path).unwrap()).unwrap();
        assert_eq!(read, store);
    }

    #[test]
    fn missing_file_is_an_io_error()
    {
        let dir = tempfile::tempdir().unwrap();
        let err = GridStore::open(dir.path().join("missing.grid")).unwrap_err();
        assert!(matches!(err, StoreError::FileIO(_)));
    }

    #[test]
    fn tampered_stores_are_rejected()
    {
        let store = GridStore::from_nodes(Lattice::OSTN15, caister_square()).unwrap();
        let occupied = store.keys.iter().position(|&k| k != EMPTY_SLOT).unwrap();

        let mut moved = store.clone();
        let key = moved.keys[occupied];
        moved.keys[occupied] = EMPTY_SLOT;
        moved.keys.push(key);
        moved.shifts.push(Shift::default());
        let err = GridStore::read_buffer(&moved.to_bytes().unwrap()).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));

        let mut poisoned = store.clone();
        poisoned.shifts[occupied].dz = f64::NAN;
        let err = GridStore::read_buffer(&poisoned.to_bytes().unwrap()).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));

        let mut miscounted = store.clone();
        miscounted.len += 1;
        let err = GridStore::read_buffer(&miscounted.to_bytes().unwrap()).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));

        let mut future = store.clone();
        future.format_version = STORE_FORMAT_VERSION + 1;
        let err = GridStore::read_buffer(&future.to_bytes().unwrap()).unwrap_err();
        assert!(matches!(err, StoreError::Corrupt(_)));

        let bytes = store.to_bytes().unwrap();
        assert!(GridStore::read_buffer(&bytes[..bytes.len() / 2]).is_err());
    }
}
