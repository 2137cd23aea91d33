use std::hash::Hasher;

use rustc_hash::FxHasher;
use serde::{Deserialize, Serialize};

use crate::errors::BuildError;

///
/// Tunables for perfect hash construction.
///
/// `keys_per_bucket` is the average bucket size (larger is more compact and slower to
/// build), `load_factor` the fraction of slots that end up occupied, and `max_attempts`
/// the number of seeds tried before giving up.
///
#[derive(Copy, Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HashConfig
{
    pub keys_per_bucket: usize,
    pub load_factor: f64,
    pub max_attempts: u32,
}

impl Default for HashConfig
{
    fn default() -> Self
    {
        Self { keys_per_bucket: 5, load_factor: 0.99, max_attempts: 16 }
    }
}

/// Upper bound on the first displacement tried per bucket.
const MAX_D1: u32 = 256;

/// Seeds are drawn from a fixed sequence so construction is reproducible.
const SEED_BASE: u64 = 0x243f_6a88_85a3_08d3;
const SEED_STEP: u64 = 0x9e37_79b9_7f4a_7c15;

#[derive(Copy, Clone)]
struct Hashes
{
    g: u32,
    f1: u32,
    f2: u32,
}

// splitmix64 finaliser, spreads FxHasher output over all 64 bits
#[inline(always)]
fn mix(mut z: u64) -> u64
{
    z = (z ^ (z >> 30)).wrapping_mul(0xbf58_476d_1ce4_e5b9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94d0_49bb_1331_11eb);
    z ^ (z >> 31)
}

#[inline(always)]
fn hash(key: u32, seed: u64) -> Hashes
{
    let mut hasher = FxHasher::default();
    hasher.write_u64(seed);
    hasher.write_u32(key);
    let lo = mix(hasher.finish());
    let hi = mix(lo ^ seed);
    Hashes { g: (lo >> 32) as u32, f1: lo as u32, f2: hi as u32 }
}

#[inline(always)]
fn displace(f1: u32, f2: u32, d1: u32, d2: u32) -> u32
{
    d2.wrapping_add(f1.wrapping_mul(d1)).wrapping_add(f2)
}

///
/// Hash-and-displace perfect hash over a fixed set of `u32` keys. Every key of the set
/// maps to a distinct slot in `0..slots()`; keys outside the set map to an arbitrary slot,
/// so callers must compare against the key stored there.
///
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PerfectHash
{
    seed: u64,
    slots: u32,
    displacements: Vec<(u32, u32)>,
}

impl PerfectHash
{
    ///
    /// Builds a perfect hash for `keys`, which must be distinct.
    ///
    pub fn build(keys: &[u32], config: &HashConfig) -> Result<Self, BuildError>
    {
        let keys_per_bucket = config.keys_per_bucket.max(1);
        let load_factor = if config.load_factor > 0.0 && config.load_factor <= 1.0 { config.load_factor } else { 1.0 };
        let slots = ((keys.len() as f64 / load_factor).ceil() as usize).max(keys.len()).max(1);
        let slots = u32::try_from(slots).map_err(|_| BuildError::HashConstruction { attempts: 0 })?;
        let buckets = keys.len().div_ceil(keys_per_bucket).max(1);

        for attempt in 0..config.max_attempts
        {
            let seed = SEED_BASE.wrapping_add(SEED_STEP.wrapping_mul(attempt as u64));
            if let Some(displacements) = Self::try_generate(keys, seed, slots, buckets)
            {
                tracing::debug!(keys = keys.len(), slots, buckets, attempt, "perfect hash constructed");
                return Ok(Self { seed, slots, displacements });
            }
            tracing::debug!(attempt, seed, "perfect hash seed rejected, retrying");
        }
        Err(BuildError::HashConstruction { attempts: config.max_attempts })
    }

    fn try_generate(keys: &[u32], seed: u64, slots: u32, buckets: usize) -> Option<Vec<(u32, u32)>>
    {
        let hashes: Vec<Hashes> = keys.iter().map(|&key| hash(key, seed)).collect();

        let mut bucket_keys: Vec<Vec<usize>> = vec![Vec::new(); buckets];
        for (i, h) in hashes.iter().enumerate()
        {
            bucket_keys[h.g as usize % buckets].push(i);
        }
        // place the largest buckets first, ties broken by bucket index
        let mut order: Vec<usize> = (0..buckets).collect();
        order.sort_by(|&a, &b| bucket_keys[b].len().cmp(&bucket_keys[a].len()).then(a.cmp(&b)));

        let mut occupied = vec![false; slots as usize];
        // generation marks let a failed trial be discarded without clearing
        let mut trial = vec![0u64; slots as usize];
        let mut generation = 0u64;
        let mut displacements = vec![(0u32, 0u32); buckets];
        let mut placed = Vec::with_capacity(keys.len().min(64));

        'buckets: for &bucket in &order
        {
            let members = &bucket_keys[bucket];
            if members.is_empty()
            {
                continue;
            }
            for d1 in 0..slots.min(MAX_D1)
            {
                'disps: for d2 in 0..slots
                {
                    generation += 1;
                    placed.clear();
                    for &i in members
                    {
                        let h = hashes[i];
                        let slot = (displace(h.f1, h.f2, d1, d2) % slots) as usize;
                        if occupied[slot] || trial[slot] == generation
                        {
                            continue 'disps;
                        }
                        trial[slot] = generation;
                        placed.push(slot);
                    }
                    for &slot in &placed
                    {
                        occupied[slot] = true;
                    }
                    displacements[bucket] = (d1, d2);
                    continue 'buckets;
                }
            }
            return None;
        }
        Some(displacements)
    }

    /// Slot for `key`. Meaningful only for keys the hash was built from.
    #[inline(always)]
    pub fn index(&self, key: u32) -> usize
    {
        let h = hash(key, self.seed);
        let (d1, d2) = self.displacements[h.g as usize % self.displacements.len()];
        (displace(h.f1, h.f2, d1, d2) % self.slots) as usize
    }

    #[inline]
    pub fn slots(&self) -> usize
    {
        self.slots as usize
    }

    pub(crate) fn is_well_formed(&self) -> bool
    {
        self.slots > 0 && !self.displacements.is_empty()
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    fn assert_perfect(keys: &[u32], phf: &PerfectHash)
    {
        let mut seen = vec![false; phf.slots()];
        for &key in keys
        {
            let slot = phf.index(key);
            assert!(slot < phf.slots());
            assert!(!seen[slot], "slot {slot} hit twice");
            seen[slot] = true;
        }
    }

    #[test]
    fn sequential_point_ids_hash_without_collisions()
    {
        let keys: Vec<u32> = (1..=20_000).collect();
        let phf = PerfectHash::build(&keys, &HashConfig::default()).unwrap();
        assert!(phf.slots() >= keys.len());
        assert_perfect(&keys, &phf);
    }

    #[test]
    fn minimal_hash_with_full_load()
    {
        // sparse keys, as after removing uncovered cells
        let keys: Vec<u32> = (0..5_000u32).map(|i| 1 + i * 7 + (i % 3)).collect();
        let config = HashConfig { load_factor: 1.0, ..Default::default() };
        let phf = PerfectHash::build(&keys, &config).unwrap();
        assert_eq!(phf.slots(), keys.len());
        assert_perfect(&keys, &phf);
    }

    #[test]
    fn construction_is_deterministic()
    {
        let keys: Vec<u32> = (1..=3_000).map(|k| k * 3).collect();
        let a = PerfectHash::build(&keys, &HashConfig::default()).unwrap();
        let b = PerfectHash::build(&keys, &HashConfig::default()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn degenerate_inputs()
    {
        let empty = PerfectHash::build(&[], &HashConfig::default()).unwrap();
        assert_eq!(empty.slots(), 1);
        assert!(empty.index(42) < 1);

        let single = PerfectHash::build(&[220065], &HashConfig::default()).unwrap();
        assert!(single.index(220065) < single.slots());

        let none = HashConfig { max_attempts: 0, ..Default::default() };
        assert_eq!(PerfectHash::build(&[1, 2, 3], &none), Err(BuildError::HashConstruction { attempts: 0 }));
    }
}
