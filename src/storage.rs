pub mod builder;
pub mod grid_store;
pub mod perfect_hash;
