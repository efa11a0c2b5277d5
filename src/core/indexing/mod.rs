//! The Index Manager: per-column equality-hash indexes, one set per table,
//! kept consistent with every insert/update/delete by the storage engine.

pub mod hash_index;

pub use hash_index::HashIndex;
