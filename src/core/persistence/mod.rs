//! Persistence (§4.7): a single call serializes the whole database —
//! table definitions, row stores, rid counters, and every index — to a
//! byte stream, and a companion call restores it.

pub mod snapshot;

pub use snapshot::{load, save, FORMAT_VERSION, MAGIC};
