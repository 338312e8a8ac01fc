//! # CyberClub Store
//! JSON document store over sqlite, plus typed collection adapters.
//!
//! Five collections, two addressing schemes: events resolve by their `title`
//! natural key, everything else by a store-assigned id. The store is the
//! system of record — concurrent mutations on the same identity resolve
//! last-write-wins.

pub mod collections;
pub mod documents;

pub use documents::ContentStore;
