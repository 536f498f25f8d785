//! Database row structs.
//!
//! Each submodule holds a `FromRow` struct matching the table (or joined
//! projection) and a `TryFrom` conversion into the domain type. Enumerated
//! columns are stored as text and parsed on the way out; a value outside the
//! closed set surfaces as [`StoreError::Corrupt`](gactif_core::store::StoreError).

pub mod asset;
pub mod audit;
pub mod service;
