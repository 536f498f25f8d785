//! Domain layer for the asset registry.
//!
//! Holds the asset, service and audit models, the closed enumerations that
//! cross the wire as strings, the filter/paging predicate, statistics and
//! export rendering, the storage traits, and the [`lifecycle::AssetLifecycle`]
//! manager that is the only component allowed to mutate assets.
//!
//! Nothing in here speaks SQL; the `gactif-db` crate implements the storage
//! traits against PostgreSQL and [`store::memory::MemoryStore`] implements
//! them in process.

pub mod assets;
pub mod audit;
pub mod error;
pub mod lifecycle;
pub mod services;
pub mod store;
pub mod types;
