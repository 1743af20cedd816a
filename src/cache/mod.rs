//! Cache module - named in-process caches backed by Moka.
//!
//! - `CacheRegistry` hands out caches by name so repositories created at
//!   different places share the same instance.
//! - `TypedCache` is a cheap-to-clone handle over a `moka::sync::Cache`.

mod config;
mod registry;
mod typed;

pub use config::CacheConfig;
pub use registry::CacheRegistry;
pub use typed::TypedCache;
