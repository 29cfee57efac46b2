// txcache/src/lib.rs
pub mod coordinator;
pub mod domain;
pub mod ports;
pub mod staging;

#[cfg(test)]
pub(crate) mod test_support;

pub use coordinator::CacheCoordinator;
pub use domain::{CacheConfig, CacheId, CachedValue};
pub use ports::{CacheStore, StorageFactory};
pub use staging::StagingCache;
