pub mod blocking_cache;
pub mod factory;
pub mod foyer_cache;
pub mod memory_cache;
pub mod moka_cache;

pub use blocking_cache::BlockingCache;
pub use factory::UnifiedStorageFactory;
pub use foyer_cache::FoyerCache;
pub use memory_cache::MemoryCache;
pub use moka_cache::MokaCache;
