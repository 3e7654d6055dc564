//! 存储模块
//!
//! 提供翻译缓存和持久化键值存储。

pub mod cache;
pub mod store;

pub use cache::{CacheKey, CacheStats, PersistedEntry, TranslationCache};
pub use store::{KeyValueStore, MemoryStore, RedbStore};
