//! 翻译缓存模块
//!
//! 以 `(原文, 目标语言)` 为键缓存翻译结果。条目一经写入永不修改，
//! 持久化时与存储中已有的条目合并。

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::translation::config::constants;
use crate::translation::error::TranslationResult;
use crate::translation::storage::store::KeyValueStore;

// ============================================================================
// 核心类型
// ============================================================================

/// 缓存键
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    pub text: String,
    pub lang: String,
}

impl CacheKey {
    pub fn new(text: impl Into<String>, lang: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            lang: lang.into(),
        }
    }
}

/// 持久化格式中的一条记录
///
/// 使用结构化对象而非拼接字符串，原文中的任何字符（`_`、`:` 等）都能原样往返。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedEntry {
    pub text: String,
    pub lang: String,
    pub translation: String,
}

/// 缓存统计信息
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CacheStats {
    pub total_requests: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub total_entries: usize,
    /// 因键已存在而被丢弃的写入
    pub rejected_inserts: u64,
}

impl CacheStats {
    /// 命中率
    pub fn hit_rate(&self) -> f64 {
        if self.total_requests == 0 {
            0.0
        } else {
            self.cache_hits as f64 / self.total_requests as f64
        }
    }
}

/// 翻译缓存
#[derive(Debug, Default)]
pub struct TranslationCache {
    entries: HashMap<CacheKey, String>,
    stats: CacheStats,
    dirty: bool,
}

// ============================================================================
// 实现
// ============================================================================

impl TranslationCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// 查询缓存并记录命中统计
    pub fn get(&mut self, text: &str, lang: &str) -> Option<String> {
        self.stats.total_requests += 1;

        match self.entries.get(&CacheKey::new(text, lang)) {
            Some(value) => {
                self.stats.cache_hits += 1;
                Some(value.clone())
            }
            None => {
                self.stats.cache_misses += 1;
                None
            }
        }
    }

    /// 查询缓存，不影响统计
    pub fn peek(&self, text: &str, lang: &str) -> Option<&str> {
        self.entries
            .get(&CacheKey::new(text, lang))
            .map(String::as_str)
    }

    pub fn contains(&self, text: &str, lang: &str) -> bool {
        self.entries.contains_key(&CacheKey::new(text, lang))
    }

    /// 仅在键不存在时写入，返回缓存中最终保存的值
    pub fn insert(&mut self, text: &str, lang: &str, translation: String) -> String {
        let key = CacheKey::new(text, lang);

        if let Some(existing) = self.entries.get(&key) {
            if existing != &translation {
                tracing::debug!("缓存已存在 '{}' ({})，忽略新值", text, lang);
            }
            self.stats.rejected_inserts += 1;
            return existing.clone();
        }

        self.entries.insert(key, translation.clone());
        self.stats.total_entries = self.entries.len();
        self.dirty = true;
        translation
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 清空内存中的条目
    pub fn clear(&mut self) {
        self.entries.clear();
        self.stats.total_entries = 0;
        self.dirty = true;
    }

    pub fn stats(&self) -> CacheStats {
        CacheStats {
            total_entries: self.entries.len(),
            ..self.stats.clone()
        }
    }

    /// 是否有尚未写回存储的条目
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// 按 `(语言, 原文)` 排序的全部条目
    pub fn entries(&self) -> Vec<PersistedEntry> {
        let mut entries: Vec<PersistedEntry> = self
            .entries
            .iter()
            .map(|(key, translation)| PersistedEntry {
                text: key.text.clone(),
                lang: key.lang.clone(),
                translation: translation.clone(),
            })
            .collect();
        entries.sort_by(|a, b| (&a.lang, &a.text).cmp(&(&b.lang, &b.text)));
        entries
    }

    /// 吸收外部条目，已有的键保持不变，返回新增数量
    pub fn absorb<I>(&mut self, entries: I) -> usize
    where
        I: IntoIterator<Item = PersistedEntry>,
    {
        let mut added = 0;
        for entry in entries {
            let key = CacheKey::new(entry.text, entry.lang);
            if let std::collections::hash_map::Entry::Vacant(slot) = self.entries.entry(key) {
                slot.insert(entry.translation);
                added += 1;
            }
        }
        self.stats.total_entries = self.entries.len();
        added
    }

    /// 序列化为持久化格式
    pub fn to_json(&self) -> TranslationResult<String> {
        Ok(serde_json::to_string(&self.entries())?)
    }

    /// 从持久化格式构建
    pub fn from_json(json: &str) -> TranslationResult<Self> {
        let entries: Vec<PersistedEntry> = serde_json::from_str(json)?;
        let mut cache = Self::new();
        cache.absorb(entries);
        Ok(cache)
    }

    /// 从存储加载缓存，键不存在时返回空缓存
    pub fn load_from(store: &dyn KeyValueStore) -> TranslationResult<Self> {
        match store.get(constants::CACHE_KEY)? {
            Some(json) => {
                let cache = Self::from_json(&json)?;
                tracing::debug!("从 {} 加载 {} 条缓存", store.name(), cache.len());
                Ok(cache)
            }
            None => Ok(Self::new()),
        }
    }

    /// 写回存储
    ///
    /// 先吸收存储中已有（可能由其他实例写入）的条目，同键以内存为准，
    /// 再整体写回。返回写入的条目数。
    pub fn flush_to(&mut self, store: &dyn KeyValueStore) -> TranslationResult<usize> {
        if let Some(json) = store.get(constants::CACHE_KEY)? {
            match serde_json::from_str::<Vec<PersistedEntry>>(&json) {
                Ok(persisted) => {
                    let added = self.absorb(persisted);
                    if added > 0 {
                        tracing::debug!("合并存储中的 {} 条缓存", added);
                    }
                }
                Err(e) => {
                    tracing::warn!("存储中的缓存无法解析，将被覆盖: {}", e);
                }
            }
        }

        store.set(constants::CACHE_KEY, &self.to_json()?)?;
        self.dirty = false;
        Ok(self.entries.len())
    }
}
