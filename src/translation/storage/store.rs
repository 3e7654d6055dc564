//! 键值存储
//!
//! 保存语言偏好和翻译缓存的持久化后端。`MemoryStore` 用于测试和
//! 无持久化的运行，`RedbStore` 把数据写入单个 redb 数据库文件。

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use redb::{Database, ReadableTable, TableDefinition, TableError};

use crate::translation::error::TranslationResult;

/// 持久化键值存储
pub trait KeyValueStore {
    /// 后端名称，用于日志
    fn name(&self) -> &str;

    /// 读取键，不存在时返回 `None`
    fn get(&self, key: &str) -> TranslationResult<Option<String>>;

    /// 写入键
    fn set(&self, key: &str, value: &str) -> TranslationResult<()>;

    /// 删除键，返回键是否存在
    fn remove(&self, key: &str) -> TranslationResult<bool>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn name(&self) -> &str {
        (**self).name()
    }

    fn get(&self, key: &str) -> TranslationResult<Option<String>> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> TranslationResult<()> {
        (**self).set(key, value)
    }

    fn remove(&self, key: &str) -> TranslationResult<bool> {
        (**self).remove(key)
    }
}

/// 内存存储，克隆后共享同一份数据（模拟同源的多个标签页）
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 当前条目数
    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn name(&self) -> &str {
        "memory"
    }

    fn get(&self, key: &str) -> TranslationResult<Option<String>> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> TranslationResult<()> {
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> TranslationResult<bool> {
        Ok(self.entries.borrow_mut().remove(key).is_some())
    }
}

const STORAGE_TABLE: TableDefinition<&str, &str> = TableDefinition::new("textswap_storage");

/// 基于 redb 的磁盘存储
pub struct RedbStore {
    db: Database,
    path: PathBuf,
}

impl RedbStore {
    /// 打开或创建数据库文件，必要时创建父目录
    pub fn open<P: AsRef<Path>>(path: P) -> TranslationResult<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let db = Database::create(&path)?;
        tracing::debug!("打开存储数据库: {}", path.display());

        Ok(Self { db, path })
    }

    /// 数据库文件路径
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 所有键（按字典序）
    pub fn keys(&self) -> TranslationResult<Vec<String>> {
        let txn = self.db.begin_read()?;
        let table = match txn.open_table(STORAGE_TABLE) {
            Ok(table) => table,
            Err(TableError::TableDoesNotExist(_)) => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut keys = Vec::new();
        for entry in table.iter()? {
            let (key, _) = entry?;
            keys.push(key.value().to_string());
        }
        Ok(keys)
    }
}

impl KeyValueStore for RedbStore {
    fn name(&self) -> &str {
        "redb"
    }

    fn get(&self, key: &str) -> TranslationResult<Option<String>> {
        let txn = self.db.begin_read()?;
        let table = match txn.open_table(STORAGE_TABLE) {
            Ok(table) => table,
            // 从未写入过
            Err(TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let value = table.get(key)?.map(|guard| guard.value().to_string());
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> TranslationResult<()> {
        let txn = self.db.begin_write()?;
        {
            let mut table = txn.open_table(STORAGE_TABLE)?;
            table.insert(key, value)?;
        }
        txn.commit()?;
        Ok(())
    }

    fn remove(&self, key: &str) -> TranslationResult<bool> {
        let txn = self.db.begin_write()?;
        let existed = {
            let mut table = txn.open_table(STORAGE_TABLE)?;
            let removed = table.remove(key)?;
            removed.is_some()
        };
        txn.commit()?;
        Ok(existed)
    }
}
