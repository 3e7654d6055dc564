//! 翻译模块
//!
//! 在原地切换页面文本语言的引擎及其协作组件：
//! - **core**: 文本替换引擎和语言状态
//! - **pipeline**: 界面树抽象（HTML 文档、显式注册表）
//! - **lookup**: 翻译查询后端
//! - **storage**: 翻译缓存和持久化存储
//! - **config**: 配置管理
//! - **error**: 错误处理
//!
//! # 基本用法
//!
//! ```rust,no_run
//! use textswap::translation::translate_html;
//!
//! # async fn example() -> textswap::translation::TranslationResult<()> {
//! let html = "<html><body><a href=\"#\">Home</a></body></html>";
//! let translated = translate_html(html, "hi").await?;
//! assert!(translated.contains("मुख्य"));
//! # Ok(())
//! # }
//! ```

// ============================================================================
// 子模块声明
// ============================================================================

/// 配置管理模块 - 语言、节点选择策略和存储相关配置
pub mod config;

/// 引擎核心模块 - 快照、翻译、恢复
pub mod core;

/// 错误处理模块 - 统一的错误类型和处理机制
pub mod error;

/// 翻译查询模块 - 可替换的查询后端
pub mod lookup;

/// 界面树模块 - 可翻译节点的枚举与读写
pub mod pipeline;

/// 存储管理模块 - 翻译缓存和键值存储
pub mod storage;

// ============================================================================
// 核心API导出
// ============================================================================

pub use self::core::{BatchReport, LanguageState, NodeFailure, TextSwapEngine};

pub use config::{constants, ConfigManager, TranslationConfig};

pub use error::{ErrorCategory, ErrorSeverity, TranslationError, TranslationResult};

pub use lookup::{lookup_fn, DelayedLookup, FnLookup, StaticTable, TranslationLookup};

pub use pipeline::{
    CollectionStats, HtmlTree, NodeId, NodeText, SelectionPolicy, TextField, TextTree, UiRegistry,
};

pub use storage::{
    CacheKey, CacheStats, KeyValueStore, MemoryStore, PersistedEntry, RedbStore, TranslationCache,
};

// ============================================================================
// 便利函数
// ============================================================================

/// 按配置构建短语表
///
/// 目标语言为印地语时以内置表为基础，再并入 `table_path` 指向的短语表文件。
///
/// # Examples
///
/// ```rust
/// use textswap::translation::{build_table, TranslationConfig};
///
/// let table = build_table(&TranslationConfig::default()).unwrap();
/// assert_eq!(table.get("Send"), Some("भेजें"));
/// ```
pub fn build_table(config: &TranslationConfig) -> TranslationResult<StaticTable> {
    let target = self::core::normalize_lang(&config.target_lang)?;

    let mut table = if target == constants::DEFAULT_TARGET_LANG {
        StaticTable::builtin()
    } else {
        StaticTable::new(&target)
    };

    if let Some(path) = &config.table_path {
        let expanded = shellexpand::tilde(path).into_owned();
        let extra = StaticTable::from_file(&expanded)?;
        let count = table.merge(extra)?;
        tracing::info!("并入短语表 {}: {} 条", expanded, count);
    }

    Ok(table)
}

/// 翻译一段 HTML（异步版本）
///
/// 使用默认配置、内置短语表和内存存储，返回序列化后的文档。
pub async fn translate_html(html: &str, target_lang: &str) -> TranslationResult<String> {
    let config = TranslationConfig::default();
    let tree = HtmlTree::parse(html, SelectionPolicy::from(&config))?;
    let engine = TextSwapEngine::new(tree, build_table(&config)?, MemoryStore::new(), config)?;

    engine.translate_to(target_lang).await?;
    engine.tree().to_html()
}

/// 翻译一段 HTML（同步版本）
///
/// 内部创建单线程运行时，适用于非异步环境。
///
/// # Examples
///
/// ```rust
/// use textswap::translation::translate_html_sync;
///
/// let html = translate_html_sync("<p>Contact</p>", "hi").unwrap();
/// assert!(html.contains("<p data-translate-id=\"element_0\">संपर्क</p>"));
/// ```
pub fn translate_html_sync(html: &str, target_lang: &str) -> TranslationResult<String> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .build()
        .map_err(|e| TranslationError::InternalError(format!("创建异步运行时失败: {e}")))?;

    runtime.block_on(translate_html(html, target_lang))
}

/// 检查翻译配置文件是否存在
pub fn config_file_exists() -> bool {
    config::config_file_exists()
}

/// 加载翻译配置，失败时返回默认配置
pub fn load_translation_config() -> TranslationConfig {
    config::load_translation_config()
}
