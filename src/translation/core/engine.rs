//! 文本替换引擎
//!
//! 引擎在原地改写界面树中的文本，使整个页面可以在源语言和目标语言之间来回切换。
//!
//! ## 工作流程
//! 1. 扫描可翻译节点，为缺少标识的节点分配 `element_N` 标识
//! 2. 首次见到节点时记录原文快照，之后永不覆盖
//! 3. 翻译时总是从原文快照出发，经缓存或查询后端得到译文并写回节点
//! 4. 切回源语言时把原文快照原样写回
//!
//! ## 并发
//! 引擎运行在单线程上（内部使用 `Rc`/`RefCell`，不是 `Send`）。
//! 同一时间只有一个批次在执行，后到的请求按到达顺序排队，
//! 前一个批次完全结束后才开始，因此不会出现中英混杂的页面。
//! 批次内部各节点的查询并发进行，每个节点的字段全部就绪后立即写回。
//!
//! ## 使用示例
//! ```rust
//! use textswap::translation::{
//!     MemoryStore, StaticTable, TextSwapEngine, TranslationConfig, UiRegistry,
//! };
//!
//! # async fn demo() -> textswap::translation::TranslationResult<()> {
//! let tree = UiRegistry::from_texts(["Home", "About", "Contact"]);
//! let engine = TextSwapEngine::new(
//!     tree,
//!     StaticTable::builtin(),
//!     MemoryStore::new(),
//!     TranslationConfig::default(),
//! )?;
//!
//! engine.snapshot_originals();
//! let report = engine.translate_to("hi").await?;
//! assert!(report.is_complete());
//! engine.translate_to("en").await?;
//! # Ok(())
//! # }
//! ```

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};
use std::time::{Duration, Instant};

use futures::future::join_all;
use tokio::sync::Mutex;

use crate::translation::config::{constants, TranslationConfig};
use crate::translation::core::language::{normalize_lang, LanguageState};
use crate::translation::error::{helpers, TranslationError, TranslationResult};
use crate::translation::lookup::TranslationLookup;
use crate::translation::pipeline::{NodeId, NodeText, TextField, TextTree};
use crate::translation::storage::{CacheStats, KeyValueStore, TranslationCache};

/// 单个节点的翻译失败
#[derive(Debug, Clone, PartialEq)]
pub struct NodeFailure {
    /// 失败节点的标识
    pub id: NodeId,
    /// 查询失败的原文字段
    pub text: String,
    /// 查询后端返回的错误
    pub error: TranslationError,
}

/// 一次 `translate_to` 的结果
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// 本次切换到的语言
    pub language: String,
    /// 参与本次批次的节点数
    pub nodes_total: usize,
    /// 成功写回的节点数
    pub nodes_written: usize,
    /// 是否为恢复原文
    pub restored: bool,
    /// 查询失败、保持原样的节点
    pub failed: Vec<NodeFailure>,
    /// 批次耗时
    pub duration: Duration,
}

impl BatchReport {
    fn new(language: &str, nodes_total: usize) -> Self {
        Self {
            language: language.to_string(),
            nodes_total,
            nodes_written: 0,
            restored: false,
            failed: Vec::new(),
            duration: Duration::ZERO,
        }
    }

    /// 所有节点都已写回
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

/// 批次执行期间置位
struct InFlight<'a>(&'a Cell<bool>);

impl<'a> InFlight<'a> {
    fn start(flag: &'a Cell<bool>) -> Self {
        flag.set(true);
        Self(flag)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.set(false);
    }
}

/// 文本替换引擎
///
/// 持有界面树、查询后端和持久化存储，显式构造并以引用传给需要它的界面代码。
///
/// ## 内部状态
/// - 原文快照：`NodeId -> NodeText`，每个节点至多记录一次
/// - 节点语言表：`NodeId -> 语言`，记录每个节点当前显示的语言
/// - 翻译缓存：`(原文, 语言) -> 译文`，写入后不再改变
/// - 当前语言：由持久化的偏好初始化，只由 `translate_to` 修改
///
/// ## 存储降级
/// 存储第一次读写失败时记录一条警告，此后引擎只使用内存中的状态，
/// 不再访问存储。
pub struct TextSwapEngine<T: TextTree> {
    tree: T,
    lookup: Box<dyn TranslationLookup>,
    store: Box<dyn KeyValueStore>,
    config: TranslationConfig,
    originals: RefCell<HashMap<NodeId, NodeText>>,
    node_languages: RefCell<HashMap<NodeId, String>>,
    cache: RefCell<TranslationCache>,
    language: RefCell<LanguageState>,
    /// 批次闸门，等待者按先来先服务排队
    gate: Mutex<()>,
    in_flight: Cell<bool>,
    next_index: Cell<usize>,
    storage_degraded: Cell<bool>,
}

impl<T: TextTree> TextSwapEngine<T> {
    /// 创建引擎
    ///
    /// 校验配置，然后从存储加载语言偏好和翻译缓存。存储不可用不会导致失败，
    /// 引擎会退回到默认语言和空缓存。
    ///
    /// # 参数
    /// - `tree`: 要改写的界面树
    /// - `lookup`: 翻译查询后端
    /// - `store`: 保存偏好和缓存的键值存储
    /// - `config`: 翻译配置
    ///
    /// # 错误
    /// - `TranslationError::ConfigError`: 配置无效
    pub fn new<L, S>(tree: T, lookup: L, store: S, config: TranslationConfig) -> TranslationResult<Self>
    where
        L: TranslationLookup + 'static,
        S: KeyValueStore + 'static,
    {
        config.validate()?;
        let source = normalize_lang(&config.source_lang)?;
        let target = normalize_lang(&config.target_lang)?;

        let engine = Self {
            tree,
            lookup: Box::new(lookup),
            store: Box::new(store),
            config,
            originals: RefCell::new(HashMap::new()),
            node_languages: RefCell::new(HashMap::new()),
            cache: RefCell::new(TranslationCache::new()),
            language: RefCell::new(LanguageState::new(&source, &target)),
            gate: Mutex::new(()),
            in_flight: Cell::new(false),
            next_index: Cell::new(0),
            storage_degraded: Cell::new(false),
        };

        engine.load_persisted_state();

        tracing::debug!(
            "引擎就绪: 查询后端 {}, 存储 {}, 当前语言 {}",
            engine.lookup.name(),
            engine.store.name(),
            engine.current_language()
        );

        Ok(engine)
    }

    fn load_persisted_state(&self) {
        match self.store.get(constants::PREFERENCE_KEY) {
            Ok(Some(saved)) => match normalize_lang(&saved) {
                Ok(lang) => {
                    tracing::debug!("读取到语言偏好: {}", lang);
                    self.language.borrow_mut().set(&lang);
                }
                Err(_) => tracing::warn!("忽略无效的语言偏好: {:?}", saved),
            },
            Ok(None) => {}
            Err(e) => self.storage_failed("读取语言偏好", e),
        }

        if !self.config.persist_cache || self.storage_degraded.get() {
            return;
        }

        match TranslationCache::load_from(self.store.as_ref()) {
            Ok(cache) => *self.cache.borrow_mut() = cache,
            // 内容损坏不代表存储不可用，下次写回时覆盖
            Err(TranslationError::SerializationError(e)) => {
                tracing::warn!("持久化的翻译缓存无法解析，使用空缓存: {}", e);
            }
            Err(e) => self.storage_failed("加载翻译缓存", e),
        }
    }

    fn storage_failed(&self, action: &str, error: TranslationError) {
        if !self.storage_degraded.replace(true) {
            tracing::warn!(
                "存储 {} 不可用（{}）: {}，此后仅使用内存状态",
                self.store.name(),
                action,
                error
            );
        } else {
            tracing::debug!("存储已降级，{}失败: {}", action, error);
        }
    }

    /// 记录原文快照
    ///
    /// 按文档顺序扫描可翻译节点，为缺少标识（或与前面节点标识重复）的节点分配新标识，
    /// 并为尚未记录的节点保存当前文本。已有记录永不覆盖，重复调用是幂等的。
    /// 已离开界面树的节点，其原文记录和语言记录在扫描时一并丢弃。
    ///
    /// # 返回值
    /// 本次新记录的节点数
    pub fn snapshot_originals(&self) -> usize {
        let nodes = self.tree.eligible_nodes();

        let mut originals = self.originals.borrow_mut();
        let mut node_languages = self.node_languages.borrow_mut();
        let source = self.language.borrow().source().to_string();

        let mut used: HashSet<NodeId> = nodes.iter().filter_map(|n| self.tree.node_id(n)).collect();
        used.extend(originals.keys().cloned());
        let mut seen = HashSet::new();
        let mut recorded = 0;

        for node in &nodes {
            let id = match self.tree.node_id(node) {
                Some(id) if !seen.contains(&id) => id,
                _ => {
                    let id = self.next_free_id(&used);
                    used.insert(id.clone());
                    self.tree.assign_node_id(node, &id);
                    id
                }
            };
            seen.insert(id.clone());

            if !originals.contains_key(&id) {
                originals.insert(id.clone(), self.tree.read_text(node));
                node_languages.insert(id, source.clone());
                recorded += 1;
            }
        }

        let before = originals.len();
        originals.retain(|id, _| seen.contains(id));
        node_languages.retain(|id, _| seen.contains(id));
        let dropped = before - originals.len();

        if recorded > 0 || dropped > 0 {
            tracing::debug!(
                "记录 {} 个节点的原文，丢弃 {} 个已移除节点，共 {} 个",
                recorded,
                dropped,
                originals.len()
            );
        }

        recorded
    }

    fn next_free_id(&self, used: &HashSet<NodeId>) -> NodeId {
        loop {
            let index = self.next_index.get();
            self.next_index.set(index + 1);

            let id = NodeId::numbered(constants::ID_PREFIX, index);
            if !used.contains(&id) {
                return id;
            }
        }
    }

    /// 把整个界面切换到指定语言
    ///
    /// 目标为源语言时恢复原文；否则每个节点都从原文快照出发解析译文。
    /// 正在执行的批次结束前，新请求会排队等待。
    ///
    /// # 参数
    /// - `lang`: 语言代码，会去除空白并转为小写
    ///
    /// # 返回值
    /// 批次报告。单个节点查询失败不会中断批次，失败节点记录在 `failed` 中并保持原样。
    ///
    /// # 错误
    /// - `TranslationError::InvalidInput`: 语言代码为空
    pub async fn translate_to(&self, lang: &str) -> TranslationResult<BatchReport> {
        let lang = normalize_lang(lang)?;
        let _gate = self.gate.lock().await;
        Ok(self.run_batch(&lang).await)
    }

    /// 切换到另一种语言（源语言与目标语言之间）
    pub async fn toggle(&self) -> TranslationResult<BatchReport> {
        let _gate = self.gate.lock().await;
        // 在闸门内读取，排队的切换请求看到的是前一次切换后的语言
        let next = self.language.borrow().other().to_string();
        Ok(self.run_batch(&next).await)
    }

    /// 启动时应用保存的语言偏好
    ///
    /// 偏好为源语言时什么都不做，返回 `None`。
    pub async fn apply_saved_preference(&self) -> TranslationResult<Option<BatchReport>> {
        let (current, is_source) = {
            let language = self.language.borrow();
            (language.current().to_string(), language.is_source())
        };

        if is_source {
            return Ok(None);
        }

        self.translate_to(&current).await.map(Some)
    }

    /// 需要持有闸门
    async fn run_batch(&self, lang: &str) -> BatchReport {
        let _in_flight = InFlight::start(&self.in_flight);
        let started = Instant::now();

        // 覆盖上次扫描之后新增的节点
        self.snapshot_originals();

        let source = self.language.borrow().source().to_string();
        let mut report = if lang == source {
            tracing::info!("恢复原文");
            let restored = self.restore_nodes(&source);
            let mut report = BatchReport::new(lang, restored);
            report.nodes_written = restored;
            report.restored = true;
            report
        } else {
            self.translate_nodes(lang).await
        };
        report.duration = started.elapsed();

        self.language.borrow_mut().set(lang);
        if report.restored {
            self.tree.restore_document_language(lang);
        } else {
            self.tree.set_document_language(lang);
        }
        self.persist_preference(lang);

        if self.config.persist_cache && self.config.flush_on_update && self.cache.borrow().is_dirty() {
            if let Err(e) = self.flush_cache() {
                tracing::debug!("缓存写回失败: {}", e);
            }
        }

        if report.is_complete() {
            tracing::info!(
                "切换到 {} 完成: {} 个节点, 耗时 {:?}",
                lang,
                report.nodes_written,
                report.duration
            );
        } else {
            tracing::warn!(
                "切换到 {} 部分完成: {}/{} 个节点, {} 个失败",
                lang,
                report.nodes_written,
                report.nodes_total,
                report.failed.len()
            );
        }

        report
    }

    async fn translate_nodes(&self, lang: &str) -> BatchReport {
        let jobs: Vec<(T::Node, NodeId, NodeText)> = {
            let originals = self.originals.borrow();
            self.tree
                .eligible_nodes()
                .into_iter()
                .filter_map(|node| {
                    let id = self.tree.node_id(&node)?;
                    let original = originals.get(&id)?.clone();
                    Some((node, id, original))
                })
                .collect()
        };

        tracing::info!("开始翻译 {} 个节点到 {}", jobs.len(), lang);
        let mut report = BatchReport::new(lang, jobs.len());

        let outcomes = join_all(
            jobs.into_iter()
                .map(|(node, id, original)| self.translate_node(node, id, original, lang)),
        )
        .await;

        for outcome in outcomes {
            match outcome {
                Ok(()) => report.nodes_written += 1,
                Err(failure) => report.failed.push(failure),
            }
        }

        report
    }

    /// 所有字段解析成功后一次写回，任一字段失败则节点保持原样
    async fn translate_node(
        &self,
        node: T::Node,
        id: NodeId,
        original: NodeText,
        lang: &str,
    ) -> Result<(), NodeFailure> {
        let mut translated = NodeText::default();

        for field in TextField::ALL {
            let Some(value) = original.field(field) else {
                continue;
            };

            match self.resolve_field(value, lang).await {
                Ok(resolved) => *translated.field_mut(field) = Some(resolved),
                Err(error) => {
                    tracing::warn!("节点 {} 翻译失败，保持原样: {}", id, error);
                    return Err(NodeFailure {
                        id,
                        text: value.to_string(),
                        error,
                    });
                }
            }
        }

        self.tree.write_text(&node, &translated);
        tracing::debug!("节点 {} 已切换到 {}", id, lang);
        self.node_languages.borrow_mut().insert(id, lang.to_string());

        Ok(())
    }

    /// 空白字段不查询；首尾空白保留在译文两侧
    async fn resolve_field(&self, value: &str, lang: &str) -> TranslationResult<String> {
        let core = value.trim();
        if core.is_empty() {
            return Ok(value.to_string());
        }

        let leading = &value[..value.len() - value.trim_start().len()];
        let trailing = &value[value.trim_end().len()..];
        let translated = self.resolve(core, lang).await?;

        Ok(format!("{}{}{}", leading, translated, trailing))
    }

    /// 解析单条文本
    ///
    /// 缓存命中时直接返回，不调用查询后端；未命中时查询并以“仅在不存在时写入”的方式
    /// 存入缓存，返回缓存中最终保存的值。查询失败不会写入缓存。
    ///
    /// # 错误
    /// - `TranslationError::InvalidInput`: 语言代码为空
    /// - 查询后端返回的错误，或配置了超时时的 `TranslationError::TimeoutError`
    pub async fn resolve(&self, text: &str, lang: &str) -> TranslationResult<String> {
        let lang = normalize_lang(lang)?;

        let cached = self.cache.borrow_mut().get(text, &lang);
        if let Some(hit) = cached {
            return Ok(hit);
        }

        let translated = match self.config.lookup_timeout() {
            Some(limit) => tokio::time::timeout(limit, self.lookup.lookup(text, &lang)).await??,
            None => self.lookup.lookup(text, &lang).await?,
        };

        Ok(self.cache.borrow_mut().insert(text, &lang, translated))
    }

    /// 把所有已记录原文的节点恢复为原文
    ///
    /// 与翻译批次共用闸门。没有记录的节点不受影响。当前语言不变，
    /// 需要同时更新语言时使用 `translate_to(源语言)`。
    ///
    /// # 返回值
    /// 恢复的节点数
    pub async fn restore_originals(&self) -> usize {
        let _gate = self.gate.lock().await;
        let _in_flight = InFlight::start(&self.in_flight);

        let source = self.language.borrow().source().to_string();
        self.restore_nodes(&source)
    }

    fn restore_nodes(&self, source: &str) -> usize {
        let nodes = self.tree.eligible_nodes();
        let originals = self.originals.borrow();
        let mut node_languages = self.node_languages.borrow_mut();
        let mut restored = 0;

        for node in &nodes {
            let Some(id) = self.tree.node_id(node) else {
                continue;
            };
            let Some(record) = originals.get(&id) else {
                continue;
            };

            self.tree.write_text(node, record);
            node_languages.insert(id, source.to_string());
            restored += 1;
        }

        restored
    }

    fn persist_preference(&self, lang: &str) {
        if self.storage_degraded.get() {
            return;
        }

        if let Err(e) = self.store.set(constants::PREFERENCE_KEY, lang) {
            self.storage_failed("保存语言偏好", e);
        }
    }

    /// 把翻译缓存写回存储（与存储中已有条目合并）
    ///
    /// 未启用缓存持久化时返回 `Ok(0)`。
    ///
    /// # 错误
    /// - `TranslationError::StorageError`: 存储不可用或已降级
    pub fn flush_cache(&self) -> TranslationResult<usize> {
        if !self.config.persist_cache {
            return Ok(0);
        }

        if self.storage_degraded.get() {
            return Err(helpers::storage_error("存储已降级，缓存只保存在内存中"));
        }

        let result = self.cache.borrow_mut().flush_to(self.store.as_ref());
        match result {
            Ok(count) => {
                tracing::debug!("写回 {} 条翻译缓存", count);
                Ok(count)
            }
            Err(e) => {
                self.storage_failed("写回翻译缓存", e.clone());
                Err(e)
            }
        }
    }

    /// 清空内存和存储中的翻译缓存
    pub fn clear_cache(&self) -> TranslationResult<()> {
        self.cache.borrow_mut().clear();

        if self.storage_degraded.get() {
            return Ok(());
        }

        if let Err(e) = self.store.remove(constants::CACHE_KEY) {
            self.storage_failed("清除翻译缓存", e.clone());
            return Err(e);
        }
        Ok(())
    }

    /// 当前语言
    pub fn current_language(&self) -> String {
        self.language.borrow().current().to_string()
    }

    /// 语言状态快照
    pub fn language_state(&self) -> LanguageState {
        self.language.borrow().clone()
    }

    /// 切换按钮的标签：下一种语言的本地名称
    pub fn toggle_label(&self) -> String {
        let language = self.language.borrow();
        self.config.display_name(language.other()).to_string()
    }

    /// 是否有批次正在执行
    pub fn is_translating(&self) -> bool {
        self.in_flight.get()
    }

    /// 节点当前显示的语言
    pub fn node_language(&self, id: &NodeId) -> Option<String> {
        self.node_languages.borrow().get(id).cloned()
    }

    /// 节点的原文快照
    pub fn original(&self, id: &NodeId) -> Option<NodeText> {
        self.originals.borrow().get(id).cloned()
    }

    /// 已记录原文的节点数
    pub fn originals_len(&self) -> usize {
        self.originals.borrow().len()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.borrow().stats()
    }

    /// 存储是否已降级为仅内存
    pub fn is_storage_degraded(&self) -> bool {
        self.storage_degraded.get()
    }

    pub fn tree(&self) -> &T {
        &self.tree
    }

    pub fn config(&self) -> &TranslationConfig {
        &self.config
    }

    /// 取回界面树
    pub fn into_tree(self) -> T {
        self.tree
    }
}
