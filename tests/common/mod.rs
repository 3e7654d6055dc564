// 集成测试公共模块
//
// 提供计数/失败的查询桩、不可用的存储桩以及共享的 HTML 页面

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use async_trait::async_trait;

use textswap::translation::error::helpers;
use textswap::translation::{
    KeyValueStore, MemoryStore, StaticTable, TextSwapEngine, TranslationConfig, TranslationError,
    TranslationLookup, TranslationResult, UiRegistry,
};

/// 记录调用次数和调用参数的查询桩
#[derive(Clone)]
pub struct CountingLookup {
    table: StaticTable,
    calls: Rc<Cell<usize>>,
    seen: Rc<RefCell<Vec<(String, String)>>>,
}

impl CountingLookup {
    pub fn new(table: StaticTable) -> Self {
        Self {
            table,
            calls: Rc::new(Cell::new(0)),
            seen: Rc::new(RefCell::new(Vec::new())),
        }
    }

    /// 调用计数的共享句柄，查询桩移入引擎后仍可读取
    pub fn counter(&self) -> Rc<Cell<usize>> {
        self.calls.clone()
    }

    pub fn seen(&self) -> Rc<RefCell<Vec<(String, String)>>> {
        self.seen.clone()
    }
}

#[async_trait(?Send)]
impl TranslationLookup for CountingLookup {
    fn name(&self) -> &str {
        "counting"
    }

    async fn lookup(&self, text: &str, target_lang: &str) -> TranslationResult<String> {
        self.calls.set(self.calls.get() + 1);
        self.seen
            .borrow_mut()
            .push((text.to_string(), target_lang.to_string()));
        self.table.lookup(text, target_lang).await
    }
}

/// 对指定原文抛出错误的查询桩
pub struct FailingLookup {
    table: StaticTable,
    poison: String,
}

impl FailingLookup {
    pub fn new(table: StaticTable, poison: &str) -> Self {
        Self {
            table,
            poison: poison.to_string(),
        }
    }
}

#[async_trait(?Send)]
impl TranslationLookup for FailingLookup {
    fn name(&self) -> &str {
        "failing"
    }

    async fn lookup(&self, text: &str, target_lang: &str) -> TranslationResult<String> {
        if text == self.poison {
            return Err(helpers::lookup_error(format!("无法翻译: {}", text)));
        }
        self.table.lookup(text, target_lang).await
    }
}

/// 每次访问都失败的存储，记录访问次数
#[derive(Clone, Default)]
pub struct UnavailableStore {
    attempts: Rc<Cell<usize>>,
}

impl UnavailableStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn attempts(&self) -> Rc<Cell<usize>> {
        self.attempts.clone()
    }

    fn fail<T>(&self) -> TranslationResult<T> {
        self.attempts.set(self.attempts.get() + 1);
        Err(TranslationError::StorageError("存储配额已满".to_string()))
    }
}

impl KeyValueStore for UnavailableStore {
    fn name(&self) -> &str {
        "unavailable"
    }

    fn get(&self, _key: &str) -> TranslationResult<Option<String>> {
        self.fail()
    }

    fn set(&self, _key: &str, _value: &str) -> TranslationResult<()> {
        self.fail()
    }

    fn remove(&self, _key: &str) -> TranslationResult<bool> {
        self.fail()
    }
}

/// Home/About/Contact 场景使用的短语表（没有 Contact）
pub fn scenario_table() -> StaticTable {
    StaticTable::new("hi")
        .with_phrase("Home", "मुख्य")
        .with_phrase("About", "परिचय")
}

/// 用注册表构建引擎
pub fn registry_engine<L>(texts: &[&str], lookup: L) -> TextSwapEngine<UiRegistry>
where
    L: TranslationLookup + 'static,
{
    TextSwapEngine::new(
        UiRegistry::from_texts(texts.iter().copied()),
        lookup,
        MemoryStore::new(),
        TranslationConfig::default(),
    )
    .expect("default config should be valid")
}

/// 把 `Option<String>` 列表转换成便于断言的形式
pub fn texts_of(registry: &UiRegistry) -> Vec<String> {
    registry
        .texts()
        .into_iter()
        .map(|text| text.unwrap_or_default())
        .collect()
}

/// HTML测试工具
pub struct HtmlTestHelper;

impl HtmlTestHelper {
    /// 部长办公室首页片段
    pub fn landing_page() -> &'static str {
        r##"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <title>Minister's Office</title>
    <script>const label = "Home";</script>
</head>
<body>
    <header>
        <span class="no-translate">Minister's Office</span>
        <nav>
            <a href="#home">Home</a>
            <a href="#about" title="About the Minister">About</a>
            <a href="#contact">Contact</a>
            <button class="lang-toggle" data-no-translate>हिंदी</button>
        </nav>
    </header>
    <section class="hero">
        <h1>Leading with Vision<span class="typed-cursor">|</span></h1>
        <p>  Dedicated to serving the people with integrity, transparency, and unwavering commitment to progress.  </p>
        <p>With <strong>decades</strong> of public service</p>
        <button>Learn More</button>
    </section>
    <section class="chat no-translate">
        <p>Shri Example</p>
        <button>Send</button>
    </section>
    <form>
        <input type="text" placeholder="Ask something...">
        <button aria-label="Send">Send</button>
    </form>
    <footer><p></p></footer>
</body>
</html>"##
    }
}
