//! 翻译查询模块
//!
//! 引擎通过 [`TranslationLookup`] 获取译文。这里不做真正的机器翻译：
//! 内置的 [`StaticTable`] 按短语表查询，找不到时原样返回。

pub mod table;

use std::time::Duration;

use async_trait::async_trait;

use crate::translation::error::TranslationResult;

pub use table::StaticTable;

/// 翻译查询后端
///
/// 单线程运行，返回的 future 不要求 `Send`。
#[async_trait(?Send)]
pub trait TranslationLookup {
    /// 后端名称，用于日志
    fn name(&self) -> &str;

    /// 把 `text` 翻译成 `target_lang`，没有译文时应当返回原文
    async fn lookup(&self, text: &str, target_lang: &str) -> TranslationResult<String>;
}

#[async_trait(?Send)]
impl<L: TranslationLookup + ?Sized> TranslationLookup for Box<L> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn lookup(&self, text: &str, target_lang: &str) -> TranslationResult<String> {
        (**self).lookup(text, target_lang).await
    }
}

/// 用同步闭包实现的查询后端
pub struct FnLookup<F> {
    name: String,
    func: F,
}

/// 用闭包构建查询后端
///
/// ```
/// use textswap::translation::lookup::lookup_fn;
///
/// let upper = lookup_fn("upper", |text: &str, _lang: &str| Ok(text.to_uppercase()));
/// # let _ = upper;
/// ```
pub fn lookup_fn<F>(name: impl Into<String>, func: F) -> FnLookup<F>
where
    F: Fn(&str, &str) -> TranslationResult<String>,
{
    FnLookup {
        name: name.into(),
        func,
    }
}

#[async_trait(?Send)]
impl<F> TranslationLookup for FnLookup<F>
where
    F: Fn(&str, &str) -> TranslationResult<String>,
{
    fn name(&self) -> &str {
        &self.name
    }

    async fn lookup(&self, text: &str, target_lang: &str) -> TranslationResult<String> {
        (self.func)(text, target_lang)
    }
}

/// 为每次查询加上固定延迟，模拟网络往返
pub struct DelayedLookup<L> {
    inner: L,
    delay: Duration,
}

impl<L: TranslationLookup> DelayedLookup<L> {
    pub fn new(inner: L, delay: Duration) -> Self {
        Self { inner, delay }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }
}

#[async_trait(?Send)]
impl<L: TranslationLookup> TranslationLookup for DelayedLookup<L> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    async fn lookup(&self, text: &str, target_lang: &str) -> TranslationResult<String> {
        tokio::time::sleep(self.delay).await;
        self.inner.lookup(text, target_lang).await
    }
}
