//! 当前语言状态

use crate::translation::error::{helpers, TranslationResult};

/// 规范化语言代码（去空白、转小写），空代码视为无效输入
pub fn normalize_lang(lang: &str) -> TranslationResult<String> {
    let lang = lang.trim().to_lowercase();
    if lang.is_empty() {
        return Err(helpers::validation_error("语言代码不能为空"));
    }
    Ok(lang)
}

/// 源语言、目标语言以及当前选中的语言
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageState {
    source: String,
    target: String,
    current: String,
}

impl LanguageState {
    /// 以源语言作为当前语言
    pub fn new(source: &str, target: &str) -> Self {
        Self {
            source: source.to_string(),
            target: target.to_string(),
            current: source.to_string(),
        }
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn current(&self) -> &str {
        &self.current
    }

    pub fn is_source(&self) -> bool {
        self.current == self.source
    }

    /// 切换按钮应当切换到的语言
    pub fn other(&self) -> &str {
        if self.is_source() {
            &self.target
        } else {
            &self.source
        }
    }

    pub fn set(&mut self, lang: &str) {
        self.current = lang.to_string();
    }
}
