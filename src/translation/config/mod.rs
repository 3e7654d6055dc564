//! 翻译配置管理模块
//!
//! 提供简化的配置管理，支持环境变量、配置文件和默认值

pub mod manager;

// 重新导出主要类型
pub use manager::{ConfigManager, TranslationConfig};

/// 配置常量
pub mod constants {
    // 语言设置
    pub const DEFAULT_SOURCE_LANG: &str = "en";
    pub const DEFAULT_TARGET_LANG: &str = "hi";

    // 持久化键
    pub const PREFERENCE_KEY: &str = "preferred-language";
    pub const CACHE_KEY: &str = "translation-cache";
    pub const DEFAULT_STORAGE_PATH: &str = "~/.local/share/textswap/storage.redb";

    // 节点标识
    pub const ID_ATTR: &str = "data-translate-id";
    pub const ID_PREFIX: &str = "element_";

    // 选择策略
    pub const EXCLUDE_CLASS: &str = "no-translate";
    pub const EXCLUDE_ATTR: &str = "data-no-translate";
    pub const OPT_IN_ATTR: &str = "data-translate";

    pub const ELIGIBLE_TAGS: &[&str] = &[
        "h1", "h2", "h3", "h4", "h5", "h6", "p", "span", "a", "button", "label", "li",
    ];

    // 仅在带有 placeholder 时才参与
    pub const PLACEHOLDER_TAGS: &[&str] = &["input", "textarea"];

    // 打字机动画的光标等装饰元素
    pub const SKIP_CLASSES: &[&str] = &["typed-cursor"];

    // 跳过的元素（连同子树）
    pub const SKIP_ELEMENTS: &[&str] = &[
        "script", "style", "noscript", "template", "svg", "math", "code", "pre",
    ];

    // 语言切换按钮上显示的本族语名称
    pub const LANGUAGE_NAMES: &[(&str, &str)] = &[("en", "English"), ("hi", "हिंदी")];

    // 翻译进行中的提示文字
    pub const LOADING_MESSAGE: &str = "Translating... / अनुवाद हो रहा है...";

    // 配置文件搜索路径
    pub const CONFIG_PATHS: &[&str] = &[
        "textswap.toml",
        ".textswap.toml",
        "~/.config/textswap/config.toml",
        "/etc/textswap/config.toml",
    ];
}

/// 便利函数
pub fn config_file_exists() -> bool {
    constants::CONFIG_PATHS
        .iter()
        .any(|path| std::path::Path::new(shellexpand::tilde(path).as_ref()).exists())
}

/// 加载配置，失败时退回默认配置
pub fn load_translation_config() -> TranslationConfig {
    match ConfigManager::new() {
        Ok(manager) => manager.into_config(),
        Err(e) => {
            tracing::warn!("配置加载失败，使用默认配置: {}", e);
            TranslationConfig::default()
        }
    }
}
