//! 简化的配置管理器
//!
//! 提供统一的配置接口，支持文件配置、环境变量和默认值

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::constants;
use crate::translation::error::{helpers, TranslationError, TranslationResult};

/// 翻译配置
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct TranslationConfig {
    // 语言配置
    pub source_lang: String,
    pub target_lang: String,

    // 节点选择
    pub id_attr: String,
    pub exclude_class: String,
    pub exclude_attr: String,
    pub opt_in_attr: String,
    pub eligible_tags: Vec<String>,
    pub placeholder_tags: Vec<String>,
    pub skip_classes: Vec<String>,
    pub skip_elements: Vec<String>,

    // 存储配置
    pub storage_path: Option<String>,
    pub persist_cache: bool,
    pub flush_on_update: bool,

    // 查找配置
    pub table_path: Option<String>,
    pub lookup_timeout_ms: Option<u64>,

    // 语言显示名称（放在最后，TOML 表必须位于普通键之后）
    pub language_names: BTreeMap<String, String>,
}

fn owned(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl Default for TranslationConfig {
    fn default() -> Self {
        Self {
            source_lang: constants::DEFAULT_SOURCE_LANG.to_string(),
            target_lang: constants::DEFAULT_TARGET_LANG.to_string(),
            language_names: constants::LANGUAGE_NAMES
                .iter()
                .map(|(code, name)| (code.to_string(), name.to_string()))
                .collect(),

            id_attr: constants::ID_ATTR.to_string(),
            exclude_class: constants::EXCLUDE_CLASS.to_string(),
            exclude_attr: constants::EXCLUDE_ATTR.to_string(),
            opt_in_attr: constants::OPT_IN_ATTR.to_string(),
            eligible_tags: owned(constants::ELIGIBLE_TAGS),
            placeholder_tags: owned(constants::PLACEHOLDER_TAGS),
            skip_classes: owned(constants::SKIP_CLASSES),
            skip_elements: owned(constants::SKIP_ELEMENTS),

            storage_path: None,
            persist_cache: true,
            flush_on_update: true,

            table_path: None,
            lookup_timeout_ms: None,
        }
    }
}

impl TranslationConfig {
    /// 创建带指定语言对的默认配置
    pub fn with_languages(source_lang: &str, target_lang: &str) -> Self {
        Self {
            source_lang: source_lang.to_string(),
            target_lang: target_lang.to_string(),
            ..Self::default()
        }
    }

    /// 验证配置
    pub fn validate(&self) -> TranslationResult<()> {
        if self.source_lang.trim().is_empty() || self.target_lang.trim().is_empty() {
            return Err(helpers::config_error("语言代码不能为空"));
        }

        if self.source_lang.eq_ignore_ascii_case(&self.target_lang) {
            return Err(TranslationError::ConfigError(format!(
                "源语言与目标语言相同: {}",
                self.source_lang
            )));
        }

        if self.id_attr.trim().is_empty() {
            return Err(helpers::config_error("节点标识属性不能为空"));
        }

        if self.exclude_class.trim().is_empty() && self.exclude_attr.trim().is_empty() {
            return Err(helpers::config_error("至少需要一种排除标记"));
        }

        if self.lookup_timeout_ms == Some(0) {
            return Err(helpers::config_error("查找超时必须大于0"));
        }

        Ok(())
    }

    /// 应用环境变量覆盖，只处理显式设置的变量
    pub fn apply_env_overrides(&mut self) {
        use crate::env::{storage, translation, EnvVar};

        match translation::SourceLang::get_if_set() {
            Some(Ok(lang)) => self.source_lang = lang,
            Some(Err(e)) => tracing::warn!("忽略无效的环境变量: {}", e),
            None => {}
        }

        match translation::TargetLang::get_if_set() {
            Some(Ok(lang)) => self.target_lang = lang,
            Some(Err(e)) => tracing::warn!("忽略无效的环境变量: {}", e),
            None => {}
        }

        match translation::TablePath::get_if_set() {
            Some(Ok(path)) => self.table_path = Some(path),
            Some(Err(e)) => tracing::warn!("忽略无效的环境变量: {}", e),
            None => {}
        }

        match translation::LookupTimeout::get_if_set() {
            Some(Ok(timeout)) => self.lookup_timeout_ms = Some(timeout.as_millis() as u64),
            Some(Err(e)) => tracing::warn!("忽略无效的环境变量: {}", e),
            None => {}
        }

        match storage::Path::get_if_set() {
            Some(Ok(path)) => {
                tracing::info!("环境变量覆盖存储路径: {}", path);
                self.storage_path = Some(path);
            }
            Some(Err(e)) => tracing::warn!("忽略无效的环境变量: {}", e),
            None => {}
        }

        match storage::PersistCache::get_if_set() {
            Some(Ok(persist)) => self.persist_cache = persist,
            Some(Err(e)) => tracing::warn!("忽略无效的环境变量: {}", e),
            None => {}
        }

        match storage::FlushOnUpdate::get_if_set() {
            Some(Ok(flush)) => self.flush_on_update = flush,
            Some(Err(e)) => tracing::warn!("忽略无效的环境变量: {}", e),
            None => {}
        }
    }

    /// 查找超时
    pub fn lookup_timeout(&self) -> Option<Duration> {
        self.lookup_timeout_ms.map(Duration::from_millis)
    }

    /// 展开 `~` 之后的存储路径
    pub fn resolved_storage_path(&self) -> PathBuf {
        let raw = self
            .storage_path
            .as_deref()
            .unwrap_or(constants::DEFAULT_STORAGE_PATH);
        PathBuf::from(shellexpand::tilde(raw).as_ref())
    }

    /// 语言的显示名称，未配置时返回语言代码本身
    pub fn display_name<'a>(&'a self, lang: &'a str) -> &'a str {
        self.language_names
            .get(lang)
            .map(String::as_str)
            .unwrap_or(lang)
    }
}

/// 配置管理器
pub struct ConfigManager {
    config: TranslationConfig,
    source: Option<PathBuf>,
}

impl ConfigManager {
    /// 搜索默认路径加载配置，并应用环境变量
    pub fn new() -> TranslationResult<Self> {
        Self::load_dotenv();

        let source = constants::CONFIG_PATHS
            .iter()
            .map(|path| PathBuf::from(shellexpand::tilde(path).as_ref()))
            .find(|path| path.exists());

        let config = match &source {
            Some(path) => {
                tracing::info!("加载配置文件: {}", path.display());
                Self::load_from_file(path)?
            }
            None => {
                tracing::info!("未找到配置文件，使用默认配置");
                TranslationConfig::default()
            }
        };

        Self::finish(config, source)
    }

    /// 从指定文件加载配置，并应用环境变量
    pub fn from_file<P: AsRef<Path>>(path: P) -> TranslationResult<Self> {
        let path = PathBuf::from(shellexpand::tilde(&path.as_ref().to_string_lossy()).as_ref());
        let config = Self::load_from_file(&path)?;
        Self::finish(config, Some(path))
    }

    fn finish(mut config: TranslationConfig, source: Option<PathBuf>) -> TranslationResult<Self> {
        config.apply_env_overrides();
        config.validate()?;
        Ok(Self { config, source })
    }

    /// 获取配置
    pub fn get_config(&self) -> &TranslationConfig {
        &self.config
    }

    /// 取出配置
    pub fn into_config(self) -> TranslationConfig {
        self.config
    }

    /// 配置来源文件
    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    /// 从指定文件解析配置（TOML 或 JSON）
    fn load_from_file(path: &Path) -> TranslationResult<TranslationConfig> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| TranslationError::ConfigError(format!("读取配置文件失败: {}", e)))?;

        if path.extension().and_then(|ext| ext.to_str()) == Some("json") {
            serde_json::from_str(&content)
                .map_err(|e| TranslationError::ConfigError(format!("解析JSON配置失败: {}", e)))
        } else {
            toml::from_str(&content)
                .map_err(|e| TranslationError::ConfigError(format!("解析TOML配置失败: {}", e)))
        }
    }

    /// 加载 .env 文件
    fn load_dotenv() {
        let env_files = [".env.local", ".env"];

        for env_file in &env_files {
            if Path::new(env_file).exists() && dotenv::from_filename(env_file).is_ok() {
                tracing::info!("已加载环境变量文件: {}", env_file);
                break;
            }
        }
    }

    /// 生成示例配置文件
    pub fn generate_example_config<P: AsRef<Path>>(path: P) -> TranslationResult<()> {
        let config = TranslationConfig::default();
        let content = toml::to_string_pretty(&config)
            .map_err(|e| TranslationError::ConfigError(format!("序列化配置失败: {}", e)))?;

        std::fs::write(path, content)
            .map_err(|e| TranslationError::ConfigError(format!("写入配置文件失败: {}", e)))?;

        Ok(())
    }
}
