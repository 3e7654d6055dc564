//! 静态短语表
//!
//! 内置一份英语到印地语的站点短语表，也可以从 TOML/JSON 文件加载额外短语。

use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::translation::config::constants;
use crate::translation::error::{helpers, TranslationError, TranslationResult};
use crate::translation::lookup::TranslationLookup;

/// 内置的印地语短语
const BUILTIN_HINDI: &[(&str, &str)] = &[
    // 导航
    ("Home", "मुख्य"),
    ("About", "परिचय"),
    ("Initiatives", "पहल"),
    ("News & Events", "समाचार और कार्यक्रम"),
    ("Gallery", "गैलरी"),
    ("Contact", "संपर्क"),
    ("FAQ", "सामान्य प्रश्न"),
    ("Minister Bot", "मंत्री बॉट"),
    // 首屏
    ("Leading with Vision", "दूरदर्शिता के साथ नेतृत्व"),
    ("Building a Stronger Future", "एक मजबूत भविष्य का निर्माण"),
    ("Serving with Integrity", "ईमानदारी के साथ सेवा"),
    ("Transforming Communities", "समुदायों का रूपांतरण"),
    (
        "Together, we build a stronger future for our nation and its people.",
        "मिलकर, हम अपने राष्ट्र और इसके लोगों के लिए एक मजबूत भविष्य का निर्माण करते हैं।",
    ),
    (
        "Dedicated to serving the people with integrity, transparency, and unwavering commitment to progress.",
        "ईमानदारी, पारदर्शिता और प्रगति के लिए अटूट प्रतिबद्धता के साथ लोगों की सेवा करने के लिए समर्पित।",
    ),
    ("Learn More", "और जानें"),
    ("Explore Initiatives", "पहलों का अन्वेषण करें"),
    ("Scroll to explore", "अन्वेषण के लिए स्क्रॉल करें"),
    // 简介
    ("About the Minister", "मंत्री के बारे में"),
    (
        "With decades of public service and a vision for transformative change, our Minister stands as a beacon of hope and progress for our nation.",
        "दशकों की सार्वजनिक सेवा और परिवर्तनकारी बदलाव की दृष्टि के साथ, हमारे मंत्री हमारे राष्ट्र के लिए आशा और प्रगति की किरण हैं।",
    ),
    ("Read More", "और पढ़ें"),
    ("Excellence in Public Service", "सार्वजनिक सेवा में उत्कृष्टता"),
    ("Community Leadership Award", "सामुदायिक नेतृत्व पुरस्कार"),
    ("International Cooperation Medal", "अंतर्राष्ट्रीय सहयोग पदक"),
    ("Citizens Served", "नागरिकों की सेवा की गई"),
    ("Policies Implemented", "नीतियां लागू की गईं"),
    ("Satisfaction Rate", "संतुष्टि दर"),
    ("Awards Received", "प्राप्त पुरस्कार"),
    // 新闻与号召
    ("Latest News & Updates", "नवीनतम समाचार और अपडेट"),
    ("Join Our Community", "हमारे समुदाय में शामिल हों"),
    (
        "Stay informed about the latest initiatives and be part of the change.",
        "नवीनतम पहलों के बारे में जानकारी रखें और बदलाव का हिस्सा बनें।",
    ),
    ("Stay Informed", "सूचित रहें"),
    // 聊天助手
    ("Chat with Minister's AI Assistant", "मंत्री के AI सहायक से चैट करें"),
    (
        "Get immediate answers to common questions about policies, initiatives, and more.",
        "नीतियों, पहलों और अन्य के बारे में सामान्य प्रश्नों के तुरंत उत्तर प्राप्त करें।",
    ),
    ("Start a Conversation", "बातचीत शुरू करें"),
    (
        "Hello! How can I assist you today regarding the Minister's work?",
        "नमस्ते! मैं आज मंत्री के कार्य के संबंध में आपकी कैसे सहायता कर सकता हूं?",
    ),
    ("Ask something...", "कुछ पूछें..."),
    ("Send", "भेजें"),
    (
        "What are the current policy initiatives?",
        "वर्तमान नीतिगत पहल क्या हैं?",
    ),
    (
        "How can I get involved in community programs?",
        "मैं सामुदायिक कार्यक्रमों में कैसे शामिल हो सकता हूं?",
    ),
    (
        "What is the healthcare reform about?",
        "स्वास्थ्य सुधार के बारे में क्या है?",
    ),
    ("Tell me about education initiatives", "शिक्षा पहलों के बारे में बताएं"),
    // 页脚
    (
        "© 2025 Minister's Office. All rights reserved.",
        "© 2025 मंत्री कार्यालय। सभी अधिकार सुरक्षित।",
    ),
    ("Privacy Policy", "गोपनीयता नीति"),
    ("Terms of Service", "सेवा की शर्तें"),
    // 通用
    ("Minister's Office", "मंत्री कार्यालय"),
    ("English", "अंग्रेजी"),
    ("हिंदी", "हिंदी"),
];

/// 短语表文件格式
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct TableFile {
    lang: String,
    #[serde(default)]
    phrases: BTreeMap<String, String>,
}

/// 单一目标语言的短语表
///
/// 只对自身语言的请求做查询，其他语言以及表中没有的短语都原样返回。
#[derive(Debug, Clone)]
pub struct StaticTable {
    lang: String,
    phrases: HashMap<String, String>,
}

impl StaticTable {
    /// 空表
    pub fn new(lang: &str) -> Self {
        Self {
            lang: lang.trim().to_lowercase(),
            phrases: HashMap::new(),
        }
    }

    /// 内置印地语短语表
    pub fn builtin() -> Self {
        let mut table = Self::new(constants::DEFAULT_TARGET_LANG);
        for (source, target) in BUILTIN_HINDI {
            table.insert(*source, *target);
        }
        table
    }

    pub fn with_phrase(mut self, source: &str, target: &str) -> Self {
        self.insert(source, target);
        self
    }

    /// 添加或覆盖一条短语
    pub fn insert(&mut self, source: &str, target: &str) {
        self.phrases.insert(source.to_string(), target.to_string());
    }

    /// 并入另一张同语言的表，同名短语以 `other` 为准，返回并入条数
    pub fn merge(&mut self, other: StaticTable) -> TranslationResult<usize> {
        if other.lang != self.lang {
            return Err(TranslationError::InvalidInput(format!(
                "短语表语言不一致: {} 与 {}",
                self.lang, other.lang
            )));
        }

        let count = other.phrases.len();
        self.phrases.extend(other.phrases);
        Ok(count)
    }

    /// 解析 TOML 短语表
    ///
    /// ```toml
    /// lang = "hi"
    ///
    /// [phrases]
    /// "Home" = "मुख्य"
    /// ```
    pub fn from_toml_str(content: &str) -> TranslationResult<Self> {
        let file: TableFile = toml::from_str(content)?;
        Self::from_table_file(file)
    }

    /// 解析 JSON 短语表，结构与 TOML 相同
    pub fn from_json_str(content: &str) -> TranslationResult<Self> {
        let file: TableFile = serde_json::from_str(content)?;
        Self::from_table_file(file)
    }

    /// 按扩展名读取短语表文件
    pub fn from_file<P: AsRef<Path>>(path: P) -> TranslationResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            TranslationError::ConfigError(format!("无法读取短语表 {}: {}", path.display(), e))
        })?;

        let table = match path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Self::from_json_str(&content)?,
            _ => Self::from_toml_str(&content)?,
        };

        tracing::debug!("从 {} 加载 {} 条短语", path.display(), table.len());
        Ok(table)
    }

    fn from_table_file(file: TableFile) -> TranslationResult<Self> {
        if file.lang.trim().is_empty() {
            return Err(helpers::config_error("短语表缺少 lang"));
        }

        let mut table = Self::new(&file.lang);
        for (source, target) in file.phrases {
            table.insert(&source, &target);
        }
        Ok(table)
    }

    /// 表的目标语言
    pub fn lang(&self) -> &str {
        &self.lang
    }

    /// 精确查询短语
    pub fn get(&self, source: &str) -> Option<&str> {
        self.phrases.get(source).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }
}

impl Default for StaticTable {
    fn default() -> Self {
        Self::builtin()
    }
}

#[async_trait(?Send)]
impl TranslationLookup for StaticTable {
    fn name(&self) -> &str {
        "static-table"
    }

    async fn lookup(&self, text: &str, target_lang: &str) -> TranslationResult<String> {
        if target_lang != self.lang {
            return Ok(text.to_string());
        }

        Ok(self.get(text).unwrap_or(text).to_string())
    }
}
