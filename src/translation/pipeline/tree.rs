//! 文本树接口
//!
//! 引擎通过 [`TextTree`] 访问界面树：枚举可翻译节点、读写节点文本、
//! 维护节点的稳定标识。HTML 文档和显式注册表各有一个实现。

use std::fmt;

use serde::{Deserialize, Serialize};

/// 节点的稳定标识，分配一次后在节点生命周期内不变
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeId(String);

impl NodeId {
    pub fn new<S: Into<String>>(id: S) -> Self {
        Self(id.into())
    }

    /// 按序号生成标识，如 `element_3`
    pub fn numbered(prefix: &str, index: usize) -> Self {
        Self(format!("{}{}", prefix, index))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

/// 节点上需要替换的全部文本字段
///
/// `None` 表示该字段不存在（或文本不受管理），读写时都会跳过。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeText {
    pub text: Option<String>,
    pub placeholder: Option<String>,
    pub title: Option<String>,
    pub aria_label: Option<String>,
}

/// 文本字段种类
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextField {
    Text,
    Placeholder,
    Title,
    AriaLabel,
}

impl TextField {
    pub const ALL: [TextField; 4] = [
        TextField::Text,
        TextField::Placeholder,
        TextField::Title,
        TextField::AriaLabel,
    ];

    /// 对应的 HTML 属性名（正文没有属性）
    pub fn attr_name(self) -> Option<&'static str> {
        match self {
            TextField::Text => None,
            TextField::Placeholder => Some("placeholder"),
            TextField::Title => Some("title"),
            TextField::AriaLabel => Some("aria-label"),
        }
    }
}

impl NodeText {
    /// 仅含正文的节点文本
    pub fn text<S: Into<String>>(text: S) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }

    pub fn with_placeholder<S: Into<String>>(mut self, placeholder: S) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn with_title<S: Into<String>>(mut self, title: S) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_aria_label<S: Into<String>>(mut self, aria_label: S) -> Self {
        self.aria_label = Some(aria_label.into());
        self
    }

    pub fn field(&self, field: TextField) -> Option<&str> {
        match field {
            TextField::Text => self.text.as_deref(),
            TextField::Placeholder => self.placeholder.as_deref(),
            TextField::Title => self.title.as_deref(),
            TextField::AriaLabel => self.aria_label.as_deref(),
        }
    }

    pub fn field_mut(&mut self, field: TextField) -> &mut Option<String> {
        match field {
            TextField::Text => &mut self.text,
            TextField::Placeholder => &mut self.placeholder,
            TextField::Title => &mut self.title,
            TextField::AriaLabel => &mut self.aria_label,
        }
    }

    /// 是否没有任何受管理的字段
    pub fn is_empty(&self) -> bool {
        TextField::ALL.iter().all(|field| self.field(*field).is_none())
    }
}

/// 引擎所需的界面树能力
///
/// 所有方法都取 `&self`：实现依靠内部可变性修改节点，
/// 引擎只持有按标识查找得到的非拥有引用。
pub trait TextTree {
    /// 节点句柄，克隆应当廉价
    type Node: Clone;

    /// 按文档顺序返回当前所有可翻译节点，带排除标记的节点（及其子树）不会出现
    fn eligible_nodes(&self) -> Vec<Self::Node>;

    /// 读取节点上已有的标识
    fn node_id(&self, node: &Self::Node) -> Option<NodeId>;

    /// 为节点附加标识
    fn assign_node_id(&self, node: &Self::Node, id: &NodeId);

    /// 读取节点当前显示的文本
    fn read_text(&self, node: &Self::Node) -> NodeText;

    /// 写入文本，只处理值为 `Some` 的字段
    fn write_text(&self, node: &Self::Node, text: &NodeText);

    /// 记录整个文档当前的语言（如 `<html lang>`），默认不做任何事
    fn set_document_language(&self, _lang: &str) {}

    /// 恢复原文时调用，默认等同于把文档语言设为源语言
    fn restore_document_language(&self, source_lang: &str) {
        self.set_document_language(source_lang);
    }
}
