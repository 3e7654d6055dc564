//! HTML 文本收集器模块
//!
//! 在 html5ever 的 DOM 上实现 [`TextTree`]：按选择策略收集可翻译元素，
//! 读写元素自身文本和 `placeholder`/`title`/`aria-label` 属性。

use std::cell::{OnceCell, RefCell};

use markup5ever_rcdom::{Handle, NodeData, RcDom};

use crate::html::{
    get_child_node_by_name, get_node_attr, get_own_text, has_class, html_to_dom,
    serialize_to_string, set_node_attr, set_own_text,
};
use crate::translation::config::TranslationConfig;
use crate::translation::error::TranslationResult;
use crate::translation::pipeline::tree::{NodeId, NodeText, TextField, TextTree};

/// 元素选择策略
#[derive(Debug, Clone)]
pub struct SelectionPolicy {
    /// 写入节点标识的属性
    pub id_attr: String,
    /// 排除类名
    pub exclude_class: String,
    /// 排除属性
    pub exclude_attr: String,
    /// 显式参与翻译的属性
    pub opt_in_attr: String,
    /// 可翻译的标签
    pub eligible_tags: Vec<String>,
    /// 仅在有 placeholder 时参与的标签
    pub placeholder_tags: Vec<String>,
    /// 带这些类名的元素本身不参与
    pub skip_classes: Vec<String>,
    /// 整个子树都被跳过的标签
    pub skip_elements: Vec<String>,
}

impl Default for SelectionPolicy {
    fn default() -> Self {
        Self::from(&TranslationConfig::default())
    }
}

impl From<&TranslationConfig> for SelectionPolicy {
    fn from(config: &TranslationConfig) -> Self {
        Self {
            id_attr: config.id_attr.clone(),
            exclude_class: config.exclude_class.clone(),
            exclude_attr: config.exclude_attr.clone(),
            opt_in_attr: config.opt_in_attr.clone(),
            eligible_tags: lowercase(&config.eligible_tags),
            placeholder_tags: lowercase(&config.placeholder_tags),
            skip_classes: config.skip_classes.clone(),
            skip_elements: lowercase(&config.skip_elements),
        }
    }
}

fn lowercase(items: &[String]) -> Vec<String> {
    items.iter().map(|s| s.to_lowercase()).collect()
}

impl SelectionPolicy {
    /// 元素是否带有排除标记
    pub fn is_exempt(&self, node: &Handle) -> bool {
        (!self.exclude_class.is_empty() && has_class(node, &self.exclude_class))
            || (!self.exclude_attr.is_empty() && get_node_attr(node, &self.exclude_attr).is_some())
    }

    /// 是否整个跳过该标签的子树
    pub fn should_skip_element(&self, tag_name: &str) -> bool {
        self.skip_elements.iter().any(|t| t == tag_name)
    }

    /// 元素本身是否可翻译（不考虑祖先的排除标记）
    pub fn is_eligible(&self, node: &Handle, tag_name: &str) -> bool {
        if self.skip_classes.iter().any(|class| has_class(node, class)) {
            return false;
        }

        if get_node_attr(node, &self.opt_in_attr).is_some() {
            return true;
        }

        if self.eligible_tags.iter().any(|t| t == tag_name) {
            return true;
        }

        self.placeholder_tags.iter().any(|t| t == tag_name)
            && get_node_attr(node, "placeholder").is_some()
    }
}

/// 收集统计信息
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectionStats {
    pub nodes_visited: usize,
    pub nodes_skipped: usize,
    pub exempt_subtrees: usize,
    pub eligible_nodes: usize,
}

impl CollectionStats {
    /// 重置统计
    pub fn reset(&mut self) {
        *self = Default::default();
    }
}

/// 基于 rcdom 的可翻译文档
pub struct HtmlTree {
    dom: RcDom,
    policy: SelectionPolicy,
    stats: RefCell<CollectionStats>,
    /// 首次改写前 `<html lang>` 的值（`None` 表示没有该属性）
    original_lang: OnceCell<Option<String>>,
}

impl HtmlTree {
    /// 包装已解析的 DOM
    pub fn new(dom: RcDom, policy: SelectionPolicy) -> Self {
        Self {
            dom,
            policy,
            stats: RefCell::new(CollectionStats::default()),
            original_lang: OnceCell::new(),
        }
    }

    /// 解析 HTML 字符串
    pub fn parse(html: &str, policy: SelectionPolicy) -> TranslationResult<Self> {
        Ok(Self::new(html_to_dom(html.as_bytes(), "utf-8")?, policy))
    }

    /// 底层 DOM
    pub fn dom(&self) -> &RcDom {
        &self.dom
    }

    /// 选择策略
    pub fn policy(&self) -> &SelectionPolicy {
        &self.policy
    }

    /// 取回底层 DOM
    pub fn into_dom(self) -> RcDom {
        self.dom
    }

    /// 最近一次收集的统计
    pub fn stats(&self) -> CollectionStats {
        self.stats.borrow().clone()
    }

    /// 序列化当前文档
    pub fn to_html(&self) -> TranslationResult<String> {
        serialize_to_string(&self.dom.document)
    }

    /// 按标识查找可翻译元素
    pub fn find_by_id(&self, id: &NodeId) -> Option<Handle> {
        self.eligible_nodes()
            .into_iter()
            .find(|node| self.node_id(node).as_ref() == Some(id))
    }

    /// 递归收集
    fn collect_recursive(&self, node: &Handle, out: &mut Vec<Handle>, stats: &mut CollectionStats) {
        stats.nodes_visited += 1;

        match node.data {
            NodeData::Element { ref name, .. } => {
                let tag_name = name.local.as_ref().to_lowercase();

                if self.policy.should_skip_element(&tag_name) {
                    stats.nodes_skipped += 1;
                    return;
                }

                // 排除标记作用于整个子树
                if self.policy.is_exempt(node) {
                    stats.exempt_subtrees += 1;
                    return;
                }

                if self.policy.is_eligible(node, &tag_name) {
                    stats.eligible_nodes += 1;
                    out.push(node.clone());
                }

                for child in node.children.borrow().iter() {
                    self.collect_recursive(child, out, stats);
                }
            }
            NodeData::Document => {
                for child in node.children.borrow().iter() {
                    self.collect_recursive(child, out, stats);
                }
            }
            _ => {}
        }
    }
}

impl TextTree for HtmlTree {
    type Node = Handle;

    fn eligible_nodes(&self) -> Vec<Handle> {
        let mut nodes = Vec::new();
        let mut stats = CollectionStats::default();

        self.collect_recursive(&self.dom.document, &mut nodes, &mut stats);

        tracing::trace!(
            "收集可翻译元素: 访问 {} 个节点, 可翻译 {} 个, 排除子树 {} 个",
            stats.nodes_visited,
            stats.eligible_nodes,
            stats.exempt_subtrees
        );
        *self.stats.borrow_mut() = stats;

        nodes
    }

    fn node_id(&self, node: &Handle) -> Option<NodeId> {
        get_node_attr(node, &self.policy.id_attr).map(NodeId::new)
    }

    fn assign_node_id(&self, node: &Handle, id: &NodeId) {
        set_node_attr(node, &self.policy.id_attr, Some(id.to_string()));
    }

    fn read_text(&self, node: &Handle) -> NodeText {
        let mut text = NodeText {
            text: get_own_text(node),
            ..NodeText::default()
        };

        for field in TextField::ALL {
            if let Some(attr_name) = field.attr_name() {
                *text.field_mut(field) = get_node_attr(node, attr_name);
            }
        }

        text
    }

    fn write_text(&self, node: &Handle, text: &NodeText) {
        for field in TextField::ALL {
            let Some(value) = text.field(field) else {
                continue;
            };

            match field.attr_name() {
                Some(attr_name) => set_node_attr(node, attr_name, Some(value.to_string())),
                None => set_own_text(node, value),
            }
        }
    }

    fn set_document_language(&self, lang: &str) {
        if let Some(html) = get_child_node_by_name(&self.dom.document, "html") {
            self.original_lang.get_or_init(|| get_node_attr(&html, "lang"));
            set_node_attr(&html, "lang", Some(lang.to_string()));
        }
    }

    /// 写回首次改写前的 `lang`，原本没有该属性时将其移除
    fn restore_document_language(&self, _source_lang: &str) {
        let Some(original) = self.original_lang.get() else {
            return;
        };
        if let Some(html) = get_child_node_by_name(&self.dom.document, "html") {
            set_node_attr(&html, "lang", original.clone());
        }
    }
}
