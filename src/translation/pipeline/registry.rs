//! 显式注册的界面树
//!
//! 组件在创建时向注册表登记自己（以及是否豁免翻译），
//! 无需每次切换语言都重新扫描整棵树来推导节点身份。

use std::cell::{Cell, RefCell};

use crate::translation::config::constants;
use crate::translation::pipeline::tree::{NodeId, NodeText, TextTree};

#[derive(Debug, Clone)]
struct RegisteredElement {
    id: NodeId,
    exempt: bool,
    text: NodeText,
}

/// 按注册顺序排列的界面元素表
#[derive(Debug, Default)]
pub struct UiRegistry {
    elements: RefCell<Vec<RegisteredElement>>,
    next_index: Cell<usize>,
}

impl UiRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// 由一组正文快速构建注册表
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let registry = Self::new();
        for text in texts {
            registry.register(NodeText::text(text));
        }
        registry
    }

    /// 登记一个可翻译元素，返回分配的标识
    pub fn register(&self, text: NodeText) -> NodeId {
        self.insert(text, false)
    }

    /// 登记一个豁免元素（专有名词、品牌名、已本地化的控件）
    pub fn register_exempt(&self, text: NodeText) -> NodeId {
        self.insert(text, true)
    }

    fn insert(&self, text: NodeText, exempt: bool) -> NodeId {
        let index = self.next_index.get();
        self.next_index.set(index + 1);

        let id = NodeId::numbered(constants::ID_PREFIX, index);
        self.elements.borrow_mut().push(RegisteredElement {
            id: id.clone(),
            exempt,
            text,
        });
        id
    }

    /// 注销元素，返回是否存在
    pub fn unregister(&self, id: &NodeId) -> bool {
        let mut elements = self.elements.borrow_mut();
        let before = elements.len();
        elements.retain(|element| &element.id != id);
        elements.len() != before
    }

    /// 渲染代码直接修改元素文本（例如组件重新渲染）
    pub fn set_text(&self, id: &NodeId, text: NodeText) -> bool {
        match self.elements.borrow_mut().iter_mut().find(|e| &e.id == id) {
            Some(element) => {
                element.text = text;
                true
            }
            None => false,
        }
    }

    /// 当前显示的文本，不区分是否豁免
    pub fn text(&self, id: &NodeId) -> Option<NodeText> {
        self.elements
            .borrow()
            .iter()
            .find(|e| &e.id == id)
            .map(|e| e.text.clone())
    }

    /// 所有元素当前正文，按注册顺序
    pub fn texts(&self) -> Vec<Option<String>> {
        self.elements
            .borrow()
            .iter()
            .map(|e| e.text.text.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.elements.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.borrow().is_empty()
    }
}

impl TextTree for UiRegistry {
    type Node = NodeId;

    fn eligible_nodes(&self) -> Vec<NodeId> {
        self.elements
            .borrow()
            .iter()
            .filter(|e| !e.exempt)
            .map(|e| e.id.clone())
            .collect()
    }

    fn node_id(&self, node: &NodeId) -> Option<NodeId> {
        Some(node.clone())
    }

    // 标识在注册时已分配
    fn assign_node_id(&self, _node: &NodeId, _id: &NodeId) {}

    fn read_text(&self, node: &NodeId) -> NodeText {
        self.text(node).unwrap_or_default()
    }

    fn write_text(&self, node: &NodeId, text: &NodeText) {
        let mut elements = self.elements.borrow_mut();
        let Some(element) = elements.iter_mut().find(|e| &e.id == node) else {
            return;
        };

        if let Some(value) = &text.text {
            element.text.text = Some(value.clone());
        }
        if let Some(value) = &text.placeholder {
            element.text.placeholder = Some(value.clone());
        }
        if let Some(value) = &text.title {
            element.text.title = Some(value.clone());
        }
        if let Some(value) = &text.aria_label {
            element.text.aria_label = Some(value.clone());
        }
    }
}
