//! 翻译管道模块
//!
//! 提供界面树抽象以及两种实现：扫描 HTML 文档的收集器和显式注册表

pub mod collector;
pub mod registry;
pub mod tree;

// 重新导出主要类型
pub use collector::{CollectionStats, HtmlTree, SelectionPolicy};
pub use registry::UiRegistry;
pub use tree::{NodeId, NodeText, TextField, TextTree};
