//! # textswap
//!
//! 在原地切换双语页面文本的引擎：扫描界面树中的可翻译节点，记录原文，
//! 通过可替换的查询后端和持久化缓存在源语言与目标语言之间来回切换。
//!
//! ## 模块组织
//!
//! - `env` - 环境变量
//! - `parsers` - HTML 解析与序列化
//! - `translation` - 文本替换引擎

pub mod env;
pub mod parsers;
pub mod translation;

// Re-export commonly used items for convenience
pub use parsers::*;
