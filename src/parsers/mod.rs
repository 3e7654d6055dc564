//! # 解析器模块
//!
//! - `html` - HTML文档解析、DOM操作、序列化

pub mod html;

// Re-export commonly used items for convenience
pub use html::{html_to_dom, serialize_document, serialize_to_string};
