//! HTML解析和处理模块
//!
//! - `dom`: 基础DOM操作（属性、自身文本读写）
//! - `serializer`: 序列化功能

pub mod dom;
pub mod serializer;

pub use dom::{
    get_child_node_by_name, get_node_attr, get_node_name, get_own_text, has_class,
    has_element_children, html_to_dom, set_node_attr, set_own_text,
};
pub use serializer::{serialize_document, serialize_to_string};
