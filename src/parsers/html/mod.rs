//! HTML解析和处理模块
//!
//! - `dom`: 基础DOM操作（属性、class 列表、节点插入与摘除）
//! - `walker`: 文本节点遍历器与元素平铺枚举
//! - `serializer`: 序列化功能

pub mod dom;
pub mod serializer;
pub mod walker;

pub use dom::{
    add_class, closest, create_element, document_body, document_element, get_element_by_id,
    get_elements_by_id, get_node_attr, get_node_name, get_parent_node, get_text, has_class,
    html_to_dom, insert_first_child, set_node_attr, set_text, text_content,
};
pub use serializer::{serialize_document, serialize_to_string};
pub use walker::{elements, NodeFilter, OpaqueTags, TextWalker};
