//! # 解析器模块
//!
//! - `html` - HTML文档解析、DOM操作、文本遍历
//! - `selector` - 简单 CSS 选择器的解析与匹配

pub mod html;
pub mod selector;

pub use html::{html_to_dom, serialize_to_string, NodeFilter, OpaqueTags, TextWalker};
pub use selector::{query_selector, query_selector_all, SimpleSelector};
