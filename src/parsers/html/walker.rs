//! DOM 遍历器模块
//!
//! 提供两种遍历原语：
//!
//! - [`TextWalker`]：深度优先、惰性地产出文本节点。过滤函数对每个节点给出
//!   [`NodeFilter`] 判定，`Reject` 跳过整棵子树，`Skip` 只跳过节点本身。
//! - [`elements`]：按文档顺序平铺枚举全部元素，用于属性翻译。
//!
//! 两者都不保存跨调用状态，每次调用都从头遍历当前的 DOM。

use std::collections::HashSet;

use markup5ever_rcdom::{Handle, NodeData};

use super::dom::get_node_name;

/// 过滤判定，语义与 DOM `NodeFilter` 一致
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeFilter {
    /// 产出该节点（仅对文本节点有意义），元素则继续深入
    Accept,
    /// 不产出该节点，但继续遍历其子节点
    Skip,
    /// 不产出该节点，也不遍历其子树
    Reject,
}

/// 惰性文本节点遍历器
pub struct TextWalker<F> {
    stack: Vec<Handle>,
    filter: F,
}

impl<F> TextWalker<F>
where
    F: FnMut(&Handle) -> NodeFilter,
{
    /// 从 `root` 的子节点开始遍历；根节点本身不经过过滤器
    pub fn new(root: &Handle, filter: F) -> Self {
        let stack = root.children.borrow().iter().rev().cloned().collect();
        Self { stack, filter }
    }
}

impl<F> Iterator for TextWalker<F>
where
    F: FnMut(&Handle) -> NodeFilter,
{
    type Item = Handle;

    fn next(&mut self) -> Option<Handle> {
        while let Some(node) = self.stack.pop() {
            let verdict = (self.filter)(&node);

            if let NodeData::Text { .. } = node.data {
                if verdict == NodeFilter::Accept {
                    return Some(node);
                }
                continue;
            }

            if verdict == NodeFilter::Reject {
                continue;
            }

            let children = node.children.borrow();
            self.stack.extend(children.iter().rev().cloned());
        }

        None
    }
}

/// 不透明标签集合：其子树中的文本对用户不可见或不可翻译
#[derive(Debug, Clone)]
pub struct OpaqueTags {
    tags: HashSet<String>,
}

impl OpaqueTags {
    pub fn new<I, S>(tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            tags: tags
                .into_iter()
                .map(|tag| tag.as_ref().to_ascii_lowercase())
                .collect(),
        }
    }

    pub fn contains(&self, tag: &str) -> bool {
        self.tags.contains(&tag.to_ascii_lowercase())
    }

    /// 默认过滤器：拒绝不透明元素的整棵子树，接受其余文本节点
    pub fn filter(&self, node: &Handle) -> NodeFilter {
        match get_node_name(node) {
            Some(tag) if self.contains(tag) => NodeFilter::Reject,
            Some(_) => NodeFilter::Skip,
            None => match node.data {
                NodeData::Text { .. } => NodeFilter::Accept,
                _ => NodeFilter::Skip,
            },
        }
    }

    /// 遍历 `root` 之下的可见文本节点
    pub fn visible_text<'a>(
        &'a self,
        root: &Handle,
    ) -> TextWalker<impl FnMut(&Handle) -> NodeFilter + 'a> {
        TextWalker::new(root, move |node: &Handle| self.filter(node))
    }
}

/// 元素平铺迭代器（不含根节点自身）
pub struct Elements {
    stack: Vec<Handle>,
}

impl Iterator for Elements {
    type Item = Handle;

    fn next(&mut self) -> Option<Handle> {
        while let Some(node) = self.stack.pop() {
            self.stack
                .extend(node.children.borrow().iter().rev().cloned());

            if let NodeData::Element { .. } = node.data {
                return Some(node);
            }
        }

        None
    }
}

/// 按文档顺序枚举 `root` 之下的全部元素
pub fn elements(root: &Handle) -> Elements {
    Elements {
        stack: root.children.borrow().iter().rev().cloned().collect(),
    }
}
