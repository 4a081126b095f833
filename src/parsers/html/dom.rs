use std::cell::RefCell;
use std::rc::Rc;

use encoding_rs::Encoding;
use html5ever::interface::{Attribute, QualName};
use html5ever::parse_document;
use html5ever::tendril::{format_tendril, StrTendril, TendrilSink};
use html5ever::{namespace_url, ns, LocalName};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom};

use super::walker::elements;

/// 将 HTML 字节转换为 DOM
pub fn html_to_dom(data: &[u8], document_encoding: &str) -> RcDom {
    let s: String = match Encoding::for_label(document_encoding.as_bytes()) {
        Some(encoding) => encoding.decode(data).0.into_owned(),
        None => String::from_utf8_lossy(data).into_owned(),
    };

    parse_document(RcDom::default(), Default::default()).one(s.as_str())
}

/// 根据名称获取子节点
pub fn get_child_node_by_name(parent: &Handle, node_name: &str) -> Option<Handle> {
    let children = parent.children.borrow();
    let matching_children = children.iter().find(|child| match child.data {
        NodeData::Element { ref name, .. } => &*name.local == node_name,
        _ => false,
    });
    matching_children.cloned()
}

/// 文档根元素（`<html>`）
pub fn document_element(document: &Handle) -> Option<Handle> {
    get_child_node_by_name(document, "html")
}

/// 文档的 `<body>` 元素
pub fn document_body(document: &Handle) -> Option<Handle> {
    document_element(document).and_then(|html| get_child_node_by_name(&html, "body"))
}

/// 获取节点属性值
pub fn get_node_attr(node: &Handle, attr_name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|attr| &*attr.name.local == attr_name)
            .map(|attr| attr.value.to_string()),
        _ => None,
    }
}

/// 获取节点名称
pub fn get_node_name(node: &Handle) -> Option<&'_ str> {
    match &node.data {
        NodeData::Element { name, .. } => Some(name.local.as_ref()),
        _ => None,
    }
}

/// 获取父节点
///
/// `parent` 是 `Cell<Option<Weak>>`，读取时必须取出再放回。
pub fn get_parent_node(child: &Handle) -> Option<Handle> {
    let weak = child.parent.take();
    let parent = weak.as_ref().and_then(|node| node.upgrade());
    child.parent.set(weak);
    parent
}

/// 设置节点属性
pub fn set_node_attr(node: &Handle, attr_name: &str, attr_value: Option<String>) {
    if let NodeData::Element { attrs, .. } = &node.data {
        let attrs_mut = &mut attrs.borrow_mut();
        let mut i = 0;
        let mut found_existing_attr: bool = false;

        while i < attrs_mut.len() {
            if &attrs_mut[i].name.local == attr_name {
                found_existing_attr = true;

                if let Some(attr_value) = attr_value.as_deref() {
                    attrs_mut[i].value.clear();
                    attrs_mut[i].value.push_slice(attr_value);
                } else {
                    // Remove attr completely if attr_value is not defined
                    attrs_mut.remove(i);
                    continue;
                }
            }

            i += 1;
        }

        if !found_existing_attr {
            if let Some(attr_value) = attr_value {
                attrs_mut.push(Attribute {
                    name: QualName::new(None, ns!(), LocalName::from(attr_name)),
                    value: format_tendril!("{}", attr_value),
                });
            }
        }
    };
}

/// 检查元素的 class 列表是否包含指定类名
pub fn has_class(node: &Handle, class_name: &str) -> bool {
    get_node_attr(node, "class")
        .map(|classes| classes.split_ascii_whitespace().any(|c| c == class_name))
        .unwrap_or(false)
}

/// 向元素的 class 列表添加类名（已存在时不变）
pub fn add_class(node: &Handle, class_name: &str) {
    if has_class(node, class_name) {
        return;
    }

    let classes = match get_node_attr(node, "class") {
        Some(existing) if !existing.trim().is_empty() => {
            format!("{} {}", existing.trim_end(), class_name)
        }
        _ => class_name.to_string(),
    };
    set_node_attr(node, "class", Some(classes));
}

/// 从元素的 class 列表移除类名
pub fn remove_class(node: &Handle, class_name: &str) {
    if let Some(existing) = get_node_attr(node, "class") {
        let remaining: Vec<&str> = existing
            .split_ascii_whitespace()
            .filter(|c| *c != class_name)
            .collect();
        set_node_attr(node, "class", Some(remaining.join(" ")));
    }
}

/// 查找所有具有指定 id 的元素（正常文档中最多一个）
pub fn get_elements_by_id(document: &Handle, id: &str) -> Vec<Handle> {
    elements(document)
        .filter(|node| get_node_attr(node, "id").as_deref() == Some(id))
        .collect()
}

/// 按 id 查找第一个元素
pub fn get_element_by_id(document: &Handle, id: &str) -> Option<Handle> {
    elements(document).find(|node| get_node_attr(node, "id").as_deref() == Some(id))
}

/// 创建游离的 HTML 元素
pub fn create_element(tag: &str, attrs: &[(&str, &str)]) -> Handle {
    let attrs = attrs
        .iter()
        .map(|(name, value)| Attribute {
            name: QualName::new(None, ns!(), LocalName::from(*name)),
            value: StrTendril::from_slice(value),
        })
        .collect();

    Node::new(NodeData::Element {
        name: QualName::new(None, ns!(html), LocalName::from(tag)),
        attrs: RefCell::new(attrs),
        template_contents: RefCell::new(None),
        mathml_annotation_xml_integration_point: false,
    })
}

/// 将节点追加为最后一个子节点
pub fn append_child(parent: &Handle, child: Handle) {
    detach(&child);
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().push(child);
}

/// 将节点插入为第一个子节点
pub fn insert_first_child(parent: &Handle, child: Handle) {
    detach(&child);
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().insert(0, child);
}

/// 将节点从其父节点上摘除
pub fn detach(node: &Handle) {
    if let Some(parent) = get_parent_node(node) {
        parent
            .children
            .borrow_mut()
            .retain(|child| !Rc::ptr_eq(child, node));
    }
    node.parent.set(None);
}

/// 用新的子节点列表替换元素的全部子节点
pub fn replace_children(parent: &Handle, children: Vec<Handle>) {
    for old in parent.children.borrow_mut().drain(..) {
        old.parent.set(None);
    }

    for child in children {
        append_child(parent, child);
    }
}

/// 读取文本节点内容
pub fn get_text(node: &Handle) -> Option<String> {
    match &node.data {
        NodeData::Text { contents } => Some(contents.borrow().to_string()),
        _ => None,
    }
}

/// 覆盖文本节点内容
pub fn set_text(node: &Handle, text: &str) {
    if let NodeData::Text { contents } = &node.data {
        *contents.borrow_mut() = StrTendril::from_slice(text);
    }
}

/// 子树内全部文本的拼接（与 DOM `textContent` 一致）
pub fn text_content(node: &Handle) -> String {
    let mut buf = String::new();
    collect_text(node, &mut buf);
    buf
}

fn collect_text(node: &Handle, buf: &mut String) {
    if let NodeData::Text { contents } = &node.data {
        buf.push_str(&contents.borrow());
    }

    for child in node.children.borrow().iter() {
        collect_text(child, buf);
    }
}

/// 自身或最近的、标签名匹配的祖先元素
pub fn closest(node: &Handle, tag: &str) -> Option<Handle> {
    let mut current = Some(node.clone());

    while let Some(candidate) = current {
        if get_node_name(&candidate).is_some_and(|name| name.eq_ignore_ascii_case(tag)) {
            return Some(candidate);
        }
        current = get_parent_node(&candidate);
    }

    None
}

/// 判断 `node` 是否为 `ancestor` 自身或其后代
pub fn is_inclusive_descendant(node: &Handle, ancestor: &Handle) -> bool {
    let mut current = Some(node.clone());

    while let Some(candidate) = current {
        if Rc::ptr_eq(&candidate, ancestor) {
            return true;
        }
        current = get_parent_node(&candidate);
    }

    false
}
