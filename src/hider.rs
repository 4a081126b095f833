//! 区块隐藏
//!
//! 外部渲染器会在水合时恢复某些不需要展示的区块。对包含目标短语的文本节点，
//! 找到最近的 `<section>` 祖先并将其隐藏。短语的译文同样作为目标，因为扫描时
//! 页面可能已经被翻译。

use markup5ever_rcdom::Handle;
use tracing::debug;

use crate::parsers::html::dom::{
    closest, document_body, get_node_attr, get_parent_node, get_text, set_node_attr,
};
use crate::parsers::html::walker::OpaqueTags;
use crate::translation::dictionary::{lookup, Dictionary};

pub const HIDDEN_STYLE: &str = "display: none !important";

/// 区块隐藏器
#[derive(Debug, Clone)]
pub struct SectionHider {
    targets: Vec<String>,
    opaque: OpaqueTags,
}

impl SectionHider {
    pub fn new<I, S>(targets: I, dictionary: Option<&Dictionary>, opaque: OpaqueTags) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut expanded: Vec<String> = Vec::new();
        for target in targets.into_iter().map(Into::into) {
            let translated = lookup(dictionary, target.trim()).map(str::to_string);
            for phrase in std::iter::once(target).chain(translated) {
                if !phrase.is_empty() && !expanded.contains(&phrase) {
                    expanded.push(phrase);
                }
            }
        }

        Self {
            targets: expanded,
            opaque,
        }
    }

    pub fn targets(&self) -> &[String] {
        &self.targets
    }

    pub fn is_enabled(&self) -> bool {
        !self.targets.is_empty()
    }

    /// 隐藏所有包含目标短语的区块，返回本次新隐藏的区块数
    pub fn hide_sections(&self, document: &Handle) -> usize {
        if !self.is_enabled() {
            return 0;
        }

        let Some(body) = document_body(document) else {
            return 0;
        };

        let mut sections = Vec::new();
        for node in self.opaque.visible_text(&body) {
            let Some(text) = get_text(&node) else {
                continue;
            };
            let text = text.trim();
            if text.is_empty() || !self.targets.iter().any(|t| text.contains(t.as_str())) {
                continue;
            }

            if let Some(section) = get_parent_node(&node).and_then(|p| closest(&p, "section")) {
                sections.push(section);
            }
        }

        let mut hidden = 0;
        for section in sections {
            if get_node_attr(&section, "style").as_deref() != Some(HIDDEN_STYLE) {
                set_node_attr(&section, "style", Some(HIDDEN_STYLE.to_string()));
                hidden += 1;
            }
        }

        if hidden > 0 {
            debug!("隐藏了 {} 个区块", hidden);
        }
        hidden
    }
}
