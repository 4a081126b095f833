//! 源字符串提取
//!
//! 扫描页面，收集所有可翻译的源语言字符串，生成值为空的词典骨架，
//! 供译者逐条填写。

use std::collections::BTreeMap;

use markup5ever_rcdom::Handle;

use crate::error::LangmarkResult;
use crate::parsers::html::dom::{get_node_attr, get_node_name, get_text};
use crate::parsers::html::walker::{elements, OpaqueTags, TextWalker};

/// 提取时跳过的容器；比翻译时的不透明标签集合更窄
pub const EXTRACT_SKIP_TAGS: &[&str] = &["script", "style", "noscript"];

/// 提取的属性；`content` 只对 `<meta name="description">` 生效
pub const EXTRACT_ATTRS: &[&str] = &["alt", "placeholder", "title", "content"];

/// 把连续空白折叠为单个空格并去除首尾空白
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn keep_text(text: &str) -> bool {
    text.chars().count() > 1 && !text.chars().all(char::is_numeric)
}

/// 收集 `root` 之下的源字符串，返回按键排序、值为空的词典骨架
pub fn collect_source_strings(root: &Handle) -> BTreeMap<String, String> {
    let mut strings = BTreeMap::new();
    collect_into(root, &mut strings);
    strings
}

/// 将 `root` 之下的源字符串并入已有的骨架
pub fn collect_into(root: &Handle, strings: &mut BTreeMap<String, String>) {
    let skip = OpaqueTags::new(EXTRACT_SKIP_TAGS);

    for node in TextWalker::new(root, |node: &Handle| skip.filter(node)) {
        let Some(raw) = get_text(&node) else {
            continue;
        };
        let text = collapse_whitespace(&raw);
        if keep_text(&text) {
            strings.entry(text).or_default();
        }
    }

    for element in elements(root) {
        let is_meta = get_node_name(&element) == Some("meta");

        for attr in EXTRACT_ATTRS {
            if *attr == "content"
                && !(is_meta && get_node_attr(&element, "name").as_deref() == Some("description"))
            {
                continue;
            }

            if let Some(raw) = get_node_attr(&element, attr) {
                let text = collapse_whitespace(&raw);
                if text.chars().count() > 1 {
                    strings.entry(text).or_default();
                }
            }
        }
    }
}

/// 以脚本全局变量形式输出骨架，可被 [`Dictionary::from_js_source`] 读回
///
/// [`Dictionary::from_js_source`]: super::dictionary::Dictionary::from_js_source
pub fn to_js_source(strings: &BTreeMap<String, String>, variable: &str) -> LangmarkResult<String> {
    let mut source = format!("const {} = {{\n", variable);
    for (key, value) in strings {
        source.push_str(&format!(
            "    {}: {},\n",
            serde_json::to_string(key)?,
            serde_json::to_string(value)?
        ));
    }
    source.push_str("};\n");
    Ok(source)
}
