//! 翻译词典
//!
//! 源语言字符串（已去除首尾空白）到目标语言字符串的精确映射。
//! 值为空表示“暂无译文”，查找时视为未命中。

use std::collections::HashMap;
use std::fs;
use std::path::Path;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{LangmarkError, LangmarkResult};

/// 只读词典，进程生命周期内加载一次
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dictionary {
    entries: HashMap<String, String>,
}

fn js_prefix_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\s*(?:const|let|var)\s+[A-Za-z_$][\w$]*\s*=\s*")
            .unwrap_or_else(|e| panic!("invalid prefix pattern: {e}"))
    })
}

fn trailing_comma_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r",(\s*)\}\s*;?\s*$").unwrap_or_else(|e| panic!("invalid comma pattern: {e}"))
    })
}

impl Dictionary {
    pub fn new(entries: HashMap<String, String>) -> Self {
        Self { entries }
    }

    /// 从 JSON 对象文本解析
    pub fn from_json(source: &str) -> LangmarkResult<Self> {
        Ok(serde_json::from_str(source)?)
    }

    /// 解析 `const tr_translations = { ... };` 形式的脚本全局变量
    ///
    /// 允许最后一个条目后有多余的逗号。
    pub fn from_js_source(source: &str) -> LangmarkResult<Self> {
        let prefix = js_prefix_regex()
            .find(source)
            .ok_or_else(|| LangmarkError::Dictionary("缺少变量声明".to_string()))?;
        let body = &source[prefix.end()..];
        let body = trailing_comma_regex().replace(body, "$1}");
        let body = body.trim().trim_end_matches(';');

        Self::from_json(body)
    }

    /// 根据文件扩展名选择格式加载
    pub fn load(path: &Path) -> LangmarkResult<Self> {
        let source = fs::read_to_string(path)
            .map_err(|e| LangmarkError::from(e).with_context(path.display()))?;

        let dictionary = match path.extension().and_then(|ext| ext.to_str()) {
            Some("js") => Self::from_js_source(&source),
            _ => Self::from_json(&source),
        }
        .map_err(|e| e.with_context(path.display()))?;

        tracing::info!(
            "已加载词典 {}: {} 条，其中 {} 条有译文",
            path.display(),
            dictionary.len(),
            dictionary.translated_len()
        );
        Ok(dictionary)
    }

    /// 查找译文：键需精确匹配，空译文视为未命中
    pub fn get(&self, source: &str) -> Option<&str> {
        self.entries
            .get(source)
            .map(String::as_str)
            .filter(|value| !value.is_empty())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 拥有非空译文的条目数
    pub fn translated_len(&self) -> usize {
        self.entries.values().filter(|v| !v.is_empty()).count()
    }
}

impl FromIterator<(String, String)> for Dictionary {
    fn from_iter<T: IntoIterator<Item = (String, String)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// 在可能尚未加载的词典中查找，未加载等同于未命中
pub fn lookup<'a>(dictionary: Option<&'a Dictionary>, source: &str) -> Option<&'a str> {
    dictionary.and_then(|dictionary| dictionary.get(source))
}
