//! 简单选择器
//!
//! 只支持复合选择器：可选的标签名（或 `*`），加任意个 `.class` 与 `#id`。
//! 组合符、属性选择器、伪类等语法会返回 [`LangmarkError::Selector`]，
//! 由调用方记录日志并当作“未找到”处理。
//!
//! 词法分析交给 cssparser，因此 `lg\:flex` 这类转义类名可以直接使用。

use cssparser::{Parser, ParserInput, Token};
use markup5ever_rcdom::Handle;

use crate::error::{helpers::selector_error, LangmarkResult};
use crate::parsers::html::dom::{get_node_attr, get_node_name, has_class};
use crate::parsers::html::walker::elements;

/// 已解析的复合选择器
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SimpleSelector {
    pub tag: Option<String>,
    pub id: Option<String>,
    pub classes: Vec<String>,
}

impl SimpleSelector {
    /// 解析选择器文本
    pub fn parse(selector: &str) -> LangmarkResult<Self> {
        let source = selector.trim();
        if source.is_empty() {
            return Err(selector_error("空选择器"));
        }

        let mut input = ParserInput::new(source);
        let mut parser = Parser::new(&mut input);
        let mut result = SimpleSelector::default();
        let mut universal = false;
        let mut first = true;

        loop {
            let token = match parser.next_including_whitespace() {
                Ok(token) => token.clone(),
                Err(_) => break,
            };

            match token {
                Token::Ident(name) if first => {
                    result.tag = Some(name.to_ascii_lowercase());
                }
                Token::Delim('*') if first => {
                    universal = true;
                }
                Token::IDHash(id) => {
                    if result.id.is_some() {
                        return Err(selector_error(format!("重复的 id: {}", source)));
                    }
                    result.id = Some(id.to_string());
                }
                Token::Delim('.') => match parser.next_including_whitespace() {
                    Ok(Token::Ident(class)) => result.classes.push(class.to_string()),
                    _ => return Err(selector_error(format!("'.' 之后缺少类名: {}", source))),
                },
                other => {
                    return Err(selector_error(format!(
                        "不支持的语法 {:?}: {}",
                        other, source
                    )));
                }
            }

            first = false;
        }

        if !universal && result.tag.is_none() && result.id.is_none() && result.classes.is_empty()
        {
            return Err(selector_error(format!("无法解析选择器: {}", source)));
        }

        Ok(result)
    }

    /// 判断元素是否匹配
    pub fn matches(&self, node: &Handle) -> bool {
        let Some(name) = get_node_name(node) else {
            return false;
        };

        if let Some(tag) = &self.tag {
            if !name.eq_ignore_ascii_case(tag) {
                return false;
            }
        }

        if let Some(id) = &self.id {
            if get_node_attr(node, "id").as_deref() != Some(id.as_str()) {
                return false;
            }
        }

        self.classes.iter().all(|class| has_class(node, class))
    }
}

/// 返回 `root` 之下第一个匹配的元素
pub fn query_selector(root: &Handle, selector: &str) -> LangmarkResult<Option<Handle>> {
    let selector = SimpleSelector::parse(selector)?;
    Ok(elements(root).find(|node| selector.matches(node)))
}

/// 返回 `root` 之下全部匹配的元素（文档顺序）
pub fn query_selector_all(root: &Handle, selector: &str) -> LangmarkResult<Vec<Handle>> {
    let selector = SimpleSelector::parse(selector)?;
    Ok(elements(root).filter(|node| selector.matches(node)).collect())
}
