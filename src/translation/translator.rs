//! 词典翻译器
//!
//! 在原地把文本节点与若干属性替换为译文。翻译是幂等的：译文本身不是词典键，
//! 因此对已翻译的子树再次执行不会产生任何变化（译文与某个源键恰好相同的情况除外）。
//!
//! 翻译不保留原文。从备选语言切回默认语言时，唯一可靠的办法是整页重载。

use markup5ever_rcdom::Handle;
use tracing::{debug, info};

use crate::config::LangmarkConfig;
use crate::parsers::html::dom::{
    add_class, document_body, document_element, get_node_attr, get_node_name, get_text,
    has_class, set_node_attr, set_text,
};
use crate::parsers::html::walker::{elements, OpaqueTags};
use crate::state::LanguagePreference;

use super::dictionary::{lookup, Dictionary};

/// 任意元素上参与翻译的属性
pub const TRANSLATABLE_ATTRS: &[&str] = &["alt", "placeholder", "title"];

/// 单次翻译的统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TranslationStats {
    pub texts_translated: usize,
    pub attributes_translated: usize,
}

impl TranslationStats {
    pub fn total(&self) -> usize {
        self.texts_translated + self.attributes_translated
    }
}

/// `apply_translation` 的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranslationOutcome {
    /// 无需任何操作
    Unchanged,
    /// 需要整页重载才能恢复原文
    ReloadRequired,
    /// 已执行一次完整的翻译遍历
    Applied(TranslationStats),
}

/// 词典翻译器
pub struct Translator {
    dictionary: Option<Dictionary>,
    opaque: OpaqueTags,
    activation_class: String,
}

impl Translator {
    /// `dictionary` 为 `None` 表示词典尚未加载，所有查找都视为未命中
    pub fn new(dictionary: Option<Dictionary>, config: &LangmarkConfig) -> Self {
        Self {
            dictionary,
            opaque: OpaqueTags::new(&config.opaque_tags),
            activation_class: config.activation_class.clone(),
        }
    }

    pub fn dictionary(&self) -> Option<&Dictionary> {
        self.dictionary.as_ref()
    }

    pub fn opaque_tags(&self) -> &OpaqueTags {
        &self.opaque
    }

    /// 查找去除首尾空白后的文本对应的译文
    pub fn lookup(&self, text: &str) -> Option<&str> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return None;
        }
        lookup(self.dictionary.as_ref(), trimmed)
    }

    /// 激活标记是否已设置
    pub fn is_active(&self, document: &Handle) -> bool {
        document_element(document)
            .map(|html| has_class(&html, &self.activation_class))
            .unwrap_or(false)
    }

    /// 按目标语言翻译文档
    pub fn apply_translation(
        &self,
        document: &Handle,
        target: LanguagePreference,
    ) -> TranslationOutcome {
        match target {
            LanguagePreference::Default => {
                if self.is_active(document) {
                    info!("已翻译的页面切回默认语言，需要重载");
                    TranslationOutcome::ReloadRequired
                } else {
                    TranslationOutcome::Unchanged
                }
            }
            LanguagePreference::Alt => {
                if let Some(html) = document_element(document) {
                    add_class(&html, &self.activation_class);
                }

                let stats = TranslationStats {
                    texts_translated: self.translate_texts(document),
                    attributes_translated: self.translate_attributes(document),
                };
                debug!(
                    "翻译遍历完成: 文本 {} 处，属性 {} 处",
                    stats.texts_translated, stats.attributes_translated
                );
                TranslationOutcome::Applied(stats)
            }
        }
    }

    fn translate_texts(&self, document: &Handle) -> usize {
        let root = document_body(document).unwrap_or_else(|| document.clone());
        let mut translated = 0;

        for node in self.opaque.visible_text(&root) {
            let Some(raw) = get_text(&node) else {
                continue;
            };
            if let Some(replaced) = self.substitute(&raw) {
                set_text(&node, &replaced);
                translated += 1;
            }
        }

        translated
    }

    fn translate_attributes(&self, document: &Handle) -> usize {
        let mut translated = 0;

        for element in elements(document) {
            for attr in TRANSLATABLE_ATTRS {
                translated += usize::from(self.translate_attribute(&element, attr));
            }

            if get_node_name(&element) == Some("meta")
                && get_node_attr(&element, "name").as_deref() == Some("description")
            {
                translated += usize::from(self.translate_attribute(&element, "content"));
            }
        }

        translated
    }

    fn translate_attribute(&self, element: &Handle, attr: &str) -> bool {
        let Some(raw) = get_node_attr(element, attr) else {
            return false;
        };

        match self.substitute(&raw) {
            Some(replaced) => {
                set_node_attr(element, attr, Some(replaced));
                true
            }
            None => false,
        }
    }

    /// 精确匹配去除空白后的整段文本，只替换匹配到的子串以保留首尾空白
    fn substitute(&self, raw: &str) -> Option<String> {
        let trimmed = raw.trim();
        let translation = self.lookup(trimmed)?;
        Some(raw.replacen(trimmed, translation, 1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::dom::{get_element_by_id, html_to_dom};
    use crate::parsers::html::serializer::serialize_to_string;
    use markup5ever_rcdom::RcDom;

    fn translator() -> Translator {
        let dictionary: Dictionary = [
            ("Solutions", "Çözümler"),
            ("Our Industries", "Sektörlerimiz"),
            ("Search", "Ara"),
            ("About", ""),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();

        Translator::new(Some(dictionary), &LangmarkConfig::default())
    }

    fn parse(html: &str) -> RcDom {
        html_to_dom(html.as_bytes(), "utf-8")
    }

    #[test]
    fn test_exact_match_only() {
        let dom = parse(
            "<html><body><p id=\"a\">Solutions</p><p id=\"b\">Solutions Team</p>\
             <p id=\"c\">\n   Solutions  </p><p id=\"d\">About</p></body></html>",
        );
        translator().apply_translation(&dom.document, LanguagePreference::Alt);

        let text_of = |id: &str| {
            let node = get_element_by_id(&dom.document, id).unwrap();
            let child = node.children.borrow()[0].clone();
            get_text(&child).unwrap()
        };

        assert_eq!(text_of("a"), "Çözümler");
        assert_eq!(text_of("b"), "Solutions Team");
        assert_eq!(text_of("c"), "\n   Çözümler  ");
        assert_eq!(text_of("d"), "About");
    }

    #[test]
    fn test_attribute_coverage() {
        let dom = parse(
            "<html><head><meta name=\"description\" content=\"Our Industries\">\
             <meta name=\"keywords\" content=\"Solutions\"></head>\
             <body><img id=\"img\" alt=\"Solutions\"><input id=\"q\" placeholder=\"Search\">\
             <a id=\"link\" title=\" Solutions \">x</a></body></html>",
        );
        translator().apply_translation(&dom.document, LanguagePreference::Alt);

        let img = get_element_by_id(&dom.document, "img").unwrap();
        let input = get_element_by_id(&dom.document, "q").unwrap();
        let link = get_element_by_id(&dom.document, "link").unwrap();
        assert_eq!(get_node_attr(&img, "alt").as_deref(), Some("Çözümler"));
        assert_eq!(get_node_attr(&input, "placeholder").as_deref(), Some("Ara"));
        assert_eq!(get_node_attr(&link, "title").as_deref(), Some(" Çözümler "));

        let html = serialize_to_string(&dom.document).unwrap();
        assert!(html.contains("content=\"Sektörlerimiz\""));
        // 只有 description 的 content 参与翻译
        assert!(html.contains("name=\"keywords\" content=\"Solutions\""));
    }

    #[test]
    fn test_opaque_elements_are_untouched() {
        let dom = parse(
            "<html><body><script>Solutions</script><code>Solutions</code>\
             <textarea>Solutions</textarea><p>Solutions</p></body></html>",
        );
        let outcome = translator().apply_translation(&dom.document, LanguagePreference::Alt);

        assert_eq!(
            outcome,
            TranslationOutcome::Applied(TranslationStats {
                texts_translated: 1,
                attributes_translated: 0,
            })
        );
        let html = serialize_to_string(&dom.document).unwrap();
        assert!(html.contains("<script>Solutions</script>"));
        assert!(html.contains("<code>Solutions</code>"));
    }

    #[test]
    fn test_second_pass_changes_nothing() {
        let dom = parse(
            "<html><head><meta name=\"description\" content=\"Our Industries\"></head>\
             <body><h1>Solutions</h1><img alt=\"Solutions\"></body></html>",
        );
        let translator = translator();

        translator.apply_translation(&dom.document, LanguagePreference::Alt);
        let first = serialize_to_string(&dom.document).unwrap();

        let outcome = translator.apply_translation(&dom.document, LanguagePreference::Alt);
        let second = serialize_to_string(&dom.document).unwrap();

        assert_eq!(first, second);
        assert_eq!(
            outcome,
            TranslationOutcome::Applied(TranslationStats::default())
        );
    }

    #[test]
    fn test_default_target_requires_reload_only_when_active() {
        let dom = parse("<html><body><p>Solutions</p></body></html>");
        let translator = translator();

        assert_eq!(
            translator.apply_translation(&dom.document, LanguagePreference::Default),
            TranslationOutcome::Unchanged
        );

        translator.apply_translation(&dom.document, LanguagePreference::Alt);
        assert!(translator.is_active(&dom.document));
        assert_eq!(
            translator.apply_translation(&dom.document, LanguagePreference::Default),
            TranslationOutcome::ReloadRequired
        );
    }

    #[test]
    fn test_missing_dictionary_is_tolerated() {
        let dom = parse("<html><body><p>Solutions</p><img alt=\"Solutions\"></body></html>");
        let translator = Translator::new(None, &LangmarkConfig::default());

        let outcome = translator.apply_translation(&dom.document, LanguagePreference::Alt);
        assert_eq!(
            outcome,
            TranslationOutcome::Applied(TranslationStats::default())
        );
        assert!(translator.is_active(&dom.document));
    }
}
