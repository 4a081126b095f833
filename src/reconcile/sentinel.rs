//! 哨兵检测
//!
//! 用少量始终存在的源语言字符串作为“页面是否被还原”的廉价信号。只检查可见文本
//! 序列的前 `cap` 个非空白文本节点，开销有上界；还原若只发生在这段前缀之后则会漏判。

use markup5ever_rcdom::Handle;
use tracing::debug;

use crate::parsers::html::dom::{document_body, get_text};
use crate::parsers::html::walker::OpaqueTags;
use crate::translation::dictionary::{lookup, Dictionary};

#[derive(Debug, Clone)]
pub struct SentinelCheck {
    sentinels: Vec<String>,
    cap: usize,
}

impl SentinelCheck {
    /// 只保留词典中有译文的哨兵；没有译文的字符串翻译后仍然存在，不能作为信号
    pub fn new<S: AsRef<str>>(
        sentinels: &[S],
        dictionary: Option<&Dictionary>,
        cap: usize,
    ) -> Self {
        let sentinels = sentinels
            .iter()
            .map(|s| s.as_ref().trim())
            .filter(|s| lookup(dictionary, s).is_some())
            .map(str::to_string)
            .collect();

        Self { sentinels, cap }
    }

    pub fn sentinels(&self) -> &[String] {
        &self.sentinels
    }

    /// 前缀中出现任一未翻译的哨兵即视为页面已被还原
    pub fn detects_reversion(&self, document: &Handle, opaque: &OpaqueTags) -> bool {
        if self.sentinels.is_empty() {
            return false;
        }

        let root = document_body(document).unwrap_or_else(|| document.clone());
        let found = opaque
            .visible_text(&root)
            .filter_map(|node| get_text(&node))
            .filter(|text| !text.trim().is_empty())
            .take(self.cap)
            .find(|text| {
                let text = text.trim();
                self.sentinels.iter().any(|sentinel| sentinel == text)
            });

        if let Some(text) = &found {
            debug!("检测到未翻译的哨兵: {}", text.trim());
        }
        found.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::dom::html_to_dom;

    fn dictionary() -> Dictionary {
        [("Solutions", "Çözümler"), ("Contact", "")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    fn opaque() -> OpaqueTags {
        OpaqueTags::new(["script"])
    }

    #[test]
    fn test_only_translated_sentinels_are_kept() {
        let dictionary = dictionary();
        let check = SentinelCheck::new(&["Solutions", "Contact", "Missing"], Some(&dictionary), 10);

        assert_eq!(check.sentinels(), &["Solutions".to_string()]);
        assert!(SentinelCheck::new(&["Solutions"], None, 10).sentinels().is_empty());
    }

    #[test]
    fn test_detects_untranslated_sentinel() {
        let dictionary = dictionary();
        let check = SentinelCheck::new(&["Solutions"], Some(&dictionary), 10);

        let reverted = html_to_dom(b"<html><body><nav> Solutions </nav></body></html>", "utf-8");
        let translated = html_to_dom(b"<html><body><nav>\xc3\x87\xc3\xb6z\xc3\xbcmler</nav></body></html>", "utf-8");
        let scripted = html_to_dom(b"<html><body><script>Solutions</script></body></html>", "utf-8");

        assert!(check.detects_reversion(&reverted.document, &opaque()));
        assert!(!check.detects_reversion(&translated.document, &opaque()));
        assert!(!check.detects_reversion(&scripted.document, &opaque()));
    }

    #[test]
    fn test_reversion_after_scanned_prefix_goes_unnoticed() {
        let dictionary = dictionary();
        let check = SentinelCheck::new(&["Solutions"], Some(&dictionary), 3);

        let html = "<html><body><p>a</p><p>b</p><p>c</p><p>Solutions</p></body></html>";
        let dom = html_to_dom(html.as_bytes(), "utf-8");
        assert!(!check.detects_reversion(&dom.document, &opaque()));

        let wide = SentinelCheck::new(&["Solutions"], Some(&dictionary), 4);
        assert!(wide.detects_reversion(&dom.document, &opaque()));
    }

    #[test]
    fn test_whitespace_nodes_do_not_count_toward_cap() {
        let dictionary = dictionary();
        let check = SentinelCheck::new(&["Solutions"], Some(&dictionary), 3);

        // 格式化后的标记在元素之间产生空白文本节点
        let html = "<html><body>\n  <p>a</p>\n  <p>b</p>\n  <p>Solutions</p>\n</body></html>";
        let dom = html_to_dom(html.as_bytes(), "utf-8");
        assert!(check.detects_reversion(&dom.document, &opaque()));
    }
}
