use encoding_rs::Encoding;
use html5ever::serialize::{serialize, SerializeOpts};
use markup5ever_rcdom::{Handle, SerializableHandle};

use crate::error::LangmarkResult;

/// 序列化文档或子树
///
/// `document_encoding` 为空或无法识别时输出 UTF-8。
pub fn serialize_document(node: &Handle, document_encoding: &str) -> LangmarkResult<Vec<u8>> {
    let mut buf: Vec<u8> = Vec::new();

    let serializable: SerializableHandle = node.clone().into();
    serialize(&mut buf, &serializable, SerializeOpts::default())?;

    if !document_encoding.is_empty() {
        if let Some(encoding) = Encoding::for_label(document_encoding.as_bytes()) {
            let s: &str = &String::from_utf8_lossy(&buf);
            let (data, _, _) = encoding.encode(s);
            buf = data.to_vec();
        }
    }

    Ok(buf)
}

/// 序列化为 UTF-8 字符串
pub fn serialize_to_string(node: &Handle) -> LangmarkResult<String> {
    let buf = serialize_document(node, "")?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::dom::html_to_dom;

    #[test]
    fn test_serialize_round_trips_markup() {
        let dom = html_to_dom(
            "<html><head></head><body><p title=\"Çözümler\">Merhaba</p></body></html>".as_bytes(),
            "utf-8",
        );
        let html = serialize_to_string(&dom.document).unwrap();

        assert!(html.contains("<p title=\"Çözümler\">Merhaba</p>"));
    }
}
