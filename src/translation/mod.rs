//! 翻译模块
//!
//! - **dictionary**: 源语言到目标语言的只读词典
//! - **translator**: 基于词典的原地、幂等翻译
//! - **extract**: 从页面提取源字符串，生成词典骨架
//!
//! # 基本用法
//!
//! ```rust,no_run
//! use langmark::config::LangmarkConfig;
//! use langmark::parsers::html::html_to_dom;
//! use langmark::state::LanguagePreference;
//! use langmark::translation::{Dictionary, Translator};
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let dictionary = Dictionary::load("translations.js".as_ref())?;
//! let translator = Translator::new(Some(dictionary), &LangmarkConfig::default());
//!
//! let dom = html_to_dom(b"<p>Solutions</p>", "utf-8");
//! translator.apply_translation(&dom.document, LanguagePreference::Alt);
//! # Ok(())
//! # }
//! ```

pub mod dictionary;
pub mod extract;
pub mod translator;

pub use dictionary::{lookup, Dictionary};
pub use extract::{collect_source_strings, to_js_source};
pub use translator::{TranslationOutcome, TranslationStats, Translator, TRANSLATABLE_ATTRS};
