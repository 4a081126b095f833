// 集成测试公共模块
//
// 提供示例页面、测试词典和运行时构建器

#![allow(dead_code)]

use langmark::config::LangmarkConfig;
use langmark::page::{ObserverConfig, Page};
use langmark::parsers::html::dom::{get_elements_by_id, html_to_dom};
use langmark::runtime::Runtime;
use langmark::state::MemoryStorage;
use langmark::translation::Dictionary;
use markup5ever_rcdom::{Handle, RcDom};

/// 带头部导航、主题切换按钮与正文的示例页面
pub const SAMPLE_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="description" content="Our Industries">
<title>Aeronix</title>
</head>
<body>
<header>
<nav><a href="/">Home</a><a href="/solutions">Solutions</a><a href="/industries">Industries</a></nav>
<div class="hidden flex-shrink-0 lg:flex" id="chrome">
<button id="theme-toggle"><span class="sr-only">Toggle theme</span></button>
</div>
</header>
<main>
<h1>Solutions</h1>
<p id="team">Solutions Team</p>
<img id="logo" src="../images/logo.png" alt="Solutions">
<input id="search" placeholder="Search">
<script>var label = "Solutions";</script>
<code>Solutions</code>
</main>
</body>
</html>
"#;

/// 测试词典；`About` 没有译文
pub fn sample_dictionary() -> Dictionary {
    [
        ("Solutions", "Çözümler"),
        ("Industries", "Sektörler"),
        ("Home", "Ana Sayfa"),
        ("Our Industries", "Sektörlerimiz"),
        ("Search", "Ara"),
        ("About", ""),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

pub fn parse(html: &str) -> RcDom {
    html_to_dom(html.as_bytes(), "utf-8")
}

/// 运行时构建器
pub struct RuntimeBuilder {
    source: String,
    storage: MemoryStorage,
    locale: Option<String>,
    config: LangmarkConfig,
    dictionary: Option<Dictionary>,
    observer: ObserverConfig,
}

impl RuntimeBuilder {
    pub fn new() -> Self {
        Self {
            source: SAMPLE_PAGE.to_string(),
            storage: MemoryStorage::new(),
            locale: None,
            config: LangmarkConfig::default(),
            dictionary: Some(sample_dictionary()),
            observer: ObserverConfig::default(),
        }
    }

    pub fn source(mut self, source: &str) -> Self {
        self.source = source.to_string();
        self
    }

    pub fn storage(mut self, storage: MemoryStorage) -> Self {
        self.storage = storage;
        self
    }

    pub fn locale(mut self, locale: &str) -> Self {
        self.locale = Some(locale.to_string());
        self
    }

    pub fn config(mut self, config: LangmarkConfig) -> Self {
        self.config = config;
        self
    }

    pub fn dictionary(mut self, dictionary: Dictionary) -> Self {
        self.dictionary = Some(dictionary);
        self
    }

    pub fn observer(mut self, observer: ObserverConfig) -> Self {
        self.observer = observer;
        self
    }

    pub fn without_dictionary(mut self) -> Self {
        self.dictionary = None;
        self
    }

    pub fn build(self) -> Runtime {
        let page = Page::new(self.source, Box::new(self.storage))
            .with_locale(self.locale)
            .with_observer(self.observer);
        Runtime::with_config(page, &self.config, self.dictionary)
    }

    /// 构建并完成启动与就绪
    pub fn started(self) -> Runtime {
        let mut runtime = self.build();
        runtime.start();
        runtime.document_ready();
        runtime
    }
}

pub fn control_count(document: &Handle) -> usize {
    get_elements_by_id(document, "lang-toggle-btn").len()
}

pub fn html(runtime: &Runtime) -> String {
    runtime.serialize().unwrap()
}
