//! 宿主页面模型
//!
//! `Page` 持有文档、就绪状态、持久存储与区域信号。外部渲染器通过
//! [`Page::host_mutate`] 修改文档；只有观察配置覆盖的修改类型才会产生变更记录，
//! 其余修改（例如只改属性）只能由定时巡检发现。

use markup5ever_rcdom::{Handle, RcDom};
use tracing::{debug, info};

use crate::error::LangmarkResult;
use crate::parsers::html::dom::{document_body, html_to_dom, replace_children};
use crate::parsers::html::serializer::serialize_to_string;
use crate::state::Storage;

/// 文档就绪状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyState {
    Loading,
    Interactive,
}

/// 变更类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MutationKind {
    ChildList,
    CharacterData,
    Attributes,
}

/// 一条变更记录
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MutationRecord {
    pub kind: MutationKind,
}

/// 观察配置，作用于整棵 body 子树
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObserverConfig {
    pub child_list: bool,
    pub character_data: bool,
    pub attributes: bool,
}

impl Default for ObserverConfig {
    fn default() -> Self {
        Self {
            child_list: true,
            character_data: true,
            attributes: false,
        }
    }
}

impl ObserverConfig {
    pub fn observes(&self, kind: MutationKind) -> bool {
        match kind {
            MutationKind::ChildList => self.child_list,
            MutationKind::CharacterData => self.character_data,
            MutationKind::Attributes => self.attributes,
        }
    }
}

/// 宿主页面
pub struct Page {
    source: String,
    dom: RcDom,
    ready: ReadyState,
    storage: Box<dyn Storage>,
    locale: Option<String>,
    observer: ObserverConfig,
    mutations: Vec<MutationRecord>,
    reload_requested: bool,
    reloads: usize,
}

impl Page {
    /// 由页面源码创建，初始状态为 `Loading`
    pub fn new(source: impl Into<String>, storage: Box<dyn Storage>) -> Self {
        let source = source.into();
        let dom = html_to_dom(source.as_bytes(), "utf-8");

        Self {
            source,
            dom,
            ready: ReadyState::Loading,
            storage,
            locale: None,
            observer: ObserverConfig::default(),
            mutations: Vec::new(),
            reload_requested: false,
            reloads: 0,
        }
    }

    pub fn with_locale(mut self, locale: Option<String>) -> Self {
        self.locale = locale;
        self
    }

    pub fn with_observer(mut self, observer: ObserverConfig) -> Self {
        self.observer = observer;
        self
    }

    pub fn document(&self) -> &Handle {
        &self.dom.document
    }

    pub fn body(&self) -> Option<Handle> {
        document_body(&self.dom.document)
    }

    pub fn is_ready(&self) -> bool {
        self.ready == ReadyState::Interactive
    }

    pub fn mark_ready(&mut self) {
        self.ready = ReadyState::Interactive;
    }

    pub fn storage(&self) -> &dyn Storage {
        self.storage.as_ref()
    }

    pub fn locale(&self) -> Option<&str> {
        self.locale.as_deref()
    }

    pub fn observer(&self) -> ObserverConfig {
        self.observer
    }

    /// 外部渲染器修改文档，返回该修改是否被观察到
    pub fn host_mutate<F>(&mut self, kind: MutationKind, mutate: F) -> bool
    where
        F: FnOnce(&Handle),
    {
        mutate(&self.dom.document);

        let observed = self.observer.observes(kind);
        if observed {
            self.mutations.push(MutationRecord { kind });
        }
        observed
    }

    /// 外部渲染器按源码重新渲染整个 body，撤销其中的所有手工修改
    pub fn host_rerender(&mut self) -> bool {
        let fresh = html_to_dom(self.source.as_bytes(), "utf-8");
        let children = document_body(&fresh.document)
            .map(|body| body.children.borrow().clone())
            .unwrap_or_default();

        debug!("宿主重新渲染 body: {} 个子节点", children.len());
        self.host_mutate(MutationKind::ChildList, move |document| {
            if let Some(body) = document_body(document) {
                replace_children(&body, children);
            }
        })
    }

    /// 取出尚未投递的变更记录
    pub fn take_mutations(&mut self) -> Vec<MutationRecord> {
        std::mem::take(&mut self.mutations)
    }

    pub fn request_reload(&mut self) {
        self.reload_requested = true;
    }

    pub fn reload_requested(&self) -> bool {
        self.reload_requested
    }

    /// 重新加载：由源码重建文档，持久存储保留
    pub fn reload(&mut self) {
        self.dom = html_to_dom(self.source.as_bytes(), "utf-8");
        self.ready = ReadyState::Loading;
        self.mutations.clear();
        self.reload_requested = false;
        self.reloads += 1;
        info!("页面已重载 (第 {} 次)", self.reloads);
    }

    pub fn reload_count(&self) -> usize {
        self.reloads
    }

    pub fn serialize(&self) -> LangmarkResult<String> {
        serialize_to_string(&self.dom.document)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::html::dom::{
        add_class, document_element, get_element_by_id, get_node_attr, has_class, set_node_attr,
    };
    use crate::state::MemoryStorage;

    const SOURCE: &str = "<html><body><p id=\"p\">Solutions</p></body></html>";

    fn page() -> Page {
        Page::new(SOURCE, Box::new(MemoryStorage::new()))
    }

    #[test]
    fn test_attribute_mutations_are_not_observed_by_default() {
        let mut page = page();

        assert!(!page.host_mutate(MutationKind::Attributes, |document| {
            let p = get_element_by_id(document, "p").unwrap();
            set_node_attr(&p, "title", Some("x".to_string()));
        }));
        assert!(page.host_mutate(MutationKind::CharacterData, |_| {}));

        assert_eq!(
            page.take_mutations(),
            vec![MutationRecord { kind: MutationKind::CharacterData }]
        );
        assert!(page.take_mutations().is_empty());
    }

    #[test]
    fn test_rerender_replaces_body_but_keeps_root() {
        let mut page = page();
        let html = document_element(page.document()).unwrap();
        add_class(&html, "marker");
        let p = get_element_by_id(page.document(), "p").unwrap();
        set_node_attr(&p, "data-x", Some("1".to_string()));

        assert!(page.host_rerender());

        let p = get_element_by_id(page.document(), "p").unwrap();
        assert_eq!(get_node_attr(&p, "data-x"), None);
        assert!(has_class(&html, "marker"));
    }

    #[test]
    fn test_reload_rebuilds_document_and_keeps_storage() {
        let storage = MemoryStorage::new();
        let mut page = Page::new(SOURCE, Box::new(storage.clone()));
        page.mark_ready();
        page.storage().set_item("k", "v").unwrap();
        page.request_reload();

        page.reload();

        assert!(!page.is_ready());
        assert!(!page.reload_requested());
        assert_eq!(page.reload_count(), 1);
        assert_eq!(storage.get_item("k").unwrap().as_deref(), Some("v"));
    }
}
