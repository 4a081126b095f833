//! 语言切换控件
//!
//! 在页面头部定位锚点并插入唯一的切换按钮。控件可能被外部渲染器删除，
//! 因此每次执行都要先确认其是否存在；已存在时只刷新外观。

use markup5ever_rcdom::Handle;
use tracing::{debug, info, warn};

use crate::config::{constants, LangmarkConfig};
use crate::error::helpers::log_error;
use crate::parsers::html::dom::{
    append_child, closest, create_element, detach, get_elements_by_id, get_node_attr,
    get_node_name, get_parent_node, insert_first_child, is_inclusive_descendant, set_node_attr,
    text_content,
};
use crate::parsers::html::walker::elements;
use crate::parsers::selector::{query_selector, query_selector_all};
use crate::state::LanguagePreference;

/// 切换控件注入器
#[derive(Debug, Clone)]
pub struct ControlInjector {
    control_id: String,
    icon_id: String,
    control_class: String,
    switch_to_alt_icon: String,
    switch_to_default_icon: String,
    switch_to_alt_label: String,
    switch_to_default_label: String,
    marker_selector: String,
    marker_text: String,
    fallback_selector: String,
}

impl ControlInjector {
    pub fn new(config: &LangmarkConfig) -> Self {
        Self {
            control_id: config.control_id.clone(),
            icon_id: config.control_icon_id.clone(),
            control_class: config.control_class.clone(),
            switch_to_alt_icon: config.switch_to_alt_icon.clone(),
            switch_to_default_icon: config.switch_to_default_icon.clone(),
            switch_to_alt_label: config.switch_to_alt_label.clone(),
            switch_to_default_label: config.switch_to_default_label.clone(),
            marker_selector: config.anchor_marker_selector.clone(),
            marker_text: config.anchor_marker_text.clone(),
            fallback_selector: config.anchor_fallback_selector.clone(),
        }
    }

    /// 文档中的控件；存在多个时返回第一个
    pub fn control(&self, document: &Handle) -> Option<Handle> {
        get_elements_by_id(document, &self.control_id).into_iter().next()
    }

    /// 确保控件存在，返回调用结束后控件是否存在
    ///
    /// 找不到锚点时返回 `false`（宿主页面尚未渲染出头部），下一次执行时重试。
    pub fn ensure_control(&self, document: &Handle, preference: LanguagePreference) -> bool {
        let existing = get_elements_by_id(document, &self.control_id);
        if let Some((_, duplicates)) = existing.split_first() {
            for duplicate in duplicates {
                detach(duplicate);
            }
            if !duplicates.is_empty() {
                warn!("移除了 {} 个重复的切换控件", duplicates.len());
            }
            self.update_visual(document, preference);
            return true;
        }

        let Some(anchor) = self.find_anchor(document) else {
            debug!("未找到控件锚点，等待下一次执行");
            return false;
        };

        let button = create_element(
            "button",
            &[
                ("id", self.control_id.as_str()),
                ("class", self.control_class.as_str()),
                ("style", constants::CONTROL_STYLE),
            ],
        );
        let icon = create_element(
            "img",
            &[
                ("id", self.icon_id.as_str()),
                ("style", constants::CONTROL_ICON_STYLE),
            ],
        );
        append_child(&button, icon);
        insert_first_child(&anchor, button);
        info!("已插入语言切换控件");

        self.update_visual(document, preference);
        true
    }

    /// 定位锚点：先找带标记文本的读屏标签，再退回到结构选择器
    pub fn find_anchor(&self, document: &Handle) -> Option<Handle> {
        match query_selector_all(document, &self.marker_selector) {
            Ok(markers) => {
                let anchor = markers
                    .iter()
                    .filter(|marker| text_content(marker).contains(&self.marker_text))
                    .find_map(|marker| {
                        closest(marker, "button").and_then(|button| get_parent_node(&button))
                    });
                if anchor.is_some() {
                    return anchor;
                }
            }
            Err(e) => log_error(&e),
        }

        match query_selector(document, &self.fallback_selector) {
            Ok(anchor) => anchor,
            Err(e) => {
                log_error(&e);
                None
            }
        }
    }

    /// 按当前语言刷新图标：显示的是点击后将切换到的语言
    pub fn update_visual(&self, document: &Handle, preference: LanguagePreference) {
        let Some(icon) = get_elements_by_id(document, &self.icon_id).into_iter().next() else {
            return;
        };

        let (path, label) = match preference {
            LanguagePreference::Default => (&self.switch_to_alt_icon, &self.switch_to_alt_label),
            LanguagePreference::Alt => {
                (&self.switch_to_default_icon, &self.switch_to_default_label)
            }
        };
        let src = self.relative_image_path(document, path);

        if get_node_attr(&icon, "src").as_deref() != Some(src.as_str()) {
            set_node_attr(&icon, "src", Some(src));
        }
        if get_node_attr(&icon, "alt").as_deref() != Some(label.as_str()) {
            set_node_attr(&icon, "alt", Some(label.clone()));
        }
    }

    /// 借用页面已有图片的路径前缀，使图标路径与页面所在目录一致
    fn relative_image_path(&self, document: &Handle, path: &str) -> String {
        let prefix = elements(document)
            .filter(|node| get_node_name(node) == Some("img"))
            .filter(|node| get_node_attr(node, "id").as_deref() != Some(self.icon_id.as_str()))
            .find_map(|node| {
                let src = get_node_attr(&node, "src")?;
                src.find(constants::IMAGE_DIR_MARKER)
                    .map(|idx| src[..idx].to_string())
            });

        match prefix {
            Some(prefix) => format!("{}{}", prefix, path),
            None => path.to_string(),
        }
    }

    /// 节点是否为控件本身或其后代，用于点击路由
    pub fn is_control_target(&self, document: &Handle, node: &Handle) -> bool {
        self.control(document)
            .map(|control| is_inclusive_descendant(node, &control))
            .unwrap_or(false)
    }
}
