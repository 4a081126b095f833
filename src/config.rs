//! 配置管理
//!
//! 配置分三层叠加：内置默认值（`constants`）、可选的 TOML 配置文件、
//! 以及 `LANGMARK_*` 环境变量覆盖。加载完成后统一校验。

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::env::{reconcile, EnvResult, EnvVar};
use crate::error::{LangmarkError, LangmarkResult};

/// 配置常量
pub mod constants {
    pub const STORAGE_KEY: &str = "aeronix_lang";
    pub const DEFAULT_LOCALE: &str = "en";
    pub const ALT_LOCALE: &str = "tr";
    pub const ACTIVATION_CLASS: &str = "lang-tr-active";

    pub const CONTROL_ID: &str = "lang-toggle-btn";
    pub const CONTROL_ICON_ID: &str = "lang-toggle-img";
    pub const CONTROL_CLASS: &str = "inline-flex items-center justify-center rounded-md text-sm font-medium transition-colors hover:bg-accent hover:text-accent-foreground h-9 w-9 mr-2";
    pub const CONTROL_STYLE: &str = "margin-right: 0.5rem";
    pub const CONTROL_ICON_STYLE: &str =
        "width: 24px; height: 24px; border-radius: 50%; object-fit: cover";

    /// 点击后会切换到的语言图标
    pub const SWITCH_TO_ALT_ICON: &str = "images/tr.png";
    pub const SWITCH_TO_DEFAULT_ICON: &str = "images/en.png";
    pub const SWITCH_TO_ALT_LABEL: &str = "Switch to Turkish";
    pub const SWITCH_TO_DEFAULT_LABEL: &str = "Switch to English";
    pub const IMAGE_DIR_MARKER: &str = "images/";

    pub const ANCHOR_MARKER_SELECTOR: &str = "span.sr-only";
    pub const ANCHOR_MARKER_TEXT: &str = "Toggle theme";
    pub const ANCHOR_FALLBACK_SELECTOR: &str = ".hidden.flex-shrink-0.lg\\:flex";

    pub const OPAQUE_TAGS: &[&str] = &[
        "script", "style", "noscript", "textarea", "input", "code", "svg",
    ];

    pub const SENTINELS: &[&str] = &["Solutions", "Industries", "About Us", "Contact"];
    pub const SENTINEL_SCAN_CAP: usize = 200;

    pub const DEBOUNCE_MS: u64 = 100;
    pub const FAST_INTERVAL_MS: u64 = 100;
    pub const FAST_DURATION_MS: u64 = 5000;
    pub const SLOW_INTERVAL_MS: u64 = 500;

    pub const CONFIG_PATHS: &[&str] = &["langmark.toml", ".langmark.toml"];
}

/// 运行期配置
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(default)]
pub struct LangmarkConfig {
    // 语言状态
    pub storage_key: String,
    pub default_locale: String,
    pub alt_locale: String,
    pub activation_class: String,

    // 切换控件
    pub control_id: String,
    pub control_icon_id: String,
    pub control_class: String,
    pub switch_to_alt_icon: String,
    pub switch_to_default_icon: String,
    pub switch_to_alt_label: String,
    pub switch_to_default_label: String,
    pub anchor_marker_selector: String,
    pub anchor_marker_text: String,
    pub anchor_fallback_selector: String,

    // 遍历与哨兵
    pub opaque_tags: Vec<String>,
    pub sentinels: Vec<String>,
    pub sentinel_scan_cap: usize,

    // 调度
    pub debounce_ms: u64,
    pub fast_interval_ms: u64,
    pub fast_duration_ms: u64,
    pub slow_interval_ms: u64,

    /// 需要隐藏的区块所包含的短语；为空时不启用区块隐藏
    pub hidden_section_phrases: Vec<String>,
}

impl Default for LangmarkConfig {
    fn default() -> Self {
        let owned = |items: &[&str]| items.iter().map(|s| s.to_string()).collect();

        Self {
            storage_key: constants::STORAGE_KEY.to_string(),
            default_locale: constants::DEFAULT_LOCALE.to_string(),
            alt_locale: constants::ALT_LOCALE.to_string(),
            activation_class: constants::ACTIVATION_CLASS.to_string(),

            control_id: constants::CONTROL_ID.to_string(),
            control_icon_id: constants::CONTROL_ICON_ID.to_string(),
            control_class: constants::CONTROL_CLASS.to_string(),
            switch_to_alt_icon: constants::SWITCH_TO_ALT_ICON.to_string(),
            switch_to_default_icon: constants::SWITCH_TO_DEFAULT_ICON.to_string(),
            switch_to_alt_label: constants::SWITCH_TO_ALT_LABEL.to_string(),
            switch_to_default_label: constants::SWITCH_TO_DEFAULT_LABEL.to_string(),
            anchor_marker_selector: constants::ANCHOR_MARKER_SELECTOR.to_string(),
            anchor_marker_text: constants::ANCHOR_MARKER_TEXT.to_string(),
            anchor_fallback_selector: constants::ANCHOR_FALLBACK_SELECTOR.to_string(),

            opaque_tags: owned(constants::OPAQUE_TAGS),
            sentinels: owned(constants::SENTINELS),
            sentinel_scan_cap: constants::SENTINEL_SCAN_CAP,

            debounce_ms: constants::DEBOUNCE_MS,
            fast_interval_ms: constants::FAST_INTERVAL_MS,
            fast_duration_ms: constants::FAST_DURATION_MS,
            slow_interval_ms: constants::SLOW_INTERVAL_MS,

            hidden_section_phrases: Vec::new(),
        }
    }
}

impl LangmarkConfig {
    /// 加载配置：显式路径 > 默认搜索路径 > 内置默认值，然后应用环境变量并校验
    pub fn load(path: Option<&Path>) -> LangmarkResult<Self> {
        let mut config = match path {
            Some(path) => Self::from_file(path)?,
            None => match constants::CONFIG_PATHS
                .iter()
                .map(Path::new)
                .find(|candidate| candidate.exists())
            {
                Some(found) => Self::from_file(found)?,
                None => Self::default(),
            },
        };

        config.apply_env_overrides();
        config.validate()?;

        Ok(config)
    }

    /// 从 TOML 文件读取配置，未出现的字段取默认值
    pub fn from_file(path: &Path) -> LangmarkResult<Self> {
        let content = fs::read_to_string(path)
            .map_err(|e| LangmarkError::from(e).with_context(path.display()))?;
        let config: Self = toml::from_str(&content)?;
        tracing::info!("已加载配置文件: {}", path.display());
        Ok(config)
    }

    /// 应用环境变量覆盖，只处理已设置的变量
    pub fn apply_env_overrides(&mut self) {
        if let Some(debounce) = env_override(reconcile::DebounceMs::get_set()) {
            self.debounce_ms = debounce;
        }

        if let Some(interval) = env_override(reconcile::FastIntervalMs::get_set()) {
            self.fast_interval_ms = interval;
        }

        if let Some(duration) = env_override(reconcile::FastDurationMs::get_set()) {
            self.fast_duration_ms = duration;
        }

        if let Some(interval) = env_override(reconcile::SlowIntervalMs::get_set()) {
            self.slow_interval_ms = interval;
        }

        if let Some(cap) = env_override(reconcile::SentinelScanCap::get_set()) {
            self.sentinel_scan_cap = cap;
        }
    }

    /// 验证配置
    pub fn validate(&self) -> LangmarkResult<()> {
        if self.default_locale.is_empty() || self.alt_locale.is_empty() {
            return Err(LangmarkError::Config("语言标签不能为空".to_string()));
        }

        if self.default_locale == self.alt_locale {
            return Err(LangmarkError::Config(format!(
                "默认语言与备选语言相同: {}",
                self.alt_locale
            )));
        }

        if self.storage_key.is_empty() {
            return Err(LangmarkError::Config("存储键不能为空".to_string()));
        }

        if self.control_id.is_empty() || self.control_icon_id.is_empty() {
            return Err(LangmarkError::Config("控件标识不能为空".to_string()));
        }

        if self.debounce_ms == 0 || self.fast_interval_ms == 0 || self.slow_interval_ms == 0 {
            return Err(LangmarkError::Config("调度间隔必须大于0".to_string()));
        }

        if self.sentinel_scan_cap == 0 {
            return Err(LangmarkError::Config("哨兵扫描上限必须大于0".to_string()));
        }

        Ok(())
    }
}

/// 无效的覆盖值记录警告后忽略，保留文件或默认值
fn env_override<T>(value: Option<EnvResult<T>>) -> Option<T> {
    match value? {
        Ok(value) => Some(value),
        Err(e) => {
            tracing::warn!("忽略环境变量覆盖: {}", e);
            None
        }
    }
}
