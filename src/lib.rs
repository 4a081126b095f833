//! # Langmark Library
//!
//! 为静态页面叠加基于词典的备选语言，并在外部渲染器反复还原页面时持续修复。
//!
//! ## 模块组织
//!
//! - `parsers` - HTML 解析、DOM 操作、文本遍历与简单选择器
//! - `state` - 语言偏好的持久化与区域检测
//! - `translation` - 词典、翻译器与源字符串提取
//! - `control` - 语言切换控件的定位与注入
//! - `hider` - 按短语隐藏区块
//! - `page` - 宿主页面模型（文档、就绪状态、变更记录）
//! - `reconcile` - 事件循环、防抖、巡检与调和状态机
//! - `runtime` - 宿主事件入口
//! - `config` / `env` / `error` - 配置、环境变量与错误类型

pub mod config;
pub mod control;
pub mod env;
pub mod error;
pub mod hider;
pub mod page;
pub mod parsers;
pub mod reconcile;
pub mod runtime;
pub mod state;
pub mod translation;

pub use config::LangmarkConfig;
pub use error::{LangmarkError, LangmarkResult};
pub use runtime::Runtime;
pub use state::LanguagePreference;
