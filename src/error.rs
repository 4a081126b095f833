//! 统一错误处理
//!
//! 本 crate 中没有任何错误会中断宿主页面：所有失败都降级为
//! “保持宿主渲染器产出的页面不变”，并输出一行诊断日志。

use std::fmt;

use thiserror::Error;

/// langmark 错误类型
#[derive(Error, Debug, Clone)]
pub enum LangmarkError {
    /// 持久化存储不可用或访问被拒绝
    #[error("存储错误: {0}")]
    Storage(String),

    /// 选择器语法不受支持
    #[error("选择器错误: {0}")]
    Selector(String),

    /// 配置错误
    #[error("配置错误: {0}")]
    Config(String),

    /// 词典加载或解析失败
    #[error("词典错误: {0}")]
    Dictionary(String),

    /// IO 错误
    #[error("IO错误: {0}")]
    Io(String),
}

/// 错误严重程度
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum ErrorSeverity {
    Warning,
    Error,
}

impl LangmarkError {
    /// 获取错误的严重程度
    ///
    /// 存储与选择器错误在运行期可恢复，只是警告；
    /// 配置、词典和 IO 错误发生在启动阶段，属于真正的错误。
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            LangmarkError::Storage(_) => ErrorSeverity::Warning,
            LangmarkError::Selector(_) => ErrorSeverity::Warning,
            LangmarkError::Config(_) => ErrorSeverity::Error,
            LangmarkError::Dictionary(_) => ErrorSeverity::Error,
            LangmarkError::Io(_) => ErrorSeverity::Error,
        }
    }

    /// 创建带上下文的错误
    pub fn with_context<T: fmt::Display>(self, context: T) -> Self {
        let wrap = |msg: String| format!("{} (上下文: {})", msg, context);

        match self {
            LangmarkError::Storage(msg) => LangmarkError::Storage(wrap(msg)),
            LangmarkError::Selector(msg) => LangmarkError::Selector(wrap(msg)),
            LangmarkError::Config(msg) => LangmarkError::Config(wrap(msg)),
            LangmarkError::Dictionary(msg) => LangmarkError::Dictionary(wrap(msg)),
            LangmarkError::Io(msg) => LangmarkError::Io(wrap(msg)),
        }
    }
}

impl From<std::io::Error> for LangmarkError {
    fn from(error: std::io::Error) -> Self {
        LangmarkError::Io(error.to_string())
    }
}

impl From<serde_json::Error> for LangmarkError {
    fn from(error: serde_json::Error) -> Self {
        LangmarkError::Dictionary(format!("JSON解析错误: {}", error))
    }
}

impl From<toml::de::Error> for LangmarkError {
    fn from(error: toml::de::Error) -> Self {
        LangmarkError::Config(format!("TOML解析错误: {}", error))
    }
}

impl From<redb::Error> for LangmarkError {
    fn from(error: redb::Error) -> Self {
        LangmarkError::Storage(error.to_string())
    }
}

impl From<crate::env::EnvError> for LangmarkError {
    fn from(error: crate::env::EnvError) -> Self {
        LangmarkError::Config(error.to_string())
    }
}

/// 错误结果类型别名
pub type LangmarkResult<T> = Result<T, LangmarkError>;

/// 错误处理助手函数
pub mod helpers {
    use super::*;

    /// 按严重程度记录错误
    pub fn log_error(error: &LangmarkError) {
        match error.severity() {
            ErrorSeverity::Warning => tracing::warn!("{}", error),
            ErrorSeverity::Error => tracing::error!("{}", error),
        }
    }

    /// 创建存储错误
    pub fn storage_error<T: fmt::Display>(msg: T) -> LangmarkError {
        LangmarkError::Storage(msg.to_string())
    }

    /// 创建选择器错误
    pub fn selector_error<T: fmt::Display>(msg: T) -> LangmarkError {
        LangmarkError::Selector(msg.to_string())
    }
}
