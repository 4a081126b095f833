//! 统一的环境变量管理系统
//!
//! 提供类型安全、可验证的环境变量访问。所有变量都以 `LANGMARK_` 为前缀，
//! 区域信号额外回落到标准的 `LANG` 变量。

use std::env;
use std::fmt;

/// 环境变量解析错误
#[derive(Debug, Clone)]
pub struct EnvError {
    pub variable: String,
    pub message: String,
}

impl fmt::Display for EnvError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Environment variable '{}': {}", self.variable, self.message)
    }
}

impl std::error::Error for EnvError {}

pub type EnvResult<T> = Result<T, EnvError>;

/// 环境变量访问器特性
pub trait EnvVar<T> {
    const NAME: &'static str;
    const DEFAULT: Option<T>;
    const DESCRIPTION: &'static str;

    fn parse(value: &str) -> EnvResult<T>;

    fn get() -> EnvResult<T> {
        match env::var(Self::NAME) {
            Ok(value) => Self::parse(&value),
            Err(_) => {
                if let Some(default) = Self::DEFAULT {
                    Ok(default)
                } else {
                    Err(EnvError {
                        variable: Self::NAME.to_string(),
                        message: "Required environment variable not set".to_string(),
                    })
                }
            }
        }
    }

    fn get_or_default(default: T) -> T {
        Self::get().unwrap_or(default)
    }

    /// 仅在变量已设置时返回解析结果，未设置时为 `None`
    fn get_set() -> Option<EnvResult<T>> {
        env::var(Self::NAME).ok().map(|value| Self::parse(&value))
    }
}

/// 核心环境变量定义
pub mod core {
    use super::*;

    /// 日志级别
    pub struct LogLevel;
    impl EnvVar<String> for LogLevel {
        const NAME: &'static str = "LANGMARK_LOG_LEVEL";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Log level: trace, debug, info, warn, error";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME) {
                Ok(value) => Self::parse(&value),
                Err(_) => Ok("info".to_string()),
            }
        }

        fn parse(value: &str) -> EnvResult<String> {
            match value.to_lowercase().as_str() {
                "trace" | "debug" | "info" | "warn" | "error" => Ok(value.to_lowercase()),
                _ => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!(
                        "Invalid log level '{}'. Use: trace, debug, info, warn, error",
                        value
                    ),
                }),
            }
        }
    }
}

/// 协调循环的调优参数
pub mod reconcile {
    use super::*;

    /// 变更通知去抖窗口
    pub struct DebounceMs;
    impl EnvVar<u64> for DebounceMs {
        const NAME: &'static str = "LANGMARK_DEBOUNCE_MS";
        const DEFAULT: Option<u64> = Some(100);
        const DESCRIPTION: &'static str = "Quiet period before a mutation burst triggers enforce";

        fn parse(value: &str) -> EnvResult<u64> {
            parse_millis(value, Self::NAME, 1, 10_000)
        }
    }

    /// 快速轮询间隔
    pub struct FastIntervalMs;
    impl EnvVar<u64> for FastIntervalMs {
        const NAME: &'static str = "LANGMARK_FAST_INTERVAL_MS";
        const DEFAULT: Option<u64> = Some(100);
        const DESCRIPTION: &'static str = "Safety-net polling interval during early hydration";

        fn parse(value: &str) -> EnvResult<u64> {
            parse_millis(value, Self::NAME, 10, 60_000)
        }
    }

    /// 快速轮询持续时长
    pub struct FastDurationMs;
    impl EnvVar<u64> for FastDurationMs {
        const NAME: &'static str = "LANGMARK_FAST_DURATION_MS";
        const DEFAULT: Option<u64> = Some(5000);
        const DESCRIPTION: &'static str = "How long the fast polling interval stays active";

        fn parse(value: &str) -> EnvResult<u64> {
            parse_millis(value, Self::NAME, 0, 3_600_000)
        }
    }

    /// 慢速轮询间隔
    pub struct SlowIntervalMs;
    impl EnvVar<u64> for SlowIntervalMs {
        const NAME: &'static str = "LANGMARK_SLOW_INTERVAL_MS";
        const DEFAULT: Option<u64> = Some(500);
        const DESCRIPTION: &'static str = "Safety-net polling interval after the fast phase";

        fn parse(value: &str) -> EnvResult<u64> {
            parse_millis(value, Self::NAME, 10, 600_000)
        }
    }

    /// 哨兵扫描的文本节点上限
    pub struct SentinelScanCap;
    impl EnvVar<usize> for SentinelScanCap {
        const NAME: &'static str = "LANGMARK_SENTINEL_SCAN_CAP";
        const DEFAULT: Option<usize> = Some(200);
        const DESCRIPTION: &'static str = "Number of leading text nodes inspected for sentinels";

        fn parse(value: &str) -> EnvResult<usize> {
            parse_positive_usize(value, Self::NAME, 1, 100_000)
        }
    }
}

/// 区域信号
pub mod locale {
    use super::*;

    /// 环境区域信号，优先读取 `LANGMARK_LOCALE`，否则回落到 `LANG`
    pub struct Locale;
    impl EnvVar<String> for Locale {
        const NAME: &'static str = "LANGMARK_LOCALE";
        const DEFAULT: Option<String> = None;
        const DESCRIPTION: &'static str = "Environment locale signal, e.g. tr-TR (falls back to LANG)";

        fn get() -> EnvResult<String> {
            match env::var(Self::NAME).or_else(|_| env::var("LANG")) {
                Ok(value) => Self::parse(&value),
                Err(_) => Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: "Neither LANGMARK_LOCALE nor LANG is set".to_string(),
                }),
            }
        }

        /// 将 POSIX 形式 `tr_TR.UTF-8` 规范化为 `tr-TR`
        fn parse(value: &str) -> EnvResult<String> {
            let tag = value
                .trim()
                .split(['.', '@'])
                .next()
                .unwrap_or_default()
                .replace('_', "-");

            if tag.is_empty() || tag == "C" || tag == "POSIX" {
                return Err(EnvError {
                    variable: Self::NAME.to_string(),
                    message: format!("'{}' carries no language", value),
                });
            }

            Ok(tag)
        }
    }
}

fn parse_millis(value: &str, var_name: &str, min: u64, max: u64) -> EnvResult<u64> {
    let num: u64 = value.trim().parse().map_err(|_| EnvError {
        variable: var_name.to_string(),
        message: "Must be a valid number of milliseconds".to_string(),
    })?;

    if num < min || num > max {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} is outside {}..={}", num, min, max),
        });
    }

    Ok(num)
}

fn parse_positive_usize(value: &str, var_name: &str, min: usize, max: usize) -> EnvResult<usize> {
    let num: usize = value.trim().parse().map_err(|_| EnvError {
        variable: var_name.to_string(),
        message: "Must be a valid positive number".to_string(),
    })?;

    if num < min {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} is below minimum {}", num, min),
        });
    }

    if num > max {
        return Err(EnvError {
            variable: var_name.to_string(),
            message: format!("Value {} exceeds maximum {}", num, max),
        });
    }

    Ok(num)
}

/// 环境变量文档生成器
pub fn generate_env_docs() -> String {
    let mut docs = String::new();
    docs.push_str("# Environment Variables\n\n");

    let entries = [
        (core::LogLevel::NAME, core::LogLevel::DESCRIPTION, "info".to_string()),
        (
            reconcile::DebounceMs::NAME,
            reconcile::DebounceMs::DESCRIPTION,
            format!("{:?}", reconcile::DebounceMs::DEFAULT),
        ),
        (
            reconcile::FastIntervalMs::NAME,
            reconcile::FastIntervalMs::DESCRIPTION,
            format!("{:?}", reconcile::FastIntervalMs::DEFAULT),
        ),
        (
            reconcile::FastDurationMs::NAME,
            reconcile::FastDurationMs::DESCRIPTION,
            format!("{:?}", reconcile::FastDurationMs::DEFAULT),
        ),
        (
            reconcile::SlowIntervalMs::NAME,
            reconcile::SlowIntervalMs::DESCRIPTION,
            format!("{:?}", reconcile::SlowIntervalMs::DEFAULT),
        ),
        (
            reconcile::SentinelScanCap::NAME,
            reconcile::SentinelScanCap::DESCRIPTION,
            format!("{:?}", reconcile::SentinelScanCap::DEFAULT),
        ),
        (locale::Locale::NAME, locale::Locale::DESCRIPTION, "LANG".to_string()),
    ];

    for (name, description, default) in entries {
        docs.push_str(&format!("- `{}`: {} (default: {})\n", name, description, default));
    }

    docs
}
