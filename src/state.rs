//! 语言状态存储
//!
//! 负责持久化与读取当前语言偏好。存储为空时，根据环境区域信号推导默认值；
//! 推导结果不会写回存储，下次读取时重新计算。

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::path::Path;
use std::rc::Rc;

use redb::{Database, ReadableTable, TableDefinition};
use tracing::{debug, warn};

use crate::config::LangmarkConfig;
use crate::error::{helpers::storage_error, LangmarkError, LangmarkResult};

/// 语言偏好
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LanguagePreference {
    /// 页面原始语言
    Default,
    /// 词典翻译后的语言
    Alt,
}

impl LanguagePreference {
    /// 切换控件点击后应切换到的语言
    pub fn opposite(self) -> Self {
        match self {
            LanguagePreference::Default => LanguagePreference::Alt,
            LanguagePreference::Alt => LanguagePreference::Default,
        }
    }
}

/// 持久化键值存储
///
/// 访问可能失败（例如被拒绝），调用方必须显式处理 `Err`。
pub trait Storage {
    fn get_item(&self, key: &str) -> LangmarkResult<Option<String>>;
    fn set_item(&self, key: &str, value: &str) -> LangmarkResult<()>;
}

/// 进程内存储
///
/// 克隆后共享同一份数据，因此页面重载后依然保留。
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    entries: Rc<RefCell<HashMap<String, String>>>,
    denied: Rc<Cell<bool>>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// 模拟存储访问被拒绝
    pub fn set_denied(&self, denied: bool) {
        self.denied.set(denied);
    }

    fn check_access(&self) -> LangmarkResult<()> {
        if self.denied.get() {
            return Err(storage_error("存储访问被拒绝"));
        }
        Ok(())
    }
}

impl Storage for MemoryStorage {
    fn get_item(&self, key: &str) -> LangmarkResult<Option<String>> {
        self.check_access()?;
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set_item(&self, key: &str, value: &str) -> LangmarkResult<()> {
        self.check_access()?;
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }
}

const PREFERENCES: TableDefinition<&str, &str> = TableDefinition::new("preferences");

fn redb_error<E: Into<redb::Error>>(error: E) -> LangmarkError {
    let error: redb::Error = error.into();
    LangmarkError::from(error)
}

/// 基于 redb 的磁盘存储
pub struct RedbStorage {
    db: Database,
}

impl RedbStorage {
    /// 打开（或创建）状态数据库
    pub fn open(path: &Path) -> LangmarkResult<Self> {
        let db = Database::create(path)
            .map_err(|e| redb_error(e).with_context(path.display()))?;
        Ok(Self { db })
    }
}

impl Storage for RedbStorage {
    fn get_item(&self, key: &str) -> LangmarkResult<Option<String>> {
        let txn = self.db.begin_read().map_err(redb_error)?;
        let table = match txn.open_table(PREFERENCES) {
            Ok(table) => table,
            Err(redb::TableError::TableDoesNotExist(_)) => return Ok(None),
            Err(e) => return Err(redb_error(e)),
        };

        let value = table.get(key).map_err(redb_error)?;
        Ok(value.map(|guard| guard.value().to_string()))
    }

    fn set_item(&self, key: &str, value: &str) -> LangmarkResult<()> {
        let txn = self.db.begin_write().map_err(redb_error)?;
        {
            let mut table = txn.open_table(PREFERENCES).map_err(redb_error)?;
            table.insert(key, value).map_err(redb_error)?;
        }
        txn.commit().map_err(redb_error)?;
        Ok(())
    }
}

/// 语言状态存储
#[derive(Debug, Clone)]
pub struct LanguageStore {
    key: String,
    default_tag: String,
    alt_tag: String,
}

impl LanguageStore {
    pub fn new(config: &LangmarkConfig) -> Self {
        Self {
            key: config.storage_key.clone(),
            default_tag: config.default_locale.clone(),
            alt_tag: config.alt_locale.clone(),
        }
    }

    /// 语言偏好对应的存储值
    pub fn tag(&self, preference: LanguagePreference) -> &str {
        match preference {
            LanguagePreference::Default => &self.default_tag,
            LanguagePreference::Alt => &self.alt_tag,
        }
    }

    fn parse_tag(&self, tag: &str) -> Option<LanguagePreference> {
        if tag == self.alt_tag {
            Some(LanguagePreference::Alt)
        } else if tag == self.default_tag {
            Some(LanguagePreference::Default)
        } else {
            None
        }
    }

    /// 读取语言偏好，永不失败
    ///
    /// 存储失败或为空时回落到区域检测；区域以备选语言代码开头即为 `Alt`。
    pub fn get_preference(
        &self,
        storage: &dyn Storage,
        locale: Option<&str>,
    ) -> LanguagePreference {
        match storage.get_item(&self.key) {
            Ok(Some(tag)) => match self.parse_tag(&tag) {
                Some(preference) => return preference,
                None => warn!("忽略无法识别的语言值: {}", tag),
            },
            Ok(None) => {}
            Err(e) => warn!("读取语言偏好失败，回落到区域检测: {}", e),
        }

        self.detect(locale)
    }

    /// 根据环境区域信号推导语言
    pub fn detect(&self, locale: Option<&str>) -> LanguagePreference {
        let detected = match locale {
            Some(locale) if locale.to_ascii_lowercase().starts_with(&self.alt_tag) => {
                LanguagePreference::Alt
            }
            _ => LanguagePreference::Default,
        };
        debug!("区域 {:?} 推导语言为 {:?}", locale, detected);
        detected
    }

    /// 持久化语言偏好
    pub fn set_preference(
        &self,
        storage: &dyn Storage,
        preference: LanguagePreference,
    ) -> LangmarkResult<()> {
        storage
            .set_item(&self.key, self.tag(preference))
            .map_err(|e| e.with_context(&self.key))
    }
}
