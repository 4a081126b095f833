//! 调和模块
//!
//! - **event_loop**: 虚拟时钟任务队列与尾沿防抖
//! - **polling**: 逐步放缓的定时巡检
//! - **sentinel**: 有界前缀的哨兵还原检测
//! - **engine**: 驱动控件注入与翻译的状态机

pub mod engine;
pub mod event_loop;
pub mod polling;
pub mod sentinel;

pub use engine::{EngineState, EngineStats, EnforceTrigger, ReconcileEngine};
pub use event_loop::{Debouncer, DueTask, EventLoop, TaskId, TaskKind};
pub use polling::SafetyNet;
pub use sentinel::SentinelCheck;
