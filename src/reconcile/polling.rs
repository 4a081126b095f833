//! 定时巡检
//!
//! 与变更通知相互独立的安全网：先以快间隔巡检一段时间，之后改为慢间隔长期运行。

use tracing::debug;

use super::event_loop::{EventLoop, TaskId, TaskKind};

/// 逐步放缓的周期巡检
#[derive(Debug, Clone)]
pub struct SafetyNet {
    fast_interval_ms: u64,
    fast_duration_ms: u64,
    slow_interval_ms: u64,
    elapsed_ms: u64,
    tapered: bool,
    timer: Option<TaskId>,
}

impl SafetyNet {
    pub fn new(fast_interval_ms: u64, fast_duration_ms: u64, slow_interval_ms: u64) -> Self {
        Self {
            fast_interval_ms,
            fast_duration_ms,
            slow_interval_ms,
            elapsed_ms: 0,
            tapered: false,
            timer: None,
        }
    }

    /// 当前巡检间隔
    pub fn interval_ms(&self) -> u64 {
        if self.tapered {
            self.slow_interval_ms
        } else {
            self.fast_interval_ms
        }
    }

    pub fn is_running(&self) -> bool {
        self.timer.is_some()
    }

    pub fn start(&mut self, event_loop: &mut EventLoop) {
        self.stop(event_loop);
        self.elapsed_ms = 0;
        self.tapered = false;
        self.timer = Some(event_loop.set_interval(self.fast_interval_ms, TaskKind::SafetyTick));
    }

    pub fn stop(&mut self, event_loop: &mut EventLoop) {
        if let Some(id) = self.timer.take() {
            event_loop.cancel(id);
        }
    }

    /// 巡检任务到期时调用，返回该任务是否属于本巡检器
    ///
    /// 快间隔累计时长超过上限后切换为慢间隔。
    pub fn on_tick(&mut self, event_loop: &mut EventLoop, id: TaskId) -> bool {
        if self.timer != Some(id) {
            return false;
        }

        self.elapsed_ms += self.interval_ms();
        if !self.tapered && self.elapsed_ms > self.fast_duration_ms {
            event_loop.cancel(id);
            self.tapered = true;
            self.timer = Some(event_loop.set_interval(self.slow_interval_ms, TaskKind::SafetyTick));
            debug!(
                "巡检累计 {}ms，间隔调整为 {}ms",
                self.elapsed_ms, self.slow_interval_ms
            );
        }
        true
    }
}
