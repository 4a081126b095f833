//! 单线程事件循环
//!
//! 虚拟时钟驱动的任务队列。任务按 (到期时间, 插入顺序) 依次执行，每个任务都
//! 执行完毕后才轮到下一个。周期任务在派发前重新入队，因此回调中可以取消它。

use std::fmt;

use tracing::trace;

/// 任务标识
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// 任务类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskKind {
    DocumentReady,
    DebouncedEnforce,
    SafetyTick,
}

#[derive(Debug, Clone)]
struct ScheduledTask {
    id: TaskId,
    due_at: u64,
    order: u64,
    interval_ms: Option<u64>,
    kind: TaskKind,
}

/// 已到期、等待派发的任务
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DueTask {
    pub id: TaskId,
    pub kind: TaskKind,
    pub due_at: u64,
}

/// 虚拟时钟任务队列
#[derive(Debug, Default)]
pub struct EventLoop {
    now_ms: u64,
    tasks: Vec<ScheduledTask>,
    next_id: u64,
    next_order: u64,
}

impl EventLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    /// 在 `delay_ms` 之后执行一次
    pub fn set_timeout(&mut self, delay_ms: u64, kind: TaskKind) -> TaskId {
        self.schedule(delay_ms, None, kind)
    }

    /// 每隔 `interval_ms` 执行一次，直到被取消
    pub fn set_interval(&mut self, interval_ms: u64, kind: TaskKind) -> TaskId {
        let interval_ms = interval_ms.max(1);
        self.schedule(interval_ms, Some(interval_ms), kind)
    }

    fn schedule(&mut self, delay_ms: u64, interval_ms: Option<u64>, kind: TaskKind) -> TaskId {
        self.next_id += 1;
        let id = TaskId(self.next_id);
        let due_at = self.now_ms.saturating_add(delay_ms);
        let order = self.next_order();

        trace!("调度任务 {} {:?} due_at={}", id, kind, due_at);
        self.tasks.push(ScheduledTask {
            id,
            due_at,
            order,
            interval_ms,
            kind,
        });
        id
    }

    fn next_order(&mut self) -> u64 {
        self.next_order += 1;
        self.next_order
    }

    /// 取消任务，返回任务是否仍在队列中
    pub fn cancel(&mut self, id: TaskId) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|task| task.id != id);
        before != self.tasks.len()
    }

    pub fn is_pending(&self, id: TaskId) -> bool {
        self.tasks.iter().any(|task| task.id == id)
    }

    /// 队列中的任务数
    pub fn pending(&self) -> usize {
        self.tasks.len()
    }

    /// 取出 `until` 之前（含）最早到期的任务，并把时钟拨到其到期时间
    pub fn pop_due(&mut self, until: u64) -> Option<DueTask> {
        let index = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, task)| task.due_at <= until)
            .min_by_key(|(_, task)| (task.due_at, task.order))
            .map(|(index, _)| index)?;

        let task = self.tasks.remove(index);
        if task.due_at > self.now_ms {
            self.now_ms = task.due_at;
        }

        if let Some(interval_ms) = task.interval_ms {
            let order = self.next_order();
            self.tasks.push(ScheduledTask {
                due_at: task.due_at.saturating_add(interval_ms),
                order,
                ..task.clone()
            });
        }

        Some(DueTask {
            id: task.id,
            kind: task.kind,
            due_at: task.due_at,
        })
    }

    /// 时钟只进不退
    pub fn advance_clock_to(&mut self, target_ms: u64) {
        self.now_ms = self.now_ms.max(target_ms);
    }

    /// 丢弃全部任务，时钟不变
    pub fn clear(&mut self) {
        self.tasks.clear();
    }
}

/// 尾沿防抖
///
/// 每次触发都取消尚未执行的任务并重新计时，一阵密集的触发只在安静期结束后执行一次。
#[derive(Debug, Clone)]
pub struct Debouncer {
    window_ms: u64,
    pending: Option<TaskId>,
}

impl Debouncer {
    pub fn new(window_ms: u64) -> Self {
        Self {
            window_ms,
            pending: None,
        }
    }

    pub fn trigger(&mut self, event_loop: &mut EventLoop) -> TaskId {
        if let Some(id) = self.pending.take() {
            event_loop.cancel(id);
        }
        let id = event_loop.set_timeout(self.window_ms, TaskKind::DebouncedEnforce);
        self.pending = Some(id);
        id
    }

    /// 任务到期时调用；只有最近一次调度的任务才算数
    pub fn fire(&mut self, id: TaskId) -> bool {
        if self.pending == Some(id) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// 取消尚未执行的任务
    pub fn cancel(&mut self, event_loop: &mut EventLoop) {
        if let Some(id) = self.pending.take() {
            event_loop.cancel(id);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain(event_loop: &mut EventLoop, until: u64) -> Vec<DueTask> {
        let mut ran = Vec::new();
        while let Some(task) = event_loop.pop_due(until) {
            ran.push(task);
        }
        event_loop.advance_clock_to(until);
        ran
    }

    #[test]
    fn test_tasks_run_in_due_then_insertion_order() {
        let mut event_loop = EventLoop::new();
        let late = event_loop.set_timeout(20, TaskKind::DebouncedEnforce);
        let first = event_loop.set_timeout(10, TaskKind::DocumentReady);
        let second = event_loop.set_timeout(10, TaskKind::SafetyTick);

        let ids: Vec<TaskId> = drain(&mut event_loop, 100).iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![first, second, late]);
        assert_eq!(event_loop.now_ms(), 100);
        assert_eq!(event_loop.pending(), 0);
    }

    #[test]
    fn test_interval_repeats_until_cancelled() {
        let mut event_loop = EventLoop::new();
        let id = event_loop.set_interval(100, TaskKind::SafetyTick);

        let ran = drain(&mut event_loop, 350);
        assert_eq!(
            ran.iter().map(|t| t.due_at).collect::<Vec<_>>(),
            vec![100, 200, 300]
        );
        assert!(event_loop.is_pending(id));

        assert!(event_loop.cancel(id));
        assert!(drain(&mut event_loop, 1000).is_empty());
    }

    #[test]
    fn test_debounce_collapses_burst() {
        let mut event_loop = EventLoop::new();
        let mut debouncer = Debouncer::new(100);

        let mut last = debouncer.trigger(&mut event_loop);
        for step in 1..=5 {
            drain(&mut event_loop, step * 20);
            last = debouncer.trigger(&mut event_loop);
        }
        assert_eq!(event_loop.pending(), 1);

        let ran = drain(&mut event_loop, 1000);
        assert_eq!(ran.len(), 1);
        assert_eq!(ran[0].id, last);
        assert_eq!(ran[0].due_at, 200);
        assert!(debouncer.fire(ran[0].id));
        assert!(!debouncer.is_pending());
    }
}
