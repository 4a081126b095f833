//! 运行时
//!
//! 把页面、调和引擎与事件循环绑在一起，是宿主事件进入系统的唯一入口：
//! 启动、文档就绪、渲染器修改、用户点击与时间推进。

use markup5ever_rcdom::Handle;
use tracing::debug;

use crate::config::LangmarkConfig;
use crate::error::LangmarkResult;
use crate::page::{MutationKind, Page};
use crate::reconcile::{EngineStats, EventLoop, ReconcileEngine, TaskId, TaskKind};
use crate::state::LanguagePreference;
use crate::translation::Dictionary;

pub struct Runtime {
    page: Page,
    engine: ReconcileEngine,
    event_loop: EventLoop,
}

impl Runtime {
    pub fn new(page: Page, engine: ReconcileEngine) -> Self {
        Self {
            page,
            engine,
            event_loop: EventLoop::new(),
        }
    }

    pub fn with_config(page: Page, config: &LangmarkConfig, dictionary: Option<Dictionary>) -> Self {
        Self::new(page, ReconcileEngine::new(config, dictionary))
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn engine(&self) -> &ReconcileEngine {
        &self.engine
    }

    pub fn event_loop(&self) -> &EventLoop {
        &self.event_loop
    }

    pub fn document(&self) -> &Handle {
        self.page.document()
    }

    pub fn stats(&self) -> EngineStats {
        self.engine.stats()
    }

    pub fn now_ms(&self) -> u64 {
        self.event_loop.now_ms()
    }

    /// 脚本开始执行
    pub fn start(&mut self) {
        self.engine.start(&mut self.page, &mut self.event_loop);
    }

    /// 文档解析完成
    pub fn document_ready(&mut self) {
        self.engine.on_document_ready(&mut self.page);
    }

    /// 在 `delay_ms` 后发出文档就绪信号
    pub fn schedule_document_ready(&mut self, delay_ms: u64) -> TaskId {
        self.event_loop.set_timeout(delay_ms, TaskKind::DocumentReady)
    }

    /// 外部渲染器修改文档；被观察到的修改会投递给引擎
    pub fn host_mutate<F>(&mut self, kind: MutationKind, mutate: F) -> bool
    where
        F: FnOnce(&Handle),
    {
        let observed = self.page.host_mutate(kind, mutate);
        self.deliver_mutations();
        observed
    }

    /// 外部渲染器重新渲染 body
    pub fn host_rerender(&mut self) -> bool {
        let observed = self.page.host_rerender();
        self.deliver_mutations();
        observed
    }

    fn deliver_mutations(&mut self) {
        let records = self.page.take_mutations();
        self.engine.on_mutations(&mut self.event_loop, &records);
    }

    /// 用户点击，返回点击是否落在切换控件上
    pub fn click(&mut self, target: &Handle) -> bool {
        if !self.engine.injector().is_control_target(self.page.document(), target) {
            return false;
        }

        self.engine.toggle(&mut self.page);
        self.reload_if_requested();
        true
    }

    /// 点击切换控件；控件不存在时返回 `false`
    pub fn click_control(&mut self) -> bool {
        let control = self.engine.injector().control(self.page.document());
        match control {
            Some(control) => self.click(&control),
            None => false,
        }
    }

    /// 直接设置语言（等同于不经控件的切换）
    pub fn set_preference(&mut self, preference: LanguagePreference) {
        self.engine.set_preference(&mut self.page, preference);
        self.reload_if_requested();
    }

    /// 推进虚拟时钟并执行期间到期的任务，返回执行的任务数
    pub fn advance(&mut self, ms: u64) -> usize {
        let target = self.event_loop.now_ms().saturating_add(ms);
        let mut ran = 0;

        while let Some(task) = self.event_loop.pop_due(target) {
            self.engine.on_task(&mut self.page, &mut self.event_loop, task);
            ran += 1;
            self.reload_if_requested();
        }

        self.event_loop.advance_clock_to(target);
        ran
    }

    /// 等待防抖窗口结束，让挂起的变更执行完
    pub fn settle(&mut self) -> usize {
        self.advance(self.engine.debounce_ms())
    }

    /// 模拟整页重载：重建文档、重启引擎并在解析完成后发出就绪信号
    pub fn reload(&mut self) {
        self.engine.reset(&mut self.event_loop);
        self.event_loop.clear();
        self.page.reload();
        self.engine.start(&mut self.page, &mut self.event_loop);
        self.engine.on_document_ready(&mut self.page);
    }

    fn reload_if_requested(&mut self) {
        if self.page.reload_requested() {
            debug!("执行挂起的重载");
            self.reload();
        }
    }

    pub fn serialize(&self) -> LangmarkResult<String> {
        self.page.serialize()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::MemoryStorage;

    const PAGE: &str = "<html><body><div class=\"hidden flex-shrink-0 lg:flex\"></div>\
        <p>Solutions</p></body></html>";

    fn runtime(locale: &str) -> Runtime {
        let dictionary: Dictionary = [("Solutions".to_string(), "Çözümler".to_string())]
            .into_iter()
            .collect();
        let page = Page::new(PAGE, Box::new(MemoryStorage::new()))
            .with_locale(Some(locale.to_string()));
        Runtime::with_config(page, &LangmarkConfig::default(), Some(dictionary))
    }

    #[test]
    fn test_scheduled_ready_triggers_first_enforce() {
        let mut runtime = runtime("tr-TR");
        runtime.start();
        runtime.schedule_document_ready(30);

        runtime.advance(20);
        assert_eq!(runtime.stats().enforce_runs, 0);

        runtime.advance(20);
        assert_eq!(runtime.stats().enforce_runs, 1);
        assert!(runtime.serialize().unwrap().contains("Çözümler"));
    }

    #[test]
    fn test_click_outside_control_is_ignored() {
        let mut runtime = runtime("en-US");
        runtime.start();
        runtime.document_ready();

        let body = runtime.page().body().unwrap();
        assert!(!runtime.click(&body));
        assert!(runtime.click_control());
        assert_eq!(runtime.engine().current(), LanguagePreference::Alt);
    }
}
