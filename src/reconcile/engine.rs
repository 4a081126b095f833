//! 调和引擎
//!
//! 状态机只有两个状态：`Idle`（尚未启动）与 `Monitoring`（持续监视）。进入
//! `Monitoring` 后，变更通知（经防抖合并）和定时巡检两路触发共用同一个幂等的
//! `enforce` 步骤。`enforce` 内部顺序固定：先确认控件存在并刷新外观，再检查
//! 翻译是否被还原，最后隐藏区块。

use markup5ever_rcdom::Handle;
use tracing::{debug, info};

use crate::config::LangmarkConfig;
use crate::control::ControlInjector;
use crate::error::helpers::log_error;
use crate::hider::SectionHider;
use crate::page::{MutationRecord, Page};
use crate::state::{LanguagePreference, LanguageStore};
use crate::translation::{Dictionary, TranslationOutcome, Translator};

use super::event_loop::{Debouncer, DueTask, EventLoop, TaskKind};
use super::polling::SafetyNet;
use super::sentinel::SentinelCheck;

/// 引擎状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineState {
    Idle,
    Monitoring,
}

/// 触发 `enforce` 的来源
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EnforceTrigger {
    Startup,
    DocumentReady,
    Mutation,
    Timer,
}

/// 运行统计
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EngineStats {
    pub enforce_runs: usize,
    pub mutation_enforces: usize,
    pub timer_enforces: usize,
    pub translation_passes: usize,
    pub sections_hidden: usize,
}

/// 调和引擎
pub struct ReconcileEngine {
    state: EngineState,
    current: LanguagePreference,
    store: LanguageStore,
    translator: Translator,
    injector: ControlInjector,
    hider: SectionHider,
    sentinel: SentinelCheck,
    debouncer: Debouncer,
    safety_net: SafetyNet,
    debounce_ms: u64,
    stats: EngineStats,
}

impl ReconcileEngine {
    pub fn new(config: &LangmarkConfig, dictionary: Option<Dictionary>) -> Self {
        let sentinel = SentinelCheck::new(
            config.sentinels.as_slice(),
            dictionary.as_ref(),
            config.sentinel_scan_cap,
        );
        let translator = Translator::new(dictionary, config);
        let hider = SectionHider::new(
            config.hidden_section_phrases.iter().cloned(),
            translator.dictionary(),
            translator.opaque_tags().clone(),
        );

        Self {
            state: EngineState::Idle,
            current: LanguagePreference::Default,
            store: LanguageStore::new(config),
            translator,
            injector: ControlInjector::new(config),
            hider,
            sentinel,
            debouncer: Debouncer::new(config.debounce_ms),
            safety_net: SafetyNet::new(
                config.fast_interval_ms,
                config.fast_duration_ms,
                config.slow_interval_ms,
            ),
            debounce_ms: config.debounce_ms,
            stats: EngineStats::default(),
        }
    }

    pub fn state(&self) -> EngineState {
        self.state
    }

    /// 缓存的当前语言
    pub fn current(&self) -> LanguagePreference {
        self.current
    }

    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    pub fn translator(&self) -> &Translator {
        &self.translator
    }

    pub fn injector(&self) -> &ControlInjector {
        &self.injector
    }

    pub fn store(&self) -> &LanguageStore {
        &self.store
    }

    pub fn debounce_ms(&self) -> u64 {
        self.debounce_ms
    }

    /// 读取语言偏好并进入监视状态
    ///
    /// 文档尚未就绪时首次执行推迟到 [`Self::on_document_ready`]。
    pub fn start(&mut self, page: &mut Page, event_loop: &mut EventLoop) {
        if self.state == EngineState::Monitoring {
            return;
        }

        self.current = self.store.get_preference(page.storage(), page.locale());
        self.state = EngineState::Monitoring;
        self.safety_net.start(event_loop);
        info!("调和引擎启动，当前语言 {:?}", self.current);

        if page.is_ready() {
            self.enforce(page, EnforceTrigger::Startup);
        } else {
            debug!("文档尚未就绪，推迟首次执行");
        }
    }

    /// 文档就绪信号
    pub fn on_document_ready(&mut self, page: &mut Page) {
        let was_ready = page.is_ready();
        page.mark_ready();

        if !was_ready && self.state == EngineState::Monitoring {
            self.enforce(page, EnforceTrigger::DocumentReady);
        }
    }

    /// 变更通知：一阵变更只调度一次延迟执行
    pub fn on_mutations(&mut self, event_loop: &mut EventLoop, records: &[MutationRecord]) {
        if self.state != EngineState::Monitoring || records.is_empty() {
            return;
        }
        let id = self.debouncer.trigger(event_loop);
        debug!("收到 {} 条变更，调度执行 {}", records.len(), id);
    }

    /// 派发到期任务
    pub fn on_task(&mut self, page: &mut Page, event_loop: &mut EventLoop, task: DueTask) {
        match task.kind {
            TaskKind::DocumentReady => self.on_document_ready(page),
            TaskKind::DebouncedEnforce => {
                if self.debouncer.fire(task.id) {
                    self.stats.mutation_enforces += 1;
                    self.enforce(page, EnforceTrigger::Mutation);
                }
            }
            TaskKind::SafetyTick => {
                if self.safety_net.on_tick(event_loop, task.id) {
                    self.stats.timer_enforces += 1;
                    self.enforce(page, EnforceTrigger::Timer);
                }
            }
        }
    }

    /// 幂等的调和步骤，返回本次是否执行了翻译
    pub fn enforce(&mut self, page: &mut Page, trigger: EnforceTrigger) -> bool {
        if !page.is_ready() {
            return false;
        }
        self.stats.enforce_runs += 1;

        let document = page.document().clone();
        // 找不到锚点不是错误，下一次执行时重试
        self.injector.ensure_control(&document, self.current);

        let translated =
            self.current == LanguagePreference::Alt && self.needs_translation(&document);
        if translated {
            debug!("{:?} 触发重新翻译", trigger);
            self.translate(page, &document);
        }

        self.stats.sections_hidden += self.hider.hide_sections(&document);
        translated
    }

    fn needs_translation(&self, document: &Handle) -> bool {
        !self.translator.is_active(document)
            || self
                .sentinel
                .detects_reversion(document, self.translator.opaque_tags())
    }

    fn translate(&mut self, page: &mut Page, document: &Handle) {
        match self.translator.apply_translation(document, self.current) {
            TranslationOutcome::Applied(stats) => {
                self.stats.translation_passes += 1;
                debug!("翻译了 {} 处", stats.total());
            }
            TranslationOutcome::ReloadRequired => page.request_reload(),
            TranslationOutcome::Unchanged => {}
        }
    }

    /// 设置语言：持久化失败只记录日志，页面照常更新
    pub fn set_preference(&mut self, page: &mut Page, preference: LanguagePreference) {
        if let Err(e) = self.store.set_preference(page.storage(), preference) {
            log_error(&e);
        }

        self.current = preference;
        info!("语言切换为 {:?}", preference);

        let document = page.document().clone();
        self.translate(page, &document);
        self.injector.update_visual(&document, preference);
    }

    /// 切换控件的点击处理：读取存储中的语言并切换到另一种
    pub fn toggle(&mut self, page: &mut Page) -> LanguagePreference {
        let next = self
            .store
            .get_preference(page.storage(), page.locale())
            .opposite();
        self.set_preference(page, next);
        next
    }

    /// 回到 `Idle`，取消所有已调度的任务
    pub fn reset(&mut self, event_loop: &mut EventLoop) {
        self.safety_net.stop(event_loop);
        self.debouncer.cancel(event_loop);
        self.state = EngineState::Idle;
    }
}
