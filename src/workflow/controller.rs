//! 工作台控制器
//!
//! 每个 [`Event`] 都是一次状态转换：`(当前状态, 事件) -> (新状态, 副作用列表)`。
//! 控制器本身不做 IO，网络请求、确认框和定时器由调用方按 [`Effect`] 执行，
//! 结果再以事件的形式送回。
//!
//! 每个流程同一时刻最多只有一个请求在途：
//! - 出题、提交、删除在途时再次提交会被拒绝
//! - 题目列表查询以最新一次为准，旧查询的结果被丢弃
//! - 请求编号不匹配的响应一律丢弃
//! - 提交成功时若已开始新一轮出题，新批次保持不变

use std::time::Duration;

use tracing::{debug, info, warn};

use super::event::{ApiReply, Effect, Event, FormData, GenerateBody};
use super::state::{Panel, ProblemLookup, RequestId, StatusKind, UiState};

/// 提示消息默认显示时长
pub const DEFAULT_STATUS_DURATION: Duration = Duration::from_millis(4000);

const GENERATE_FAILED: &str = "Error generating problems...";
const GENERATE_EMPTY: &str = "AI generated no problems.";
const COMMIT_FAILED: &str = "Error committing problem.";
const DELETE_FAILED: &str = "Error deleting problem.";
const LOOKUP_FAILED: &str = "Error loading problems.";

#[derive(Debug, Clone)]
pub struct Controller {
    state: UiState,
    next_request: RequestId,
    status_duration: Duration,
}

impl Default for Controller {
    fn default() -> Self {
        Self::new()
    }
}

impl Controller {
    pub fn new() -> Self {
        Self::with_status_duration(DEFAULT_STATUS_DURATION)
    }

    pub fn with_status_duration(status_duration: Duration) -> Self {
        Self {
            state: UiState::default(),
            next_request: 0,
            status_duration,
        }
    }

    pub fn state(&self) -> &UiState {
        &self.state
    }

    /// 是否还有未返回的请求
    pub fn has_pending_requests(&self) -> bool {
        self.state.generation.pending.is_some()
            || self.state.commit.pending.is_some()
            || self.state.delete.pending_lookup.is_some()
            || self.state.delete.pending_delete.is_some()
    }

    /// 处理一个事件，返回需要执行的副作用
    pub fn handle(&mut self, event: Event) -> Vec<Effect> {
        let mut effects = Vec::new();
        match event {
            Event::TabActivated(target) => self.activate_tab(&target),
            Event::GenerateSubmitted(form) => self.submit_generate(form, &mut effects),
            Event::GenerateFinished { request, reply } => {
                self.finish_generate(request, reply, &mut effects)
            }
            Event::ProblemSelected(index) => self.select_problem(index),
            Event::ReviewEdited { field, value } => self.state.review.set(field, value),
            Event::CommitSubmitted => self.submit_commit(&mut effects),
            Event::CommitFinished { request, reply } => {
                self.finish_commit(request, reply, &mut effects)
            }
            Event::DeleteBeltChanged(belt) => self.change_delete_belt(belt, &mut effects),
            Event::ProblemsLoaded { request, reply } => {
                self.finish_lookup(request, reply, &mut effects)
            }
            Event::DeleteProblemChosen(problem) => self.choose_problem(problem),
            Event::DeleteSubmitted => self.submit_delete(&mut effects),
            Event::DeleteConfirmed(confirmed) => self.confirm_delete(confirmed, &mut effects),
            Event::DeleteFinished { request, reply } => {
                self.finish_delete(request, reply, &mut effects)
            }
            Event::StatusExpired(id) => self.state.status.expire(id),
        }
        effects
    }

    fn next_request_id(&mut self) -> RequestId {
        self.next_request += 1;
        self.next_request
    }

    fn display_message(&mut self, text: impl Into<String>, kind: StatusKind, effects: &mut Vec<Effect>) {
        let id = self.state.status.push(text, kind);
        effects.push(Effect::ExpireStatus {
            id,
            after: self.status_duration,
        });
    }

    fn activate_tab(&mut self, target: &str) {
        match Panel::from_target(target) {
            Some(panel) => {
                debug!("切换到面板: {}", panel.target());
                self.state.tabs.activate(panel);
                self.state.status.clear();
            }
            None => warn!("⚠️ 未知的面板: {}", target),
        }
    }

    // ========== 出题 ==========

    fn submit_generate(&mut self, form: FormData, effects: &mut Vec<Effect>) {
        if self.state.generation.pending.is_some() {
            warn!("⚠️ 出题请求仍在进行中，忽略重复提交");
            return;
        }

        let belt = form
            .iter()
            .find(|(key, _)| key == "belt")
            .map(|(_, value)| value.clone())
            .unwrap_or_default();
        let request = self.next_request_id();

        let generation = &mut self.state.generation;
        generation.loading = true;
        generation.busy = true;
        generation.review_visible = false;
        generation.selector_visible = false;
        generation.pending = Some(request);
        generation.pending_belt = belt;
        generation.round = request;
        self.state.status.clear();

        info!("🚀 提交出题请求 #{}", request);
        effects.push(Effect::Generate { request, form });
    }

    fn finish_generate(
        &mut self,
        request: RequestId,
        reply: ApiReply<GenerateBody>,
        effects: &mut Vec<Effect>,
    ) {
        if self.state.generation.pending != Some(request) {
            debug!("丢弃过期的出题响应 #{}", request);
            return;
        }

        let generation = &mut self.state.generation;
        generation.pending = None;
        generation.loading = false;
        generation.busy = false;
        let belt = std::mem::take(&mut generation.pending_belt);

        match reply {
            ApiReply::Success(GenerateBody::Problems(problems)) if !problems.is_empty() => {
                info!("✓ 收到 {} 道题", problems.len());
                generation.batch = problems;
                generation.selected = Some(0);
                generation.selector_visible = true;
                generation.review_visible = true;
                self.state.review.belt = belt;
                self.populate_verification_form(0);
            }
            ApiReply::Success(GenerateBody::Problems(_)) => {
                self.display_message(GENERATE_EMPTY, StatusKind::Error, effects);
            }
            ApiReply::Success(GenerateBody::Notice(message)) => {
                let text = message.unwrap_or_else(|| GENERATE_EMPTY.to_string());
                self.display_message(text, StatusKind::Error, effects);
            }
            ApiReply::Failure { .. } => {
                self.display_message(GENERATE_FAILED, StatusKind::Error, effects);
            }
        }
    }

    fn select_problem(&mut self, index: usize) {
        if index < self.state.generation.batch.len() {
            self.state.generation.selected = Some(index);
        }
        self.populate_verification_form(index);
    }

    /// 用批次中第 `index` 道题填充审核表单；索引无效时什么也不做
    pub fn populate_verification_form(&mut self, index: usize) {
        if let Some(draft) = self.state.generation.batch.get(index) {
            self.state.review.fill_from(draft);
        }
    }

    // ========== 提交 ==========

    fn submit_commit(&mut self, effects: &mut Vec<Effect>) {
        if self.state.commit.pending.is_some() {
            warn!("⚠️ 提交请求仍在进行中，忽略重复提交");
            return;
        }

        let request = self.next_request_id();
        self.state.commit.busy = true;
        self.state.commit.pending = Some(request);
        self.state.commit.round = self.state.generation.round;

        info!("🚀 提交题目 '{}' #{}", self.state.review.title, request);
        effects.push(Effect::Commit {
            request,
            form: self.state.review.to_fields(),
        });
    }

    fn finish_commit(&mut self, request: RequestId, reply: ApiReply<String>, effects: &mut Vec<Effect>) {
        if self.state.commit.pending != Some(request) {
            debug!("丢弃过期的提交响应 #{}", request);
            return;
        }
        self.state.commit.pending = None;
        self.state.commit.busy = false;

        match reply {
            ApiReply::Success(message) => {
                self.display_message(message, StatusKind::Success, effects);
                // 提交期间又出了新题：新批次保持原样
                if self.state.commit.round != self.state.generation.round {
                    debug!("提交完成时已有新的出题轮次，保留当前批次");
                    return;
                }
                let generation = &mut self.state.generation;
                generation.review_visible = false;
                generation.selector_visible = false;
                generation.batch.clear();
                generation.selected = None;
                self.state.review.reset();
            }
            ApiReply::Failure { message } => {
                let text = message.unwrap_or_else(|| COMMIT_FAILED.to_string());
                self.display_message(text, StatusKind::Error, effects);
            }
        }
    }

    // ========== 删除 ==========

    fn change_delete_belt(&mut self, belt: String, effects: &mut Vec<Effect>) {
        let delete = &mut self.state.delete;
        delete.belt = belt;
        delete.selected.clear();

        if delete.belt.trim().is_empty() {
            delete.lookup = ProblemLookup::Idle;
            delete.pending_lookup = None;
            return;
        }
        self.fetch_problems_for_belt(effects);
    }

    /// 重新查询当前段位的题目列表
    fn fetch_problems_for_belt(&mut self, effects: &mut Vec<Effect>) {
        let request = self.next_request_id();
        let delete = &mut self.state.delete;
        delete.lookup = ProblemLookup::Loading;
        delete.selected.clear();
        delete.pending_lookup = Some(request);

        debug!("查询段位题目: {} #{}", delete.belt, request);
        effects.push(Effect::FetchProblems {
            request,
            belt: delete.belt.clone(),
        });
    }

    fn finish_lookup(
        &mut self,
        request: RequestId,
        reply: ApiReply<Vec<String>>,
        effects: &mut Vec<Effect>,
    ) {
        let delete = &mut self.state.delete;
        if delete.pending_lookup != Some(request) {
            debug!("丢弃过期的题目列表 #{}", request);
            return;
        }
        delete.pending_lookup = None;

        match reply {
            ApiReply::Success(names) if names.is_empty() => delete.lookup = ProblemLookup::Empty,
            ApiReply::Success(names) => delete.lookup = ProblemLookup::Loaded(names),
            ApiReply::Failure { message } => {
                delete.lookup = ProblemLookup::Failed;
                let text = message.unwrap_or_else(|| LOOKUP_FAILED.to_string());
                self.display_message(text, StatusKind::Error, effects);
            }
        }
    }

    fn choose_problem(&mut self, problem: String) {
        let delete = &mut self.state.delete;
        let known = match &delete.lookup {
            ProblemLookup::Loaded(names) => names.contains(&problem),
            _ => false,
        };
        if problem.is_empty() || known {
            delete.selected = problem;
        }
    }

    fn submit_delete(&mut self, effects: &mut Vec<Effect>) {
        let delete = &self.state.delete;
        if delete.pending_delete.is_some() || delete.awaiting_confirmation.is_some() {
            warn!("⚠️ 删除请求仍在进行中，忽略重复提交");
            return;
        }
        if !delete.delete_enabled() || delete.selected.is_empty() {
            return;
        }

        let belt = delete.belt.clone();
        let problem = delete.selected.clone();
        self.state.delete.awaiting_confirmation = Some((belt.clone(), problem.clone()));
        effects.push(Effect::ConfirmDelete { belt, problem });
    }

    fn confirm_delete(&mut self, confirmed: bool, effects: &mut Vec<Effect>) {
        let Some((belt, problem)) = self.state.delete.awaiting_confirmation.take() else {
            return;
        };
        if !confirmed {
            debug!("用户取消删除 '{}'", problem);
            return;
        }

        let request = self.next_request_id();
        self.state.delete.busy = true;
        self.state.delete.pending_delete = Some(request);

        info!("🗑️ 删除 {}/{} #{}", belt, problem, request);
        effects.push(Effect::Delete {
            request,
            belt,
            problem,
        });
    }

    fn finish_delete(&mut self, request: RequestId, reply: ApiReply<String>, effects: &mut Vec<Effect>) {
        if self.state.delete.pending_delete != Some(request) {
            debug!("丢弃过期的删除响应 #{}", request);
            return;
        }
        self.state.delete.pending_delete = None;
        self.state.delete.busy = false;

        match reply {
            ApiReply::Success(message) => {
                self.display_message(message, StatusKind::Success, effects);
                if !self.state.delete.belt.trim().is_empty() {
                    self.fetch_problems_for_belt(effects);
                }
            }
            ApiReply::Failure { message } => {
                let text = message.unwrap_or_else(|| DELETE_FAILED.to_string());
                self.display_message(text, StatusKind::Error, effects);
            }
        }
    }
}
