//! 工作台会话 - 执行控制器产生的副作用
//!
//! 网络请求和提示消息定时器在 tokio 任务中执行，完成后通过 channel
//! 把事件送回会话；删除确认在当前线程同步询问用户。

use std::collections::VecDeque;
use std::future::Future;
use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;

use super::controller::Controller;
use super::event::{confirm_prompt, ApiReply, Effect, Event, FormData, GenerateBody};
use super::state::UiState;

/// 后端接口
pub trait Backend: Send + Sync + 'static {
    /// POST /generate
    fn generate(&self, form: FormData) -> impl Future<Output = ApiReply<GenerateBody>> + Send;
    /// POST /commit
    fn commit(&self, form: FormData) -> impl Future<Output = ApiReply<String>> + Send;
    /// GET /problems/{belt}
    fn problems(&self, belt: String) -> impl Future<Output = ApiReply<Vec<String>>> + Send;
    /// POST /delete
    fn delete(&self, belt: String, problem: String) -> impl Future<Output = ApiReply<String>> + Send;
}

/// 删除前的确认
pub trait Confirm {
    fn confirm(&mut self, prompt: &str) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&str) -> bool,
{
    fn confirm(&mut self, prompt: &str) -> bool {
        self(prompt)
    }
}

pub struct Session<B, C> {
    controller: Controller,
    backend: Arc<B>,
    confirm: C,
    tx: mpsc::UnboundedSender<Event>,
    rx: mpsc::UnboundedReceiver<Event>,
}

impl<B: Backend, C: Confirm> Session<B, C> {
    pub fn new(backend: B, confirm: C) -> Self {
        Self::with_controller(Controller::new(), backend, confirm)
    }

    pub fn with_controller(controller: Controller, backend: B, confirm: C) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            controller,
            backend: Arc::new(backend),
            confirm,
            tx,
            rx,
        }
    }

    pub fn state(&self) -> &UiState {
        self.controller.state()
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// 处理一个事件以及它同步引出的后续事件
    ///
    /// 需要 tokio 运行时（网络请求会被 spawn 出去）。
    pub fn dispatch(&mut self, event: Event) {
        let mut queue = VecDeque::from([event]);
        while let Some(event) = queue.pop_front() {
            for effect in self.controller.handle(event) {
                if let Some(follow_up) = self.execute(effect) {
                    queue.push_back(follow_up);
                }
            }
        }
    }

    /// 等待所有在途请求返回
    pub async fn settle(&mut self) {
        while self.controller.has_pending_requests() {
            match self.rx.recv().await {
                Some(event) => self.dispatch(event),
                None => break,
            }
        }
    }

    /// 处理已经到达的后台事件（如到期的提示消息），不等待
    pub fn drain(&mut self) {
        while let Ok(event) = self.rx.try_recv() {
            self.dispatch(event);
        }
    }

    fn execute(&mut self, effect: Effect) -> Option<Event> {
        match effect {
            Effect::ConfirmDelete { belt, problem } => {
                let confirmed = self.confirm.confirm(&confirm_prompt(&belt, &problem));
                Some(Event::DeleteConfirmed(confirmed))
            }
            Effect::Generate { request, form } => {
                self.spawn(move |backend| async move {
                    let reply = backend.generate(form).await;
                    Event::GenerateFinished { request, reply }
                });
                None
            }
            Effect::Commit { request, form } => {
                self.spawn(move |backend| async move {
                    let reply = backend.commit(form).await;
                    Event::CommitFinished { request, reply }
                });
                None
            }
            Effect::FetchProblems { request, belt } => {
                self.spawn(move |backend| async move {
                    let reply = backend.problems(belt).await;
                    Event::ProblemsLoaded { request, reply }
                });
                None
            }
            Effect::Delete {
                request,
                belt,
                problem,
            } => {
                self.spawn(move |backend| async move {
                    let reply = backend.delete(belt, problem).await;
                    Event::DeleteFinished { request, reply }
                });
                None
            }
            Effect::ExpireStatus { id, after } => {
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    tokio::time::sleep(after).await;
                    let _ = tx.send(Event::StatusExpired(id));
                });
                None
            }
        }
    }

    fn spawn<F, Fut>(&self, task: F)
    where
        F: FnOnce(Arc<B>) -> Fut,
        Fut: Future<Output = Event> + Send + 'static,
    {
        let tx = self.tx.clone();
        let future = task(Arc::clone(&self.backend));
        tokio::spawn(async move {
            let event = future.await;
            if tx.send(event).is_err() {
                debug!("会话已结束，丢弃后台事件");
            }
        });
    }
}
