use std::sync::{Arc, Mutex};
use std::time::Duration;

use dsa_problem_studio::models::ProblemDraft;
use dsa_problem_studio::workflow::{
    ApiReply, Backend, Controller, Event, FormData, GenerateBody, Panel, ProblemLookup,
    ReviewField, Session, StatusKind,
};

/// 记录调用并返回预设结果的后端
#[derive(Default)]
struct ScriptedBackend {
    calls: Mutex<Vec<String>>,
    problems: Mutex<Vec<ProblemDraft>>,
    folders: Mutex<Vec<String>>,
    fail_all: bool,
}

impl ScriptedBackend {
    fn with_problems(titles: &[&str]) -> Self {
        let backend = Self::default();
        *backend.problems.lock().unwrap() = titles
            .iter()
            .map(|t| ProblemDraft {
                title: t.to_string(),
                topic: format!("{} topic", t),
                readme: format!("### Description\n{}", t),
                solution: format!("# Solutions for {}", t),
            })
            .collect();
        backend
    }

    fn with_folders(self, folders: &[&str]) -> Self {
        *self.folders.lock().unwrap() = folders.iter().map(|f| f.to_string()).collect();
        self
    }

    fn failing() -> Self {
        Self {
            fail_all: true,
            ..Default::default()
        }
    }

    fn record(&self, call: String) {
        self.calls.lock().unwrap().push(call);
    }
}

/// 共享同一个后端，方便在会话外检查调用记录
#[derive(Clone)]
struct Shared(Arc<ScriptedBackend>);

impl Shared {
    fn calls(&self) -> Vec<String> {
        self.0.calls.lock().unwrap().clone()
    }
}

impl Backend for Shared {
    async fn generate(&self, form: FormData) -> ApiReply<GenerateBody> {
        let belt = form
            .iter()
            .find(|(k, _)| k == "belt")
            .map(|(_, v)| v.clone())
            .unwrap_or_default();
        self.0.record(format!("generate {}", belt));
        if self.0.fail_all {
            return ApiReply::failure_with("Could not generate a unique problem after several attempts. Please try again.");
        }
        ApiReply::Success(GenerateBody::Problems(self.0.problems.lock().unwrap().clone()))
    }

    async fn commit(&self, form: FormData) -> ApiReply<String> {
        let title = form
            .iter()
            .find(|(k, _)| k == "title")
            .map(|(_, v)| v.clone())
            .unwrap_or_default();
        self.0.record(format!("commit {}", title));
        if self.0.fail_all {
            return ApiReply::failure_with("An error occurred: push rejected");
        }
        ApiReply::Success(format!("Successfully committed '{}' as problem #1.", title))
    }

    async fn problems(&self, belt: String) -> ApiReply<Vec<String>> {
        self.0.record(format!("problems {}", belt));
        if self.0.fail_all {
            return ApiReply::failure();
        }
        ApiReply::Success(self.0.folders.lock().unwrap().clone())
    }

    async fn delete(&self, belt: String, problem: String) -> ApiReply<String> {
        self.0.record(format!("delete {}/{}", belt, problem));
        if self.0.fail_all {
            return ApiReply::failure_with("An error occurred during deletion: boom");
        }
        self.0.folders.lock().unwrap().retain(|f| f != &problem);
        ApiReply::Success(format!("Successfully deleted '{}'.", problem))
    }
}

fn session(
    backend: ScriptedBackend,
    answer: bool,
) -> (Session<Shared, impl FnMut(&str) -> bool>, Shared, Arc<Mutex<Vec<String>>>) {
    let shared = Shared(Arc::new(backend));
    let prompts = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&prompts);
    let confirm = move |prompt: &str| {
        seen.lock().unwrap().push(prompt.to_string());
        answer
    };
    (Session::new(shared.clone(), confirm), shared, prompts)
}

fn generate_form(belt: &str) -> FormData {
    vec![
        ("belt".to_string(), belt.to_string()),
        ("num_problems".to_string(), "3".to_string()),
    ]
}

#[tokio::test]
async fn generate_review_commit_round() {
    let backend = ScriptedBackend::with_problems(&["Sum It", "", "Reverse It"]);
    let (mut session, shared, _) = session(backend, true);

    session.dispatch(Event::GenerateSubmitted(generate_form("White Belt")));
    assert!(session.state().generation.busy);
    session.settle().await;

    let state = session.state();
    assert!(!state.generation.busy && !state.generation.loading);
    assert_eq!(
        state.generation.selector_options(),
        vec!["Sum It", "Problem 2", "Reverse It"]
    );
    assert_eq!(state.review.title, "Sum It");
    assert_eq!(state.review.belt, "White Belt");

    session.dispatch(Event::ProblemSelected(2));
    assert_eq!(session.state().review.title, "Reverse It");
    session.dispatch(Event::ReviewEdited {
        field: ReviewField::Title,
        value: "Reverse It Again".into(),
    });

    session.dispatch(Event::CommitSubmitted);
    assert!(session.state().commit.busy);
    session.settle().await;

    let state = session.state();
    assert!(!state.commit.busy);
    assert!(!state.generation.review_visible && !state.generation.selector_visible);
    assert!(state.review.title.is_empty());
    assert_eq!(state.status.messages()[0].kind, StatusKind::Success);
    assert_eq!(
        shared.calls(),
        vec!["generate White Belt", "commit Reverse It Again"]
    );
}

#[tokio::test]
async fn every_failing_endpoint_reports_an_error() {
    let (mut session, shared, _) = session(ScriptedBackend::failing(), true);

    session.dispatch(Event::GenerateSubmitted(generate_form("White Belt")));
    session.settle().await;
    assert!(!session.state().generation.busy);
    assert_eq!(
        session.state().status.messages().last().unwrap().text,
        "Error generating problems..."
    );

    session.dispatch(Event::CommitSubmitted);
    session.settle().await;
    assert!(!session.state().commit.busy);
    assert_eq!(
        session.state().status.messages().last().unwrap().text,
        "An error occurred: push rejected"
    );

    session.dispatch(Event::DeleteBeltChanged("Blue Belt".into()));
    session.settle().await;
    assert_eq!(session.state().delete.lookup, ProblemLookup::Failed);
    assert!(session
        .state()
        .status
        .messages()
        .iter()
        .all(|m| m.kind == StatusKind::Error));
    assert_eq!(shared.calls().len(), 3);
}

#[tokio::test]
async fn declined_delete_sends_nothing() {
    let backend = ScriptedBackend::default().with_folders(&["1-two-sum", "2-three-sum"]);
    let (mut session, shared, prompts) = session(backend, false);

    session.dispatch(Event::TabActivated(Panel::Delete.target().into()));
    session.dispatch(Event::DeleteBeltChanged("Orange Belt".into()));
    session.settle().await;
    assert_eq!(session.state().delete.options().len(), 3);
    assert!(session.state().delete.delete_enabled());

    session.dispatch(Event::DeleteProblemChosen("1-two-sum".into()));
    session.dispatch(Event::DeleteSubmitted);
    session.settle().await;

    assert_eq!(prompts.lock().unwrap().len(), 1);
    assert!(prompts.lock().unwrap()[0].contains("1-two-sum"));
    assert_eq!(shared.calls(), vec!["problems Orange Belt"]);
    assert!(session.state().status.is_empty());
}

#[tokio::test]
async fn confirmed_delete_refreshes_the_belt_once() {
    let backend = ScriptedBackend::default().with_folders(&["p1", "p2"]);
    let (mut session, shared, _) = session(backend, true);

    session.dispatch(Event::DeleteBeltChanged("B".into()));
    session.settle().await;
    session.dispatch(Event::DeleteProblemChosen("p1".into()));
    session.dispatch(Event::DeleteSubmitted);
    assert!(session.state().delete.busy);
    session.settle().await;

    assert_eq!(
        shared.calls(),
        vec!["problems B", "delete B/p1", "problems B"]
    );
    let delete = &session.state().delete;
    assert!(!delete.busy);
    assert_eq!(delete.lookup, ProblemLookup::Loaded(vec!["p2".into()]));
    assert_eq!(
        session.state().status.messages()[0].text,
        "Successfully deleted 'p1'."
    );
}

#[tokio::test]
async fn deleting_the_last_problem_disables_the_selector() {
    let backend = ScriptedBackend::default().with_folders(&["only-one"]);
    let (mut session, _, _) = session(backend, true);

    session.dispatch(Event::DeleteBeltChanged("B".into()));
    session.settle().await;
    session.dispatch(Event::DeleteProblemChosen("only-one".into()));
    session.dispatch(Event::DeleteSubmitted);
    session.settle().await;

    let delete = &session.state().delete;
    assert_eq!(delete.lookup, ProblemLookup::Empty);
    assert!(!delete.selector_enabled() && !delete.delete_enabled());
    assert_eq!(delete.options()[0].label, "No problems found");
}

#[tokio::test]
async fn status_messages_expire_on_their_own() {
    let shared = Shared(Arc::new(ScriptedBackend::failing()));
    let controller = Controller::with_status_duration(Duration::from_millis(20));
    let mut session = Session::with_controller(controller, shared, |_: &str| true);

    session.dispatch(Event::GenerateSubmitted(generate_form("White Belt")));
    session.settle().await;
    assert_eq!(session.state().status.messages().len(), 1);

    tokio::time::sleep(Duration::from_millis(100)).await;
    session.drain();
    assert!(session.state().status.is_empty());
}
