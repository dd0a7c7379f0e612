use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use dsa_problem_studio::logger;
use dsa_problem_studio::models::{ProblemDraft, Syllabus};
use dsa_problem_studio::server::{router, AppState};
use dsa_problem_studio::services::{
    HistoryStore, JobStore, ProblemAuthor, ProblemGenerator, ProblemPublisher, RepoService,
    TrackingSheet,
};
use dsa_problem_studio::workflow::{Event, HttpBackend, ProblemLookup, Session, StatusKind};
use serde_json::Value;
use tower::ServiceExt;

/// 每次返回不同标题的作者
#[derive(Default)]
struct CountingAuthor {
    calls: AtomicUsize,
    broken: bool,
}

impl ProblemAuthor for CountingAuthor {
    async fn draft(&self, belt: &str, topic: &str) -> anyhow::Result<ProblemDraft> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.broken {
            anyhow::bail!("model unavailable");
        }
        Ok(ProblemDraft {
            title: format!("{} Drill {}", topic, n),
            topic: topic.to_string(),
            readme: format!("### Description\nA {} exercise.", belt),
            solution: "# Solutions\n### Approach".to_string(),
        })
    }
}

fn state(root: &Path, repo_url: &str, author: CountingAuthor) -> Arc<AppState<CountingAuthor>> {
    let history = Arc::new(HistoryStore::new(root.join("history.json")));
    let repo = RepoService::with_paths(repo_url, "", root.join("repositories"))
        .with_git_user("Studio Test", "studio@example.com");
    Arc::new(AppState {
        syllabus: Syllabus::builtin().expect("内置大纲解析失败"),
        generator: ProblemGenerator::new(author, Arc::clone(&history), 3),
        publisher: Arc::new(ProblemPublisher::new(
            repo,
            history,
            JobStore::new(root.join("jobs.json")),
            TrackingSheet::new(root.join("tracking_sheet.csv")),
        )),
        max_problems_per_request: 5,
    })
}

fn app(root: &Path, author: CountingAuthor) -> Router {
    router(state(root, "/nowhere/problems.git", author))
}

fn form_post(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(body.to_string()))
        .expect("构造请求失败")
}

async fn call(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.expect("请求失败");
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("读取响应失败");
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn git_available() -> bool {
    std::process::Command::new("git")
        .arg("--version")
        .output()
        .map(|o| o.status.success())
        .unwrap_or(false)
}

#[tokio::test]
async fn test_belts_lists_builtin_syllabus() {
    let dir = tempfile::tempdir().unwrap();
    let (status, body) = call(
        app(dir.path(), CountingAuthor::default()),
        Request::get("/belts").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let belts = body.as_array().unwrap();
    assert_eq!(belts.len(), 7);
    assert_eq!(belts[0], "White Belt");
}

#[tokio::test]
async fn test_generate_returns_requested_batch() {
    let dir = tempfile::tempdir().unwrap();
    let (status, body) = call(
        app(dir.path(), CountingAuthor::default()),
        form_post("/generate", "belt=White+Belt&num_problems=2"),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let problems = body.as_array().unwrap();
    assert_eq!(problems.len(), 2);
    assert_ne!(problems[0]["title"], problems[1]["title"]);
    assert!(problems[0]["readme"].as_str().unwrap().contains("White Belt"));
}

#[tokio::test]
async fn test_generate_rejects_unknown_belt() {
    let dir = tempfile::tempdir().unwrap();
    let (status, body) = call(
        app(dir.path(), CountingAuthor::default()),
        form_post("/generate", "belt=Rainbow+Belt"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Unknown belt: Rainbow Belt");
}

#[tokio::test]
async fn test_generate_reports_exhaustion() {
    let dir = tempfile::tempdir().unwrap();
    let author = CountingAuthor {
        broken: true,
        ..Default::default()
    };
    let (status, body) = call(app(dir.path(), author), form_post("/generate", "belt=White+Belt")).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        body["message"],
        "Could not generate a unique problem after several attempts. Please try again."
    );
}

#[tokio::test]
async fn test_commit_validates_action_and_schedule() {
    let dir = tempfile::tempdir().unwrap();

    let (status, body) = call(
        app(dir.path(), CountingAuthor::default()),
        form_post("/commit", "belt=White+Belt&title=T&commit_action=schedule"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Error: Schedule time not provided.");

    let (status, body) = call(
        app(dir.path(), CountingAuthor::default()),
        form_post("/commit", "belt=White+Belt&title=T&commit_action=later"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid action.");
}

#[tokio::test]
async fn test_schedule_accepts_legacy_field_names() {
    let dir = tempfile::tempdir().unwrap();
    let (status, body) = call(
        app(dir.path(), CountingAuthor::default()),
        form_post(
            "/commit",
            "belt=White+Belt&problem_title=Later&readme_content=r&solution_content=s\
             &commit_action=schedule&schedule_time=2031-05-01T09%3A30",
        ),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Successfully scheduled 'Later' for 2031-05-01T09:30.");
    let jobs = std::fs::read_to_string(dir.path().join("jobs.json")).unwrap();
    assert!(jobs.contains("Later"));
}

#[tokio::test]
async fn test_problems_for_uncloned_repo_is_empty() {
    let dir = tempfile::tempdir().unwrap();
    let (status, body) = call(
        app(dir.path(), CountingAuthor::default()),
        Request::get("/problems/Green%20Belt").body(Body::empty()).unwrap(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, serde_json::json!([]));
}

#[tokio::test]
async fn test_delete_rejects_path_traversal() {
    let dir = tempfile::tempdir().unwrap();
    let (status, body) = call(
        app(dir.path(), CountingAuthor::default()),
        form_post("/delete", "belt=White+Belt&problem=..%2Fsecrets"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["message"], "Invalid problem folder: ../secrets");
}

/// 用本地裸仓库跑一遍 提交 → 列出 → 删除
#[tokio::test]
async fn test_commit_list_delete_against_local_remote() {
    if !git_available() {
        eprintln!("git 不可用，跳过");
        return;
    }
    logger::init();

    let dir = tempfile::tempdir().unwrap();
    let remote = dir.path().join("remote.git");
    let status = std::process::Command::new("git")
        .args(["init", "--bare", "--quiet"])
        .arg(&remote)
        .status()
        .expect("初始化裸仓库失败");
    assert!(status.success());

    let app = router(state(
        dir.path(),
        &remote.display().to_string(),
        CountingAuthor::default(),
    ));

    let (status, body) = call(
        app.clone(),
        form_post(
            "/commit",
            "belt=White+Belt&title=Two+Sum%21&topic=Arrays&readme=r&solution=s&commit_action=now",
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["message"], "Successfully committed 'Two Sum!' as problem #1.");

    let (_, body) = call(
        app.clone(),
        form_post("/commit", "belt=White+Belt&title=Three+Sum&topic=Arrays"),
    )
    .await;
    assert_eq!(body["message"], "Successfully committed 'Three Sum' as problem #2.");

    let (_, body) = call(
        app.clone(),
        Request::get("/problems/White%20Belt").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(body, serde_json::json!(["1-two-sum", "2-three-sum"]));

    let (status, body) = call(
        app.clone(),
        form_post("/delete", "belt=White+Belt&problem=1-two-sum"),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{}", body);
    assert_eq!(body["message"], "Successfully deleted '1-two-sum'.");

    let log = std::process::Command::new("git")
        .args(["log", "--all", "--format=%s"])
        .current_dir(&remote)
        .output()
        .expect("读取提交历史失败");
    let subjects = String::from_utf8_lossy(&log.stdout);
    assert!(subjects.contains("chore(White Belt): Delete problem '1-two-sum'"));
    assert!(subjects.contains("feat(White Belt): Add problem #1 - 'Two Sum!'"));

    let sheet = std::fs::read_to_string(dir.path().join("tracking_sheet.csv")).unwrap();
    assert!(sheet.starts_with("timestamp,action,belt,problem,status"));
    assert_eq!(sheet.lines().count(), 4);
}

/// 终端工作台通过真实 HTTP 连接服务（multipart 表单）
#[tokio::test]
async fn test_session_drives_the_server_over_http() {
    let dir = tempfile::tempdir().unwrap();
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let app = app(dir.path(), CountingAuthor::default());
    let server = tokio::spawn(async move { axum::serve(listener, app).await });

    let backend = HttpBackend::new(&format!("http://{}", addr)).unwrap();
    assert_eq!(backend.belts().await.unwrap().len(), 7);

    let mut session = Session::new(backend, |_: &str| true);
    session.dispatch(Event::GenerateSubmitted(vec![
        ("belt".to_string(), "Yellow Belt".to_string()),
        ("num_problems".to_string(), "3".to_string()),
    ]));
    session.settle().await;

    let state = session.state();
    assert_eq!(state.generation.selector_options().len(), 3);
    assert_eq!(state.review.belt, "Yellow Belt");
    assert!(state.review.title.contains("Drill"));

    session.dispatch(Event::DeleteBeltChanged("Yellow Belt".into()));
    session.settle().await;
    assert_eq!(session.state().delete.lookup, ProblemLookup::Empty);

    session.dispatch(Event::GenerateSubmitted(vec![(
        "belt".to_string(),
        "Plaid Belt".to_string(),
    )]));
    session.settle().await;
    let last = session.state().status.messages().last().unwrap();
    assert_eq!(last.kind, StatusKind::Error);
    assert_eq!(last.text, "Error generating problems...");

    server.abort();
}
