//! HTTP 服务
//!
//! | 路由 | 方法 | 说明 |
//! |---|---|---|
//! | `/` | GET | 首页 |
//! | `/health` | GET | 健康检查 |
//! | `/belts` | GET | 段位列表 |
//! | `/generate` | POST | 生成一批题目 |
//! | `/commit` | POST | 立即提交或定时提交 |
//! | `/problems/:belt` | GET | 列出段位下已有题目 |
//! | `/delete` | POST | 删除题目 |

pub mod form;
pub mod handlers;

use std::sync::Arc;

use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::models::Syllabus;
use crate::services::{ProblemAuthor, ProblemGenerator, ProblemPublisher};

pub use form::FormFields;

/// 路由共享状态
pub struct AppState<A> {
    pub syllabus: Syllabus,
    pub generator: ProblemGenerator<A>,
    pub publisher: Arc<ProblemPublisher>,
    pub max_problems_per_request: usize,
}

/// 构建路由
pub fn router<A: ProblemAuthor + 'static>(state: Arc<AppState<A>>) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))
        .route("/belts", get(handlers::belts::<A>))
        .route("/generate", post(handlers::generate::<A>))
        .route("/commit", post(handlers::commit::<A>))
        .route("/problems/:belt", get(handlers::list_problems::<A>))
        .route("/delete", post(handlers::delete::<A>))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// 在指定地址上启动服务，直到出错或进程退出
pub async fn serve<A: ProblemAuthor + 'static>(
    bind_addr: &str,
    state: Arc<AppState<A>>,
) -> anyhow::Result<()> {
    let listener = TcpListener::bind(bind_addr).await?;
    info!("🌐 HTTP 服务监听 http://{}", listener.local_addr()?);
    axum::serve(listener, router(state)).await?;
    Ok(())
}
