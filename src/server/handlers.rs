//! HTTP 路由处理函数

use std::sync::Arc;

use axum::extract::{Path, State};
use axum::response::{Html, IntoResponse, Response};
use axum::Json;
use tracing::info;

use crate::error::{AppError, BusinessError};
use crate::models::{CommitAction, CommitForm, DeleteForm, GenerateForm, MessageBody, ProblemDraft};
use crate::server::form::FormFields;
use crate::server::AppState;
use crate::services::ProblemAuthor;
use crate::utils::truncate_text;

pub async fn index() -> Html<&'static str> {
    Html(include_str!("../../static/index.html"))
}

pub async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({"ok": true}))
}

pub async fn belts<A: ProblemAuthor>(State(state): State<Arc<AppState<A>>>) -> Json<Vec<String>> {
    Json(state.syllabus.belt_names())
}

/// `POST /generate`
pub async fn generate<A: ProblemAuthor>(
    State(state): State<Arc<AppState<A>>>,
    fields: FormFields,
) -> Result<Json<Vec<ProblemDraft>>, AppError> {
    let form: GenerateForm = fields.parse()?;
    let belt = state
        .syllabus
        .belt(&form.belt)
        .ok_or_else(|| BusinessError::UnknownBelt(form.belt.clone()))?;
    let count = form.count(state.max_problems_per_request);

    info!("📝 收到出题请求: {} x{}", belt.name, count);
    let problems = state.generator.generate_batch(belt, count).await?;
    if problems.is_empty() {
        return Err(BusinessError::GenerationExhausted.into());
    }

    info!("✓ 返回 {} 道题", problems.len());
    Ok(Json(problems))
}

/// `POST /commit`
pub async fn commit<A: ProblemAuthor>(
    State(state): State<Arc<AppState<A>>>,
    fields: FormFields,
) -> Response {
    let form: CommitForm = match fields.parse() {
        Ok(form) => form,
        Err(e) => return e.into_response(),
    };
    info!(
        "📤 收到提交请求: {} | {}",
        form.belt,
        truncate_text(&form.title, 60)
    );

    let result = match CommitAction::parse(form.commit_action.as_deref()) {
        Some(CommitAction::Now) => state.publisher.commit_now(&form.belt, &form.draft()).await,
        Some(CommitAction::Schedule) => {
            state
                .publisher
                .schedule(&form.belt, &form.draft(), form.schedule_time.as_deref())
                .await
        }
        None => Err(BusinessError::InvalidAction.into()),
    };

    match result {
        Ok(message) => Json(MessageBody::new(message)).into_response(),
        Err(e) => failure("An error occurred: ", e),
    }
}

/// `GET /problems/:belt`
pub async fn list_problems<A: ProblemAuthor>(
    State(state): State<Arc<AppState<A>>>,
    Path(belt): Path<String>,
) -> Result<Json<Vec<String>>, AppError> {
    let problems = state.publisher.list(&belt).await?;
    Ok(Json(problems))
}

/// `POST /delete`
pub async fn delete<A: ProblemAuthor>(
    State(state): State<Arc<AppState<A>>>,
    fields: FormFields,
) -> Response {
    let form: DeleteForm = match fields.parse() {
        Ok(form) => form,
        Err(e) => return e.into_response(),
    };
    info!("🗑️ 收到删除请求: {} | {}", form.belt, form.problem);

    match state.publisher.delete(&form.belt, &form.problem).await {
        Ok(message) => Json(MessageBody::new(message)).into_response(),
        Err(e) => failure("An error occurred during deletion: ", e),
    }
}

/// 业务错误原样返回，其它错误加上前缀
fn failure(prefix: &str, error: AppError) -> Response {
    if matches!(error, AppError::Business(_)) {
        return error.into_response();
    }
    let status = error.status_code();
    tracing::error!("❌ {}{}", prefix, error);
    (status, Json(MessageBody::new(format!("{}{}", prefix, error)))).into_response()
}
