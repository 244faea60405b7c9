//! HTTP boundary: axum router and request handlers.
//!
//! Handlers do boundary work only: resolve the path user, run the
//! ownership guard with the acting user from the token, validate payload
//! shape, then call into the store and render its typed outcome.

use crate::auth::{self, AuthUser, TokenService};
use crate::db::Database;
use crate::error::{ApiError, ApiResult, FieldErrors};
use crate::guard;
use crate::query::TaskFilter;
use crate::types::{Task, TaskInput, TaskTreeInput, User};
use crate::validate::validate_task;
use axum::extract::{FromRequest, Path, Query, Request, State};
use axum::http::StatusCode;
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post, put};
use axum::{Extension, Json, Router};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// JSON body extractor that renders deserialization failures in the same
/// `{"errors": {...}}` shape as field validation, instead of axum's
/// plain-text 422.
pub struct ApiJson<T>(pub T);

impl<S, T> FromRequest<S> for ApiJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        match Json::<T>::from_request(req, state).await {
            Ok(Json(value)) => Ok(Self(value)),
            Err(rejection) => {
                let mut errors = FieldErrors::new();
                errors
                    .entry("body".into())
                    .or_default()
                    .push(rejection.body_text());
                Err(ApiError::Validation(errors))
            }
        }
    }
}

/// Shared state for all handlers.
#[derive(Clone)]
pub struct AppState {
    pub db: Database,
    pub tokens: TokenService,
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/user/{user_id}/tasks", get(list_tasks).post(create_tasks))
        .route(
            "/user/{user_id}/tasks/{task_id}",
            put(update_task).delete(delete_task),
        )
        .route(
            "/user/{user_id}/tasks/{task_id}/complete",
            post(complete_task),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_auth,
        ));

    Router::new()
        .route("/users", post(register_user))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::new().allow_origin(Any).allow_methods(Any))
        .with_state(state)
}

#[derive(Debug, Deserialize)]
struct RegisterRequest {
    name: Option<String>,
}

/// `POST /users` — register a user and issue their first token.
async fn register_user(
    State(state): State<AppState>,
    ApiJson(body): ApiJson<RegisterRequest>,
) -> ApiResult<Response> {
    let name = match body.name.as_deref() {
        Some(name) if !name.is_empty() => name,
        _ => {
            let mut errors = FieldErrors::new();
            errors
                .entry("name".into())
                .or_default()
                .push("name is required".into());
            return Err(ApiError::Validation(errors));
        }
    };

    let user = state.db.create_user(name)?;
    let token = state.tokens.issue(&user.id)?;

    tracing::info!(user_id = %user.id, "user registered");

    Ok((
        StatusCode::CREATED,
        Json(json!({ "user": user, "token": token })),
    )
        .into_response())
}

/// `GET /user/{user_id}/tasks` — list the user's tasks with filters.
async fn list_tasks(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    Query(filter): Query<TaskFilter>,
) -> ApiResult<Json<Vec<Task>>> {
    let user = resolve_user(&state, &user_id)?;
    let tasks = state.db.list_tasks(&user.id, &filter)?;
    Ok(Json(tasks))
}

/// `POST /user/{user_id}/tasks` — create a task tree for the user.
async fn create_tasks(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
    ApiJson(input): ApiJson<TaskTreeInput>,
) -> ApiResult<Response> {
    let user = resolve_user(&state, &user_id)?;
    let result = state.db.create_tree(&user.id, &input)?;

    if !result.skipped.is_empty() {
        tracing::warn!(
            root_id = %result.task.id,
            skipped = result.skipped.len(),
            "some children failed validation and were skipped"
        );
    }

    Ok((StatusCode::CREATED, Json(result)).into_response())
}

/// `PUT /user/{user_id}/tasks/{task_id}` — full-field update.
async fn update_task(
    State(state): State<AppState>,
    Extension(AuthUser(acting_user)): Extension<AuthUser>,
    Path((user_id, task_id)): Path<(String, String)>,
    ApiJson(input): ApiJson<TaskInput>,
) -> ApiResult<Json<Task>> {
    resolve_user(&state, &user_id)?;
    let task = resolve_task(&state, &task_id)?;

    if !guard::can_access(&acting_user, &task) {
        return Err(ApiError::PermissionDenied);
    }

    let fields = validate_task(&input).map_err(ApiError::Validation)?;
    let updated = state.db.update_task(&task.id, &fields)?;
    Ok(Json(updated))
}

/// `DELETE /user/{user_id}/tasks/{task_id}`.
///
/// The done-status conflict is checked before ownership, matching the
/// endpoint's long-standing observable order.
async fn delete_task(
    State(state): State<AppState>,
    Extension(AuthUser(acting_user)): Extension<AuthUser>,
    Path((user_id, task_id)): Path<(String, String)>,
) -> ApiResult<Json<serde_json::Value>> {
    resolve_user(&state, &user_id)?;
    let task = resolve_task(&state, &task_id)?;

    if task.status == crate::types::TaskStatus::Done {
        return Err(ApiError::Conflict(
            "Task is done! We can't delete it!".to_string(),
        ));
    }

    if !guard::can_access(&acting_user, &task) {
        return Err(ApiError::PermissionDenied);
    }

    state.db.delete_task(&task.id)?;
    Ok(Json(json!({ "message": "deleted" })))
}

#[derive(Debug, Deserialize)]
struct CompleteRequest {
    is_done: Option<bool>,
}

/// `POST /user/{user_id}/tasks/{task_id}/complete`.
///
/// `is_done: true` marks the task done; `false` is an explicit no-op and
/// answers with an empty object.
async fn complete_task(
    State(state): State<AppState>,
    Extension(AuthUser(acting_user)): Extension<AuthUser>,
    Path((user_id, task_id)): Path<(String, String)>,
    ApiJson(body): ApiJson<CompleteRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    resolve_user(&state, &user_id)?;
    let task = resolve_task(&state, &task_id)?;

    if !guard::can_access(&acting_user, &task) {
        return Err(ApiError::PermissionDenied);
    }

    let Some(is_done) = body.is_done else {
        let mut errors = FieldErrors::new();
        errors
            .entry("is_done".into())
            .or_default()
            .push("is_done is required".into());
        return Err(ApiError::Validation(errors));
    };

    match state.db.complete_task(&task.id, is_done)? {
        Some(_) => Ok(Json(json!({ "message": "Task marked as done." }))),
        None => Ok(Json(json!({}))),
    }
}

fn resolve_user(state: &AppState, user_id: &str) -> ApiResult<User> {
    state
        .db
        .get_user(user_id)?
        .ok_or_else(ApiError::user_not_found)
}

fn resolve_task(state: &AppState, task_id: &str) -> ApiResult<Task> {
    state
        .db
        .get_task(task_id)?
        .ok_or_else(ApiError::task_not_found)
}
