use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument};

use super::{
    dto::{
        CreateTaskRequest, ListQuery, MessageResponse, StatsResponse, StatusCounts,
        TaskListResponse, TaskResponse, UpdateTaskRequest,
    },
    repo::{Task, TaskFilter, TaskStatus},
};
use crate::{auth::extractors::AuthUser, error::ApiError, state::AppState, validation};

pub fn task_routes() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/stats", get(task_stats))
        .route(
            "/tasks/:id",
            get(get_task).put(update_task).delete(delete_task),
        )
}

#[instrument(skip(state))]
pub async fn list_tasks(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Query(query): Query<ListQuery>,
) -> Result<Json<TaskListResponse>, ApiError> {
    let filter = TaskFilter {
        status: query
            .status
            .as_deref()
            .map(validation::validate_status)
            .transpose()?,
        q: query
            .q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty())
            .map(String::from),
    };

    let page = query.page.max(1);
    let limit = query.limit.clamp(1, 100);
    let offset = (page - 1) * limit;

    let data = Task::list_by_user(&state.db, user_id, &filter, limit, offset).await?;
    let total = Task::count_by_user(&state.db, user_id, &filter).await?;

    Ok(Json(TaskListResponse {
        success: true,
        data,
        total,
        page,
        limit,
    }))
}

#[instrument(skip(state))]
pub async fn get_task(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<TaskResponse>, ApiError> {
    let task = Task::find_by_id_and_user(&state.db, id, user_id)
        .await?
        .ok_or(ApiError::NotFound)?;

    Ok(Json(TaskResponse {
        success: true,
        message: None,
        data: task,
    }))
}

#[instrument(skip(state, payload))]
pub async fn create_task(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Json(payload): Json<CreateTaskRequest>,
) -> Result<(StatusCode, Json<TaskResponse>), ApiError> {
    let new_task = validation::validate_new_task(&payload)?;
    let task = Task::insert(&state.db, user_id, &new_task).await?;

    info!(task_id = task.id, user_id, "task created");
    Ok((
        StatusCode::CREATED,
        Json(TaskResponse {
            success: true,
            message: Some("Task created successfully".into()),
            data: task,
        }),
    ))
}

#[instrument(skip(state, payload))]
pub async fn update_task(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateTaskRequest>,
) -> Result<Json<TaskResponse>, ApiError> {
    let changes = validation::validate_task_update(&payload)?;
    let task = Task::update(&state.db, id, user_id, &changes)
        .await?
        .ok_or(ApiError::NotFound)?;

    info!(task_id = task.id, user_id, "task updated");
    Ok(Json(TaskResponse {
        success: true,
        message: Some("Task updated successfully".into()),
        data: task,
    }))
}

#[instrument(skip(state))]
pub async fn delete_task(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
    Path(id): Path<i64>,
) -> Result<Json<MessageResponse>, ApiError> {
    if !Task::delete(&state.db, id, user_id).await? {
        return Err(ApiError::NotFound);
    }

    info!(task_id = id, user_id, "task deleted");
    Ok(Json(MessageResponse {
        success: true,
        message: "Task deleted successfully".into(),
    }))
}

#[instrument(skip(state))]
pub async fn task_stats(
    State(state): State<AppState>,
    AuthUser(user_id): AuthUser,
) -> Result<Json<StatsResponse>, ApiError> {
    let counts = Task::status_counts(&state.db, user_id).await?;

    let mut data = StatusCounts {
        pending: 0,
        completed: 0,
    };
    for (status, count) in counts {
        match status {
            TaskStatus::Pending => data.pending = count,
            TaskStatus::Completed => data.completed = count,
        }
    }

    Ok(Json(StatsResponse {
        success: true,
        data,
    }))
}
