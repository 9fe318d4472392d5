use crate::{
    auth::CurrentUser,
    db::{self, DbConnection, DbPool},
    error::AppError,
    models::{NewTask, Task, TaskInput, TaskQuery, TaskRecord},
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use serde_json::json;
use validator::Validate;

/// Loads a task by id, but only if `user_id` owns it.
async fn find_owned_task(
    conn: &mut DbConnection,
    task_id: i64,
    user_id: i64,
) -> Result<TaskRecord, AppError> {
    sqlx::query_as::<_, TaskRecord>(
        "SELECT id, title, description, completed, user_id FROM tasks WHERE id = ? AND user_id = ?",
    )
    .bind(task_id)
    .bind(user_id)
    .fetch_optional(&mut **conn)
    .await?
    .ok_or_else(|| AppError::NotFound("Task not found".into()))
}

/// Lists the authenticated user's tasks.
///
/// ## Query Parameters:
/// - `skip` (optional, default 0): number of tasks to skip.
/// - `limit` (optional, default 100): maximum number of tasks returned.
///
/// Tasks are ordered by id. Neither parameter is bounded.
///
/// ## Responses:
/// - `200 OK`: a JSON array of `Task` objects.
/// - `401 Unauthorized`: missing or invalid token.
#[get("")]
pub async fn list_tasks(
    pool: web::Data<DbPool>,
    user: CurrentUser,
    query_params: web::Query<TaskQuery>,
) -> Result<impl Responder, AppError> {
    let mut conn = db::acquire(&pool).await?;

    let tasks = sqlx::query_as::<_, TaskRecord>(
        "SELECT id, title, description, completed, user_id FROM tasks \
         WHERE user_id = ? ORDER BY id LIMIT ? OFFSET ?",
    )
    .bind(user.id())
    .bind(query_params.limit)
    .bind(query_params.skip)
    .fetch_all(&mut *conn)
    .await?;

    let tasks: Vec<Task> = tasks.into_iter().map(Task::from).collect();
    Ok(HttpResponse::Ok().json(tasks))
}

/// Creates a new task owned by the authenticated user.
///
/// ## Request Body:
/// - `title`: required, at most 50 characters.
/// - `description` (optional): at most 200 characters.
/// - `completed` (optional): defaults to `false`.
///
/// ## Responses:
/// - `200 OK`: the created `Task`, including its assigned `id`.
/// - `401 Unauthorized`: missing or invalid token.
/// - `422 Unprocessable Entity`: the payload failed validation.
#[post("")]
pub async fn create_task(
    pool: web::Data<DbPool>,
    user: CurrentUser,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let new_task = NewTask::new(task_data.into_inner(), user.id());
    let mut conn = db::acquire(&pool).await?;

    let record = sqlx::query_as::<_, TaskRecord>(
        "INSERT INTO tasks (title, description, completed, user_id) VALUES (?, ?, ?, ?) \
         RETURNING id, title, description, completed, user_id",
    )
    .bind(&new_task.title)
    .bind(&new_task.description)
    .bind(new_task.completed)
    .bind(new_task.user_id)
    .fetch_one(&mut *conn)
    .await?;

    log::info!("User {} created task {}", record.user_id, record.id);

    Ok(HttpResponse::Ok().json(Task::from(record)))
}

/// Retrieves one of the authenticated user's tasks.
///
/// ## Responses:
/// - `200 OK`: the `Task`.
/// - `401 Unauthorized`: missing or invalid token.
/// - `404 Not Found`: no such task, or it belongs to another user.
#[get("/{id}")]
pub async fn get_task(
    pool: web::Data<DbPool>,
    user: CurrentUser,
    task_id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    let mut conn = db::acquire(&pool).await?;
    let task = find_owned_task(&mut conn, task_id.into_inner(), user.id()).await?;

    Ok(HttpResponse::Ok().json(Task::from(task)))
}

/// Replaces the title, description and completion flag of one of the
/// authenticated user's tasks.
///
/// ## Responses:
/// - `200 OK`: the updated `Task`.
/// - `401 Unauthorized`: missing or invalid token.
/// - `404 Not Found`: no such task, or it belongs to another user.
/// - `422 Unprocessable Entity`: the payload failed validation.
#[put("/{id}")]
pub async fn update_task(
    pool: web::Data<DbPool>,
    user: CurrentUser,
    task_id: web::Path<i64>,
    task_data: web::Json<TaskInput>,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let mut conn = db::acquire(&pool).await?;
    let mut task = find_owned_task(&mut conn, task_id.into_inner(), user.id()).await?;
    task.apply(task_data.into_inner());

    let updated = sqlx::query_as::<_, TaskRecord>(
        "UPDATE tasks SET title = ?, description = ?, completed = ? \
         WHERE id = ? AND user_id = ? \
         RETURNING id, title, description, completed, user_id",
    )
    .bind(&task.title)
    .bind(&task.description)
    .bind(task.completed)
    .bind(task.id)
    .bind(task.user_id)
    .fetch_optional(&mut *conn)
    .await?
    // Deleted between the lookup and the update.
    .ok_or_else(|| AppError::NotFound("Task not found".into()))?;

    Ok(HttpResponse::Ok().json(Task::from(updated)))
}

/// Deletes one of the authenticated user's tasks.
///
/// ## Responses:
/// - `200 OK`: `{"message": "Task deleted"}`.
/// - `401 Unauthorized`: missing or invalid token.
/// - `404 Not Found`: no such task, or it belongs to another user.
#[delete("/{id}")]
pub async fn delete_task(
    pool: web::Data<DbPool>,
    user: CurrentUser,
    task_id: web::Path<i64>,
) -> Result<impl Responder, AppError> {
    let task_id = task_id.into_inner();
    let mut conn = db::acquire(&pool).await?;

    let result = sqlx::query("DELETE FROM tasks WHERE id = ? AND user_id = ?")
        .bind(task_id)
        .bind(user.id())
        .execute(&mut *conn)
        .await?;

    if result.rows_affected() == 0 {
        return Err(AppError::NotFound("Task not found".into()));
    }

    log::info!("User {} deleted task {}", user.id(), task_id);

    Ok(HttpResponse::Ok().json(json!({ "message": "Task deleted" })))
}
