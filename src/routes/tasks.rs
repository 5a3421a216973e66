use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{
        AssignQuery, Notification, NotificationInput, Task, TaskAction, TaskHistory, TaskInput,
        TaskQuery,
    },
    notify::NotificationSender,
    repository::{NotificationRepository, TaskRepository},
};
use actix_web::{delete, get, post, put, web, HttpResponse, Responder};
use chrono::Utc;
use log::{info, warn};
use uuid::Uuid;
use validator::Validate;

fn task_not_found() -> AppError {
    AppError::NotFound("Task not found".into())
}

async fn find_task(tasks: &dyn TaskRepository, id: Uuid) -> Result<Task, AppError> {
    tasks.find(id).await?.ok_or_else(task_not_found)
}

/// Writes a changed task with its history entry, or 404 if it vanished meanwhile.
async fn save_task(
    tasks: &dyn TaskRepository,
    task: &Task,
    entry: TaskHistory,
) -> Result<(), AppError> {
    if tasks.save(task, &entry).await? {
        Ok(())
    } else {
        Err(task_not_found())
    }
}

/// Stores and pushes the "you were assigned" notice.
async fn notify_assignee(
    notifications: &dyn NotificationRepository,
    sender: &dyn NotificationSender,
    assignee_id: Uuid,
    task: &Task,
) -> Result<(), AppError> {
    let notification = Notification::new(NotificationInput {
        user_id: assignee_id,
        title: "Task assigned".to_string(),
        message: Some(format!("You have been assigned to \"{}\"", task.title)),
    });
    notifications.insert(&notification).await?;
    let payload = serde_json::to_value(&notification)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;
    sender.deliver(assignee_id, payload);
    Ok(())
}

/// Lists tasks, newest first.
///
/// ## Query Parameters:
/// - `page` (optional): 1-based page number, default 1.
/// - `page_size` (optional): between 1 and 100, default 20.
/// - `status` (optional): `pending`, `in_progress`, `completed` or `archived`.
/// - `assignee_id` (optional): only tasks assigned to this user.
/// - `search` (optional): case-insensitive match in title or description.
///
/// ## Responses:
/// - `200 OK`: `{items, total, page, page_size}`.
/// - `401 Unauthorized`: missing or invalid token.
#[get("")]
pub async fn get_tasks(
    tasks: web::Data<dyn TaskRepository>,
    query_params: web::Query<TaskQuery>,
    _user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let page = tasks.list(&query_params).await?;
    Ok(HttpResponse::Ok().json(page))
}

/// Creates a task and records a `created` history entry.
///
/// ## Responses:
/// - `201 Created`: the new task.
/// - `400 Bad Request`: unparseable body.
/// - `422 Unprocessable Entity`: title or description out of bounds.
#[post("")]
pub async fn create_task(
    tasks: web::Data<dyn TaskRepository>,
    task_data: web::Json<TaskInput>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let task = Task::new(task_data.into_inner());
    let entry = TaskHistory::record(task.id, TaskAction::Created, Some(user.id));
    tasks.create(&task, &entry).await?;

    info!("task {} created by {}", task.id, user.id);
    Ok(HttpResponse::Created().json(task))
}

#[get("/{id}")]
pub async fn get_task(
    tasks: web::Data<dyn TaskRepository>,
    task_id: web::Path<Uuid>,
    _user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let task = find_task(tasks.get_ref(), task_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(task))
}

/// Replaces title, description and status.
///
/// ## Responses:
/// - `200 OK`: the updated task.
/// - `404 Not Found`: absent or deleted.
/// - `422 Unprocessable Entity`: invalid input.
#[put("/{id}")]
pub async fn update_task(
    tasks: web::Data<dyn TaskRepository>,
    task_id: web::Path<Uuid>,
    task_data: web::Json<TaskInput>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    task_data.validate()?;

    let mut task = find_task(tasks.get_ref(), task_id.into_inner()).await?;
    task.apply(task_data.into_inner());
    let entry = TaskHistory::record(task.id, TaskAction::Updated, Some(user.id));
    save_task(tasks.get_ref(), &task, entry).await?;

    Ok(HttpResponse::Ok().json(task))
}

/// Soft-deletes a task. It disappears from every read afterwards.
///
/// ## Responses:
/// - `204 No Content`: deleted.
/// - `404 Not Found`: absent or already deleted.
#[delete("/{id}")]
pub async fn delete_task(
    tasks: web::Data<dyn TaskRepository>,
    task_id: web::Path<Uuid>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let mut task = find_task(tasks.get_ref(), task_id.into_inner()).await?;
    task.is_deleted = true;
    task.updated_at = Some(Utc::now());
    let entry = TaskHistory::record(task.id, TaskAction::Deleted, Some(user.id));
    save_task(tasks.get_ref(), &task, entry).await?;

    info!("task {} deleted by {}", task.id, user.id);
    Ok(HttpResponse::NoContent().finish())
}

/// Assigns a task and notifies the assignee.
///
/// The notification is stored and pushed to the assignee's live
/// subscription, if any.
///
/// ## Query Parameters:
/// - `assignee_id`: the user taking the task.
///
/// ## Responses:
/// - `200 OK`: the updated task.
/// - `404 Not Found`: absent or deleted.
#[put("/{id}/assign")]
pub async fn assign_task(
    tasks: web::Data<dyn TaskRepository>,
    notifications: web::Data<dyn NotificationRepository>,
    sender: web::Data<dyn NotificationSender>,
    task_id: web::Path<Uuid>,
    assign: web::Query<AssignQuery>,
    user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let assignee_id = assign.assignee_id;
    let mut task = find_task(tasks.get_ref(), task_id.into_inner()).await?;
    task.assignee_id = Some(assignee_id);
    task.updated_at = Some(Utc::now());
    let entry = TaskHistory::record(task.id, TaskAction::Assigned, Some(user.id))
        .with_comment(format!("assigned to {}", assignee_id));
    save_task(tasks.get_ref(), &task, entry).await?;

    // The assignment is already committed; a lost notice must not fail the request.
    if let Err(e) =
        notify_assignee(notifications.get_ref(), sender.get_ref(), assignee_id, &task).await
    {
        warn!("task {} assigned but notifying {} failed: {}", task.id, assignee_id, e);
    }

    Ok(HttpResponse::Ok().json(task))
}

/// Audit trail of a task, oldest entry first.
#[get("/{id}/history")]
pub async fn get_task_history(
    tasks: web::Data<dyn TaskRepository>,
    task_id: web::Path<Uuid>,
    _user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let task = find_task(tasks.get_ref(), task_id.into_inner()).await?;
    let history = tasks.history(task.id).await?;
    Ok(HttpResponse::Ok().json(history))
}
