use crate::{
    auth::AuthenticatedUser,
    error::AppError,
    models::{Notification, NotificationInput},
    notify::NotificationSender,
    repository::NotificationRepository,
};
use actix_web::{get, post, web, HttpResponse, Responder};
use uuid::Uuid;
use validator::Validate;

/// Stores a notification and pushes it to the recipient.
///
/// Returns the stored notification with 201. Delivery is best effort; a
/// recipient who is not connected still finds it in their list.
#[post("")]
pub async fn create_notification(
    notifications: web::Data<dyn NotificationRepository>,
    sender: web::Data<dyn NotificationSender>,
    input: web::Json<NotificationInput>,
    _user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    input.validate()?;

    let notification = Notification::new(input.into_inner());
    notifications.insert(&notification).await?;

    let payload = serde_json::to_value(&notification)
        .map_err(|e| AppError::InternalServerError(e.to_string()))?;
    sender.deliver(notification.user_id, payload);

    Ok(HttpResponse::Created().json(notification))
}

/// Notifications addressed to `user_id`, newest first.
#[get("/{user_id}")]
pub async fn get_user_notifications(
    notifications: web::Data<dyn NotificationRepository>,
    user_id: web::Path<Uuid>,
    _user: AuthenticatedUser,
) -> Result<impl Responder, AppError> {
    let items = notifications.list_for_user(user_id.into_inner()).await?;
    Ok(HttpResponse::Ok().json(items))
}
