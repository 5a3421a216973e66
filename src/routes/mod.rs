pub mod auth;
pub mod notifications;
pub mod tasks;

use actix_web::web;

/// Mounts every endpoint. Expects to be nested under `/api`.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/auth")
            .service(auth::login)
            .service(auth::register)
            .service(auth::me)
            .service(auth::update_me),
    )
    .service(
        web::scope("/tasks")
            .service(tasks::get_tasks)
            .service(tasks::create_task)
            .service(tasks::get_task_history)
            .service(tasks::assign_task)
            .service(tasks::get_task)
            .service(tasks::update_task)
            .service(tasks::delete_task),
    )
    .service(
        web::scope("/notifications")
            .service(notifications::create_notification)
            .service(notifications::get_user_notifications),
    );
}
