pub mod auth;
pub mod health;
pub mod tasks;

use actix_web::web;

use crate::auth::AuthMiddleware;
use crate::error::AppError;

/// Registers every route plus the extractor configs that turn malformed JSON bodies,
/// query strings and path parameters into 422 responses.
///
/// Expects `web::Data<DbPool>` and `web::Data<AuthConfig>` to be registered on the `App`.
pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| AppError::ValidationError(err.to_string()).into()),
    )
    .service(health::index)
    .service(
        web::scope("/auth")
            .service(auth::register)
            .service(auth::login),
    )
    .service(
        web::scope("/tasks")
            .wrap(AuthMiddleware)
            .service(tasks::list_tasks)
            .service(tasks::create_task)
            .service(tasks::get_task)
            .service(tasks::update_task)
            .service(tasks::delete_task),
    );
}
