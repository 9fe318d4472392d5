#![allow(dead_code)]

use actix_http::Request;
use actix_web::body::MessageBody;
use actix_web::dev::{Service, ServiceResponse};
use actix_web::http::{header, StatusCode};
use actix_web::middleware::{Logger, NormalizePath};
use actix_web::{test, web, App};
use serde_json::json;
use todo_list_api::auth::Token;
use todo_list_api::config::AuthConfig;
use todo_list_api::db::{self, DbPool};
use todo_list_api::models::User;
use todo_list_api::routes;

// Helper struct to hold auth details
pub struct TestUser {
    pub id: i64,
    pub token: String,
}

impl TestUser {
    pub fn bearer(&self) -> (header::HeaderName, String) {
        (header::AUTHORIZATION, format!("Bearer {}", self.token))
    }
}

pub fn auth_config() -> AuthConfig {
    AuthConfig {
        jwt_secret: "integration_test_secret".to_string(),
        token_ttl_minutes: 30,
        bcrypt_cost: 4,
    }
}

pub async fn test_pool() -> DbPool {
    db::init("sqlite::memory:", 1)
        .await
        .expect("Failed to open in-memory database")
}

pub async fn init_app(
    pool: DbPool,
) -> impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error> {
    test::init_service(
        App::new()
            .app_data(web::Data::new(pool))
            .app_data(web::Data::new(auth_config()))
            .wrap(NormalizePath::trim())
            .wrap(Logger::default())
            .configure(routes::config),
    )
    .await
}

pub async fn register_and_login_user(
    app: &impl Service<Request, Response = ServiceResponse<impl MessageBody>, Error = actix_web::Error>,
    email: &str,
    password: &str,
) -> Result<TestUser, String> {
    let req_register = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({ "email": email, "password": password }))
        .to_request();
    let resp_register = test::call_service(app, req_register).await;
    let status = resp_register.status();
    let body = test::read_body(resp_register).await;
    if status != StatusCode::CREATED {
        return Err(format!(
            "Failed to register user. Status: {}. Body: {}",
            status,
            String::from_utf8_lossy(&body)
        ));
    }
    let user: User = serde_json::from_slice(&body)
        .map_err(|e| format!("Failed to parse registration response: {}", e))?;

    let req_login = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({ "email": email, "password": password }))
        .to_request();
    let resp_login = test::call_service(app, req_login).await;
    let status = resp_login.status();
    let body = test::read_body(resp_login).await;
    if status != StatusCode::OK {
        return Err(format!(
            "Failed to log in. Status: {}. Body: {}",
            status,
            String::from_utf8_lossy(&body)
        ));
    }
    let token: Token = serde_json::from_slice(&body)
        .map_err(|e| format!("Failed to parse login response: {}", e))?;

    Ok(TestUser {
        id: user.id,
        token: token.access_token,
    })
}
