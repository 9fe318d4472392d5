use actix_web::dev::Payload;
use actix_web::{web, Error as ActixError, FromRequest, HttpMessage, HttpRequest};
use futures::future::LocalBoxFuture;

use crate::auth::token::Claims;
use crate::db::{self, DbPool};
use crate::error::AppError;
use crate::models::{User, UserRecord};

/// The user the request's bearer token belongs to.
///
/// Used on routes wrapped by `AuthMiddleware`, which verifies the token and inserts its
/// `Claims` into the request extensions. The extractor loads the matching user row;
/// missing claims or a user that no longer exists both yield `AppError::Unauthorized`.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub User);

impl CurrentUser {
    pub fn id(&self) -> i64 {
        self.0.id
    }
}

impl FromRequest for CurrentUser {
    type Error = ActixError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let claims = req.extensions().get::<Claims>().cloned();
        let pool = req.app_data::<web::Data<DbPool>>().cloned();

        Box::pin(async move {
            let claims =
                claims.ok_or_else(|| AppError::Unauthorized("Invalid credentials".into()))?;
            let pool = pool.ok_or_else(|| {
                AppError::InternalServerError("Database pool not configured".into())
            })?;

            let mut conn = db::acquire(&pool).await?;
            let user = sqlx::query_as::<_, UserRecord>(
                "SELECT id, email, password FROM users WHERE id = ?",
            )
            .bind(claims.sub)
            .fetch_optional(&mut *conn)
            .await
            .map_err(AppError::from)?;

            match user {
                Some(record) => Ok(CurrentUser(User::from(record))),
                None => {
                    log::debug!("Token subject {} does not match any user", claims.sub);
                    Err(AppError::Unauthorized("Invalid credentials".into()).into())
                }
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::http::StatusCode;
    use actix_web::test;

    async fn pool_with_user() -> DbPool {
        let pool = db::init("sqlite::memory:", 1).await.unwrap();
        sqlx::query("INSERT INTO users (id, email, password) VALUES (5, 'five@example.com', 'x')")
            .execute(&pool)
            .await
            .unwrap();
        pool
    }

    #[actix_rt::test]
    async fn test_current_user_extractor_success() {
        let req = test::TestRequest::default()
            .app_data(web::Data::new(pool_with_user().await))
            .to_http_request();
        req.extensions_mut().insert(Claims { sub: 5, exp: 0 });

        let mut payload = Payload::None;
        let user = CurrentUser::from_request(&req, &mut payload).await.unwrap();
        assert_eq!(user.id(), 5);
        assert_eq!(user.0.email, "five@example.com");
    }

    #[actix_rt::test]
    async fn test_current_user_extractor_without_claims() {
        let req = test::TestRequest::default()
            .app_data(web::Data::new(pool_with_user().await))
            .to_http_request();

        let mut payload = Payload::None;
        let err = CurrentUser::from_request(&req, &mut payload)
            .await
            .unwrap_err();
        assert_eq!(err.error_response().status(), StatusCode::UNAUTHORIZED);
    }

    #[actix_rt::test]
    async fn test_current_user_extractor_unknown_user() {
        let req = test::TestRequest::default()
            .app_data(web::Data::new(pool_with_user().await))
            .to_http_request();
        req.extensions_mut().insert(Claims { sub: 404, exp: 0 });

        let mut payload = Payload::None;
        let err = CurrentUser::from_request(&req, &mut payload)
            .await
            .unwrap_err();
        assert_eq!(err.error_response().status(), StatusCode::UNAUTHORIZED);
    }
}
