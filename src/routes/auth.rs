use crate::{
    auth::{generate_token, hash_password, verify_password, LoginRequest, Token},
    config::AuthConfig,
    db::{self, DbPool},
    error::AppError,
    models::{User, UserCreate, UserRecord},
};
use actix_web::{post, web, HttpResponse, Responder};
use validator::Validate;

/// Register a new user
///
/// Stores the email and a bcrypt hash of the password.
///
/// ## Responses:
/// - `201 Created`: the new `User` (`id`, `email`).
/// - `400 Bad Request`: the email is already registered.
/// - `422 Unprocessable Entity`: invalid email or password length.
#[post("/register")]
pub async fn register(
    pool: web::Data<DbPool>,
    auth_config: web::Data<AuthConfig>,
    register_data: web::Json<UserCreate>,
) -> Result<impl Responder, AppError> {
    register_data.validate()?;
    let register_data = register_data.into_inner();

    let mut conn = db::acquire(&pool).await?;

    let existing_user = sqlx::query_as::<_, (i64,)>("SELECT id FROM users WHERE email = ?")
        .bind(&register_data.email)
        .fetch_optional(&mut *conn)
        .await?;

    if existing_user.is_some() {
        return Err(AppError::BadRequest("Email already registered".into()));
    }

    let password_hash = hash_password(&register_data.password, auth_config.bcrypt_cost)?;

    let user = sqlx::query_as::<_, UserRecord>(
        "INSERT INTO users (email, password) VALUES (?, ?) RETURNING id, email, password",
    )
    .bind(&register_data.email)
    .bind(&password_hash)
    .fetch_one(&mut *conn)
    .await
    .map_err(registration_error)?;

    log::info!("Registered user {}", user.id);

    Ok(HttpResponse::Created().json(User::from(user)))
}

/// A concurrent registration can insert the same email between the lookup and
/// the insert; the UNIQUE constraint then reports it.
fn registration_error(err: sqlx::Error) -> AppError {
    match err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => {
            AppError::BadRequest("Email already registered".into())
        }
        other => AppError::from(other),
    }
}

/// Login user
///
/// Checks the credentials and returns a bearer token for the user.
///
/// ## Responses:
/// - `200 OK`: a `Token` (`access_token`, `token_type`).
/// - `401 Unauthorized`: unknown email or wrong password.
/// - `422 Unprocessable Entity`: malformed payload.
#[post("/login")]
pub async fn login(
    pool: web::Data<DbPool>,
    auth_config: web::Data<AuthConfig>,
    login_data: web::Json<LoginRequest>,
) -> Result<impl Responder, AppError> {
    login_data.validate()?;

    let mut conn = db::acquire(&pool).await?;

    let user = sqlx::query_as::<_, UserRecord>(
        "SELECT id, email, password FROM users WHERE email = ?",
    )
    .bind(&login_data.email)
    .fetch_optional(&mut *conn)
    .await?;

    match user {
        Some(user) => {
            if verify_password(&login_data.password, &user.password)? {
                let token = generate_token(user.id, &auth_config)?;
                Ok(HttpResponse::Ok().json(Token::bearer(token)))
            } else {
                Err(AppError::Unauthorized("Invalid credentials".into()))
            }
        }
        None => Err(AppError::Unauthorized("Invalid credentials".into())),
    }
}
