use crate::auth::{CurrentUser, end_session, start_session};
use crate::database::postgres_repository::PostgresRepository;
use crate::database::user::{dummy_verify, verify_password};
use crate::error::app_error::AppError;
use crate::models::user::{LoginRequest, RegisterRequest, UserResponse};
use rocket::http::{CookieJar, Status};
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::{State, get, post};
use rocket_okapi::openapi;
use sqlx::PgPool;
use tracing::info;
use validator::Validate;

/// Create an account
#[openapi(tag = "Auth")]
#[post("/register", data = "<payload>")]
pub async fn register(pool: &State<PgPool>, payload: Json<RegisterRequest>) -> Result<Custom<Json<UserResponse>>, AppError> {
    let payload = payload.into_inner().normalized();
    payload.validate()?;

    let repo = PostgresRepository { pool: pool.inner().clone() };
    if repo.get_user_by_email(&payload.email).await?.is_some() {
        return Err(AppError::UserAlreadyExists(payload.email.clone()));
    }

    let user = repo.create_user(&payload.name, &payload.email, &payload.password).await?;
    info!(user_id = user.user_id, "user registered");
    Ok(Custom(Status::Created, Json(UserResponse::from(&user))))
}

/// Log in and receive the session cookie together with the user record
#[openapi(tag = "Auth")]
#[post("/login", data = "<payload>")]
pub async fn login(pool: &State<PgPool>, cookies: &CookieJar<'_>, payload: Json<LoginRequest>) -> Result<Json<UserResponse>, AppError> {
    payload.validate()?;

    let repo = PostgresRepository { pool: pool.inner().clone() };
    let Some(user) = repo.get_user_by_email(&payload.email).await? else {
        dummy_verify(&payload.password);
        return Err(AppError::InvalidCredentials);
    };
    verify_password(&user, &payload.password)?;

    start_session(cookies, &user);
    info!(user_id = user.user_id, "user logged in");
    Ok(Json(UserResponse::from(&user)))
}

/// Clear the session cookie
#[openapi(tag = "Auth")]
#[post("/logout")]
pub fn logout(cookies: &CookieJar<'_>) -> Status {
    end_session(cookies);
    Status::NoContent
}

/// The user behind the current session
#[openapi(tag = "Auth")]
#[get("/me")]
pub async fn me(pool: &State<PgPool>, current_user: CurrentUser) -> Result<Json<UserResponse>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let user = repo
        .get_user_by_id(current_user.id)
        .await?
        .ok_or_else(|| AppError::NotFound("User not found".to_string()))?;
    Ok(Json(UserResponse::from(&user)))
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![register, login, logout, me]
}
