use crate::auth::CurrentUser;
use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::dashboard::DashboardResponse;
use crate::service::dashboard::DashboardService;
use rocket::serde::json::Json;
use rocket::{State, get};
use rocket_okapi::openapi;
use sqlx::PgPool;

/// The caller's rentals, incoming requests and listed equipment in one call.
/// Every rental carries the actions the caller may take on it.
#[openapi(tag = "Dashboard")]
#[get("/")]
pub async fn get_dashboard(pool: &State<PgPool>, current_user: CurrentUser) -> Result<Json<DashboardResponse>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    Ok(Json(DashboardService::new(&repo).dashboard(current_user.id).await?))
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![get_dashboard]
}
