use crate::auth::CurrentUser;
use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::rental::{RentalAction, RentalRequest, RentalResponse, RentalWithOwner};
use crate::routes::parse_id;
use crate::service::rental::RentalService;
use chrono::Utc;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::{State, get, post, put};
use rocket_okapi::openapi;
use sqlx::PgPool;
use std::str::FromStr;
use validator::Validate;

fn responses_for(rentals: &[RentalWithOwner], viewer_id: i64) -> Vec<RentalResponse> {
    rentals.iter().map(|rental| RentalResponse::for_viewer(rental, viewer_id)).collect()
}

/// Ask to rent an item for an inclusive date range. New rentals start as `pending`.
#[openapi(tag = "Rentals")]
#[post("/request", data = "<payload>")]
pub async fn request_rental(pool: &State<PgPool>, current_user: CurrentUser, payload: Json<RentalRequest>) -> Result<Custom<Json<RentalResponse>>, AppError> {
    current_user.ensure_is(payload.renter_id, "Cannot request a rental on behalf of another user")?;
    payload.validate()?;

    let repo = PostgresRepository { pool: pool.inner().clone() };
    let rental = RentalService::new(&repo).request_rental(&payload).await?;
    Ok(Custom(Status::Created, Json(RentalResponse::for_viewer(&rental, current_user.id))))
}

/// Apply a lifecycle action: `approve`, `reject`, `pickup`, `return-request` or `confirm-return`.
///
/// Returns the rental as stored after the transition. A 409 means another
/// request changed the rental first.
#[openapi(tag = "Rentals")]
#[put("/<id>/<action>")]
pub async fn advance_rental(pool: &State<PgPool>, current_user: CurrentUser, id: &str, action: &str) -> Result<Json<RentalResponse>, AppError> {
    let id = parse_id(id, "rental")?;
    let action = RentalAction::from_str(action)?;

    let repo = PostgresRepository { pool: pool.inner().clone() };
    let today = Utc::now().date_naive();
    let rental = RentalService::new(&repo).advance_status(id, action, current_user.id, today).await?;
    Ok(Json(RentalResponse::for_viewer(&rental, current_user.id)))
}

#[openapi(tag = "Rentals")]
#[get("/<id>")]
pub async fn get_rental(pool: &State<PgPool>, current_user: CurrentUser, id: &str) -> Result<Json<RentalResponse>, AppError> {
    let id = parse_id(id, "rental")?;
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let rental = RentalService::new(&repo).get_rental(id, current_user.id).await?;
    Ok(Json(RentalResponse::for_viewer(&rental, current_user.id)))
}

/// Rentals the user asked for, newest first.
#[openapi(tag = "Rentals")]
#[get("/my-requests/<renter_id>")]
pub async fn my_requests(pool: &State<PgPool>, current_user: CurrentUser, renter_id: &str) -> Result<Json<Vec<RentalResponse>>, AppError> {
    let renter_id = parse_id(renter_id, "user")?;
    current_user.ensure_is(renter_id, "Cannot list another user's rentals")?;

    let repo = PostgresRepository { pool: pool.inner().clone() };
    let rentals = RentalService::new(&repo).list_as_renter(renter_id).await?;
    Ok(Json(responses_for(&rentals, current_user.id)))
}

/// Rentals of equipment the user owns, newest first.
#[openapi(tag = "Rentals")]
#[get("/owner-requests/<owner_id>")]
pub async fn owner_requests(pool: &State<PgPool>, current_user: CurrentUser, owner_id: &str) -> Result<Json<Vec<RentalResponse>>, AppError> {
    let owner_id = parse_id(owner_id, "user")?;
    current_user.ensure_is(owner_id, "Cannot list another user's incoming requests")?;

    let repo = PostgresRepository { pool: pool.inner().clone() };
    let rentals = RentalService::new(&repo).list_as_owner(owner_id).await?;
    Ok(Json(responses_for(&rentals, current_user.id)))
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![request_rental, advance_rental, get_rental, my_requests, owner_requests]
}
