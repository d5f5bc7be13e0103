use crate::auth::CurrentUser;
use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::equipment::{AvailabilityRequest, EquipmentFilter, EquipmentRequest, EquipmentResponse};
use crate::models::pagination::{PaginatedResponse, PaginationParams};
use crate::routes::parse_id;
use crate::service::equipment::EquipmentService;
use rocket::http::Status;
use rocket::response::status::Custom;
use rocket::serde::json::Json;
use rocket::{State, delete, get, patch, post, put};
use rocket_okapi::openapi;
use sqlx::PgPool;
use validator::Validate;

/// Browse the catalog.
///
/// Without `owner_id` only available items are listed. With it, every item of
/// that owner is returned regardless of availability. `search` matches name or
/// category, case-insensitively. Results are newest first; `page`/`limit` are optional.
#[openapi(tag = "Equipment")]
#[get("/?<search>&<category>&<min_price>&<max_price>&<owner_id>&<page>&<limit>")]
#[allow(clippy::too_many_arguments)]
pub async fn list_equipment(
    pool: &State<PgPool>,
    search: Option<String>,
    category: Option<String>,
    min_price: Option<i64>,
    max_price: Option<i64>,
    owner_id: Option<i64>,
    page: Option<i64>,
    limit: Option<i64>,
) -> Result<Json<PaginatedResponse<EquipmentResponse>>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let filter = EquipmentFilter {
        search,
        category,
        min_price,
        max_price,
        owner_id,
    };
    let pagination = PaginationParams::from_query(page, limit);

    let (items, total) = EquipmentService::new(&repo).list(&filter, pagination.as_ref()).await?;
    let data = items.iter().map(EquipmentResponse::from).collect();
    Ok(Json(PaginatedResponse::from_listing(data, pagination.as_ref(), total)))
}

#[openapi(tag = "Equipment")]
#[get("/<id>")]
pub async fn get_equipment(pool: &State<PgPool>, id: &str) -> Result<Json<EquipmentResponse>, AppError> {
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let equipment = EquipmentService::new(&repo).get(parse_id(id, "equipment")?).await?;
    Ok(Json(EquipmentResponse::from(&equipment)))
}

/// List an item. `owner_id`, when given, must be the logged-in user.
#[openapi(tag = "Equipment")]
#[post("/?<owner_id>", data = "<payload>")]
pub async fn create_equipment(
    pool: &State<PgPool>,
    current_user: CurrentUser,
    owner_id: Option<i64>,
    payload: Json<EquipmentRequest>,
) -> Result<Custom<Json<EquipmentResponse>>, AppError> {
    if let Some(owner_id) = owner_id {
        current_user.ensure_is(owner_id, "Cannot list equipment on behalf of another user")?;
    }
    payload.validate()?;

    let repo = PostgresRepository { pool: pool.inner().clone() };
    let equipment = EquipmentService::new(&repo).create(current_user.id, &payload).await?;
    Ok(Custom(Status::Created, Json(EquipmentResponse::from(&equipment))))
}

#[openapi(tag = "Equipment")]
#[put("/<id>", data = "<payload>")]
pub async fn put_equipment(pool: &State<PgPool>, current_user: CurrentUser, id: &str, payload: Json<EquipmentRequest>) -> Result<Json<EquipmentResponse>, AppError> {
    let id = parse_id(id, "equipment")?;
    payload.validate()?;

    let repo = PostgresRepository { pool: pool.inner().clone() };
    let equipment = EquipmentService::new(&repo).update(id, current_user.id, &payload).await?;
    Ok(Json(EquipmentResponse::from(&equipment)))
}

/// Owner-only listing toggle. Rentals never change it.
#[openapi(tag = "Equipment")]
#[patch("/<id>/availability", data = "<payload>")]
pub async fn patch_availability(
    pool: &State<PgPool>,
    current_user: CurrentUser,
    id: &str,
    payload: Json<AvailabilityRequest>,
) -> Result<Json<EquipmentResponse>, AppError> {
    let id = parse_id(id, "equipment")?;
    let repo = PostgresRepository { pool: pool.inner().clone() };
    let equipment = EquipmentService::new(&repo).set_availability(id, current_user.id, payload.is_available).await?;
    Ok(Json(EquipmentResponse::from(&equipment)))
}

/// Refused with 409 while the item has rentals that are not yet closed.
#[openapi(tag = "Equipment")]
#[delete("/<id>?<owner_id>")]
pub async fn delete_equipment(pool: &State<PgPool>, current_user: CurrentUser, id: &str, owner_id: Option<i64>) -> Result<Status, AppError> {
    let id = parse_id(id, "equipment")?;
    if let Some(owner_id) = owner_id {
        current_user.ensure_is(owner_id, "Cannot delete equipment on behalf of another user")?;
    }
    let repo = PostgresRepository { pool: pool.inner().clone() };
    EquipmentService::new(&repo).delete(id, current_user.id).await?;
    Ok(Status::NoContent)
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![list_equipment, get_equipment, create_equipment, put_equipment, patch_availability, delete_equipment]
}
