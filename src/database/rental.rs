use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::rental::{NewRental, RentalRow, RentalStatus, RentalWithOwner};
use chrono::NaiveDate;

#[async_trait::async_trait]
pub trait RentalRepository {
    async fn create_rental(&self, rental: &NewRental) -> Result<RentalWithOwner, AppError>;
    async fn get_rental_by_id(&self, id: i64) -> Result<Option<RentalWithOwner>, AppError>;
    async fn list_rentals_for_renter(&self, renter_id: i64) -> Result<Vec<RentalWithOwner>, AppError>;
    async fn list_rentals_for_owner(&self, owner_id: i64) -> Result<Vec<RentalWithOwner>, AppError>;
    /// Whether an approved or rented booking of the equipment overlaps the
    /// inclusive range `start..=end`, ignoring `exclude_rental_id`.
    async fn has_overlapping_booking(&self, equipment_id: i64, start: NaiveDate, end: NaiveDate, exclude_rental_id: Option<i64>) -> Result<bool, AppError>;
    /// Moves the rental to `to` only if it is still in `from`. Returns `None`
    /// when the stored status no longer matches.
    async fn update_rental_status(&self, id: i64, from: RentalStatus, to: RentalStatus) -> Result<Option<RentalWithOwner>, AppError>;
}

const RENTAL_SELECT: &str = r#"
    SELECT r.rental_id, r.equipment_id, r.renter_id, r.start_date, r.end_date,
           r.total_cost, r.status, r.created_at, e.owner_id
    FROM rentals r
    JOIN equipment e ON e.equipment_id = r.equipment_id
"#;

fn into_rentals(rows: Vec<RentalRow>) -> Result<Vec<RentalWithOwner>, AppError> {
    rows.into_iter().map(RentalWithOwner::try_from).collect()
}

#[async_trait::async_trait]
impl RentalRepository for PostgresRepository {
    async fn create_rental(&self, rental: &NewRental) -> Result<RentalWithOwner, AppError> {
        let row = sqlx::query_as::<_, RentalRow>(
            r#"
            WITH inserted AS (
                INSERT INTO rentals (equipment_id, renter_id, start_date, end_date, total_cost, status)
                VALUES ($1, $2, $3, $4, $5, $6)
                RETURNING rental_id, equipment_id, renter_id, start_date, end_date, total_cost, status, created_at
            )
            SELECT i.rental_id, i.equipment_id, i.renter_id, i.start_date, i.end_date,
                   i.total_cost, i.status, i.created_at, e.owner_id
            FROM inserted i
            JOIN equipment e ON e.equipment_id = i.equipment_id
            "#,
        )
        .bind(rental.equipment_id)
        .bind(rental.renter_id)
        .bind(rental.start_date)
        .bind(rental.end_date)
        .bind(rental.total_cost)
        .bind(RentalStatus::Pending.as_str())
        .fetch_one(&self.pool)
        .await?;

        row.try_into()
    }

    async fn get_rental_by_id(&self, id: i64) -> Result<Option<RentalWithOwner>, AppError> {
        let row = sqlx::query_as::<_, RentalRow>(&format!("{} WHERE r.rental_id = $1", RENTAL_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(RentalWithOwner::try_from).transpose()
    }

    async fn list_rentals_for_renter(&self, renter_id: i64) -> Result<Vec<RentalWithOwner>, AppError> {
        let rows = sqlx::query_as::<_, RentalRow>(&format!(
            "{} WHERE r.renter_id = $1 ORDER BY r.created_at DESC, r.rental_id DESC",
            RENTAL_SELECT
        ))
        .bind(renter_id)
        .fetch_all(&self.pool)
        .await?;

        into_rentals(rows)
    }

    async fn list_rentals_for_owner(&self, owner_id: i64) -> Result<Vec<RentalWithOwner>, AppError> {
        let rows = sqlx::query_as::<_, RentalRow>(&format!(
            "{} WHERE e.owner_id = $1 ORDER BY r.created_at DESC, r.rental_id DESC",
            RENTAL_SELECT
        ))
        .bind(owner_id)
        .fetch_all(&self.pool)
        .await?;

        into_rentals(rows)
    }

    async fn has_overlapping_booking(&self, equipment_id: i64, start: NaiveDate, end: NaiveDate, exclude_rental_id: Option<i64>) -> Result<bool, AppError> {
        let overlaps = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM rentals
                WHERE equipment_id = $1
                  AND status IN ('approved', 'rented')
                  AND start_date <= $3
                  AND end_date >= $2
                  AND ($4::BIGINT IS NULL OR rental_id <> $4)
            )
            "#,
        )
        .bind(equipment_id)
        .bind(start)
        .bind(end)
        .bind(exclude_rental_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(overlaps)
    }

    async fn update_rental_status(&self, id: i64, from: RentalStatus, to: RentalStatus) -> Result<Option<RentalWithOwner>, AppError> {
        let row = sqlx::query_as::<_, RentalRow>(
            r#"
            WITH updated AS (
                UPDATE rentals
                SET status = $3
                WHERE rental_id = $1 AND status = $2
                RETURNING rental_id, equipment_id, renter_id, start_date, end_date, total_cost, status, created_at
            )
            SELECT u.rental_id, u.equipment_id, u.renter_id, u.start_date, u.end_date,
                   u.total_cost, u.status, u.created_at, e.owner_id
            FROM updated u
            JOIN equipment e ON e.equipment_id = u.equipment_id
            "#,
        )
        .bind(id)
        .bind(from.as_str())
        .bind(to.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(RentalWithOwner::try_from).transpose()
    }
}
