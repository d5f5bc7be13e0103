use crate::database::postgres_repository::PostgresRepository;
use crate::error::app_error::AppError;
use crate::models::equipment::{Equipment, EquipmentFilter, EquipmentRequest};
use crate::models::pagination::PaginationParams;
use sqlx::{Postgres, QueryBuilder};

#[async_trait::async_trait]
pub trait EquipmentRepository {
    async fn create_equipment(&self, owner_id: i64, request: &EquipmentRequest) -> Result<Equipment, AppError>;
    async fn get_equipment_by_id(&self, id: i64) -> Result<Option<Equipment>, AppError>;
    async fn list_equipment(&self, filter: &EquipmentFilter, pagination: Option<&PaginationParams>) -> Result<(Vec<Equipment>, i64), AppError>;
    async fn update_equipment(&self, id: i64, request: &EquipmentRequest) -> Result<Equipment, AppError>;
    async fn set_equipment_availability(&self, id: i64, is_available: bool) -> Result<Equipment, AppError>;
    /// Whether any rental of this equipment is still in a non-terminal status.
    async fn has_open_rentals(&self, id: i64) -> Result<bool, AppError>;
    async fn delete_equipment(&self, id: i64) -> Result<(), AppError>;
}

const EQUIPMENT_COLUMNS: &str = "equipment_id, owner_id, name, category, description, condition, image_url, price_per_day, is_available, created_at";

fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &EquipmentFilter) {
    builder.push(" WHERE TRUE");

    if filter.only_available() {
        builder.push(" AND is_available");
    }
    if let Some(owner_id) = filter.owner_id {
        builder.push(" AND owner_id = ").push_bind(owner_id);
    }
    if let Some(term) = filter.search_term() {
        let pattern = format!("%{}%", term);
        builder
            .push(" AND (name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR category ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
    if let Some(category) = &filter.category {
        builder.push(" AND category = ").push_bind(category.clone());
    }
    if let Some(min_price) = filter.min_price {
        builder.push(" AND price_per_day >= ").push_bind(min_price);
    }
    if let Some(max_price) = filter.max_price {
        builder.push(" AND price_per_day <= ").push_bind(max_price);
    }
}

#[async_trait::async_trait]
impl EquipmentRepository for PostgresRepository {
    async fn create_equipment(&self, owner_id: i64, request: &EquipmentRequest) -> Result<Equipment, AppError> {
        let equipment = sqlx::query_as::<_, Equipment>(&format!(
            r#"
            INSERT INTO equipment (owner_id, name, category, description, condition, image_url, price_per_day)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING {}
            "#,
            EQUIPMENT_COLUMNS
        ))
        .bind(owner_id)
        .bind(&request.name)
        .bind(&request.category)
        .bind(&request.description)
        .bind(&request.condition)
        .bind(&request.image_url)
        .bind(request.price_per_day)
        .fetch_one(&self.pool)
        .await?;

        Ok(equipment)
    }

    async fn get_equipment_by_id(&self, id: i64) -> Result<Option<Equipment>, AppError> {
        let equipment = sqlx::query_as::<_, Equipment>(&format!("SELECT {} FROM equipment WHERE equipment_id = $1", EQUIPMENT_COLUMNS))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(equipment)
    }

    async fn list_equipment(&self, filter: &EquipmentFilter, pagination: Option<&PaginationParams>) -> Result<(Vec<Equipment>, i64), AppError> {
        let mut count_query = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM equipment");
        push_filters(&mut count_query, filter);
        let total: i64 = count_query.build_query_scalar::<i64>().fetch_one(&self.pool).await?;

        let mut query = QueryBuilder::<Postgres>::new(format!("SELECT {} FROM equipment", EQUIPMENT_COLUMNS));
        push_filters(&mut query, filter);
        query.push(" ORDER BY created_at DESC, equipment_id DESC");

        if let Some(params) = pagination {
            query.push(" LIMIT ").push_bind(params.effective_limit());
            query.push(" OFFSET ").push_bind(params.offset());
        }

        let items = query.build_query_as::<Equipment>().fetch_all(&self.pool).await?;

        Ok((items, total))
    }

    async fn update_equipment(&self, id: i64, request: &EquipmentRequest) -> Result<Equipment, AppError> {
        let equipment = sqlx::query_as::<_, Equipment>(&format!(
            r#"
            UPDATE equipment
            SET name = $1, category = $2, description = $3, condition = $4,
                image_url = $5, price_per_day = $6, is_available = $7
            WHERE equipment_id = $8
            RETURNING {}
            "#,
            EQUIPMENT_COLUMNS
        ))
        .bind(&request.name)
        .bind(&request.category)
        .bind(&request.description)
        .bind(&request.condition)
        .bind(&request.image_url)
        .bind(request.price_per_day)
        .bind(request.is_available)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(equipment)
    }

    async fn set_equipment_availability(&self, id: i64, is_available: bool) -> Result<Equipment, AppError> {
        let equipment = sqlx::query_as::<_, Equipment>(&format!(
            "UPDATE equipment SET is_available = $1 WHERE equipment_id = $2 RETURNING {}",
            EQUIPMENT_COLUMNS
        ))
        .bind(is_available)
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(equipment)
    }

    async fn has_open_rentals(&self, id: i64) -> Result<bool, AppError> {
        let open = sqlx::query_scalar::<_, bool>(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM rentals
                WHERE equipment_id = $1
                  AND status NOT IN ('rejected', 'returned')
            )
            "#,
        )
        .bind(id)
        .fetch_one(&self.pool)
        .await?;

        Ok(open)
    }

    async fn delete_equipment(&self, id: i64) -> Result<(), AppError> {
        sqlx::query("DELETE FROM equipment WHERE equipment_id = $1").bind(id).execute(&self.pool).await?;
        Ok(())
    }
}
