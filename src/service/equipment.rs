use crate::database::equipment::EquipmentRepository;
use crate::error::app_error::AppError;
use crate::models::equipment::{Equipment, EquipmentFilter, EquipmentRequest, MAX_PRICE_PER_DAY};
use crate::models::pagination::PaginationParams;
use tracing::info;

pub struct EquipmentService<'a, R> {
    repository: &'a R,
}

impl<'a, R> EquipmentService<'a, R>
where
    R: EquipmentRepository + Sync,
{
    pub fn new(repository: &'a R) -> Self {
        EquipmentService { repository }
    }

    pub async fn list(&self, filter: &EquipmentFilter, pagination: Option<&PaginationParams>) -> Result<(Vec<Equipment>, i64), AppError> {
        if let (Some(min), Some(max)) = (filter.min_price, filter.max_price)
            && min > max
        {
            return Err(AppError::Validation("min_price cannot be greater than max_price".to_string()));
        }
        self.repository.list_equipment(filter, pagination).await
    }

    pub async fn get(&self, id: i64) -> Result<Equipment, AppError> {
        self.repository
            .get_equipment_by_id(id)
            .await?
            .ok_or_else(|| AppError::NotFound("Equipment not found".to_string()))
    }

    pub async fn create(&self, owner_id: i64, request: &EquipmentRequest) -> Result<Equipment, AppError> {
        ensure_positive_price(request)?;
        let equipment = self.repository.create_equipment(owner_id, request).await?;
        info!(equipment_id = equipment.equipment_id, owner_id, "equipment listed");
        Ok(equipment)
    }

    pub async fn update(&self, id: i64, caller_id: i64, request: &EquipmentRequest) -> Result<Equipment, AppError> {
        ensure_positive_price(request)?;
        self.owned_by(id, caller_id, "Only owner can update this equipment").await?;
        self.repository.update_equipment(id, request).await
    }

    pub async fn set_availability(&self, id: i64, caller_id: i64, is_available: bool) -> Result<Equipment, AppError> {
        self.owned_by(id, caller_id, "Only owner can change availability").await?;
        let equipment = self.repository.set_equipment_availability(id, is_available).await?;
        info!(equipment_id = id, is_available, "equipment availability changed");
        Ok(equipment)
    }

    pub async fn delete(&self, id: i64, caller_id: i64) -> Result<(), AppError> {
        self.owned_by(id, caller_id, "Only owner can delete this equipment").await?;
        if self.repository.has_open_rentals(id).await? {
            return Err(AppError::Conflict("Cannot delete equipment with active rentals".to_string()));
        }
        self.repository.delete_equipment(id).await?;
        info!(equipment_id = id, "equipment deleted");
        Ok(())
    }

    async fn owned_by(&self, id: i64, caller_id: i64, denial: &str) -> Result<Equipment, AppError> {
        let equipment = self.get(id).await?;
        if equipment.owner_id != caller_id {
            return Err(AppError::Forbidden(denial.to_string()));
        }
        Ok(equipment)
    }
}

fn ensure_positive_price(request: &EquipmentRequest) -> Result<(), AppError> {
    if request.price_per_day <= 0 {
        return Err(AppError::Validation("price_per_day must be > 0".to_string()));
    }
    if request.price_per_day > MAX_PRICE_PER_DAY {
        return Err(AppError::Validation(format!("price_per_day must not exceed {}", MAX_PRICE_PER_DAY)));
    }
    Ok(())
}
