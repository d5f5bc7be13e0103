use crate::database::equipment::EquipmentRepository;
use crate::database::rental::RentalRepository;
use crate::error::app_error::AppError;
use crate::models::rental::{NewRental, RentalAction, RentalRequest, RentalWithOwner};
use crate::service::lifecycle::{self, Role};
use chrono::NaiveDate;
use tracing::info;

/// Drives rentals through the lifecycle table. Every method performs at most
/// one write and returns rows exactly as the repository stored them.
pub struct RentalService<'a, R> {
    repository: &'a R,
}

impl<'a, R> RentalService<'a, R>
where
    R: RentalRepository + EquipmentRepository + Sync,
{
    pub fn new(repository: &'a R) -> Self {
        RentalService { repository }
    }

    pub async fn request_rental(&self, request: &RentalRequest) -> Result<RentalWithOwner, AppError> {
        if request.end_date < request.start_date {
            return Err(AppError::Validation("end_date must not be before start_date".to_string()));
        }

        let equipment = self
            .repository
            .get_equipment_by_id(request.equipment_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Equipment not found".to_string()))?;

        if !equipment.is_available {
            return Err(AppError::Validation("Equipment is not available".to_string()));
        }
        if equipment.owner_id == request.renter_id {
            return Err(AppError::Validation("Owner cannot rent their own equipment".to_string()));
        }
        if self
            .repository
            .has_overlapping_booking(equipment.equipment_id, request.start_date, request.end_date, None)
            .await?
        {
            return Err(AppError::Conflict("Date range overlaps with an approved/rented booking".to_string()));
        }

        let new_rental = NewRental {
            equipment_id: equipment.equipment_id,
            renter_id: request.renter_id,
            start_date: request.start_date,
            end_date: request.end_date,
            total_cost: total_cost(request.start_date, request.end_date, equipment.price_per_day)?,
        };
        let rental = self.repository.create_rental(&new_rental).await?;

        info!(
            rental_id = rental.rental.id,
            equipment_id = rental.rental.equipment_id,
            renter_id = rental.rental.renter_id,
            status = %rental.rental.status,
            "rental requested"
        );
        Ok(rental)
    }

    /// Applies `action` on behalf of `caller_id`. `today` gates return requests
    /// made before the rental period has started.
    pub async fn advance_status(&self, rental_id: i64, action: RentalAction, caller_id: i64, today: NaiveDate) -> Result<RentalWithOwner, AppError> {
        let current = self
            .repository
            .get_rental_by_id(rental_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Rental not found".to_string()))?;

        let role = current
            .role_of(caller_id)
            .ok_or_else(|| AppError::Forbidden("Action failed: you are not a party to this rental".to_string()))?;

        let status = current.rental.status;
        let transition = lifecycle::find_transition(status, action).ok_or(AppError::IllegalTransition { status, action })?;

        if transition.actor != role {
            return Err(AppError::Forbidden(format!("Action failed: only the {} can {}", actor_name(transition.actor), action)));
        }

        match action {
            RentalAction::Approve => {
                let rental = &current.rental;
                if self
                    .repository
                    .has_overlapping_booking(rental.equipment_id, rental.start_date, rental.end_date, Some(rental.id))
                    .await?
                {
                    return Err(AppError::Conflict("Overlapping approved/rented booking exists".to_string()));
                }
            }
            RentalAction::ReturnRequest if today < current.rental.start_date => {
                return Err(AppError::Validation("Cannot request return before rental start_date".to_string()));
            }
            _ => {}
        }

        let updated = self
            .repository
            .update_rental_status(rental_id, transition.from, transition.to)
            .await?
            .ok_or_else(|| AppError::Conflict("Rental status was changed by another request; refresh and try again".to_string()))?;

        info!(
            rental_id,
            caller_id,
            action = %action,
            from = %transition.from,
            to = %updated.rental.status,
            "rental status advanced"
        );
        Ok(updated)
    }

    pub async fn get_rental(&self, rental_id: i64, viewer_id: i64) -> Result<RentalWithOwner, AppError> {
        let rental = self
            .repository
            .get_rental_by_id(rental_id)
            .await?
            .ok_or_else(|| AppError::NotFound("Rental not found".to_string()))?;

        if rental.role_of(viewer_id).is_none() {
            return Err(AppError::Forbidden("Cannot view another user's rental".to_string()));
        }
        Ok(rental)
    }

    pub async fn list_as_owner(&self, owner_id: i64) -> Result<Vec<RentalWithOwner>, AppError> {
        self.repository.list_rentals_for_owner(owner_id).await
    }

    pub async fn list_as_renter(&self, renter_id: i64) -> Result<Vec<RentalWithOwner>, AppError> {
        self.repository.list_rentals_for_renter(renter_id).await
    }
}

fn actor_name(role: Role) -> &'static str {
    match role {
        Role::Owner => "owner",
        Role::Renter => "renter",
    }
}

/// Price for the inclusive day range `start..=end`. Totals that do not fit
/// in an `i64` are rejected rather than wrapped.
#[allow(clippy::result_large_err)]
pub fn total_cost(start: NaiveDate, end: NaiveDate, price_per_day: i64) -> Result<i64, AppError> {
    let days = ((end - start).num_days() + 1).max(0);
    days.checked_mul(price_per_day)
        .ok_or_else(|| AppError::Validation("Total cost is too large for the requested period".to_string()))
}
