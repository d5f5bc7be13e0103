use crate::models::equipment::EquipmentResponse;
use crate::models::rental::RentalResponse;
use rocket::serde::Serialize;
use schemars::JsonSchema;

/// The three lists a user works from, fetched fresh on every request.
#[derive(Serialize, Debug, JsonSchema)]
pub struct DashboardResponse {
    /// Rentals the user requested, with renter actions.
    pub my_rentals: Vec<RentalResponse>,
    /// Rentals of the user's equipment, with owner actions.
    pub incoming_requests: Vec<RentalResponse>,
    pub my_equipment: Vec<EquipmentResponse>,
}
