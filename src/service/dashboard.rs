use crate::database::equipment::EquipmentRepository;
use crate::database::rental::RentalRepository;
use crate::error::app_error::AppError;
use crate::models::dashboard::DashboardResponse;
use crate::models::equipment::{EquipmentFilter, EquipmentResponse};
use crate::models::rental::RentalResponse;
use crate::service::rental::RentalService;

pub struct DashboardService<'a, R> {
    repository: &'a R,
}

impl<'a, R> DashboardService<'a, R>
where
    R: RentalRepository + EquipmentRepository + Sync,
{
    pub fn new(repository: &'a R) -> Self {
        DashboardService { repository }
    }

    /// Re-reads all three lists; nothing is cached between calls.
    pub async fn dashboard(&self, user_id: i64) -> Result<DashboardResponse, AppError> {
        let rentals = RentalService::new(self.repository);
        let my_rentals = rentals.list_as_renter(user_id).await?;
        let incoming_requests = rentals.list_as_owner(user_id).await?;

        let filter = EquipmentFilter {
            owner_id: Some(user_id),
            ..EquipmentFilter::default()
        };
        let (my_equipment, _) = self.repository.list_equipment(&filter, None).await?;

        Ok(DashboardResponse {
            my_rentals: my_rentals.iter().map(|r| RentalResponse::for_viewer(r, user_id)).collect(),
            incoming_requests: incoming_requests.iter().map(|r| RentalResponse::for_viewer(r, user_id)).collect(),
            my_equipment: my_equipment.iter().map(EquipmentResponse::from).collect(),
        })
    }
}
