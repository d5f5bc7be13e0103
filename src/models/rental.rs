use crate::error::app_error::AppError;
use crate::service::lifecycle::{self, Role};
use chrono::{DateTime, NaiveDate, Utc};
use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use std::fmt;
use std::str::FromStr;
use validator::{Validate, ValidationError};

#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq, Hash, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RentalStatus {
    Pending,
    Approved,
    Rejected,
    Rented,
    ReturnRequested,
    Returned,
}

impl RentalStatus {
    pub const ALL: [RentalStatus; 6] = [
        RentalStatus::Pending,
        RentalStatus::Approved,
        RentalStatus::Rejected,
        RentalStatus::Rented,
        RentalStatus::ReturnRequested,
        RentalStatus::Returned,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RentalStatus::Pending => "pending",
            RentalStatus::Approved => "approved",
            RentalStatus::Rejected => "rejected",
            RentalStatus::Rented => "rented",
            RentalStatus::ReturnRequested => "return_requested",
            RentalStatus::Returned => "returned",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RentalStatus::Rejected | RentalStatus::Returned)
    }

    /// Statuses that hold the equipment for their date range.
    pub fn blocks_dates(&self) -> bool {
        matches!(self, RentalStatus::Approved | RentalStatus::Rented)
    }
}

impl fmt::Display for RentalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RentalStatus {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RentalStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| AppError::Validation(format!("Unknown rental status '{}'", s)))
    }
}

/// A named transition a party can invoke on an existing rental.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, Eq, PartialEq, Hash, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub enum RentalAction {
    Approve,
    Reject,
    Pickup,
    ReturnRequest,
    ConfirmReturn,
}

impl RentalAction {
    pub const ALL: [RentalAction; 5] = [
        RentalAction::Approve,
        RentalAction::Reject,
        RentalAction::Pickup,
        RentalAction::ReturnRequest,
        RentalAction::ConfirmReturn,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            RentalAction::Approve => "approve",
            RentalAction::Reject => "reject",
            RentalAction::Pickup => "pickup",
            RentalAction::ReturnRequest => "return-request",
            RentalAction::ConfirmReturn => "confirm-return",
        }
    }
}

impl fmt::Display for RentalAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RentalAction {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "approve" => Ok(RentalAction::Approve),
            "reject" => Ok(RentalAction::Reject),
            "pickup" | "mark-rented" => Ok(RentalAction::Pickup),
            "return-request" | "request-return" => Ok(RentalAction::ReturnRequest),
            "confirm-return" | "mark-returned" => Ok(RentalAction::ConfirmReturn),
            _ => Err(AppError::Validation("Invalid action".to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Rental {
    pub id: i64,
    pub equipment_id: i64,
    pub renter_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_cost: i64,
    pub status: RentalStatus,
    pub created_at: DateTime<Utc>,
}

/// A rental joined with the owner of its equipment, which is what role derivation needs.
#[derive(Debug, Clone, PartialEq)]
pub struct RentalWithOwner {
    pub rental: Rental,
    pub owner_id: i64,
}

impl RentalWithOwner {
    pub fn role_of(&self, user_id: i64) -> Option<Role> {
        Role::of(user_id, self.owner_id, self.rental.renter_id)
    }
}

/// Row shape shared by every rental query; status is stored as text.
#[derive(Debug, sqlx::FromRow)]
pub struct RentalRow {
    pub rental_id: i64,
    pub equipment_id: i64,
    pub renter_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_cost: i64,
    pub status: String,
    pub created_at: DateTime<Utc>,
    pub owner_id: i64,
}

impl TryFrom<RentalRow> for RentalWithOwner {
    type Error = AppError;

    fn try_from(row: RentalRow) -> Result<Self, Self::Error> {
        let status = row
            .status
            .parse::<RentalStatus>()
            .map_err(|_| AppError::configuration(format!("rental {} has unknown status '{}'", row.rental_id, row.status)))?;

        Ok(Self {
            rental: Rental {
                id: row.rental_id,
                equipment_id: row.equipment_id,
                renter_id: row.renter_id,
                start_date: row.start_date,
                end_date: row.end_date,
                total_cost: row.total_cost,
                status,
                created_at: row.created_at,
            },
            owner_id: row.owner_id,
        })
    }
}

/// Everything needed to insert a fresh `pending` rental.
#[derive(Debug, Clone)]
pub struct NewRental {
    pub equipment_id: i64,
    pub renter_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_cost: i64,
}

#[derive(Deserialize, Debug, Validate, JsonSchema)]
#[validate(schema(function = "validate_rental_dates"))]
pub struct RentalRequest {
    pub equipment_id: i64,
    pub renter_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
}

fn validate_rental_dates(request: &RentalRequest) -> Result<(), ValidationError> {
    if request.end_date < request.start_date {
        let mut error = ValidationError::new("end_before_start");
        error.message = Some("end_date must not be before start_date".into());
        return Err(error);
    }
    Ok(())
}

#[derive(Serialize, Debug, Clone, JsonSchema)]
pub struct RentalResponse {
    pub rental_id: i64,
    pub equipment_id: i64,
    pub renter_id: i64,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub total_cost: i64,
    pub status: RentalStatus,
    pub created_at: DateTime<Utc>,
    /// Transitions the viewing user may invoke right now.
    pub available_actions: Vec<RentalAction>,
}

impl RentalResponse {
    pub fn for_viewer(rental: &RentalWithOwner, viewer_id: i64) -> Self {
        let available_actions = rental
            .role_of(viewer_id)
            .map(|role| lifecycle::available_actions(rental.rental.status, role))
            .unwrap_or_default();

        Self {
            rental_id: rental.rental.id,
            equipment_id: rental.rental.equipment_id,
            renter_id: rental.rental.renter_id,
            start_date: rental.rental.start_date,
            end_date: rental.rental.end_date,
            total_cost: rental.rental.total_cost,
            status: rental.rental.status,
            created_at: rental.rental.created_at,
            available_actions,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::sample_rental;

    #[test]
    fn status_round_trips_through_text() {
        for status in RentalStatus::ALL {
            assert_eq!(status.as_str().parse::<RentalStatus>().expect("known status"), status);
        }
        assert!("lost".parse::<RentalStatus>().is_err());
    }

    #[test]
    fn action_parsing_accepts_legacy_aliases() {
        assert_eq!("mark-rented".parse::<RentalAction>().expect("alias"), RentalAction::Pickup);
        assert_eq!("request-return".parse::<RentalAction>().expect("alias"), RentalAction::ReturnRequest);
        assert_eq!("mark-returned".parse::<RentalAction>().expect("alias"), RentalAction::ConfirmReturn);
        assert!(matches!("cancel".parse::<RentalAction>(), Err(AppError::Validation(_))));
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&RentalStatus::ReturnRequested).expect("serialize");
        assert_eq!(json, "\"return_requested\"");
        let json = serde_json::to_string(&RentalAction::ConfirmReturn).expect("serialize");
        assert_eq!(json, "\"confirm-return\"");
    }

    #[test]
    fn request_rejects_end_before_start() {
        let request = RentalRequest {
            equipment_id: 5,
            renter_id: 2,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 3).expect("date"),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 1).expect("date"),
        };
        assert!(request.validate().is_err());

        let same_day = RentalRequest {
            end_date: request.start_date,
            ..request
        };
        assert!(same_day.validate().is_ok());
    }

    #[test]
    fn response_shows_actions_for_the_viewer_only() {
        let rental = RentalWithOwner {
            rental: sample_rental(RentalStatus::Pending),
            owner_id: 1,
        };

        let as_owner = RentalResponse::for_viewer(&rental, 1);
        assert_eq!(as_owner.available_actions, vec![RentalAction::Approve, RentalAction::Reject]);

        let as_renter = RentalResponse::for_viewer(&rental, rental.rental.renter_id);
        assert!(as_renter.available_actions.is_empty());

        let as_stranger = RentalResponse::for_viewer(&rental, 99);
        assert!(as_stranger.available_actions.is_empty());
    }

    #[test]
    fn row_with_unknown_status_is_rejected() {
        let row = RentalRow {
            rental_id: 1,
            equipment_id: 5,
            renter_id: 2,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).expect("date"),
            end_date: NaiveDate::from_ymd_opt(2024, 1, 3).expect("date"),
            total_cost: 30,
            status: "lost".to_string(),
            created_at: Utc::now(),
            owner_id: 1,
        };
        assert!(RentalWithOwner::try_from(row).is_err());
    }
}
