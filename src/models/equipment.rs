use chrono::{DateTime, Utc};
use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use validator::Validate;

/// Upper bound for `price_per_day`; keeps rental totals well inside `i64`.
pub const MAX_PRICE_PER_DAY: i64 = 1_000_000_000;

#[derive(Serialize, Debug, Clone, PartialEq, sqlx::FromRow)]
pub struct Equipment {
    pub equipment_id: i64,
    pub owner_id: i64,
    pub name: String,
    pub category: String,
    pub description: String,
    pub condition: String,
    pub image_url: Option<String>,
    pub price_per_day: i64,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize, Debug, Clone, Validate, JsonSchema)]
pub struct EquipmentRequest {
    #[validate(length(min = 1, max = 150))]
    pub name: String,
    #[validate(length(min = 1, max = 100))]
    pub category: String,
    #[validate(length(min = 1))]
    pub description: String,
    #[validate(length(min = 1, max = 50))]
    pub condition: String,
    pub image_url: Option<String>,
    #[validate(range(min = 1, max = 1_000_000_000, message = "price_per_day must be between 1 and 1000000000"))]
    pub price_per_day: i64,
    /// Only honoured on update; new listings are always available.
    #[serde(default = "default_available")]
    pub is_available: bool,
}

fn default_available() -> bool {
    true
}

#[derive(Deserialize, Debug, Clone, JsonSchema)]
pub struct AvailabilityRequest {
    pub is_available: bool,
}

/// Catalog filters. Without `owner_id` only available items are returned.
#[derive(Debug, Clone, Default)]
pub struct EquipmentFilter {
    pub search: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub owner_id: Option<i64>,
}

impl EquipmentFilter {
    pub fn only_available(&self) -> bool {
        self.owner_id.is_none()
    }

    /// Trimmed search term, `None` when blank.
    pub fn search_term(&self) -> Option<&str> {
        self.search.as_deref().map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn matches(&self, equipment: &Equipment) -> bool {
        if self.only_available() && !equipment.is_available {
            return false;
        }
        if let Some(owner_id) = self.owner_id
            && equipment.owner_id != owner_id
        {
            return false;
        }
        if let Some(category) = &self.category
            && &equipment.category != category
        {
            return false;
        }
        if self.min_price.is_some_and(|min| equipment.price_per_day < min) || self.max_price.is_some_and(|max| equipment.price_per_day > max) {
            return false;
        }
        match self.search_term() {
            Some(term) => {
                let term = term.to_lowercase();
                equipment.name.to_lowercase().contains(&term) || equipment.category.to_lowercase().contains(&term)
            }
            None => true,
        }
    }
}

#[derive(Serialize, Debug, Clone, JsonSchema)]
pub struct EquipmentResponse {
    pub equipment_id: i64,
    pub owner_id: i64,
    pub name: String,
    pub category: String,
    pub description: String,
    pub condition: String,
    pub image_url: Option<String>,
    pub price_per_day: i64,
    pub is_available: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&Equipment> for EquipmentResponse {
    fn from(equipment: &Equipment) -> Self {
        Self {
            equipment_id: equipment.equipment_id,
            owner_id: equipment.owner_id,
            name: equipment.name.clone(),
            category: equipment.category.clone(),
            description: equipment.description.clone(),
            condition: equipment.condition.clone(),
            image_url: equipment.image_url.clone(),
            price_per_day: equipment.price_per_day,
            is_available: equipment.is_available,
            created_at: equipment.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::sample_equipment;

    #[test]
    fn price_must_be_positive() {
        let request = EquipmentRequest {
            name: "Drill".to_string(),
            category: "Tools".to_string(),
            description: "Cordless".to_string(),
            condition: "Good".to_string(),
            image_url: None,
            price_per_day: 0,
            is_available: true,
        };
        assert!(request.validate().is_err());
        assert!(EquipmentRequest { price_per_day: 15, ..request }.validate().is_ok());
    }

    #[test]
    fn is_available_defaults_to_true() {
        let request: EquipmentRequest =
            serde_json::from_str(r#"{"name":"Tent","category":"Camping","description":"4 person","condition":"New","price_per_day":20}"#).expect("parse");
        assert!(request.is_available);
        assert!(request.image_url.is_none());
    }

    #[test]
    fn search_matches_name_or_category_case_insensitively() {
        let camera = Equipment {
            name: "Mirrorless Camera".to_string(),
            category: "Photography".to_string(),
            ..sample_equipment(1, 1)
        };

        let by_name = EquipmentFilter {
            search: Some("camera".to_string()),
            ..EquipmentFilter::default()
        };
        let by_category = EquipmentFilter {
            search: Some("PHOTO".to_string()),
            ..EquipmentFilter::default()
        };
        let miss = EquipmentFilter {
            search: Some("drill".to_string()),
            ..EquipmentFilter::default()
        };

        assert!(by_name.matches(&camera));
        assert!(by_category.matches(&camera));
        assert!(!miss.matches(&camera));
    }

    #[test]
    fn public_listing_hides_unavailable_items_but_owner_listing_does_not() {
        let hidden = Equipment {
            is_available: false,
            ..sample_equipment(1, 7)
        };
        assert!(!EquipmentFilter::default().matches(&hidden));
        assert!(
            EquipmentFilter {
                owner_id: Some(7),
                ..EquipmentFilter::default()
            }
            .matches(&hidden)
        );
    }

    #[test]
    fn blank_search_is_ignored() {
        let filter = EquipmentFilter {
            search: Some("   ".to_string()),
            ..EquipmentFilter::default()
        };
        assert!(filter.search_term().is_none());
        assert!(filter.matches(&sample_equipment(1, 1)));
    }
}
