//! Admin write payloads and their validation into typed property changes.

use serde::{Deserialize, Serialize};

use super::domain::{BuildingType, EcoRating, Floors, Premise, Price, Property, RoomCount};

/// Field-level validation failure surfaced on the write paths.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{field}: {message}")]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl ValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Number accepted either as JSON number or numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumericInput {
    Number(f64),
    Text(String),
}

impl NumericInput {
    fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(value) => Some(*value),
            Self::Text(raw) => raw.trim().parse::<f64>().ok(),
        }
    }

    fn as_integer(&self) -> Option<i64> {
        self.as_f64()
            .filter(|value| value.fract() == 0.0 && value.abs() < i64::MAX as f64)
            .map(|value| value as i64)
    }

    fn is_blank(&self) -> bool {
        matches!(self, Self::Text(raw) if raw.trim().is_empty())
    }
}

/// Yes/no answer accepted as a JSON boolean or `yes`/`no` style string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FlagInput {
    Bool(bool),
    Text(String),
}

impl FlagInput {
    fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            Self::Text(raw) => parse_flag(raw),
        }
    }
}

/// Parses the yes/no vocabulary shared by forms and write payloads.
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "yes" | "true" | "1" | "on" => Some(true),
        "no" | "false" | "0" | "off" => Some(false),
        _ => None,
    }
}

/// One district name/slug or several.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DistrictInput {
    One(String),
    Many(Vec<String>),
}

impl DistrictInput {
    fn names(&self) -> Vec<String> {
        let parts: Vec<&str> = match self {
            Self::One(name) => name.split(',').collect(),
            Self::Many(names) => names.iter().map(String::as_str).collect(),
        };
        parts
            .into_iter()
            .map(str::trim)
            .filter(|part| !part.is_empty())
            .map(str::to_string)
            .collect()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PremiseDraft {
    #[serde(default)]
    pub area: Option<String>,
    #[serde(default)]
    pub rooms: Option<NumericInput>,
    #[serde(default)]
    pub balcony: Option<FlagInput>,
    #[serde(default)]
    pub bathroom: Option<FlagInput>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Create/update payload as received from the admin API.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertyDraft {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, alias = "body")]
    pub content: Option<String>,
    #[serde(default)]
    pub district: Option<DistrictInput>,
    #[serde(default)]
    pub building_name: Option<String>,
    #[serde(default)]
    pub coordinates: Option<String>,
    #[serde(default)]
    pub floors: Option<NumericInput>,
    #[serde(default)]
    pub building_type: Option<String>,
    #[serde(default)]
    pub eco_rating: Option<NumericInput>,
    #[serde(default)]
    pub price: Option<NumericInput>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub premises: Option<Vec<PremiseDraft>>,
}

/// Validated subset of fields to write. `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PropertyChanges {
    pub title: Option<String>,
    pub content: Option<String>,
    pub districts: Option<Vec<String>>,
    pub building_name: Option<String>,
    pub coordinates: Option<String>,
    pub floors: Option<Floors>,
    pub building_type: Option<BuildingType>,
    pub eco_rating: Option<EcoRating>,
    pub price: Option<Price>,
    pub image_url: Option<String>,
    pub premises: Option<Vec<Premise>>,
}

impl PropertyDraft {
    pub fn validate(&self) -> Result<PropertyChanges, ValidationError> {
        let floors = match non_blank_number(&self.floors) {
            Some(raw) => Some(
                raw.as_integer()
                    .ok_or_else(|| ValidationError::new("floors", "must be an integer"))
                    .and_then(|value| {
                        Floors::new(value)
                            .map_err(|err| ValidationError::new("floors", err.to_string()))
                    })?,
            ),
            None => None,
        };

        let building_type = match non_blank(&self.building_type) {
            Some(raw) => Some(BuildingType::from_slug(&raw).ok_or_else(|| {
                ValidationError::new("building_type", "must be one of panel, brick, foam_block")
            })?),
            None => None,
        };

        let eco_rating = match non_blank_number(&self.eco_rating) {
            Some(raw) => Some(
                raw.as_integer()
                    .ok_or_else(|| ValidationError::new("eco_rating", "must be an integer"))
                    .and_then(|value| {
                        EcoRating::new(value)
                            .map_err(|err| ValidationError::new("eco_rating", err.to_string()))
                    })?,
            ),
            None => None,
        };

        let price = match non_blank_number(&self.price) {
            Some(raw) => Some(
                raw.as_f64()
                    .ok_or_else(|| ValidationError::new("price", "must be a number"))
                    .and_then(|value| {
                        Price::new(value).map_err(|err| ValidationError::new("price", err.to_string()))
                    })?,
            ),
            None => None,
        };

        let premises = match &self.premises {
            Some(drafts) => Some(
                drafts
                    .iter()
                    .enumerate()
                    .map(|(index, draft)| draft.validate(index))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
            None => None,
        };

        Ok(PropertyChanges {
            title: non_blank(&self.title),
            content: self.content.clone(),
            districts: self
                .district
                .as_ref()
                .map(DistrictInput::names)
                .filter(|names| !names.is_empty()),
            building_name: non_blank(&self.building_name),
            coordinates: non_blank(&self.coordinates),
            floors,
            building_type,
            eco_rating,
            price,
            image_url: non_blank(&self.image_url),
            premises,
        })
    }
}

impl PremiseDraft {
    fn validate(&self, index: usize) -> Result<Premise, ValidationError> {
        let field = |name: &str| format!("premises[{index}].{name}");
        let defaults = Premise::default();

        let rooms = match non_blank_number(&self.rooms) {
            Some(raw) => raw
                .as_integer()
                .ok_or_else(|| ValidationError::new(field("rooms"), "must be an integer"))
                .and_then(|value| {
                    RoomCount::new(value)
                        .map_err(|err| ValidationError::new(field("rooms"), err.to_string()))
                })?,
            None => defaults.rooms,
        };

        let balcony = match &self.balcony {
            Some(flag) => flag
                .as_bool()
                .ok_or_else(|| ValidationError::new(field("balcony"), "must be yes or no"))?,
            None => defaults.balcony,
        };

        let bathroom = match &self.bathroom {
            Some(flag) => flag
                .as_bool()
                .ok_or_else(|| ValidationError::new(field("bathroom"), "must be yes or no"))?,
            None => defaults.bathroom,
        };

        Ok(Premise {
            area: self
                .area
                .as_deref()
                .map(str::trim)
                .unwrap_or_default()
                .to_string(),
            rooms,
            balcony,
            bathroom,
            image_url: non_blank(&self.image_url),
        })
    }
}

impl PropertyChanges {
    /// Applies the changes on top of an existing record.
    pub fn apply_to(self, property: &mut Property) {
        if let Some(title) = self.title {
            property.title = title;
        }
        if let Some(content) = self.content {
            property.content = content;
        }
        if let Some(building_name) = self.building_name {
            property.building_name = building_name;
        }
        if let Some(coordinates) = self.coordinates {
            property.coordinates = coordinates;
        }
        if let Some(floors) = self.floors {
            property.floors = floors;
        }
        if let Some(building_type) = self.building_type {
            property.building_type = building_type;
        }
        if let Some(eco_rating) = self.eco_rating {
            property.eco_rating = eco_rating;
        }
        if let Some(price) = self.price {
            property.price = Some(price);
        }
        if let Some(image_url) = self.image_url {
            property.image_url = Some(image_url);
        }
        if let Some(premises) = self.premises {
            property.premises = premises;
        }
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|raw| !raw.is_empty())
        .map(str::to_string)
}

fn non_blank_number(value: &Option<NumericInput>) -> Option<&NumericInput> {
    value.as_ref().filter(|raw| !raw.is_blank())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn draft(value: serde_json::Value) -> PropertyDraft {
        serde_json::from_value(value).expect("draft deserializes")
    }

    #[test]
    fn accepts_numeric_strings_and_yes_no_flags() {
        let changes = draft(json!({
            "title": "Sunny 12",
            "floors": "9",
            "eco_rating": 4,
            "building_type": "panel",
            "premises": [{"area": "64.5", "rooms": "3", "balcony": "yes", "bathroom": false}]
        }))
        .validate()
        .expect("valid draft");

        assert_eq!(changes.floors.map(Floors::get), Some(9));
        assert_eq!(changes.eco_rating.map(EcoRating::get), Some(4));
        assert_eq!(changes.building_type, Some(BuildingType::Panel));
        let premises = changes.premises.expect("premises present");
        assert_eq!(premises[0].rooms.get(), 3);
        assert!(premises[0].balcony);
        assert!(!premises[0].bathroom);
    }

    #[test]
    fn reports_the_offending_premise_field() {
        let err = draft(json!({
            "premises": [{"rooms": 2}, {"rooms": 12}]
        }))
        .validate()
        .expect_err("twelve rooms rejected");

        assert_eq!(err.field, "premises[1].rooms");
    }

    #[test]
    fn rejects_unknown_building_type_and_negative_price() {
        let err = draft(json!({"building_type": "concrete"}))
            .validate()
            .expect_err("unknown type rejected");
        assert_eq!(err.field, "building_type");

        let err = draft(json!({"price": -10}))
            .validate()
            .expect_err("negative price rejected");
        assert_eq!(err.field, "price");
    }

    #[test]
    fn blank_values_leave_fields_untouched() {
        let changes = draft(json!({"title": "  ", "floors": "", "district": ""}))
            .validate()
            .expect("blank values are ignored");
        assert_eq!(changes, PropertyChanges::default());
    }

    #[test]
    fn premise_defaults_follow_field_schema() {
        let changes = draft(json!({"premises": [{}]}))
            .validate()
            .expect("empty premise valid");
        let premise = &changes.premises.expect("premises present")[0];
        assert_eq!(premise.rooms.get(), 1);
        assert!(!premise.balcony);
        assert!(premise.bathroom);
    }

    #[test]
    fn district_input_accepts_lists_and_comma_separated_names() {
        let changes = draft(json!({"district": "central, northern"}))
            .validate()
            .expect("valid");
        assert_eq!(
            changes.districts,
            Some(vec!["central".to_string(), "northern".to_string()])
        );

        let changes = draft(json!({"district": ["western"]}))
            .validate()
            .expect("valid");
        assert_eq!(changes.districts, Some(vec!["western".to_string()]));
    }
}
