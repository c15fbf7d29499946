use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier assigned to a property when it is first stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PropertyId(pub u64);

impl fmt::Display for PropertyId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DistrictId(pub u64);

/// Construction material of a building.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildingType {
    Panel,
    Brick,
    FoamBlock,
}

impl BuildingType {
    pub const ALL: [BuildingType; 3] = [Self::Panel, Self::Brick, Self::FoamBlock];

    pub fn from_slug(raw: &str) -> Option<Self> {
        match raw.trim() {
            "panel" => Some(Self::Panel),
            "brick" => Some(Self::Brick),
            "foam_block" => Some(Self::FoamBlock),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Panel => "panel",
            Self::Brick => "brick",
            Self::FoamBlock => "foam_block",
        }
    }

    /// Display label used by the result layouts.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Panel => "Panel",
            Self::Brick => "Brick",
            Self::FoamBlock => "Foam block",
        }
    }
}

impl Default for BuildingType {
    fn default() -> Self {
        Self::Brick
    }
}

/// Error returned when a bounded value falls outside its closed range.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("must be between {min} and {max}, got {value}")]
pub struct OutOfRange {
    pub value: i64,
    pub min: u8,
    pub max: u8,
}

macro_rules! bounded_count {
    ($(#[$meta:meta])* $name:ident, $min:expr, $max:expr) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "i64", into = "u8")]
        pub struct $name(u8);

        impl $name {
            pub const MIN: u8 = $min;
            pub const MAX: u8 = $max;

            pub fn new(value: i64) -> Result<Self, OutOfRange> {
                if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&value) {
                    Ok(Self(value as u8))
                } else {
                    Err(OutOfRange {
                        value,
                        min: Self::MIN,
                        max: Self::MAX,
                    })
                }
            }

            pub fn get(self) -> u8 {
                self.0
            }
        }

        impl TryFrom<i64> for $name {
            type Error = OutOfRange;

            fn try_from(value: i64) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for u8 {
            fn from(value: $name) -> u8 {
                value.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

bounded_count!(
    /// Number of storeys, 1 through 20.
    Floors,
    1,
    20
);
bounded_count!(
    /// Eco-rating score, 1 (low) through 5 (high).
    EcoRating,
    1,
    5
);
bounded_count!(
    /// Rooms in a single premise, 1 through 10.
    RoomCount,
    1,
    10
);

impl Default for Floors {
    fn default() -> Self {
        Self(1)
    }
}

impl Default for EcoRating {
    fn default() -> Self {
        Self(3)
    }
}

impl Default for RoomCount {
    fn default() -> Self {
        Self(1)
    }
}

/// Non-negative asking price. Unit-less; the storefront shows it in UAH.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct Price(f64);

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("price must be a non-negative number, got {0}")]
pub struct InvalidPrice(pub f64);

impl Price {
    pub const ZERO: Price = Price(0.0);

    pub fn new(value: f64) -> Result<Self, InvalidPrice> {
        if value.is_finite() && value >= 0.0 {
            Ok(Self(value))
        } else {
            Err(InvalidPrice(value))
        }
    }

    pub fn amount(self) -> f64 {
        self.0
    }

    pub fn total_cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl TryFrom<f64> for Price {
    type Error = InvalidPrice;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Price> for f64 {
    fn from(value: Price) -> f64 {
        value.0
    }
}

/// Named geographic grouping attached to properties.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct District {
    pub id: DistrictId,
    pub name: String,
    pub slug: String,
}

/// A sub-unit (apartment or room block) inside a property.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Premise {
    pub area: String,
    pub rooms: RoomCount,
    pub balcony: bool,
    pub bathroom: bool,
    pub image_url: Option<String>,
}

impl Default for Premise {
    fn default() -> Self {
        Self {
            area: String::new(),
            rooms: RoomCount::default(),
            balcony: false,
            bathroom: true,
            image_url: None,
        }
    }
}

/// A real estate object with its building metadata and premises.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Property {
    pub id: PropertyId,
    pub slug: String,
    pub title: String,
    pub content: String,
    pub districts: Vec<District>,
    pub building_name: String,
    pub coordinates: String,
    pub floors: Floors,
    pub building_type: BuildingType,
    pub eco_rating: EcoRating,
    pub price: Option<Price>,
    pub image_url: Option<String>,
    pub premises: Vec<Premise>,
}

impl Property {
    /// Price used for ordering and display; absent prices read as zero.
    pub fn effective_price(&self) -> Price {
        self.price.unwrap_or(Price::ZERO)
    }

    pub fn primary_district(&self) -> Option<&District> {
        self.districts.first()
    }

    pub fn in_district(&self, slug: &str) -> bool {
        self.districts.iter().any(|district| district.slug == slug)
    }
}

/// Lowercases and hyphenates a title or name into a URL slug.
pub fn slugify(raw: &str) -> String {
    let mut slug = String::with_capacity(raw.len());
    let mut pending_dash = false;

    for ch in raw.trim().chars() {
        if ch.is_alphanumeric() {
            if pending_dash && !slug.is_empty() {
                slug.push('-');
            }
            pending_dash = false;
            slug.extend(ch.to_lowercase());
        } else if ch == '_' {
            pending_dash = false;
            slug.push('_');
        } else {
            pending_dash = true;
        }
    }

    slug
}
