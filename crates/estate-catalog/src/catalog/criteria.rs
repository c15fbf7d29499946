//! Normalizes raw filter parameters into typed criteria.
//!
//! The REST list endpoint parses under [`ParsePolicy::Strict`] and answers out-of-domain
//! values with a field-level error. The form endpoint parses under
//! [`ParsePolicy::Lenient`]: out-of-domain values are dropped and the request proceeds
//! without that predicate. The sort key is lenient under both policies and falls back
//! to [`SortKey::EcoDesc`].

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::domain::{BuildingType, District, EcoRating, Floors, RoomCount};
use super::draft::parse_flag;

/// Raw string parameters as decoded from a query string or form body.
pub type RawParams = HashMap<String, String>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsePolicy {
    Strict,
    Lenient,
}

/// Result ordering requested by the caller.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortKey {
    #[default]
    EcoDesc,
    EcoAsc,
    PriceAsc,
    PriceDesc,
}

impl SortKey {
    /// Parses a sort key, accepting the storefront form aliases. Unknown values fall back
    /// to the default ordering.
    pub fn parse_lenient(raw: Option<&str>) -> Self {
        let Some(raw) = raw.map(str::trim).filter(|value| !value.is_empty()) else {
            return Self::default();
        };

        match raw {
            "eco_desc" | "ecology-high" => Self::EcoDesc,
            "eco_asc" | "ecology-low" => Self::EcoAsc,
            "price_asc" | "price-low" => Self::PriceAsc,
            "price_desc" | "price-high" => Self::PriceDesc,
            other => {
                debug!(sort = other, "unrecognized sort key, using default ordering");
                Self::default()
            }
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EcoDesc => "eco_desc",
            Self::EcoAsc => "eco_asc",
            Self::PriceAsc => "price_asc",
            Self::PriceDesc => "price_desc",
        }
    }
}

/// Rejected filter parameter under the strict policy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid parameter {field}: {message}")]
pub struct CriteriaError {
    pub field: &'static str,
    pub message: String,
}

/// Typed, validated filter set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterCriteria {
    pub district: Option<String>,
    pub building_type: Option<BuildingType>,
    pub min_floors: Option<Floors>,
    pub max_floors: Option<Floors>,
    pub min_eco_rating: Option<EcoRating>,
    pub rooms: Option<RoomCount>,
    pub balcony: Option<bool>,
    pub bathroom: Option<bool>,
    pub sort: SortKey,
    pub page: u32,
}

impl Default for FilterCriteria {
    fn default() -> Self {
        Self {
            district: None,
            building_type: None,
            min_floors: None,
            max_floors: None,
            min_eco_rating: None,
            rooms: None,
            balcony: None,
            bathroom: None,
            sort: SortKey::default(),
            page: 1,
        }
    }
}

impl FilterCriteria {
    pub fn parse(params: &RawParams, policy: ParsePolicy) -> Result<Self, CriteriaError> {
        let reader = ParamReader { params, policy };

        let building_type = reader.field("building_type", |raw| {
            BuildingType::from_slug(raw)
                .ok_or_else(|| "must be one of panel, brick, foam_block".to_string())
        })?;

        let page = reader
            .field("page", |raw| match raw.parse::<u32>() {
                Ok(page) if page >= 1 => Ok(page),
                _ => Err("must be a positive integer".to_string()),
            })?
            .unwrap_or(1);

        Ok(Self {
            district: reader.text("district"),
            building_type,
            min_floors: reader.bounded("min_floors", Floors::new)?,
            max_floors: reader.bounded("max_floors", Floors::new)?,
            min_eco_rating: reader.bounded("min_eco_rating", EcoRating::new)?,
            rooms: reader.bounded("rooms", RoomCount::new)?,
            balcony: reader.flag("balcony")?,
            bathroom: reader.flag("bathroom")?,
            sort: SortKey::parse_lenient(reader.raw("sort")),
            page,
        })
    }

    /// Drops a district filter whose slug does not name a known district.
    pub fn retain_known_district(&mut self, districts: &[District]) {
        if let Some(slug) = &self.district {
            if !districts.iter().any(|district| &district.slug == slug) {
                debug!(district = %slug, "ignoring unknown district filter");
                self.district = None;
            }
        }
    }
}

/// Parses the REST `per_page` parameter.
pub fn parse_per_page(
    params: &RawParams,
    default: u32,
    max: u32,
    policy: ParsePolicy,
) -> Result<u32, CriteriaError> {
    let reader = ParamReader { params, policy };
    let per_page = reader.field("per_page", |raw| match raw.parse::<u32>() {
        Ok(value) if (1..=max).contains(&value) => Ok(value),
        _ => Err(format!("must be an integer between 1 and {max}")),
    })?;
    Ok(per_page.unwrap_or(default))
}

struct ParamReader<'a> {
    params: &'a RawParams,
    policy: ParsePolicy,
}

impl<'a> ParamReader<'a> {
    fn raw(&self, key: &str) -> Option<&'a str> {
        self.params
            .get(key)
            .map(|value| value.trim())
            .filter(|value| !value.is_empty())
    }

    fn text(&self, key: &str) -> Option<String> {
        self.raw(key).map(str::to_string)
    }

    fn field<T>(
        &self,
        key: &'static str,
        parse: impl FnOnce(&str) -> Result<T, String>,
    ) -> Result<Option<T>, CriteriaError> {
        let Some(raw) = self.raw(key) else {
            return Ok(None);
        };

        match parse(raw) {
            Ok(value) => Ok(Some(value)),
            Err(message) => match self.policy {
                ParsePolicy::Strict => Err(CriteriaError {
                    field: key,
                    message,
                }),
                ParsePolicy::Lenient => {
                    debug!(field = key, value = raw, %message, "dropping out-of-domain filter value");
                    Ok(None)
                }
            },
        }
    }

    fn bounded<T, E: std::fmt::Display>(
        &self,
        key: &'static str,
        build: impl FnOnce(i64) -> Result<T, E>,
    ) -> Result<Option<T>, CriteriaError> {
        self.field(key, |raw| {
            let value = raw
                .parse::<i64>()
                .map_err(|_| "must be an integer".to_string())?;
            build(value).map_err(|err| err.to_string())
        })
    }

    fn flag(&self, key: &'static str) -> Result<Option<bool>, CriteriaError> {
        self.field(key, |raw| {
            parse_flag(raw).ok_or_else(|| "must be yes or no".to_string())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::domain::DistrictId;

    fn params(pairs: &[(&str, &str)]) -> RawParams {
        pairs
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect()
    }

    #[test]
    fn empty_params_yield_defaults() {
        let criteria =
            FilterCriteria::parse(&RawParams::new(), ParsePolicy::Strict).expect("defaults");
        assert_eq!(criteria, FilterCriteria::default());
        assert_eq!(criteria.sort, SortKey::EcoDesc);
        assert_eq!(criteria.page, 1);
    }

    #[test]
    fn parses_full_filter_set() {
        let criteria = FilterCriteria::parse(
            &params(&[
                ("district", "central"),
                ("building_type", "brick"),
                ("min_floors", "3"),
                ("max_floors", "12"),
                ("min_eco_rating", "4"),
                ("rooms", "2"),
                ("balcony", "yes"),
                ("bathroom", "no"),
                ("sort", "price_asc"),
                ("page", "2"),
            ]),
            ParsePolicy::Strict,
        )
        .expect("valid criteria");

        assert_eq!(criteria.district.as_deref(), Some("central"));
        assert_eq!(criteria.building_type, Some(BuildingType::Brick));
        assert_eq!(criteria.min_floors.map(Floors::get), Some(3));
        assert_eq!(criteria.max_floors.map(Floors::get), Some(12));
        assert_eq!(criteria.min_eco_rating.map(EcoRating::get), Some(4));
        assert_eq!(criteria.rooms.map(RoomCount::get), Some(2));
        assert_eq!(criteria.balcony, Some(true));
        assert_eq!(criteria.bathroom, Some(false));
        assert_eq!(criteria.sort, SortKey::PriceAsc);
        assert_eq!(criteria.page, 2);
    }

    #[test]
    fn min_above_max_floors_passes_through() {
        let criteria = FilterCriteria::parse(
            &params(&[("min_floors", "15"), ("max_floors", "4")]),
            ParsePolicy::Strict,
        )
        .expect("inverted bounds are not rejected");
        assert_eq!(criteria.min_floors.map(Floors::get), Some(15));
        assert_eq!(criteria.max_floors.map(Floors::get), Some(4));
    }

    #[test]
    fn strict_policy_names_the_rejected_field() {
        let err = FilterCriteria::parse(&params(&[("min_floors", "21")]), ParsePolicy::Strict)
            .expect_err("out of range");
        assert_eq!(err.field, "min_floors");

        let err = FilterCriteria::parse(&params(&[("building_type", "wood")]), ParsePolicy::Strict)
            .expect_err("unknown type");
        assert_eq!(err.field, "building_type");

        let err = FilterCriteria::parse(&params(&[("page", "0")]), ParsePolicy::Strict)
            .expect_err("page zero");
        assert_eq!(err.field, "page");
    }

    #[test]
    fn lenient_policy_drops_out_of_domain_values() {
        let criteria = FilterCriteria::parse(
            &params(&[
                ("building_type", "wood"),
                ("min_eco_rating", "9"),
                ("rooms", "many"),
                ("balcony", "maybe"),
                ("page", "-3"),
                ("max_floors", "7"),
            ]),
            ParsePolicy::Lenient,
        )
        .expect("lenient parsing never fails");

        assert_eq!(criteria.building_type, None);
        assert_eq!(criteria.min_eco_rating, None);
        assert_eq!(criteria.rooms, None);
        assert_eq!(criteria.balcony, None);
        assert_eq!(criteria.page, 1);
        assert_eq!(criteria.max_floors.map(Floors::get), Some(7));
    }

    #[test]
    fn unknown_sort_falls_back_to_eco_desc_under_both_policies() {
        for policy in [ParsePolicy::Strict, ParsePolicy::Lenient] {
            let criteria = FilterCriteria::parse(&params(&[("sort", "newest")]), policy)
                .expect("sort never rejects");
            assert_eq!(criteria.sort, SortKey::EcoDesc);
        }
    }

    #[test]
    fn form_sort_aliases_are_recognized() {
        assert_eq!(SortKey::parse_lenient(Some("ecology-low")), SortKey::EcoAsc);
        assert_eq!(SortKey::parse_lenient(Some("price-low")), SortKey::PriceAsc);
        assert_eq!(SortKey::parse_lenient(Some("price-high")), SortKey::PriceDesc);
        assert_eq!(SortKey::parse_lenient(None), SortKey::EcoDesc);
    }

    #[test]
    fn unknown_district_is_ignored() {
        let districts = vec![District {
            id: DistrictId(1),
            name: "Central".to_string(),
            slug: "central".to_string(),
        }];

        let mut criteria = FilterCriteria {
            district: Some("atlantis".to_string()),
            ..FilterCriteria::default()
        };
        criteria.retain_known_district(&districts);
        assert_eq!(criteria.district, None);

        criteria.district = Some("central".to_string());
        criteria.retain_known_district(&districts);
        assert_eq!(criteria.district.as_deref(), Some("central"));
    }

    #[test]
    fn per_page_is_bounded() {
        assert_eq!(
            parse_per_page(&RawParams::new(), 10, 100, ParsePolicy::Strict),
            Ok(10)
        );
        assert_eq!(
            parse_per_page(&params(&[("per_page", "100")]), 10, 100, ParsePolicy::Strict),
            Ok(100)
        );
        let err = parse_per_page(&params(&[("per_page", "101")]), 10, 100, ParsePolicy::Strict)
            .expect_err("above cap");
        assert_eq!(err.field, "per_page");
    }
}
