use estate_catalog::catalog::draft::{DistrictInput, FlagInput, NumericInput};
use estate_catalog::catalog::{
    BuildingType, CatalogService, CatalogServiceError, PremiseDraft, PropertyDraft,
    PropertyRepository,
};
use tracing::info;

const DISTRICTS: [&str; 5] = ["Central", "Northern", "Southern", "Eastern", "Western"];
const BUILDING_NAMES: [&str; 10] = [
    "Sunny", "Cozy", "Prestige", "Exclusive", "Elite", "Park", "Central", "New", "Modern",
    "Comfort",
];

/// Deterministic pseudo-random value for the given listing index and field.
fn mix(index: u64, salt: u64) -> u64 {
    let mut value = index
        .wrapping_add(1)
        .wrapping_mul(0x9E37_79B9_7F4A_7C15)
        .wrapping_add(salt.wrapping_mul(0xBF58_476D_1CE4_E5B9));
    value ^= value >> 31;
    value = value.wrapping_mul(0x94D0_49BB_1331_11EB);
    value ^ (value >> 29)
}

fn pick(index: u64, salt: u64, low: u64, high: u64) -> u64 {
    low + mix(index, salt) % (high - low + 1)
}

/// Demo listing number `index`, stable across runs.
pub(crate) fn mock_property(index: usize) -> PropertyDraft {
    let seed = index as u64;
    let district = DISTRICTS[pick(seed, 1, 0, 4) as usize];
    let building_type = BuildingType::ALL[pick(seed, 2, 0, 2) as usize];
    let floors = pick(seed, 3, 5, 20);
    let eco_rating = pick(seed, 4, 1, 5);
    let building_name = format!(
        "{} {}",
        BUILDING_NAMES[pick(seed, 5, 0, 9) as usize],
        pick(seed, 6, 1, 100)
    );
    let coordinates = format!(
        "{:.6}, {:.6}",
        50.38 + pick(seed, 7, 0, 140_000) as f64 / 1_000_000.0,
        30.28 + pick(seed, 8, 0, 430_000) as f64 / 1_000_000.0
    );
    let price = 40_000 + pick(seed, 9, 0, 320) * 500;

    let premises = (0..pick(seed, 10, 1, 5))
        .map(|premise| {
            let salt = 100 + premise * 4;
            PremiseDraft {
                area: Some(format!("{:.1}", 50.0 + pick(seed, salt, 0, 1_000) as f64 / 10.0)),
                rooms: Some(NumericInput::Number(pick(seed, salt + 1, 1, 4) as f64)),
                balcony: Some(FlagInput::Bool(pick(seed, salt + 2, 0, 1) == 1)),
                bathroom: Some(FlagInput::Bool(pick(seed, salt + 3, 0, 1) == 1)),
                image_url: None,
            }
        })
        .collect();

    PropertyDraft {
        title: Some(format!("House {building_name} ({})", index + 1)),
        content: Some(format!(
            "Modern house {building_name} in the {district} district. Type: {}, floors: {floors}, \
             eco-rating: {eco_rating}. Location: {coordinates}.",
            building_type.label()
        )),
        district: Some(DistrictInput::One(district.to_string())),
        building_name: Some(building_name),
        coordinates: Some(coordinates),
        floors: Some(NumericInput::Number(floors as f64)),
        building_type: Some(building_type.as_str().to_string()),
        eco_rating: Some(NumericInput::Number(eco_rating as f64)),
        price: Some(NumericInput::Number(price as f64)),
        image_url: None,
        premises: Some(premises),
    }
}

/// Creates `count` demo listings through the service's validation path.
pub(crate) fn seed_catalog<R>(
    service: &CatalogService<R>,
    count: usize,
) -> Result<usize, CatalogServiceError>
where
    R: PropertyRepository + 'static,
{
    for index in 0..count {
        service.create(mock_property(index))?;
    }
    info!(count, "seeded demo catalog");
    Ok(count)
}
