//! The Dalles, Oregon. Every body publishes its sessions through one
//! OmpNetwork site, told apart by category id.

mod parser;
mod spider;

pub use spider::{DallesConfig, DallesSpider};

use crate::types::{Classification, Location};

pub(crate) const BASE_URL: &str = "https://thedalles-oregon.ompnetwork.org";
pub(crate) const SITE_ID: &str = "312";

fn city_hall() -> Location {
    Location::new("The Dalles City Hall", "313 Court St, The Dalles, OR 97058")
}

pub fn configs() -> Vec<DallesConfig> {
    [
        (
            "colgo_dalles_city_council",
            "The Dalles City Council",
            "214",
            Classification::CityCouncil,
        ),
        (
            "colgo_dalles_informational",
            "The Dalles Informational or Town Hall Meetings",
            "215",
            Classification::NotClassified,
        ),
        (
            "colgo_dalles_planning_commission",
            "The Dalles Planning Commission",
            "216",
            Classification::Commission,
        ),
        (
            "colgo_dalles_historic_landmarks",
            "The Dalles Historic Landmarks Commission",
            "217",
            Classification::Commission,
        ),
        (
            "colgo_dalles_urban_renewal",
            "The Dalles Urban Renewal Agency",
            "218",
            Classification::Board,
        ),
    ]
    .into_iter()
    .map(|(name, agency, category_id, classification)| DallesConfig {
        name: Some(name.to_string()),
        agency: Some(agency.to_string()),
        category_id: Some(category_id.to_string()),
        location: Some(city_hall()),
        classification: Some(classification),
        time_notes: None,
    })
    .collect()
}
