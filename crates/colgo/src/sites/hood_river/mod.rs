//! City of Hood River, Oregon. Meetings come from the EventON calendar on the
//! city website; recordings come from a separate OmpNetwork site and are
//! matched to events by date and title.

mod parser;
mod spider;

pub use spider::{HoodRiverConfig, HoodRiverSpider};

use crate::types::{Classification, Location};

pub(crate) const SITE_URL: &str = "https://cityofhoodriver.gov";
pub(crate) const CALENDAR_URL: &str = "https://cityofhoodriver.gov/administration/meetings/";
pub(crate) const EVENTS_URL: &str = "https://cityofhoodriver.gov/?evo-ajax=eventon_get_events";
pub(crate) const VIDEO_BASE_URL: &str = "https://cityofhoodriver.ompnetwork.org";
pub(crate) const VIDEO_SITE_ID: &str = "1713";
pub(crate) const FIRST_YEAR: i32 = 2019;

/// Most specific names first.
pub(crate) const CLASSIFICATIONS: [(&str, Classification); 9] = [
    ("Urban Renewal Advisory Committee", Classification::AdvisoryCommittee),
    ("Mayor's Equity Advisory Group", Classification::AdvisoryCommittee),
    ("City Budget Committee", Classification::Committee),
    ("City Tree Committee", Classification::Committee),
    ("Urban Renewal Agency", Classification::Committee),
    ("Planning Commission", Classification::Commission),
    ("Landmarks Review Board", Classification::Board),
    ("Landmark Review Board", Classification::Board),
    ("City Council", Classification::CityCouncil),
];

fn city_hall() -> Location {
    Location::new("Hood River City Hall", "211 2nd Street, Hood River, OR 97031")
}

pub fn configs() -> Vec<HoodRiverConfig> {
    [
        ("colgo_hood_river_city_budget_committee", "Hood River City Budget Committee", "Budget"),
        ("colgo_hood_river_city_council", "Hood River City Council", "City Council"),
        ("colgo_hood_river_tree_committee", "Hood River City Tree Committee", "Tree Committee"),
        (
            "colgo_hood_river_planning_commission",
            "Hood River Planning Commission",
            "Planning Commission",
        ),
        (
            "colgo_hood_river_urban_renewal_advisory",
            "Hood River Urban Renewal Advisory Committee",
            "Urban Renewal Advisory",
        ),
        (
            "colgo_hood_river_urban_renewal_agency",
            "Hood River Urban Renewal Agency",
            "Urban Renewal Agency",
        ),
        ("colgo_hood_river_landmark_review", "Hood River Landmark Review Board", "Landmark"),
        (
            "colgo_hood_river_equity_advisory",
            "Hood River Mayor's Equity Advisory Group",
            "Equity Advisory",
        ),
    ]
    .into_iter()
    .map(|(name, agency, filter)| HoodRiverConfig {
        name: Some(name.to_string()),
        agency: Some(agency.to_string()),
        event_type: Some(String::new()),
        title_filter: vec![filter.to_string()],
    })
    .collect()
}
