//! White Salmon, Washington. A Drupal calendar with one month view per
//! filter; each entry links to a meeting page holding the documents.

mod parser;
mod spider;

pub use spider::{WhiteSalmonConfig, WhiteSalmonSpider};

use crate::types::{Classification, Location};

pub(crate) const SITE_URL: &str = "https://www.whitesalmonwa.gov";

/// Months of history requested before the current month.
pub(crate) const YEARS_BACK: u32 = 3;
pub(crate) const MONTHS_AHEAD: u32 = 12;

pub(crate) fn calendar_url(month: &str, agency_id: &str) -> String {
    format!(
        "{}/calendar/month/{}?field_microsite_tid=All&field_microsite_tid_1={}",
        SITE_URL, month, agency_id
    )
}

fn council_chambers() -> Location {
    Location::new(
        "City's Council Chambers",
        "119 NE Church Ave, White Salmon, WA 98672",
    )
}

pub fn configs() -> Vec<WhiteSalmonConfig> {
    [
        (
            "colgo_white_salmon_city_council",
            "City Council of White Salmon",
            "27",
            "city-council",
            Classification::CityCouncil,
        ),
        (
            "colgo_white_salmon_planning",
            "White Salmon Planning Commission",
            "28",
            "",
            Classification::Commission,
        ),
        (
            "colgo_white_salmon_civil_service",
            "White Salmon Civil Service Commission",
            "231",
            "",
            Classification::Commission,
        ),
    ]
    .into_iter()
    .map(
        |(name, agency, agency_id, meeting_keyword, classification)| WhiteSalmonConfig {
            name: Some(name.to_string()),
            agency: Some(agency.to_string()),
            agency_id: Some(agency_id.to_string()),
            meeting_keyword: Some(meeting_keyword.to_string()),
            classification: Some(classification),
            location: Some(council_chambers()),
            description: None,
        },
    )
    .collect()
}
