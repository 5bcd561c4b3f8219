//! Stevenson, Washington. A paged Drupal table of meetings, one row per
//! meeting with a column for each document.

mod parser;
mod spider;

pub use spider::{StevensonConfig, StevensonSpider};

use crate::types::{Classification, Location};

pub(crate) const SITE_URL: &str = "https://www.ci.stevenson.wa.us";

pub(crate) fn meetings_url(board_id: u32) -> String {
    format!("{}/meetings?field_microsite_tid_1={}", SITE_URL, board_id)
}

fn city_hall() -> Location {
    Location::new(
        "Stevenson City Hall Council Chambers",
        "7121 East Loop Road, Stevenson, WA 98648",
    )
}

pub fn configs() -> Vec<StevensonConfig> {
    [
        (
            "colgo_stevenson_city_council",
            "Stevenson City Council",
            27,
            Classification::CityCouncil,
            "With the exception of executive session meetings, Council meetings are open to \
             the public, with opportunity for the public to speak. For all comments and \
             testimony, speakers are asked to limit statements to about three minutes in order \
             to allow as many people as possible the chance to address Council.",
        ),
        (
            "colgo_stevenson_planning",
            "Stevenson Planning Commission",
            28,
            Classification::Commission,
            "Commission meetings are open to the public, with opportunity for the public to \
             speak. For all comments and testimony, speakers are asked to limit statements to \
             about three minutes in order to allow as many people as possible the chance to \
             address Commission.",
        ),
    ]
    .into_iter()
    .map(
        |(name, agency, board_id, classification, description)| StevensonConfig {
            name: Some(name.to_string()),
            agency: Some(agency.to_string()),
            board_id: Some(board_id),
            classification: Some(classification),
            location: Some(city_hall()),
            description: Some(description.to_string()),
        },
    )
    .collect()
}
