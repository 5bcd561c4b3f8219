//! Columbia River Gorge Commission. Upcoming and archived meetings are
//! listed as blog-style entries on the commission site.

mod parser;
mod spider;

pub use spider::{ColumbiaCommissionConfig, ColumbiaCommissionSpider};

use crate::types::Location;

pub(crate) const BASE_URL: &str = "https://www.gorgecommission.org";

pub(crate) const LISTING_PATHS: [&str; 2] = ["/about-crgc/commission-meetings", "/meeting/archived"];

pub fn configs() -> Vec<ColumbiaCommissionConfig> {
    vec![ColumbiaCommissionConfig {
        name: Some("colgo_columbia_commission".to_string()),
        agency: Some("Columbia River Gorge Commission".to_string()),
        location: Some(Location::new("via Zoom webinar", "White Salmon, WA")),
        time_notes: Some(
            "For meeting time and registration details, please check the Agenda.".to_string(),
        ),
    }]
}
