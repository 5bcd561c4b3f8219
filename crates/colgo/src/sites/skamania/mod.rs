//! Skamania County, Washington. Agendas live in the county document center,
//! one folder per board and usually one subfolder per year; the meeting date
//! only appears in each document's name.

mod parser;
mod spider;

pub use spider::{SkamaniaConfig, SkamaniaSpider};

use crate::types::Location;

pub(crate) const MAIN_URL: &str = "https://www.skamaniacounty.org/departments-offices/commissioners";

/// The document center rejects requests that do not look like a browser.
pub(crate) const HEADERS: [(&str, &str); 12] = [
    (
        "Accept",
        "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8",
    ),
    ("Accept-Language", "en-US,en;q=0.9"),
    ("Priority", "u=0, i"),
    (
        "Sec-Ch-Ua",
        "\"Google Chrome\";v=\"143\", \"Chromium\";v=\"143\", \"Not A(Brand\";v=\"24\"",
    ),
    ("Sec-Ch-Ua-Mobile", "?1"),
    ("Sec-Ch-Ua-Platform", "\"Android\""),
    ("Sec-Fetch-Dest", "document"),
    ("Sec-Fetch-Mode", "navigate"),
    ("Sec-Fetch-Site", "none"),
    ("Sec-Fetch-User", "?1"),
    ("Upgrade-Insecure-Requests", "1"),
    (
        "User-Agent",
        "Mozilla/5.0 (Linux; Android 6.0; Nexus 5 Build/MRA58N) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/143.0.0.0 Mobile Safari/537.36",
    ),
];

fn courthouse() -> Location {
    Location::new(
        "Skamania County Courthouse",
        "240 NW Vancouver Ave., Stevenson, WA 98648",
    )
}

pub fn configs() -> Vec<SkamaniaConfig> {
    [
        (
            "colgo_ska_bocc",
            "Board of County Commissioners",
            "agendas-minutes-meeting-audio/-folder-36#docfold_2924_1241_328_36",
            "The public is invited to attend the Skamania County Board of Commissioners (BOCC) \
             meetings in person or remotely via Zoom. The Board holds its regular business \
             meeting every Tuesday beginning at 9:30 a.m. in the boardroom on the lower level \
             of the Skamania County Courthouse. Please refer to the meeting agenda for the \
             meeting start time.",
        ),
        (
            "colgo_ska_boh",
            "Board of Health",
            "board-of-health/-folder-162#docfold_2001_2047_350_162",
            "The Board of Health typically meets on the second Tuesday of each month in the \
             Commissioners' Boardroom, located on the lower level of the Skamania County \
             Courthouse. Please refer to the meeting agenda for the meeting start time.",
        ),
        (
            "colgo_ska_emsb",
            "Board of EMS District #1",
            "board-of-ems-district-1/-folder-619#docfold_2001_3132_1205_619",
            "The Skamania County Board of EMS District #1 meets annually on the second Tuesday \
             of June in the Commissioners' boardroom on the bottom floor of the Skamania County \
             Courthouse. Please refer to the meeting agenda for the meeting start time.",
        ),
    ]
    .into_iter()
    .map(|(name, agency, agenda_param, time_notes)| SkamaniaConfig {
        name: Some(name.to_string()),
        agency: Some(agency.to_string()),
        agenda_param: Some(agenda_param.to_string()),
        location: Some(courthouse()),
        time_notes: Some(time_notes.to_string()),
        start_time: None,
    })
    .collect()
}
