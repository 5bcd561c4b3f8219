use std::time::Duration;

use chrono::{Datelike, Months, NaiveDate};

use super::parser::{calendar_items, parse_links, parse_start, parse_title};
use super::{MONTHS_AHEAD, YEARS_BACK, calendar_url};
use crate::config::{ConfigError, non_empty};
use crate::engine::{
    Callback, CrawlContext, CrawlSettings, FetchRequest, FetchResponse, Meta, ParseOutput, Spider,
};
use crate::parser::{ParseError, meeting_status};
use crate::types::{Classification, Location, MeetingDraft};

#[derive(Debug, Clone, Default)]
pub struct WhiteSalmonConfig {
    pub name: Option<String>,
    pub agency: Option<String>,
    pub agency_id: Option<String>,
    /// Substring a meeting link must contain; empty keeps every link.
    pub meeting_keyword: Option<String>,
    pub classification: Option<Classification>,
    pub location: Option<Location>,
    pub description: Option<String>,
}

impl WhiteSalmonConfig {
    pub fn build(self) -> Result<WhiteSalmonSpider, ConfigError> {
        let name = non_empty(self.name);
        let agency = non_empty(self.agency);
        let agency_id = non_empty(self.agency_id);
        match (
            name,
            agency,
            agency_id,
            self.meeting_keyword,
            self.classification,
            self.location,
        ) {
            (
                Some(name),
                Some(agency),
                Some(agency_id),
                Some(meeting_keyword),
                Some(classification),
                Some(location),
            ) => Ok(WhiteSalmonSpider {
                name,
                agency,
                agency_id,
                meeting_keyword,
                classification,
                location,
                description: self.description.unwrap_or_default(),
            }),
            (name, agency, agency_id, meeting_keyword, classification, location) => {
                Err(ConfigError::missing(
                    name.as_deref(),
                    &[
                        ("agency", agency.is_none()),
                        ("name", name.is_none()),
                        ("agency_id", agency_id.is_none()),
                        ("meeting_keyword", meeting_keyword.is_none()),
                        ("classification", classification.is_none()),
                        ("location", location.is_none()),
                    ],
                ))
            }
        }
    }
}

#[derive(Debug, Clone)]
pub struct WhiteSalmonSpider {
    name: String,
    agency: String,
    agency_id: String,
    meeting_keyword: String,
    classification: Classification,
    location: Location,
    description: String,
}

/// `YYYY-MM` of every month from `YEARS_BACK` years ago through
/// `MONTHS_AHEAD` months after the current one.
fn calendar_months(today: NaiveDate) -> Vec<String> {
    let Some(first) = today
        .with_day(1)
        .and_then(|d| d.checked_sub_months(Months::new(YEARS_BACK * 12)))
    else {
        return Vec::new();
    };
    (0..YEARS_BACK * 12 + 1 + MONTHS_AHEAD)
        .filter_map(|i| first.checked_add_months(Months::new(i)))
        .map(|month| month.format("%Y-%m").to_string())
        .collect()
}

impl WhiteSalmonSpider {
    pub fn agency_id(&self) -> &str {
        &self.agency_id
    }

    fn wants(&self, href: &str) -> bool {
        self.meeting_keyword.is_empty() || href.contains(&self.meeting_keyword)
    }

    fn parse_calendar(&self, response: &FetchResponse) -> ParseOutput {
        let document = response.html();
        let requests = calendar_items(&document)
            .into_iter()
            .filter(|item| self.wants(&item.href))
            .map(|item| {
                FetchRequest::get(response.urljoin(&item.href))
                    .callback(Callback::ParseDetail)
                    .meta(Meta {
                        calendar_start: item.calendar_start,
                        ..Default::default()
                    })
                    .dont_filter()
            })
            .collect::<Vec<_>>();
        log::info!(
            "{}: {} meeting page(s) on {}",
            self.name,
            requests.len(),
            response.url
        );
        ParseOutput::requests(requests)
    }

    fn parse_meeting(&self, response: &FetchResponse, ctx: &CrawlContext) -> ParseOutput {
        let document = response.html();
        let title = parse_title(&document, &self.agency);
        let Some(start) = parse_start(&document, response.meta.calendar_start.as_deref()) else {
            log::warn!("Skipping meeting with no start time: {}", response.url);
            return ParseOutput::default();
        };

        let draft = MeetingDraft {
            title,
            description: self.description.clone(),
            classification: self.classification,
            start,
            end: None,
            all_day: false,
            time_notes: String::new(),
            location: self.location.clone(),
            links: parse_links(&document, &response.url),
            source: response.url.clone(),
        };
        let status = meeting_status(&draft, ctx.now(), &draft.title);
        ParseOutput {
            meetings: vec![draft.into_meeting(&self.name, status)],
            requests: Vec::new(),
        }
    }
}

impl Spider for WhiteSalmonSpider {
    fn name(&self) -> &str {
        &self.name
    }

    fn agency(&self) -> &str {
        &self.agency
    }

    fn family(&self) -> &'static str {
        "drupal-calendar"
    }

    fn settings(&self) -> CrawlSettings {
        CrawlSettings {
            download_delay: Duration::from_secs(2),
            concurrent_requests: 1,
        }
    }

    fn start_requests(&self, ctx: &CrawlContext) -> Vec<FetchRequest> {
        calendar_months(ctx.now().date())
            .iter()
            .map(|month| FetchRequest::get(calendar_url(month, &self.agency_id)))
            .collect()
    }

    fn parse(
        &self,
        callback: Callback,
        response: &FetchResponse,
        ctx: &mut CrawlContext,
    ) -> Result<ParseOutput, ParseError> {
        Ok(match callback {
            Callback::ParseDetail => self.parse_meeting(response, ctx),
            Callback::Parse | Callback::ParseVideos => self.parse_calendar(response),
        })
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::NaiveDateTime;

    use super::*;
    use crate::sites::white_salmon::configs;
    use crate::types::{Link, LinkKind, Status};

    const COUNCIL_URL: &str = "https://www.whitesalmonwa.gov/city-council/page/city-council-meeting-147";
    const WORKSHOP_URL: &str = "https://www.whitesalmonwa.gov/city-council/page/council-workshop-budget";

    fn spider(index: usize) -> WhiteSalmonSpider {
        configs()
            .into_iter()
            .nth(index)
            .expect("white salmon config")
            .build()
            .expect("valid config")
    }

    fn frozen_now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 1, 10)
            .unwrap()
            .and_hms_opt(12, 0, 0)
            .unwrap()
    }

    fn fixture(name: &str) -> String {
        fs::read_to_string(format!("fixtures/{}", name))
            .unwrap_or_else(|e| panic!("Failed to read {} fixture: {}", name, e))
    }

    fn calendar_response() -> FetchResponse {
        FetchResponse::new(
            calendar_url("2025-01", "27"),
            fixture("white_salmon_calendar.html"),
        )
    }

    #[test]
    fn test_calendar_months_window() {
        let months = calendar_months(NaiveDate::from_ymd_opt(2025, 3, 31).unwrap());
        assert_eq!(months.len(), 49);
        assert_eq!(months[0], "2022-03");
        assert_eq!(months[36], "2025-03");
        assert_eq!(months[48], "2026-03");
    }

    #[test]
    fn test_start_requests_and_settings() {
        let council = spider(0);
        let ctx = CrawlContext::new(frozen_now());
        let requests = council.start_requests(&ctx);
        assert_eq!(requests.len(), 49);
        assert_eq!(
            requests[0].url,
            "https://www.whitesalmonwa.gov/calendar/month/2022-01?field_microsite_tid=All&field_microsite_tid_1=27"
        );
        assert_eq!(requests[0].callback, Callback::Parse);
        assert_eq!(council.settings().concurrent_requests, 1);
        assert_eq!(council.settings().download_delay, Duration::from_secs(2));
    }

    #[test]
    fn test_calendar_follows_keyword_links() {
        let mut ctx = CrawlContext::new(frozen_now());
        let output = spider(0)
            .parse(Callback::Parse, &calendar_response(), &mut ctx)
            .expect("calendar page parses");

        assert!(output.meetings.is_empty());
        let urls: Vec<&str> = output.requests.iter().map(|r| r.url.as_str()).collect();
        assert_eq!(urls, vec![COUNCIL_URL, WORKSHOP_URL]);
        assert!(output.requests.iter().all(|r| r.dont_filter));
        assert!(output.requests.iter().all(|r| r.callback == Callback::ParseDetail));
        assert_eq!(
            output.requests[0].meta.calendar_start.as_deref(),
            Some("2025-01-07T18:00:00-08:00")
        );
        assert_eq!(output.requests[1].meta.calendar_start, None);

        let planning = spider(1)
            .parse(Callback::Parse, &calendar_response(), &mut ctx)
            .expect("calendar page parses");
        assert_eq!(planning.requests.len(), 3, "an empty keyword keeps every link");
    }

    #[test]
    fn test_parse_council_meeting() {
        let council = spider(0);
        let mut ctx = CrawlContext::new(frozen_now());
        let response = FetchResponse::new(COUNCIL_URL, fixture("white_salmon_meeting.html")).with_meta(Meta {
            calendar_start: Some("2025-01-07T18:00:00-08:00".to_string()),
            ..Default::default()
        });
        let output = council
            .parse(Callback::ParseDetail, &response, &mut ctx)
            .expect("meeting page parses");

        let meeting = &output.meetings[0];
        println!("{}", meeting);
        assert_eq!(meeting.title, "City Council Meeting");
        assert_eq!(meeting.description, "");
        assert_eq!(meeting.classification, Classification::CityCouncil);
        assert_eq!(
            meeting.start,
            NaiveDate::from_ymd_opt(2025, 1, 7)
                .unwrap()
                .and_hms_opt(18, 0, 0)
                .unwrap()
        );
        assert_eq!(meeting.end, None);
        assert_eq!(meeting.status, Status::Passed);
        assert_eq!(meeting.id, "colgo_white_salmon_city_council/202501071800/x/city_council_meeting");
        assert_eq!(meeting.source, COUNCIL_URL);
        assert_eq!(
            meeting.location,
            Location::new("City's Council Chambers", "119 NE Church Ave, White Salmon, WA 98672")
        );
        assert_eq!(meeting.links.len(), 4);
        assert_eq!(
            meeting.links.as_slice()[2],
            Link::new("https://www.youtube.com/watch?v=Wsc2025jan07", LinkKind::Video)
        );
    }

    #[test]
    fn test_parse_cancelled_workshop_from_page_date() {
        let mut ctx = CrawlContext::new(frozen_now());
        let response = FetchResponse::new(WORKSHOP_URL, fixture("white_salmon_workshop.html"));
        let output = spider(0)
            .parse(Callback::ParseDetail, &response, &mut ctx)
            .expect("meeting page parses");

        let meeting = &output.meetings[0];
        assert_eq!(meeting.title, "Council Workshop - Budget - CANCELLED");
        assert_eq!(
            meeting.start,
            NaiveDate::from_ymd_opt(2025, 1, 15)
                .unwrap()
                .and_hms_opt(17, 0, 0)
                .unwrap()
        );
        assert_eq!(meeting.status, Status::Cancelled);
        assert!(meeting.links.is_empty());
    }

    #[test]
    fn test_page_without_date_is_dropped() {
        let mut ctx = CrawlContext::new(frozen_now());
        let response = FetchResponse::new(
            WORKSHOP_URL,
            "<html><body><h1 id=\"page-title\">Council Retreat</h1></body></html>",
        );
        let output = spider(0)
            .parse(Callback::ParseDetail, &response, &mut ctx)
            .expect("meeting page parses");
        assert!(output.meetings.is_empty());
    }

    #[test]
    fn test_config_allows_empty_keyword_but_not_missing() {
        assert!(configs().into_iter().all(|c| c.build().is_ok()));

        let err = WhiteSalmonConfig {
            name: Some("colgo_white_salmon_parks".to_string()),
            agency: Some("White Salmon Parks Board".to_string()),
            agency_id: Some("".to_string()),
            ..Default::default()
        }
        .build()
        .unwrap_err();
        assert_eq!(err.spider, "colgo_white_salmon_parks");
        assert_eq!(
            err.missing,
            vec!["agency_id", "meeting_keyword", "classification", "location"]
        );
    }
}
