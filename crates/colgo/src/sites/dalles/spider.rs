use super::parser::{parse_links, parse_source, parse_start, parse_title};
use super::{BASE_URL, SITE_ID};
use crate::config::{ConfigError, non_empty};
use crate::engine::{Callback, CrawlContext, FetchRequest, FetchResponse, ParseOutput, Spider};
use crate::omp::{OmpPage, sessions_url};
use crate::parser::{ParseError, meeting_status};
use crate::types::{Classification, Location, MeetingDraft};

#[derive(Debug, Clone, Default)]
pub struct DallesConfig {
    pub name: Option<String>,
    pub agency: Option<String>,
    pub category_id: Option<String>,
    pub location: Option<Location>,
    pub classification: Option<Classification>,
    pub time_notes: Option<String>,
}

impl DallesConfig {
    pub fn build(self) -> Result<DallesSpider, ConfigError> {
        let name = non_empty(self.name);
        let agency = non_empty(self.agency);
        let category_id = non_empty(self.category_id);
        match (name, agency, category_id, self.location, self.classification) {
            (Some(name), Some(agency), Some(category_id), Some(location), Some(classification)) => {
                Ok(DallesSpider {
                    name,
                    agency,
                    category_id,
                    location,
                    classification,
                    time_notes: self.time_notes.unwrap_or_default(),
                })
            }
            (name, agency, category_id, location, classification) => Err(ConfigError::missing(
                name.as_deref(),
                &[
                    ("agency", agency.is_none()),
                    ("name", name.is_none()),
                    ("category_id", category_id.is_none()),
                    ("location", location.is_none()),
                    ("classification", classification.is_none()),
                ],
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct DallesSpider {
    name: String,
    agency: String,
    category_id: String,
    location: Location,
    classification: Classification,
    time_notes: String,
}

impl DallesSpider {
    pub fn category_id(&self) -> &str {
        &self.category_id
    }

    pub fn classification(&self) -> Classification {
        self.classification
    }

    fn api_url(&self, start: i64) -> String {
        sessions_url(BASE_URL, SITE_ID, Some(&self.category_id), start)
    }
}

impl Spider for DallesSpider {
    fn name(&self) -> &str {
        &self.name
    }

    fn agency(&self) -> &str {
        &self.agency
    }

    fn family(&self) -> &'static str {
        "ompnetwork"
    }

    fn start_requests(&self, _ctx: &CrawlContext) -> Vec<FetchRequest> {
        vec![FetchRequest::get(self.api_url(0))]
    }

    fn parse(
        &self,
        _callback: Callback,
        response: &FetchResponse,
        ctx: &mut CrawlContext,
    ) -> Result<ParseOutput, ParseError> {
        let page: OmpPage = response
            .json()
            .inspect_err(|e| log::error!("Invalid session listing from {}: {}", response.url, e))?;
        log::info!(
            "{}: {} session(s) at offset {}",
            self.name,
            page.results.len(),
            page.start.unwrap_or(0)
        );

        let fallback_source = self.api_url(0);
        let mut output = ParseOutput::default();
        for session in &page.results {
            let Some(start) = parse_start(session) else {
                log::warn!(
                    "{}: dropping session without a date: {:?}",
                    self.name,
                    session.title
                );
                continue;
            };
            let draft = MeetingDraft {
                title: parse_title(session, &self.agency),
                description: String::new(),
                classification: self.classification,
                start,
                end: None,
                all_day: false,
                time_notes: self.time_notes.clone(),
                location: self.location.clone(),
                links: parse_links(session),
                source: parse_source(session, &fallback_source),
            };
            let status = meeting_status(&draft, ctx.now(), "");
            output.meetings.push(draft.into_meeting(&self.name, status));
        }

        if let Some(next) = page.next_start() {
            output.requests.push(FetchRequest::get(self.api_url(next)));
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::NaiveDate;

    use super::*;
    use crate::scraper::Crawler;
    use crate::scraper::testing::StaticFetcher;
    use crate::sites::dalles::configs;
    use crate::types::Status;

    fn council() -> DallesSpider {
        configs()
            .into_iter()
            .next()
            .expect("city council config")
            .build()
            .expect("valid config")
    }

    fn frozen_now() -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 12, 16)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn parse_fixture() -> ParseOutput {
        let body = fs::read_to_string("fixtures/dalles_city_council.json")
            .expect("Failed to read dalles_city_council.json fixture");
        let spider = council();
        let response = FetchResponse::new(spider.api_url(0), body);
        let mut ctx = CrawlContext::new(frozen_now());
        spider
            .parse(Callback::Parse, &response, &mut ctx)
            .expect("Failed to parse session listing")
    }

    #[test]
    fn test_parse_city_council_listing() {
        let output = parse_fixture();
        let meetings = &output.meetings;
        assert_eq!(meetings.len(), 101);
        assert!(output.requests.is_empty(), "single page fixture has no next page");

        let first = &meetings[0];
        println!("{}", first);
        assert_eq!(first.title, "City Council Meeting January 12, 2026");
        assert_eq!(first.description, "");
        assert_eq!(first.classification, Classification::CityCouncil);
        assert_eq!(
            first.start,
            NaiveDate::from_ymd_opt(2026, 1, 12)
                .unwrap()
                .and_hms_opt(17, 30, 0)
                .unwrap()
        );
        assert!(first.end.is_none());
        assert!(!first.all_day);
        assert_eq!(first.time_notes, "");
        assert_eq!(
            first.id,
            "colgo_dalles_city_council/202601121730/x/city_council_meeting_january_12_2026"
        );
        assert_eq!(first.status, Status::Tentative);
        assert_eq!(meetings[1].status, Status::Passed);
        assert_eq!(
            first.location,
            Location::new("The Dalles City Hall", "313 Court St, The Dalles, OR 97058")
        );
        assert_eq!(
            first.source,
            "https://thedalles-oregon.ompnetwork.org/sessions/332148/city-council-meeting-january-12-2026-live-stream"
        );

        let links = first.links.as_slice();
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].title, "Agenda");
        assert_eq!(links[1].title, "Packet");
        assert!(links[0].href.contains("cc_2026-01-12_city_council_agenda.pdf"));
    }

    #[test]
    fn test_every_meeting_has_unique_link_hrefs() {
        for meeting in parse_fixture().meetings {
            let mut hrefs: Vec<&str> = meeting.links.iter().map(|l| l.href.as_str()).collect();
            let before = hrefs.len();
            hrefs.sort();
            hrefs.dedup();
            assert_eq!(hrefs.len(), before, "duplicate href in {}", meeting.id);
            assert!(!meeting.title.to_lowercase().contains("live stream"));
        }
    }

    #[test]
    fn test_configs_build() {
        let spiders: Vec<DallesSpider> = configs()
            .into_iter()
            .map(|c| c.build().expect("valid config"))
            .collect();
        let summary: Vec<(&str, &str, Classification)> = spiders
            .iter()
            .map(|s| (s.name(), s.category_id(), s.classification()))
            .collect();
        assert_eq!(
            summary,
            vec![
                ("colgo_dalles_city_council", "214", Classification::CityCouncil),
                ("colgo_dalles_informational", "215", Classification::NotClassified),
                ("colgo_dalles_planning_commission", "216", Classification::Commission),
                ("colgo_dalles_historic_landmarks", "217", Classification::Commission),
                ("colgo_dalles_urban_renewal", "218", Classification::Board),
            ]
        );
        assert_eq!(spiders[4].agency(), "The Dalles Urban Renewal Agency");
    }

    #[test]
    fn test_config_reports_all_missing_fields() {
        let err = DallesConfig {
            name: Some("colgo_dalles_incomplete".to_string()),
            agency: Some("The Dalles Incomplete".to_string()),
            ..Default::default()
        }
        .build()
        .unwrap_err();
        assert_eq!(err.spider, "colgo_dalles_incomplete");
        assert_eq!(err.missing, vec!["category_id", "location", "classification"]);
    }

    #[tokio::test]
    async fn test_crawl_follows_pages_until_total() {
        let spider = council();
        let page = |start: i64, title: &str, ts: i64| {
            format!(
                r#"{{"results":[{{"title":"{}","date":{},"documents":[]}}],"start":{},"size":1,"totalSize":2}}"#,
                title, ts, start
            )
        };
        let fetcher = StaticFetcher::default()
            .with(&spider.api_url(0), page(0, "City Council Meeting", 1768239000))
            .with(&spider.api_url(1), page(1, "Town Hall - Live Stream", 1765215000));

        let meetings = Crawler::new(&fetcher).at(frozen_now()).run(&spider).await;

        assert_eq!(meetings.len(), 2);
        assert_eq!(fetcher.urls().len(), 2, "stops once start + size reaches the total");
        assert!(meetings.iter().any(|m| m.title == "Town Hall"));
    }
}
