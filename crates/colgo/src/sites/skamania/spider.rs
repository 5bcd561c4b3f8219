use chrono::NaiveTime;

use super::parser::{breadcrumb_year, document_links, extract_dates, is_folder};
use super::{HEADERS, MAIN_URL};
use crate::config::{ConfigError, non_empty};
use crate::engine::{
    Callback, CrawlContext, FetchRequest, FetchResponse, Meta, ParseOutput, Spider,
};
use crate::parser::{ParseError, meeting_status};
use crate::types::{Classification, Link, LinkKind, Links, Location, MeetingDraft};

#[derive(Debug, Clone, Default)]
pub struct SkamaniaConfig {
    pub name: Option<String>,
    pub agency: Option<String>,
    /// Document center path below the commissioners page.
    pub agenda_param: Option<String>,
    pub location: Option<Location>,
    pub time_notes: Option<String>,
    /// Defaults to midnight; agendas carry no time.
    pub start_time: Option<NaiveTime>,
}

impl SkamaniaConfig {
    pub fn build(self) -> Result<SkamaniaSpider, ConfigError> {
        let name = non_empty(self.name);
        let agency = non_empty(self.agency);
        let agenda_param = non_empty(self.agenda_param);
        match (name, agency, agenda_param, self.location, self.time_notes) {
            (Some(name), Some(agency), Some(agenda_param), Some(location), Some(time_notes)) => {
                Ok(SkamaniaSpider {
                    name,
                    agency,
                    agenda_param,
                    location,
                    time_notes,
                    start_time: self.start_time.unwrap_or(NaiveTime::MIN),
                })
            }
            (name, agency, agenda_param, location, time_notes) => Err(ConfigError::missing(
                name.as_deref(),
                &[
                    ("agency", agency.is_none()),
                    ("name", name.is_none()),
                    ("agenda_param", agenda_param.is_none()),
                    ("location", location.is_none()),
                    ("time_notes", time_notes.is_none()),
                ],
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct SkamaniaSpider {
    name: String,
    agency: String,
    agenda_param: String,
    location: Location,
    time_notes: String,
    start_time: NaiveTime,
}

impl SkamaniaSpider {
    pub fn start_url(&self) -> String {
        format!("{}/{}", MAIN_URL, self.agenda_param)
    }

    fn folder_request(url: String, folder_year: Option<i32>) -> FetchRequest {
        FetchRequest::get(url).headers(&HEADERS).meta(Meta {
            folder_year,
            ..Default::default()
        })
    }
}

impl Spider for SkamaniaSpider {
    fn name(&self) -> &str {
        &self.name
    }

    fn agency(&self) -> &str {
        &self.agency
    }

    fn family(&self) -> &'static str {
        "document-center"
    }

    fn start_requests(&self, _ctx: &CrawlContext) -> Vec<FetchRequest> {
        vec![Self::folder_request(self.start_url(), None)]
    }

    fn parse(
        &self,
        _callback: Callback,
        response: &FetchResponse,
        ctx: &mut CrawlContext,
    ) -> Result<ParseOutput, ParseError> {
        let document = response.html();
        let folder_year = breadcrumb_year(&document).or(response.meta.folder_year);
        let mut output = ParseOutput::default();

        for link in document_links(&document) {
            let href = response.urljoin(&link.href);
            if is_folder(&href) {
                log::debug!("{}: descending into folder '{}'", self.name, link.text);
                output.requests.push(Self::folder_request(href, folder_year));
                continue;
            }

            let is_special = link.text.to_lowercase().contains("special");
            for date in extract_dates(&link.text, folder_year) {
                if !ctx.seen_dates.insert((date, is_special)) {
                    continue;
                }
                let title = if is_special {
                    format!("{} - Special Meeting", self.agency)
                } else {
                    self.agency.clone()
                };
                let mut links = Links::new();
                links.push(Link::new(href.clone(), LinkKind::Agenda));

                let draft = MeetingDraft {
                    title,
                    description: String::new(),
                    classification: Classification::Board,
                    start: date.and_time(self.start_time),
                    end: None,
                    all_day: false,
                    time_notes: self.time_notes.clone(),
                    location: self.location.clone(),
                    links,
                    source: MAIN_URL.to_string(),
                };
                let status = meeting_status(&draft, ctx.now(), &link.text);
                output.meetings.push(draft.into_meeting(&self.name, status));
            }
        }
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::{NaiveDate, NaiveDateTime};

    use super::*;
    use crate::scraper::Crawler;
    use crate::scraper::testing::StaticFetcher;
    use crate::sites::skamania::configs;
    use crate::types::Status;

    const FIXTURE_URL: &str = "https://www.skamaniacounty.org/departments-offices/commissioners/agendas-minutes-meeting-audio/-folder-746#docfold_2924_1241_328_746";
    const ARCHIVE_URL: &str = "https://www.skamaniacounty.org/departments-offices/commissioners/agendas-minutes-meeting-audio/-folder-750#docfold_2924_1241_328_750";

    fn bocc() -> SkamaniaSpider {
        configs()
            .into_iter()
            .next()
            .expect("bocc config")
            .build()
            .expect("valid config")
    }

    fn frozen_now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, 10)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    fn fixture() -> String {
        fs::read_to_string("fixtures/skamania_bocc.html")
            .expect("Failed to read skamania_bocc.html fixture")
    }

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_parse_bocc_folder() {
        let spider = bocc();
        let mut ctx = CrawlContext::new(frozen_now());
        let output = spider
            .parse(Callback::Parse, &FetchResponse::new(FIXTURE_URL, fixture()), &mut ctx)
            .expect("Failed to parse document folder");

        let first = &output.meetings[0];
        println!("{}", first);
        assert_eq!(first.title, "Board of County Commissioners");
        assert_eq!(first.description, "");
        assert_eq!(first.start, at(2026, 1, 13));
        assert!(first.end.is_none());
        assert_eq!(first.time_notes, spider.time_notes);
        assert!(first.time_notes.starts_with("The public is invited to attend"));
        assert_eq!(first.id, "colgo_ska_bocc/202601130000/x/board_of_county_commissioners");
        assert_eq!(first.status, Status::Tentative);
        assert_eq!(
            first.location,
            Location::new(
                "Skamania County Courthouse",
                "240 NW Vancouver Ave., Stevenson, WA 98648"
            )
        );
        assert_eq!(first.source, "https://www.skamaniacounty.org/departments-offices/commissioners");
        assert_eq!(
            first.links.as_slice(),
            [Link::new(
                "https://www.skamaniacounty.org/home/showpublisheddocument/17384",
                LinkKind::Agenda
            )]
        );
        assert_eq!(first.classification, Classification::Board);
        assert!(!first.all_day);
    }

    #[test]
    fn test_special_range_duplicate_and_cancelled() {
        let spider = bocc();
        let mut ctx = CrawlContext::new(frozen_now());
        let output = spider
            .parse(Callback::Parse, &FetchResponse::new(FIXTURE_URL, fixture()), &mut ctx)
            .expect("Failed to parse document folder");
        let summary: Vec<(String, NaiveDateTime, Status)> = output
            .meetings
            .iter()
            .map(|m| (m.title.clone(), m.start, m.status))
            .collect();
        let bocc = "Board of County Commissioners".to_string();

        assert_eq!(
            summary,
            vec![
                (bocc.clone(), at(2026, 1, 13), Status::Tentative),
                (format!("{} - Special Meeting", bocc), at(2026, 1, 13), Status::Tentative),
                (bocc.clone(), at(2026, 1, 6), Status::Passed),
                (bocc.clone(), at(2026, 1, 20), Status::Tentative),
                (bocc.clone(), at(2026, 1, 21), Status::Tentative),
                (bocc.clone(), at(2026, 1, 22), Status::Tentative),
                (bocc.clone(), at(2026, 1, 27), Status::Cancelled),
            ]
        );

        assert_eq!(output.requests.len(), 1);
        assert_eq!(output.requests[0].url, ARCHIVE_URL);
        assert_eq!(output.requests[0].meta.folder_year, Some(2026));
        assert!(
            output.requests[0]
                .headers
                .iter()
                .any(|(k, v)| k == "Sec-Fetch-Mode" && v == "navigate")
        );
    }

    #[tokio::test]
    async fn test_crawl_descends_into_folders() {
        let spider = bocc();
        let archive = r#"<div class="document_breadcrumb"><a href="/x/-folder-36">Agendas</a><a href="/x/-folder-750">2025 Archive</a></div>
            <ul><li><a class="content_link" href="/home/showpublisheddocument/16001">BOCC Agenda 12/30/25</a></li>
            <li><a class="content_link" href="/home/showpublisheddocument/16002">BOCC Agenda 1/13/25</a></li></ul>"#;
        let fetcher = StaticFetcher::default()
            .with(&spider.start_url(), fixture())
            .with(ARCHIVE_URL, archive);

        let meetings = Crawler::new(&fetcher).at(frozen_now()).run(&spider).await;

        assert_eq!(fetcher.urls(), vec![spider.start_url(), ARCHIVE_URL.to_string()]);
        let archived: Vec<&str> = meetings
            .iter()
            .filter(|m| m.start.format("%Y").to_string() == "2025")
            .map(|m| m.links.as_slice()[0].href.as_str())
            .collect();
        assert_eq!(
            archived,
            vec![
                "https://www.skamaniacounty.org/home/showpublisheddocument/16001",
                "https://www.skamaniacounty.org/home/showpublisheddocument/16002"
            ],
            "archive breadcrumb year applies to its own documents"
        );
        assert_eq!(meetings.len(), 9);
    }

    #[test]
    fn test_config_requires_fields() {
        let err = SkamaniaConfig {
            agency: Some("Board of Health".to_string()),
            ..Default::default()
        }
        .build()
        .unwrap_err();
        assert_eq!(err.spider, "<unnamed spider>");
        assert_eq!(err.missing, vec!["name", "agenda_param", "location", "time_notes"]);
    }
}
