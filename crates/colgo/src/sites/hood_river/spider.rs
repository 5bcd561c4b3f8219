use chrono::{Datelike, NaiveDate, NaiveDateTime};
use serde_json::Value;

use super::parser::{calendar_html, parse_events};
use super::{
    CALENDAR_URL, CLASSIFICATIONS, EVENTS_URL, FIRST_YEAR, SITE_URL, VIDEO_BASE_URL,
    VIDEO_SITE_ID, city_hall,
};
use crate::config::{ConfigError, non_empty};
use crate::engine::{
    Callback, CrawlContext, FetchRequest, FetchResponse, Meta, ParseOutput, Spider,
};
use crate::omp::{OmpPage, PAGE_SIZE, sessions_url};
use crate::parser::{ParseError, classify, meeting_status};
use crate::types::{Meeting, MeetingDraft, Status};
use crate::video::VideoCache;

#[derive(Debug, Clone, Default)]
pub struct HoodRiverConfig {
    pub name: Option<String>,
    pub agency: Option<String>,
    /// EventON event type id; an empty id asks for every type.
    pub event_type: Option<String>,
    /// Case-insensitive substrings; an event is kept when any one matches.
    pub title_filter: Vec<String>,
}

impl HoodRiverConfig {
    pub fn build(self) -> Result<HoodRiverSpider, ConfigError> {
        let name = non_empty(self.name);
        let agency = non_empty(self.agency);
        match (name, agency, self.event_type) {
            (Some(name), Some(agency), Some(event_type)) => Ok(HoodRiverSpider {
                name,
                agency,
                event_type,
                title_filter: self.title_filter,
            }),
            (name, agency, event_type) => Err(ConfigError::missing(
                name.as_deref(),
                &[
                    ("agency", agency.is_none()),
                    ("name", name.is_none()),
                    ("event_type", event_type.is_none()),
                ],
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct HoodRiverSpider {
    name: String,
    agency: String,
    event_type: String,
    title_filter: Vec<String>,
}

impl HoodRiverSpider {
    pub fn title_filter(&self) -> &[String] {
        &self.title_filter
    }

    fn matches_filter(&self, title: &str) -> bool {
        let title = title.to_lowercase();
        self.title_filter.is_empty()
            || self
                .title_filter
                .iter()
                .any(|term| title.contains(&term.to_lowercase()))
    }

    fn video_request(offset: i64) -> FetchRequest {
        FetchRequest::get(sessions_url(VIDEO_BASE_URL, VIDEO_SITE_ID, None, offset))
            .callback(Callback::ParseVideos)
            .meta(Meta {
                offset: Some(offset),
                ..Default::default()
            })
            .dont_filter()
    }

    fn form_data(&self, year: i32) -> Vec<(String, String)> {
        let timestamp = |date: Option<NaiveDate>, h, m, s| {
            date.and_then(|d| d.and_hms_opt(h, m, s))
                .map(|dt| dt.and_utc().timestamp())
                .unwrap_or_default()
        };
        let start = timestamp(NaiveDate::from_ymd_opt(year, 1, 1), 0, 0, 0);
        let end = timestamp(NaiveDate::from_ymd_opt(year, 12, 31), 23, 59, 59);
        let event_type = if self.event_type.is_empty() {
            "all"
        } else {
            self.event_type.as_str()
        };

        [
            ("ajaxtype", "jumper".to_string()),
            ("direction", "none".to_string()),
            ("shortcode[fixed_month]", "1".to_string()),
            ("shortcode[fixed_year]", year.to_string()),
            ("shortcode[focus_start_date_range]", start.to_string()),
            ("shortcode[focus_end_date_range]", end.to_string()),
            ("shortcode[event_type]", event_type.to_string()),
            ("shortcode[number_of_months]", "12".to_string()),
            ("shortcode[event_past_future]", "all".to_string()),
            ("shortcode[hide_past]", "no".to_string()),
            ("shortcode[hide_cancels]", "no".to_string()),
            ("shortcode[event_order]", "ASC".to_string()),
            ("shortcode[sort_by]", "sort_date".to_string()),
            ("shortcode[calendar_type]", "default".to_string()),
            ("shortcode[_cver]", "4.5.3".to_string()),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v))
        .collect()
    }

    /// One calendar request per year, from the first archived year through next year.
    fn event_requests(&self, now: NaiveDateTime) -> Vec<FetchRequest> {
        (FIRST_YEAR..=now.year() + 1)
            .map(|year| {
                FetchRequest::post_form(EVENTS_URL, self.form_data(year))
                    .header("Referer", CALENDAR_URL)
                    .meta(Meta {
                        year: Some(year),
                        ..Default::default()
                    })
            })
            .collect()
    }

    /// Accumulates one page of video sessions. The calendar requests go out
    /// once every page has been seen, failed pages included.
    fn video_page(&self, offset: i64, page: Option<OmpPage>, ctx: &mut CrawlContext) -> ParseOutput {
        if offset == 0 {
            let Some(page) = page else {
                ctx.videos.set_cache(VideoCache::new());
                return ParseOutput::requests(self.event_requests(ctx.now()));
            };
            let total = page.total_size.unwrap_or(0);
            ctx.videos.add_sessions(page.results);

            let step = i64::from(PAGE_SIZE);
            let offsets: Vec<i64> = (1..).map(|n| n * step).take_while(|o| *o < total).collect();
            if offsets.is_empty() {
                ctx.videos.finish();
                return ParseOutput::requests(self.event_requests(ctx.now()));
            }
            log::info!("{}: fetching {} more video page(s)", self.name, offsets.len());
            ctx.videos.expect_pages(offsets.len());
            return ParseOutput::requests(offsets.into_iter().map(Self::video_request).collect());
        }

        if let Some(page) = page {
            ctx.videos.add_sessions(page.results);
        }
        if ctx.videos.page_done() {
            ctx.videos.finish();
            return ParseOutput::requests(self.event_requests(ctx.now()));
        }
        ParseOutput::default()
    }

    fn meetings_from_html(&self, html: &str, ctx: &CrawlContext) -> Vec<Meeting> {
        let mut meetings = Vec::new();
        for event in parse_events(html, SITE_URL) {
            if event.title.is_empty() || !self.matches_filter(&event.title) {
                continue;
            }
            let Some(start) = event.start else {
                log::warn!("{}: dropping '{}' without a start time", self.name, event.title);
                continue;
            };

            let mut links = event.links;
            if let Some(cache) = ctx.videos.cache() {
                cache.attach(&mut links, start.date(), &event.title);
            }

            let draft = MeetingDraft {
                classification: classify(&event.title, &CLASSIFICATIONS),
                title: event.title,
                description: event.description,
                start,
                end: event.end,
                all_day: event.all_day,
                time_notes: String::new(),
                location: event.location.unwrap_or_else(city_hall),
                links,
                source: CALENDAR_URL.to_string(),
            };
            let status = if event.cancelled {
                Status::Cancelled
            } else {
                meeting_status(&draft, ctx.now(), "")
            };
            meetings.push(draft.into_meeting(&self.name, status));
        }
        meetings
    }

    fn parse_calendar(
        &self,
        response: &FetchResponse,
        ctx: &CrawlContext,
    ) -> Result<ParseOutput, ParseError> {
        let payload: Value = response.json().inspect_err(|e| {
            log::error!(
                "EventON response (HTTP {}) is not JSON: {}",
                response.status,
                e
            )
        })?;
        let Some(html) = calendar_html(&payload) else {
            log::warn!(
                "{}: no calendar HTML for year {:?}",
                self.name,
                response.meta.year
            );
            return Ok(ParseOutput::default());
        };
        Ok(ParseOutput {
            meetings: self.meetings_from_html(&html, ctx),
            requests: Vec::new(),
        })
    }
}

impl Spider for HoodRiverSpider {
    fn name(&self) -> &str {
        &self.name
    }

    fn agency(&self) -> &str {
        &self.agency
    }

    fn family(&self) -> &'static str {
        "eventon"
    }

    fn start_requests(&self, _ctx: &CrawlContext) -> Vec<FetchRequest> {
        vec![Self::video_request(0)]
    }

    fn parse(
        &self,
        callback: Callback,
        response: &FetchResponse,
        ctx: &mut CrawlContext,
    ) -> Result<ParseOutput, ParseError> {
        match callback {
            Callback::ParseVideos => {
                let page = response
                    .json::<OmpPage>()
                    .inspect_err(|e| log::error!("Error parsing video page {}: {}", response.url, e))
                    .ok();
                Ok(self.video_page(response.meta.offset.unwrap_or(0), page, ctx))
            }
            Callback::Parse | Callback::ParseDetail => self.parse_calendar(response, ctx),
        }
    }

    fn handle_error(&self, request: &FetchRequest, ctx: &mut CrawlContext) -> ParseOutput {
        match request.callback {
            Callback::ParseVideos => self.video_page(request.meta.offset.unwrap_or(0), None, ctx),
            _ => ParseOutput::default(),
        }
    }
}
