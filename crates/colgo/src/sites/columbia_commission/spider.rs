use super::parser::{entries, format_title, is_cancelled, parse_links, parse_times, raw_title};
use super::{BASE_URL, LISTING_PATHS};
use crate::config::{ConfigError, non_empty};
use crate::engine::{Callback, CrawlContext, FetchRequest, FetchResponse, ParseOutput, Spider};
use crate::parser::{ParseError, meeting_status};
use crate::types::{Classification, Location, MeetingDraft, Status};

#[derive(Debug, Clone, Default)]
pub struct ColumbiaCommissionConfig {
    pub name: Option<String>,
    pub agency: Option<String>,
    pub location: Option<Location>,
    pub time_notes: Option<String>,
}

impl ColumbiaCommissionConfig {
    pub fn build(self) -> Result<ColumbiaCommissionSpider, ConfigError> {
        let name = non_empty(self.name);
        let agency = non_empty(self.agency);
        match (name, agency, self.location) {
            (Some(name), Some(agency), Some(location)) => Ok(ColumbiaCommissionSpider {
                name,
                agency,
                location,
                time_notes: self.time_notes.unwrap_or_default(),
            }),
            (name, agency, location) => Err(ConfigError::missing(
                name.as_deref(),
                &[
                    ("agency", agency.is_none()),
                    ("name", name.is_none()),
                    ("location", location.is_none()),
                ],
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct ColumbiaCommissionSpider {
    name: String,
    agency: String,
    location: Location,
    time_notes: String,
}

impl Spider for ColumbiaCommissionSpider {
    fn name(&self) -> &str {
        &self.name
    }

    fn agency(&self) -> &str {
        &self.agency
    }

    fn family(&self) -> &'static str {
        "listing"
    }

    fn start_requests(&self, _ctx: &CrawlContext) -> Vec<FetchRequest> {
        LISTING_PATHS
            .iter()
            .map(|path| FetchRequest::get(format!("{}{}", BASE_URL, path)))
            .collect()
    }

    fn parse(
        &self,
        _callback: Callback,
        response: &FetchResponse,
        ctx: &mut CrawlContext,
    ) -> Result<ParseOutput, ParseError> {
        let document = response.html();
        let mut output = ParseOutput::default();

        for entry in entries(&document) {
            let raw = raw_title(entry);
            let Some((start, end)) = parse_times(entry) else {
                log::warn!("{}: dropping '{}' without a date", self.name, raw);
                continue;
            };
            let title = match format_title(&raw) {
                title if title.is_empty() => self.agency.clone(),
                title => title,
            };

            let draft = MeetingDraft {
                title,
                description: String::new(),
                classification: Classification::Committee,
                start,
                end,
                all_day: false,
                time_notes: self.time_notes.clone(),
                location: self.location.clone(),
                links: parse_links(entry, BASE_URL),
                source: response.url.clone(),
            };
            let status = if is_cancelled(&raw) {
                Status::Cancelled
            } else {
                meeting_status(&draft, ctx.now(), "")
            };
            output.meetings.push(draft.into_meeting(&self.name, status));
        }
        log::info!(
            "{}: {} meeting(s) on {}",
            self.name,
            output.meetings.len(),
            response.url
        );
        Ok(output)
    }
}
