use super::meetings_url;
use super::parser::{meeting_rows, next_page, row_links, row_start, row_title};
use crate::config::{ConfigError, non_empty};
use crate::engine::{Callback, CrawlContext, FetchRequest, FetchResponse, ParseOutput, Spider};
use crate::parser::{ParseError, clean_title, elem_text, meeting_status};
use crate::types::{Classification, Location, MeetingDraft};

#[derive(Debug, Clone, Default)]
pub struct StevensonConfig {
    pub name: Option<String>,
    pub agency: Option<String>,
    /// Taxonomy id of the board in the meetings view filter.
    pub board_id: Option<u32>,
    pub classification: Option<Classification>,
    pub location: Option<Location>,
    pub description: Option<String>,
}

impl StevensonConfig {
    pub fn build(self) -> Result<StevensonSpider, ConfigError> {
        let name = non_empty(self.name);
        let agency = non_empty(self.agency);
        match (name, agency, self.board_id, self.classification, self.location) {
            (Some(name), Some(agency), Some(board_id), Some(classification), Some(location)) => {
                Ok(StevensonSpider {
                    name,
                    agency,
                    board_id,
                    classification,
                    location,
                    description: self.description.unwrap_or_default(),
                })
            }
            (name, agency, board_id, classification, location) => Err(ConfigError::missing(
                name.as_deref(),
                &[
                    ("agency", agency.is_none()),
                    ("name", name.is_none()),
                    ("board_id", board_id.is_none()),
                    ("classification", classification.is_none()),
                    ("location", location.is_none()),
                ],
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct StevensonSpider {
    name: String,
    agency: String,
    board_id: u32,
    classification: Classification,
    location: Location,
    description: String,
}

impl StevensonSpider {
    pub fn start_url(&self) -> String {
        meetings_url(self.board_id)
    }
}

impl Spider for StevensonSpider {
    fn name(&self) -> &str {
        &self.name
    }

    fn agency(&self) -> &str {
        &self.agency
    }

    fn family(&self) -> &'static str {
        "drupal-table"
    }

    fn start_requests(&self, _ctx: &CrawlContext) -> Vec<FetchRequest> {
        vec![FetchRequest::get(self.start_url())]
    }

    fn parse(
        &self,
        _callback: Callback,
        response: &FetchResponse,
        ctx: &mut CrawlContext,
    ) -> Result<ParseOutput, ParseError> {
        let document = response.html();
        let mut output = ParseOutput::default();

        for row in meeting_rows(&document) {
            let raw_title = row_title(row);
            let Some(start) = row_start(row) else {
                log::warn!("{}: dropping '{}' without a date", self.name, raw_title);
                continue;
            };
            let title = match clean_title(&raw_title) {
                title if title.is_empty() => self.agency.clone(),
                title => title,
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
                links: row_links(row, &response.url),
                source: response.url.clone(),
            };
            let status = meeting_status(&draft, ctx.now(), &elem_text(row));
            output.meetings.push(draft.into_meeting(&self.name, status));
        }

        if let Some(next) = next_page(&document) {
            output.requests.push(FetchRequest::get(response.urljoin(&next)));
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
