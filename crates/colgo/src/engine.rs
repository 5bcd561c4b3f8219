use std::collections::HashSet;
use std::fmt::Display;
use std::time::Duration;

use chrono::{NaiveDate, NaiveDateTime};
use scraper::Html;
use serde::de::DeserializeOwned;

use crate::parser::{ParseError, join_url};
use crate::types::Meeting;
use crate::video::VideoCollector;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
}

impl Display for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Method::Get => write!(f, "GET"),
            Method::Post => write!(f, "POST"),
        }
    }
}

/// Which parse step of a spider a response is handed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Callback {
    Parse,
    ParseDetail,
    ParseVideos,
}

/// Values carried from a request to the parse step of its response.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Meta {
    pub calendar_start: Option<String>,
    pub folder_year: Option<i32>,
    pub offset: Option<i64>,
    pub year: Option<i32>,
}

#[derive(Debug, Clone)]
pub struct FetchRequest {
    pub url: String,
    pub method: Method,
    pub form: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub callback: Callback,
    pub meta: Meta,
    pub dont_filter: bool,
}

impl FetchRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            method: Method::Get,
            form: Vec::new(),
            headers: Vec::new(),
            callback: Callback::Parse,
            meta: Meta::default(),
            dont_filter: false,
        }
    }

    pub fn post_form(url: impl Into<String>, form: Vec<(String, String)>) -> Self {
        Self {
            method: Method::Post,
            form,
            ..Self::get(url)
        }
    }

    pub fn callback(mut self, callback: Callback) -> Self {
        self.callback = callback;
        self
    }

    pub fn meta(mut self, meta: Meta) -> Self {
        self.meta = meta;
        self
    }

    pub fn header(mut self, name: &str, value: &str) -> Self {
        self.headers.push((name.to_string(), value.to_string()));
        self
    }

    pub fn headers(mut self, headers: &[(&str, &str)]) -> Self {
        self.headers
            .extend(headers.iter().map(|(k, v)| (k.to_string(), v.to_string())));
        self
    }

    pub fn dont_filter(mut self) -> Self {
        self.dont_filter = true;
        self
    }

    /// Identity used to drop repeated requests within one crawl.
    pub fn fingerprint(&self) -> String {
        let body = self
            .form
            .iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect::<Vec<_>>()
            .join("&");
        format!("{} {} {}", self.method, self.url, body)
    }
}

#[derive(Debug, Clone)]
pub struct FetchResponse {
    pub url: String,
    pub status: u16,
    pub body: String,
    pub meta: Meta,
}

impl FetchResponse {
    pub fn new(url: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            status: 200,
            body: body.into(),
            meta: Meta::default(),
        }
    }

    pub fn with_meta(mut self, meta: Meta) -> Self {
        self.meta = meta;
        self
    }

    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ParseError> {
        Ok(serde_json::from_str(&self.body)?)
    }

    pub fn html(&self) -> Html {
        Html::parse_document(&self.body)
    }

    pub fn urljoin(&self, href: &str) -> String {
        join_url(&self.url, href)
    }
}

#[derive(Debug, Default)]
pub struct ParseOutput {
    pub meetings: Vec<Meeting>,
    pub requests: Vec<FetchRequest>,
}

impl ParseOutput {
    pub fn requests(requests: Vec<FetchRequest>) -> Self {
        Self {
            meetings: Vec::new(),
            requests,
        }
    }
}

/// Politeness settings the crawler applies to one spider's requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlSettings {
    pub download_delay: Duration,
    pub concurrent_requests: usize,
}

impl Default for CrawlSettings {
    fn default() -> Self {
        Self {
            download_delay: Duration::ZERO,
            concurrent_requests: 8,
        }
    }
}

/// State of a single crawl run, threaded through every parse step.
#[derive(Debug)]
pub struct CrawlContext {
    now: NaiveDateTime,
    pub seen_dates: HashSet<(NaiveDate, bool)>,
    pub videos: VideoCollector,
}

impl CrawlContext {
    pub fn new(now: NaiveDateTime) -> Self {
        Self {
            now,
            seen_dates: HashSet::new(),
            videos: VideoCollector::default(),
        }
    }

    pub fn now(&self) -> NaiveDateTime {
        self.now
    }
}

/// A site adapter: issues the first requests of a crawl and turns each
/// response into meetings and follow-up requests.
pub trait Spider: Send + Sync {
    fn name(&self) -> &str;

    fn agency(&self) -> &str;

    /// Short label of the source platform, shown by the CLI.
    fn family(&self) -> &'static str;

    fn settings(&self) -> CrawlSettings {
        CrawlSettings::default()
    }

    fn start_requests(&self, ctx: &CrawlContext) -> Vec<FetchRequest>;

    fn parse(
        &self,
        callback: Callback,
        response: &FetchResponse,
        ctx: &mut CrawlContext,
    ) -> Result<ParseOutput, ParseError>;

    /// Called when a request could not be fetched at all.
    fn handle_error(&self, _request: &FetchRequest, _ctx: &mut CrawlContext) -> ParseOutput {
        ParseOutput::default()
    }
}
