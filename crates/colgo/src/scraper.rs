use std::collections::{HashSet, VecDeque};
use std::future::Future;
use std::time::Duration;

use chrono::NaiveDateTime;
use futures::StreamExt;
use futures::stream::FuturesUnordered;
use reqwest::Client;

use crate::engine::{CrawlContext, FetchRequest, FetchResponse, Method, Spider};
use crate::parser::ParseError;
use crate::types::Meeting;

#[derive(Debug, thiserror::Error)]
pub enum ScraperError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),
    #[error("Parse error: {0}")]
    ParseError(#[from] ParseError),
    #[error("No response for {0}")]
    NotFound(String),
}

/// Anything that can turn a [`FetchRequest`] into a response body.
pub trait Fetch {
    fn fetch(
        &self,
        request: &FetchRequest,
    ) -> impl Future<Output = Result<FetchResponse, ScraperError>>;
}

#[derive(Debug, Clone)]
pub struct WebScraper {
    client: Client,
}

impl WebScraper {
    pub fn new() -> Result<Self, ScraperError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .cookie_store(true)
            .user_agent(format!(
                "{}/{}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            ))
            .build()?;

        Ok(Self { client })
    }

    /// Runs a full crawl of `spider` against the live site.
    pub async fn crawl(&self, spider: &dyn Spider) -> Vec<Meeting> {
        Crawler::new(self).run(spider).await
    }
}

impl Fetch for WebScraper {
    async fn fetch(&self, request: &FetchRequest) -> Result<FetchResponse, ScraperError> {
        log::info!("{} {}", request.method, request.url);
        let mut builder = match request.method {
            Method::Get => self.client.get(&request.url),
            Method::Post => self.client.post(&request.url),
        };
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if !request.form.is_empty() {
            builder = builder.form(&request.form);
        }

        let response = builder
            .send()
            .await
            .inspect_err(|e| log::error!("HTTP error: {e:?}"))?
            .error_for_status()?;
        let status = response.status().as_u16();
        let url = response.url().to_string();
        let body = response
            .text()
            .await
            .inspect_err(|e| log::error!("Decode error: {e:?}"))?;

        Ok(FetchResponse {
            url,
            status,
            body,
            meta: request.meta.clone(),
        })
    }
}

/// Drives one spider from its start requests until no requests remain.
pub struct Crawler<'a, F> {
    fetcher: &'a F,
    now: NaiveDateTime,
}

impl<'a, F: Fetch> Crawler<'a, F> {
    pub fn new(fetcher: &'a F) -> Self {
        Self {
            fetcher,
            now: chrono::Local::now().naive_local(),
        }
    }

    /// Pins the reference time used for status computation.
    pub fn at(mut self, now: NaiveDateTime) -> Self {
        self.now = now;
        self
    }

    pub async fn run(&self, spider: &dyn Spider) -> Vec<Meeting> {
        let settings = spider.settings();
        let mut ctx = CrawlContext::new(self.now);
        let mut queue: VecDeque<FetchRequest> = spider.start_requests(&ctx).into();
        let mut seen: HashSet<String> = HashSet::new();
        let mut meetings = Vec::new();
        let mut fetched = 0usize;

        log::info!(
            "Crawling {} with {} start request(s)",
            spider.name(),
            queue.len()
        );

        while !queue.is_empty() {
            let take = settings.concurrent_requests.max(1).min(queue.len());
            let batch: Vec<FetchRequest> = queue
                .drain(..take)
                .filter(|r| r.dont_filter || seen.insert(r.fingerprint()))
                .collect();

            let fetcher = self.fetcher;
            let delay = settings.download_delay;
            let mut in_flight: FuturesUnordered<_> = batch
                .into_iter()
                .map(|request| async move {
                    if !delay.is_zero() {
                        tokio::time::sleep(delay).await;
                    }
                    let result = fetcher.fetch(&request).await;
                    (request, result)
                })
                .collect();

            while let Some((request, result)) = in_flight.next().await {
                fetched += 1;
                let output = match result {
                    Ok(response) => match spider.parse(request.callback, &response, &mut ctx) {
                        Ok(output) => output,
                        Err(e) => {
                            log::warn!("Skipping {}: {}", response.url, e);
                            continue;
                        }
                    },
                    Err(e) => {
                        log::warn!("Failed to fetch {}: {}", request.url, e);
                        spider.handle_error(&request, &mut ctx)
                    }
                };
                meetings.extend(output.meetings);
                queue.extend(output.requests);
            }
        }

        log::info!(
            "Finished {}: {} meeting(s) from {} response(s)",
            spider.name(),
            meetings.len(),
            fetched
        );
        meetings
    }
}


#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::testing::StaticFetcher;
    use super::*;
    use crate::engine::{Callback, ParseOutput};
    use crate::types::{Classification, Links, Location, MeetingDraft, Status};

    /// Emits one meeting per response and follows a `next:` line in the body.
    struct EchoSpider;

    impl Spider for EchoSpider {
        fn name(&self) -> &str {
            "echo"
        }

        fn agency(&self) -> &str {
            "Echo Agency"
        }

        fn family(&self) -> &'static str {
            "test"
        }

        fn start_requests(&self, _ctx: &CrawlContext) -> Vec<FetchRequest> {
            vec![
                FetchRequest::get("https://a.gov/1"),
                FetchRequest::get("https://a.gov/1"),
                FetchRequest::get("https://a.gov/missing"),
            ]
        }

        fn parse(
            &self,
            _callback: Callback,
            response: &FetchResponse,
            ctx: &mut CrawlContext,
        ) -> Result<ParseOutput, ParseError> {
            if response.body == "broken" {
                return Err(ParseError::MissingField("body".to_string()));
            }
            let start = NaiveDate::from_ymd_opt(2025, 1, 1)
                .unwrap()
                .and_hms_opt(0, 0, 0)
                .unwrap();
            let draft = MeetingDraft {
                title: response.url.clone(),
                description: String::new(),
                classification: Classification::NotClassified,
                start,
                end: None,
                all_day: false,
                time_notes: String::new(),
                location: Location::new("Hall", ""),
                links: Links::new(),
                source: response.url.clone(),
            };
            let status = crate::parser::meeting_status(&draft, ctx.now(), "");
            let mut output = ParseOutput::default();
            output.meetings.push(draft.into_meeting(self.name(), status));
            if let Some(next) = response.body.strip_prefix("next:") {
                output.requests.push(FetchRequest::get(next));
            }
            Ok(output)
        }
    }

    #[tokio::test]
    async fn test_crawler_follows_dedupes_and_skips_failures() {
        let fetcher = StaticFetcher::default()
            .with("https://a.gov/1", "next:https://a.gov/2")
            .with("https://a.gov/2", "next:https://a.gov/3")
            .with("https://a.gov/3", "broken");
        let now = NaiveDate::from_ymd_opt(2026, 1, 1)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap();

        let meetings = Crawler::new(&fetcher).at(now).run(&EchoSpider).await;

        let mut titles: Vec<&str> = meetings.iter().map(|m| m.title.as_str()).collect();
        titles.sort();
        assert_eq!(titles, vec!["https://a.gov/1", "https://a.gov/2"]);
        assert!(meetings.iter().all(|m| m.status == Status::Passed));

        let urls = fetcher.urls();
        assert_eq!(
            urls.iter().filter(|u| u.as_str() == "https://a.gov/1").count(),
            1,
            "repeated request must only be fetched once: {:?}",
            urls
        );
        assert!(urls.contains(&"https://a.gov/missing".to_string()));
        assert!(
            urls.contains(&"https://a.gov/3".to_string()),
            "an unparseable page is fetched, then skipped"
        );
    }
}
