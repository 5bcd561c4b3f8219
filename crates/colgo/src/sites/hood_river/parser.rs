use chrono::NaiveDateTime;
use scraper::{ElementRef, Html, Selector};
use serde_json::Value;

use crate::parser::{
    clean_title, combine_date_time, elem_text, is_calendar_export, join_url, link_kind,
    mentions_cancellation, normalize_url, normalize_whitespace, own_text, timestamp_to_naive,
};
use crate::types::{Link, Links, Location};

const CALENDAR_ID: &str = "evcal_calendar_765";

const TITLE_SELECTORS: [&str; 6] = [
    ".evcal_event_title",
    ".evo_event_title",
    "[itemprop='name']",
    ".event_title",
    "span.evcal_desc2",
    "a",
];
const DESCRIPTION_SELECTORS: [&str; 4] = [
    ".evcal_event_subtitle",
    ".evo_event_desc",
    "[itemprop='description']",
    ".event_description",
];
const LOCATION_SELECTORS: [&str; 4] = [
    ".evo_location",
    ".evcal_location",
    "[itemprop='location']",
    ".event_location",
];
const LINK_SELECTORS: [&str; 6] = [
    "a[href*='agenda']",
    "a[href*='minutes']",
    "a[href*='packet']",
    "a[href*='.pdf']",
    ".evcal_evdata_cell a",
    ".evo_event_links a",
];

/// One EventON event, with the fields the calendar markup provides.
#[derive(Debug, Clone)]
pub(super) struct CalendarEvent {
    pub title: String,
    pub description: String,
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub all_day: bool,
    /// `None` means the default city hall location.
    pub location: Option<Location>,
    pub links: Links,
    pub cancelled: bool,
}

/// The event list HTML inside an `eventon_get_events` payload.
pub(super) fn calendar_html(payload: &Value) -> Option<String> {
    let non_empty = |v: &Value| v.as_str().filter(|h| !h.trim().is_empty()).map(str::to_string);
    match payload.get("html")? {
        html @ Value::String(_) => non_empty(html),
        Value::Object(map) => map.get(CALENDAR_ID).and_then(non_empty).or_else(|| {
            map.iter()
                .filter(|(key, _)| key.as_str() != "no_events")
                .find_map(|(_, value)| non_empty(value))
        }),
        _ => None,
    }
}

pub(super) fn parse_events(html: &str, base_url: &str) -> Vec<CalendarEvent> {
    let fragment = Html::parse_fragment(html);
    let selector = Selector::parse(".eventon_list_event, .evo_eventcard, [data-event_id]").unwrap();
    fragment
        .select(&selector)
        .map(|event| CalendarEvent {
            title: parse_title(event),
            description: first_own_text(event, &DESCRIPTION_SELECTORS).unwrap_or_default(),
            start: parse_start(event),
            end: data_time(event, 1),
            all_day: parse_all_day(event),
            location: parse_location(event),
            links: parse_links(event, base_url),
            cancelled: is_cancelled(event),
        })
        .collect()
}

/// First non-blank direct text among elements matching the selectors, in order.
fn first_own_text(event: ElementRef, selectors: &[&str]) -> Option<String> {
    selectors.iter().find_map(|css| {
        let selector = Selector::parse(css).ok()?;
        event
            .select(&selector)
            .map(|el| normalize_whitespace(&own_text(el)))
            .find(|text| !text.is_empty())
    })
}

fn parse_title(event: ElementRef) -> String {
    first_own_text(event, &TITLE_SELECTORS)
        .or_else(|| event.value().attr("data-event_name").map(str::to_string))
        .map(|title| clean_title(&title))
        .unwrap_or_default()
}

/// One side of the `data-time="start-end"` attribute, both Unix timestamps.
fn data_time(event: ElementRef, index: usize) -> Option<NaiveDateTime> {
    let data_time = event.value().attr("data-time").filter(|t| t.contains('-'))?;
    let timestamp = data_time.split('-').nth(index)?.trim().parse::<i64>().ok()?;
    timestamp_to_naive(timestamp)
}

fn parse_start(event: ElementRef) -> Option<NaiveDateTime> {
    data_time(event, 0).or_else(|| {
        let text = first_own_text(event, &[".evcal_desc span.evcal_desc2_time"])?;
        combine_date_time(&text, "")
    })
}

fn parse_all_day(event: ElementRef) -> bool {
    event
        .value()
        .attr("data-all_day")
        .is_some_and(|v| v.eq_ignore_ascii_case("yes") || v == "1")
}

fn parse_location(event: ElementRef) -> Option<Location> {
    if let Some(name) = first_own_text(event, &LOCATION_SELECTORS) {
        if name.to_lowercase().contains("city hall") || name.contains("211") {
            return None;
        }
        return Some(Location::new(&name, ""));
    }
    first_own_text(event, &["[itemprop='address']"]).map(|address| Location::new("", &address))
}

fn parse_links(event: ElementRef, base_url: &str) -> Links {
    let mut links = Links::new();
    for css in LINK_SELECTORS {
        let selector = Selector::parse(css).unwrap();
        for anchor in event.select(&selector) {
            let Some(href) = anchor.value().attr("href").map(str::trim).filter(|h| !h.is_empty())
            else {
                continue;
            };
            if is_calendar_export(href) {
                continue;
            }
            let mut href = normalize_url(href);
            if href.starts_with('/') {
                href = join_url(base_url, &href);
            }
            if links.contains_href(&href) {
                continue;
            }
            // Anchor text only picks the kind; titles always come from the vocabulary.
            let text = normalize_whitespace(&elem_text(anchor));
            if let Some(kind) = link_kind(&href, &text) {
                links.push(Link::new(href, kind));
            }
        }
    }
    links
}

/// A cancel marker in the class or status attribute, or a cancellation word
/// anywhere in the rendered text, raw title included. Hits that only occur
/// inside URLs do not count.
fn is_cancelled(event: ElementRef) -> bool {
    let attr_mentions_cancel = |name: &str| {
        event
            .value()
            .attr(name)
            .is_some_and(|v| v.to_lowercase().contains("cancel"))
    };
    if attr_mentions_cancel("class") || attr_mentions_cancel("data-event_status") {
        return true;
    }
    mentions_cancellation(&event.text().collect::<Vec<_>>().join(" "))
}
