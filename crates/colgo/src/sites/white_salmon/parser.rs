use chrono::NaiveDateTime;
use scraper::{Html, Selector};

use crate::parser::{elem_text, join_url, link_kind, normalize_whitespace, own_text, parse_iso_datetime};
use crate::types::{Link, LinkKind, Links};

/// One entry of the month grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct CalendarItem {
    pub href: String,
    /// ISO datetime shown in the grid, preferred over the detail page's.
    pub calendar_start: Option<String>,
}

pub(super) fn calendar_items(document: &Html) -> Vec<CalendarItem> {
    let item_selector = Selector::parse(".view-item-calendar").unwrap();
    let link_selector = Selector::parse(".views-field-title a").unwrap();
    let date_selector =
        Selector::parse(".views-field-field-calendar-date .date-display-single").unwrap();

    document
        .select(&item_selector)
        .filter_map(|item| {
            let href = item
                .select(&link_selector)
                .next()
                .and_then(|a| a.value().attr("href"))
                .map(str::trim)
                .filter(|href| !href.is_empty())?;
            let calendar_start = item
                .select(&date_selector)
                .next()
                .and_then(|span| span.value().attr("content"))
                .map(str::to_string);
            Some(CalendarItem {
                href: href.to_string(),
                calendar_start,
            })
        })
        .collect()
}

pub(super) fn parse_title(document: &Html, fallback: &str) -> String {
    let selector = Selector::parse("#page-title").unwrap();
    let title = document
        .select(&selector)
        .next()
        .map(|h1| normalize_whitespace(&own_text(h1)))
        .unwrap_or_default();
    if title.is_empty() {
        fallback.to_string()
    } else {
        title
    }
}

/// Grid datetime when it parses, else the one printed on the meeting page.
pub(super) fn parse_start(document: &Html, calendar_start: Option<&str>) -> Option<NaiveDateTime> {
    if let Some(start) = calendar_start.and_then(parse_logged) {
        return Some(start);
    }
    let selector = Selector::parse(".calendar-date span.date-display-single").unwrap();
    document
        .select(&selector)
        .next()
        .and_then(|span| span.value().attr("content"))
        .and_then(parse_logged)
}

fn parse_logged(value: &str) -> Option<NaiveDateTime> {
    let parsed = parse_iso_datetime(value);
    if parsed.is_none() {
        log::debug!("Failed to parse datetime: {}", value);
    }
    parsed
}

/// Agenda, packet and video fields first, then the supporting documents that
/// are recognisably agendas, packets or minutes.
pub(super) fn parse_links(document: &Html, page_url: &str) -> Links {
    let mut links = Links::new();
    let fields = [
        (".field-name-field-agenda-link a", LinkKind::Agenda),
        (".field-name-field-packets-link a", LinkKind::AgendaPacket),
        (".field-name-field-video-link a", LinkKind::Video),
    ];
    for (selector, kind) in fields {
        let selector = Selector::parse(selector).unwrap();
        if let Some(href) = document
            .select(&selector)
            .next()
            .and_then(|a| a.value().attr("href"))
        {
            links.push(Link::new(join_url(page_url, href), kind));
        }
    }

    let attachment_selector = Selector::parse(".other_attachments .filefield-file a").unwrap();
    for attachment in document.select(&attachment_selector) {
        let Some(href) = attachment.value().attr("href") else {
            continue;
        };
        let text = normalize_whitespace(&elem_text(attachment));
        match link_kind(href, &text) {
            Some(kind) => {
                links.push(Link::new(join_url(page_url, href), kind));
            }
            None => log::debug!("Ignoring attachment '{}'", text),
        }
    }
    links
}
