use std::sync::LazyLock;

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use scraper::{ElementRef, Html, Selector};

use crate::parser::{
    elem_text, join_url, link_kind, normalize_whitespace, own_text, parse_long_date, parse_time_12h,
};
use crate::types::{Link, LinkKind, Links};

static RE_CANCELLED: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)cancel\w+|rescheduled").expect("invalid regex: cancelled")
});
static RE_DATE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*\d{4})").expect("invalid regex: date prefix"));

pub(super) fn entries(document: &Html) -> Vec<ElementRef<'_>> {
    let selector = Selector::parse("div.entry.clearfix > div.entry-c").unwrap();
    document.select(&selector).collect()
}

/// Text of the title anchor as published, suffixes included.
pub(super) fn raw_title(entry: ElementRef) -> String {
    let selector = Selector::parse(".entry-title a").unwrap();
    entry
        .select(&selector)
        .next()
        .map(|a| normalize_whitespace(&elem_text(a)))
        .unwrap_or_default()
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first
            .to_uppercase()
            .chain(chars.flat_map(char::to_lowercase))
            .collect(),
        None => String::new(),
    }
}

/// Drops everything after the first " - " and capitalises each word, keeping
/// the commission's acronym upper case.
pub(super) fn format_title(raw: &str) -> String {
    let head = raw.split(" - ").next().unwrap_or(raw);
    head.split_whitespace()
        .map(|word| if word == "CRGC" { word.to_string() } else { capitalize(word) })
        .collect::<Vec<_>>()
        .join(" ")
}

pub(super) fn is_cancelled(raw_title: &str) -> bool {
    RE_CANCELLED.is_match(raw_title)
}

/// Text next to the given icon in the entry's meta list.
fn meta_text(entry: ElementRef, icon: &str) -> Option<String> {
    let li_selector = Selector::parse("li").unwrap();
    let icon_selector = Selector::parse(icon).unwrap();
    entry
        .select(&li_selector)
        .find(|li| li.select(&icon_selector).next().is_some())
        .map(|li| normalize_whitespace(&own_text(li)))
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    let date = RE_DATE_PREFIX.captures(text)?.get(1)?.as_str().trim();
    NaiveDate::parse_from_str(date, "%b %d, %Y")
        .ok()
        .or_else(|| parse_long_date(date).ok())
}

/// Start and end from the calendar and clock items. No date means no
/// meeting; an unreadable time range leaves the start at midnight.
pub(super) fn parse_times(entry: ElementRef) -> Option<(NaiveDateTime, Option<NaiveDateTime>)> {
    let date = meta_text(entry, "i.icon-calendar").and_then(|text| parse_date(&text))?;
    let times = meta_text(entry, "i.icon-time").unwrap_or_default();
    let mut range = times.split('-').map(|part| parse_time_12h(part.trim()).ok());

    let start = date.and_time(range.next().flatten().unwrap_or(NaiveTime::MIN));
    let end = range.next().flatten().map(|t| date.and_time(t));
    Some((start, end))
}

/// Every anchor but the title, kept when it is a document or a recording.
pub(super) fn parse_links(entry: ElementRef, base_url: &str) -> Links {
    let selector = Selector::parse("a").unwrap();
    let mut links = Links::new();
    for anchor in entry.select(&selector).skip(1) {
        let Some(href) = anchor.value().attr("href") else {
            continue;
        };
        let text = normalize_whitespace(&elem_text(anchor));
        let lower = format!("{} {}", href, text).to_lowercase();
        let kind = link_kind(href, &text).or_else(|| {
            ["video", "youtube", "recording"]
                .iter()
                .any(|w| lower.contains(w))
                .then_some(LinkKind::Video)
        });
        match kind {
            Some(kind) => {
                links.push(Link::new(join_url(base_url, href), kind));
            }
            None => log::debug!("Ignoring link '{}'", text),
        }
    }
    links
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn document() -> Html {
        let html = fs::read_to_string("fixtures/columbia_commission_upcoming.html")
            .expect("Failed to read columbia_commission_upcoming.html fixture");
        Html::parse_document(&html)
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn test_format_title() {
        assert_eq!(
            format_title("January 2026 Monthly CRGC Meeting - Zoom Webinar"),
            "January 2026 Monthly CRGC Meeting"
        );
        assert_eq!(
            format_title("FEBRUARY 2026 MONTHLY CRGC MEETING - CANCELLED"),
            "February 2026 Monthly CRGC Meeting"
        );
        assert_eq!(format_title("special meeting: land use"), "Special Meeting: Land Use");
        assert_eq!(format_title(""), "");
    }

    #[test]
    fn test_is_cancelled() {
        assert!(is_cancelled("FEBRUARY 2026 MONTHLY CRGC MEETING - CANCELLED"));
        assert!(is_cancelled("Meeting canceled"));
        assert!(is_cancelled("March Meeting (Rescheduled)"));
        assert!(!is_cancelled("Cancel"), "bare verb is not a cancellation notice");
        assert!(!is_cancelled("January 2026 Monthly CRGC Meeting"));
    }

    #[test]
    fn test_entries_and_times() {
        let document = document();
        let entries = entries(&document);
        assert_eq!(entries.len(), 4);

        assert_eq!(
            parse_times(entries[0]),
            Some((at(2026, 1, 13, 8, 30), Some(at(2026, 1, 13, 12, 0))))
        );
        assert_eq!(parse_times(entries[2]), None, "entry without a date");
        assert_eq!(
            parse_times(entries[3]),
            Some((at(2025, 12, 9, 9, 0), Some(at(2025, 12, 9, 15, 30))))
        );
    }

    #[test]
    fn test_links() {
        let document = document();
        let entries = entries(&document);
        assert!(parse_links(entries[0], "https://www.gorgecommission.org").is_empty());

        let links = parse_links(entries[3], "https://www.gorgecommission.org");
        assert_eq!(
            links.as_slice(),
            [
                Link::new(
                    "https://www.gorgecommission.org/images/uploads/meetings/2025-12_Agenda.pdf",
                    LinkKind::Agenda
                ),
                Link::new(
                    "https://www.gorgecommission.org/images/uploads/meetings/2025-12_Meeting_Packet.pdf",
                    LinkKind::Packet
                ),
                Link::new("https://www.youtube.com/watch?v=crgc2025dec", LinkKind::Video),
            ]
        );
    }
}
