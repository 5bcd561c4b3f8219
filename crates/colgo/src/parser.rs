use std::sync::LazyLock;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use scraper::ElementRef;

use crate::types::{Classification, LinkKind, MeetingDraft, Status};

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("Failed to parse date: {0}")]
    DateParse(String),
    #[error("Failed to parse time: {0}")]
    TimeParse(String),
    #[error("Missing required field: {0}")]
    MissingField(String),
    #[error("Invalid JSON payload: {0}")]
    Json(#[from] serde_json::Error),
}

const MONTHS: &str = "(?:January|February|March|April|May|June|July|August|September|October|November|December)";

static RE_LEADING_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)^{MONTHS}\s+\d{{1,2}}(?:st|nd|rd|th)?,?\s+\d{{4}}\s*[-–:|]?\s*"
    ))
    .expect("invalid regex: leading date")
});
static RE_LEADING_NUMERIC_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\d{1,2}[/-]\d{1,2}[/-]\d{2,4}\s*[-–:|]?\s*")
        .expect("invalid regex: leading numeric date")
});
static RE_DASH_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\s*[-–]\s*{MONTHS}\s+\d{{1,2}}(?:st|nd|rd|th)?,?\s+\d{{4}}.*$"
    ))
    .expect("invalid regex: dash date")
});
static RE_TRAILING_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?i)\s+{MONTHS}\s+\d{{1,2}}(?:st|nd|rd|th)?,?\s+\d{{4}}.*$"
    ))
    .expect("invalid regex: trailing date")
});
static RE_DASH_NUMERIC_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s*[-–]\s*\d{1,2}[/-]\d{1,2}[/-]\d{2,4}.*$")
        .expect("invalid regex: dash numeric date")
});
static RE_TRAILING_NUMERIC_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\s+\d{1,2}[/-]\d{1,2}[/-]\d{2,4}.*$")
        .expect("invalid regex: trailing numeric date")
});
static RE_MEETING_NO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\s+No\.?\s*\d+").expect("invalid regex: meeting no"));
static RE_HASH_NO: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+#\d+").expect("invalid regex: hash no"));
static RE_TRAILING_SEPARATOR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s*[-–|:]+\s*$").expect("invalid regex: trailing separator"));
static RE_NUMBERED_MEETING: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s+Meeting\s+\d+$").expect("invalid regex: numbered meeting")
});
static RE_NUMERIC_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(\d{1,2})[/-](\d{1,2})[/-](\d{2,4})").expect("invalid regex: numeric date")
});
static RE_LONG_DATE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)([a-z]+)\.?\s+(\d{1,2})(?:st|nd|rd|th)?,?\s+(\d{4})")
        .expect("invalid regex: long date")
});
static RE_TIME_12H: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(\d{1,2})(?::(\d{2}))?\s*([ap])\.?\s*m\.?$").expect("invalid regex: 12h time")
});
static RE_NON_ALNUM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^A-Za-z0-9]+").expect("invalid regex: non alnum"));

pub(crate) fn elem_text(element: ElementRef) -> String {
    element.text().collect::<String>()
}

/// Text of the element's direct text children only, like a `::text` pseudo selector.
pub(crate) fn own_text(element: ElementRef) -> String {
    element
        .children()
        .filter_map(|node| node.value().as_text().map(|t| t.to_string()))
        .collect()
}

pub(crate) fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn clean_title_once(title: &str) -> String {
    let title = RE_LEADING_DATE.replace(title, "");
    let title = RE_LEADING_NUMERIC_DATE.replace(&title, "");
    // month-name suffixes go first so a year is never mistaken for a meeting number
    let title = RE_DASH_DATE.replace_all(&title, "");
    let title = RE_TRAILING_DATE.replace_all(&title, "");
    let title = RE_DASH_NUMERIC_DATE.replace_all(&title, "");
    let title = RE_TRAILING_NUMERIC_DATE.replace_all(&title, "");
    let title = RE_MEETING_NO.replace_all(&title, "");
    let title = RE_HASH_NO.replace_all(&title, "");
    let title = RE_TRAILING_SEPARATOR.replace(&title, "");
    let title = RE_NUMBERED_MEETING.replace(&title, " Meeting");
    title.trim().to_string()
}

/// Strips embedded dates and meeting numbers from a raw title.
///
/// Every rule only ever shortens the text, so the passes are repeated until
/// the title stops changing; cleaning an already clean title is a no-op.
pub fn clean_title(raw: &str) -> String {
    let mut title = normalize_whitespace(raw);
    loop {
        let next = clean_title_once(&title);
        if next == title {
            return title;
        }
        title = next;
    }
}

const FALLBACK_KEYWORDS: [(&str, Classification); 5] = [
    ("council", Classification::CityCouncil),
    ("commission", Classification::Commission),
    ("committee", Classification::Committee),
    ("board", Classification::Board),
    ("advisory", Classification::AdvisoryCommittee),
];

/// First table entry contained in the title wins, then the generic keywords.
pub fn classify(title: &str, table: &[(&str, Classification)]) -> Classification {
    let lower = title.to_lowercase();
    table
        .iter()
        .chain(FALLBACK_KEYWORDS.iter())
        .find(|(key, _)| lower.contains(&key.to_lowercase()))
        .map(|(_, classification)| *classification)
        .unwrap_or(Classification::NotClassified)
}

const CANCEL_WORDS: [&str; 3] = ["cancel", "rescheduled", "postpone"];

pub fn mentions_cancellation(text: &str) -> bool {
    let lower = text.to_lowercase();
    CANCEL_WORDS.iter().any(|w| lower.contains(w))
}

pub fn meeting_status(draft: &MeetingDraft, now: NaiveDateTime, text: &str) -> Status {
    let combined = format!("{} {} {}", draft.title, draft.description, text);
    if mentions_cancellation(&combined) {
        Status::Cancelled
    } else if draft.start < now {
        Status::Passed
    } else {
        Status::Tentative
    }
}

pub fn meeting_id(spider: &str, start: &NaiveDateTime, title: &str) -> String {
    let slug = RE_NON_ALNUM
        .replace_all(title, " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .to_lowercase();
    format!("{}/{}/x/{}", spider, start.format("%Y%m%d%H%M"), slug)
}

pub fn normalize_url(url: &str) -> String {
    let url = url.trim();
    if url.is_empty() || url.starts_with("http://") || url.starts_with("https://") {
        return url.to_string();
    }
    if let Some(rest) = url.strip_prefix("//") {
        return format!("https://{}", rest);
    }
    let bare_domain = ["www.", "youtube.com", "youtu.be", "cityofhoodriver.gov"]
        .iter()
        .any(|p| url.starts_with(p));
    if bare_domain || (url.contains('.') && !url.starts_with('/')) {
        return format!("https://{}", url);
    }
    url.to_string()
}

/// Resolves `href` against the page it was found on.
pub(crate) fn join_url(base: &str, href: &str) -> String {
    let href = href.trim();
    reqwest::Url::parse(base)
        .and_then(|base| base.join(href))
        .map(String::from)
        .unwrap_or_else(|_| href.to_string())
}

/// Document type of a link from its href and anchor text; `None` for anything
/// that is not an agenda, packet or minutes.
pub fn link_kind(href: &str, text: &str) -> Option<LinkKind> {
    let href = href.to_lowercase();
    let text = text.to_lowercase();
    let has = |word: &str| href.contains(word) || text.contains(word);

    if has("agenda") && has("packet") {
        Some(LinkKind::AgendaPacket)
    } else if has("agenda") {
        Some(LinkKind::Agenda)
    } else if has("minutes") {
        Some(LinkKind::Minutes)
    } else if has("packet") {
        Some(LinkKind::Packet)
    } else {
        None
    }
}

pub(crate) fn is_calendar_export(href: &str) -> bool {
    href.contains("google.com/calendar") || href.contains("eventon_ics_download")
}

pub(crate) fn parse_month(month: &str) -> Result<u32, ParseError> {
    let lower = month.trim_end_matches('.').to_lowercase();
    let key = lower.get(..3).unwrap_or(&lower);
    match key {
        "jan" => Ok(1),
        "feb" => Ok(2),
        "mar" => Ok(3),
        "apr" => Ok(4),
        "may" => Ok(5),
        "jun" => Ok(6),
        "jul" => Ok(7),
        "aug" => Ok(8),
        "sep" => Ok(9),
        "oct" => Ok(10),
        "nov" => Ok(11),
        "dec" => Ok(12),
        _ => Err(ParseError::DateParse(format!("Unknown month: {}", month))),
    }
}

pub(crate) fn parse_time_12h(time_str: &str) -> Result<NaiveTime, ParseError> {
    let s = normalize_whitespace(time_str);
    let caps = RE_TIME_12H
        .captures(&s)
        .ok_or_else(|| ParseError::TimeParse(format!("Invalid time: {}", s)))?;

    let hour: u32 = caps[1]
        .parse()
        .map_err(|_| ParseError::TimeParse(format!("Invalid hour: {}", &caps[1])))?;
    let minute: u32 = caps
        .get(2)
        .map_or(Ok(0), |m| m.as_str().parse())
        .map_err(|_| ParseError::TimeParse(format!("Invalid minute in: {}", s)))?;

    let pm = caps[3].eq_ignore_ascii_case("p");
    let hour_24 = match (hour, pm) {
        (12, false) => 0,
        (12, true) => 12,
        (h, false) => h,
        (h, true) => h + 12,
    };

    NaiveTime::from_hms_opt(hour_24, minute, 0)
        .ok_or_else(|| ParseError::TimeParse(format!("Invalid time: {}:{}", hour_24, minute)))
}

/// "December 18th, 2025", "Jan 13, 2026" and similar spelled-out dates.
pub(crate) fn parse_long_date(text: &str) -> Result<NaiveDate, ParseError> {
    let caps = RE_LONG_DATE.captures(text).ok_or_else(|| {
        ParseError::DateParse(format!("Could not match date pattern in: {}", text))
    })?;
    let month = parse_month(&caps[1])?;
    let day: u32 = caps[2]
        .parse()
        .map_err(|_| ParseError::DateParse(format!("Invalid day: {}", &caps[2])))?;
    let year: i32 = caps[3]
        .parse()
        .map_err(|_| ParseError::DateParse(format!("Invalid year: {}", &caps[3])))?;

    NaiveDate::from_ymd_opt(year, month, day).ok_or_else(|| {
        ParseError::DateParse(format!("Invalid date: {}-{}-{}", year, month, day))
    })
}

/// Every `M/D/YY` or `M-D-YYYY` date in the text, in order of appearance.
pub(crate) fn numeric_dates(text: &str) -> Vec<NaiveDate> {
    RE_NUMERIC_DATE
        .captures_iter(text)
        .filter_map(|caps| {
            let month: u32 = caps[1].parse().ok()?;
            let day: u32 = caps[2].parse().ok()?;
            let mut year: i32 = caps[3].parse().ok()?;
            if year < 100 {
                year += 2000;
            }
            NaiveDate::from_ymd_opt(year, month, day)
        })
        .collect()
}

/// Unix timestamp rendered as UTC wall clock without a zone.
pub fn timestamp_to_naive(timestamp: i64) -> Option<NaiveDateTime> {
    DateTime::from_timestamp(timestamp, 0).map(|dt| dt.naive_utc())
}

/// ISO 8601 datetime; an offset, when present, is dropped and the local wall clock kept.
pub fn parse_iso_datetime(value: &str) -> Option<NaiveDateTime> {
    let value = value.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(&value.replace('Z', "+00:00")) {
        return Some(dt.naive_local());
    }
    if let Ok(dt) = DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(dt.naive_local());
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M", "%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(value, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(value, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Combines separate date and time strings, trying ISO first and then the
/// common US calendar formats. A missing or unreadable time yields midnight.
pub fn combine_date_time(date_str: &str, time_str: &str) -> Option<NaiveDateTime> {
    let date_str = normalize_whitespace(date_str);
    let time_str = normalize_whitespace(time_str);

    if let Some(dt) = parse_iso_datetime(&date_str) {
        if time_str.is_empty() || date_str.contains('T') {
            return Some(dt);
        }
    }

    let date = ["%Y-%m-%d", "%m/%d/%Y", "%B %d, %Y", "%b %d, %Y"]
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&date_str, fmt).ok())
        .or_else(|| parse_long_date(&date_str).ok())?;

    if !time_str.is_empty() {
        let time = parse_time_12h(&time_str).ok().or_else(|| {
            ["%H:%M", "%H:%M:%S"]
                .iter()
                .find_map(|fmt| NaiveTime::parse_from_str(&time_str, fmt).ok())
        });
        if let Some(time) = time {
            return Some(date.and_time(time));
        }
        log::debug!("Could not parse time '{}', using midnight", time_str);
    }

    date.and_hms_opt(0, 0, 0)
}
