use std::sync::LazyLock;

use chrono::NaiveDateTime;
use regex::Regex;

use crate::omp::OmpSession;
use crate::parser::{normalize_whitespace, timestamp_to_naive};
use crate::types::{Link, LinkKind, Links};

static RE_LIVE_STREAM: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\s*[-|]\s*Live Stream$").expect("invalid regex: live stream suffix")
});

fn trimmed(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Session title without the streaming suffix, or the agency when blank.
pub(super) fn parse_title(session: &OmpSession, agency: &str) -> String {
    let title = normalize_whitespace(session.title.as_deref().unwrap_or(""));
    if title.is_empty() {
        return agency.to_string();
    }
    RE_LIVE_STREAM.replace(&title, "").trim().to_string()
}

/// Timestamps hold Pacific wall-clock time encoded as if it were UTC.
pub(super) fn parse_start(session: &OmpSession) -> Option<NaiveDateTime> {
    session
        .date
        .filter(|ts| *ts != 0)
        .and_then(timestamp_to_naive)
}

pub(super) fn parse_links(session: &OmpSession) -> Links {
    let mut links = Links::new();
    if let Some(video) = trimmed(session.video_url.as_deref()) {
        links.push(Link::new(video, LinkKind::Video));
    }
    for document in session.documents.iter().flatten() {
        let Some(url) = trimmed(document.url.as_deref()) else {
            continue;
        };
        let title = trimmed(document.doc_type.as_deref()).unwrap_or("Document");
        links.push(Link::titled(url, title));
    }
    links
}

pub(super) fn parse_source(session: &OmpSession, fallback: &str) -> String {
    match trimmed(session.url.as_deref()) {
        Some(path) => format!("{}{}", super::BASE_URL, path),
        None => fallback.to_string(),
    }
}
