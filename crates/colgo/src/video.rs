//! Joins OmpNetwork video sessions to calendar events.
//!
//! The two sources share no identifier, so a session is keyed by its date and a
//! simplified title. Lookup tries the exact key, then any same-day session whose
//! simplified title contains (or is contained in) the event's, then any same-day
//! session sharing at least two words from [`IMPORTANT_WORDS`].

use std::collections::HashSet;
use std::sync::LazyLock;

use chrono::NaiveDate;
use regex::Regex;

use crate::omp::OmpSession;
use crate::parser::{normalize_url, timestamp_to_naive};
use crate::types::{Link, LinkKind, Links};

const MAX_SIMPLIFIED_LEN: usize = 50;

pub const IMPORTANT_WORDS: [&str; 10] = [
    "budget",
    "city",
    "council",
    "committee",
    "commission",
    "planning",
    "orientation",
    "workshop",
    "urban",
    "renewal",
];

static RE_FILLER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(meeting|no\.?\s*\d+|session|#\d+)\b").expect("invalid regex: filler words")
});
static RE_PUNCTUATION: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\w\s]").expect("invalid regex: punctuation"));
static RE_WHITESPACE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("invalid regex: whitespace"));

pub fn simplify_title(title: &str) -> String {
    let lower = title.to_lowercase();
    let without_filler = RE_FILLER.replace_all(&lower, "");
    let without_punct = RE_PUNCTUATION.replace_all(&without_filler, "");
    let joined = RE_WHITESPACE.replace_all(without_punct.trim(), "_");
    joined.chars().take(MAX_SIMPLIFIED_LEN).collect()
}

pub fn match_key(date: NaiveDate, title: &str) -> String {
    format!("{}_{}", date.format("%Y-%m-%d"), simplify_title(title))
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VideoEntry {
    pub key: String,
    pub date: NaiveDate,
    pub title: String,
    pub url: String,
}

impl VideoEntry {
    fn simplified_title(&self) -> &str {
        self.key.split_once('_').map(|(_, t)| t).unwrap_or("")
    }
}

/// Insertion-ordered; a later session with the same key replaces the earlier
/// one in place.
#[derive(Debug, Clone, Default)]
pub struct VideoCache {
    entries: Vec<VideoEntry>,
}

impl VideoCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_sessions(sessions: &[OmpSession]) -> Self {
        let mut cache = Self::new();
        for session in sessions {
            let Some(url) = session.video_url.as_deref().filter(|u| !u.trim().is_empty()) else {
                continue;
            };
            let Some(start) = session.date.filter(|ts| *ts != 0).and_then(timestamp_to_naive)
            else {
                continue;
            };
            cache.insert(start.date(), session.title.as_deref().unwrap_or(""), url);
        }
        cache
    }

    pub fn insert(&mut self, date: NaiveDate, title: &str, url: &str) {
        let entry = VideoEntry {
            key: match_key(date, title),
            date,
            title: title.to_string(),
            url: url.trim().to_string(),
        };
        match self.entries.iter_mut().find(|e| e.key == entry.key) {
            Some(existing) => *existing = entry,
            None => self.entries.push(entry),
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn find(&self, date: NaiveDate, title: &str) -> Option<&VideoEntry> {
        if title.is_empty() {
            return None;
        }
        let key = match_key(date, title);
        if let Some(entry) = self.entries.iter().find(|e| e.key == key) {
            return Some(entry);
        }

        let simplified = simplify_title(title);
        let title_words: HashSet<&str> = simplified.split('_').collect();

        self.entries.iter().filter(|e| e.date == date).find(|e| {
            let cached = e.simplified_title();
            if cached.contains(simplified.as_str()) || simplified.contains(cached) {
                return true;
            }
            let cached_words: HashSet<&str> = cached.split('_').collect();
            IMPORTANT_WORDS
                .iter()
                .filter(|w| cached_words.contains(*w) && title_words.contains(*w))
                .count()
                >= 2
        })
    }

    /// Appends a "Video Recording" link when a session matches the meeting.
    pub fn attach(&self, links: &mut Links, date: NaiveDate, title: &str) {
        if let Some(entry) = self.find(date, title) {
            let url = normalize_url(&entry.url);
            if links.push(Link::new(url, LinkKind::VideoRecording)) {
                log::debug!("Matched video '{}' to '{}'", entry.title, title);
            }
        }
    }
}

/// Video sessions accumulated over the pages of one crawl.
#[derive(Debug, Default)]
pub struct VideoCollector {
    sessions: Vec<OmpSession>,
    pending_pages: usize,
    cache: Option<VideoCache>,
}

impl VideoCollector {
    pub fn add_sessions(&mut self, sessions: Vec<OmpSession>) {
        self.sessions.extend(sessions);
    }

    pub fn expect_pages(&mut self, pages: usize) {
        self.pending_pages = pages;
    }

    /// Marks one follow-up page as handled; true once none are outstanding.
    pub fn page_done(&mut self) -> bool {
        self.pending_pages = self.pending_pages.saturating_sub(1);
        self.pending_pages == 0
    }

    pub fn finish(&mut self) -> &VideoCache {
        let cache = VideoCache::from_sessions(&self.sessions);
        log::info!(
            "Built video cache with {} entries from {} sessions",
            cache.len(),
            self.sessions.len()
        );
        self.sessions.clear();
        self.cache.insert(cache)
    }

    pub fn cache(&self) -> Option<&VideoCache> {
        self.cache.as_ref()
    }

    pub fn set_cache(&mut self, cache: VideoCache) {
        self.cache = Some(cache);
    }
}
