use std::{fmt::Display, str::FromStr};

use chrono::NaiveDateTime;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, thiserror::Error)]
#[error(
    "Invalid status '{0}'. Accepted values: 'tentative', 'passed', 'cancelled'"
)]
pub struct StatusParseError(String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Tentative,
    Passed,
    Cancelled,
}

impl FromStr for Status {
    type Err = StatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "tentative" => Ok(Status::Tentative),
            "passed" => Ok(Status::Passed),
            "cancelled" | "canceled" => Ok(Status::Cancelled),
            _ => Err(StatusParseError(s.to_string())),
        }
    }
}

impl Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Status::Tentative => write!(f, "tentative"),
            Status::Passed => write!(f, "passed"),
            Status::Cancelled => write!(f, "cancelled"),
        }
    }
}

/// Kind of governing body a meeting belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
pub enum Classification {
    #[serde(rename = "City Council")]
    CityCouncil,
    #[serde(rename = "Committee")]
    Committee,
    #[serde(rename = "Commission")]
    Commission,
    #[serde(rename = "Board")]
    Board,
    #[serde(rename = "Advisory Committee")]
    AdvisoryCommittee,
    #[serde(rename = "Not classified")]
    NotClassified,
}

impl Classification {
    pub fn as_str(&self) -> &'static str {
        match self {
            Classification::CityCouncil => "City Council",
            Classification::Committee => "Committee",
            Classification::Commission => "Commission",
            Classification::Board => "Board",
            Classification::AdvisoryCommittee => "Advisory Committee",
            Classification::NotClassified => "Not classified",
        }
    }
}

impl Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Location {
    pub name: String,
    pub address: String,
}

impl Location {
    pub fn new(name: &str, address: &str) -> Self {
        Self {
            name: name.to_string(),
            address: address.to_string(),
        }
    }
}

impl Display for Location {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.name.is_empty(), self.address.is_empty()) {
            (false, false) => write!(f, "{}, {}", self.name, self.address),
            (false, true) => write!(f, "{}", self.name),
            _ => write!(f, "{}", self.address),
        }
    }
}

/// Titles a document or recording link may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkKind {
    Agenda,
    AgendaPacket,
    Minutes,
    Packet,
    Video,
    VideoRecording,
}

impl LinkKind {
    pub fn title(&self) -> &'static str {
        match self {
            LinkKind::Agenda => "Agenda",
            LinkKind::AgendaPacket => "Agenda Packet",
            LinkKind::Minutes => "Minutes",
            LinkKind::Packet => "Packet",
            LinkKind::Video => "Video",
            LinkKind::VideoRecording => "Video Recording",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Link {
    pub href: String,
    pub title: String,
}

impl Link {
    pub fn new(href: impl Into<String>, kind: LinkKind) -> Self {
        Self {
            href: href.into(),
            title: kind.title().to_string(),
        }
    }

    pub fn titled(href: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            href: href.into(),
            title: title.into(),
        }
    }
}

/// Ordered link list; pushing an href that is already present is a no-op.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct Links(Vec<Link>);

impl Links {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, link: Link) -> bool {
        if link.href.is_empty() || self.contains_href(&link.href) {
            return false;
        }
        self.0.push(link);
        true
    }

    pub fn contains_href(&self, href: &str) -> bool {
        self.0.iter().any(|l| l.href == href)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Link> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_slice(&self) -> &[Link] {
        &self.0
    }
}

impl FromIterator<Link> for Links {
    fn from_iter<I: IntoIterator<Item = Link>>(iter: I) -> Self {
        let mut links = Links::new();
        for link in iter {
            links.push(link);
        }
        links
    }
}

impl Extend<Link> for Links {
    fn extend<I: IntoIterator<Item = Link>>(&mut self, iter: I) {
        for link in iter {
            self.push(link);
        }
    }
}

impl<'a> IntoIterator for &'a Links {
    type Item = &'a Link;
    type IntoIter = std::slice::Iter<'a, Link>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Fields extracted from one raw event, before the status and id are known.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeetingDraft {
    pub title: String,
    pub description: String,
    pub classification: Classification,
    pub start: NaiveDateTime,
    pub end: Option<NaiveDateTime>,
    pub all_day: bool,
    pub time_notes: String,
    pub location: Location,
    pub links: Links,
    pub source: String,
}

impl MeetingDraft {
    pub fn into_meeting(self, spider: &str, status: Status) -> Meeting {
        let id = crate::parser::meeting_id(spider, &self.start, &self.title);
        Meeting {
            id,
            title: self.title,
            description: self.description,
            classification: self.classification,
            start: self.start,
            end: self.end,
            all_day: self.all_day,
            time_notes: self.time_notes,
            location: self.location,
            links: self.links,
            source: self.source,
            status,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Meeting {
    pub id: String,
    pub title: String,
    pub description: String,
    pub classification: Classification,
    pub start: NaiveDateTime,
    pub end: Option<NaiveDateTime>,
    pub all_day: bool,
    pub time_notes: String,
    pub location: Location,
    pub links: Links,
    pub source: String,
    pub status: Status,
}

impl Display for Meeting {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{}] {} | {} ({})",
            self.start.format("%Y-%m-%d %H:%M"),
            self.title,
            self.classification,
            self.status
        )?;
        if let Some(end) = self.end {
            write!(f, "\n   Ends:     {}", end.format("%Y-%m-%d %H:%M"))?;
        }
        write!(f, "\n   Location: {}", self.location)?;
        for link in &self.links {
            write!(f, "\n   {}: {}", link.title, link.href)?;
        }
        Ok(())
    }
}
