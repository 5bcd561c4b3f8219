use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::types::{Meeting, Status};

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum FilterError {
    #[error("Start date ({start}) cannot be after end date ({end})")]
    DateRange { start: NaiveDate, end: NaiveDate },
    #[error("Offset must be greater than 0")]
    ZeroOffset,
    #[error("Limit must be greater than 0")]
    ZeroLimit,
}

#[derive(Debug, Default)]
pub struct MeetingFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub status: Option<Status>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

impl MeetingFilter {
    /// Keeps matching meetings in chronological order, then pages through them.
    pub fn apply(self, mut meetings: Vec<Meeting>) -> Vec<Meeting> {
        if let Some(start) = self.start_date {
            meetings.retain(|m| m.start.date() >= start);
        }
        if let Some(end) = self.end_date {
            meetings.retain(|m| m.start.date() <= end);
        }
        if let Some(status) = self.status {
            meetings.retain(|m| m.status == status);
        }
        meetings.sort_by(|a, b| a.start.cmp(&b.start).then_with(|| a.id.cmp(&b.id)));
        if let Some(off) = self.offset {
            meetings = meetings.into_iter().skip(off).collect();
        }
        if let Some(lim) = self.limit {
            meetings.truncate(lim);
        }
        meetings
    }

    pub fn validate(self) -> Result<Self, FilterError> {
        if let Some(start) = self.start_date
            && let Some(end) = self.end_date
            && start > end
        {
            return Err(FilterError::DateRange { start, end });
        }
        if self.offset.is_some_and(|o| o == 0) {
            return Err(FilterError::ZeroOffset);
        }
        if self.limit.is_some_and(|l| l == 0) {
            return Err(FilterError::ZeroLimit);
        }
        Ok(self)
    }
}

#[derive(Debug)]
pub struct MeetingStats {
    pub tentative: usize,
    pub passed: usize,
    pub cancelled: usize,
    pub with_links: usize,
    pub by_classification: BTreeMap<&'static str, usize>,
    pub total: usize,
}

impl MeetingStats {
    pub fn from_meetings(meetings: &[Meeting]) -> MeetingStats {
        let count = |status: Status| meetings.iter().filter(|m| m.status == status).count();
        let mut by_classification = BTreeMap::new();
        for meeting in meetings {
            *by_classification
                .entry(meeting.classification.as_str())
                .or_insert(0) += 1;
        }
        MeetingStats {
            tentative: count(Status::Tentative),
            passed: count(Status::Passed),
            cancelled: count(Status::Cancelled),
            with_links: meetings.iter().filter(|m| !m.links.is_empty()).count(),
            by_classification,
            total: meetings.len(),
        }
    }
}

impl std::fmt::Display for MeetingStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "\nStatistics:")?;
        writeln!(f, "  Tentative:       {}", self.tentative)?;
        writeln!(f, "  Passed:          {}", self.passed)?;
        writeln!(f, "  Cancelled:       {}", self.cancelled)?;
        writeln!(f, "  With documents:  {}", self.with_links)?;
        for (classification, count) in &self.by_classification {
            writeln!(f, "  {:<17}{}", format!("{}:", classification), count)?;
        }
        writeln!(f, "  Total:           {}", self.total)
    }
}
