//! Wire types for the OmpNetwork `api-cache` session listing.
//!
//! The endpoint is shared by The Dalles meeting spiders and the Hood River
//! video lookup. Numbers come back as either JSON numbers or strings depending
//! on the field and the site, so they are read leniently.

use serde::{Deserialize, Deserializer};

pub(crate) const PAGE_SIZE: u32 = 100;

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(i64),
    String(String),
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<NumberOrString>::deserialize(deserializer)? {
        Some(NumberOrString::Number(n)) => Some(n),
        Some(NumberOrString::String(s)) => s.trim().parse().ok(),
        None => None,
    })
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OmpPage {
    #[serde(default)]
    pub results: Vec<OmpSession>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub start: Option<i64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub size: Option<i64>,
    #[serde(default, rename = "totalSize", deserialize_with = "lenient_i64")]
    pub total_size: Option<i64>,
}

impl OmpPage {
    /// Offset of the page after this one, or `None` once `start + size` reaches the total.
    pub fn next_start(&self) -> Option<i64> {
        let start = self.start.unwrap_or(0);
        let size = self.size.unwrap_or(0);
        let total = self.total_size.unwrap_or(0);
        (size > 0 && start + size < total).then_some(start + size)
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OmpSession {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_i64")]
    pub date: Option<i64>,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub documents: Option<Vec<OmpDocument>>,
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct OmpDocument {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default, rename = "type")]
    pub doc_type: Option<String>,
}

pub(crate) fn sessions_url(base_url: &str, site_id: &str, category: Option<&str>, start: i64) -> String {
    match category {
        Some(category) => format!(
            "{}/api-cache/site/{}/sessions?category[]={}&start={}&limit={}",
            base_url, site_id, category, start, PAGE_SIZE
        ),
        None => format!(
            "{}/api-cache/site/{}/sessions?start={}&limit={}",
            base_url, site_id, start, PAGE_SIZE
        ),
    }
}
