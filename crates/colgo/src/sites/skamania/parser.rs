use std::sync::LazyLock;

use chrono::{Datelike, NaiveDate};
use regex::Regex;
use scraper::{Html, Selector};

use crate::parser::{elem_text, normalize_whitespace, numeric_dates};

static RE_YEAR: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{4}").expect("invalid regex: year"));
static RE_RANGE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\bto\b").expect("invalid regex: date range"));

/// An entry of a document center listing: a subfolder or a document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) struct DocumentLink {
    pub text: String,
    pub href: String,
}

pub(super) fn document_links(document: &Html) -> Vec<DocumentLink> {
    let selector = Selector::parse("ul a.content_link").unwrap();
    document
        .select(&selector)
        .map(|link| DocumentLink {
            text: normalize_whitespace(&elem_text(link)),
            href: link.value().attr("href").unwrap_or("").trim().to_string(),
        })
        .collect()
}

pub(super) fn is_folder(href: &str) -> bool {
    href.contains("folder")
}

/// Year named by the deepest breadcrumb that names one.
pub(super) fn breadcrumb_year(document: &Html) -> Option<i32> {
    let selector = Selector::parse(".document_breadcrumb a").unwrap();
    document
        .select(&selector)
        .filter_map(|crumb| {
            RE_YEAR
                .find(&elem_text(crumb))
                .and_then(|m| m.as_str().parse().ok())
        })
        .last()
}

/// Dates named in a document title. The folder year, when known, replaces the
/// year written in the title, and "X to Y" expands to every day in between.
pub(super) fn extract_dates(text: &str, folder_year: Option<i32>) -> Vec<NaiveDate> {
    let dates: Vec<NaiveDate> = numeric_dates(text)
        .into_iter()
        .filter_map(|date| match folder_year {
            Some(year) => date.with_year(year),
            None => Some(date),
        })
        .collect();

    if let [from, to] = dates[..]
        && RE_RANGE.is_match(text)
    {
        return from.iter_days().take_while(|day| *day <= to).collect();
    }
    dates
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_document_links_and_breadcrumb() {
        let html = fs::read_to_string("fixtures/skamania_bocc.html")
            .expect("Failed to read skamania_bocc.html fixture");
        let document = Html::parse_document(&html);

        let links = document_links(&document);
        assert_eq!(links.len(), 8);
        assert_eq!(links[0].text, "Archived Agendas");
        assert!(is_folder(&links[0].href));
        assert_eq!(
            links[1],
            DocumentLink {
                text: "BOCC Agenda 1/13/26".to_string(),
                href: "/home/showpublisheddocument/17384".to_string(),
            }
        );
        assert_eq!(breadcrumb_year(&document), Some(2026));
    }

    #[test]
    fn test_extract_dates() {
        assert_eq!(extract_dates("BOCC Agenda 1/13/26", None), vec![date(2026, 1, 13)]);
        assert_eq!(
            extract_dates("BOCC Agenda 1/13/25", Some(2026)),
            vec![date(2026, 1, 13)],
            "folder year wins over the written year"
        );
        assert_eq!(
            extract_dates("Budget Workshops 1/20/26 to 1/22/26", None),
            vec![date(2026, 1, 20), date(2026, 1, 21), date(2026, 1, 22)]
        );
        assert_eq!(
            extract_dates("Tour 1/20/26 and Hearing 1/22/26", None),
            vec![date(2026, 1, 20), date(2026, 1, 22)],
            "two dates without 'to' are separate meetings"
        );
        assert_eq!(
            extract_dates("Tomorrow 1/20/26 1/22/26", None).len(),
            2,
            "'to' inside a word is not a range"
        );
        assert!(extract_dates("Meeting Audio Recording", Some(2026)).is_empty());
        assert!(
            extract_dates("Leap day 2/29/24", Some(2025)).is_empty(),
            "a date that does not exist in the folder year is skipped"
        );
    }
}
