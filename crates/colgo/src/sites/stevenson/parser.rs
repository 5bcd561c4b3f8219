use chrono::NaiveDateTime;
use scraper::{ElementRef, Html, Selector};

use crate::parser::{combine_date_time, elem_text, join_url, normalize_whitespace, parse_iso_datetime};
use crate::types::{Link, LinkKind, Links};

/// Document columns of the meetings table, in output order.
const LINK_COLUMNS: [(&str, LinkKind); 4] = [
    ("td.views-field-field-agenda a", LinkKind::Agenda),
    ("td.views-field-field-packet a", LinkKind::AgendaPacket),
    ("td.views-field-field-minutes a", LinkKind::Minutes),
    ("td.views-field-field-video a", LinkKind::Video),
];

pub(super) fn meeting_rows(document: &Html) -> Vec<ElementRef<'_>> {
    let selector = Selector::parse("table.views-table tbody tr").unwrap();
    document.select(&selector).collect()
}

pub(super) fn row_title(row: ElementRef) -> String {
    let selector = Selector::parse("td.views-field-title").unwrap();
    row.select(&selector)
        .next()
        .map(|td| normalize_whitespace(&elem_text(td)))
        .unwrap_or_default()
}

/// Machine-readable `content` attribute first, else the "MM/DD/YYYY - h:mmpm" text.
pub(super) fn row_start(row: ElementRef) -> Option<NaiveDateTime> {
    let cell_selector = Selector::parse("td.views-field-field-calendar-date").unwrap();
    let span_selector = Selector::parse(".date-display-single").unwrap();
    let cell = row.select(&cell_selector).next()?;

    if let Some(start) = cell
        .select(&span_selector)
        .next()
        .and_then(|span| span.value().attr("content"))
        .and_then(parse_iso_datetime)
    {
        return Some(start);
    }

    let text = normalize_whitespace(&elem_text(cell));
    let (date, time) = text.split_once(" - ").unwrap_or((text.as_str(), ""));
    combine_date_time(date, time)
}

pub(super) fn row_links(row: ElementRef, page_url: &str) -> Links {
    let mut links = Links::new();
    for (selector, kind) in LINK_COLUMNS {
        let selector = Selector::parse(selector).unwrap();
        for href in row.select(&selector).filter_map(|a| a.value().attr("href")) {
            links.push(Link::new(join_url(page_url, href), kind));
        }
    }
    links
}

pub(super) fn next_page(document: &Html) -> Option<String> {
    let selector = Selector::parse("li.pager-next a").unwrap();
    document
        .select(&selector)
        .next()
        .and_then(|a| a.value().attr("href"))
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use std::fs;

    use chrono::NaiveDate;

    use super::*;

    const PAGE_URL: &str = "https://www.ci.stevenson.wa.us/meetings?field_microsite_tid_1=27";

    fn document() -> Html {
        let html = fs::read_to_string("fixtures/stevenson_meetings.html")
            .expect("Failed to read stevenson_meetings.html fixture");
        Html::parse_document(&html)
    }

    #[test]
    fn test_rows_titles_and_pager() {
        let document = document();
        let rows = meeting_rows(&document);
        assert_eq!(rows.len(), 5);
        assert_eq!(row_title(rows[0]), "December 18th, 2025 Regular Council Meeting");
        assert_eq!(row_title(rows[3]), "Council Retreat");
        assert_eq!(
            next_page(&document).as_deref(),
            Some("/meetings?field_microsite_tid_1=27&page=1")
        );
    }

    #[test]
    fn test_row_start() {
        let document = document();
        let rows = meeting_rows(&document);
        assert_eq!(
            row_start(rows[0]),
            NaiveDate::from_ymd_opt(2025, 12, 18).unwrap().and_hms_opt(18, 0, 0)
        );
        assert_eq!(
            row_start(rows[1]),
            NaiveDate::from_ymd_opt(2025, 12, 1).unwrap().and_hms_opt(17, 30, 0),
            "display text is used when the content attribute is absent"
        );
        assert_eq!(row_start(rows[3]), None);
    }

    #[test]
    fn test_row_links() {
        let document = document();
        let rows = meeting_rows(&document);
        let links = row_links(rows[1], PAGE_URL);
        let titles: Vec<&str> = links.iter().map(|l| l.title.as_str()).collect();
        assert_eq!(titles, vec!["Agenda", "Agenda Packet", "Minutes", "Video"]);
        assert!(links.iter().all(|l| l.href.starts_with("https://www.ci.stevenson.wa.us/")));

        let shared = row_links(rows[2], PAGE_URL);
        assert_eq!(shared.len(), 2, "packet sharing the agenda href is dropped");
        assert!(row_links(rows[4], PAGE_URL).is_empty());
    }

    #[test]
    fn test_last_page_has_no_next() {
        let document = Html::parse_document("<ul class=\"pager\"><li class=\"pager-current\">2</li></ul>");
        assert_eq!(next_page(&document), None);
    }
}
