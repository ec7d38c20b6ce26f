//! # Finalizer
//!
//! Total page count only exists once assembly has finished, so footers are
//! necessarily a second pass: re-visit every produced page once and stamp a
//! centered "Page i of N" at a fixed distance above the bottom edge. The
//! pass appends elements only; it never adds or removes pages.
//!
//! Also derives the output filename from report metadata.

use chrono::NaiveDate;

use crate::font::FontContext;
use crate::layout::{Color, LayoutPage, PageElement};
use crate::model::ReportKind;

const FOOTER_SIZE: f64 = 9.0;
const FOOTER_BASELINE_FROM_BOTTOM: f64 = 25.0;

/// Stamp every page with its "Page i of N" footer.
pub fn stamp_page_numbers(pages: &mut [LayoutPage]) {
    let fonts = FontContext::new();
    let total = pages.len();

    for (index, page) in pages.iter_mut().enumerate() {
        let label = format!("Page {} of {}", index + 1, total);
        let width = fonts.measure_string(&label, FOOTER_SIZE, false);
        page.elements.push(PageElement::Text {
            x: (page.width - width) / 2.0,
            y: page.height - FOOTER_BASELINE_FROM_BOTTOM,
            text: label,
            size: FOOTER_SIZE,
            bold: false,
            color: Color::GRAY,
        });
    }
}

/// Derive the output filename: `<slug>_<kind>_report_<startDate>.pdf`.
pub fn output_file_name(project_name: &str, kind: ReportKind, start_date: NaiveDate) -> String {
    format!(
        "{}_{}_report_{}.pdf",
        slug(project_name),
        kind,
        start_date.format("%Y-%m-%d")
    )
}

/// Lowercase and replace every non-alphanumeric character with an underscore.
fn slug(value: &str) -> String {
    value
        .to_lowercase()
        .chars()
        .map(|ch| if ch.is_alphanumeric() { ch } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{FlowCursor, PageGeometry, TextStyle};

    fn three_pages() -> Vec<LayoutPage> {
        let mut cursor = FlowCursor::new(PageGeometry::a4());
        for i in 0..3 {
            if i > 0 {
                cursor.advance(cursor.geometry().content_height());
            }
            cursor.add_line(&format!("page {}", i + 1), TextStyle::new(10.0));
        }
        cursor.finish()
    }

    fn footer_labels(pages: &[LayoutPage]) -> Vec<String> {
        pages
            .iter()
            .flat_map(|p| p.elements.iter())
            .filter_map(|e| e.text())
            .filter(|t| t.starts_with("Page "))
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_every_page_gets_its_label() {
        let mut pages = three_pages();
        stamp_page_numbers(&mut pages);
        assert_eq!(
            footer_labels(&pages),
            vec!["Page 1 of 3", "Page 2 of 3", "Page 3 of 3"]
        );
    }

    #[test]
    fn test_stamping_never_changes_page_count() {
        let mut pages = three_pages();
        stamp_page_numbers(&mut pages);
        assert_eq!(pages.len(), 3);
        stamp_page_numbers(&mut pages);
        assert_eq!(pages.len(), 3, "a second pass must not add pages");
    }

    #[test]
    fn test_footer_is_near_bottom_and_centered() {
        let mut pages = three_pages();
        stamp_page_numbers(&mut pages);
        let page = &pages[0];
        let footer = page
            .elements
            .iter()
            .find_map(|e| match e {
                PageElement::Text { x, y, text, .. } if text.starts_with("Page ") => {
                    Some((*x, *y))
                }
                _ => None,
            })
            .unwrap();
        assert!((footer.1 - (page.height - FOOTER_BASELINE_FROM_BOTTOM)).abs() < 1e-9);
        assert!(footer.0 > page.width / 3.0 && footer.0 < page.width / 2.0);
    }

    #[test]
    fn test_output_file_name_slug() {
        let start = NaiveDate::from_ymd_opt(2024, 3, 4).unwrap();
        assert_eq!(
            output_file_name("Dockside Crane #4", ReportKind::Daily, start),
            "dockside_crane__4_daily_report_2024-03-04.pdf"
        );
        assert_eq!(
            output_file_name("Alpha", ReportKind::Weekly, start),
            "alpha_weekly_report_2024-03-04.pdf"
        );
    }
}
