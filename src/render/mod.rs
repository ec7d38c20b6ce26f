//! # Report Traversal / Document Assembler
//!
//! Drives the whole render top-down: cover page, summary block, then the
//! per-date timeline: dates descending (most recent first), members in the
//! report's given order, and the morning/evening slot pair per member. The
//! cursor is consulted for every placement; the image pipeline is only ever
//! invoked from the update block renderer.

pub mod finalize;
pub mod update;

use chrono::NaiveDate;

use crate::error::SitrepError;
use crate::image_loader::ImageResolver;
use crate::layout::{Color, FlowCursor, LayoutPage, TextStyle};
use crate::model::{DaySlots, RenderOptions, Report};

const TITLE_SIZE: f64 = 22.0;
const SUBTITLE_SIZE: f64 = 14.0;
const HEADING_SIZE: f64 = 13.0;
const SUBHEADING_SIZE: f64 = 11.0;
const BODY_SIZE: f64 = 10.0;
const DETAIL_SIZE: f64 = 9.0;

/// Headroom reserved before a date heading, so a heading never lands alone
/// at the very bottom of a page.
const DATE_HEADROOM: f64 = 60.0;
const MEMBER_HEADROOM: f64 = 40.0;

const SLOT_GAP: f64 = 6.0;
const MEMBER_GAP: f64 = 12.0;

/// Assemble the full report into pages, footers stamped.
pub fn assemble_pages(
    report: &Report,
    options: &RenderOptions,
    resolver: &dyn ImageResolver,
) -> Result<Vec<LayoutPage>, SitrepError> {
    if options.start_date > options.end_date {
        return Err(SitrepError::InvalidDateRange {
            start: options.start_date,
            end: options.end_date,
        });
    }

    let mut cursor = FlowCursor::new(options.geometry);
    render_cover(&mut cursor, report, options);
    render_summary(&mut cursor, report);
    render_timeline(&mut cursor, report, options, resolver);

    let mut pages = cursor.finish();
    finalize::stamp_page_numbers(&mut pages);
    Ok(pages)
}

fn render_cover(cursor: &mut FlowCursor, report: &Report, options: &RenderOptions) {
    cursor.advance(120.0);
    cursor.add_line_centered(options.kind.label(), TextStyle::bold(TITLE_SIZE));
    cursor.advance(10.0);
    cursor.add_line_centered(&report.project.name, TextStyle::bold(SUBTITLE_SIZE));

    if let Some(description) = &report.project.description {
        cursor.advance(6.0);
        cursor.add_text_centered(description, TextStyle::new(BODY_SIZE).with_color(Color::GRAY));
    }

    cursor.advance(24.0);
    cursor.add_line_centered(
        &format!("Report type: {}", options.kind),
        TextStyle::new(BODY_SIZE),
    );
    cursor.add_line_centered(
        &format!(
            "{} to {}",
            format_date(options.start_date),
            format_date(options.end_date)
        ),
        TextStyle::new(BODY_SIZE),
    );
    cursor.advance(6.0);
    cursor.add_line_centered(
        &format!(
            "Generated {}",
            options.generated_at.format("%b %-d, %Y %H:%M UTC")
        ),
        TextStyle::new(DETAIL_SIZE).with_color(Color::GRAY),
    );
}

fn render_summary(cursor: &mut FlowCursor, report: &Report) {
    cursor.advance(30.0);
    cursor.reserve_heading();
    cursor.add_line("Summary", TextStyle::bold(HEADING_SIZE));
    cursor.add_rule(Color::RULE_GRAY);
    cursor.add_line(
        &format!("Status: {}", report.project.status),
        TextStyle::new(BODY_SIZE),
    );
    cursor.add_line(
        &format!("Teams: {}", report.teams.len()),
        TextStyle::new(BODY_SIZE),
    );
    cursor.add_line(
        &format!("Members: {}", report.members.len()),
        TextStyle::new(BODY_SIZE),
    );
}

fn render_timeline(
    cursor: &mut FlowCursor,
    report: &Report,
    options: &RenderOptions,
    resolver: &dyn ImageResolver,
) {
    let empty_slots = DaySlots::default();

    for date in enumerate_dates_descending(options.start_date, options.end_date) {
        cursor.advance(16.0);
        cursor.reserve(DATE_HEADROOM);
        cursor.add_line(&format_date(date), TextStyle::bold(HEADING_SIZE));
        cursor.add_rule(Color::RULE_GRAY);

        for member in &report.members {
            cursor.reserve(MEMBER_HEADROOM);
            cursor.add_line(member.display_name(), TextStyle::bold(SUBHEADING_SIZE));

            let slots = report.day_slots(date, member.id()).unwrap_or(&empty_slots);

            cursor.add_line(
                "Morning Update",
                TextStyle::bold(SUBHEADING_SIZE).with_color(Color::MORNING_BLUE),
            );
            update::render_slot(cursor, slots.morning.as_ref(), options, resolver);
            cursor.advance(SLOT_GAP);

            cursor.add_line(
                "Evening Update",
                TextStyle::bold(SUBHEADING_SIZE).with_color(Color::EVENING_ORANGE),
            );
            update::render_slot(cursor, slots.evening.as_ref(), options, resolver);
            cursor.advance(MEMBER_GAP);
        }
    }
}

/// Enumerate every day in `[start, end]` inclusive, then sort most recent
/// first. The sort-after-enumerate order is a display choice, not an
/// artifact of storage order.
pub fn enumerate_dates_descending(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    let mut dates = Vec::new();
    let mut day = start;
    while day <= end {
        dates.push(day);
        match day.succ_opt() {
            Some(next) => day = next,
            None => break,
        }
    }
    dates.sort_by(|a, b| b.cmp(a));
    dates
}

fn format_date(date: NaiveDate) -> String {
    date.format("%A, %B %-d, %Y").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_loader::{ImageResolver, ResolvedImage};
    use crate::model::{Member, Project, ReportKind, Team, Update};
    use chrono::{TimeZone, Utc};
    use std::collections::{BTreeMap, HashMap};

    struct NoImages;

    impl ImageResolver for NoImages {
        fn resolve(&self, _source: &str) -> ResolvedImage {
            ResolvedImage::Missing
        }
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn basic_report(members: Vec<Member>) -> Report {
        Report {
            project: Project {
                name: "Dockside Crane".into(),
                description: Some("Quay crane refit".into()),
                status: "active".into(),
            },
            teams: vec![Team { name: "Rigging".into() }],
            members,
            updates_by_date: BTreeMap::new(),
        }
    }

    fn morning_update() -> Update {
        Update {
            status: "on site".into(),
            update_description: None,
            timestamp: Utc.with_ymd_and_hms(2024, 1, 2, 8, 0, 0).unwrap(),
            documents: vec![],
        }
    }

    fn texts(pages: &[LayoutPage]) -> Vec<String> {
        pages
            .iter()
            .flat_map(|p| p.elements.iter())
            .filter_map(|e| e.text().map(str::to_string))
            .collect()
    }

    #[test]
    fn test_date_enumeration_inclusive_descending() {
        let dates = enumerate_dates_descending(date(2024, 1, 1), date(2024, 1, 3));
        assert_eq!(
            dates,
            vec![date(2024, 1, 3), date(2024, 1, 2), date(2024, 1, 1)]
        );
    }

    #[test]
    fn test_single_day_range() {
        let d = date(2024, 1, 1);
        assert_eq!(enumerate_dates_descending(d, d), vec![d]);
    }

    #[test]
    fn test_inverted_range_is_fatal() {
        let report = basic_report(vec![]);
        let options = RenderOptions::new(ReportKind::Daily, date(2024, 1, 3), date(2024, 1, 1));
        let err = assemble_pages(&report, &options, &NoImages).unwrap_err();
        assert!(matches!(err, SitrepError::InvalidDateRange { .. }));
    }

    #[test]
    fn test_dates_render_most_recent_first() {
        let report = basic_report(vec![]);
        let options = RenderOptions::new(ReportKind::Daily, date(2024, 1, 1), date(2024, 1, 3));
        let pages = assemble_pages(&report, &options, &NoImages).unwrap();
        let lines = texts(&pages);
        let pos = |needle: &str| lines.iter().position(|l| l == needle).unwrap();
        let third = pos("Wednesday, January 3, 2024");
        let second = pos("Tuesday, January 2, 2024");
        let first = pos("Monday, January 1, 2024");
        assert!(third < second && second < first);
    }

    #[test]
    fn test_members_render_in_given_order() {
        let report = basic_report(vec![
            Member::Profile {
                id: "u-2".into(),
                name: Some("Zara".into()),
                email: None,
            },
            Member::Profile {
                id: "u-1".into(),
                name: Some("Ale".into()),
                email: None,
            },
        ]);
        let d = date(2024, 1, 1);
        let options = RenderOptions::new(ReportKind::Daily, d, d);
        let pages = assemble_pages(&report, &options, &NoImages).unwrap();
        let lines = texts(&pages);
        let zara = lines.iter().position(|l| l == "Zara").unwrap();
        let ale = lines.iter().position(|l| l == "Ale").unwrap();
        assert!(zara < ale, "member list order must be preserved");
    }

    #[test]
    fn test_morning_only_yields_one_empty_slot_notice() {
        let mut report = basic_report(vec![Member::Profile {
            id: "u-1".into(),
            name: Some("Ana".into()),
            email: None,
        }]);
        let d = date(2024, 1, 2);
        let mut slots_by_member = HashMap::new();
        slots_by_member.insert(
            "u-1".to_string(),
            DaySlots {
                morning: Some(morning_update()),
                evening: None,
            },
        );
        report.updates_by_date.insert(d, slots_by_member);

        let options = RenderOptions::new(ReportKind::Daily, d, d);
        let pages = assemble_pages(&report, &options, &NoImages).unwrap();
        let lines = texts(&pages);
        let notices = lines
            .iter()
            .filter(|l| *l == update::EMPTY_SLOT_NOTICE)
            .count();
        assert_eq!(notices, 1, "only the evening slot is empty");
        assert_eq!(lines.iter().filter(|l| *l == "Status: on site").count(), 1);
    }

    #[test]
    fn test_date_without_updates_renders_two_empty_slots() {
        let report = basic_report(vec![Member::Id("u-9".into())]);
        let d = date(2024, 1, 1);
        let options = RenderOptions::new(ReportKind::Daily, d, d);
        let pages = assemble_pages(&report, &options, &NoImages).unwrap();
        let lines = texts(&pages);
        let notices = lines
            .iter()
            .filter(|l| *l == update::EMPTY_SLOT_NOTICE)
            .count();
        assert_eq!(notices, 2);
        assert!(lines.contains(&"Unknown".to_string()));
    }

    #[test]
    fn test_cover_and_summary_present() {
        let report = basic_report(vec![]);
        let d = date(2024, 1, 1);
        let options = RenderOptions::new(ReportKind::Weekly, d, d);
        let pages = assemble_pages(&report, &options, &NoImages).unwrap();
        let lines = texts(&pages);
        assert!(lines.contains(&"Weekly Activity Report".to_string()));
        assert!(lines.contains(&"Dockside Crane".to_string()));
        assert!(lines.contains(&"Quay crane refit".to_string()));
        assert!(lines.contains(&"Report type: weekly".to_string()));
        assert!(lines.contains(&"Summary".to_string()));
        assert!(lines.contains(&"Teams: 1".to_string()));
        assert!(lines.contains(&"Members: 0".to_string()));
    }
}
