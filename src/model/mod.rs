//! # Report Data Model
//!
//! The input representation for the rendering engine. The report tree
//! (project, teams, members, and per-date update slots) is supplied fully
//! populated by the caller; this crate only reads it. Field names follow
//! the camelCase JSON produced by the reporting backend.

use std::collections::{BTreeMap, HashMap};
use std::fmt;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::layout::PageGeometry;

/// Default cap on individually rendered documents per update. Documents past
/// the cap are summarized as a count so document size stays proportional to
/// report size. Override via [`RenderOptions::max_documents_per_update`].
pub const DEFAULT_DOCUMENT_LIMIT: usize = 6;

/// A complete activity report ready for rendering.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub project: Project,

    #[serde(default)]
    pub teams: Vec<Team>,

    #[serde(default)]
    pub members: Vec<Member>,

    /// Update slots keyed by date, then by member id.
    #[serde(default)]
    pub updates_by_date: BTreeMap<NaiveDate, HashMap<String, DaySlots>>,
}

impl Report {
    /// Look up one member's slots for one date. A date with no recorded
    /// updates at all, or a member without an entry, yields `None`; the
    /// renderer treats that as two empty slots.
    pub fn day_slots(&self, date: NaiveDate, member_id: &str) -> Option<&DaySlots> {
        self.updates_by_date.get(&date)?.get(member_id)
    }
}

/// The project a report describes. A report without a project name is
/// malformed input and fails deserialization.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    pub status: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
}

/// A project member: either a bare id (display name unknown) or a profile
/// record. The id is a stable identifier independent of display name and is
/// the key into [`Report::updates_by_date`].
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Member {
    Id(String),
    Profile {
        id: String,
        #[serde(default)]
        name: Option<String>,
        #[serde(default)]
        email: Option<String>,
    },
}

impl Member {
    pub fn id(&self) -> &str {
        match self {
            Member::Id(id) => id,
            Member::Profile { id, .. } => id,
        }
    }

    /// Display-name policy: prefer name, else email, else "Unknown".
    pub fn display_name(&self) -> &str {
        match self {
            Member::Id(_) => "Unknown",
            Member::Profile { name, email, .. } => name
                .as_deref()
                .or(email.as_deref())
                .unwrap_or("Unknown"),
        }
    }
}

/// The morning and evening update slots for one member on one date.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaySlots {
    #[serde(default)]
    pub morning: Option<Update>,
    #[serde(default)]
    pub evening: Option<Update>,
}

/// One posted update.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Update {
    pub status: String,
    #[serde(default)]
    pub update_description: Option<String>,
    pub timestamp: DateTime<Utc>,
    #[serde(default)]
    pub documents: Vec<DocumentRef>,
}

/// A document attached to an update. `file_path` is the source location for
/// the attachment image (URL, filesystem path, or data URI).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentRef {
    #[serde(default)]
    pub file_name: Option<String>,
    pub file_path: String,
    #[serde(default)]
    pub latitude: Option<f64>,
    #[serde(default)]
    pub longitude: Option<f64>,
}

impl DocumentRef {
    /// Geocoordinates, only when both halves are present.
    pub fn location(&self) -> Option<(f64, f64)> {
        self.latitude.zip(self.longitude)
    }
}

/// Report cadence. Affects display text and the output filename only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportKind {
    Daily,
    Weekly,
}

impl ReportKind {
    /// Cover-page title.
    pub fn label(&self) -> &'static str {
        match self {
            ReportKind::Daily => "Daily Activity Report",
            ReportKind::Weekly => "Weekly Activity Report",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportKind::Daily => f.write_str("daily"),
            ReportKind::Weekly => f.write_str("weekly"),
        }
    }
}

/// Parameters for one render, supplied by the caller alongside the report.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub kind: ReportKind,
    /// First day of the reporting window (inclusive).
    pub start_date: NaiveDate,
    /// Last day of the reporting window (inclusive).
    pub end_date: NaiveDate,
    /// Documents rendered individually per update before summarizing.
    pub max_documents_per_update: usize,
    pub geometry: PageGeometry,
    /// Timestamp shown on the cover page.
    pub generated_at: DateTime<Utc>,
}

impl RenderOptions {
    pub fn new(kind: ReportKind, start_date: NaiveDate, end_date: NaiveDate) -> Self {
        Self {
            kind,
            start_date,
            end_date,
            max_documents_per_update: DEFAULT_DOCUMENT_LIMIT,
            geometry: PageGeometry::a4(),
            generated_at: Utc::now(),
        }
    }
}

/// The JSON envelope accepted by `render_json` and the CLI: the report plus
/// the window and cadence the caller wants rendered.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderRequest {
    pub report: Report,
    pub report_type: ReportKind,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    #[serde(default)]
    pub max_documents_per_update: Option<usize>,
}

impl RenderRequest {
    pub fn options(&self) -> RenderOptions {
        let mut options = RenderOptions::new(self.report_type, self.start_date, self.end_date);
        if let Some(limit) = self.max_documents_per_update {
            options.max_documents_per_update = limit;
        }
        options
    }
}
