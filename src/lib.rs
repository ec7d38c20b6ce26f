//! # Sitrep
//!
//! A paginated activity-report renderer.
//!
//! Sitrep takes a structured report (a project, its teams, its members, and
//! their timestamped morning/evening updates over a date range) and flows it
//! into pages. Nothing is laid out on an infinite canvas and sliced later:
//! every heading, wrapped line, and embedded image reserves its height
//! against the current page before it is drawn, and the cursor opens a new
//! page the moment a reservation does not fit. Once the page count is known,
//! a second pass stamps the "Page i of N" footers.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON/API)
//!       ↓
//!   [model]         — Report tree: project, members, update slots
//!       ↓
//!   [render]        — Traversal: cover → summary → date ↓ member ↓ slot
//!       ↓               (update blocks pull images through [image_loader])
//!   [layout]        — FlowCursor: reserve-or-break, wrap, embed
//!       ↓
//!   [pdf]           — Serialize pages to PDF bytes
//! ```
//!
//! Image resolution is the only blocking boundary: attachments resolve one
//! at a time so every page-break decision sees the true height of what came
//! before. Each render owns its layout state; renders never share a cursor.

pub mod error;
pub mod font;
pub mod image_loader;
pub mod layout;
pub mod model;
pub mod pdf;
pub mod render;

pub use error::SitrepError;
pub use image_loader::{DefaultImageResolver, ImageResolver, ResolvedImage};
pub use model::{RenderOptions, RenderRequest, Report, ReportKind};

use layout::LayoutPage;
use pdf::PdfWriter;

/// The assembled page model plus the derived output filename. Useful when a
/// caller (or a test) wants to inspect layout before serialization.
pub struct AssembledDocument {
    pub pages: Vec<LayoutPage>,
    pub file_name: String,
}

/// A finished document: PDF bytes plus the filename to store them under.
#[derive(Debug)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    pub file_name: String,
}

/// Assemble a report into pages (footers stamped) without serializing.
pub fn assemble(
    report: &Report,
    options: &RenderOptions,
    resolver: &dyn ImageResolver,
) -> Result<AssembledDocument, SitrepError> {
    let pages = render::assemble_pages(report, options, resolver)?;
    let file_name =
        render::finalize::output_file_name(&report.project.name, options.kind, options.start_date);
    Ok(AssembledDocument { pages, file_name })
}

/// Render a report to PDF bytes.
///
/// This is the primary entry point. The returned filename follows
/// `<project-slug>_<kind>_report_<startDate>.pdf`.
pub fn render(
    report: &Report,
    options: &RenderOptions,
    resolver: &dyn ImageResolver,
) -> Result<RenderedDocument, SitrepError> {
    let assembled = assemble(report, options, resolver)?;
    let title = format!("{}: {}", report.project.name, options.kind.label());
    let bytes = PdfWriter::new().write(&assembled.pages, &title);
    Ok(RenderedDocument {
        bytes,
        file_name: assembled.file_name,
    })
}

/// Render a report described as a JSON request envelope to PDF bytes.
pub fn render_json(
    json: &str,
    resolver: &dyn ImageResolver,
) -> Result<RenderedDocument, SitrepError> {
    let request: RenderRequest = serde_json::from_str(json)?;
    render(&request.report, &request.options(), resolver)
}
