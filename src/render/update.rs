//! # Update Block Renderer
//!
//! Renders one update slot: status, optional description, timestamp, and a
//! bounded list of document attachments with optional geocoordinates and an
//! embedded image each. Every sub-element reserves its own space, so a page
//! break may land anywhere inside a block, between one document's image and
//! the next document's name included. Blocks are not kept on one page.

use chrono::{DateTime, Utc};

use crate::image_loader::{ImageResolver, ResolvedImage};
use crate::layout::{Color, FlowCursor, TextStyle};
use crate::model::{DocumentRef, RenderOptions, Update};

/// Bounding box for an embedded attachment image, in points.
pub const MAX_IMAGE_WIDTH: f64 = 280.0;
pub const MAX_IMAGE_HEIGHT: f64 = 180.0;

/// Shown in place of an attachment whose image could not be resolved.
pub const IMAGE_FAILURE_NOTICE: &str = "[Image could not be loaded]";

/// Shown for a morning/evening slot with no posted update.
pub const EMPTY_SLOT_NOTICE: &str = "No update posted";

const BODY_SIZE: f64 = 10.0;
const DETAIL_SIZE: f64 = 9.0;

fn detail_style() -> TextStyle {
    TextStyle::new(DETAIL_SIZE).with_color(Color::GRAY)
}

/// Render one update slot, or the empty-slot notice when nothing was posted.
pub fn render_slot(
    cursor: &mut FlowCursor,
    slot: Option<&Update>,
    options: &RenderOptions,
    resolver: &dyn ImageResolver,
) {
    match slot {
        Some(update) => render_update(cursor, update, options, resolver),
        None => cursor.add_line(EMPTY_SLOT_NOTICE, TextStyle::new(BODY_SIZE).with_color(Color::GRAY)),
    }
}

/// Render a posted update's fields in order, each reserving space before it
/// draws.
pub fn render_update(
    cursor: &mut FlowCursor,
    update: &Update,
    options: &RenderOptions,
    resolver: &dyn ImageResolver,
) {
    cursor.add_line(&format!("Status: {}", update.status), TextStyle::new(BODY_SIZE));

    if let Some(description) = &update.update_description {
        cursor.add_line("Description:", TextStyle::bold(BODY_SIZE));
        cursor.add_text(description, TextStyle::new(BODY_SIZE));
    }

    cursor.add_line(
        &format!("Posted: {}", format_timestamp(&update.timestamp)),
        detail_style(),
    );

    if !update.documents.is_empty() {
        cursor.reserve_heading();
        cursor.add_line(
            &format!("Documents ({})", update.documents.len()),
            TextStyle::bold(BODY_SIZE),
        );

        let limit = options.max_documents_per_update;
        for (index, document) in update.documents.iter().take(limit).enumerate() {
            render_document(cursor, document, index, resolver);
        }
        if update.documents.len() > limit {
            cursor.add_line(
                &format!("+{} more document(s)", update.documents.len() - limit),
                detail_style(),
            );
        }
    }
}

fn render_document(
    cursor: &mut FlowCursor,
    document: &DocumentRef,
    index: usize,
    resolver: &dyn ImageResolver,
) {
    cursor.reserve_heading();
    let name = document
        .file_name
        .clone()
        .unwrap_or_else(|| format!("Document {}", index + 1));
    cursor.add_line(&name, TextStyle::new(BODY_SIZE));

    if let Some((latitude, longitude)) = document.location() {
        cursor.add_line(
            &format!("Location: {:.6}, {:.6}", latitude, longitude),
            detail_style(),
        );
    }

    // One resolution at a time: the page-break decision for whatever comes
    // next needs this attachment's actual rendered height.
    match resolver.resolve(&document.file_path) {
        ResolvedImage::Loaded(image) => {
            // A rejected placement consumes no space; rendering continues.
            cursor.add_image(&image, MAX_IMAGE_WIDTH, MAX_IMAGE_HEIGHT);
        }
        ResolvedImage::Missing => cursor.add_line(IMAGE_FAILURE_NOTICE, detail_style()),
    }
}

fn format_timestamp(timestamp: &DateTime<Utc>) -> String {
    timestamp.format("%b %-d, %Y %H:%M").to_string()
}
