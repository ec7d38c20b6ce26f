//! # Page-Aware Content Flow
//!
//! The heart of sitrep. The report is never laid out on an infinite canvas:
//! every piece of content declares the vertical space it needs *before* it is
//! placed, and the cursor opens a new page whenever the declaration does not
//! fit. Total content size is never known ahead of time; pagination is
//! decided incrementally, one reservation at a time.
//!
//! The flow algorithm:
//!
//! 1. Open a page with known content height and a cursor at the top margin.
//! 2. Before placing anything, reserve its height. Headings and images
//!    reserve once with a known height; wrapped text reserves per line,
//!    since the wrapped height only exists after wrapping.
//! 3. If the reservation fits, placement is a no-op for the cursor.
//! 4. If it doesn't, append a fresh page and reset the cursor to the top.
//!
//! Pages are only ever appended (never shrunk or merged), so a later pass
//! (the page-number footer) can rely on stable page indices.
//!
//! Layout state is a value owned by one render. Two concurrent renders each
//! build their own [`FlowCursor`]; nothing here is shared or global.

pub mod wrap;

use crate::font::FontContext;
use crate::image_loader::LoadedImage;

/// Vertical space reserved when a caller has no better estimate: enough for
/// one heading line.
pub const DEFAULT_RESERVE: f64 = 20.0;

/// Line height as a multiple of font size.
pub const LINE_HEIGHT_FACTOR: f64 = 1.4;

/// Gap left under an embedded image.
pub const IMAGE_GAP: f64 = 8.0;

/// Pixel-to-point conversion at the CSS reference density of 96 dpi.
const PX_TO_PT: f64 = 72.0 / 96.0;

/// Page size and uniform margin, in points.
#[derive(Debug, Clone, Copy)]
pub struct PageGeometry {
    pub width: f64,
    pub height: f64,
    pub margin: f64,
}

impl PageGeometry {
    /// A4 portrait with a 50pt margin.
    pub fn a4() -> Self {
        Self {
            width: 595.28,
            height: 841.89,
            margin: 50.0,
        }
    }

    pub fn content_width(&self) -> f64 {
        self.width - 2.0 * self.margin
    }

    pub fn content_height(&self) -> f64 {
        self.height - 2.0 * self.margin
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::a4()
    }
}

/// An RGB color, components in 0.0..=1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const BLACK: Color = Color { r: 0.0, g: 0.0, b: 0.0 };
    /// Secondary text (timestamps, footers, empty-slot notices).
    pub const GRAY: Color = Color { r: 0.45, g: 0.45, b: 0.45 };
    /// "Morning Update" label tone.
    pub const MORNING_BLUE: Color = Color { r: 0.13, g: 0.38, b: 0.82 };
    /// "Evening Update" label tone.
    pub const EVENING_ORANGE: Color = Color { r: 0.85, g: 0.45, b: 0.10 };
    /// Separator rules.
    pub const RULE_GRAY: Color = Color { r: 0.78, g: 0.78, b: 0.78 };
}

/// Styling for one text call. Carried on the emitted element, so color and
/// weight are scoped to the call that asked for them and can never leak into
/// a later draw.
#[derive(Debug, Clone, Copy)]
pub struct TextStyle {
    pub size: f64,
    pub bold: bool,
    pub color: Color,
}

impl TextStyle {
    pub fn new(size: f64) -> Self {
        Self {
            size,
            bold: false,
            color: Color::BLACK,
        }
    }

    pub fn bold(size: f64) -> Self {
        Self {
            size,
            bold: true,
            color: Color::BLACK,
        }
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = color;
        self
    }

    fn line_height(&self) -> f64 {
        self.size * LINE_HEIGHT_FACTOR
    }
}

/// A positioned element on a finished page. Coordinates are in points from
/// the page's top-left corner.
#[derive(Debug, Clone)]
pub enum PageElement {
    Text {
        x: f64,
        /// Baseline position from the page top.
        y: f64,
        text: String,
        size: f64,
        bold: bool,
        color: Color,
    },
    Image {
        x: f64,
        /// Top edge from the page top.
        y: f64,
        width: f64,
        height: f64,
        image: LoadedImage,
    },
    Rule {
        x: f64,
        y: f64,
        width: f64,
        color: Color,
    },
}

impl PageElement {
    /// The text content, if this element draws any.
    pub fn text(&self) -> Option<&str> {
        match self {
            PageElement::Text { text, .. } => Some(text),
            _ => None,
        }
    }
}

/// A fully laid-out page ready for serialization.
#[derive(Debug, Clone)]
pub struct LayoutPage {
    pub width: f64,
    pub height: f64,
    pub elements: Vec<PageElement>,
}

impl LayoutPage {
    fn new(geometry: &PageGeometry) -> Self {
        Self {
            width: geometry.width,
            height: geometry.height,
            elements: Vec::new(),
        }
    }
}

/// The layout cursor / page-break controller.
///
/// Owns the vertical write position on the current page and the growing page
/// list. `y` is relative to the content top (0 = top margin).
pub struct FlowCursor {
    geometry: PageGeometry,
    fonts: FontContext,
    y: f64,
    pages: Vec<LayoutPage>,
}

impl FlowCursor {
    pub fn new(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            fonts: FontContext::new(),
            y: 0.0,
            pages: vec![LayoutPage::new(&geometry)],
        }
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    pub fn fonts(&self) -> &FontContext {
        &self.fonts
    }

    /// Current vertical position, relative to the content top.
    pub fn y(&self) -> f64 {
        self.y
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    fn remaining(&self) -> f64 {
        (self.geometry.content_height() - self.y).max(0.0)
    }

    /// Declare the vertical space the next draw will consume. If it does not
    /// fit above the bottom margin, append a new page and reset the cursor to
    /// the top margin; otherwise the cursor is untouched.
    pub fn reserve(&mut self, required: f64) {
        if required > self.remaining() {
            self.pages.push(LayoutPage::new(&self.geometry));
            self.y = 0.0;
        }
    }

    /// Reserve the default headroom for a heading line.
    pub fn reserve_heading(&mut self) {
        self.reserve(DEFAULT_RESERVE);
    }

    /// Move the cursor down without drawing (spacing between sections).
    pub fn advance(&mut self, dy: f64) {
        self.y += dy;
    }

    fn push(&mut self, element: PageElement) {
        // pages is never empty: new() seeds one page and reserve() only appends
        self.pages.last_mut().expect("page list is never empty").elements.push(element);
    }

    fn place_line(&mut self, x: f64, text: &str, style: TextStyle) {
        let line_height = style.line_height();
        self.reserve(line_height);
        let baseline = self.geometry.margin + self.y + style.size;
        self.push(PageElement::Text {
            x,
            y: baseline,
            text: text.to_string(),
            size: style.size,
            bold: style.bold,
            color: style.color,
        });
        self.y += line_height;
    }

    /// Draw a single unwrapped line at the left margin.
    pub fn add_line(&mut self, text: &str, style: TextStyle) {
        let x = self.geometry.margin;
        self.place_line(x, text, style);
    }

    /// Draw a single line centered on the page's horizontal midpoint.
    pub fn add_line_centered(&mut self, text: &str, style: TextStyle) {
        let width = self.fonts.measure_string(text, style.size, style.bold);
        let x = (self.geometry.width - width) / 2.0;
        self.place_line(x, text, style);
    }

    /// Wrap `text` to the content width and draw it line by line at the left
    /// margin, reserving one line height per line.
    pub fn add_text(&mut self, text: &str, style: TextStyle) {
        let max_width = self.geometry.content_width();
        for line in wrap::wrap_text(&self.fonts, text, style.size, style.bold, max_width) {
            self.add_line(&line, style);
        }
    }

    /// Wrapped, centered variant (cover page only).
    pub fn add_text_centered(&mut self, text: &str, style: TextStyle) {
        let max_width = self.geometry.content_width();
        for line in wrap::wrap_text(&self.fonts, text, style.size, style.bold, max_width) {
            self.add_line_centered(&line, style);
        }
    }

    /// Draw a full-content-width horizontal rule.
    pub fn add_rule(&mut self, color: Color) {
        let height = 6.0;
        self.reserve(height);
        self.push(PageElement::Rule {
            x: self.geometry.margin,
            y: self.geometry.margin + self.y + 2.0,
            width: self.geometry.content_width(),
            color,
        });
        self.y += height;
    }

    /// Embed a decoded image at the left margin, scaled down (never up) to
    /// fit `max_width` × `max_height` with its aspect ratio preserved.
    ///
    /// Returns `false` without consuming any vertical space when the image
    /// cannot be placed (degenerate dimensions).
    pub fn add_image(&mut self, image: &LoadedImage, max_width: f64, max_height: f64) -> bool {
        if image.width_px == 0 || image.height_px == 0 {
            return false;
        }

        let mut width = image.width_px as f64 * PX_TO_PT;
        let mut height = image.height_px as f64 * PX_TO_PT;

        if width > max_width {
            let scale = max_width / width;
            width *= scale;
            height *= scale;
        }
        if height > max_height {
            let scale = max_height / height;
            width *= scale;
            height *= scale;
        }

        self.reserve(height + IMAGE_GAP);
        self.push(PageElement::Image {
            x: self.geometry.margin,
            y: self.geometry.margin + self.y,
            width,
            height,
            image: image.clone(),
        });
        self.y += height + IMAGE_GAP;
        true
    }

    /// Consume the cursor and return the finished page list.
    pub fn finish(self) -> Vec<LayoutPage> {
        self.pages
    }
}
