//! # Font Measurement
//!
//! The report renders entirely in the standard PDF Helvetica family, so no
//! font embedding is needed: just accurate advance widths for line breaking
//! and centering, and the base font names for the PDF writer.

pub mod metrics;

pub use metrics::StandardFontMetrics;

/// The standard fonts this engine draws with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
}

impl StandardFont {
    /// The PDF /BaseFont name for this font.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
        }
    }

    pub fn metrics(&self) -> &'static StandardFontMetrics {
        match self {
            Self::Helvetica => &metrics::HELVETICA,
            Self::HelveticaBold => &metrics::HELVETICA_BOLD,
        }
    }
}

/// Shared measurement context used by layout and the PDF writer.
pub struct FontContext;

impl Default for FontContext {
    fn default() -> Self {
        Self::new()
    }
}

impl FontContext {
    pub fn new() -> Self {
        Self
    }

    fn resolve(bold: bool) -> StandardFont {
        if bold {
            StandardFont::HelveticaBold
        } else {
            StandardFont::Helvetica
        }
    }

    /// Advance width of a single character in points.
    pub fn char_width(&self, ch: char, font_size: f64, bold: bool) -> f64 {
        Self::resolve(bold).metrics().char_width(ch, font_size)
    }

    /// Width of a string on a single line, in points.
    pub fn measure_string(&self, text: &str, font_size: f64, bold: bool) -> f64 {
        Self::resolve(bold).metrics().measure_string(text, font_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_bold() {
        let ctx = FontContext::new();
        let regular = ctx.measure_string("ABCDEFG", 32.0, false);
        let bold = ctx.measure_string("ABCDEFG", 32.0, true);
        assert!(bold > regular, "bold={bold}, regular={regular}");
    }

    #[test]
    fn test_pdf_names() {
        assert_eq!(StandardFont::Helvetica.pdf_name(), "Helvetica");
        assert_eq!(StandardFont::HelveticaBold.pdf_name(), "Helvetica-Bold");
    }
}
