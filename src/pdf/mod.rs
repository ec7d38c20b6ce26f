//! # PDF Serializer
//!
//! Takes the laid-out pages and writes a valid PDF 1.7 file. We write the
//! raw bytes ourselves: the subset needed here (standard Type1 fonts, text,
//! horizontal rules, and raster images) is small enough that a from-scratch
//! writer keeps the crate self-contained.
//!
//! ## Structure (simplified)
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- objects (fonts, pages, content streams, images)
//! ...
//! xref                <- byte offsets of each object
//! trailer             <- points to the root object
//! %%EOF
//! ```
//!
//! Text uses WinAnsiEncoding (no font embedding). JPEG attachments embed
//! as-is with DCTDecode; decoded RGB images use FlateDecode with an SMask
//! for transparency.

use std::collections::HashMap;
use std::fmt::Write as FmtWrite; // for write! on String
use std::io::Write as IoWrite; // for write! on Vec<u8>

use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::font::StandardFont;
use crate::image_loader::{ImagePixelData, JpegColorSpace, LoadedImage};
use crate::layout::{LayoutPage, PageElement};

pub struct PdfWriter;

struct PdfObject {
    data: Vec<u8>,
}

/// Tracks allocated PDF objects during writing.
struct PdfBuilder {
    objects: Vec<PdfObject>,
    /// Registered fonts in /F0, /F1 order.
    fonts: Vec<(StandardFont, usize)>,
    /// XObject obj ids for images, indexed as /Im0, /Im1, ...
    image_objects: Vec<usize>,
    /// Maps (page_index, element_index) to an index into `image_objects`.
    image_index_map: HashMap<(usize, usize), usize>,
}

impl Default for PdfWriter {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        Self
    }

    /// Serialize laid-out pages to PDF bytes.
    pub fn write(&self, pages: &[LayoutPage], title: &str) -> Vec<u8> {
        let mut builder = PdfBuilder {
            objects: Vec::new(),
            fonts: Vec::new(),
            image_objects: Vec::new(),
            image_index_map: HashMap::new(),
        };

        // Object ids: 0 is the PDF free-list placeholder, 1 the Catalog,
        // 2 the page tree root. Everything else follows.
        builder.objects.push(PdfObject { data: vec![] });
        builder.objects.push(PdfObject { data: vec![] });
        builder.objects.push(PdfObject { data: vec![] });

        Self::register_fonts(&mut builder, pages);
        Self::register_images(&mut builder, pages);

        let mut page_obj_ids: Vec<usize> = Vec::new();
        for (page_idx, page) in pages.iter().enumerate() {
            let content = self.build_content_stream(page, page_idx, &builder);
            let compressed = compress_to_vec_zlib(content.as_bytes(), 6);

            let content_obj_id = builder.objects.len();
            let mut content_data: Vec<u8> = Vec::new();
            let _ = write!(
                content_data,
                "<< /Length {} /Filter /FlateDecode >>\nstream\n",
                compressed.len()
            );
            content_data.extend_from_slice(&compressed);
            content_data.extend_from_slice(b"\nendstream");
            builder.objects.push(PdfObject { data: content_data });

            let page_obj_id = builder.objects.len();
            let font_resources = builder
                .fonts
                .iter()
                .enumerate()
                .map(|(i, (_, obj_id))| format!("/F{} {} 0 R", i, obj_id))
                .collect::<Vec<_>>()
                .join(" ");
            let xobject_resources = Self::xobject_resources(page_idx, &builder);
            let resources = if xobject_resources.is_empty() {
                format!("/Font << {} >>", font_resources)
            } else {
                format!(
                    "/Font << {} >> /XObject << {} >>",
                    font_resources, xobject_resources
                )
            };
            let page_dict = format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Contents {} 0 R /Resources << {} >> >>",
                page.width, page.height, content_obj_id, resources
            );
            builder.objects.push(PdfObject {
                data: page_dict.into_bytes(),
            });
            page_obj_ids.push(page_obj_id);
        }

        builder.objects[1].data = b"<< /Type /Catalog /Pages 2 0 R >>".to_vec();

        let kids: String = page_obj_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        builder.objects[2].data = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids,
            page_obj_ids.len()
        )
        .into_bytes();

        let info_obj_id = builder.objects.len();
        let info = format!(
            "<< /Title ({}) /Producer (sitrep 0.3) /Creator (sitrep) >>",
            Self::escape_pdf_string(title)
        );
        builder.objects.push(PdfObject {
            data: info.into_bytes(),
        });

        Self::serialize(&builder, info_obj_id)
    }

    /// Register the standard fonts actually used across all pages.
    fn register_fonts(builder: &mut PdfBuilder, pages: &[LayoutPage]) {
        let mut used_bold = false;
        let mut used_regular = false;
        for page in pages {
            for element in &page.elements {
                if let PageElement::Text { bold, .. } = element {
                    if *bold {
                        used_bold = true;
                    } else {
                        used_regular = true;
                    }
                }
            }
        }

        let mut fonts = Vec::new();
        if used_regular || !used_bold {
            fonts.push(StandardFont::Helvetica);
        }
        if used_bold {
            fonts.push(StandardFont::HelveticaBold);
        }

        for font in fonts {
            let obj_id = builder.objects.len();
            let font_dict = format!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /{} \
                 /Encoding /WinAnsiEncoding >>",
                font.pdf_name()
            );
            builder.objects.push(PdfObject {
                data: font_dict.into_bytes(),
            });
            builder.fonts.push((font, obj_id));
        }
    }

    fn font_index(builder: &PdfBuilder, bold: bool) -> usize {
        let wanted = if bold {
            StandardFont::HelveticaBold
        } else {
            StandardFont::Helvetica
        };
        builder
            .fonts
            .iter()
            .position(|(font, _)| *font == wanted)
            .unwrap_or(0)
    }

    /// Walk all pages and create an XObject for every embedded image.
    fn register_images(builder: &mut PdfBuilder, pages: &[LayoutPage]) {
        for (page_idx, page) in pages.iter().enumerate() {
            for (elem_idx, element) in page.elements.iter().enumerate() {
                if let PageElement::Image { image, .. } = element {
                    let img_idx = builder.image_objects.len();
                    let xobj_id = Self::write_image_xobject(builder, image);
                    builder.image_objects.push(xobj_id);
                    builder.image_index_map.insert((page_idx, elem_idx), img_idx);
                }
            }
        }
    }

    /// Write one image as one or two XObjects; returns the main object id.
    fn write_image_xobject(builder: &mut PdfBuilder, image: &LoadedImage) -> usize {
        match &image.pixel_data {
            ImagePixelData::Jpeg { data, color_space } => {
                let color_space_str = match color_space {
                    JpegColorSpace::DeviceRgb => "/DeviceRGB",
                    JpegColorSpace::DeviceGray => "/DeviceGray",
                };

                let obj_id = builder.objects.len();
                let mut obj_data: Vec<u8> = Vec::new();
                let _ = write!(
                    obj_data,
                    "<< /Type /XObject /Subtype /Image \
                     /Width {} /Height {} \
                     /ColorSpace {} \
                     /BitsPerComponent 8 \
                     /Filter /DCTDecode \
                     /Length {} >>\nstream\n",
                    image.width_px,
                    image.height_px,
                    color_space_str,
                    data.len()
                );
                obj_data.extend_from_slice(data);
                obj_data.extend_from_slice(b"\nendstream");
                builder.objects.push(PdfObject { data: obj_data });
                obj_id
            }

            ImagePixelData::Decoded { rgb, alpha } => {
                let smask_id = alpha.as_ref().map(|alpha_data| {
                    let compressed_alpha = compress_to_vec_zlib(alpha_data, 6);
                    let smask_obj_id = builder.objects.len();
                    let mut smask_data: Vec<u8> = Vec::new();
                    let _ = write!(
                        smask_data,
                        "<< /Type /XObject /Subtype /Image \
                         /Width {} /Height {} \
                         /ColorSpace /DeviceGray \
                         /BitsPerComponent 8 \
                         /Filter /FlateDecode \
                         /Length {} >>\nstream\n",
                        image.width_px,
                        image.height_px,
                        compressed_alpha.len()
                    );
                    smask_data.extend_from_slice(&compressed_alpha);
                    smask_data.extend_from_slice(b"\nendstream");
                    builder.objects.push(PdfObject { data: smask_data });
                    smask_obj_id
                });

                let compressed_rgb = compress_to_vec_zlib(rgb, 6);
                let obj_id = builder.objects.len();
                let mut obj_data: Vec<u8> = Vec::new();
                let smask_ref = smask_id
                    .map(|id| format!(" /SMask {} 0 R", id))
                    .unwrap_or_default();
                let _ = write!(
                    obj_data,
                    "<< /Type /XObject /Subtype /Image \
                     /Width {} /Height {} \
                     /ColorSpace /DeviceRGB \
                     /BitsPerComponent 8 \
                     /Filter /FlateDecode \
                     /Length {}{} >>\nstream\n",
                    image.width_px,
                    image.height_px,
                    compressed_rgb.len(),
                    smask_ref
                );
                obj_data.extend_from_slice(&compressed_rgb);
                obj_data.extend_from_slice(b"\nendstream");
                builder.objects.push(PdfObject { data: obj_data });
                obj_id
            }
        }
    }

    fn xobject_resources(page_idx: usize, builder: &PdfBuilder) -> String {
        let mut entries: Vec<(usize, usize)> = builder
            .image_index_map
            .iter()
            .filter(|((pidx, _), _)| *pidx == page_idx)
            .map(|(_, &img_idx)| (img_idx, builder.image_objects[img_idx]))
            .collect();
        entries.sort_by_key(|(idx, _)| *idx);
        entries
            .iter()
            .map(|(idx, obj_id)| format!("/Im{} {} 0 R", idx, obj_id))
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Build the content stream for one page. The layout model puts the
    /// origin at the top-left; PDF puts it at the bottom-left, so every y
    /// flips against the page height here.
    fn build_content_stream(&self, page: &LayoutPage, page_idx: usize, builder: &PdfBuilder) -> String {
        let mut stream = String::new();
        let page_height = page.height;

        for (elem_idx, element) in page.elements.iter().enumerate() {
            match element {
                PageElement::Text {
                    x,
                    y,
                    text,
                    size,
                    bold,
                    color,
                } => {
                    let font_idx = Self::font_index(builder, *bold);
                    let pdf_y = page_height - y;
                    let _ = write!(
                        stream,
                        "BT\n{:.3} {:.3} {:.3} rg\n/F{} {:.1} Tf\n{:.2} {:.2} Td\n({}) Tj\nET\n",
                        color.r,
                        color.g,
                        color.b,
                        font_idx,
                        size,
                        x,
                        pdf_y,
                        Self::encode_text(text)
                    );
                }

                PageElement::Rule { x, y, width, color } => {
                    let pdf_y = page_height - y;
                    let _ = write!(
                        stream,
                        "q\n{:.3} {:.3} {:.3} RG\n0.75 w\n{:.2} {:.2} m\n{:.2} {:.2} l\nS\nQ\n",
                        color.r,
                        color.g,
                        color.b,
                        x,
                        pdf_y,
                        x + width,
                        pdf_y
                    );
                }

                PageElement::Image {
                    x,
                    y,
                    width,
                    height,
                    ..
                } => {
                    let pdf_y = page_height - y - height;
                    if let Some(&img_idx) = builder.image_index_map.get(&(page_idx, elem_idx)) {
                        let _ = write!(
                            stream,
                            "q\n{:.4} 0 0 {:.4} {:.2} {:.2} cm\n/Im{} Do\nQ\n",
                            width, height, x, pdf_y, img_idx
                        );
                    } else {
                        // Grey placeholder if the image was never registered
                        let _ = write!(
                            stream,
                            "q\n0.9 0.9 0.9 rg\n{:.2} {:.2} {:.2} {:.2} re\nf\nQ\n",
                            x, pdf_y, width, height
                        );
                    }
                }
            }
        }

        stream
    }

    /// Encode a string as a WinAnsi PDF string literal, with octal escapes
    /// for bytes outside the printable ASCII range.
    fn encode_text(text: &str) -> String {
        let mut encoded = String::with_capacity(text.len());
        for ch in text.chars() {
            let b = Self::unicode_to_winansi(ch).unwrap_or(b'?');
            match b {
                b'\\' => encoded.push_str("\\\\"),
                b'(' => encoded.push_str("\\("),
                b')' => encoded.push_str("\\)"),
                0x20..=0x7E => encoded.push(b as char),
                _ => {
                    let _ = write!(encoded, "\\{:03o}", b);
                }
            }
        }
        encoded
    }

    /// Map a Unicode codepoint to a WinAnsiEncoding byte. Latin-1 maps
    /// directly; the 0x80..=0x9F window carries the Windows-1252 specials
    /// that show up in report text (smart quotes, dashes, bullet, ellipsis).
    fn unicode_to_winansi(ch: char) -> Option<u8> {
        let cp = ch as u32;
        if (0x20..=0x7E).contains(&cp) || (0xA0..=0xFF).contains(&cp) {
            return Some(cp as u8);
        }
        match cp {
            0x20AC => Some(0x80), // euro sign
            0x2026 => Some(0x85), // ellipsis
            0x2018 => Some(0x91), // left single quote
            0x2019 => Some(0x92), // right single quote
            0x201C => Some(0x93), // left double quote
            0x201D => Some(0x94), // right double quote
            0x2022 => Some(0x95), // bullet
            0x2013 => Some(0x96), // en dash
            0x2014 => Some(0x97), // em dash
            0x2122 => Some(0x99), // trade mark sign
            _ => None,
        }
    }

    fn escape_pdf_string(s: &str) -> String {
        s.replace('\\', "\\\\")
            .replace('(', "\\(")
            .replace(')', "\\)")
    }

    /// Serialize all objects into the final PDF byte stream.
    fn serialize(builder: &PdfBuilder, info_obj_id: usize) -> Vec<u8> {
        let mut output: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = vec![0; builder.objects.len()];

        output.extend_from_slice(b"%PDF-1.7\n");
        output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

        for (i, obj) in builder.objects.iter().enumerate().skip(1) {
            offsets[i] = output.len();
            let header = format!("{} 0 obj\n", i);
            output.extend_from_slice(header.as_bytes());
            output.extend_from_slice(&obj.data);
            output.extend_from_slice(b"\nendobj\n\n");
        }

        let xref_offset = output.len();
        let _ = write!(output, "xref\n0 {}\n", builder.objects.len());
        let _ = write!(output, "0000000000 65535 f \n");
        for offset in offsets.iter().skip(1) {
            let _ = write!(output, "{:010} 00000 n \n", offset);
        }

        let _ = write!(
            output,
            "trailer\n<< /Size {} /Root 1 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            builder.objects.len(),
            info_obj_id,
            xref_offset
        );

        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layout::{Color, FlowCursor, PageGeometry, TextStyle};

    fn assert_valid_pdf(bytes: &[u8]) {
        assert!(bytes.starts_with(b"%PDF-1.7"), "missing PDF header");
        assert!(bytes.windows(5).any(|w| w == b"%%EOF"), "missing %%EOF");
        assert!(bytes.windows(4).any(|w| w == b"xref"), "missing xref");
        assert!(bytes.windows(7).any(|w| w == b"trailer"), "missing trailer");
    }

    #[test]
    fn test_escape_pdf_string() {
        assert_eq!(
            PdfWriter::escape_pdf_string("Crane (east)"),
            "Crane \\(east\\)"
        );
        assert_eq!(PdfWriter::escape_pdf_string("back\\slash"), "back\\\\slash");
    }

    #[test]
    fn test_empty_page_produces_valid_pdf() {
        let cursor = FlowCursor::new(PageGeometry::a4());
        let bytes = PdfWriter::new().write(&cursor.finish(), "Empty");
        assert_valid_pdf(&bytes);
    }

    #[test]
    fn test_title_lands_in_info_dict() {
        let cursor = FlowCursor::new(PageGeometry::a4());
        let bytes = PdfWriter::new().write(&cursor.finish(), "Dockside Crane daily report");
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/Title (Dockside Crane daily report)"));
    }

    #[test]
    fn test_bold_font_registered_when_used() {
        let mut cursor = FlowCursor::new(PageGeometry::a4());
        cursor.add_line("Summary", TextStyle::bold(13.0));
        cursor.add_line("Status: active", TextStyle::new(10.0));
        let bytes = PdfWriter::new().write(&cursor.finish(), "t");
        let text = String::from_utf8_lossy(&bytes);
        assert!(text.contains("/BaseFont /Helvetica "));
        assert!(text.contains("/BaseFont /Helvetica-Bold"));
    }

    #[test]
    fn test_regular_only_registers_one_font() {
        let mut cursor = FlowCursor::new(PageGeometry::a4());
        cursor.add_line("plain", TextStyle::new(10.0));
        let bytes = PdfWriter::new().write(&cursor.finish(), "t");
        let text = String::from_utf8_lossy(&bytes);
        assert!(!text.contains("Helvetica-Bold"));
    }

    #[test]
    fn test_rule_emits_stroke() {
        let mut cursor = FlowCursor::new(PageGeometry::a4());
        cursor.add_rule(Color::RULE_GRAY);
        let pages = cursor.finish();
        let stream = PdfWriter::new().build_content_stream(
            &pages[0],
            0,
            &PdfBuilder {
                objects: vec![],
                fonts: vec![],
                image_objects: vec![],
                image_index_map: HashMap::new(),
            },
        );
        assert!(stream.contains("S\nQ"), "rule should stroke a path: {stream}");
    }

    #[test]
    fn test_winansi_specials() {
        assert_eq!(PdfWriter::unicode_to_winansi('\u{2013}'), Some(0x96));
        assert_eq!(PdfWriter::unicode_to_winansi('A'), Some(b'A'));
        assert_eq!(PdfWriter::unicode_to_winansi('\u{4F60}'), None);
        assert_eq!(PdfWriter::encode_text("a\u{2022}b"), "a\\225b");
    }
}
