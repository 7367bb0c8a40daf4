//! # PDF Serializer
//!
//! Takes the laid-out pages and writes a PDF 1.7 file by hand.
//!
//! ## PDF Structure (simplified)
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- objects (catalog, page tree, font, images, pages)
//! 2 0 obj ... endobj
//! ...
//! xref                <- cross-reference table (byte offsets of each object)
//! trailer             <- points to the root object
//! %%EOF
//! ```
//!
//! ## Font Embedding
//!
//! Labels are Cyrillic, so the single document font is embedded as a
//! CIDFontType2 with Identity-H encoding: text is written as hex glyph ids
//! and a ToUnicode CMap keeps it searchable and copyable. That costs 5
//! objects: FontFile2, FontDescriptor, CIDFont, ToUnicode CMap, and the root
//! Type0 dictionary.
//!
//! ## Units
//!
//! Layout works in millimetres from the top-left corner. PDF user space is
//! points from the bottom-left, so every coordinate is scaled by
//! [`MM_TO_PT`] and flipped here.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt::Write as FmtWrite; // for write! on String
use std::io::Write as IoWrite; // for write! on Vec<u8>

use miniz_oxide::deflate::compress_to_vec_zlib;

use crate::error::ZcatError;
use crate::font::FontProvider;
use crate::image_loader::{ImagePixelData, JpegColorSpace, LoadedImage};
use crate::layout::{ComposedDocument, LayoutElement, LayoutPage};

/// Points per millimetre.
pub const MM_TO_PT: f64 = 72.0 / 25.4;

const FONT_RESOURCE: &str = "F0";

pub struct PdfWriter;

/// Tracks allocated PDF objects during writing.
struct PdfBuilder {
    objects: Vec<PdfObject>,
    /// Object id of the Type0 font dictionary.
    font_obj_id: usize,
    /// Image XObject ids per page, in drawing order.
    page_images: Vec<Vec<usize>>,
}

struct PdfObject {
    data: Vec<u8>,
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

    /// Write a composed document to a PDF byte vector.
    pub fn write(&self, document: &ComposedDocument, font: &FontProvider) -> Result<Vec<u8>, ZcatError> {
        let mut builder = PdfBuilder {
            objects: Vec::new(),
            font_obj_id: 0,
            page_images: Vec::new(),
        };

        // 0 = placeholder (PDF objects are 1-indexed), 1 = Catalog, 2 = Pages
        builder.objects.push(PdfObject { data: vec![] });
        builder.objects.push(PdfObject { data: vec![] });
        builder.objects.push(PdfObject { data: vec![] });

        let used_chars = Self::collect_used_chars(&document.pages);
        builder.font_obj_id = Self::write_font_objects(&mut builder, font, &used_chars)?;

        for page in &document.pages {
            let ids = page
                .elements
                .iter()
                .filter_map(|element| match element {
                    LayoutElement::Image { image, .. } => Some(image),
                    _ => None,
                })
                .map(|image| Self::write_image_xobject(&mut builder, image))
                .collect();
            builder.page_images.push(ids);
        }

        let mut page_obj_ids: Vec<usize> = Vec::new();

        for (page_idx, page) in document.pages.iter().enumerate() {
            let content = self.build_content_stream(page, &builder.page_images[page_idx], font);
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

            let xobjects: Vec<String> = builder.page_images[page_idx]
                .iter()
                .enumerate()
                .map(|(i, obj_id)| format!("/Im{} {} 0 R", i, obj_id))
                .collect();
            let resources = if xobjects.is_empty() {
                format!("/Font << /{} {} 0 R >>", FONT_RESOURCE, builder.font_obj_id)
            } else {
                format!(
                    "/Font << /{} {} 0 R >> /XObject << {} >>",
                    FONT_RESOURCE,
                    builder.font_obj_id,
                    xobjects.join(" ")
                )
            };

            let page_obj_id = builder.objects.len();
            let page_dict = format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Contents {} 0 R /Resources << {} >> >>",
                page.width * MM_TO_PT,
                page.height * MM_TO_PT,
                content_obj_id,
                resources
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
        let mut info = String::from("<< ");
        if let Some(ref title) = document.title {
            let _ = write!(info, "/Title {} ", Self::text_string(title));
        }
        if let Some(ref author) = document.author {
            let _ = write!(info, "/Author {} ", Self::text_string(author));
        }
        let _ = write!(
            info,
            "/Producer (zcat {}) /Creator (zcat) >>",
            env!("CARGO_PKG_VERSION")
        );
        builder.objects.push(PdfObject {
            data: info.into_bytes(),
        });

        Ok(self.serialize(&builder, info_obj_id))
    }

    /// Build the content stream for a single page.
    fn build_content_stream(&self, page: &LayoutPage, image_ids: &[usize], font: &FontProvider) -> String {
        let mut stream = String::new();
        let page_height = page.height;
        let mut image_counter = 0usize;

        for element in &page.elements {
            match element {
                LayoutElement::Image {
                    x, y, width, height, ..
                } => {
                    if image_counter < image_ids.len() {
                        let pdf_y = (page_height - y - height) * MM_TO_PT;
                        let _ = write!(
                            stream,
                            "q\n{:.4} 0 0 {:.4} {:.2} {:.2} cm\n/Im{} Do\nQ\n",
                            width * MM_TO_PT,
                            height * MM_TO_PT,
                            x * MM_TO_PT,
                            pdf_y,
                            image_counter
                        );
                    }
                    image_counter += 1;
                }
                LayoutElement::Text {
                    x, y, font_size, text, ..
                } => {
                    let mut hex = String::with_capacity(text.len() * 4);
                    for ch in text.chars() {
                        let _ = write!(hex, "{:04X}", font.glyph_id(ch));
                    }
                    let _ = write!(
                        stream,
                        "BT\n0 0 0 rg\n/{} {:.1} Tf\n{:.2} {:.2} Td\n<{}> Tj\nET\n",
                        FONT_RESOURCE,
                        font_size,
                        x * MM_TO_PT,
                        (page_height - y) * MM_TO_PT,
                        hex
                    );
                }
            }
        }

        stream
    }

    fn collect_used_chars(pages: &[LayoutPage]) -> BTreeSet<char> {
        pages
            .iter()
            .flat_map(|page| page.elements.iter())
            .filter_map(|element| match element {
                LayoutElement::Text { text, .. } => Some(text.chars()),
                _ => None,
            })
            .flatten()
            .collect()
    }

    /// Write a single image as one or two XObjects, returning the main id.
    fn write_image_xobject(builder: &mut PdfBuilder, image: &LoadedImage) -> usize {
        match &image.pixel_data {
            ImagePixelData::Jpeg { data, color_space } => {
                let color_space_str = match color_space {
                    JpegColorSpace::DeviceRGB => "/DeviceRGB",
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
                let smask_ref = smask_id
                    .map(|id| format!(" /SMask {} 0 R", id))
                    .unwrap_or_default();

                let mut obj_data: Vec<u8> = Vec::new();
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

    /// Write the 5 CIDFont objects, returning the Type0 dictionary id.
    ///
    /// The whole font file is embedded; /W and the ToUnicode CMap only list
    /// the glyphs the document uses.
    fn write_font_objects(
        builder: &mut PdfBuilder,
        font: &FontProvider,
        used_chars: &BTreeSet<char>,
    ) -> Result<usize, ZcatError> {
        let face = ttf_parser::Face::parse(font.data(), 0).map_err(|e| {
            ZcatError::Font(format!(
                "Failed to parse TTF data for font '{}': {}",
                font.base_name(),
                e
            ))
        })?;

        let metrics = font.metrics();
        let units_per_em = metrics.units_per_em;
        let font_name = font.base_name();

        let char_to_gid: BTreeMap<char, u16> = used_chars
            .iter()
            .filter_map(|&ch| {
                if font.has_glyph(ch) {
                    Some((ch, font.glyph_id(ch)))
                } else {
                    log::debug!("No glyph for {:?} in {}, drawing .notdef", ch, font_name);
                    None
                }
            })
            .collect();

        // 1. FontFile2 stream
        let compressed_ttf = compress_to_vec_zlib(font.data(), 6);
        let fontfile2_id = builder.objects.len();
        let mut fontfile2_data: Vec<u8> = Vec::new();
        let _ = write!(
            fontfile2_data,
            "<< /Length {} /Length1 {} /Filter /FlateDecode >>\nstream\n",
            compressed_ttf.len(),
            font.data().len()
        );
        fontfile2_data.extend_from_slice(&compressed_ttf);
        fontfile2_data.extend_from_slice(b"\nendstream");
        builder.objects.push(PdfObject {
            data: fontfile2_data,
        });

        // 2. FontDescriptor
        let font_descriptor_id = builder.objects.len();
        let bbox = face.global_bounding_box();
        let scale = 1000.0 / units_per_em as f64;
        let font_descriptor_dict = format!(
            "<< /Type /FontDescriptor /FontName /{} /Flags 32 \
             /FontBBox [{} {} {} {}] /ItalicAngle 0 \
             /Ascent {} /Descent {} /CapHeight {} /StemV 80 \
             /FontFile2 {} 0 R >>",
            font_name,
            (bbox.x_min as f64 * scale) as i32,
            (bbox.y_min as f64 * scale) as i32,
            (bbox.x_max as f64 * scale) as i32,
            (bbox.y_max as f64 * scale) as i32,
            (metrics.ascender as f64 * scale) as i32,
            (metrics.descender as f64 * scale) as i32,
            (metrics.cap_height as f64 * scale) as i32,
            fontfile2_id,
        );
        builder.objects.push(PdfObject {
            data: font_descriptor_dict.into_bytes(),
        });

        // 3. CIDFont dictionary (DescendantFont)
        let cidfont_id = builder.objects.len();
        let w_array = Self::build_w_array(&char_to_gid, &face, units_per_em);
        let default_width = face
            .glyph_hor_advance(ttf_parser::GlyphId(0))
            .map(|adv| (adv as f64 * scale) as u32)
            .unwrap_or(1000);
        let cidfont_dict = format!(
            "<< /Type /Font /Subtype /CIDFontType2 /BaseFont /{} \
             /CIDSystemInfo << /Registry (Adobe) /Ordering (Identity) /Supplement 0 >> \
             /FontDescriptor {} 0 R /DW {} /W {} \
             /CIDToGIDMap /Identity >>",
            font_name, font_descriptor_id, default_width, w_array,
        );
        builder.objects.push(PdfObject {
            data: cidfont_dict.into_bytes(),
        });

        // 4. ToUnicode CMap
        let tounicode_id = builder.objects.len();
        let cmap_content = Self::build_tounicode_cmap(&char_to_gid, font_name);
        let compressed_cmap = compress_to_vec_zlib(cmap_content.as_bytes(), 6);
        let mut tounicode_data: Vec<u8> = Vec::new();
        let _ = write!(
            tounicode_data,
            "<< /Length {} /Filter /FlateDecode >>\nstream\n",
            compressed_cmap.len()
        );
        tounicode_data.extend_from_slice(&compressed_cmap);
        tounicode_data.extend_from_slice(b"\nendstream");
        builder.objects.push(PdfObject {
            data: tounicode_data,
        });

        // 5. Type0 font dictionary, referenced by /Resources
        let type0_id = builder.objects.len();
        let type0_dict = format!(
            "<< /Type /Font /Subtype /Type0 /BaseFont /{} \
             /Encoding /Identity-H \
             /DescendantFonts [{} 0 R] \
             /ToUnicode {} 0 R >>",
            font_name, cidfont_id, tounicode_id,
        );
        builder.objects.push(PdfObject {
            data: type0_dict.into_bytes(),
        });

        Ok(type0_id)
    }

    /// Build the /W array: `[gid [width] gid [width] ...]`.
    fn build_w_array(char_to_gid: &BTreeMap<char, u16>, face: &ttf_parser::Face, units_per_em: u16) -> String {
        let scale = 1000.0 / units_per_em as f64;
        let gids: BTreeSet<u16> = char_to_gid.values().copied().collect();

        let mut result = String::from("[");
        for gid in gids {
            let advance = face.glyph_hor_advance(ttf_parser::GlyphId(gid)).unwrap_or(0);
            let _ = write!(result, " {} [{}]", gid, (advance as f64 * scale) as u32);
        }
        result.push_str(" ]");
        result
    }

    /// Build a ToUnicode CMap for text extraction and copy-paste.
    fn build_tounicode_cmap(char_to_gid: &BTreeMap<char, u16>, font_name: &str) -> String {
        let mut gid_to_unicode: Vec<(u16, char)> =
            char_to_gid.iter().map(|(&ch, &gid)| (gid, ch)).collect();
        gid_to_unicode.sort_by_key(|(gid, _)| *gid);
        gid_to_unicode.dedup_by_key(|(gid, _)| *gid);

        let mut cmap = String::new();
        cmap.push_str("/CIDInit /ProcSet findresource begin\n");
        cmap.push_str("12 dict begin\n");
        cmap.push_str("begincmap\n");
        cmap.push_str("/CIDSystemInfo\n");
        cmap.push_str("<< /Registry (Adobe) /Ordering (UCS) /Supplement 0 >> def\n");
        let _ = writeln!(cmap, "/CMapName /{}-UTF16 def", font_name);
        cmap.push_str("/CMapType 2 def\n");
        cmap.push_str("1 begincodespacerange\n<0000> <FFFF>\nendcodespacerange\n");

        // At most 100 entries per beginbfchar block
        for chunk in gid_to_unicode.chunks(100) {
            let _ = writeln!(cmap, "{} beginbfchar", chunk.len());
            for &(gid, ch) in chunk {
                let mut utf16 = String::new();
                for unit in ch.encode_utf16(&mut [0u16; 2]) {
                    let _ = write!(utf16, "{:04X}", unit);
                }
                let _ = writeln!(cmap, "<{:04X}> <{}>", gid, utf16);
            }
            cmap.push_str("endbfchar\n");
        }

        cmap.push_str("endcmap\n");
        cmap.push_str("CMapName currentdict /CMap defineresource pop\n");
        cmap.push_str("end\nend\n");
        cmap
    }

    /// Encode an Info dictionary string: literal for ASCII, UTF-16BE hex
    /// with a byte order mark otherwise.
    fn text_string(s: &str) -> String {
        if s.is_ascii() {
            return format!("({})", Self::escape_pdf_string(s));
        }
        let mut hex = String::from("<FEFF");
        for unit in s.encode_utf16() {
            let _ = write!(hex, "{:04X}", unit);
        }
        hex.push('>');
        hex
    }

    fn escape_pdf_string(s: &str) -> String {
        s.replace('\\', "\\\\")
            .replace('(', "\\(")
            .replace(')', "\\)")
    }

    /// Serialize all objects into the final PDF byte stream.
    fn serialize(&self, builder: &PdfBuilder, info_obj_id: usize) -> Vec<u8> {
        let mut output: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = vec![0; builder.objects.len()];

        output.extend_from_slice(b"%PDF-1.7\n");
        output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

        for (i, obj) in builder.objects.iter().enumerate().skip(1) {
            offsets[i] = output.len();
            let _ = write!(output, "{} 0 obj\n", i);
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
