//! # Font Provider
//!
//! The one font every document is set in. Labels mix Latin and Cyrillic, so
//! the standard PDF fonts (WinAnsi only) are not an option: we bundle
//! DejaVu Sans and embed it as a CIDFont.
//!
//! The payload and its parsed metrics are a read-only constant. They are
//! parsed on first use and shared by every composition after that.

use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::OnceLock;

use crate::error::ZcatError;

static DEJAVU_SANS: &[u8] = include_bytes!("../../fonts/DejaVuSans.ttf");

static SHARED: OnceLock<FontProvider> = OnceLock::new();

/// Metrics parsed from a TrueType font via ttf-parser.
#[derive(Debug, Clone)]
pub struct FontMetrics {
    pub units_per_em: u16,
    pub ascender: i16,
    pub descender: i16,
    pub cap_height: i16,
    pub advance_widths: HashMap<char, u16>,
    pub default_advance: u16,
    /// Maps characters to their glyph IDs in the font.
    pub glyph_ids: HashMap<char, u16>,
}

impl FontMetrics {
    /// Parse metrics from font data.
    pub fn from_font_data(data: &[u8]) -> Option<Self> {
        let face = ttf_parser::Face::parse(data, 0).ok()?;
        let units_per_em = face.units_per_em();
        let ascender = face.ascender();
        let descender = face.descender();
        let cap_height = face.capital_height().unwrap_or(ascender);

        let mut advance_widths = HashMap::new();
        let mut glyph_ids = HashMap::new();
        let mut default_advance = 0u16;

        for code in 32u32..=0xFFFF {
            if let Some(ch) = char::from_u32(code) {
                if let Some(glyph_id) = face.glyph_index(ch) {
                    let advance = face.glyph_hor_advance(glyph_id).unwrap_or(0);
                    advance_widths.insert(ch, advance);
                    glyph_ids.insert(ch, glyph_id.0);
                    if ch == ' ' {
                        default_advance = advance;
                    }
                }
            }
        }

        if default_advance == 0 {
            default_advance = units_per_em / 2;
        }

        Some(FontMetrics {
            units_per_em,
            ascender,
            descender,
            cap_height,
            advance_widths,
            default_advance,
            glyph_ids,
        })
    }

    /// Advance width of a character in points.
    pub fn char_width(&self, ch: char, font_size: f64) -> f64 {
        let w = self
            .advance_widths
            .get(&ch)
            .copied()
            .unwrap_or(self.default_advance);
        (w as f64 / self.units_per_em as f64) * font_size
    }

    /// Width of a string in points.
    pub fn measure_string(&self, text: &str, font_size: f64) -> f64 {
        text.chars().map(|ch| self.char_width(ch, font_size)).sum()
    }

    /// Distance from the top of a capital letter to the baseline, in points.
    pub fn cap_height_pt(&self, font_size: f64) -> f64 {
        self.cap_height as f64 / self.units_per_em as f64 * font_size
    }
}

/// A font payload plus its metrics.
#[derive(Debug, Clone)]
pub struct FontProvider {
    data: Cow<'static, [u8]>,
    base_name: String,
    metrics: FontMetrics,
}

impl FontProvider {
    /// The bundled Cyrillic-capable font, parsed once per process.
    pub fn shared() -> &'static FontProvider {
        SHARED.get_or_init(|| {
            Self::parse(Cow::Borrowed(DEJAVU_SANS), "DejaVuSans")
                .expect("bundled DejaVu Sans must parse")
        })
    }

    /// Build a provider around another TrueType payload.
    pub fn from_bytes(data: Vec<u8>, base_name: &str) -> Result<Self, ZcatError> {
        Self::parse(Cow::Owned(data), base_name)
    }

    fn parse(data: Cow<'static, [u8]>, base_name: &str) -> Result<Self, ZcatError> {
        let metrics = FontMetrics::from_font_data(&data).ok_or_else(|| {
            ZcatError::Font(format!("Failed to parse TrueType data for font '{}'", base_name))
        })?;
        Ok(Self {
            data,
            base_name: sanitize_font_name(base_name),
            metrics,
        })
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// The PDF /BaseFont name.
    pub fn base_name(&self) -> &str {
        &self.base_name
    }

    pub fn metrics(&self) -> &FontMetrics {
        &self.metrics
    }

    /// Glyph id for a character, 0 (.notdef) if the font lacks it.
    pub fn glyph_id(&self, ch: char) -> u16 {
        self.metrics.glyph_ids.get(&ch).copied().unwrap_or(0)
    }

    pub fn has_glyph(&self, ch: char) -> bool {
        self.metrics.glyph_ids.contains_key(&ch)
    }
}

/// Strip everything that is not allowed in a PDF name object.
fn sanitize_font_name(name: &str) -> String {
    let name: String = name
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '-' || *c == '_')
        .collect();
    if name.is_empty() {
        "CustomFont".to_string()
    } else {
        name
    }
}
