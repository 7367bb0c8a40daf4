//! # Label Sheet Layout
//!
//! Places the preview, the label and the description onto A4 pages.
//!
//! All positions are millimetres from the top-left corner of the page; text
//! `y` is the baseline. Font sizes stay in points. The PDF writer converts
//! both when it serializes.
//!
//! ```text
//!  ┌──────────────────────────────────┐
//!  │  ┌───────┐   Author              │  <- first cap line aligned with
//!  │  │       │   «Title»             │     the image top
//!  │  │ image │   Technique / material│
//!  │  │       │   70 × 50 см          │
//!  │  └───────┘   2024                │
//!  │                                  │  <- SECTION_GAP below the taller
//!  │  Description (style: Catalog)    │     of image and label
//!  │  body text wrapped to the content│
//!  │  width, continuing on new pages  │
//!  └──────────────────────────────────┘
//! ```
//!
//! The vertical cursor only ever moves down. Before every wrapped
//! description line the cursor is checked against the bottom margin; an
//! overflowing line starts a fresh page. A line is never split across pages.

use crate::font::FontProvider;
use crate::image_loader::{fit_image_size, LoadedImage};
use crate::label::strip_quotes;
use crate::model::LabelRecord;
use crate::text::TextWrapper;

pub const PAGE_WIDTH: f64 = 210.0;
pub const PAGE_HEIGHT: f64 = 297.0;
pub const MARGIN: f64 = 20.0;
pub const CONTENT_WIDTH: f64 = PAGE_WIDTH - MARGIN * 2.0;

pub const IMAGE_MAX_WIDTH: f64 = 45.0 * 1.15;
pub const IMAGE_MAX_HEIGHT: f64 = 60.0 * 1.15;
/// Horizontal gap between the image and the label.
pub const LABEL_GAP: f64 = 10.0;
/// Vertical gap between the image/label row and the description.
pub const SECTION_GAP: f64 = 12.0;
pub const LINE_HEIGHT: f64 = 6.0;
/// Extra space after the description heading.
pub const HEADING_GAP: f64 = 2.0;

pub const TITLE_FONT_SIZE: f64 = 14.0;
pub const LABEL_FONT_SIZE: f64 = 10.0;
pub const BODY_FONT_SIZE: f64 = 11.0;

/// Millimetres per typographic point.
pub const PT_TO_MM: f64 = 25.4 / 72.0;

/// A laid-out document: pages plus the metadata for the PDF Info dictionary.
#[derive(Debug, Clone)]
pub struct ComposedDocument {
    pub pages: Vec<LayoutPage>,
    pub title: Option<String>,
    pub author: Option<String>,
}

impl ComposedDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// All text elements with their page index, in drawing order.
    pub fn texts(&self) -> impl Iterator<Item = (usize, &LayoutElement)> {
        self.pages.iter().enumerate().flat_map(|(i, page)| {
            page.elements
                .iter()
                .filter(|e| matches!(e, LayoutElement::Text { .. }))
                .map(move |e| (i, e))
        })
    }
}

#[derive(Debug, Clone)]
pub struct LayoutPage {
    pub width: f64,
    pub height: f64,
    pub elements: Vec<LayoutElement>,
}

/// What a text element is, for inspection and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextRole {
    Author,
    Title,
    TechniqueAndMaterial,
    Size,
    Year,
    DescriptionHeading,
    DescriptionBody,
}

/// A positioned draw operation.
#[derive(Debug, Clone)]
pub enum LayoutElement {
    /// An image, top-left at (`x`, `y`).
    Image {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        image: LoadedImage,
    },
    /// A single line of text with its baseline at `y`.
    Text {
        x: f64,
        y: f64,
        font_size: f64,
        text: String,
        role: TextRole,
    },
}

impl LayoutElement {
    pub fn role(&self) -> Option<TextRole> {
        match self {
            LayoutElement::Text { role, .. } => Some(*role),
            LayoutElement::Image { .. } => None,
        }
    }
}

/// Tracks where we are on the current page.
#[derive(Debug, Clone)]
struct PageCursor {
    y: f64,
    elements: Vec<LayoutElement>,
}

impl PageCursor {
    fn new() -> Self {
        Self {
            y: MARGIN,
            elements: Vec::new(),
        }
    }

    fn finalize(&mut self) -> LayoutPage {
        LayoutPage {
            width: PAGE_WIDTH,
            height: PAGE_HEIGHT,
            elements: std::mem::take(&mut self.elements),
        }
    }

    fn text(&mut self, x: f64, font_size: f64, text: &str, role: TextRole) {
        self.elements.push(LayoutElement::Text {
            x,
            y: self.y,
            font_size,
            text: text.to_string(),
            role,
        });
    }
}

pub struct LayoutEngine<'f> {
    font: &'f FontProvider,
}

impl Default for LayoutEngine<'static> {
    fn default() -> Self {
        Self::new(FontProvider::shared())
    }
}

impl<'f> LayoutEngine<'f> {
    pub fn new(font: &'f FontProvider) -> Self {
        Self { font }
    }

    /// Distance from a line's cap top to its baseline, in millimetres.
    pub fn baseline_offset(&self, font_size: f64) -> f64 {
        self.font.metrics().cap_height_pt(font_size) * PT_TO_MM
    }

    /// Lay out one label sheet.
    ///
    /// Every input is optional. A label with a blank title is skipped
    /// entirely; a blank description skips the heading too.
    pub fn layout(
        &self,
        image: Option<LoadedImage>,
        label: Option<&LabelRecord>,
        description: &str,
        heading: &str,
    ) -> ComposedDocument {
        let mut pages = Vec::new();
        let mut cursor = PageCursor::new();
        let label = label.filter(|l| !strip_quotes(&l.title).is_empty());

        let top = cursor.y;
        let (label_x, image_height) = match image {
            Some(image) => {
                let fitted = fit_image_size(
                    image.width_px as f64,
                    image.height_px as f64,
                    IMAGE_MAX_WIDTH,
                    IMAGE_MAX_HEIGHT,
                );
                cursor.elements.push(LayoutElement::Image {
                    x: MARGIN,
                    y: top,
                    width: fitted.width,
                    height: fitted.height,
                    image,
                });
                (MARGIN + fitted.width + LABEL_GAP, fitted.height)
            }
            None => (MARGIN, 0.0),
        };

        let label_bottom = match label {
            Some(label) => self.layout_label(&mut cursor, label, label_x),
            None => top,
        };

        cursor.y = (top + image_height).max(label_bottom) + SECTION_GAP;

        let body = description.trim();
        if !body.is_empty() {
            self.layout_description(&mut cursor, &mut pages, body, heading);
        }

        pages.push(cursor.finalize());

        ComposedDocument {
            pages,
            title: label.map(|l| strip_quotes(&l.title)),
            author: label.map(|l| l.author.clone()).filter(|a| !a.is_empty()),
        }
    }

    /// Emit the label lines, returning the cursor after the last one.
    fn layout_label(&self, cursor: &mut PageCursor, label: &LabelRecord, x: f64) -> f64 {
        let top = cursor.y;
        cursor.y += self.baseline_offset(TITLE_FONT_SIZE);

        let lines = [
            (label.author.clone(), TITLE_FONT_SIZE, TextRole::Author),
            (label.quoted_title(), TITLE_FONT_SIZE, TextRole::Title),
            (
                label.technique_and_material.clone(),
                LABEL_FONT_SIZE,
                TextRole::TechniqueAndMaterial,
            ),
            (label.size.clone(), LABEL_FONT_SIZE, TextRole::Size),
            (label.year.clone(), LABEL_FONT_SIZE, TextRole::Year),
        ];

        for (text, size, role) in lines.iter() {
            if text.trim().is_empty() {
                continue;
            }
            cursor.text(x, *size, text, *role);
            cursor.y += LINE_HEIGHT;
        }

        let bottom = cursor.y;
        cursor.y = top;
        bottom
    }

    fn layout_description(
        &self,
        cursor: &mut PageCursor,
        pages: &mut Vec<LayoutPage>,
        body: &str,
        heading: &str,
    ) {
        // The heading is not overflow-checked, it may end up alone at the
        // bottom of a page.
        if !heading.trim().is_empty() {
            cursor.text(MARGIN, TITLE_FONT_SIZE, heading, TextRole::DescriptionHeading);
            cursor.y += LINE_HEIGHT + HEADING_GAP;
        }

        let wrapper = TextWrapper::new(self.font.metrics(), BODY_FONT_SIZE);
        let lines = wrapper.wrap(body, CONTENT_WIDTH / PT_TO_MM);
        let limit = PAGE_HEIGHT - MARGIN - LINE_HEIGHT;

        for line in &lines {
            if cursor.y > limit {
                log::debug!(
                    "Description overflows at y={:.2}mm, starting page {}",
                    cursor.y,
                    pages.len() + 2
                );
                pages.push(cursor.finalize());
                cursor.y = MARGIN;
            }
            cursor.text(MARGIN, BODY_FONT_SIZE, &line.text, TextRole::DescriptionBody);
            cursor.y += LINE_HEIGHT;
        }
    }
}
