//! # zcat
//!
//! Composes a printable artwork label sheet: a preview image, the catalog
//! label beside it, and a generated description below, on A4 pages.
//!
//! The pipeline is deliberately short. Every input is optional and the only
//! thing that can stop a composition is a broken font, which the bundled
//! one never is.
//!
//! ## Architecture
//!
//! ```text
//! FormData ──[label]──→ LabelRecord ─┐
//! PreviewImage ──[image_loader]──────┤
//! description + [style] heading ─────┤
//!                                    ↓
//!                        [layout]   positioned pages (mm)
//!                                    ↓
//!                        [pdf]      PDF bytes (pt)
//!                                    ↓
//!                        [delivery] download / gated link / share
//! ```
//!
//! [`settings`] holds the user's language and style preference, and
//! [`service`] describes the external description generator.

pub mod delivery;
pub mod error;
pub mod font;
pub mod image_loader;
pub mod label;
pub mod layout;
pub mod model;
pub mod pdf;
pub mod service;
pub mod settings;
pub mod style;
pub mod text;

#[cfg(feature = "wasm")]
pub mod wasm;

use delivery::{suggested_filename, PdfDocument};
use error::ZcatError;
use font::FontProvider;
use image_loader::PreviewImage;
use layout::{ComposedDocument, LayoutEngine};
use model::{CompositionJob, LabelRecord};
use pdf::PdfWriter;
use settings::Settings;
use style::description_heading;

/// A finished PDF and the name it should be saved under.
#[derive(Debug, Clone)]
pub struct ComposedPdf {
    pub bytes: Vec<u8>,
    pub filename: String,
    pub page_count: usize,
}

impl ComposedPdf {
    pub fn into_document(self) -> PdfDocument {
        PdfDocument::new(self.bytes)
    }
}

/// Compose a label sheet to PDF bytes.
///
/// An image that fails to decode is logged and left out.
pub fn compose(
    image: Option<&PreviewImage>,
    label: Option<&LabelRecord>,
    description: &str,
    heading: &str,
) -> Result<Vec<u8>, ZcatError> {
    let font = FontProvider::shared();
    let document = compose_layout(image, label, description, heading);
    PdfWriter::new().write(&document, font)
}

/// Lay out a label sheet without serializing it.
pub fn compose_layout(
    image: Option<&PreviewImage>,
    label: Option<&LabelRecord>,
    description: &str,
    heading: &str,
) -> ComposedDocument {
    let loaded = image.and_then(|preview| match image_loader::decode(preview) {
        Ok(loaded) => Some(loaded),
        Err(e) => {
            log::warn!(
                "Skipping preview image {}: {}",
                preview.file_name.as_deref().unwrap_or("<unnamed>"),
                e
            );
            None
        }
    });
    LayoutEngine::default().layout(loaded, label, description, heading)
}

/// Render a whole export request.
///
/// The job's own style and language win over the settings. An image source
/// that cannot be resolved at all is an error; one that resolves but does
/// not decode is skipped like in [`compose`].
pub fn render_job(job: &CompositionJob, settings: &Settings) -> Result<ComposedPdf, ZcatError> {
    let label = label::build_label_record(&job.form);
    if label.is_none() {
        log::debug!("Form is incomplete, composing without a label");
    }

    let preview = match job.image.as_deref().filter(|src| !src.trim().is_empty()) {
        Some(src) => {
            let mut preview = PreviewImage::from_source(src)?;
            preview.file_name = job.image_file_name.clone();
            Some(preview)
        }
        None => None,
    };

    let style = job.description_style.unwrap_or(settings.description_style);
    let language = job.language.unwrap_or(settings.language);
    let heading = description_heading(Some(style), language);

    let font = FontProvider::shared();
    let document = compose_layout(preview.as_ref(), label.as_ref(), &job.description, &heading);
    let bytes = PdfWriter::new().write(&document, font)?;

    let filename = suggested_filename(job.image_file_name.as_deref(), label.as_ref());
    log::info!(
        "Composed {} ({} page(s), {} bytes)",
        filename,
        document.page_count(),
        bytes.len()
    );

    Ok(ComposedPdf {
        bytes,
        filename,
        page_count: document.page_count(),
    })
}

/// Parse a [`CompositionJob`] from JSON and render it.
pub fn render_json(json: &str, settings: &Settings) -> Result<ComposedPdf, ZcatError> {
    let job: CompositionJob = serde_json::from_str(json)?;
    render_job(&job, settings)
}
