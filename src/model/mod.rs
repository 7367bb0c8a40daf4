//! # Data Model
//!
//! The input representation for the composer. Raw form fields come in as
//! [`FormData`], get normalized into a [`LabelRecord`], and a whole export
//! request travels as a [`CompositionJob`] (the JSON accepted by the CLI and
//! the wasm entry point).

use serde::{Deserialize, Serialize};

use crate::settings::Language;
use crate::style::DescriptionStyle;

/// Raw catalog form fields, exactly as typed by the user.
///
/// Every field may be empty. Nothing here is trimmed or validated; that is
/// the job of [`crate::label`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FormData {
    pub title: String,
    pub author: String,
    /// Width in centimetres, as typed.
    pub width: String,
    /// Height in centimetres, as typed.
    pub height: String,
    pub technique: String,
    pub material: String,
    pub year: String,
}

/// The canonical label printed beside the artwork.
///
/// Only ever built by [`crate::label::build_label_record`], which guarantees
/// that `title`, `size` and `technique_and_material` are non-empty. Empty
/// `author` and `year` mean "absent".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LabelRecord {
    /// Title without surrounding quotes. Guillemets are added at render time.
    pub title: String,
    pub author: String,
    /// `"{height} × {width} см"`.
    pub size: String,
    /// `"{technique} / {material}"`.
    pub technique_and_material: String,
    pub year: String,
}

impl LabelRecord {
    /// The title as printed: wrapped in exactly one pair of guillemets.
    pub fn quoted_title(&self) -> String {
        format!("«{}»", crate::label::strip_quotes(&self.title))
    }
}

/// A complete export request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompositionJob {
    pub form: FormData,
    /// Data URL, raw base64, or file path of the preview image.
    pub image: Option<String>,
    /// Name of the uploaded file, used to suggest the output file name.
    pub image_file_name: Option<String>,
    /// Generated description text. Blank skips the description block.
    pub description: String,
    /// Style the description was generated in. Falls back to the settings.
    pub description_style: Option<DescriptionStyle>,
    /// Heading language. Falls back to the settings.
    pub language: Option<Language>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn form_data_defaults_missing_fields() {
        let form: FormData = serde_json::from_str(r#"{"title": "Закат"}"#).unwrap();
        assert_eq!(form.title, "Закат");
        assert!(form.width.is_empty());
        assert!(form.year.is_empty());
    }

    #[test]
    fn label_record_serializes_camel_case() {
        let label = LabelRecord {
            title: "Закат".to_string(),
            technique_and_material: "Масло / холст".to_string(),
            ..Default::default()
        };
        let json = serde_json::to_string(&label).unwrap();
        assert!(json.contains("\"techniqueAndMaterial\":\"Масло / холст\""));
    }

    #[test]
    fn quoted_title_never_double_quotes() {
        let label = LabelRecord {
            title: "«Закат»".to_string(),
            ..Default::default()
        };
        assert_eq!(label.quoted_title(), "«Закат»");
    }

    #[test]
    fn job_parses_with_style_and_language() {
        let job: CompositionJob = serde_json::from_str(
            r#"{"form": {"title": "A"}, "description": "text",
                "descriptionStyle": "poetic", "language": "en"}"#,
        )
        .unwrap();
        assert_eq!(job.description_style, Some(DescriptionStyle::Poetic));
        assert_eq!(job.language, Some(Language::En));
        assert!(job.image.is_none());
    }
}
