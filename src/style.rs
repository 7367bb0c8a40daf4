//! Description styles.
//!
//! A style is the register the external service writes the description in.
//! Inside this crate it only selects the heading printed above the
//! description and the id sent with a generation request.

use serde::{Deserialize, Serialize};

use crate::settings::Language;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", from = "String")]
pub enum DescriptionStyle {
    #[default]
    Catalog,
    Poetic,
    Neutral,
    Brief,
    Academic,
    Emotional,
}

impl DescriptionStyle {
    pub const ALL: [DescriptionStyle; 6] = [
        DescriptionStyle::Catalog,
        DescriptionStyle::Poetic,
        DescriptionStyle::Neutral,
        DescriptionStyle::Brief,
        DescriptionStyle::Academic,
        DescriptionStyle::Emotional,
    ];

    pub fn id(&self) -> &'static str {
        match self {
            DescriptionStyle::Catalog => "catalog",
            DescriptionStyle::Poetic => "poetic",
            DescriptionStyle::Neutral => "neutral",
            DescriptionStyle::Brief => "brief",
            DescriptionStyle::Academic => "academic",
            DescriptionStyle::Emotional => "emotional",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|style| style.id() == id)
    }

    /// Resolve an id, falling back to the default style for unknown ids.
    pub fn resolve(id: &str) -> Self {
        Self::from_id(id).unwrap_or_default()
    }

    pub fn display_name(&self, language: Language) -> &'static str {
        match (language, self) {
            (Language::Ru, DescriptionStyle::Catalog) => "Каталог",
            (Language::Ru, DescriptionStyle::Poetic) => "Поэтичный",
            (Language::Ru, DescriptionStyle::Neutral) => "Нейтральный",
            (Language::Ru, DescriptionStyle::Brief) => "Краткий",
            (Language::Ru, DescriptionStyle::Academic) => "Академический",
            (Language::Ru, DescriptionStyle::Emotional) => "Эмоциональный",
            (Language::En, DescriptionStyle::Catalog) => "Catalog",
            (Language::En, DescriptionStyle::Poetic) => "Poetic",
            (Language::En, DescriptionStyle::Neutral) => "Neutral",
            (Language::En, DescriptionStyle::Brief) => "Brief",
            (Language::En, DescriptionStyle::Academic) => "Academic",
            (Language::En, DescriptionStyle::Emotional) => "Emotional",
        }
    }
}

impl From<String> for DescriptionStyle {
    fn from(id: String) -> Self {
        DescriptionStyle::resolve(&id)
    }
}

/// The caption printed above the description block.
pub fn description_heading(style: Option<DescriptionStyle>, language: Language) -> String {
    let base = match language {
        Language::Ru => "Описание",
        Language::En => "Description",
    };
    match style {
        Some(style) => {
            let label = match language {
                Language::Ru => "стиль",
                Language::En => "style",
            };
            format!("{} ({}: {})", base, label, style.display_name(language))
        }
        None => base.to_string(),
    }
}
