//! # Description Service Contract
//!
//! Types for the external service that writes descriptions and suggests
//! titles from an image. No transport ships with the crate: callers
//! implement [`DescriptionService`] over whatever HTTP client they have and
//! feed raw status codes and bodies through [`parse_description_response`]
//! and [`parse_titles_response`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::FormData;
use crate::settings::Language;
use crate::style::DescriptionStyle;

/// The artwork fields the service uses as context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ArtworkData {
    pub title: String,
    pub width: String,
    pub height: String,
    pub technique: String,
}

impl From<&FormData> for ArtworkData {
    fn from(form: &FormData) -> Self {
        Self {
            title: form.title.clone(),
            width: form.width.clone(),
            height: form.height.clone(),
            technique: form.technique.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptionRequest {
    /// Base64 payload without any data-URL prefix.
    pub image: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub artwork_data: Option<ArtworkData>,
    pub locale: Language,
    pub description_style: DescriptionStyle,
}

impl DescriptionRequest {
    pub fn new(
        image: &str,
        artwork_data: Option<ArtworkData>,
        locale: Language,
        description_style: DescriptionStyle,
    ) -> Self {
        Self {
            image: strip_data_url_prefix(image).to_string(),
            artwork_data,
            locale,
            description_style,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TitlesRequest {
    pub image: String,
    pub locale: Language,
}

impl TitlesRequest {
    pub fn new(image: &str, locale: Language) -> Self {
        Self {
            image: strip_data_url_prefix(image).to_string(),
            locale,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DescriptionResponse {
    pub description: String,
    pub description_style_id: String,
}

impl DescriptionResponse {
    /// The style the text was actually written in. Unknown ids fall back
    /// to the default style.
    pub fn style(&self) -> DescriptionStyle {
        DescriptionStyle::resolve(&self.description_style_id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TitlesResponse {
    pub titles: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ErrorBody {
    error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The service rejected its credentials.
    #[error("Unauthorized: {message}")]
    Unauthorized { message: String },
    #[error("{message}")]
    Status { status: u16, message: String },
    /// No response at all.
    #[error("Network error: {0}")]
    Network(String),
    #[error("Invalid response from service: {0}")]
    InvalidResponse(String),
}

impl ServiceError {
    /// Text shown to the user for this failure.
    pub fn user_message(&self, language: Language) -> String {
        match (self, language) {
            (ServiceError::Unauthorized { .. }, Language::Ru) => {
                "Сервис отклонил запрос (401). Проверьте API-ключ в настройках сервера.".to_string()
            }
            (ServiceError::Unauthorized { .. }, Language::En) => {
                "The service rejected the request (401). Check your API key in the server settings."
                    .to_string()
            }
            (ServiceError::Status { message, .. }, Language::Ru) => {
                format!("Не удалось получить ответ сервиса: {}", message)
            }
            (ServiceError::Status { message, .. }, Language::En) => {
                format!("The service returned an error: {}", message)
            }
            (ServiceError::Network(_), Language::Ru) => {
                "Нет связи с сервисом. Проверьте подключение к интернету.".to_string()
            }
            (ServiceError::Network(_), Language::En) => {
                "Could not reach the service. Check your internet connection.".to_string()
            }
            (ServiceError::InvalidResponse(_), Language::Ru) => {
                "Сервис вернул некорректный ответ. Попробуйте ещё раз.".to_string()
            }
            (ServiceError::InvalidResponse(_), Language::En) => {
                "The service returned an unexpected response. Please try again.".to_string()
            }
        }
    }
}

/// A transport to the description service.
pub trait DescriptionService {
    fn generate_description(
        &self,
        request: &DescriptionRequest,
    ) -> Result<DescriptionResponse, ServiceError>;

    fn generate_titles(&self, request: &TitlesRequest) -> Result<TitlesResponse, ServiceError>;
}

/// Drop a `data:image/...;base64,` prefix if there is one.
pub fn strip_data_url_prefix(image: &str) -> &str {
    match image.split(',').nth(1) {
        Some(payload) if image.contains(',') => payload,
        _ => image,
    }
}

pub fn parse_description_response(
    status: u16,
    body: &str,
) -> Result<DescriptionResponse, ServiceError> {
    check_status(status, body)?;
    serde_json::from_str(body).map_err(|e| ServiceError::InvalidResponse(e.to_string()))
}

pub fn parse_titles_response(status: u16, body: &str) -> Result<TitlesResponse, ServiceError> {
    check_status(status, body)?;
    serde_json::from_str(body).map_err(|e| ServiceError::InvalidResponse(e.to_string()))
}

fn check_status(status: u16, body: &str) -> Result<(), ServiceError> {
    if (200..300).contains(&status) {
        return Ok(());
    }
    let message = serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|b| b.error)
        .filter(|e| !e.is_empty())
        .unwrap_or_else(|| format!("HTTP error! status: {}", status));
    log::warn!("Description service failed with {}: {}", status, message);
    if status == 401 {
        Err(ServiceError::Unauthorized { message })
    } else {
        Err(ServiceError::Status { status, message })
    }
}
