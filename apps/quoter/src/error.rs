//! # API Error Type
//!
//! The single user-facing error of every quote action.
//!
//! ## Error Handling Strategy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Error Flow in VT Quote                               │
//! │                                                                         │
//! │  QuoteService action                                                    │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Validation Error? ── ValidationError ──► ApiError (Spanish prompt)     │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Render Error? ────── RenderError ──────► ApiError ("Error al ...")     │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Delivery Error? ──── DeliveryError ────► ApiError ("Error al ...")     │
//! │         │                                                               │
//! │         ▼                                                               │
//! │  Success ──────────── ActionOutcome ────► confirmation message          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Validation failures carry the prompt the form shows. Everything else is
//! logged with its detail and reported with a short message.

use serde::Serialize;
use vt_core::{CoreError, ValidationError};
use vt_render::RenderError;

use crate::config::ConfigError;
use crate::delivery::DeliveryError;

/// API error returned from quote actions.
///
/// ```json
/// {
///   "code": "VALIDATION_ERROR",
///   "message": "Por favor ingrese el nombre del cliente"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiError {
    /// Machine-readable error code for programmatic handling
    pub code: ErrorCode,

    /// Human-readable error message for display
    pub message: String,
}

/// Error codes for API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Form input rejected before any computation
    ValidationError,

    /// Catalog, pricing or config file problem
    ConfigurationError,

    /// Building the PDF or PNG failed
    RenderError,

    /// Writing the file or the clipboard failed
    DeliveryError,

    /// Anything else
    Internal,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        ApiError {
            code,
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::ValidationError, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::new(ErrorCode::Internal, message)
    }

    /// Prefixes the message with the failing action, e.g.
    /// `"Error al generar el PDF: ..."`. Validation prompts stay as they are.
    pub fn during(mut self, prefix: &str) -> Self {
        if self.code != ErrorCode::ValidationError {
            self.message = format!("{}{}", prefix, self.message);
        }
        self
    }
}

/// Converts validation errors to the prompts the form shows.
impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        let prompt = match &err {
            ValidationError::Required { field } | ValidationError::InvalidFormat { field, .. } => {
                match field.as_str() {
                    "client_name" => "Por favor ingrese el nombre del cliente".to_string(),
                    "client_phone" => "Por favor ingrese el teléfono del cliente".to_string(),
                    "date" => "Por favor seleccione una fecha".to_string(),
                    _ => err.to_string(),
                }
            }
            ValidationError::EmptyOrder => "Por favor seleccione al menos un producto".to_string(),
            _ => err.to_string(),
        };
        ApiError::validation(prompt)
    }
}

/// Converts core errors to API errors.
impl From<CoreError> for ApiError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Validation(e) => e.into(),
            other => {
                tracing::error!("Catalog or pricing error: {}", other);
                ApiError::new(ErrorCode::ConfigurationError, other.to_string())
            }
        }
    }
}

impl From<RenderError> for ApiError {
    fn from(err: RenderError) -> Self {
        tracing::error!("Rendering failed: {}", err);
        match err {
            // The user can fix this one, so name the text
            RenderError::UnsupportedText {
                character, text, ..
            } => ApiError::new(
                ErrorCode::RenderError,
                format!("el carácter {:?} de \"{}\" no se puede imprimir", character, text),
            ),
            // Log the actual error but return a generic message
            _ => ApiError::new(ErrorCode::RenderError, "no se pudo construir el archivo"),
        }
    }
}

impl From<DeliveryError> for ApiError {
    fn from(err: DeliveryError) -> Self {
        tracing::error!("Delivery failed: {}", err);
        match err {
            DeliveryError::ClipboardUnavailable | DeliveryError::ClipboardFailed(_) => {
                ApiError::new(ErrorCode::DeliveryError, "No se pudo copiar al portapapeles")
            }
            DeliveryError::Io(_) => {
                ApiError::new(ErrorCode::DeliveryError, "no se pudo guardar el archivo")
            }
        }
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        tracing::error!("Configuration error: {}", err);
        ApiError::new(ErrorCode::ConfigurationError, err.to_string())
    }
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_prompts() {
        let cases = [
            (ValidationError::required("client_name"), "Por favor ingrese el nombre del cliente"),
            (ValidationError::required("client_phone"), "Por favor ingrese el teléfono del cliente"),
            (ValidationError::required("date"), "Por favor seleccione una fecha"),
            (
                ValidationError::invalid_format("date", "expected YYYY-MM-DD"),
                "Por favor seleccione una fecha",
            ),
            (ValidationError::EmptyOrder, "Por favor seleccione al menos un producto"),
        ];

        for (err, prompt) in cases {
            let api = ApiError::from(err);
            assert_eq!(api.code, ErrorCode::ValidationError);
            assert_eq!(api.message, prompt);
        }
    }

    #[test]
    fn test_core_validation_unwraps() {
        let api = ApiError::from(CoreError::Validation(ValidationError::EmptyOrder));
        assert_eq!(api.code, ErrorCode::ValidationError);
    }

    #[test]
    fn test_during_prefixes_failures_only() {
        let api = ApiError::from(RenderError::EmptyDocument).during("Error al generar el PDF: ");
        assert_eq!(api.message, "Error al generar el PDF: no se pudo construir el archivo");

        let api = ApiError::from(ValidationError::EmptyOrder).during("Error al generar el PDF: ");
        assert_eq!(api.message, "Por favor seleccione al menos un producto");
    }

    #[test]
    fn test_unsupported_text_names_the_character() {
        let err = RenderError::UnsupportedText {
            target: "receipt font",
            character: '🎉',
            text: "Ana 🎉".to_string(),
        };
        let api = ApiError::from(err).during("Error al generar la imagen: ");
        assert_eq!(api.code, ErrorCode::RenderError);
        assert_eq!(
            api.message,
            "Error al generar la imagen: el carácter '🎉' de \"Ana 🎉\" no se puede imprimir"
        );
    }

    #[test]
    fn test_serialization() {
        let json = serde_json::to_string(&ApiError::validation("x")).unwrap();
        assert_eq!(json, r#"{"code":"VALIDATION_ERROR","message":"x"}"#);
    }
}
