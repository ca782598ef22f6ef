use thiserror::Error;

use crate::models::DebugInfo;
use crate::services::http::HttpResponse;
use crate::utils::storage::StorageError;

/// Mensaje genérico cuando el backend rechaza sin explicar por qué
pub const MSG_AUTH_FAILED: &str = "Ошибка авторизации";

/// Sufijo de los errores de transporte: suelen ser transitorios
pub const MSG_RETRY_LATER: &str = "Попробуйте позже.";

/// Sin conexión / sin respuesta
pub const MSG_NETWORK: &str = "Нет соединения с сервером. Проверьте интернет и попробуйте снова.";

/// Respuesta fallida resumida para debugInfo
#[derive(Debug, Clone, PartialEq)]
pub struct FailedResponse {
    pub status: u16,
    pub status_text: String,
    pub data: serde_json::Value,
    pub url: String,
    pub method: String,
}

impl From<&HttpResponse> for FailedResponse {
    fn from(response: &HttpResponse) -> Self {
        Self {
            status: response.status,
            status_text: response.status_text.clone(),
            data: response.json_value(),
            url: response.url.clone(),
            method: response.method.as_str().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ApiError {
    /// Sin host ni override de desarrollo: no hay initData que enviar
    #[error("Telegram initData отсутствует: откройте приложение из Telegram")]
    HostUnavailable,

    /// El backend rechazó las credenciales: reintentar sin initData nuevo no sirve
    #[error("{message}")]
    AuthRejected {
        message: String,
        response: Box<FailedResponse>,
    },

    /// Respuesta no-JSON (página HTML de error, proxy...). Puede ser transitorio.
    #[error("{message}")]
    AuthTransport {
        message: String,
        response: Box<FailedResponse>,
    },

    /// Error HTTP fuera de auth (5xx, 404...)
    #[error("HTTP {}: {message}", .response.status)]
    Http {
        message: String,
        response: Box<FailedResponse>,
    },

    #[error("Нет соединения с сервером ({0})")]
    Network(String),

    /// Token guardado que ya no vale. Se recupera sin mostrarlo al usuario.
    #[error("Token guardado inválido: {0}")]
    StaleToken(String),

    #[error("Autenticación ya en curso")]
    AuthInProgress,

    /// Logout mientras la petición estaba en vuelo: el resultado se descarta
    #[error("Sesión cerrada durante la autenticación")]
    SessionClosed,

    #[error("Error de serialización: {0}")]
    Serialization(String),

    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl ApiError {
    fn failed_response(&self) -> Option<&FailedResponse> {
        match self {
            ApiError::AuthRejected { response, .. }
            | ApiError::AuthTransport { response, .. }
            | ApiError::Http { response, .. } => Some(&**response),
            _ => None,
        }
    }

    pub fn status(&self) -> Option<u16> {
        self.failed_response().map(|r| r.status)
    }

    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// ¿Tiene sentido reintentar con los mismos datos?
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::AuthTransport { .. } | ApiError::Network(_) => true,
            ApiError::Http { response, .. } => response.status >= 500,
            _ => false,
        }
    }

    /// Detalle estructurado para el panel de debug
    pub fn debug_info(&self) -> DebugInfo {
        match self.failed_response() {
            Some(response) => DebugInfo::Response {
                status: response.status,
                status_text: response.status_text.clone(),
                data: response.data.clone(),
                url: response.url.clone(),
                method: response.method.clone(),
            },
            None => DebugInfo::no_response(self.to_string()),
        }
    }
}
